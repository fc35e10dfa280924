/*
Copyright 2024 San Francisco Compute Company

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use crate::domain::parsers::{
    parse_hardware_document, parse_pv_export, parse_vg_export, parse_vm_export,
};
use crate::domain::{
    HostReport, HostSummary, Inventory, InventoryError, ParseError, PublishError, ReportConfig,
    SnapshotError,
};
use crate::ports::{InventoryReportingService, ReportPublisher, SnapshotInput, SnapshotSource};
use crate::render;
use async_trait::async_trait;
use log::{debug, info};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Raw contents of one snapshot directory
#[derive(Debug, Clone, Default)]
pub struct SnapshotContents {
    pub hardware: String,
    pub virtual_machines: String,
    pub physical_volumes: String,
    pub volume_groups: Option<String>,
}

/// Build the inventory model from raw snapshot contents
///
/// Pure; the hardware document is parsed first, then the VM, PV and VG
/// exports. Any failure aborts the whole build.
///
/// # Arguments
/// * `contents` - Snapshot file contents
///
/// # Returns
/// * `Ok(Inventory)` - Complete model
/// * `Err(ParseError)` - First parse failure
pub fn build_inventory(contents: &SnapshotContents) -> Result<Inventory, ParseError> {
    let hardware = parse_hardware_document(&contents.hardware)?;
    let virtual_machines = parse_vm_export(&contents.virtual_machines)?;
    let physical_volumes = parse_pv_export(&contents.physical_volumes)?;
    let volume_groups = contents
        .volume_groups
        .as_deref()
        .map(parse_vg_export)
        .transpose()?
        .unwrap_or_default();

    Ok(Inventory::new(
        hardware.machine,
        hardware.cpus,
        hardware.memory,
        physical_volumes,
        volume_groups,
        virtual_machines,
    ))
}

/// Domain service that turns snapshot directories into host reports
///
/// Holds no per-snapshot state, so one instance can serve many snapshots
/// concurrently.
pub struct InventoryCollectionService {
    /// Where snapshot files are read from
    snapshot_source: Arc<dyn SnapshotSource>,
    /// Where rendered reports are written
    report_publisher: Arc<dyn ReportPublisher>,
}

impl InventoryCollectionService {
    /// Create a new inventory collection service
    ///
    /// # Arguments
    /// * `snapshot_source` - Reader for snapshot files
    /// * `report_publisher` - Writer for rendered reports
    pub fn new(
        snapshot_source: Arc<dyn SnapshotSource>,
        report_publisher: Arc<dyn ReportPublisher>,
    ) -> Self {
        Self {
            snapshot_source,
            report_publisher,
        }
    }

    /// Read an input that every snapshot must have
    async fn read_required(
        &self,
        snapshot: &Path,
        input: SnapshotInput,
    ) -> Result<String, SnapshotError> {
        self.snapshot_source
            .read(snapshot, input)
            .await?
            .ok_or_else(|| SnapshotError::MissingInput(snapshot.join(input.file_name())))
    }

    /// Read every snapshot file in order: hw, vm, pv, then the optional vg
    async fn read_snapshot(&self, snapshot: &Path) -> Result<SnapshotContents, SnapshotError> {
        let hardware = self.read_required(snapshot, SnapshotInput::Hardware).await?;
        let virtual_machines = self
            .read_required(snapshot, SnapshotInput::VirtualMachines)
            .await?;
        let physical_volumes = self
            .read_required(snapshot, SnapshotInput::PhysicalVolumes)
            .await?;
        let volume_groups = self
            .snapshot_source
            .read(snapshot, SnapshotInput::VolumeGroups)
            .await?;

        if volume_groups.is_none() {
            debug!("{}: no volume group export", snapshot.display());
        }

        Ok(SnapshotContents {
            hardware,
            virtual_machines,
            physical_volumes,
            volume_groups,
        })
    }
}

#[async_trait]
impl InventoryReportingService for InventoryCollectionService {
    async fn load_inventory(&self, snapshot: &Path) -> Result<Inventory, InventoryError> {
        let contents = self.read_snapshot(snapshot).await?;
        let inventory = build_inventory(&contents)?;

        debug!(
            "{}: {} cpu slots ({} installed), {} memory slots ({} installed), {} pvs, {} vgs, {} vms",
            inventory.machine().id,
            inventory.cpu_slot_count(),
            inventory.cpu_installed_count(),
            inventory.memory_slot_count(),
            inventory.memory_installed_count(),
            inventory.physical_volumes().len(),
            inventory.volume_groups().len(),
            inventory.vm_count(),
        );
        Ok(inventory)
    }

    async fn generate_report(
        &self,
        snapshot: &Path,
        config: &ReportConfig,
    ) -> Result<HostReport, InventoryError> {
        let inventory = self.load_inventory(snapshot).await?;
        let html = render::render_host(&inventory, config.index_link.as_deref());
        let vm_csv = render::vm_csv_lines(&inventory, config.csv_header);

        info!(
            "Generated report for {} from {}",
            inventory.machine().id,
            snapshot.display()
        );
        Ok(HostReport {
            inventory,
            html,
            vm_csv,
        })
    }

    async fn publish_report(
        &self,
        report: &HostReport,
        config: &ReportConfig,
    ) -> Result<Vec<PathBuf>, PublishError> {
        self.report_publisher.publish_host(report, config).await
    }

    async fn publish_index(
        &self,
        hosts: &[HostSummary],
        vm_rows: &[String],
        config: &ReportConfig,
    ) -> Result<Vec<PathBuf>, PublishError> {
        let entries: Vec<(String, HostSummary)> = hosts
            .iter()
            .map(|host| (host_directory_name(&host.id), host.clone()))
            .collect();
        let index_html = render::render_index(&entries);

        let vm_csv: Vec<String> = std::iter::once(render::vm_csv_header().to_string())
            .chain(vm_rows.iter().cloned())
            .collect();

        self.report_publisher
            .publish_index(&index_html, &vm_csv, config)
            .await
    }
}

/// Directory name used for a host's outputs
///
/// Anything other than alphanumerics, `-` and `.` is replaced with `_`.
pub fn host_directory_name(host_id: &str) -> String {
    let name: String = host_id
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    match name.as_str() {
        "" | "." | ".." => "_".repeat(name.len().max(1)),
        _ => name,
    }
}

/// Split reports into those with a free output directory and those whose
/// directory is already taken by an earlier report
///
/// Directory names are compared after [`host_directory_name`], so `rack 1` and
/// `rack_1` collide just like two snapshots of the same machine. The first
/// report in input order keeps the directory.
///
/// # Returns
/// * `(kept, collisions)` - Collisions carry the directory they would overwrite
pub fn partition_host_collisions<T>(
    reports: Vec<T>,
    host_id: impl Fn(&T) -> &str,
) -> (Vec<T>, Vec<(T, String)>) {
    let mut claimed = HashSet::new();
    let mut kept = Vec::with_capacity(reports.len());
    let mut collisions = Vec::new();
    for report in reports {
        let directory = host_directory_name(host_id(&report));
        if claimed.insert(directory.clone()) {
            kept.push(report);
        } else {
            collisions.push((report, directory));
        }
    }
    (kept, collisions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const HW: &str = r#"<list><node id="HOSTID" class="system">
  <description>Rack Mount Chassis</description>
  <product>R640</product>
  <vendor>Dell Inc.</vendor>
  <serial>ABC1234</serial>
  <node id="core" class="bus">
    <node id="cpu:0" class="processor">
      <description>CPU</description>
      <product>Xeon</product>
      <vendor>Intel Corp.</vendor>
      <slot>CPU1</slot>
      <size units="Hz">2500000000</size>
      <capacity units="Hz">3500000000</capacity>
      <width units="bits">64</width>
      <configuration>
        <setting id="cores" value="4" />
        <setting id="threads" value="8" />
      </configuration>
    </node>
    <node id="cpu:1" class="processor">
      <description>CPU [empty]</description>
      <slot>CPU2</slot>
    </node>
    <node id="memory" class="memory">
      <description>System Memory</description>
      <slot>System board or motherboard</slot>
      <node id="bank:0" class="memory">
        <description>DIMM DDR4</description>
        <slot>A1</slot>
        <size units="bytes">8589934592</size>
      </node>
      <node id="bank:1" class="memory">
        <description>DIMM DDR4</description>
        <slot>A2</slot>
        <size units="bytes">8589934592</size>
      </node>
    </node>
  </node>
</node></list>"#;

    struct InMemorySnapshotSource {
        files: HashMap<&'static str, String>,
    }

    impl InMemorySnapshotSource {
        fn new(files: &[(&'static str, &str)]) -> Self {
            Self {
                files: files
                    .iter()
                    .map(|(name, content)| (*name, content.to_string()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl SnapshotSource for InMemorySnapshotSource {
        async fn read(
            &self,
            _snapshot: &Path,
            input: SnapshotInput,
        ) -> Result<Option<String>, SnapshotError> {
            Ok(self.files.get(input.file_name()).cloned())
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        hosts: Mutex<Vec<String>>,
        index: Mutex<Option<(String, Vec<String>)>>,
    }

    #[async_trait]
    impl ReportPublisher for RecordingPublisher {
        async fn publish_host(
            &self,
            report: &HostReport,
            _config: &ReportConfig,
        ) -> Result<Vec<PathBuf>, PublishError> {
            self.hosts
                .lock()
                .unwrap()
                .push(report.inventory.machine().id.clone());
            Ok(vec![PathBuf::from("index.html")])
        }

        async fn publish_index(
            &self,
            index_html: &str,
            vm_csv: &[String],
            _config: &ReportConfig,
        ) -> Result<Vec<PathBuf>, PublishError> {
            *self.index.lock().unwrap() = Some((index_html.to_string(), vm_csv.to_vec()));
            Ok(vec![PathBuf::from("report.html")])
        }
    }

    fn make_service(
        files: &[(&'static str, &str)],
    ) -> (InventoryCollectionService, Arc<RecordingPublisher>) {
        let publisher = Arc::new(RecordingPublisher::default());
        let service = InventoryCollectionService::new(
            Arc::new(InMemorySnapshotSource::new(files)),
            publisher.clone(),
        );
        (service, publisher)
    }

    #[tokio::test]
    async fn test_end_to_end_snapshot() {
        let (service, _) = make_service(&[
            ("hw", HW),
            ("vm", "web01,running,2,2048,yes\n"),
            ("pv", "vg0,107374182400,53687091200\n"),
        ]);
        let report = service
            .generate_report(Path::new("/snap/hv"), &ReportConfig::default())
            .await
            .unwrap();

        let inventory = &report.inventory;
        assert_eq!(inventory.cpu_slot_count(), 2);
        assert_eq!(inventory.cpu_installed_count(), 1);
        assert_eq!(inventory.cpu_thread_total(), 8);
        assert_eq!(inventory.memory_slot_count(), 2);
        assert_eq!(inventory.memory_installed_count(), 2);
        assert_eq!(inventory.memory_installed_total_bytes(), 2 * 8_589_934_592);
        assert_eq!(inventory.physical_volumes().len(), 1);
        assert!(inventory.volume_groups().is_empty());
        assert_eq!(report.vm_csv, vec!["HOSTID;web01;yes;running;2;2"]);
        assert!(report.html.contains("HOSTID"));
    }

    #[tokio::test]
    async fn test_missing_pv_export() {
        let (service, _) = make_service(&[("hw", HW), ("vm", "")]);
        let err = service.load_inventory(Path::new("/snap/hv")).await.unwrap_err();
        assert_eq!(
            err,
            InventoryError::Snapshot(SnapshotError::MissingInput(PathBuf::from("/snap/hv/pv")))
        );
    }

    #[tokio::test]
    async fn test_missing_hardware_document() {
        let (service, _) = make_service(&[("vm", ""), ("pv", "")]);
        let err = service.load_inventory(Path::new("/snap")).await.unwrap_err();
        assert!(matches!(
            err,
            InventoryError::Snapshot(SnapshotError::MissingInput(_))
        ));
    }

    #[tokio::test]
    async fn test_blank_line_handling_differs_between_exports() {
        let (service, _) = make_service(&[
            ("hw", HW),
            ("vm", "a,running,1,1024,yes\n\nb,shut off,1,1024,no\n"),
            ("pv", "vg0,10,5\n"),
        ]);
        let inventory = service.load_inventory(Path::new("/snap")).await.unwrap();
        assert_eq!(inventory.vm_count(), 2);
        assert_eq!(inventory.virtual_machines()[0].name(), "a");
        assert_eq!(inventory.virtual_machines()[1].name(), "b");

        let (service, _) = make_service(&[("hw", HW), ("vm", ""), ("pv", "vg0,10,5\n\n")]);
        let err = service.load_inventory(Path::new("/snap")).await.unwrap_err();
        assert!(matches!(
            err,
            InventoryError::Parse(ParseError::MalformedRecord { export: "pv", .. })
        ));
    }

    #[tokio::test]
    async fn test_volume_groups_loaded_when_present() {
        let (service, _) = make_service(&[
            ("hw", HW),
            ("vm", ""),
            ("pv", ""),
            ("vg", "vg0,/dev/sda3,100,50\n"),
        ]);
        let inventory = service.load_inventory(Path::new("/snap")).await.unwrap();
        assert_eq!(inventory.volume_groups().len(), 1);
        assert_eq!(inventory.volume_groups()[0].pv, "/dev/sda3");
    }

    #[tokio::test]
    async fn test_publish_index_prepends_header_once() {
        let (service, publisher) = make_service(&[("hw", HW), ("vm", ""), ("pv", "")]);
        let config = ReportConfig::default();
        let report = service
            .generate_report(Path::new("/snap"), &config)
            .await
            .unwrap();
        service.publish_report(&report, &config).await.unwrap();

        let rows = vec!["HOSTID;web01;yes;running;2;2".to_string()];
        service
            .publish_index(&[report.summary()], &rows, &config)
            .await
            .unwrap();

        assert_eq!(*publisher.hosts.lock().unwrap(), vec!["HOSTID".to_string()]);
        let (index, csv) = publisher.index.lock().unwrap().clone().unwrap();
        assert!(index.contains("HOSTID/index.html"));
        assert_eq!(csv, vec![render::VM_CSV_HEADER.to_string(), rows[0].clone()]);
    }

    #[test]
    fn test_build_inventory_is_all_or_nothing() {
        let contents = SnapshotContents {
            hardware: HW.to_string(),
            virtual_machines: "web01,running,2,2048,yes\nbad\n".to_string(),
            physical_volumes: String::new(),
            volume_groups: None,
        };
        assert!(build_inventory(&contents).is_err());
    }

    #[test]
    fn test_host_directory_name() {
        assert_eq!(host_directory_name("hv01.example.com"), "hv01.example.com");
        assert_eq!(host_directory_name("rack 4/hv01"), "rack_4_hv01");
        assert_eq!(host_directory_name(".."), "__");
        assert_eq!(host_directory_name(""), "_");
    }

    #[test]
    fn test_distinct_ids_can_share_a_directory() {
        assert_eq!(host_directory_name("rack 1"), host_directory_name("rack_1"));
    }

    #[test]
    fn test_partition_host_collisions() {
        let ids = vec!["rack 1", "hv02", "rack_1", "hv02", "hv03"];
        let (kept, collisions) = partition_host_collisions(ids, |id| *id);

        assert_eq!(kept, vec!["rack 1", "hv02", "hv03"]);
        assert_eq!(
            collisions,
            vec![("rack_1", "rack_1".to_string()), ("hv02", "hv02".to_string())]
        );
    }

    #[test]
    fn test_partition_without_collisions_keeps_order() {
        let (kept, collisions) = partition_host_collisions(vec!["b", "a", "c"], |id| *id);
        assert_eq!(kept, vec!["b", "a", "c"]);
        assert!(collisions.is_empty());
    }
}
