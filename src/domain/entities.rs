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

use crate::ports::OutputFormat;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Marker lshw puts in the description of an unpopulated socket or bank
pub const EMPTY_SLOT_MARKER: &str = "[empty]";

/// Identity of the hypervisor host (root system node of the lshw document)
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Machine {
    /// Node id, used as the host name in reports
    pub id: String,
    /// lshw class tag (usually "system")
    pub class: String,
    /// Product name
    pub product: String,
    /// Vendor
    pub vendor: String,
    /// Free-text description
    pub description: String,
    /// Chassis serial number
    pub serial: String,
    /// Product/SKU code from the `sku` configuration setting
    pub product_id: Option<String>,
}

/// One physical CPU socket
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct CpuSlot {
    /// Node id (e.g. "cpu:0")
    pub id: String,
    /// lshw class tag
    pub class: String,
    /// Processor model, empty for unpopulated sockets
    pub product: String,
    /// Processor vendor, empty for unpopulated sockets
    pub vendor: String,
    /// Description, carries the empty marker for unpopulated sockets
    pub description: String,
    /// Physical socket label
    pub slot: String,
    /// Minimum clock in Hz
    pub clock_min: u64,
    /// Maximum clock in Hz
    pub clock_max: u64,
    /// Bit width
    pub architecture: u32,
    /// Core count, `None` when unknown
    pub cores: Option<u32>,
    /// Thread count, `None` when unknown
    pub threads: Option<u32>,
}

impl CpuSlot {
    /// Whether the socket is unpopulated
    pub fn is_empty(&self) -> bool {
        self.description.contains(EMPTY_SLOT_MARKER)
    }
}

/// One DIMM bank
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct MemorySlot {
    /// Node id (e.g. "bank:0")
    pub id: String,
    /// lshw class tag
    pub class: String,
    /// Description, carries the empty marker for unpopulated banks
    pub description: String,
    /// Physical bank label
    pub slot: String,
    /// Size in bytes
    pub size: u64,
    /// Clock in Hz
    pub clock: u64,
}

impl MemorySlot {
    /// Whether the bank is unpopulated
    pub fn is_empty(&self) -> bool {
        self.description.contains(EMPTY_SLOT_MARKER)
    }
}

/// LVM physical volume
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct PhysicalVolume {
    pub name: String,
    pub size: u64,
    pub free: u64,
}

impl PhysicalVolume {
    /// Allocated space, in the same unit as `size`
    pub fn used(&self) -> u64 {
        self.size.saturating_sub(self.free)
    }
}

/// LVM volume group
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct VolumeGroup {
    pub name: String,
    /// Member physical volume name(s)
    pub pv: String,
    pub size: u64,
    pub free: u64,
}

/// A libvirt domain hosted on the hypervisor
///
/// The export gives memory in MiB; it is scaled by 1024 once, in
/// [`VirtualMachine::new`], and kept in KiB from then on.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct VirtualMachine {
    name: String,
    state: String,
    cpu: u32,
    memory: u64,
    autoboot: String,
}

impl VirtualMachine {
    /// Scaling applied to the exported memory value
    pub const MEMORY_SCALE: u64 = 1024;

    /// Build a virtual machine from export values
    ///
    /// Returns `None` when the scaled memory overflows.
    pub fn new(
        name: impl Into<String>,
        state: impl Into<String>,
        cpu: u32,
        memory: u64,
        autoboot: impl Into<String>,
    ) -> Option<Self> {
        Some(Self {
            name: name.into(),
            state: state.into(),
            cpu,
            memory: memory.checked_mul(Self::MEMORY_SCALE)?,
            autoboot: autoboot.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    /// Allocated virtual CPUs
    pub fn cpu(&self) -> u32 {
        self.cpu
    }

    /// Allocated memory in KiB
    pub fn memory(&self) -> u64 {
        self.memory
    }

    pub fn autoboot(&self) -> &str {
        &self.autoboot
    }

    pub fn is_running(&self) -> bool {
        self.state == "running"
    }
}

/// Field listing shared by every entity
///
/// Implementors expose `(name, value)` pairs; [`format_fields`] turns any such
/// list into text, and each entity's `Display` goes through it.
pub trait Describe {
    fn fields(&self) -> Vec<(&'static str, String)>;
}

/// Render a field list as `name : value` lines
pub fn format_fields(fields: &[(&'static str, String)]) -> String {
    fields
        .iter()
        .map(|(name, value)| format!("{name} : {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn or_unknown<T: ToString>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map_or_else(|| "unknown".to_string(), ToString::to_string)
}

impl Describe for Machine {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("id", self.id.clone()),
            ("class", self.class.clone()),
            ("product", self.product.clone()),
            ("vendor", self.vendor.clone()),
            ("description", self.description.clone()),
            ("serial", self.serial.clone()),
            ("product_id", or_unknown(&self.product_id)),
        ]
    }
}

impl Describe for CpuSlot {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("id", self.id.clone()),
            ("class", self.class.clone()),
            ("product", self.product.clone()),
            ("vendor", self.vendor.clone()),
            ("description", self.description.clone()),
            ("slot", self.slot.clone()),
            ("clock_min", self.clock_min.to_string()),
            ("clock_max", self.clock_max.to_string()),
            ("architecture", self.architecture.to_string()),
            ("cores", or_unknown(&self.cores)),
            ("threads", or_unknown(&self.threads)),
        ]
    }
}

impl Describe for MemorySlot {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("id", self.id.clone()),
            ("class", self.class.clone()),
            ("description", self.description.clone()),
            ("slot", self.slot.clone()),
            ("size", self.size.to_string()),
            ("clock", self.clock.to_string()),
        ]
    }
}

impl Describe for PhysicalVolume {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("size", self.size.to_string()),
            ("free", self.free.to_string()),
        ]
    }
}

impl Describe for VolumeGroup {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("pv", self.pv.clone()),
            ("size", self.size.to_string()),
            ("free", self.free.to_string()),
        ]
    }
}

impl Describe for VirtualMachine {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("autoboot", self.autoboot.clone()),
            ("state", self.state.clone()),
            ("cpu", self.cpu.to_string()),
            ("memory", self.memory.to_string()),
        ]
    }
}

macro_rules! display_via_fields {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&format_fields(&self.fields()))
                }
            }
        )+
    };
}

display_via_fields!(
    Machine,
    CpuSlot,
    MemorySlot,
    PhysicalVolume,
    VolumeGroup,
    VirtualMachine
);

/// Configuration for report generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory receiving per-host folders and the fleet index
    pub output_dir: PathBuf,
    /// Output files to produce for each host
    pub formats: Vec<OutputFormat>,
    /// Include the header row in per-host VM CSV files
    pub csv_header: bool,
    /// Link from each host page back to the fleet index; `""` in a config
    /// file turns it off
    #[serde(deserialize_with = "empty_as_none")]
    pub index_link: Option<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|link| !link.is_empty()))
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("report"),
            formats: vec![OutputFormat::Html, OutputFormat::Csv],
            csv_header: false,
            index_link: Some("../report.html".to_string()),
        }
    }
}
