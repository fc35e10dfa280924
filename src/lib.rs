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

//! Hypervisor Report Library
//!
//! This library turns hypervisor snapshots (an `lshw -xml` document plus VM
//! and LVM exports) into an inventory model and renders it as HTML pages and
//! CSV using a Ports and Adapters (Hexagonal) architecture.
//!
//! # Architecture
//!
//! - **Domain**: Inventory entities, parsers and the collection service
//! - **Ports**: Interfaces for snapshot sources, publishers and configuration
//! - **Adapters**: File system implementations of the ports
//! - **Render**: HTML and CSV presentation of the model
//!
//! # Usage
//!
//! ```rust,no_run
//! use hypervisor_report::{InventoryReportingService, ReportConfig};
//! use std::path::Path;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = hypervisor_report::create_service(None);
//!
//!     let config = ReportConfig::default();
//!     let report = service.generate_report(Path::new("snapshots/hv01"), &config).await?;
//!     service.publish_report(&report, &config).await?;
//!
//!     println!("{}", report.inventory.machine());
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod container;
pub mod domain;
pub mod ports;
pub mod render;

pub use adapters::{FileReportPublisher, FileSystemSnapshotSource, TomlConfigurationProvider};
pub use container::{
    ContainerConfig, ContainerConfigBuilder, ServiceContainer, SimpleConfigurationProvider,
};
pub use domain::{
    ConfigError, CpuSlot, HostReport, HostSummary, Inventory, InventoryError, Machine,
    MemorySlot, ParseError, PhysicalVolume, PublishError, ReportConfig, SnapshotError,
    VirtualMachine, VolumeGroup,
};
pub use ports::{
    ConfigurationProvider, InventoryReportingService, OutputFormat, ReportPublisher,
    SnapshotInput, SnapshotSource,
};

use std::path::Path;
use std::sync::Arc;

/// Create an inventory reporting service backed by the local file system
///
/// # Arguments
/// * `container_config` - Optional container configuration
///
/// # Returns
/// * Configured inventory reporting service
pub fn create_service(
    container_config: Option<ContainerConfig>,
) -> Arc<dyn InventoryReportingService> {
    ServiceContainer::new(container_config.unwrap_or_default()).create_inventory_service()
}

/// Load the inventory of one snapshot directory
///
/// # Arguments
/// * `snapshot` - Directory holding `hw`, `vm`, `pv` and optionally `vg`
///
/// # Returns
/// * `Ok(Inventory)` - Complete model
/// * `Err(InventoryError)` - Missing input or parse failure
///
/// # Example
///
/// ```rust,no_run
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let inventory = hypervisor_report::load_snapshot("snapshots/hv01").await?;
///     println!("{} vms", inventory.vm_count());
///     Ok(())
/// }
/// ```
pub async fn load_snapshot(snapshot: impl AsRef<Path>) -> Result<Inventory, InventoryError> {
    create_service(None).load_inventory(snapshot.as_ref()).await
}
