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

use crate::domain::{
    HostReport, HostSummary, Inventory, InventoryError, PublishError, ReportConfig,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Primary port - Main interface offered by the inventory reporting domain
///
/// This is what external systems (CLI, library consumers) use to turn snapshot
/// directories into reports.
#[async_trait]
pub trait InventoryReportingService: Send + Sync {
    /// Load the inventory model of one snapshot directory
    ///
    /// # Arguments
    /// * `snapshot` - Directory holding the `hw`, `vm` and `pv` files
    ///
    /// # Returns
    /// * `Ok(Inventory)` - Fully built model
    /// * `Err(InventoryError)` - Missing input or parse failure; no partial model
    async fn load_inventory(&self, snapshot: &Path) -> Result<Inventory, InventoryError>;

    /// Load a snapshot and render its host page and VM rows
    ///
    /// # Arguments
    /// * `snapshot` - Snapshot directory
    /// * `config` - Report options
    ///
    /// # Returns
    /// * `Ok(HostReport)` - Model plus rendered outputs
    /// * `Err(InventoryError)` - Loading failed
    async fn generate_report(
        &self,
        snapshot: &Path,
        config: &ReportConfig,
    ) -> Result<HostReport, InventoryError>;

    /// Write one host's outputs
    ///
    /// # Returns
    /// * `Ok(Vec<PathBuf>)` - Files written
    /// * `Err(PublishError)` - Writing or serialization failed
    async fn publish_report(
        &self,
        report: &HostReport,
        config: &ReportConfig,
    ) -> Result<Vec<PathBuf>, PublishError>;

    /// Write the fleet index page and the combined VM CSV
    ///
    /// # Arguments
    /// * `hosts` - One summary per successfully loaded host
    /// * `vm_rows` - VM CSV rows of every host, without header
    /// * `config` - Report options
    async fn publish_index(
        &self,
        hosts: &[HostSummary],
        vm_rows: &[String],
        config: &ReportConfig,
    ) -> Result<Vec<PathBuf>, PublishError>;
}
