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

use crate::domain::{HostReport, PublishError, ReportConfig};
use async_trait::async_trait;
use std::path::PathBuf;

/// Secondary port - Report publishing abstraction
///
/// This interface abstracts how rendered reports are stored, allowing for
/// different implementations (local files, object storage, etc.)
#[async_trait]
pub trait ReportPublisher: Send + Sync {
    /// Store the outputs of one host
    ///
    /// # Arguments
    /// * `report` - Rendered host report
    /// * `config` - Output directory and formats
    ///
    /// # Returns
    /// * `Ok(Vec<PathBuf>)` - Locations written
    /// * `Err(PublishError)` - Error occurred during write
    async fn publish_host(
        &self,
        report: &HostReport,
        config: &ReportConfig,
    ) -> Result<Vec<PathBuf>, PublishError>;

    /// Store fleet-level outputs
    ///
    /// # Arguments
    /// * `index_html` - Rendered index page
    /// * `vm_csv` - Combined VM CSV lines, header included
    /// * `config` - Output directory
    async fn publish_index(
        &self,
        index_html: &str,
        vm_csv: &[String],
        config: &ReportConfig,
    ) -> Result<Vec<PathBuf>, PublishError>;
}
