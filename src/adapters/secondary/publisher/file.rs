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

//! File-based report publisher writing host folders and the fleet index

use crate::domain::{host_directory_name, HostReport, PublishError, ReportConfig};
use crate::ports::{OutputFormat, ReportPublisher};
use async_trait::async_trait;
use log::debug;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Fleet index page, written at the root of the output directory
pub const INDEX_FILE: &str = "report.html";
/// Combined VM CSV of every host, written next to the index
pub const FLEET_CSV_FILE: &str = "vms.csv";

/// Writes reports under `<output_dir>/<host>/`
pub struct FileReportPublisher;

impl FileReportPublisher {
    pub fn new() -> Self {
        Self
    }

    /// Render one output format of a host report
    fn render_format(report: &HostReport, format: OutputFormat) -> Result<String, PublishError> {
        match format {
            OutputFormat::Html => Ok(report.html.clone()),
            OutputFormat::Csv => Ok(csv_content(&report.vm_csv)),
            OutputFormat::Json => serde_json::to_string_pretty(&report.inventory).map_err(|e| {
                PublishError::SerializationFailed(format!("JSON serialization failed: {}", e))
            }),
            OutputFormat::Toml => toml::to_string_pretty(&report.inventory).map_err(|e| {
                PublishError::SerializationFailed(format!("TOML serialization failed: {}", e))
            }),
        }
    }
}

impl Default for FileReportPublisher {
    fn default() -> Self {
        Self::new()
    }
}

/// CSV lines joined with trailing newline; no lines give an empty file
fn csv_content(lines: &[String]) -> String {
    lines.iter().map(|line| format!("{line}\n")).collect()
}

async fn ensure_directory(path: &Path) -> Result<(), PublishError> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| PublishError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to create directory: {}", e),
        })
}

async fn write_file(path: PathBuf, content: &str) -> Result<PathBuf, PublishError> {
    fs::write(&path, content)
        .await
        .map_err(|e| PublishError::Io {
            path: path.clone(),
            message: e.to_string(),
        })?;
    debug!("Wrote {}", path.display());
    Ok(path)
}

#[async_trait]
impl ReportPublisher for FileReportPublisher {
    async fn publish_host(
        &self,
        report: &HostReport,
        config: &ReportConfig,
    ) -> Result<Vec<PathBuf>, PublishError> {
        let directory = config
            .output_dir
            .join(host_directory_name(&report.inventory.machine().id));
        ensure_directory(&directory).await?;

        let mut written = Vec::with_capacity(config.formats.len());
        for format in &config.formats {
            let content = Self::render_format(report, *format)?;
            written.push(write_file(directory.join(format.file_name()), &content).await?);
        }
        Ok(written)
    }

    async fn publish_index(
        &self,
        index_html: &str,
        vm_csv: &[String],
        config: &ReportConfig,
    ) -> Result<Vec<PathBuf>, PublishError> {
        ensure_directory(&config.output_dir).await?;

        let index = write_file(config.output_dir.join(INDEX_FILE), index_html);
        let csv_text = csv_content(vm_csv);
        let csv = write_file(config.output_dir.join(FLEET_CSV_FILE), &csv_text);

        // Both files are independent
        let (index, csv) = tokio::join!(index, csv);
        Ok(vec![index?, csv?])
    }
}
