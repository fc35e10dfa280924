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

use crate::domain::{ConfigError, ReportConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Secondary port - Configuration provider abstraction
///
/// This interface abstracts how configuration is loaded and managed,
/// allowing for different sources (CLI args, files, environment, etc.)
#[async_trait]
pub trait ConfigurationProvider: Send + Sync {
    /// Get report generation configuration
    ///
    /// # Returns
    /// * `Ok(ReportConfig)` - Report configuration
    /// * `Err(ConfigError)` - Error loading configuration
    async fn get_report_config(&self) -> Result<ReportConfig, ConfigError>;
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Host page
    Html,
    /// VM rows
    Csv,
    /// Inventory model as JSON
    Json,
    /// Inventory model as TOML
    Toml,
}

impl OutputFormat {
    /// File written in a host's output folder for this format
    pub fn file_name(&self) -> &'static str {
        match self {
            OutputFormat::Html => "index.html",
            OutputFormat::Csv => "vms.csv",
            OutputFormat::Json => "inventory.json",
            OutputFormat::Toml => "inventory.toml",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "toml" => Ok(OutputFormat::Toml),
            _ => Err("Output format must be one of 'html', 'csv', 'json' or 'toml'".to_string()),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Html => write!(f, "HTML"),
            OutputFormat::Csv => write!(f, "CSV"),
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Toml => write!(f, "TOML"),
        }
    }
}
