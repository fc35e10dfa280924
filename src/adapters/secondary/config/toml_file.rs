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

//! Report configuration read from a TOML file

use crate::domain::{ConfigError, ReportConfig};
use crate::ports::ConfigurationProvider;
use async_trait::async_trait;
use log::debug;
use std::path::PathBuf;
use tokio::fs;

/// Loads [`ReportConfig`] from a TOML file; unset keys keep their defaults
pub struct TomlConfigurationProvider {
    path: PathBuf,
}

impl TomlConfigurationProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse configuration text
    ///
    /// # Arguments
    /// * `text` - TOML document
    ///
    /// # Returns
    /// * `Ok(ReportConfig)` - Parsed configuration
    /// * `Err(ConfigError::Invalid)` - Syntax error, unknown format or empty format list
    pub fn parse(text: &str) -> Result<ReportConfig, ConfigError> {
        let config: ReportConfig =
            toml::from_str(text).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if config.formats.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one output format is required".to_string(),
            ));
        }
        Ok(config)
    }
}

#[async_trait]
impl ConfigurationProvider for TomlConfigurationProvider {
    async fn get_report_config(&self) -> Result<ReportConfig, ConfigError> {
        let text = fs::read_to_string(&self.path)
            .await
            .map_err(|e| ConfigError::Io {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        debug!("Loaded configuration from {}", self.path.display());
        Self::parse(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::OutputFormat;
    use tempfile::tempdir;

    #[test]
    fn test_parse_full_config() {
        let config = TomlConfigurationProvider::parse(
            r#"
output_dir = "/srv/www/hypervisors"
formats = ["html", "csv", "json"]
csv_header = true
index_link = "../index.html"
"#,
        )
        .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/srv/www/hypervisors"));
        assert_eq!(
            config.formats,
            vec![OutputFormat::Html, OutputFormat::Csv, OutputFormat::Json]
        );
        assert!(config.csv_header);
        assert_eq!(config.index_link.as_deref(), Some("../index.html"));
    }

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let config = TomlConfigurationProvider::parse("csv_header = true\n").unwrap();
        assert!(config.csv_header);
        assert_eq!(config, ReportConfig {
            csv_header: true,
            ..ReportConfig::default()
        });
    }

    #[test]
    fn test_empty_index_link_disables_back_link() {
        let config = TomlConfigurationProvider::parse("index_link = \"\"\n").unwrap();
        assert_eq!(config.index_link, None);

        let config = TomlConfigurationProvider::parse("csv_header = false\n").unwrap();
        assert_eq!(config.index_link.as_deref(), Some("../report.html"));
    }

    #[test]
    fn test_parse_rejects_unknown_format() {
        let err = TomlConfigurationProvider::parse("formats = [\"pdf\"]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_parse_rejects_empty_formats() {
        let err = TomlConfigurationProvider::parse("formats = []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempdir().unwrap();
        let provider = TomlConfigurationProvider::new(dir.path().join("absent.toml"));
        let err = provider.get_report_config().await.unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[tokio::test]
    async fn test_read_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.toml");
        std::fs::write(&path, "output_dir = \"out\"\n").unwrap();

        let config = TomlConfigurationProvider::new(&path)
            .get_report_config()
            .await
            .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.formats, ReportConfig::default().formats);
    }
}
