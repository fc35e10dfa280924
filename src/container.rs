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

//! Dependency injection container wiring adapters into the domain service

use crate::adapters::{FileReportPublisher, FileSystemSnapshotSource, TomlConfigurationProvider};
use crate::domain::{ConfigError, InventoryCollectionService, ReportConfig};
use crate::ports::{
    ConfigurationProvider, InventoryReportingService, ReportPublisher, SnapshotSource,
};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for the service container
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    /// TOML report configuration; built-in defaults when unset
    pub config_path: Option<PathBuf>,
    /// Upper bound on snapshots processed at the same time
    pub max_concurrency: usize,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            max_concurrency: 8,
        }
    }
}

/// Configuration provider returning a fixed [`ReportConfig`]
pub struct SimpleConfigurationProvider {
    config: ReportConfig,
}

impl SimpleConfigurationProvider {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ConfigurationProvider for SimpleConfigurationProvider {
    async fn get_report_config(&self) -> Result<ReportConfig, ConfigError> {
        Ok(self.config.clone())
    }
}

/// Dependency injection container
pub struct ServiceContainer {
    config: ContainerConfig,
}

impl ServiceContainer {
    pub fn new(config: ContainerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    pub fn create_snapshot_source(&self) -> Arc<dyn SnapshotSource> {
        Arc::new(FileSystemSnapshotSource::new())
    }

    pub fn create_report_publisher(&self) -> Arc<dyn ReportPublisher> {
        Arc::new(FileReportPublisher::new())
    }

    /// TOML file provider when a path is configured, defaults otherwise
    pub fn create_configuration_provider(&self) -> Arc<dyn ConfigurationProvider> {
        match &self.config.config_path {
            Some(path) => Arc::new(TomlConfigurationProvider::new(path.clone())),
            None => Arc::new(SimpleConfigurationProvider::new(ReportConfig::default())),
        }
    }

    /// Create the complete inventory reporting service
    pub fn create_inventory_service(&self) -> Arc<dyn InventoryReportingService> {
        Arc::new(InventoryCollectionService::new(
            self.create_snapshot_source(),
            self.create_report_publisher(),
        ))
    }

    /// Load the report configuration through the configured provider
    pub async fn load_report_config(&self) -> Result<ReportConfig, ConfigError> {
        self.create_configuration_provider()
            .get_report_config()
            .await
    }
}

impl Default for ServiceContainer {
    fn default() -> Self {
        Self::new(ContainerConfig::default())
    }
}

/// Builder for container configuration
pub struct ContainerConfigBuilder {
    config: ContainerConfig,
}

impl ContainerConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ContainerConfig::default(),
        }
    }

    pub fn config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config.config_path = path;
        self
    }

    /// Zero is raised to one
    pub fn max_concurrency(mut self, limit: usize) -> Self {
        self.config.max_concurrency = limit.max(1);
        self
    }

    pub fn build(self) -> ContainerConfig {
        self.config
    }
}

impl Default for ContainerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
