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

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning raw snapshot contents into domain entities
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The hardware document is not well formed or has no system node
    #[error("Malformed hardware document: {0}")]
    MalformedDocument(String),
    /// A node lacks an attribute or child element the model requires
    #[error("Node '{node}' is missing required field '{field}'")]
    MissingField { node: String, field: String },
    /// A delimited export line does not have the expected field count
    #[error("Malformed {export} record on line {line}: expected {expected} fields, found {found}")]
    MalformedRecord {
        export: &'static str,
        line: usize,
        expected: usize,
        found: usize,
    },
    /// A numeric field could not be parsed as a non-negative integer
    #[error("Invalid number for '{field}': '{value}'")]
    InvalidNumber { field: String, value: String },
}

impl ParseError {
    pub(crate) fn missing(node: &str, field: &str) -> Self {
        ParseError::MissingField {
            node: node.to_string(),
            field: field.to_string(),
        }
    }
}

/// Errors raised by snapshot sources (not exposed past the loader)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// A required input file does not exist in the snapshot directory
    #[error("Missing snapshot input: {}", .0.display())]
    MissingInput(PathBuf),
    /// Reading an input file failed for another reason
    #[error("Failed to read {}: {message}", path.display())]
    Io { path: PathBuf, message: String },
}

/// Errors returned by the inventory loader
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// Snapshot input could not be read
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    /// Snapshot input could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Errors specific to publishing rendered reports
#[derive(Debug, Clone, Error)]
pub enum PublishError {
    /// Writing an output file failed
    #[error("Failed to write {}: {message}", path.display())]
    Io { path: PathBuf, message: String },
    /// Serializing the inventory failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),
}

/// Errors raised while loading report configuration
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read configuration {}: {message}", path.display())]
    Io { path: PathBuf, message: String },
    /// The configuration file is not valid
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
