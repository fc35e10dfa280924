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

use crate::domain::SnapshotError;
use async_trait::async_trait;
use std::fmt;
use std::path::Path;

/// Files making up a snapshot directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotInput {
    /// `lshw -xml` document
    Hardware,
    /// VM export (`name,state,vcpu,memory,autoboot`)
    VirtualMachines,
    /// PV export (`name,size,free`)
    PhysicalVolumes,
    /// Optional VG export (`name,pv,size,free`)
    VolumeGroups,
}

impl SnapshotInput {
    /// File name inside the snapshot directory
    pub fn file_name(&self) -> &'static str {
        match self {
            SnapshotInput::Hardware => "hw",
            SnapshotInput::VirtualMachines => "vm",
            SnapshotInput::PhysicalVolumes => "pv",
            SnapshotInput::VolumeGroups => "vg",
        }
    }
}

impl fmt::Display for SnapshotInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Secondary port - Snapshot reading abstraction
///
/// This interface abstracts where snapshot files come from so the loader can be
/// driven from disk or from in-memory fixtures.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Read one input of a snapshot
    ///
    /// # Arguments
    /// * `snapshot` - Snapshot directory
    /// * `input` - Which file to read
    ///
    /// # Returns
    /// * `Ok(Some(String))` - File contents
    /// * `Ok(None)` - The file does not exist
    /// * `Err(SnapshotError)` - The file exists but could not be read
    async fn read(
        &self,
        snapshot: &Path,
        input: SnapshotInput,
    ) -> Result<Option<String>, SnapshotError>;
}
