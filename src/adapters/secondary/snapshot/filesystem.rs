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

//! Snapshot source reading `hw`, `vm`, `pv` and `vg` files from a directory

use crate::domain::SnapshotError;
use crate::ports::{SnapshotInput, SnapshotSource};
use async_trait::async_trait;
use log::trace;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

/// Reads snapshot files from the local file system
pub struct FileSystemSnapshotSource;

impl FileSystemSnapshotSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileSystemSnapshotSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotSource for FileSystemSnapshotSource {
    async fn read(
        &self,
        snapshot: &Path,
        input: SnapshotInput,
    ) -> Result<Option<String>, SnapshotError> {
        let path = snapshot.join(input.file_name());
        trace!("Reading {}", path.display());

        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SnapshotError::Io {
                path,
                message: e.to_string(),
            }),
        }
    }
}
