// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Result, TLogTreeError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 10 MiB.
pub const DEFAULT_LOG_LIMIT: u64 = 10 * 1024 * 1024;

/// Where and how [`crate::FilePersistence`] stores the tree.
///
/// ```yaml
/// snapshot_path: /var/lib/tree/snapshot.json
/// log_path: /var/lib/tree/ops.log
/// log_limit: 1048576   # optional, bytes
/// sync: false          # optional
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TLogTreeConfig {
    /// File holding the compacted tree
    pub snapshot_path: PathBuf,

    /// File holding the operation log
    pub log_path: PathBuf,

    /// Size in bytes the log may reach before it is compacted (default: 10 MiB)
    #[serde(default = "default_log_limit")]
    pub log_limit: u64,

    /// Flush every append and snapshot to stable storage (default: true)
    #[serde(default = "default_sync")]
    pub sync: bool,
}

fn default_log_limit() -> u64 {
    DEFAULT_LOG_LIMIT
}
fn default_sync() -> bool {
    true
}

impl TLogTreeConfig {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(snapshot_path: P, log_path: Q) -> Self {
        Self {
            snapshot_path: snapshot_path.as_ref().to_path_buf(),
            log_path: log_path.as_ref().to_path_buf(),
            log_limit: default_log_limit(),
            sync: default_sync(),
        }
    }

    /// Snapshot and log named `snapshot.json` and `ops.log` inside `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join("snapshot.json"), dir.join("ops.log"))
    }

    #[must_use]
    pub fn with_log_limit(mut self, bytes: u64) -> Self {
        self.log_limit = bytes;
        self
    }

    #[must_use]
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(TLogTreeError::io(format!("reading config {}", path.display())))?;
        Self::from_yaml_str(&yaml)
    }
}
