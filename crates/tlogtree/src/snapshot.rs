// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The snapshot file: one JSON-encoded root [`Node`].
//!
//! A new snapshot is staged in two steps. It is written to `<snapshot>.tmp`
//! and synced, then renamed to `<snapshot>.next`. Only a complete snapshot
//! ever carries the `.next` name. Publishing renames `.next` over the
//! snapshot itself.

use crate::error::{Result, TLogTreeError};
use diagnostics::debug;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tinytree::Node;

const STAGING_SUFFIX: &str = ".tmp";
const PENDING_SUFFIX: &str = ".next";

#[derive(Debug)]
pub struct SnapshotFile {
    path: PathBuf,
    file: File,
    sync: bool,
}

pub fn encode(root: &Node) -> Result<Vec<u8>> {
    serde_json::to_vec(root).map_err(TLogTreeError::Serialize)
}

/// Decode snapshot bytes. An empty snapshot is an empty directory.
pub fn decode(bytes: &[u8], path: &Path) -> Result<Node> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Node::empty_dir());
    }
    serde_json::from_slice(bytes).map_err(|source| TLogTreeError::Snapshot {
        path: path.to_path_buf(),
        source,
    })
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn open_rw(path: &Path) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(TLogTreeError::io(format!("opening snapshot {}", path.display())))
}

/// Make renames inside the snapshot's directory durable.
#[cfg(unix)]
fn sync_parent(path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    File::open(parent)
        .and_then(|dir| dir.sync_all())
        .map_err(TLogTreeError::io(format!("syncing directory {}", parent.display())))
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> Result<()> {
    Ok(())
}

impl SnapshotFile {
    /// Open or create the snapshot at `path`.
    pub fn open<P: AsRef<Path>>(path: P, sync: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = open_rw(&path)?;
        Ok(Self { path, file, sync })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn staging_path(&self) -> PathBuf {
        with_suffix(&self.path, STAGING_SUFFIX)
    }

    #[must_use]
    pub fn pending_path(&self) -> PathBuf {
        with_suffix(&self.path, PENDING_SUFFIX)
    }

    /// Read and decode the current snapshot.
    pub fn load(&mut self) -> Result<Node> {
        let mut bytes = Vec::new();
        _ = self
            .file
            .seek(SeekFrom::Start(0))
            .map_err(TLogTreeError::io("rewinding snapshot"))?;
        _ = self
            .file
            .read_to_end(&mut bytes)
            .map_err(TLogTreeError::io(format!("reading snapshot {}", self.path.display())))?;
        decode(&bytes, &self.path)
    }

    /// Write `root` as the pending snapshot. Nothing visible to [`Self::load`]
    /// changes until [`Self::publish`].
    pub fn stage(&self, root: &Node) -> Result<()> {
        let bytes = encode(root)?;
        let staging = self.staging_path();
        let pending = self.pending_path();

        let mut file = File::create(&staging)
            .map_err(TLogTreeError::io(format!("creating {}", staging.display())))?;
        file.write_all(&bytes)
            .map_err(TLogTreeError::io(format!("writing {}", staging.display())))?;
        if self.sync {
            file.sync_all()
                .map_err(TLogTreeError::io(format!("syncing {}", staging.display())))?;
        }
        drop(file);

        std::fs::rename(&staging, &pending)
            .map_err(TLogTreeError::io(format!("renaming {}", staging.display())))?;
        if self.sync {
            sync_parent(&self.path)?;
        }

        debug!("staged snapshot of {size} bytes", size: bytes.len());
        Ok(())
    }

    /// Whether a complete staged snapshot is waiting to be published.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending_path().exists()
    }

    /// Replace the snapshot with the pending one and reopen it. If the rename
    /// already happened only the sync and reopen are repeated.
    pub fn publish(&mut self) -> Result<()> {
        let pending = self.pending_path();
        if pending.exists() {
            std::fs::rename(&pending, &self.path)
                .map_err(TLogTreeError::io(format!("renaming {}", pending.display())))?;
        }
        if self.sync {
            sync_parent(&self.path)?;
        }
        self.file = open_rw(&self.path)?;
        Ok(())
    }

    /// Remove a staging file left behind by a crash before it was complete.
    pub fn discard_staging(&self) -> Result<bool> {
        let staging = self.staging_path();
        match std::fs::remove_file(&staging) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(TLogTreeError::Io {
                context: format!("removing {}", staging.display()),
                source: e,
            }),
        }
    }

    pub fn sync_all(&self) -> Result<()> {
        self.file
            .sync_all()
            .map_err(TLogTreeError::io(format!("syncing snapshot {}", self.path.display())))
    }
}
