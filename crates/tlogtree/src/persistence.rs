// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::config::TLogTreeConfig;
use crate::error::{Result, TLogTreeError};
use crate::log::{self, OpLog};
use crate::snapshot::SnapshotFile;
use diagnostics::{debug, info, warn};
use parking_lot::Mutex;
use tinytree::{Node, Operation, Persistence, Tree};

/// Persistence over a snapshot file and a write-ahead operation log.
///
/// Operations are appended to the log. Once the log would grow past
/// `log_limit`, the snapshot and log are folded into a new snapshot and the
/// log starts over. Restoring loads the snapshot and replays the log.
#[derive(Debug)]
pub struct FilePersistence {
    config: TLogTreeConfig,
    state: Mutex<State>,
}

#[derive(Debug)]
struct State {
    snapshot: SnapshotFile,
    log: OpLog,
    /// A compaction staged its snapshot but has not yet published it. Until
    /// it does, the log must not take new records.
    pending: bool,
}

/// What a replay of the log over the snapshot produced.
struct Rebuilt {
    tree: Tree,
    replayed: u64,
    end: u64,
}

impl FilePersistence {
    /// Open (creating if needed) the snapshot and log named in `config`.
    ///
    /// A compaction that was interrupted after its snapshot was staged is
    /// finished here, before anything reads the files.
    pub fn open(config: TLogTreeConfig) -> Result<Self> {
        let snapshot = SnapshotFile::open(&config.snapshot_path, config.sync)?;
        let log = OpLog::open(&config.log_path, config.sync)?;

        if snapshot.discard_staging()? {
            warn!(
                "discarded incomplete snapshot {path}",
                path: snapshot.staging_path().display().to_string()
            );
        }
        let pending = snapshot.has_pending();
        let mut state = State {
            snapshot,
            log,
            pending,
        };
        if state.pending {
            warn!(
                "finishing interrupted compaction of {path}",
                path: state.snapshot.path().display().to_string()
            );
            finish_pending(&mut state)?;
        }

        info!(
            "opened snapshot {snapshot_path} and log {log_path} at offset {offset}",
            snapshot_path: config.snapshot_path.display().to_string(),
            log_path: config.log_path.display().to_string(),
            offset: state.log.offset()
        );

        Ok(Self {
            config,
            state: Mutex::new(state),
        })
    }

    #[must_use]
    pub fn config(&self) -> &TLogTreeConfig {
        &self.config
    }

    /// Where the next log record will be written.
    #[must_use]
    pub fn log_offset(&self) -> u64 {
        self.state.lock().log.offset()
    }

    /// Append `op` to the log, compacting first if the append would take
    /// the log past its limit.
    ///
    /// A compaction that failed after staging is finished before anything
    /// else is written. If that fails again the append is refused.
    pub fn append(&self, op: &Operation) -> Result<()> {
        let bytes = log::encode(op)?;
        let mut state = self.state.lock();
        finish_pending(&mut state)?;

        let offset = state.log.offset();
        if offset > 0 && offset + bytes.len() as u64 > self.config.log_limit {
            info!(
                "log at {offset} bytes reached limit {limit}, compacting",
                offset,
                limit: self.config.log_limit
            );
            let rebuilt = rebuild(&mut state)?;
            compact_into(&mut state, &rebuilt.tree.into_root())?;
        }

        _ = state.log.append_encoded(&bytes)?;
        Ok(())
    }

    /// Load the snapshot and replay every logged operation over it.
    pub fn load(&self) -> Result<Tree> {
        let mut state = self.state.lock();
        finish_pending(&mut state)?;
        let rebuilt = rebuild(&mut state)?;
        state.log.set_offset(rebuilt.end);

        info!(
            "restored tree, replayed {replayed} operations, log ends at {end}",
            replayed: rebuilt.replayed,
            end: rebuilt.end
        );
        Ok(rebuilt.tree)
    }

    /// Make `root` the snapshot and empty the log. `root` must already
    /// reflect every logged operation.
    pub fn write_snapshot(&self, root: &Node) -> Result<()> {
        let mut state = self.state.lock();
        finish_pending(&mut state)?;
        compact_into(&mut state, root)
    }

    /// Sync and release both files. Both are attempted; the first error is
    /// returned.
    pub fn close(self) -> Result<()> {
        let state = self.state.into_inner();
        let snapshot = state.snapshot.sync_all();
        let log = state.log.sync_all();
        drop(state);
        snapshot.and(log)
    }
}

fn rebuild(state: &mut State) -> Result<Rebuilt> {
    let root = state.snapshot.load()?;
    let tree = Tree::new(root)?;

    let mut replayed = 0;
    let mut records = state.log.records()?;
    for record in records.by_ref() {
        let record = record?;
        let op = record.decode()?;
        debug!("replaying {path} at offset {offset}", path: op.path.as_str(), offset: record.offset);
        tree.apply(op).map_err(|source| TLogTreeError::Replay {
            offset: record.offset,
            source,
        })?;
        replayed += 1;
    }
    let end = records.position();

    Ok(Rebuilt {
        tree,
        replayed,
        end,
    })
}

/// Stage `root`, truncate the log, then publish. A crash between the steps
/// leaves a complete `.next` snapshot for [`FilePersistence::open`] to finish.
/// An error between the steps leaves `pending` set, so the next call into
/// the persistence finishes the job instead of appending.
fn compact_into(state: &mut State, root: &Node) -> Result<()> {
    let dropped = state.log.offset();
    let staged = state.snapshot.stage(root);
    state.pending = state.snapshot.has_pending();
    staged?;
    finish_pending(state)?;
    info!("compacted {dropped} log bytes into snapshot", dropped);
    Ok(())
}

/// Truncate the log and publish the staged snapshot, if there is one. Both
/// steps may be repeated after a partial failure.
fn finish_pending(state: &mut State) -> Result<()> {
    if !state.pending {
        return Ok(());
    }
    state.log.truncate()?;
    state.snapshot.publish()?;
    state.pending = false;
    Ok(())
}

impl Persistence for FilePersistence {
    fn record(&self, op: &Operation) -> tinytree::Result<()> {
        Ok(self.append(op)?)
    }

    fn restore(&self) -> tinytree::Result<Tree> {
        Ok(self.load()?)
    }

    fn compact(&self, root: &Node) -> tinytree::Result<()> {
        Ok(self.write_snapshot(root)?)
    }
}
