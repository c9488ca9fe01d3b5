// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use crate::node::Node;
use crate::op::Operation;
use crate::persistence::Persistence;
use crate::tree::Tree;
use diagnostics::info;

/// The live tree together with the persistence that records it.
///
/// Every mutation is validated, recorded, then applied, all under the
/// tree's write lock, so the record order is the apply order.
#[derive(Debug)]
pub struct Store<P: Persistence> {
    tree: Tree,
    persistence: P,
}

impl<P: Persistence> Store<P> {
    /// Restore the tree from `persistence` and take ownership of both.
    pub fn open(persistence: P) -> Result<Self> {
        let tree = persistence.restore()?;
        info!("store opened");
        Ok(Self { tree, persistence })
    }

    pub fn put<S: Into<String>>(&self, path: S, node: Option<Node>) -> Result<()> {
        let op = Operation::new(path, node);
        self.tree.apply_with(op, |op| self.persistence.record(op))
    }

    pub fn get<S: AsRef<str>>(&self, path: S) -> Result<Node> {
        self.tree.get(path)
    }

    /// Compact recorded history down to the current tree. Writers wait
    /// until the compaction finishes.
    pub fn compact(&self) -> Result<()> {
        self.tree.read(|root| self.persistence.compact(root))
    }

    /// A copy of the whole tree. The live tree is only reachable through
    /// [`Self::put`], so every change is recorded.
    #[must_use]
    pub fn root(&self) -> Node {
        self.tree.root()
    }

    #[must_use]
    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Give up the tree and return the persistence, e.g. to close it.
    pub fn into_persistence(self) -> P {
        self.persistence
    }
}
