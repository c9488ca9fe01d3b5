// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use crate::node::Node;
use crate::op::Operation;
use crate::tree::Tree;

/// How a tree records its mutations so that it can be rebuilt later.
pub trait Persistence: Send + Sync {
    /// Durably record `op`. Called before the operation is applied.
    fn record(&self, op: &Operation) -> Result<()>;

    /// Rebuild the tree from whatever has been recorded.
    fn restore(&self) -> Result<Tree>;

    /// Replace recorded history with `root`, which must reflect every
    /// operation recorded so far.
    fn compact(&self, _root: &Node) -> Result<()> {
        Ok(())
    }
}

/// Persistence that records nothing and always restores an empty tree.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPersistence;

impl Persistence for NoopPersistence {
    fn record(&self, _op: &Operation) -> Result<()> {
        Ok(())
    }

    fn restore(&self) -> Result<Tree> {
        Ok(Tree::empty())
    }
}

impl<P: Persistence + ?Sized> Persistence for Box<P> {
    fn record(&self, op: &Operation) -> Result<()> {
        (**self).record(op)
    }

    fn restore(&self) -> Result<Tree> {
        (**self).restore()
    }

    fn compact(&self, root: &Node) -> Result<()> {
        (**self).compact(root)
    }
}
