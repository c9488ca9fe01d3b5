// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};
use crate::node::{Children, Node};
use crate::op::Operation;
use crate::path::{TreePath, join_prefix};
use diagnostics::debug;
use parking_lot::RwLock;

/// A directory root behind a readers-writer lock.
///
/// Reads share the lock; every mutation takes it exclusively, so a reader
/// never sees a partially applied operation.
#[derive(Debug)]
pub struct Tree {
    root: RwLock<Node>,
}

impl Tree {
    /// Create a tree over `root`, which must be a directory.
    pub fn new(root: Node) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::RootNotADirectory);
        }
        Ok(Self {
            root: RwLock::new(root),
        })
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            root: RwLock::new(Node::empty_dir()),
        }
    }

    /// Resolve `path` and return a copy of the node found there.
    pub fn get<S: AsRef<str>>(&self, path: S) -> Result<Node> {
        let path = TreePath::parse(path);
        let root = self.root.read();
        resolve(&root, path.segments()).cloned()
    }

    /// Create, replace (`Some`) or remove (`None`) the node at `path`.
    pub fn put<S: Into<String>>(&self, path: S, node: Option<Node>) -> Result<()> {
        self.apply(Operation::new(path, node))
    }

    pub fn apply(&self, op: Operation) -> Result<()> {
        self.apply_with(op, |_| Ok(()))
    }

    /// Apply `op` while holding the write lock, calling `commit` after the
    /// operation has been validated and before it is applied.
    ///
    /// If validation or `commit` fails the tree is left untouched. Removing an
    /// entry that does not exist succeeds without calling `commit`.
    pub fn apply_with<F>(&self, op: Operation, commit: F) -> Result<()>
    where
        F: FnOnce(&Operation) -> Result<()>,
    {
        let path = TreePath::parse(&op.path);
        let (parent, name) = path.split_target()?;

        let mut root = self.root.write();
        let children = parent_dir_mut(&mut root, parent)?;

        if op.node.is_none() && !children.contains_key(name) {
            debug!("remove of absent {path}", path: op.path.as_str());
            return Ok(());
        }

        commit(&op)?;

        match op.node {
            Some(node) => {
                debug!("put {path}", path: op.path.as_str());
                _ = children.insert(name.to_string(), node.detached());
            }
            None => {
                debug!("remove {path}", path: op.path.as_str());
                _ = children.remove(name);
            }
        }
        Ok(())
    }

    /// Run `f` against the root while holding the read lock.
    pub fn read<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&Node) -> R,
    {
        f(&*self.root.read())
    }

    /// A copy of the whole tree.
    #[must_use]
    pub fn root(&self) -> Node {
        self.root.read().clone()
    }

    #[must_use]
    pub fn into_root(self) -> Node {
        self.root.into_inner()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::empty()
    }
}

/// Walk `segments` from `root`. Errors carry the prefix reached: the
/// directory that turned out to be a value, or the first missing name.
fn resolve<'a>(root: &'a Node, segments: &[String]) -> Result<&'a Node> {
    let mut current = root;
    for (depth, segment) in segments.iter().enumerate() {
        current = match current {
            Node::Directory(children) => children
                .get(segment)
                .ok_or_else(|| Error::not_found(join_prefix(segments, depth + 1)))?,
            Node::Value(_) => return Err(Error::not_a_directory(join_prefix(segments, depth))),
        };
    }
    Ok(current)
}

fn resolve_mut<'a>(root: &'a mut Node, segments: &[String]) -> Result<&'a mut Node> {
    let mut current = root;
    for (depth, segment) in segments.iter().enumerate() {
        current = match current {
            Node::Directory(children) => children
                .get_mut(segment)
                .ok_or_else(|| Error::not_found(join_prefix(segments, depth + 1)))?,
            Node::Value(_) => return Err(Error::not_a_directory(join_prefix(segments, depth))),
        };
    }
    Ok(current)
}

fn parent_dir_mut<'a>(root: &'a mut Node, parent: &[String]) -> Result<&'a mut Children> {
    match resolve_mut(root, parent)? {
        Node::Directory(children) => Ok(children),
        Node::Value(_) => Err(Error::not_a_directory(join_prefix(parent, parent.len()))),
    }
}
