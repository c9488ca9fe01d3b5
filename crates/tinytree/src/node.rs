// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Children of a directory, ordered by name so that encoding is stable.
pub type Children = BTreeMap<String, Node>;

/// An entry in the tree: either a directory of named children or a value.
///
/// Encoded as `{"dir":{...}}` or `{"val":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    #[serde(rename = "dir")]
    Directory(Children),
    #[serde(rename = "val")]
    Value(String),
}

impl Node {
    #[must_use]
    pub fn empty_dir() -> Self {
        Node::Directory(Children::new())
    }

    pub fn value<S: Into<String>>(v: S) -> Self {
        Node::Value(v.into())
    }

    /// Build a directory from `(name, node)` pairs.
    pub fn dir<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Node)>,
        S: Into<String>,
    {
        Node::Directory(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    #[must_use]
    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Directory(_))
    }

    #[must_use]
    pub fn as_dir(&self) -> Option<&Children> {
        match self {
            Node::Directory(children) => Some(children),
            Node::Value(_) => None,
        }
    }

    #[must_use]
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Node::Value(v) => Some(v),
            Node::Directory(_) => None,
        }
    }

    /// The node as it may be attached to the tree: a directory loses its
    /// children, a value is unchanged.
    #[must_use]
    pub fn detached(self) -> Self {
        match self {
            Node::Directory(_) => Node::empty_dir(),
            value @ Node::Value(_) => value,
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        Node::empty_dir()
    }
}
