// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::node::Node;
use serde::{Deserialize, Serialize};

/// A recorded tree mutation: the node to place at `path`, or `None` to
/// remove whatever is there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub path: String,
    pub node: Option<Node>,
}

impl Operation {
    /// An operation whose node has already been detached from any children.
    pub fn new<S: Into<String>>(path: S, node: Option<Node>) -> Self {
        Self {
            path: path.into(),
            node: node.map(Node::detached),
        }
    }

    pub fn put<S: Into<String>>(path: S, node: Node) -> Self {
        Self::new(path, Some(node))
    }

    pub fn delete<S: Into<String>>(path: S) -> Self {
        Self::new(path, None)
    }

    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.node.is_none()
    }
}
