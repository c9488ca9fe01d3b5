// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! An in-memory tree of directories and values addressed by `/` paths.
//!
//! [`Tree`] holds the state, [`Persistence`] records every [`Operation`]
//! applied to it, and [`Store`] ties the two together so that an operation
//! is recorded before it becomes visible.

mod error;
mod node;
mod op;
mod path;
mod persistence;
mod store;
mod tree;

pub use error::{Error, Result};
pub use node::{Children, Node};
pub use op::Operation;
pub use path::{SEPARATOR, TreePath};
pub use persistence::{NoopPersistence, Persistence};
pub use store::Store;
pub use tree::Tree;

#[cfg(test)]
mod tests;
