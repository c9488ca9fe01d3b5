// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! File persistence for tinytree: a JSON-lines operation log in front of a
//! compacted JSON snapshot.

mod config;
mod error;
pub mod log;
mod persistence;
pub mod snapshot;

pub use config::{DEFAULT_LOG_LIMIT, TLogTreeConfig};
pub use error::{Result, TLogTreeError};
pub use persistence::FilePersistence;

use tinytree::Store;

/// Open the files named by `config` and restore a [`Store`] from them.
pub fn open_store(config: TLogTreeConfig) -> Result<Store<FilePersistence>> {
    let persistence = FilePersistence::open(config)?;
    Ok(Store::open(persistence)?)
}
