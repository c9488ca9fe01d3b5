// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

// Error types for TLogTree operations
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, TLogTreeError>;

#[derive(Debug, thiserror::Error)]
pub enum TLogTreeError {
    #[error("TinyTree error: {0}")]
    Tree(#[from] tinytree::Error),

    #[error("IO error {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt log record at offset {offset}: {source}. Record: {record}")]
    Encoding {
        offset: u64,
        record: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Corrupt snapshot {path}: {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Log record at offset {offset} does not apply: {source}")]
    Replay {
        offset: u64,
        #[source]
        source: tinytree::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_yaml_ng::Error),
}

impl TLogTreeError {
    pub(crate) fn io<S: Into<String>>(context: S) -> impl FnOnce(std::io::Error) -> Self {
        let context = context.into();
        move |source| TLogTreeError::Io { context, source }
    }
}

impl From<TLogTreeError> for tinytree::Error {
    fn from(err: TLogTreeError) -> Self {
        match err {
            TLogTreeError::Tree(inner) => inner,
            other => tinytree::Error::persistence(other),
        }
    }
}
