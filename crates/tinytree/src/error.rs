// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub type Result<T> = std::result::Result<T, Error>;

/// Represents errors that can occur in tree operations.
///
/// Path-carrying variants hold the joined prefix that traversal actually
/// reached, which may be shorter than the requested path.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Invalid path for mutation: {0:?}")]
    InvalidPath(String),

    #[error("Tree root must be a directory")]
    RootNotADirectory,

    #[error("Persistence error: {0}")]
    Persistence(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub fn not_found<S: Into<String>>(path: S) -> Self {
        Error::NotFound(path.into())
    }

    pub fn not_a_directory<S: Into<String>>(path: S) -> Self {
        Error::NotADirectory(path.into())
    }

    pub fn invalid_path<S: Into<String>>(path: S) -> Self {
        Error::InvalidPath(path.into())
    }

    /// Wrap an error raised by a persistence implementation.
    pub fn persistence<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Persistence(Box::new(err))
    }

    /// The traversal prefix carried by this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::NotFound(p) | Error::NotADirectory(p) | Error::InvalidPath(p) => Some(p),
            Error::RootNotADirectory | Error::Persistence(_) => None,
        }
    }

    /// The wrapped persistence error, if this is one.
    #[must_use]
    pub fn persistence_source(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Error::Persistence(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}
