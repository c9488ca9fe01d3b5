// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};

pub const SEPARATOR: char = '/';

/// A parsed `/`-delimited path.
///
/// One leading and one trailing separator are ignored, so `/a/b/`, `/a/b`
/// and `a/b` are the same path. An empty remainder is the root, which has
/// no segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreePath {
    segments: Vec<String>,
}

impl TreePath {
    pub fn parse<S: AsRef<str>>(path: S) -> Self {
        let path = path.as_ref();
        let path = path.strip_prefix(SEPARATOR).unwrap_or(path);
        let path = path.strip_suffix(SEPARATOR).unwrap_or(path);

        if path.is_empty() {
            return Self::root();
        }
        Self {
            segments: path.split(SEPARATOR).map(str::to_string).collect(),
        }
    }

    #[must_use]
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// All segments but the last. The root's parent is the root.
    #[must_use]
    pub fn parent(&self) -> &[String] {
        match self.segments.split_last() {
            Some((_, parent)) => parent,
            None => &[],
        }
    }

    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Split into parent segments and a non-empty final name, as required
    /// for a mutation target.
    pub fn split_target(&self) -> Result<(&[String], &str)> {
        match self.segments.split_last() {
            Some((name, parent)) if !name.is_empty() => Ok((parent, name)),
            _ => Err(Error::invalid_path(self.to_string())),
        }
    }
}

/// Join the first `len` segments the way error messages report them.
pub(crate) fn join_prefix(segments: &[String], len: usize) -> String {
    segments[..len].join("/")
}

impl std::fmt::Display for TreePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}
