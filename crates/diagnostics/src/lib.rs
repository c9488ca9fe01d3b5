// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Logging for the tinytree crates.
//!
//! Output goes to stderr and is controlled by the `TINYTREE_LOG`
//! environment variable:
//! - `TINYTREE_LOG=off` (default) - no logs
//! - `TINYTREE_LOG=info` - restores, compactions
//! - `TINYTREE_LOG=debug` - every put and log append

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable read by [`init_diagnostics`].
pub const LOG_ENV: &str = "TINYTREE_LOG";

static INIT: Once = Once::new();

/// Map a `TINYTREE_LOG` value to a minimum level.
///
/// `Ok(None)` means logging is off. Unknown values are returned as the error
/// so the caller can report them.
pub fn parse_level(value: &str) -> Result<Option<emit::Level>, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "off" => Ok(None),
        "debug" => Ok(Some(emit::Level::Debug)),
        "info" => Ok(Some(emit::Level::Info)),
        "warn" => Ok(Some(emit::Level::Warn)),
        "error" => Ok(Some(emit::Level::Error)),
        other => Err(other.to_string()),
    }
}

/// Initialize diagnostics from the `TINYTREE_LOG` environment variable.
///
/// Safe to call more than once; only the first call has any effect.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let value = std::env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());

        let (level, unknown) = match parse_level(&value) {
            Ok(None) => return,
            Ok(Some(level)) => (level, None),
            Err(unknown) => (emit::Level::Info, Some(unknown)),
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        if let Some(unknown) = unknown {
            emit::warn!("unknown {var} value {unknown}, using info", var: LOG_ENV, unknown);
        }

        // The runtime must outlive every emitter for the rest of the process.
        std::mem::forget(rt);
    });
}

/// Log routine operations: restores, compactions, opens.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log per-operation detail: puts, appends, replayed records.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log conditions that were recovered from, such as an interrupted compaction.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log failures that are about to be returned to the caller.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

pub use init_diagnostics as init;
