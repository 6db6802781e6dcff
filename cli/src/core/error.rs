//! # carchive Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error taxonomy used by the component archive
//! subsystem. Every failure the library can report falls into one of the
//! variants of [`ArchiveError`]; the variant tells the caller *what kind* of
//! failure happened, while the underlying cause (usually a `std::io::Error`)
//! is kept in the `anyhow` error chain.
//!
//! ## Architecture
//!
//! The error system consists of two parts:
//! - `ArchiveError`: A `thiserror` enum naming each failure class.
//! - `Result<T>`: A type alias for `anyhow::Result<T>`.
//!
//! Typed errors reach callers in one of two shapes:
//! - Raised directly with `anyhow::bail!(ArchiveError::...)` when there is no
//!   lower-level cause (validation failures, writer sequencing violations).
//! - Attached as *context* on top of an I/O error with
//!   `.with_context(|| ArchiveError::...)`. The I/O error stays in the chain,
//!   and `downcast_ref::<ArchiveError>()` still returns the typed context.
//!
//! No function in this crate retries on error: validation errors are final,
//! and a half-written tar or gzip stream cannot be resumed.
//!
//! ## Examples
//!
//! ```rust
//! use carchive::core::error::ArchiveError;
//!
//! # fn classify(err: &anyhow::Error) -> &'static str {
//! match err.downcast_ref::<ArchiveError>() {
//!     Some(ArchiveError::UnsupportedFormat { .. }) => "bad format flag",
//!     Some(ArchiveError::DestinationUnavailable { .. }) => "cannot open output",
//!     Some(_) => "archive failure",
//!     None => "other failure",
//! }
//! # }
//! ```
//!
use crate::component::format::allowed_formats;
use std::path::PathBuf;
use thiserror::Error;

/// Failure classes of the component archive subsystem.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The format token is not one of the supported encodings.
    #[error(
        "unsupported output format {value:?}, use {} or leave it empty to be defaulted",
        allowed_formats()
    )]
    UnsupportedFormat { value: String },

    /// The destination could not be opened or created.
    #[error("unable to open destination '{}'", path.display())]
    DestinationUnavailable { path: PathBuf },

    /// Writing the archive failed part-way through.
    #[error("unable to write component archive to '{}'", path.display())]
    EncodingFailed { path: PathBuf },

    /// An archive writer was driven out of order. This is a bug in the caller.
    #[error("invalid archive writer state: cannot {action} while {state}")]
    InvalidWriterState {
        state: &'static str,
        action: &'static str,
    },

    /// The archive was written but flushing or closing the destination failed.
    #[error("unable to close '{}' after writing", path.display())]
    CloseFailed { path: PathBuf },

    /// The archive content violates the component archive layout.
    #[error("invalid component archive: {0}")]
    InvalidArchive(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Type alias for Result using anyhow::Error, so typed errors and their
/// underlying causes travel together.
pub type Result<T> = anyhow::Result<T>;

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use std::io;

    #[test]
    fn test_error_display() {
        let unsupported = ArchiveError::UnsupportedFormat {
            value: "zip".into(),
        };
        assert_eq!(
            unsupported.to_string(),
            r#"unsupported output format "zip", use "fs", "tar", "tgz" or leave it empty to be defaulted"#
        );

        let unavailable = ArchiveError::DestinationUnavailable {
            path: PathBuf::from("/tmp/out.tar"),
        };
        assert_eq!(
            unavailable.to_string(),
            "unable to open destination '/tmp/out.tar'"
        );

        let state = ArchiveError::InvalidWriterState {
            state: "finalized",
            action: "add a blob",
        };
        assert_eq!(
            state.to_string(),
            "invalid archive writer state: cannot add a blob while finalized"
        );
    }

    #[test]
    fn test_context_error_keeps_type_and_cause() {
        let result: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        let err = result
            .with_context(|| ArchiveError::EncodingFailed {
                path: PathBuf::from("out.tgz"),
            })
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ArchiveError>(),
            Some(ArchiveError::EncodingFailed { .. })
        ));
        assert_eq!(
            err.downcast_ref::<io::Error>().map(io::Error::kind),
            Some(io::ErrorKind::PermissionDenied)
        );
        assert_eq!(
            format!("{:#}", err),
            "unable to write component archive to 'out.tgz': read-only"
        );
    }
}
