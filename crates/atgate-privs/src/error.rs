//! Error types for privilege switching.

use std::io;

use atgate_core::Identity;
use thiserror::Error;

/// Errors that can occur while changing process credentials.
#[derive(Debug, Error)]
pub enum PrivError {
    /// The current credentials could not be read.
    #[error("cannot read process credentials: {0}")]
    Query(#[source] io::Error),

    /// Regaining the saved set-ids failed.
    #[error("cannot elevate to saved set-ids: {0}")]
    Elevate(#[source] io::Error),

    /// Switching to a service identity failed.
    #[error("cannot assume uid {uid} gid {gid}: {source}")]
    Assume {
        uid: u32,
        gid: u32,
        #[source]
        source: io::Error,
    },

    /// Putting the captured identity back failed.
    #[error("cannot restore identity {expected}: {reason}")]
    Restore { expected: Identity, reason: String },
}

impl PrivError {
    /// Whether the process may be left running with the wrong credentials.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, PrivError::Restore { .. })
    }
}

/// Result type for privilege operations.
pub type Result<T> = std::result::Result<T, PrivError>;
