//! Error types for the permission check.
//!
//! Every variant here is fatal: the caller cannot tell who is asking, or the
//! process may be left running with the wrong credentials. Everything else
//! collapses into a [`Decision`](atgate_core::Decision).

use std::io;

use atgate_privs::PrivError;
use thiserror::Error;

/// Errors that end the permission check without a decision.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The account database could not be queried.
    #[error("cannot access user database: {0}")]
    AccountDatabase(#[source] io::Error),

    /// The effective uid has no account record.
    #[error("cannot access user database: no account for uid {0}")]
    UnknownAccount(u32),

    /// The configured daemon user does not exist.
    #[error("daemon user {0:?} not found")]
    UnknownDaemonUser(String),

    /// Credentials could not be put back after a switch.
    #[error(transparent)]
    Identity(#[from] PrivError),
}

/// Result type for the permission check.
pub type Result<T> = std::result::Result<T, AccessError>;
