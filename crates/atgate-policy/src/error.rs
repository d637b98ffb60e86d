//! Error types for the policy subsystem.

use std::fmt;

use thiserror::Error;

/// A step of the policy session sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyStep {
    /// Starting a session for a service and account.
    Start,
    /// Setting a context item on the session.
    SetItem,
    /// Account management (is the account valid, may it be used now).
    AccountCheck,
    /// Opening the session.
    OpenSession,
    /// Establishing credentials.
    EstablishCredentials,
    /// Deleting credentials.
    DeleteCredentials,
    /// Closing the session.
    CloseSession,
}

impl fmt::Display for PolicyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PolicyStep::Start => "start",
            PolicyStep::SetItem => "set item",
            PolicyStep::AccountCheck => "account check",
            PolicyStep::OpenSession => "open session",
            PolicyStep::EstablishCredentials => "establish credentials",
            PolicyStep::DeleteCredentials => "delete credentials",
            PolicyStep::CloseSession => "close session",
        };
        f.write_str(name)
    }
}

/// A step of the policy sequence returned a non-success code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("policy failure during {step}: {message} (code {code})")]
pub struct PolicyError {
    /// The step that failed.
    pub step: PolicyStep,
    /// The subsystem's return code.
    pub code: i32,
    /// The subsystem's description of the code.
    pub message: String,
}

impl PolicyError {
    /// Create a new policy error.
    pub fn new(step: PolicyStep, code: i32, message: impl Into<String>) -> Self {
        Self {
            step,
            code,
            message: message.into(),
        }
    }
}

/// Result type for policy operations.
pub type Result<T> = std::result::Result<T, PolicyError>;
