//! # atgate
//!
//! Decides whether the invoking user may schedule deferred jobs with
//! `at(1)`, from the administrator's `at.allow`/`at.deny` lists and,
//! with the `pam` feature, the system's PAM account and session policy.
//!
//! ## Overview
//!
//! The scheduling tool calls [`check_permission`] once and exits if it
//! returns `false`. Internally the check is an [`AccessChecker`] wired with:
//!
//! - a [`PrivilegeStrategy`](atgate_privs::PrivilegeStrategy) that reads and
//!   changes process credentials,
//! - an [`AccountDatabase`] that maps uids to account names,
//! - optionally a [`PolicyBackend`](atgate_policy::PolicyBackend).
//!
//! Tests wire the same checker with non-privileged fakes.
//!
//! ## Rules
//!
//! - The superuser is always allowed.
//! - If `at.allow` can be read, exactly the users it lists are allowed.
//! - Otherwise, if `at.deny` can be read, everyone it does not list is allowed.
//! - With neither file, everyone is allowed.
//!
//! ## Usage
//!
//! ```rust,no_run
//! if !atgate::check_permission() {
//!     eprintln!("You do not have permission to use at.");
//!     std::process::exit(1);
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `atgate::core` - Data model and list lookup
//! - `atgate::privs` - Privilege strategies and guards
//! - `atgate::policy` - Policy subsystem protocol

pub mod accounts;
pub mod checker;
pub mod config;
pub mod error;

pub use atgate_core as core;
pub use atgate_policy as policy;
pub use atgate_privs as privs;

pub use accounts::{resolve_account, resolve_service_identity, AccountDatabase, SystemAccounts};
pub use checker::AccessChecker;
pub use config::AccessConfig;
pub use error::{AccessError, Result};

pub use atgate_core::{Account, Decision, Identity, LookupResult};

use tracing::error;

/// Exit status used when the check cannot reach a decision.
pub const EXIT_FAILURE: i32 = 1;

/// Decide for the running process with the compiled-in configuration.
///
/// Terminates the process when the caller's account cannot be resolved or
/// the process identity cannot be restored.
pub fn check_permission() -> bool {
    match system_decision(AccessConfig::default()) {
        Ok(decision) => decision.is_allowed(),
        Err(e) => {
            error!(error = %e, "permission check failed");
            eprintln!("{e}");
            std::process::exit(EXIT_FAILURE);
        }
    }
}

/// Run the check against the real process and account database.
#[cfg(not(feature = "pam"))]
pub fn system_decision(config: AccessConfig) -> Result<Decision> {
    AccessChecker::new(config, privs::SystemPrivileges::new(), SystemAccounts::new()).check()
}

/// Run the check against the real process, account database and PAM.
#[cfg(feature = "pam")]
pub fn system_decision(config: AccessConfig) -> Result<Decision> {
    let accounts = SystemAccounts::new();
    let daemon = resolve_service_identity(&accounts, &config.daemon_user)?;
    AccessChecker::new(config, privs::SystemPrivileges::new(), accounts)
        .with_policy(policy::PamBackend::new(), daemon)
        .check()
}
