//! # atgate privileges
//!
//! Changing process credentials for the shortest window necessary, and
//! always changing them back.
//!
//! ## Overview
//!
//! The permission check runs inside a program that may be installed
//! set-uid. It needs elevated privilege to read administrator-only list
//! files, and it needs to drop to the job daemon's identity while the
//! account policy subsystem runs. Both happen through an [`IdentityGuard`],
//! which captures the [`Identity`](atgate_core::Identity) before changing
//! anything and restores it on every exit path.
//!
//! ## Key Types
//!
//! - [`PrivilegeStrategy`] - How credentials are read and changed
//! - [`SystemPrivileges`] - `setresuid`/`setresgid` on the running process
//! - [`NoopPrivileges`] - Reports a fixed identity, never changes anything
//! - [`IdentityGuard`] - Scoped change with guaranteed restoration
//! - [`ServiceIdentity`] - The daemon's uid/gid pair
//!
//! ## Usage
//!
//! ```rust,no_run
//! use atgate_privs::{IdentityGuard, ServiceIdentity, SystemPrivileges};
//!
//! let privs = SystemPrivileges::new();
//! let guard = IdentityGuard::assume(&privs, ServiceIdentity::new(1, 1)).unwrap();
//! // ... work as the daemon ...
//! guard.restore().unwrap();
//! ```

pub mod error;
pub mod guard;
pub mod strategy;
#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "openbsd"
))]
pub mod system;

pub use error::{PrivError, Result};
pub use guard::IdentityGuard;
pub use strategy::{NoopPrivileges, PrivilegeStrategy, ServiceIdentity};
#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "openbsd"
))]
pub use system::SystemPrivileges;
