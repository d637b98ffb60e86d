//! Configuration for the permission check.
//!
//! The defaults are fixed when the crate is built. `ATGATE_ETC_DIR` may be
//! set at build time to move the list files; nothing is read from the
//! environment at run time.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Directory holding `at.allow` and `at.deny`.
pub const ETC_DIR: &str = match option_env!("ATGATE_ETC_DIR") {
    Some(dir) => dir,
    None => "/etc",
};

/// File name of the allow list.
pub const ALLOW_FILE: &str = "at.allow";

/// File name of the deny list.
pub const DENY_FILE: &str = "at.deny";

/// Service name the policy session is started for.
pub const DEFAULT_SERVICE_NAME: &str = "atd";

/// Account the job daemon runs as.
pub const DEFAULT_DAEMON_USER: &str = "daemon";

/// Configuration for [`AccessChecker`](crate::AccessChecker).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Path of the allow list.
    pub allow_list: PathBuf,
    /// Path of the deny list, consulted only when the allow list is unreadable.
    pub deny_list: PathBuf,
    /// Service name for the policy session.
    pub service_name: String,
    /// Value of the TTY item set on the policy session.
    pub tty_name: String,
    /// Account whose identity the policy subsystem runs under.
    pub daemon_user: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self::with_lists_in(ETC_DIR)
    }
}

impl AccessConfig {
    /// Default configuration with both lists in `dir`.
    pub fn with_lists_in(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            allow_list: dir.join(ALLOW_FILE),
            deny_list: dir.join(DENY_FILE),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            tty_name: DEFAULT_SERVICE_NAME.to_string(),
            daemon_user: DEFAULT_DAEMON_USER.to_string(),
        }
    }

    /// Use `path` as the allow list.
    pub fn with_allow_list(mut self, path: impl Into<PathBuf>) -> Self {
        self.allow_list = path.into();
        self
    }

    /// Use `path` as the deny list.
    pub fn with_deny_list(mut self, path: impl Into<PathBuf>) -> Self {
        self.deny_list = path.into();
        self
    }

    /// Start policy sessions for `service`, also used as the TTY item.
    pub fn with_service_name(mut self, service: impl Into<String>) -> Self {
        let service = service.into();
        self.tty_name = service.clone();
        self.service_name = service;
        self
    }

    /// Run the policy subsystem as `user`.
    pub fn with_daemon_user(mut self, user: impl Into<String>) -> Self {
        self.daemon_user = user.into();
        self
    }
}
