//! Strong type definitions for the permission gate.
//!
//! Every value here is created at the start of one permission check and
//! dropped when it returns. Nothing is persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The user id of the superuser.
pub const SUPERUSER_UID: u32 = 0;

/// A snapshot of the process credentials.
///
/// The real ids belong to whoever invoked the program; the effective ids are
/// the privilege level the process holds right now (possibly elevated).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Effective user id.
    pub effective_uid: u32,
    /// Real user id.
    pub real_uid: u32,
    /// Effective group id.
    pub effective_gid: u32,
    /// Real group id.
    pub real_gid: u32,
}

impl Identity {
    /// An identity whose real and effective ids coincide.
    pub const fn unprivileged(uid: u32, gid: u32) -> Self {
        Self {
            effective_uid: uid,
            real_uid: uid,
            effective_gid: gid,
            real_gid: gid,
        }
    }

    /// Whether the process currently acts as the superuser.
    pub const fn is_superuser(&self) -> bool {
        self.effective_uid == SUPERUSER_UID
    }

    /// Whether the effective ids differ from the real ones.
    pub const fn is_elevated(&self) -> bool {
        self.effective_uid != self.real_uid || self.effective_gid != self.real_gid
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "uid={}/{} gid={}/{}",
            self.real_uid, self.effective_uid, self.real_gid, self.effective_gid
        )
    }
}

/// The account record of the user asking to schedule a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Canonical login name, as listed in the allow/deny files.
    pub name: String,
    /// Numeric user id.
    pub uid: u32,
    /// Primary group id.
    pub gid: u32,
}

impl Account {
    /// Create a new account record.
    pub fn new(name: impl Into<String>, uid: u32, gid: u32) -> Self {
        Self {
            name: name.into(),
            uid,
            gid,
        }
    }
}

/// Outcome of a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    /// The user may schedule jobs.
    Allow,
    /// The user may not schedule jobs.
    Deny,
}

impl Decision {
    /// Whether this decision permits the request.
    pub const fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }
}

impl From<Decision> for bool {
    fn from(decision: Decision) -> Self {
        decision.is_allowed()
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allow => f.write_str("allow"),
            Decision::Deny => f.write_str("deny"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_superuser_detection() {
        let root = Identity::unprivileged(0, 0);
        assert!(root.is_superuser());

        let setuid_user = Identity {
            effective_uid: 0,
            real_uid: 1000,
            effective_gid: 1000,
            real_gid: 1000,
        };
        assert!(setuid_user.is_superuser());
        assert!(setuid_user.is_elevated());

        let user = Identity::unprivileged(1000, 100);
        assert!(!user.is_superuser());
        assert!(!user.is_elevated());
    }

    #[test]
    fn test_decision_to_bool() {
        assert!(bool::from(Decision::Allow));
        assert!(!bool::from(Decision::Deny));
    }

    #[test]
    fn test_identity_display() {
        let id = Identity {
            effective_uid: 0,
            real_uid: 1000,
            effective_gid: 1,
            real_gid: 100,
        };
        assert_eq!(id.to_string(), "uid=1000/0 gid=100/1");
    }
}
