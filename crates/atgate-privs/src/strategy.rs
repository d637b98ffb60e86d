//! The privilege strategy: how credentials are read and changed.
//!
//! The decision logic only ever talks to a [`PrivilegeStrategy`]. Production
//! wiring uses [`SystemPrivileges`](crate::SystemPrivileges); a build that
//! must not touch process credentials (debugging, tests) injects
//! [`NoopPrivileges`].

use atgate_core::Identity;

use crate::error::Result;

/// A fixed low-privilege identity, such as the one the job daemon runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceIdentity {
    /// User id.
    pub uid: u32,
    /// Group id.
    pub gid: u32,
}

impl ServiceIdentity {
    /// Create a new service identity.
    pub const fn new(uid: u32, gid: u32) -> Self {
        Self { uid, gid }
    }

    /// The identity the process has after assuming this one.
    pub const fn as_identity(&self) -> Identity {
        Identity::unprivileged(self.uid, self.gid)
    }
}

/// Reads and changes the credentials of the current process.
///
/// Implementations are not expected to restore anything on their own; pair
/// every mutation with an [`IdentityGuard`](crate::IdentityGuard).
pub trait PrivilegeStrategy {
    /// The current real and effective ids.
    fn current(&self) -> Identity;

    /// Set the effective ids to the saved set-ids, keeping the real ids.
    ///
    /// For a set-uid installation this regains the installed privilege.
    fn elevate(&self) -> Result<()>;

    /// Set both real and effective ids to `target`.
    ///
    /// Saved set-ids are kept so the original identity can be restored.
    fn assume(&self, target: ServiceIdentity) -> Result<()>;

    /// Put back exactly the real and effective ids of `identity`.
    fn restore(&self, identity: &Identity) -> Result<()>;
}

impl<S: PrivilegeStrategy + ?Sized> PrivilegeStrategy for &S {
    fn current(&self) -> Identity {
        (**self).current()
    }

    fn elevate(&self) -> Result<()> {
        (**self).elevate()
    }

    fn assume(&self, target: ServiceIdentity) -> Result<()> {
        (**self).assume(target)
    }

    fn restore(&self, identity: &Identity) -> Result<()> {
        (**self).restore(identity)
    }
}

/// A strategy that reports a fixed identity and never changes anything.
#[derive(Debug, Clone, Copy)]
pub struct NoopPrivileges {
    identity: Identity,
}

impl NoopPrivileges {
    /// Report `identity` as the process credentials.
    pub const fn new(identity: Identity) -> Self {
        Self { identity }
    }
}

impl PrivilegeStrategy for NoopPrivileges {
    fn current(&self) -> Identity {
        self.identity
    }

    fn elevate(&self) -> Result<()> {
        Ok(())
    }

    fn assume(&self, _target: ServiceIdentity) -> Result<()> {
        Ok(())
    }

    fn restore(&self, _identity: &Identity) -> Result<()> {
        Ok(())
    }
}
