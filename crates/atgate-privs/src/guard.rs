//! Scoped credential changes.
//!
//! An [`IdentityGuard`] captures the process identity before changing it and
//! puts it back when released. Release is explicit through
//! [`IdentityGuard::restore`], which reports failure, or implicit on drop
//! (early return, unwinding). A failed restore on drop cannot be reported to
//! anyone, and the process would keep running with the wrong credentials, so
//! it aborts.

use atgate_core::Identity;
use tracing::error;

use crate::error::{PrivError, Result};
use crate::strategy::{PrivilegeStrategy, ServiceIdentity};

/// Holds a changed identity and restores the captured one on release.
#[must_use = "dropping the guard immediately restores the previous identity"]
pub struct IdentityGuard<'a, S: PrivilegeStrategy + ?Sized> {
    strategy: &'a S,
    saved: Identity,
    armed: bool,
}

impl<'a, S: PrivilegeStrategy + ?Sized> IdentityGuard<'a, S> {
    fn capture(strategy: &'a S) -> Self {
        Self {
            strategy,
            saved: strategy.current(),
            armed: true,
        }
    }

    /// Switch real and effective ids to `target` for the guard's lifetime.
    ///
    /// If the switch fails part way, whatever changed is put back before the
    /// error is returned. A failure to put it back wins over the switch error.
    pub fn assume(strategy: &'a S, target: ServiceIdentity) -> Result<Self> {
        let guard = Self::capture(strategy);
        if let Err(e) = strategy.assume(target) {
            guard.restore()?;
            return Err(e);
        }
        Ok(guard)
    }

    /// Regain the saved set-ids for the guard's lifetime.
    pub fn elevate(strategy: &'a S) -> Result<Self> {
        let guard = Self::capture(strategy);
        if let Err(e) = strategy.elevate() {
            guard.restore()?;
            return Err(e);
        }
        Ok(guard)
    }

    /// The identity that will be restored.
    pub fn saved(&self) -> &Identity {
        &self.saved
    }

    /// Restore the captured identity and verify it took effect.
    pub fn restore(mut self) -> Result<()> {
        self.armed = false;
        self.put_back()
    }

    fn put_back(&self) -> Result<()> {
        self.strategy.restore(&self.saved)?;

        let now = self.strategy.current();
        if now != self.saved {
            return Err(PrivError::Restore {
                expected: self.saved,
                reason: format!("process is still running as {now}"),
            });
        }
        Ok(())
    }
}

impl<S: PrivilegeStrategy + ?Sized> Drop for IdentityGuard<'_, S> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = self.put_back() {
            error!(error = %e, "identity restore failed while unwinding, aborting");
            std::process::abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::NoopPrivileges;

    #[test]
    fn test_noop_guard_round_trip() {
        let identity = Identity::unprivileged(1000, 100);
        let privs = NoopPrivileges::new(identity);

        let guard = IdentityGuard::assume(&privs, ServiceIdentity::new(1, 1)).unwrap();
        assert_eq!(guard.saved(), &identity);
        guard.restore().unwrap();
    }

    #[test]
    fn test_drop_restores_without_abort_on_success() {
        let privs = NoopPrivileges::new(Identity::unprivileged(1000, 100));
        {
            let _guard = IdentityGuard::elevate(&privs).unwrap();
        }
        assert_eq!(privs.current(), Identity::unprivileged(1000, 100));
    }
}
