//! Simulated process credentials.
//!
//! [`SimulatedPrivileges`] keeps a fake real/effective/saved id set, applies
//! the same rules the system strategy does, and logs every transition. Clones
//! share state, so a test can hold one handle while the checker owns another.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use atgate_core::Identity;
use atgate_privs::{PrivError, PrivilegeStrategy, Result, ServiceIdentity};

/// A credential change that was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Effective ids set to the saved set-ids.
    Elevate,
    /// Real and effective ids set to a service identity.
    Assume(ServiceIdentity),
    /// Real and effective ids set back to a captured identity.
    Restore(Identity),
}

/// How the simulation misbehaves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Faults {
    elevate: bool,
    assume: bool,
    partial_assume: bool,
    restore: bool,
    ignore_restore: bool,
}

#[derive(Debug)]
struct State {
    identity: Identity,
    saved_uid: u32,
    saved_gid: u32,
    faults: Faults,
    log: Vec<Transition>,
}

/// Fake process credentials with a transition log.
#[derive(Debug, Clone)]
pub struct SimulatedPrivileges {
    state: Rc<RefCell<State>>,
}

impl SimulatedPrivileges {
    /// A process running as `identity` whose saved set-ids equal its effective ids.
    pub fn new(identity: Identity) -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                identity,
                saved_uid: identity.effective_uid,
                saved_gid: identity.effective_gid,
                faults: Faults::default(),
                log: Vec::new(),
            })),
        }
    }

    /// A set-uid-root program that has relinquished privilege to `uid`/`gid`.
    pub fn setuid_root(uid: u32, gid: u32) -> Self {
        let privs = Self::new(Identity::unprivileged(uid, gid));
        {
            let mut state = privs.state.borrow_mut();
            state.saved_uid = 0;
            state.saved_gid = 0;
        }
        privs
    }

    fn with_faults(self, f: impl FnOnce(&mut Faults)) -> Self {
        f(&mut self.state.borrow_mut().faults);
        self
    }

    /// Make [`PrivilegeStrategy::elevate`] fail.
    pub fn fail_elevate(self) -> Self {
        self.with_faults(|f| f.elevate = true)
    }

    /// Make [`PrivilegeStrategy::assume`] fail without changing anything.
    pub fn fail_assume(self) -> Self {
        self.with_faults(|f| f.assume = true)
    }

    /// Make [`PrivilegeStrategy::assume`] change the group ids, then fail.
    pub fn fail_assume_partially(self) -> Self {
        self.with_faults(|f| f.partial_assume = true)
    }

    /// Make [`PrivilegeStrategy::restore`] return an error.
    pub fn fail_restore(self) -> Self {
        self.with_faults(|f| f.restore = true)
    }

    /// Make [`PrivilegeStrategy::restore`] report success without doing anything.
    pub fn ignore_restore(self) -> Self {
        self.with_faults(|f| f.ignore_restore = true)
    }

    /// Every transition attempted so far.
    pub fn transitions(&self) -> Vec<Transition> {
        self.state.borrow().log.clone()
    }

    /// The saved set-ids.
    pub fn saved_ids(&self) -> (u32, u32) {
        let state = self.state.borrow();
        (state.saved_uid, state.saved_gid)
    }
}

fn simulated(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::PermissionDenied, format!("simulated {what} failure"))
}

impl PrivilegeStrategy for SimulatedPrivileges {
    fn current(&self) -> Identity {
        self.state.borrow().identity
    }

    fn elevate(&self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.log.push(Transition::Elevate);
        if state.faults.elevate {
            return Err(PrivError::Elevate(simulated("elevate")));
        }
        state.identity.effective_uid = state.saved_uid;
        state.identity.effective_gid = state.saved_gid;
        Ok(())
    }

    fn assume(&self, target: ServiceIdentity) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.log.push(Transition::Assume(target));

        let err = || PrivError::Assume {
            uid: target.uid,
            gid: target.gid,
            source: simulated("assume"),
        };
        if state.faults.assume {
            return Err(err());
        }
        state.identity.real_gid = target.gid;
        state.identity.effective_gid = target.gid;
        if state.faults.partial_assume {
            return Err(err());
        }
        state.identity.real_uid = target.uid;
        state.identity.effective_uid = target.uid;
        Ok(())
    }

    fn restore(&self, identity: &Identity) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.log.push(Transition::Restore(*identity));
        if state.faults.restore {
            return Err(PrivError::Restore {
                expected: *identity,
                reason: "simulated restore failure".to_string(),
            });
        }
        if !state.faults.ignore_restore {
            state.identity = *identity;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atgate_privs::IdentityGuard;

    #[test]
    fn test_elevate_uses_saved_ids() {
        let privs = SimulatedPrivileges::setuid_root(1000, 100);
        let guard = IdentityGuard::elevate(&privs).unwrap();

        let elevated = privs.current();
        assert_eq!(elevated.effective_uid, 0);
        assert_eq!(elevated.real_uid, 1000);

        guard.restore().unwrap();
        assert_eq!(privs.current(), Identity::unprivileged(1000, 100));
    }

    #[test]
    fn test_partial_assume_is_undone_by_guard() {
        let privs = SimulatedPrivileges::setuid_root(1000, 100).fail_assume_partially();
        let before = privs.current();

        let err = IdentityGuard::assume(&privs, ServiceIdentity::new(1, 1)).err().unwrap();
        assert!(matches!(err, PrivError::Assume { uid: 1, gid: 1, .. }));
        assert_eq!(privs.current(), before);
        assert_eq!(privs.transitions().last(), Some(&Transition::Restore(before)));
    }

    #[test]
    fn test_ignored_restore_is_detected() {
        let privs = SimulatedPrivileges::setuid_root(1000, 100).ignore_restore();
        let guard = IdentityGuard::assume(&privs, ServiceIdentity::new(1, 1)).unwrap();

        let err = guard.restore().unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_clones_share_state() {
        let privs = SimulatedPrivileges::setuid_root(1000, 100);
        let other = privs.clone();
        privs.assume(ServiceIdentity::new(1, 2)).unwrap();
        assert_eq!(other.current(), Identity::unprivileged(1, 2));
        assert_eq!(other.saved_ids(), (0, 0));
    }
}
