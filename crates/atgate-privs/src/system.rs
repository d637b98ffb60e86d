//! Credential switching for the real process.
//!
//! Uses `setresuid`/`setresgid` so the saved set-ids survive every switch.
//! Group ids are always changed while the process still holds the user id
//! that permits it: before dropping the user id, after regaining it.

use std::io;

use atgate_core::Identity;
use nix::unistd::{self, Gid, Uid};
use tracing::debug;

use crate::error::{PrivError, Result};
use crate::strategy::{PrivilegeStrategy, ServiceIdentity};

/// Changes the credentials of the running process.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPrivileges {
    _private: (),
}

impl SystemPrivileges {
    /// Create the system strategy.
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Make the saved set-uid effective so later id changes are permitted.
    ///
    /// Best effort: when it fails the following call reports the real error.
    fn regain_saved_uid(&self) {
        if let Ok(uids) = unistd::getresuid() {
            if uids.effective != uids.saved {
                let _ = unistd::setresuid(uids.real, uids.saved, uids.saved);
            }
        }
    }
}

impl PrivilegeStrategy for SystemPrivileges {
    fn current(&self) -> Identity {
        Identity {
            effective_uid: unistd::geteuid().as_raw(),
            real_uid: unistd::getuid().as_raw(),
            effective_gid: unistd::getegid().as_raw(),
            real_gid: unistd::getgid().as_raw(),
        }
    }

    fn elevate(&self) -> Result<()> {
        let uids = unistd::getresuid().map_err(|e| PrivError::Query(io::Error::from(e)))?;
        let gids = unistd::getresgid().map_err(|e| PrivError::Query(io::Error::from(e)))?;

        unistd::setresuid(uids.real, uids.saved, uids.saved)
            .map_err(|e| PrivError::Elevate(io::Error::from(e)))?;
        unistd::setresgid(gids.real, gids.saved, gids.saved)
            .map_err(|e| PrivError::Elevate(io::Error::from(e)))?;

        debug!(
            euid = uids.saved.as_raw(),
            egid = gids.saved.as_raw(),
            "elevated to saved set-ids"
        );
        Ok(())
    }

    fn assume(&self, target: ServiceIdentity) -> Result<()> {
        let assume_err = |e: nix::Error| PrivError::Assume {
            uid: target.uid,
            gid: target.gid,
            source: io::Error::from(e),
        };

        self.regain_saved_uid();

        let gids = unistd::getresgid().map_err(|e| PrivError::Query(io::Error::from(e)))?;
        let uids = unistd::getresuid().map_err(|e| PrivError::Query(io::Error::from(e)))?;

        let gid = Gid::from_raw(target.gid);
        unistd::setresgid(gid, gid, gids.saved).map_err(assume_err)?;

        let uid = Uid::from_raw(target.uid);
        unistd::setresuid(uid, uid, uids.saved).map_err(assume_err)?;

        debug!(uid = target.uid, gid = target.gid, "assumed service identity");
        Ok(())
    }

    fn restore(&self, identity: &Identity) -> Result<()> {
        let restore_err = |e: nix::Error| PrivError::Restore {
            expected: *identity,
            reason: e.to_string(),
        };

        self.regain_saved_uid();

        let gids = unistd::getresgid().map_err(restore_err)?;
        let uids = unistd::getresuid().map_err(restore_err)?;

        unistd::setresgid(
            Gid::from_raw(identity.real_gid),
            Gid::from_raw(identity.effective_gid),
            gids.saved,
        )
        .map_err(restore_err)?;

        unistd::setresuid(
            Uid::from_raw(identity.real_uid),
            Uid::from_raw(identity.effective_uid),
            uids.saved,
        )
        .map_err(restore_err)?;

        debug!(%identity, "restored identity");
        Ok(())
    }
}
