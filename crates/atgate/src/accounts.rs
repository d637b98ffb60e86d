//! Account database access.

use std::io;

use atgate_core::Account;
use atgate_privs::ServiceIdentity;
use nix::unistd::{Uid, User};

use crate::error::{AccessError, Result};

/// Looks up account records.
pub trait AccountDatabase {
    /// The account with user id `uid`, if any.
    fn by_uid(&self, uid: u32) -> io::Result<Option<Account>>;

    /// The account named `name`, if any.
    fn by_name(&self, name: &str) -> io::Result<Option<Account>>;
}

impl<D: AccountDatabase + ?Sized> AccountDatabase for &D {
    fn by_uid(&self, uid: u32) -> io::Result<Option<Account>> {
        (**self).by_uid(uid)
    }

    fn by_name(&self, name: &str) -> io::Result<Option<Account>> {
        (**self).by_name(name)
    }
}

/// The system password database (`getpwuid_r`/`getpwnam_r`).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAccounts {
    _private: (),
}

impl SystemAccounts {
    /// Create the system account database.
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

fn to_account(user: User) -> Account {
    Account::new(user.name, user.uid.as_raw(), user.gid.as_raw())
}

impl AccountDatabase for SystemAccounts {
    fn by_uid(&self, uid: u32) -> io::Result<Option<Account>> {
        User::from_uid(Uid::from_raw(uid))
            .map(|user| user.map(to_account))
            .map_err(io::Error::from)
    }

    fn by_name(&self, name: &str) -> io::Result<Option<Account>> {
        User::from_name(name)
            .map(|user| user.map(to_account))
            .map_err(io::Error::from)
    }
}

/// Resolve the account of the user asking.
pub fn resolve_account<D: AccountDatabase + ?Sized>(accounts: &D, uid: u32) -> Result<Account> {
    accounts
        .by_uid(uid)
        .map_err(AccessError::AccountDatabase)?
        .ok_or(AccessError::UnknownAccount(uid))
}

/// Resolve the identity the policy subsystem runs under.
pub fn resolve_service_identity<D: AccountDatabase + ?Sized>(
    accounts: &D,
    name: &str,
) -> Result<ServiceIdentity> {
    let account = accounts
        .by_name(name)
        .map_err(AccessError::AccountDatabase)?
        .ok_or_else(|| AccessError::UnknownDaemonUser(name.to_string()))?;
    Ok(ServiceIdentity::new(account.uid, account.gid))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_lookup_of_current_uid() {
        let uid = nix::unistd::getuid().as_raw();
        let account = resolve_account(&SystemAccounts::new(), uid).unwrap();
        assert_eq!(account.uid, uid);
        assert!(!account.name.is_empty());
    }

    #[test]
    fn test_root_resolves_by_name() {
        let root = resolve_service_identity(&SystemAccounts::new(), "root").unwrap();
        assert_eq!(root, ServiceIdentity::new(0, 0));
    }

    #[test]
    fn test_unknown_daemon_user() {
        let err = resolve_service_identity(&SystemAccounts::new(), "no-such-user-atgate")
            .unwrap_err();
        assert!(matches!(err, AccessError::UnknownDaemonUser(ref name) if name == "no-such-user-atgate"));
    }
}
