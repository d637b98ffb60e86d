//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use atgate::{AccessChecker, AccessConfig, AccountDatabase};
use atgate_core::Account;
use tempfile::TempDir;

use crate::privs::SimulatedPrivileges;

/// A temporary directory holding `at.allow` and `at.deny`.
pub struct ListFixture {
    dir: TempDir,
}

impl ListFixture {
    /// An empty directory: neither list exists.
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// The directory the lists live in.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the allow list.
    pub fn allow_path(&self) -> PathBuf {
        self.dir.path().join(atgate::config::ALLOW_FILE)
    }

    /// Path of the deny list.
    pub fn deny_path(&self) -> PathBuf {
        self.dir.path().join(atgate::config::DENY_FILE)
    }

    /// Write the allow list verbatim.
    pub fn write_allow(&self, contents: impl AsRef<[u8]>) -> &Self {
        fs::write(self.allow_path(), contents).expect("write allow list");
        self
    }

    /// Write the deny list verbatim.
    pub fn write_deny(&self, contents: impl AsRef<[u8]>) -> &Self {
        fs::write(self.deny_path(), contents).expect("write deny list");
        self
    }

    /// Write the allow list with one newline-terminated line per name.
    pub fn allow(&self, names: &[&str]) -> &Self {
        self.write_allow(lines(names))
    }

    /// Write the deny list with one newline-terminated line per name.
    pub fn deny(&self, names: &[&str]) -> &Self {
        self.write_deny(lines(names))
    }

    /// Configuration pointing at this fixture's lists.
    pub fn config(&self) -> AccessConfig {
        AccessConfig::with_lists_in(self.dir.path())
    }

    /// A checker over these lists, running as `privs` with `accounts`.
    pub fn checker(
        &self,
        privs: SimulatedPrivileges,
        accounts: FakeAccounts,
    ) -> AccessChecker<SimulatedPrivileges, FakeAccounts> {
        AccessChecker::new(self.config(), privs, accounts)
    }
}

impl Default for ListFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Join names into list-file contents.
pub fn lines(names: &[&str]) -> String {
    names.iter().map(|name| format!("{name}\n")).collect()
}

/// An in-memory account database.
#[derive(Debug, Clone, Default)]
pub struct FakeAccounts {
    accounts: HashMap<u32, Account>,
    unavailable: bool,
}

impl FakeAccounts {
    /// An empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account.
    pub fn with(mut self, name: &str, uid: u32, gid: u32) -> Self {
        self.accounts.insert(uid, Account::new(name, uid, gid));
        self
    }

    /// Make every query fail with an I/O error.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    fn check_available(&self) -> io::Result<()> {
        if self.unavailable {
            return Err(io::Error::other("account database offline"));
        }
        Ok(())
    }
}

impl AccountDatabase for FakeAccounts {
    fn by_uid(&self, uid: u32) -> io::Result<Option<Account>> {
        self.check_available()?;
        Ok(self.accounts.get(&uid).cloned())
    }

    fn by_name(&self, name: &str) -> io::Result<Option<Account>> {
        self.check_available()?;
        Ok(self.accounts.values().find(|a| a.name == name).cloned())
    }
}
