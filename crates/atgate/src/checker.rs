//! The permission decision.
//!
//! Steps, in order, each of which may end the check:
//!
//! 1. An effective superuser is allowed without looking at anything.
//! 2. The account for the effective uid is resolved; failure is fatal.
//! 3. With a policy subsystem configured, it is consulted as the daemon's
//!    service identity. Refusal denies; success only lets the check go on.
//! 4. The allow list, when readable, decides on its own.
//! 5. Otherwise the deny list denies the users it names and allows the rest.
//!
//! List files are read with the saved set-ids made effective, so a set-uid
//! installation can read lists that the invoking user cannot.

use std::path::Path;

use atgate_core::{lookup, Account, Decision, LookupResult};
use atgate_policy::{consult, ConsultRequest, NoPolicy, PolicyBackend};
use atgate_privs::{IdentityGuard, PrivilegeStrategy, ServiceIdentity};
use tracing::{debug, warn};

use crate::accounts::{resolve_account, AccountDatabase};
use crate::config::AccessConfig;
use crate::error::Result;

/// A policy backend together with the identity it runs under.
struct PolicyGate<B> {
    backend: B,
    daemon: ServiceIdentity,
}

/// Decides whether the invoking user may schedule jobs.
pub struct AccessChecker<P, A, B = NoPolicy> {
    config: AccessConfig,
    privileges: P,
    accounts: A,
    policy: Option<PolicyGate<B>>,
}

impl<P, A> AccessChecker<P, A, NoPolicy>
where
    P: PrivilegeStrategy,
    A: AccountDatabase,
{
    /// Create a checker without a policy subsystem.
    pub fn new(config: AccessConfig, privileges: P, accounts: A) -> Self {
        Self {
            config,
            privileges,
            accounts,
            policy: None,
        }
    }
}

impl<P, A, B> AccessChecker<P, A, B>
where
    P: PrivilegeStrategy,
    A: AccountDatabase,
    B: PolicyBackend,
{
    /// Consult `backend`, running as `daemon`, before the list check.
    pub fn with_policy<C: PolicyBackend>(
        self,
        backend: C,
        daemon: ServiceIdentity,
    ) -> AccessChecker<P, A, C> {
        AccessChecker {
            config: self.config,
            privileges: self.privileges,
            accounts: self.accounts,
            policy: Some(PolicyGate { backend, daemon }),
        }
    }

    /// The configuration in use.
    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    /// The privilege strategy in use.
    pub fn privileges(&self) -> &P {
        &self.privileges
    }

    /// Run the check.
    ///
    /// Returns an error only when the caller's account cannot be resolved or
    /// the process identity cannot be restored. Every other failure is
    /// folded into the decision.
    pub fn check(&self) -> Result<Decision> {
        let identity = self.privileges.current();
        if identity.is_superuser() {
            debug!(%identity, "superuser, allowed");
            return Ok(Decision::Allow);
        }

        let account = resolve_account(&self.accounts, identity.effective_uid)?;

        if let Some(ref gate) = self.policy {
            if !self.consult_policy(gate, &account)? {
                return Ok(Decision::Deny);
            }
        }

        self.check_lists(&account)
    }

    /// Whether the policy subsystem lets `account` open a session.
    fn consult_policy(&self, gate: &PolicyGate<B>, account: &Account) -> Result<bool> {
        let guard = match IdentityGuard::assume(&self.privileges, gate.daemon) {
            Ok(guard) => guard,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, "cannot switch to daemon identity, denying");
                return Ok(false);
            }
        };

        let outcome = consult(
            &gate.backend,
            ConsultRequest {
                service: &self.config.service_name,
                user: &account.name,
                tty: &self.config.tty_name,
            },
        );
        guard.restore()?;

        match outcome {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!(user = %account.name, error = %e, "policy subsystem refused");
                Ok(false)
            }
        }
    }

    fn check_lists(&self, account: &Account) -> Result<Decision> {
        let name = account.name.as_str();

        let Some(allow) = self.read_list(&self.config.allow_list, name)? else {
            return Ok(Decision::Deny);
        };
        match allow {
            LookupResult::Found => {
                debug!(user = name, "listed in allow list");
                return Ok(Decision::Allow);
            }
            LookupResult::NotFound => {
                debug!(user = name, "not listed in allow list");
                return Ok(Decision::Deny);
            }
            LookupResult::Unreadable(_) => {}
        }

        let Some(deny) = self.read_list(&self.config.deny_list, name)? else {
            return Ok(Decision::Deny);
        };
        if deny == LookupResult::Found {
            debug!(user = name, "listed in deny list");
            Ok(Decision::Deny)
        } else {
            Ok(Decision::Allow)
        }
    }

    /// Look `name` up in `path` with elevated privilege.
    ///
    /// `None` means privilege could not be raised to read the list.
    fn read_list(&self, path: &Path, name: &str) -> Result<Option<LookupResult>> {
        let guard = match IdentityGuard::elevate(&self.privileges) {
            Ok(guard) => guard,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot elevate to read list, denying");
                return Ok(None);
            }
        };
        let result = lookup(path, name);
        guard.restore()?;
        Ok(Some(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atgate_core::Identity;
    use atgate_privs::NoopPrivileges;
    use std::fs;
    use std::io;

    struct OneAccount(Account);

    impl AccountDatabase for OneAccount {
        fn by_uid(&self, uid: u32) -> io::Result<Option<Account>> {
            Ok((uid == self.0.uid).then(|| self.0.clone()))
        }

        fn by_name(&self, name: &str) -> io::Result<Option<Account>> {
            Ok((name == self.0.name).then(|| self.0.clone()))
        }
    }

    fn checker(
        dir: &Path,
        uid: u32,
        name: &str,
    ) -> AccessChecker<NoopPrivileges, OneAccount> {
        AccessChecker::new(
            AccessConfig::with_lists_in(dir),
            NoopPrivileges::new(Identity::unprivileged(uid, 100)),
            OneAccount(Account::new(name, 1000, 100)),
        )
    }

    #[test]
    fn test_superuser_ignores_lists() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("at.allow"), "alice\n").unwrap();
        fs::write(dir.path().join("at.deny"), "root\n").unwrap();

        assert_eq!(checker(dir.path(), 0, "root").check().unwrap(), Decision::Allow);
    }

    #[test]
    fn test_allow_list_membership() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("at.allow"), "alice\n").unwrap();

        assert_eq!(checker(dir.path(), 1000, "alice").check().unwrap(), Decision::Allow);
        assert_eq!(checker(dir.path(), 1000, "eve").check().unwrap(), Decision::Deny);
    }

    #[test]
    fn test_deny_list_fallback() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("at.deny"), "bob\n").unwrap();

        assert_eq!(checker(dir.path(), 1000, "bob").check().unwrap(), Decision::Deny);
        assert_eq!(checker(dir.path(), 1000, "carol").check().unwrap(), Decision::Allow);
    }

    #[test]
    fn test_no_lists_allows() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(checker(dir.path(), 1000, "carol").check().unwrap(), Decision::Allow);
    }

    #[test]
    fn test_checker_exposes_config_and_identity() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("at.allow"), "alice\n").unwrap();
        let checker = checker(dir.path(), 1000, "alice");

        assert_eq!(checker.config().allow_list, dir.path().join("at.allow"));
        assert_eq!(checker.config().deny_list, dir.path().join("at.deny"));
        assert_eq!(checker.check().unwrap(), Decision::Allow);
        assert_eq!(
            checker.privileges().current(),
            Identity::unprivileged(1000, 100)
        );
    }

    #[test]
    fn test_unknown_uid_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = checker(dir.path(), 4242, "alice").check().unwrap_err();
        assert!(matches!(err, crate::AccessError::UnknownAccount(4242)));
    }
}
