//! Scenario vectors for the permission decision.
//!
//! Each vector fixes the list files, the caller, and the policy subsystem's
//! behaviour, and states the decision every implementation must reach.

use atgate_core::{Decision, Identity};
use atgate_privs::{PrivilegeStrategy, ServiceIdentity};

use crate::fixtures::{FakeAccounts, ListFixture};
use crate::policy::{PolicyCall, ScriptedPolicy};
use crate::privs::SimulatedPrivileges;

/// Uid/gid the simulated job daemon runs as.
pub const DAEMON: ServiceIdentity = ServiceIdentity::new(1, 1);

/// How the policy subsystem behaves in a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyMode {
    /// No policy subsystem configured.
    Disabled,
    /// Configured and accepts the caller.
    Accept,
    /// Configured and fails the caller's account check.
    Refuse,
}

/// A scenario vector.
#[derive(Debug, Clone)]
pub struct ScenarioVector {
    /// Short name.
    pub name: &'static str,
    /// Contents of `at.allow`, `None` when the file is absent.
    pub allow: Option<&'static str>,
    /// Contents of `at.deny`, `None` when the file is absent.
    pub deny: Option<&'static str>,
    /// Account name of the caller.
    pub user: &'static str,
    /// Uid of the caller.
    pub uid: u32,
    /// Policy subsystem behaviour.
    pub policy: PolicyMode,
    /// Expected decision.
    pub expected: Decision,
}

/// Get all scenario vectors.
pub fn all_scenarios() -> Vec<ScenarioVector> {
    vec![
        ScenarioVector {
            name: "A: listed in allow list",
            allow: Some("alice\n"),
            deny: Some("alice\n"),
            user: "alice",
            uid: 1001,
            policy: PolicyMode::Disabled,
            expected: Decision::Allow,
        },
        ScenarioVector {
            name: "B: no allow list, listed in deny list",
            allow: None,
            deny: Some("bob\n"),
            user: "bob",
            uid: 1002,
            policy: PolicyMode::Disabled,
            expected: Decision::Deny,
        },
        ScenarioVector {
            name: "C: no lists at all",
            allow: None,
            deny: None,
            user: "carol",
            uid: 1003,
            policy: PolicyMode::Disabled,
            expected: Decision::Allow,
        },
        ScenarioVector {
            name: "D: allow list names someone else",
            allow: Some("dave\n"),
            deny: None,
            user: "eve",
            uid: 1005,
            policy: PolicyMode::Disabled,
            expected: Decision::Deny,
        },
        ScenarioVector {
            name: "E: policy refuses account",
            allow: Some("frank\n"),
            deny: None,
            user: "frank",
            uid: 1006,
            policy: PolicyMode::Refuse,
            expected: Decision::Deny,
        },
        ScenarioVector {
            name: "superuser with hostile lists",
            allow: Some("alice\n"),
            deny: Some("root\n"),
            user: "root",
            uid: 0,
            policy: PolicyMode::Refuse,
            expected: Decision::Allow,
        },
        ScenarioVector {
            name: "policy accepts, allow list decides",
            allow: Some("grace\n"),
            deny: None,
            user: "grace",
            uid: 1007,
            policy: PolicyMode::Accept,
            expected: Decision::Allow,
        },
        ScenarioVector {
            name: "policy accepts, empty allow list",
            allow: Some(""),
            deny: None,
            user: "heidi",
            uid: 1008,
            policy: PolicyMode::Accept,
            expected: Decision::Deny,
        },
        ScenarioVector {
            name: "deny list names someone else",
            allow: None,
            deny: Some("mallory\n"),
            user: "ivan",
            uid: 1009,
            policy: PolicyMode::Disabled,
            expected: Decision::Allow,
        },
        ScenarioVector {
            name: "unterminated allow list entry",
            allow: Some("bob\njudy"),
            deny: None,
            user: "judy",
            uid: 1010,
            policy: PolicyMode::Disabled,
            expected: Decision::Allow,
        },
    ]
}

/// What running a scenario produced.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    /// The decision.
    pub decision: Decision,
    /// Process identity before the check.
    pub before: Identity,
    /// Process identity after the check.
    pub after: Identity,
    /// Calls made to the policy subsystem.
    pub policy_calls: Vec<PolicyCall>,
}

/// Run a scenario against a set-uid-root simulation.
pub fn run_scenario(vector: &ScenarioVector) -> ScenarioOutcome {
    let fixture = ListFixture::new();
    if let Some(allow) = vector.allow {
        fixture.write_allow(allow);
    }
    if let Some(deny) = vector.deny {
        fixture.write_deny(deny);
    }

    let privs = if vector.uid == 0 {
        SimulatedPrivileges::new(Identity::unprivileged(0, 0))
    } else {
        SimulatedPrivileges::setuid_root(vector.uid, 100)
    };
    let accounts = FakeAccounts::new()
        .with(vector.user, vector.uid, 100)
        .with("daemon", DAEMON.uid, DAEMON.gid);
    let before = privs.current();

    let checker = fixture.checker(privs.clone(), accounts);
    let policy = match vector.policy {
        PolicyMode::Disabled => None,
        PolicyMode::Accept => Some(ScriptedPolicy::new()),
        PolicyMode::Refuse => Some(ScriptedPolicy::new().refusing(vector.user)),
    };

    let decision = match policy {
        None => checker.check(),
        Some(ref policy) => checker.with_policy(policy.clone(), DAEMON).check(),
    }
    .expect("scenario reaches a decision");

    ScenarioOutcome {
        decision,
        before,
        after: privs.current(),
        policy_calls: policy.map(|p| p.calls()).unwrap_or_default(),
    }
}

/// Run every vector and report whether each one matched.
pub fn verify_all_scenarios() -> Vec<(&'static str, bool)> {
    all_scenarios()
        .iter()
        .map(|v| (v.name, run_scenario(v).decision == v.expected))
        .collect()
}
