//! End-to-end permission decisions over real list files and simulated
//! credentials.

use atgate::{AccessError, Decision};
use atgate_core::Identity;
use atgate_policy::{EndStatus, PolicyItem, PolicyStep};
use atgate_privs::{PrivError, PrivilegeStrategy};
use atgate_testkit::vectors::DAEMON;
use atgate_testkit::{
    all_scenarios, run_scenario, FakeAccounts, ListFixture, PolicyCall, ScriptedPolicy,
    SimulatedPrivileges, Transition, SCRIPTED_FAILURE_CODE,
};

fn elevations(privs: &SimulatedPrivileges) -> usize {
    privs
        .transitions()
        .iter()
        .filter(|t| matches!(t, Transition::Elevate))
        .count()
}

fn accounts() -> FakeAccounts {
    FakeAccounts::new()
        .with("alice", 1001, 100)
        .with("bob", 1002, 100)
        .with("carol", 1003, 100)
        .with("eve", 1005, 100)
        .with("frank", 1006, 100)
        .with("daemon", DAEMON.uid, DAEMON.gid)
}

#[test]
fn test_every_vector() {
    for vector in all_scenarios() {
        let outcome = run_scenario(&vector);
        assert_eq!(outcome.decision, vector.expected, "{}", vector.name);
        assert_eq!(outcome.before, outcome.after, "{}", vector.name);
    }
}

#[test]
fn test_scenario_a_allow_list_short_circuits() {
    let fixture = ListFixture::new();
    fixture.allow(&["alice"]).deny(&["alice"]);
    let privs = SimulatedPrivileges::setuid_root(1001, 100);

    let decision = fixture.checker(privs.clone(), accounts()).check().unwrap();

    assert_eq!(decision, Decision::Allow);
    assert_eq!(elevations(&privs), 1, "deny list must not be read");
}

#[test]
fn test_scenario_b_deny_list_denies() {
    let fixture = ListFixture::new();
    fixture.deny(&["bob"]);
    let privs = SimulatedPrivileges::setuid_root(1002, 100);

    let decision = fixture.checker(privs.clone(), accounts()).check().unwrap();

    assert_eq!(decision, Decision::Deny);
    assert_eq!(elevations(&privs), 2);
}

#[test]
fn test_scenario_c_no_lists_allows() {
    let fixture = ListFixture::new();
    let privs = SimulatedPrivileges::setuid_root(1003, 100);

    let decision = fixture.checker(privs, accounts()).check().unwrap();
    assert_eq!(decision, Decision::Allow);
}

#[test]
fn test_scenario_d_allow_list_is_authoritative() {
    let fixture = ListFixture::new();
    fixture.allow(&["dave"]);
    let privs = SimulatedPrivileges::setuid_root(1005, 100);

    let decision = fixture.checker(privs.clone(), accounts()).check().unwrap();

    assert_eq!(decision, Decision::Deny);
    assert_eq!(elevations(&privs), 1, "deny list must not be read");
}

#[test]
fn test_scenario_e_policy_refusal_restores_identity() {
    let fixture = ListFixture::new();
    fixture.allow(&["frank"]);
    let privs = SimulatedPrivileges::setuid_root(1006, 100);
    let before = privs.current();
    let policy = ScriptedPolicy::new().refusing("frank").observing(&privs);

    let decision = fixture
        .checker(privs.clone(), accounts())
        .with_policy(policy.clone(), DAEMON)
        .check()
        .unwrap();

    assert_eq!(decision, Decision::Deny);
    assert_eq!(privs.current(), before);
    assert_eq!(elevations(&privs), 0, "lists must not be read after refusal");
    assert_eq!(
        policy.calls(),
        vec![
            PolicyCall::Start {
                service: "atd".into(),
                user: "frank".into()
            },
            PolicyCall::SetItem(PolicyItem::Tty, "atd".into()),
            PolicyCall::CheckAccount,
            PolicyCall::CloseSession,
            PolicyCall::End(EndStatus::Failed(SCRIPTED_FAILURE_CODE)),
        ]
    );
}

#[test]
fn test_superuser_skips_everything() {
    let fixture = ListFixture::new();
    fixture.allow(&["alice"]).deny(&["root"]);
    let privs = SimulatedPrivileges::new(Identity::unprivileged(0, 0));
    let policy = ScriptedPolicy::new().failing_at(PolicyStep::Start);

    let decision = fixture
        .checker(privs.clone(), FakeAccounts::new().unavailable())
        .with_policy(policy.clone(), DAEMON)
        .check()
        .unwrap();

    assert_eq!(decision, Decision::Allow);
    assert!(privs.transitions().is_empty());
    assert!(policy.calls().is_empty());
}

#[test]
fn test_policy_runs_as_daemon() {
    let fixture = ListFixture::new();
    fixture.allow(&["alice"]);
    let privs = SimulatedPrivileges::setuid_root(1001, 100);
    let before = privs.current();
    let policy = ScriptedPolicy::new().observing(&privs);

    let decision = fixture
        .checker(privs.clone(), accounts())
        .with_policy(policy.clone(), DAEMON)
        .check()
        .unwrap();

    assert_eq!(decision, Decision::Allow);
    assert_eq!(privs.current(), before);
    assert_eq!(policy.calls().last(), Some(&PolicyCall::End(EndStatus::Abort)));
    let seen = policy.identities();
    assert_eq!(seen.len(), policy.calls().len());
    assert!(seen.iter().all(|id| *id == DAEMON.as_identity()));
}

#[test]
fn test_policy_success_does_not_allow_by_itself() {
    let fixture = ListFixture::new();
    fixture.allow(&["alice"]);
    let privs = SimulatedPrivileges::setuid_root(1005, 100);

    let decision = fixture
        .checker(privs, accounts())
        .with_policy(ScriptedPolicy::new(), DAEMON)
        .check()
        .unwrap();

    assert_eq!(decision, Decision::Deny);
}

#[test]
fn test_policy_failure_at_each_step_denies() {
    let steps = [
        PolicyStep::Start,
        PolicyStep::SetItem,
        PolicyStep::AccountCheck,
        PolicyStep::OpenSession,
        PolicyStep::EstablishCredentials,
    ];
    for step in steps {
        let fixture = ListFixture::new();
        fixture.allow(&["alice"]);
        let privs = SimulatedPrivileges::setuid_root(1001, 100);
        let before = privs.current();
        let policy = ScriptedPolicy::new().failing_at(step);

        let decision = fixture
            .checker(privs.clone(), accounts())
            .with_policy(policy.clone(), DAEMON)
            .check()
            .unwrap();

        assert_eq!(decision, Decision::Deny, "{step}");
        assert_eq!(privs.current(), before, "{step}");
        assert!(
            !policy.calls().contains(&PolicyCall::DeleteCredentials),
            "{step}"
        );
    }
}

#[test]
fn test_policy_teardown_failure_still_checks_lists() {
    for step in [PolicyStep::DeleteCredentials, PolicyStep::CloseSession] {
        let fixture = ListFixture::new();
        fixture.allow(&["alice"]);
        let privs = SimulatedPrivileges::setuid_root(1001, 100);

        let decision = fixture
            .checker(privs.clone(), accounts())
            .with_policy(ScriptedPolicy::new().failing_at(step), DAEMON)
            .check()
            .unwrap();

        assert_eq!(decision, Decision::Allow, "{step}");
        assert_eq!(privs.current(), Identity::unprivileged(1001, 100));
    }
}

#[test]
fn test_cannot_assume_daemon_denies() {
    let fixture = ListFixture::new();
    fixture.allow(&["alice"]);
    let privs = SimulatedPrivileges::setuid_root(1001, 100).fail_assume();
    let policy = ScriptedPolicy::new();

    let decision = fixture
        .checker(privs.clone(), accounts())
        .with_policy(policy.clone(), DAEMON)
        .check()
        .unwrap();

    assert_eq!(decision, Decision::Deny);
    assert!(policy.calls().is_empty());
    assert_eq!(privs.current(), Identity::unprivileged(1001, 100));
}

#[test]
fn test_partial_assume_is_rolled_back() {
    let fixture = ListFixture::new();
    let privs = SimulatedPrivileges::setuid_root(1001, 100).fail_assume_partially();

    let decision = fixture
        .checker(privs.clone(), accounts())
        .with_policy(ScriptedPolicy::new(), DAEMON)
        .check()
        .unwrap();

    assert_eq!(decision, Decision::Deny);
    assert_eq!(privs.current(), Identity::unprivileged(1001, 100));
}

#[test]
fn test_restore_error_is_fatal() {
    let fixture = ListFixture::new();
    let privs = SimulatedPrivileges::setuid_root(1001, 100).fail_restore();

    let err = fixture
        .checker(privs, accounts())
        .with_policy(ScriptedPolicy::new(), DAEMON)
        .check()
        .unwrap_err();

    assert!(matches!(err, AccessError::Identity(PrivError::Restore { .. })));
}

#[test]
fn test_silent_restore_failure_is_detected() {
    let fixture = ListFixture::new();
    let privs = SimulatedPrivileges::setuid_root(1001, 100).ignore_restore();

    let err = fixture
        .checker(privs, accounts())
        .with_policy(ScriptedPolicy::new().refusing("alice"), DAEMON)
        .check()
        .unwrap_err();

    match err {
        AccessError::Identity(e) => assert!(e.is_fatal()),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_restore_failure_after_list_read_is_fatal() {
    let fixture = ListFixture::new();
    fixture.allow(&["alice"]);
    let privs = SimulatedPrivileges::setuid_root(1001, 100).fail_restore();

    let err = fixture.checker(privs, accounts()).check().unwrap_err();
    assert!(matches!(err, AccessError::Identity(_)));
}

#[test]
fn test_cannot_elevate_denies() {
    let fixture = ListFixture::new();
    let privs = SimulatedPrivileges::setuid_root(1003, 100).fail_elevate();

    let decision = fixture.checker(privs.clone(), accounts()).check().unwrap();

    assert_eq!(decision, Decision::Deny);
    assert_eq!(privs.current(), Identity::unprivileged(1003, 100));
}

#[test]
fn test_lists_are_read_elevated() {
    let fixture = ListFixture::new();
    fixture.deny(&["mallory"]);
    let privs = SimulatedPrivileges::setuid_root(1003, 100);

    fixture.checker(privs.clone(), accounts()).check().unwrap();

    let before = Identity::unprivileged(1003, 100);
    assert_eq!(
        privs.transitions(),
        vec![
            Transition::Elevate,
            Transition::Restore(before),
            Transition::Elevate,
            Transition::Restore(before),
        ]
    );
}

#[test]
fn test_unknown_account_is_fatal() {
    let fixture = ListFixture::new();
    let privs = SimulatedPrivileges::setuid_root(4242, 100);

    let err = fixture.checker(privs, accounts()).check().unwrap_err();
    assert!(matches!(err, AccessError::UnknownAccount(4242)));
}

#[test]
fn test_account_database_failure_is_fatal() {
    let fixture = ListFixture::new();
    let privs = SimulatedPrivileges::setuid_root(1001, 100);

    let err = fixture
        .checker(privs, accounts().unavailable())
        .check()
        .unwrap_err();
    assert!(matches!(err, AccessError::AccountDatabase(_)));
}

#[test]
fn test_account_name_is_matched_not_uid() {
    let fixture = ListFixture::new();
    fixture.allow(&["1001"]);
    let privs = SimulatedPrivileges::setuid_root(1001, 100);

    let decision = fixture.checker(privs, accounts()).check().unwrap();
    assert_eq!(decision, Decision::Deny);
}
