//! A scripted policy subsystem.
//!
//! [`ScriptedPolicy`] records every call, can refuse chosen accounts at the
//! account check, can fail any step for everyone, and can note which
//! identity the process had at each call.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use atgate_core::Identity;
use atgate_policy::{
    EndStatus, PolicyBackend, PolicyError, PolicyItem, PolicySession, PolicyStep, Result,
};
use atgate_privs::PrivilegeStrategy;

use crate::privs::SimulatedPrivileges;

/// Code returned by scripted failures.
pub const SCRIPTED_FAILURE_CODE: i32 = 13;

/// One call made against the scripted subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyCall {
    /// A session was started.
    Start { service: String, user: String },
    /// A context item was set.
    SetItem(PolicyItem, String),
    /// Account check.
    CheckAccount,
    /// Session opened.
    OpenSession,
    /// Credentials established.
    EstablishCredentials,
    /// Credentials deleted.
    DeleteCredentials,
    /// Session closed.
    CloseSession,
    /// Handle ended.
    End(EndStatus),
}

#[derive(Debug, Default)]
struct Script {
    fail_at: Option<PolicyStep>,
    refused: HashSet<String>,
    observer: Option<SimulatedPrivileges>,
    calls: Vec<PolicyCall>,
    identities: Vec<Identity>,
}

/// A policy backend that follows a script. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPolicy {
    script: Rc<RefCell<Script>>,
}

impl ScriptedPolicy {
    /// A subsystem that accepts everyone.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `step` for every account.
    pub fn failing_at(self, step: PolicyStep) -> Self {
        self.script.borrow_mut().fail_at = Some(step);
        self
    }

    /// Fail the account check for `user`.
    pub fn refusing(self, user: impl Into<String>) -> Self {
        self.script.borrow_mut().refused.insert(user.into());
        self
    }

    /// Record the identity of `privs` at every call.
    pub fn observing(self, privs: &SimulatedPrivileges) -> Self {
        self.script.borrow_mut().observer = Some(privs.clone());
        self
    }

    /// Every call made so far.
    pub fn calls(&self) -> Vec<PolicyCall> {
        self.script.borrow().calls.clone()
    }

    /// The observed identity at each call, in call order.
    pub fn identities(&self) -> Vec<Identity> {
        self.script.borrow().identities.clone()
    }

    fn record(&self, call: PolicyCall) {
        let mut script = self.script.borrow_mut();
        if let Some(identity) = script.observer.as_ref().map(|p| p.current()) {
            script.identities.push(identity);
        }
        script.calls.push(call);
    }

    fn outcome(&self, step: PolicyStep) -> Result<()> {
        if self.script.borrow().fail_at == Some(step) {
            return Err(PolicyError::new(
                step,
                SCRIPTED_FAILURE_CODE,
                format!("scripted {step} failure"),
            ));
        }
        Ok(())
    }
}

impl PolicyBackend for ScriptedPolicy {
    type Session = ScriptedSession;

    fn start_session(&self, service: &str, user: &str) -> Result<ScriptedSession> {
        self.record(PolicyCall::Start {
            service: service.to_string(),
            user: user.to_string(),
        });
        self.outcome(PolicyStep::Start)?;
        Ok(ScriptedSession {
            policy: self.clone(),
            user: user.to_string(),
        })
    }
}

/// A session of [`ScriptedPolicy`].
#[derive(Debug)]
pub struct ScriptedSession {
    policy: ScriptedPolicy,
    user: String,
}

impl PolicySession for ScriptedSession {
    fn set_item(&mut self, item: PolicyItem, value: &str) -> Result<()> {
        self.policy.record(PolicyCall::SetItem(item, value.to_string()));
        self.policy.outcome(PolicyStep::SetItem)
    }

    fn check_account(&mut self) -> Result<()> {
        self.policy.record(PolicyCall::CheckAccount);
        if self.policy.script.borrow().refused.contains(&self.user) {
            return Err(PolicyError::new(
                PolicyStep::AccountCheck,
                SCRIPTED_FAILURE_CODE,
                format!("account {} refused", self.user),
            ));
        }
        self.policy.outcome(PolicyStep::AccountCheck)
    }

    fn open_session(&mut self) -> Result<()> {
        self.policy.record(PolicyCall::OpenSession);
        self.policy.outcome(PolicyStep::OpenSession)
    }

    fn establish_credentials(&mut self) -> Result<()> {
        self.policy.record(PolicyCall::EstablishCredentials);
        self.policy.outcome(PolicyStep::EstablishCredentials)
    }

    fn delete_credentials(&mut self) -> Result<()> {
        self.policy.record(PolicyCall::DeleteCredentials);
        self.policy.outcome(PolicyStep::DeleteCredentials)
    }

    fn close_session(&mut self) -> Result<()> {
        self.policy.record(PolicyCall::CloseSession);
        self.policy.outcome(PolicyStep::CloseSession)
    }

    fn end(self, status: EndStatus) {
        self.policy.record(PolicyCall::End(status));
    }
}
