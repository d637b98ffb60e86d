//! The policy subsystem capability.
//!
//! A [`PolicyBackend`] starts sessions; a [`PolicySession`] walks the
//! account/session protocol one step at a time. Each step either succeeds
//! or returns a [`PolicyError`](crate::PolicyError) carrying the
//! subsystem's code.

use std::convert::Infallible;

use crate::error::Result;

/// A context item that can be set on a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PolicyItem {
    /// The terminal (or pseudo-terminal name) the request comes from.
    Tty,
}

/// How a session handle is ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndStatus {
    /// The sequence was abandoned on purpose.
    Abort,
    /// The sequence stopped because a step returned this code.
    Failed(i32),
}

/// Starts policy sessions for a service.
pub trait PolicyBackend {
    /// The session handle this backend produces.
    type Session: PolicySession;

    /// Start a session for `user` on behalf of `service`.
    fn start_session(&self, service: &str, user: &str) -> Result<Self::Session>;
}

impl<B: PolicyBackend + ?Sized> PolicyBackend for &B {
    type Session = B::Session;

    fn start_session(&self, service: &str, user: &str) -> Result<Self::Session> {
        (**self).start_session(service, user)
    }
}

/// One started policy session.
pub trait PolicySession {
    /// Set a context item.
    fn set_item(&mut self, item: PolicyItem, value: &str) -> Result<()>;

    /// Check that the account is valid and may be used.
    fn check_account(&mut self) -> Result<()>;

    /// Open the session.
    fn open_session(&mut self) -> Result<()>;

    /// Establish the account's credentials.
    fn establish_credentials(&mut self) -> Result<()>;

    /// Delete established credentials.
    fn delete_credentials(&mut self) -> Result<()>;

    /// Close the session.
    fn close_session(&mut self) -> Result<()>;

    /// Release the session handle.
    fn end(self, status: EndStatus);
}

/// The backend used when no policy subsystem is configured.
///
/// It has no values, so a checker carrying `Option<NoPolicy>` can only ever
/// hold `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoPolicy {}

impl PolicyBackend for NoPolicy {
    type Session = Infallible;

    fn start_session(&self, _service: &str, _user: &str) -> Result<Self::Session> {
        match *self {}
    }
}

impl PolicySession for Infallible {
    fn set_item(&mut self, _item: PolicyItem, _value: &str) -> Result<()> {
        match *self {}
    }

    fn check_account(&mut self) -> Result<()> {
        match *self {}
    }

    fn open_session(&mut self) -> Result<()> {
        match *self {}
    }

    fn establish_credentials(&mut self) -> Result<()> {
        match *self {}
    }

    fn delete_credentials(&mut self) -> Result<()> {
        match *self {}
    }

    fn close_session(&mut self) -> Result<()> {
        match *self {}
    }

    fn end(self, _status: EndStatus) {
        match self {}
    }
}
