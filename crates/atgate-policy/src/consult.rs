//! The validation sequence run against a policy backend.
//!
//! start → set TTY → account check → open session → establish credentials,
//! then straight back down: delete credentials → close session → end.
//! Nothing is kept open past the call; a successful run only says the
//! account would be allowed a session.

use tracing::{debug, warn};

use crate::backend::{EndStatus, PolicyBackend, PolicyItem, PolicySession};
use crate::error::Result;

/// Names used when talking to the policy subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsultRequest<'a> {
    /// The service the session is for.
    pub service: &'a str,
    /// The account being validated.
    pub user: &'a str,
    /// Value of the TTY context item.
    pub tty: &'a str,
}

/// Run the full validation sequence for one account.
///
/// On failure the session is closed if it may have been opened (from the
/// account check onward) and the handle is ended with the failing code.
/// On success credentials are deleted, the session is closed and the handle
/// is ended with [`EndStatus::Abort`].
pub fn consult<B: PolicyBackend + ?Sized>(backend: &B, request: ConsultRequest<'_>) -> Result<()> {
    let mut session = backend.start_session(request.service, request.user)?;

    if let Err(e) = session.set_item(PolicyItem::Tty, request.tty) {
        session.end(EndStatus::Failed(e.code));
        return Err(e);
    }

    if let Err(e) = validate(&mut session) {
        if let Err(close) = session.close_session() {
            debug!(error = %close, "close after failed validation");
        }
        session.end(EndStatus::Failed(e.code));
        return Err(e);
    }

    if let Err(e) = session.delete_credentials() {
        warn!(user = request.user, error = %e, "policy teardown");
    }
    if let Err(e) = session.close_session() {
        warn!(user = request.user, error = %e, "policy teardown");
    }
    session.end(EndStatus::Abort);

    debug!(service = request.service, user = request.user, "policy validation passed");
    Ok(())
}

fn validate<S: PolicySession>(session: &mut S) -> Result<()> {
    session.check_account()?;
    session.open_session()?;
    session.establish_credentials()?;
    Ok(())
}
