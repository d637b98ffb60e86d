//! Linux-PAM adapter.
//!
//! Every call passes `PAM_SILENT`; the conversation function is null, as
//! nothing here can prompt. A handle that is dropped without
//! [`PolicySession::end`] is ended with `PAM_ABORT`.

use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::fmt;
use std::ptr;

use crate::backend::{EndStatus, PolicyBackend, PolicyItem, PolicySession};
use crate::error::{PolicyError, PolicyStep, Result};

const PAM_SUCCESS: c_int = 0;
const PAM_BUF_ERR: c_int = 5;
const PAM_ABORT: c_int = 26;

const PAM_TTY: c_int = 3;

const PAM_SILENT: c_int = 0x8000;
const PAM_ESTABLISH_CRED: c_int = 0x0002;
const PAM_DELETE_CRED: c_int = 0x0004;

#[repr(C)]
struct PamHandle {
    _opaque: [u8; 0],
}

#[allow(dead_code)]
#[repr(C)]
struct PamMessage {
    msg_style: c_int,
    msg: *const c_char,
}

#[allow(dead_code)]
#[repr(C)]
struct PamResponse {
    resp: *mut c_char,
    resp_retcode: c_int,
}

type ConvFn = extern "C" fn(
    num_msg: c_int,
    msg: *mut *const PamMessage,
    resp: *mut *mut PamResponse,
    appdata_ptr: *mut c_void,
) -> c_int;

#[allow(dead_code)]
#[repr(C)]
struct PamConv {
    conv: Option<ConvFn>,
    appdata_ptr: *mut c_void,
}

#[link(name = "pam")]
extern "C" {
    fn pam_start(
        service_name: *const c_char,
        user: *const c_char,
        pam_conversation: *const PamConv,
        pamh: *mut *mut PamHandle,
    ) -> c_int;
    fn pam_end(pamh: *mut PamHandle, pam_status: c_int) -> c_int;
    fn pam_set_item(pamh: *mut PamHandle, item_type: c_int, item: *const c_void) -> c_int;
    fn pam_acct_mgmt(pamh: *mut PamHandle, flags: c_int) -> c_int;
    fn pam_open_session(pamh: *mut PamHandle, flags: c_int) -> c_int;
    fn pam_close_session(pamh: *mut PamHandle, flags: c_int) -> c_int;
    fn pam_setcred(pamh: *mut PamHandle, flags: c_int) -> c_int;
    fn pam_strerror(pamh: *mut PamHandle, errnum: c_int) -> *const c_char;
}

/// Starts sessions through the system's PAM stack.
#[derive(Debug, Default, Clone, Copy)]
pub struct PamBackend {
    _private: (),
}

impl PamBackend {
    /// Create the PAM backend.
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl PolicyBackend for PamBackend {
    type Session = PamSession;

    fn start_session(&self, service: &str, user: &str) -> Result<PamSession> {
        let service = c_string(PolicyStep::Start, service)?;
        let user = c_string(PolicyStep::Start, user)?;
        let conv = Box::new(PamConv {
            conv: None,
            appdata_ptr: ptr::null_mut(),
        });

        let mut handle: *mut PamHandle = ptr::null_mut();
        // SAFETY: all pointers are valid for the call; `conv` is kept alive
        // in the session for as long as the handle exists.
        let code = unsafe { pam_start(service.as_ptr(), user.as_ptr(), &*conv, &mut handle) };

        let session = PamSession {
            handle,
            _conv: conv,
            _tty: None,
        };
        if code != PAM_SUCCESS {
            let err = session.error(PolicyStep::Start, code);
            session.end(EndStatus::Failed(code));
            return Err(err);
        }
        Ok(session)
    }
}

/// A started PAM transaction.
pub struct PamSession {
    handle: *mut PamHandle,
    _conv: Box<PamConv>,
    _tty: Option<CString>,
}

impl fmt::Debug for PamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PamSession")
            .field("handle", &self.handle)
            .field("tty", &self._tty)
            .finish_non_exhaustive()
    }
}

impl PamSession {
    fn error(&self, step: PolicyStep, code: c_int) -> PolicyError {
        // SAFETY: pam_strerror accepts any handle, including null, and
        // returns a static string.
        let message = unsafe {
            let text = pam_strerror(self.handle, code);
            if text.is_null() {
                format!("PAM error {code}")
            } else {
                CStr::from_ptr(text).to_string_lossy().into_owned()
            }
        };
        PolicyError::new(step, code, message)
    }

    fn check(&self, step: PolicyStep, code: c_int) -> Result<()> {
        if code == PAM_SUCCESS {
            Ok(())
        } else {
            Err(self.error(step, code))
        }
    }

    fn release(&mut self, status: c_int) {
        if !self.handle.is_null() {
            // SAFETY: the handle came from pam_start and is ended once.
            unsafe {
                pam_end(self.handle, status);
            }
            self.handle = ptr::null_mut();
        }
    }
}

impl PolicySession for PamSession {
    fn set_item(&mut self, item: PolicyItem, value: &str) -> Result<()> {
        let item_type = match item {
            PolicyItem::Tty => PAM_TTY,
        };
        let value = c_string(PolicyStep::SetItem, value)?;
        // SAFETY: PAM copies string items; the CString is kept anyway.
        let code = unsafe { pam_set_item(self.handle, item_type, value.as_ptr().cast()) };
        self._tty = Some(value);
        self.check(PolicyStep::SetItem, code)
    }

    fn check_account(&mut self) -> Result<()> {
        // SAFETY: valid handle from pam_start.
        let code = unsafe { pam_acct_mgmt(self.handle, PAM_SILENT) };
        self.check(PolicyStep::AccountCheck, code)
    }

    fn open_session(&mut self) -> Result<()> {
        // SAFETY: valid handle from pam_start.
        let code = unsafe { pam_open_session(self.handle, PAM_SILENT) };
        self.check(PolicyStep::OpenSession, code)
    }

    fn establish_credentials(&mut self) -> Result<()> {
        // SAFETY: valid handle from pam_start.
        let code = unsafe { pam_setcred(self.handle, PAM_ESTABLISH_CRED | PAM_SILENT) };
        self.check(PolicyStep::EstablishCredentials, code)
    }

    fn delete_credentials(&mut self) -> Result<()> {
        // SAFETY: valid handle from pam_start.
        let code = unsafe { pam_setcred(self.handle, PAM_DELETE_CRED | PAM_SILENT) };
        self.check(PolicyStep::DeleteCredentials, code)
    }

    fn close_session(&mut self) -> Result<()> {
        // SAFETY: valid handle from pam_start.
        let code = unsafe { pam_close_session(self.handle, PAM_SILENT) };
        self.check(PolicyStep::CloseSession, code)
    }

    fn end(mut self, status: EndStatus) {
        let code = match status {
            EndStatus::Abort => PAM_ABORT,
            EndStatus::Failed(code) => code,
        };
        self.release(code);
    }
}

impl Drop for PamSession {
    fn drop(&mut self) {
        self.release(PAM_ABORT);
    }
}

fn c_string(step: PolicyStep, value: &str) -> Result<CString> {
    CString::new(value).map_err(|_| {
        PolicyError::new(step, PAM_BUF_ERR, format!("{value:?} contains a NUL byte"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nul_in_user_is_rejected_before_pam() {
        let err = PamBackend::new().start_session("atd", "fr\0ank").unwrap_err();
        assert_eq!(err.step, PolicyStep::Start);
        assert_eq!(err.code, PAM_BUF_ERR);
    }

    #[test]
    fn test_nul_in_service_is_rejected_before_pam() {
        let err = PamBackend::new().start_session("a\0td", "frank").unwrap_err();
        assert_eq!(err.step, PolicyStep::Start);
        assert_eq!(err.code, PAM_BUF_ERR);
        assert!(err.message.contains("NUL"));
    }

    #[test]
    fn test_released_session_debug() {
        let mut session = PamSession {
            handle: ptr::null_mut(),
            _conv: Box::new(PamConv {
                conv: None,
                appdata_ptr: ptr::null_mut(),
            }),
            _tty: Some(CString::new("atd").unwrap()),
        };
        session.release(PAM_ABORT);
        let shown = format!("{session:?}");
        assert!(shown.starts_with("PamSession"));
        assert!(shown.contains("atd"));
    }
}
