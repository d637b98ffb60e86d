//! # atgate policy
//!
//! The protocol for consulting an account/session policy subsystem (PAM)
//! before the list-based permission check.
//!
//! ## Overview
//!
//! The subsystem is reached through two capabilities: a [`PolicyBackend`]
//! that starts sessions, and the [`PolicySession`] it hands out. The
//! [`consult`] function runs the validation sequence and always tears the
//! session back down; it never leaves anything open.
//!
//! With the `pam` feature, [`PamBackend`] talks to Linux-PAM. Without a
//! subsystem, [`NoPolicy`] stands in as an uninhabited backend type.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use atgate_policy::{consult, ConsultRequest, PamBackend};
//!
//! let request = ConsultRequest { service: "atd", user: "alice", tty: "atd" };
//! match consult(&PamBackend::new(), request) {
//!     Ok(()) => println!("account may open a session"),
//!     Err(e) => println!("refused: {e}"),
//! }
//! ```

pub mod backend;
pub mod consult;
pub mod error;
#[cfg(feature = "pam")]
pub mod pam;

pub use backend::{EndStatus, NoPolicy, PolicyBackend, PolicyItem, PolicySession};
pub use consult::{consult, ConsultRequest};
pub use error::{PolicyError, PolicyStep, Result};
#[cfg(feature = "pam")]
pub use pam::{PamBackend, PamSession};
