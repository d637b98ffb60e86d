//! # atgate core
//!
//! Data model and list membership lookup for the `at(1)` permission gate.
//!
//! This crate holds no privilege logic. It knows how to search an
//! administrator-maintained allow or deny list for a user name and how to
//! describe the values a permission check works with.
//!
//! ## Key Types
//!
//! - [`Identity`] - Real and effective user/group ids of the process
//! - [`Account`] - The account record of the user asking to schedule a job
//! - [`LookupResult`] - Found, not found, or the list could not be read
//! - [`Decision`] - Allow or deny
//!
//! ## Lookup
//!
//! ```rust,no_run
//! use atgate_core::{lookup, LookupResult};
//!
//! match lookup("/etc/at.allow", "alice") {
//!     LookupResult::Found => println!("listed"),
//!     LookupResult::NotFound => println!("not listed"),
//!     LookupResult::Unreadable(kind) => println!("no list: {kind:?}"),
//! }
//! ```

pub mod lookup;
pub mod types;

pub use lookup::{lookup, scan_lines, LookupResult, ScanReport, LINE_BUFFER_LEN, MAX_COMPARED_LEN};
pub use types::{Account, Decision, Identity, SUPERUSER_UID};
