//! # atgate testkit
//!
//! Testing utilities for the permission gate.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: temporary list directories and an in-memory account database
//! - **Simulated privileges**: fake credentials with a transition log and
//!   injectable failures
//! - **Scripted policy**: a policy subsystem that records calls and fails on cue
//! - **Scenario vectors**: known inputs with the decision they must produce
//! - **Generators**: proptest strategies for names and list files
//!
//! ## Scenario Vectors
//!
//! ```rust
//! use atgate_testkit::vectors::{all_scenarios, run_scenario};
//!
//! for vector in all_scenarios() {
//!     let outcome = run_scenario(&vector);
//!     assert_eq!(outcome.decision, vector.expected, "{}", vector.name);
//!     assert_eq!(outcome.before, outcome.after);
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use atgate_testkit::{FakeAccounts, ListFixture, SimulatedPrivileges};
//!
//! let fixture = ListFixture::new();
//! fixture.allow(&["alice"]);
//! let checker = fixture.checker(
//!     SimulatedPrivileges::setuid_root(1000, 100),
//!     FakeAccounts::new().with("alice", 1000, 100),
//! );
//! assert!(checker.check().unwrap().is_allowed());
//! ```

pub mod fixtures;
pub mod generators;
pub mod policy;
pub mod privs;
pub mod vectors;

pub use fixtures::{lines, FakeAccounts, ListFixture};
pub use policy::{PolicyCall, ScriptedPolicy, ScriptedSession, SCRIPTED_FAILURE_CODE};
pub use privs::{SimulatedPrivileges, Transition};
pub use vectors::{all_scenarios, run_scenario, verify_all_scenarios, ScenarioOutcome, ScenarioVector};
