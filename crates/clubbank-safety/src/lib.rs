//! # clubbank-safety
//!
//! **Pure deterministic Banker's Algorithm for ClubBank.**
//!
//! This crate is the decision plane -- it takes an allocation state (and
//! optionally a request) and answers whether the result is safe. It has:
//!
//! - **Zero side effects**: no store writes, no audit log, no locking
//! - **Deterministic output**: same input -> same decision and safe sequence
//! - **Lowest-id-first tie-break**: the safe sequence is reproducible
//! - **Witness replay**: every safe sequence can be independently re-checked

pub mod checker;
pub mod determinism;
pub mod request;
pub mod witness;

pub use checker::{SafetyReport, check_safety};
pub use determinism::{compute_state_digest, state_digest_hex};
pub use request::{evaluate_request, parse_request};
pub use witness::verify_witness;
