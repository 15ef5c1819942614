//! # clubbank-types
//!
//! Shared types, errors, and configuration for the **ClubBank** allocation
//! engine.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`ClubId`], [`DecisionId`]
//! - **Resource model**: [`ResourceVector`]
//! - **Club model**: [`Club`]
//! - **State model**: [`AllocationState`]
//! - **Decision model**: [`Decision`], [`DenialReason`], [`DecisionRecord`], [`RequestOutcome`]
//! - **Scenario model**: [`Scenario`], [`SafetyOutcome`]
//! - **Configuration**: [`EngineConfig`], [`ResetPolicy`], [`LogFormat`]
//! - **Errors**: [`ClubbankError`] with `CB_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod club;
pub mod config;
pub mod constants;
pub mod decision;
pub mod error;
pub mod ids;
pub mod resource;
pub mod scenario;
pub mod state;

// Re-export all primary types at crate root for ergonomic imports:
//   use clubbank_types::{AllocationState, ClubId, ResourceVector, ...};

pub use club::*;
pub use config::*;
pub use decision::*;
pub use error::*;
pub use ids::*;
pub use resource::*;
pub use scenario::*;
pub use state::*;

// Constants are accessed via `clubbank_types::constants::FOO`
// (not re-exported to avoid name collisions).
