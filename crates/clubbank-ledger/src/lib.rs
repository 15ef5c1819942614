//! # clubbank-ledger
//!
//! **Bookkeeping plane**: the authoritative allocation state, the supply
//! conservation check that guards it, and the append-only audit log of
//! request decisions.
//!
//! ## Architecture
//!
//! 1. **StateStore**: owns the live [`AllocationState`]; wholesale replace
//!    or single-club allocation deltas, both all-or-nothing
//! 2. **SupplyConservation**: verifies after every mutation that requests
//!    never change the installed total and never over-commit it
//! 3. **AuditLog**: insertion-ordered [`DecisionRecord`]s with CSV export
//!
//! None of these types lock. The session handle that owns them serializes
//! access, so one write guard covers a commit and its audit entry.
//!
//! [`AllocationState`]: clubbank_types::AllocationState
//! [`DecisionRecord`]: clubbank_types::DecisionRecord

pub mod audit_log;
pub mod state_store;
pub mod supply_conservation;

pub use audit_log::{AuditLog, CsvExport};
pub use state_store::StateStore;
pub use supply_conservation::SupplyConservation;
