//! # clubbank-engine
//!
//! **Session, request processing and the operation surface of ClubBank.**
//!
//! This crate ties the pure decision plane (`clubbank-safety`) to the
//! stateful ledger (`clubbank-ledger`):
//!
//! - [`RequestProcessor`]: evaluate a request, build its audit record,
//!   commit on grant
//! - [`ScenarioCatalog`]: named preset states
//! - [`Session`]: live state and audit log behind one lock
//! - [`Engine`]: every logical operation, plus [`Engine::dispatch`] for
//!   decoded [`api::Operation`]s
//!
//! ## Flow
//!
//! ```text
//! Operation ──▶ Engine ──▶ Session (RwLock) ──▶ RequestProcessor
//!                                │                    │
//!                                │               evaluate_request
//!                                ▼                    │
//!                         StateStore ◀── commit ──────┘
//!                         AuditLog   ◀── record
//! ```

pub mod api;
pub mod catalog;
pub mod engine;
pub mod processor;
pub mod session;

pub use catalog::ScenarioCatalog;
pub use engine::Engine;
pub use processor::{Processed, RequestProcessor};
pub use session::{ClubEdit, ResetSummary, SafetyCheck, Session, SessionSnapshot};
