//! Error types for the ClubBank allocation engine.
//!
//! All errors use the `CB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Request errors
//! - 2xx: State errors
//! - 3xx: Scenario errors
//! - 9xx: General / internal errors
//!
//! Denials (request exceeds need, exceeds availability, or would leave the
//! system unsafe) are *not* errors: they are decisions, see
//! [`crate::DenialReason`].

use thiserror::Error;

use crate::ClubId;

/// Central error enum for all ClubBank operations.
#[derive(Debug, Error)]
pub enum ClubbankError {
    // =================================================================
    // Request Errors (1xx)
    // =================================================================
    /// The request references a club that is not part of the state.
    #[error("CB_ERR_100: Unknown club: {0}")]
    UnknownClub(ClubId),

    /// The request vector has the wrong length or a negative component.
    #[error("CB_ERR_101: Malformed request: {reason}")]
    MalformedRequest { reason: String },

    // =================================================================
    // State Errors (2xx)
    // =================================================================
    /// Vector lengths disagree with the resource count, or the number of
    /// rows disagrees with the number of clubs.
    #[error("CB_ERR_200: Malformed matrix dimensions: {reason}")]
    MalformedMatrixDimensions { reason: String },

    /// A supplied or replacement state violates the allocation invariants.
    #[error("CB_ERR_201: Invalid state: {reason}")]
    InvalidState { reason: String },

    /// Two clubs share the same id.
    #[error("CB_ERR_202: Duplicate club id: {0}")]
    DuplicateClub(ClubId),

    // =================================================================
    // Scenario Errors (3xx)
    // =================================================================
    /// The scenario name is not registered in the catalog.
    #[error("CB_ERR_300: Unknown scenario: {0}")]
    UnknownScenario(String),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// The engine's own committed state broke an invariant. Indicates a bug.
    #[error("CB_ERR_900: Invariant violation: {reason}")]
    InvariantViolation { reason: String },

    /// Serialization / deserialization error.
    #[error("CB_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, bad values, etc.).
    #[error("CB_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error.
    #[error("CB_ERR_903: I/O error: {0}")]
    Io(String),
}

impl ClubbankError {
    /// Stable machine-readable code, e.g. `"CB_ERR_100"`.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownClub(_) => "CB_ERR_100",
            Self::MalformedRequest { .. } => "CB_ERR_101",
            Self::MalformedMatrixDimensions { .. } => "CB_ERR_200",
            Self::InvalidState { .. } => "CB_ERR_201",
            Self::DuplicateClub(_) => "CB_ERR_202",
            Self::UnknownScenario(_) => "CB_ERR_300",
            Self::InvariantViolation { .. } => "CB_ERR_900",
            Self::Serialization(_) => "CB_ERR_901",
            Self::Configuration(_) => "CB_ERR_902",
            Self::Io(_) => "CB_ERR_903",
        }
    }

    /// Whether the error means the engine itself is corrupted, as opposed
    /// to the caller having sent something unacceptable.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::InvariantViolation { .. } | Self::Io(_))
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, ClubbankError>;

impl From<std::io::Error> for ClubbankError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ClubbankError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
