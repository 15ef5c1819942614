//! Decision model for resource requests and the audit trail.
//!
//! Every request that passes shape validation ends in a [`Decision`]:
//! GRANTED, or DENIED with a [`DenialReason`]. Each decision is recorded as
//! an immutable [`DecisionRecord`] in the audit log.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AllocationState, ClubId, DecisionId, ResourceVector};

/// Outcome of a resource request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Granted,
    Denied,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Granted => write!(f, "GRANTED"),
            Self::Denied => write!(f, "DENIED"),
        }
    }
}

/// Why a well-formed request was denied. The club may retry later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenialReason {
    /// The club asked for more than its declared remaining need.
    ExceedsMaximumNeed,
    /// The pool does not currently hold enough free units.
    ExceedsAvailable,
    /// Granting would leave no safe sequence (potential deadlock).
    UnsafeStateDenied,
}

impl DenialReason {
    /// Human-readable explanation for `club_name`.
    #[must_use]
    pub fn message(self, club_name: &str) -> String {
        match self {
            Self::ExceedsMaximumNeed => {
                format!("Error: Request exceeds maximum need for {club_name}")
            }
            Self::ExceedsAvailable => {
                "Error: Insufficient resources available. Request denied.".to_string()
            }
            Self::UnsafeStateDenied => {
                "Request denied. Granting would lead to unsafe state (potential deadlock)."
                    .to_string()
            }
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExceedsMaximumNeed => write!(f, "EXCEEDS_MAXIMUM_NEED"),
            Self::ExceedsAvailable => write!(f, "EXCEEDS_AVAILABLE"),
            Self::UnsafeStateDenied => write!(f, "UNSAFE_STATE_DENIED"),
        }
    }
}

/// Message attached to every grant.
pub const GRANTED_MESSAGE: &str = "Request granted successfully. System remains in safe state.";

/// Result of running the resource-request algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The request is safe; `state` is the state after granting it.
    Granted {
        sequence: Vec<ClubId>,
        state: AllocationState,
    },
    /// The request was refused; the state is unchanged.
    Denied { reason: DenialReason },
}

impl RequestOutcome {
    #[must_use]
    pub fn decision(&self) -> Decision {
        match self {
            Self::Granted { .. } => Decision::Granted,
            Self::Denied { .. } => Decision::Denied,
        }
    }

    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }

    /// Denial reason, if denied.
    #[must_use]
    pub fn denial_reason(&self) -> Option<DenialReason> {
        match self {
            Self::Granted { .. } => None,
            Self::Denied { reason } => Some(*reason),
        }
    }

    /// Safe sequence proving the grant, empty when denied.
    #[must_use]
    pub fn sequence(&self) -> &[ClubId] {
        match self {
            Self::Granted { sequence, .. } => sequence,
            Self::Denied { .. } => &[],
        }
    }

    /// Human-readable message for `club_name`.
    #[must_use]
    pub fn message(&self, club_name: &str) -> String {
        match self {
            Self::Granted { .. } => GRANTED_MESSAGE.to_string(),
            Self::Denied { reason } => reason.message(club_name),
        }
    }
}

/// An immutable audit entry for one request decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub id: DecisionId,
    pub club_id: ClubId,
    pub club_name: String,
    pub requested_resources: ResourceVector,
    pub decision: Decision,
    /// Present only on denials.
    pub reason: Option<DenialReason>,
    pub message: String,
    /// Club names in safe order; empty unless granted.
    pub safe_sequence: Vec<String>,
    /// Hex SHA-256 of the state the request was evaluated against.
    pub state_digest: String,
    pub timestamp: DateTime<Utc>,
}
