//! Identifiers used throughout ClubBank.
//!
//! Clubs are identified by a small stable integer (their row in the
//! allocation matrix). Audit decisions use UUIDv7 for time-ordered sorting.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ClubId
// ---------------------------------------------------------------------------

/// Stable identifier of a club within a session.
///
/// Ordering of `ClubId` is the scan order of the safety algorithm, so the
/// lowest id always wins a tie.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ClubId(pub u32);

impl ClubId {
    /// Row index of this club in the matrices.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Club id for matrix row `index`.
    ///
    /// Returns `None` if the index does not fit a `u32`.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }
}

impl fmt::Display for ClubId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "club:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// DecisionId
// ---------------------------------------------------------------------------

/// Globally unique identifier of an audit decision. Uses UUIDv7 so ids sort
/// by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct DecisionId(pub Uuid);

impl DecisionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for DecisionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DecisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "decision:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
