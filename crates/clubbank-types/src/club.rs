//! Club model: a competing client with a declared maximum need and a
//! current allocation.

use serde::{Deserialize, Serialize};

use crate::{ClubId, ClubbankError, ResourceVector, Result};

/// A club competing for the shared resource pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Club {
    /// Stable identity; also the safety-scan order.
    pub id: ClubId,
    /// Display name only.
    pub name: String,
    /// The most this club will ever hold of each kind.
    pub max_need: ResourceVector,
    /// Units currently held.
    pub allocation: ResourceVector,
}

impl Club {
    #[must_use]
    pub fn new(
        id: ClubId,
        name: impl Into<String>,
        max_need: impl Into<ResourceVector>,
        allocation: impl Into<ResourceVector>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            max_need: max_need.into(),
            allocation: allocation.into(),
        }
    }

    /// Remaining need: `max_need - allocation`.
    ///
    /// # Errors
    /// Returns `InvalidState` if the allocation exceeds the declared maximum.
    pub fn need(&self) -> Result<ResourceVector> {
        self.max_need
            .checked_sub(&self.allocation)
            .ok_or_else(|| ClubbankError::InvalidState {
                reason: format!(
                    "{} ({}) holds {} which exceeds its maximum {}",
                    self.name, self.id, self.allocation, self.max_need
                ),
            })
    }
}
