//! Supply conservation invariant checker.
//!
//! Invariant enforced after every state mutation:
//! ```text
//! total           == installed total (requests never change it)
//! ∀ j: Σ allocation[·][j] + available[j] == total[j],  available[j] ≥ 0
//! ```
//!
//! A request only moves units from `available` into one club's allocation.
//! If the books stop balancing, the engine's own state is corrupt and the
//! mutation is refused with `InvariantViolation`.

use clubbank_types::{AllocationState, ClubbankError, ResourceVector, Result};

/// Remembers the installed total and checks states against it.
#[derive(Debug, Clone)]
pub struct SupplyConservation {
    installed: ResourceVector,
}

impl SupplyConservation {
    /// Track a freshly installed pool.
    #[must_use]
    pub fn new(installed: ResourceVector) -> Self {
        Self { installed }
    }

    /// Record a new installed total (scenario load or administrative edit).
    pub fn record_install(&mut self, total: ResourceVector) {
        self.installed = total;
    }

    /// The total every request-driven state must carry.
    #[must_use]
    pub fn installed(&self) -> &ResourceVector {
        &self.installed
    }

    /// Verify that `state` conserves the installed supply.
    ///
    /// # Errors
    /// Returns [`ClubbankError::InvariantViolation`] if the total changed or
    /// allocation plus availability does not add up to it.
    pub fn verify(&self, state: &AllocationState) -> Result<()> {
        if state.total != self.installed {
            return Err(violation(format!(
                "total {} differs from installed {}",
                state.total, self.installed
            )));
        }
        let allocated = state
            .allocated()
            .map_err(|e| violation(e.to_string()))?;
        let available = state
            .available()
            .map_err(|e| violation(e.to_string()))?;
        let recombined = allocated
            .checked_add(&available)
            .ok_or_else(|| violation("allocated + available overflows".to_string()))?;
        if recombined != self.installed {
            return Err(violation(format!(
                "allocated {allocated} + available {available} != installed {}",
                self.installed
            )));
        }
        Ok(())
    }
}

fn violation(reason: String) -> ClubbankError {
    ClubbankError::InvariantViolation { reason }
}
