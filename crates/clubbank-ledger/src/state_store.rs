//! The authoritative allocation state of a session.
//!
//! All mutations are atomic: the new state is built and checked on a copy,
//! and only swapped in once it passes. A failed mutation leaves the store
//! exactly as it was.

use clubbank_types::{AllocationState, ClubId, ResourceVector, Result};

use crate::supply_conservation::SupplyConservation;

/// Owns the live allocation state.
///
/// Mutated only by a granted request ([`StateStore::apply_allocation_delta`])
/// or by wholesale replacement ([`StateStore::replace`]).
#[derive(Debug, Clone)]
pub struct StateStore {
    state: AllocationState,
    supply: SupplyConservation,
}

impl StateStore {
    /// Create a store holding `state`.
    ///
    /// # Errors
    /// Any validation error of `state`.
    pub fn new(state: AllocationState) -> Result<Self> {
        state.validate()?;
        let supply = SupplyConservation::new(state.total.clone());
        Ok(Self { state, supply })
    }

    /// Borrow the live state.
    #[must_use]
    pub fn state(&self) -> &AllocationState {
        &self.state
    }

    /// An owned copy of the live state.
    #[must_use]
    pub fn snapshot(&self) -> AllocationState {
        self.state.clone()
    }

    /// Replace the whole state (scenario load, reset, administrative edit).
    ///
    /// # Errors
    /// `MalformedMatrixDimensions`, `DuplicateClub` or `InvalidState` if the
    /// replacement breaks an invariant. The store is unchanged on error.
    pub fn replace(&mut self, state: AllocationState) -> Result<()> {
        state.validate()?;
        self.supply.record_install(state.total.clone());
        tracing::debug!(
            clubs = state.club_count(),
            kinds = state.resource_count(),
            total = %state.total,
            "state replaced"
        );
        self.state = state;
        Ok(())
    }

    /// Add `delta` to one club's allocation.
    ///
    /// Callers validate the request first; this is the last line of defense.
    ///
    /// # Errors
    /// - `UnknownClub` if the club is absent
    /// - `InvalidState` if the result breaks invariant 1 or 2
    /// - `InvariantViolation` if the result fails supply conservation
    pub fn apply_allocation_delta(&mut self, club_id: ClubId, delta: &ResourceVector) -> Result<()> {
        let next = self.state.with_allocation_delta(club_id, delta)?;
        self.supply.verify(&next)?;
        self.state = next;
        Ok(())
    }

    /// Re-check the live state against supply conservation.
    ///
    /// # Errors
    /// `InvariantViolation` if the live state no longer balances.
    pub fn verify(&self) -> Result<()> {
        self.supply.verify(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use clubbank_types::{Club, ClubbankError};

    use super::*;

    fn basic() -> AllocationState {
        AllocationState::new(
            [10, 5, 7],
            vec![
                Club::new(ClubId(0), "A", [7, 5, 3], [0, 1, 0]),
                Club::new(ClubId(1), "B", [3, 2, 2], [2, 0, 0]),
                Club::new(ClubId(2), "C", [9, 0, 2], [3, 0, 2]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn delta_moves_units_from_available() {
        let mut store = StateStore::new(basic()).unwrap();
        store
            .apply_allocation_delta(ClubId(0), &ResourceVector::from([0, 2, 0]))
            .unwrap();
        assert_eq!(
            store.state().clubs[0].allocation,
            ResourceVector::from([0, 3, 0])
        );
        assert_eq!(
            store.state().available().unwrap(),
            ResourceVector::from([5, 2, 5])
        );
        assert!(store.verify().is_ok());
    }

    #[test]
    fn invalid_delta_leaves_store_unchanged() {
        let mut store = StateStore::new(basic()).unwrap();
        let before = store.snapshot();

        // Exceeds C's maximum.
        let err = store
            .apply_allocation_delta(ClubId(2), &ResourceVector::from([7, 0, 0]))
            .unwrap_err();
        assert!(matches!(err, ClubbankError::InvalidState { .. }));

        // Within A's maximum but beyond the pool.
        let err = store
            .apply_allocation_delta(ClubId(0), &ResourceVector::from([6, 0, 0]))
            .unwrap_err();
        assert!(matches!(err, ClubbankError::InvalidState { .. }));

        let err = store
            .apply_allocation_delta(ClubId(7), &ResourceVector::from([0, 0, 0]))
            .unwrap_err();
        assert!(matches!(err, ClubbankError::UnknownClub(ClubId(7))));

        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn replace_swaps_whole_state() {
        let mut store = StateStore::new(basic()).unwrap();
        let next = AllocationState::new([2], vec![Club::new(ClubId(0), "solo", [2], [1])]).unwrap();
        store.replace(next.clone()).unwrap();
        assert_eq!(store.snapshot(), next);
        assert!(store.verify().is_ok());
    }

    #[test]
    fn replace_rejects_invalid_state() {
        let mut store = StateStore::new(basic()).unwrap();
        let mut bad = basic();
        bad.clubs[0].allocation = ResourceVector::from([8, 0, 0]);
        let err = store.replace(bad).unwrap_err();
        assert!(matches!(err, ClubbankError::InvalidState { .. }));
        assert_eq!(store.snapshot(), basic());
    }
}
