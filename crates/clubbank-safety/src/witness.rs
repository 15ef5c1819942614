//! Independent replay of a safe sequence.
//!
//! Walks the clubs in the claimed order, checking that each club's need
//! fits what is available at that point, then releasing its allocation.
//! Shares no code path with [`crate::check_safety`], so a grant is only
//! committed when both agree.

use std::collections::HashSet;

use clubbank_types::AllocationState;
use clubbank_types::ClubId;

/// Whether `sequence` is a valid safe ordering of every club in `state`.
#[must_use]
pub fn verify_witness(state: &AllocationState, sequence: &[ClubId]) -> bool {
    if sequence.len() != state.club_count() {
        return false;
    }
    let Ok(mut work) = state.available() else {
        return false;
    };

    let mut seen = HashSet::with_capacity(sequence.len());
    for id in sequence {
        if !seen.insert(*id) {
            return false;
        }
        let Some(club) = state.club(*id) else {
            return false;
        };
        let Ok(need) = club.need() else {
            return false;
        };
        if !need.fits_within(&work) {
            return false;
        }
        match work.checked_add(&club.allocation) {
            Some(next) => work = next,
            None => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use clubbank_types::Club;

    use super::*;
    use crate::check_safety;

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
    fn checker_sequence_verifies() {
        let state = basic();
        let report = check_safety(&state).unwrap();
        assert!(verify_witness(&state, &report.sequence));
    }

    #[test]
    fn out_of_order_sequence_fails() {
        // A first needs [7,4,3] but only [5,4,5] is free.
        assert!(!verify_witness(&basic(), &[ClubId(0), ClubId(1), ClubId(2)]));
    }

    #[test]
    fn incomplete_or_repeated_sequence_fails() {
        let state = basic();
        assert!(!verify_witness(&state, &[ClubId(1), ClubId(0)]));
        assert!(!verify_witness(&state, &[ClubId(1), ClubId(1), ClubId(1)]));
        assert!(!verify_witness(&state, &[ClubId(1), ClubId(0), ClubId(9)]));
    }

    #[test]
    fn random_safe_states_produce_valid_witnesses() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let state = AllocationState::random(&mut rng, 6, 3, 8);
            let report = check_safety(&state).unwrap();
            if report.safe {
                assert!(verify_witness(&state, &report.sequence));
            } else {
                assert!(report.sequence.is_empty());
            }
        }
    }
}
