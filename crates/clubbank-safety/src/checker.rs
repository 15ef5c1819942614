//! The safety algorithm.
//!
//! ```text
//! work     = available
//! finished = [false; n]
//! loop:
//!     pick the lowest-id unfinished club with need ≤ work
//!     none found  -> unsafe
//!     work += allocation[club]; finished[club] = true; restart scan
//! all finished    -> safe, sequence is the witness
//! ```
//!
//! Each pass finishes at most one club and there are at most `n` passes, so
//! the check is O(n²·m).

use clubbank_types::{AllocationState, ClubId, ClubbankError, ResourceVector, Result};

/// Result of the safety algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyReport {
    pub safe: bool,
    /// Witness order when safe, empty when unsafe.
    pub sequence: Vec<ClubId>,
}

impl SafetyReport {
    fn unsafe_state() -> Self {
        Self {
            safe: false,
            sequence: Vec::new(),
        }
    }
}

/// Decide whether `state` is safe.
///
/// # Errors
/// `InvalidState` if the state itself is inconsistent (allocation over
/// maximum, or over-committed pool). Callers validate before calling, so
/// this only fires on a bug upstream.
pub fn check_safety(state: &AllocationState) -> Result<SafetyReport> {
    let need = state.need_matrix()?;
    let mut work = state.available()?;
    let n = state.club_count();
    let mut finished = vec![false; n];
    let mut sequence = Vec::with_capacity(n);

    while sequence.len() < n {
        let Some(i) = (0..n).find(|&i| !finished[i] && need[i].fits_within(&work)) else {
            tracing::debug!(
                finished = sequence.len(),
                clubs = n,
                work = %work,
                "no unfinished club fits remaining availability"
            );
            return Ok(SafetyReport::unsafe_state());
        };

        let club = &state.clubs[i];
        work = release(&work, &club.allocation)?;
        finished[i] = true;
        sequence.push(club.id);
    }

    Ok(SafetyReport {
        safe: true,
        sequence,
    })
}

fn release(work: &ResourceVector, allocation: &ResourceVector) -> Result<ResourceVector> {
    work.checked_add(allocation)
        .ok_or_else(|| ClubbankError::InvalidState {
            reason: format!("releasing {allocation} into {work} overflows"),
        })
}

#[cfg(test)]
mod tests {
    use clubbank_types::Club;

    use super::*;

    fn state(total: [u32; 3], rows: &[([u32; 3], [u32; 3])]) -> AllocationState {
        let clubs = rows
            .iter()
            .enumerate()
            .map(|(i, (max, alloc))| {
                Club::new(ClubId::from_index(i).unwrap(), format!("C{i}"), *max, *alloc)
            })
            .collect();
        AllocationState::new(total, clubs).unwrap()
    }

    fn textbook_base() -> AllocationState {
        state(
            [10, 5, 7],
            &[
                ([7, 5, 3], [0, 1, 0]),
                ([3, 2, 2], [2, 0, 0]),
                ([9, 0, 2], [3, 0, 2]),
            ],
        )
    }

    #[test]
    fn basic_state_is_safe_with_lowest_id_first() {
        let report = check_safety(&textbook_base()).unwrap();
        assert!(report.safe);
        assert_eq!(report.sequence, vec![ClubId(1), ClubId(0), ClubId(2)]);
    }

    #[test]
    fn classic_five_process_sequence() {
        let s = state(
            [10, 5, 7],
            &[
                ([7, 5, 3], [0, 1, 0]),
                ([3, 2, 2], [2, 0, 0]),
                ([9, 0, 2], [3, 0, 2]),
                ([2, 2, 2], [2, 1, 1]),
                ([4, 3, 3], [0, 0, 2]),
            ],
        );
        let report = check_safety(&s).unwrap();
        assert!(report.safe);
        assert_eq!(
            report.sequence,
            vec![ClubId(1), ClubId(3), ClubId(0), ClubId(2), ClubId(4)]
        );
    }

    #[test]
    fn exhausted_pool_with_outstanding_need_is_unsafe() {
        let s = state(
            [6, 1, 4],
            &[
                ([7, 5, 3], [0, 1, 0]),
                ([3, 2, 2], [3, 0, 2]),
                ([9, 0, 2], [3, 0, 2]),
            ],
        );
        assert!(s.available().unwrap().is_zero());
        let report = check_safety(&s).unwrap();
        assert!(!report.safe);
        assert!(report.sequence.is_empty());
    }

    #[test]
    fn zero_need_clubs_always_finish() {
        let s = state([1, 1, 1], &[([1, 1, 1], [1, 1, 1])]);
        let report = check_safety(&s).unwrap();
        assert!(report.safe);
        assert_eq!(report.sequence, vec![ClubId(0)]);
    }

    #[test]
    fn partial_progress_then_stall_is_unsafe() {
        // Club 1 can finish, but what it releases is not enough for club 0.
        let s = state(
            [2, 3, 3],
            &[([3, 3, 3], [0, 0, 0]), ([1, 1, 1], [1, 0, 0])],
        );
        let report = check_safety(&s).unwrap();
        assert!(!report.safe);
        assert!(report.sequence.is_empty());
    }

    #[test]
    fn check_is_deterministic() {
        let s = textbook_base();
        let a = check_safety(&s).unwrap();
        let b = check_safety(&s).unwrap();
        assert_eq!(a, b);
    }
}
