//! Allocation state: the total pool plus every club's maximum and current
//! allocation.
//!
//! `available` is never stored. It is always derived as
//! `total - Σ allocation`, so a state cannot disagree with itself.
//!
//! Invariants checked by [`AllocationState::validate`]:
//! ```text
//! ∀ club, j:  0 ≤ allocation[club][j] ≤ max[club][j]
//! ∀ j:        Σ_club allocation[club][j] ≤ total[j]
//! club ids unique
//! ```

use serde::{Deserialize, Serialize};

use crate::{Club, ClubId, ClubbankError, ResourceVector, Result, constants};

/// A complete, self-consistent snapshot of the resource pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationState {
    /// Installed units per resource kind.
    pub total: ResourceVector,
    /// Clubs sorted by ascending id.
    pub clubs: Vec<Club>,
}

impl AllocationState {
    /// Build a state and check every invariant. Clubs are sorted by id.
    ///
    /// # Errors
    /// `MalformedMatrixDimensions`, `DuplicateClub` or `InvalidState`.
    pub fn new(total: impl Into<ResourceVector>, mut clubs: Vec<Club>) -> Result<Self> {
        clubs.sort_by_key(|c| c.id);
        let state = Self {
            total: total.into(),
            clubs,
        };
        state.validate()?;
        Ok(state)
    }

    /// Build a state from caller-supplied matrices, as carried on the wire.
    ///
    /// Club `i` gets id `i`. `total` is reconstructed as
    /// `available + Σ allocation`. Missing names default to
    /// `"{name_prefix} {i}"`.
    ///
    /// # Errors
    /// - `MalformedMatrixDimensions` if any length disagrees
    /// - `InvalidState` if a value is negative or an allocation exceeds its maximum
    pub fn from_matrices(
        available: &[i64],
        allocation: &[Vec<i64>],
        max_need: &[Vec<i64>],
        club_names: Option<&[String]>,
        name_prefix: &str,
    ) -> Result<Self> {
        let m = available.len();
        let n = allocation.len();
        if m == 0 {
            return Err(dimensions("available vector is empty; at least one resource kind is required"));
        }
        if n == 0 {
            return Err(dimensions("at least one club is required"));
        }
        if max_need.len() != n {
            return Err(dimensions(format!(
                "allocation has {n} rows but max_need has {}",
                max_need.len()
            )));
        }
        if let Some(names) = club_names {
            if names.len() != n {
                return Err(dimensions(format!(
                    "{} club names supplied for {n} clubs",
                    names.len()
                )));
            }
        }
        for (i, (alloc_row, max_row)) in allocation.iter().zip(max_need).enumerate() {
            if alloc_row.len() != m || max_row.len() != m {
                return Err(dimensions(format!(
                    "row {i} has {} allocation / {} max_need columns, expected {m}",
                    alloc_row.len(),
                    max_row.len()
                )));
            }
        }

        let available = ResourceVector::try_from_signed(available).map_err(|j| {
            ClubbankError::InvalidState {
                reason: format!(
                    "available[{j}] must be a unit count in 0..={}",
                    constants::MAX_UNITS
                ),
            }
        })?;

        let mut clubs = Vec::with_capacity(n);
        let mut total = available;
        for (i, (alloc_row, max_row)) in allocation.iter().zip(max_need).enumerate() {
            let id = ClubId::from_index(i).ok_or_else(|| dimensions("too many clubs"))?;
            let alloc = ResourceVector::try_from_signed(alloc_row).map_err(|j| {
                ClubbankError::InvalidState {
                    reason: format!(
                        "allocation[{i}][{j}] must be a unit count in 0..={}",
                        constants::MAX_UNITS
                    ),
                }
            })?;
            let max = ResourceVector::try_from_signed(max_row).map_err(|j| {
                ClubbankError::InvalidState {
                    reason: format!(
                        "max_need[{i}][{j}] must be a unit count in 0..={}",
                        constants::MAX_UNITS
                    ),
                }
            })?;
            total = total
                .checked_add(&alloc)
                .ok_or_else(|| ClubbankError::InvalidState {
                    reason: "total units overflow".to_string(),
                })?;
            let name = club_names.map_or_else(|| format!("{name_prefix} {i}"), |names| names[i].clone());
            clubs.push(Club::new(id, name, max, alloc));
        }

        Self::new(total, clubs)
    }

    /// Number of resource kinds (*m*).
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.total.len()
    }

    /// Number of clubs (*n*).
    #[must_use]
    pub fn club_count(&self) -> usize {
        self.clubs.len()
    }

    /// Look up a club by id.
    #[must_use]
    pub fn club(&self, id: ClubId) -> Option<&Club> {
        self.position(id).map(|i| &self.clubs[i])
    }

    fn position(&self, id: ClubId) -> Option<usize> {
        self.clubs.binary_search_by_key(&id, |c| c.id).ok()
    }

    /// Check dimensions, id uniqueness and invariants 1–2.
    ///
    /// # Errors
    /// `MalformedMatrixDimensions`, `DuplicateClub` or `InvalidState`.
    pub fn validate(&self) -> Result<()> {
        let m = self.resource_count();
        if m == 0 || m > constants::MAX_RESOURCE_KINDS {
            return Err(dimensions(format!(
                "{m} resource kinds, expected 1..={}",
                constants::MAX_RESOURCE_KINDS
            )));
        }
        if self.clubs.is_empty() || self.clubs.len() > constants::MAX_CLUBS {
            return Err(dimensions(format!(
                "{} clubs, expected 1..={}",
                self.clubs.len(),
                constants::MAX_CLUBS
            )));
        }
        for pair in self.clubs.windows(2) {
            if pair[0].id >= pair[1].id {
                return Err(ClubbankError::DuplicateClub(pair[1].id));
            }
        }
        if let Some(j) = self.total.as_slice().iter().position(|&v| v > constants::MAX_UNITS) {
            return Err(ClubbankError::InvalidState {
                reason: format!("total[{j}] exceeds {} units", constants::MAX_UNITS),
            });
        }
        for club in &self.clubs {
            if let Some(j) = club.max_need.as_slice().iter().position(|&v| v > constants::MAX_UNITS) {
                return Err(ClubbankError::InvalidState {
                    reason: format!("{} max_need[{j}] exceeds {} units", club.id, constants::MAX_UNITS),
                });
            }
            if club.max_need.len() != m || club.allocation.len() != m {
                return Err(dimensions(format!(
                    "{} has vectors of length {}/{}, expected {m}",
                    club.id,
                    club.max_need.len(),
                    club.allocation.len()
                )));
            }
            club.need()?;
        }
        self.available().map(|_| ())
    }

    /// Units held across all clubs.
    ///
    /// # Errors
    /// `InvalidState` on overflow or ragged vectors.
    pub fn allocated(&self) -> Result<ResourceVector> {
        self.clubs
            .iter()
            .try_fold(ResourceVector::zeros(self.resource_count()), |acc, c| {
                acc.checked_add(&c.allocation)
            })
            .ok_or_else(|| ClubbankError::InvalidState {
                reason: "allocation vectors cannot be summed".to_string(),
            })
    }

    /// `total - Σ allocation`.
    ///
    /// # Errors
    /// `InvalidState` if clubs hold more than is installed.
    pub fn available(&self) -> Result<ResourceVector> {
        let allocated = self.allocated()?;
        self.total
            .checked_sub(&allocated)
            .ok_or_else(|| ClubbankError::InvalidState {
                reason: format!(
                    "allocated {allocated} exceeds total {}",
                    self.total
                ),
            })
    }

    /// Need rows in club order.
    ///
    /// # Errors
    /// `InvalidState` if any allocation exceeds its maximum.
    pub fn need_matrix(&self) -> Result<Vec<ResourceVector>> {
        self.clubs.iter().map(Club::need).collect()
    }

    /// Allocation rows in club order.
    #[must_use]
    pub fn allocation_matrix(&self) -> Vec<ResourceVector> {
        self.clubs.iter().map(|c| c.allocation.clone()).collect()
    }

    /// Maximum-need rows in club order.
    #[must_use]
    pub fn max_matrix(&self) -> Vec<ResourceVector> {
        self.clubs.iter().map(|c| c.max_need.clone()).collect()
    }

    /// Club names in club order.
    #[must_use]
    pub fn club_names(&self) -> Vec<String> {
        self.clubs.iter().map(|c| c.name.clone()).collect()
    }

    /// Display names for a sequence of ids. Unknown ids render as their id.
    #[must_use]
    pub fn name_sequence(&self, ids: &[ClubId]) -> Vec<String> {
        ids.iter()
            .map(|id| self.club(*id).map_or_else(|| id.to_string(), |c| c.name.clone()))
            .collect()
    }

    /// A copy of this state with `delta` added to one club's allocation.
    ///
    /// # Errors
    /// - `UnknownClub` if `club_id` is absent
    /// - `InvalidState` if the result breaks invariant 1 or 2
    pub fn with_allocation_delta(&self, club_id: ClubId, delta: &ResourceVector) -> Result<Self> {
        let idx = self
            .position(club_id)
            .ok_or(ClubbankError::UnknownClub(club_id))?;
        let mut next = self.clone();
        let club = &mut next.clubs[idx];
        club.allocation = club
            .allocation
            .checked_add(delta)
            .ok_or_else(|| ClubbankError::InvalidState {
                reason: format!("delta {delta} does not apply to {club_id}"),
            })?;
        next.validate()?;
        Ok(next)
    }

    /// A copy of this state with one club replaced. Ids must match.
    ///
    /// # Errors
    /// `UnknownClub`, or any error from [`Self::validate`].
    pub fn with_club(&self, club: Club) -> Result<Self> {
        let idx = self
            .position(club.id)
            .ok_or(ClubbankError::UnknownClub(club.id))?;
        let mut next = self.clone();
        next.clubs[idx] = club;
        next.validate()?;
        Ok(next)
    }

    /// A copy of this state with a new installed total.
    ///
    /// # Errors
    /// Any error from [`Self::validate`].
    pub fn with_total(&self, total: ResourceVector) -> Result<Self> {
        let next = Self {
            total,
            clubs: self.clubs.clone(),
        };
        next.validate()?;
        Ok(next)
    }
}

fn dimensions(reason: impl Into<String>) -> ClubbankError {
    ClubbankError::MalformedMatrixDimensions {
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

#[cfg(any(test, feature = "test-helpers"))]
impl AllocationState {
    /// Random invariant-satisfying state with `n` clubs and `m` kinds.
    /// Component values stay below `max_units`.
    ///
    /// # Panics
    /// Panics if `n` or `m` is zero, or `max_units` is zero.
    pub fn random(rng: &mut impl rand::Rng, n: usize, m: usize, max_units: u32) -> Self {
        assert!(n > 0 && m > 0 && max_units > 0, "random state needs n, m, max_units > 0");
        let clubs: Vec<Club> = (0..n)
            .map(|i| {
                let max: Vec<u32> = (0..m).map(|_| rng.gen_range(0..max_units)).collect();
                let alloc: Vec<u32> = max.iter().map(|&hi| rng.gen_range(0..=hi)).collect();
                Club::new(
                    ClubId::from_index(i).expect("test club index fits u32"),
                    format!("Club {i}"),
                    max,
                    alloc,
                )
            })
            .collect();
        let mut total = ResourceVector::zeros(m);
        for club in &clubs {
            total = total
                .checked_add(&club.allocation)
                .expect("test allocations do not overflow");
        }
        let spare: Vec<u32> = (0..m).map(|_| rng.gen_range(0..max_units)).collect();
        let total = total
            .checked_add(&ResourceVector(spare))
            .expect("test totals do not overflow");
        Self::new(total, clubs).expect("random state satisfies invariants")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
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
    fn available_is_derived() {
        let state = basic();
        assert_eq!(state.available().unwrap(), ResourceVector::from([5, 4, 5]));
        assert_eq!(state.allocated().unwrap(), ResourceVector::from([5, 1, 2]));
    }

    #[test]
    fn need_matrix_rows() {
        let need = basic().need_matrix().unwrap();
        assert_eq!(need[0], ResourceVector::from([7, 4, 3]));
        assert_eq!(need[1], ResourceVector::from([1, 2, 2]));
        assert_eq!(need[2], ResourceVector::from([6, 0, 0]));
    }

    #[test]
    fn clubs_are_sorted_by_id() {
        let state = AllocationState::new(
            [5, 5],
            vec![
                Club::new(ClubId(4), "late", [1, 1], [0, 0]),
                Club::new(ClubId(1), "early", [1, 1], [0, 0]),
            ],
        )
        .unwrap();
        assert_eq!(state.clubs[0].id, ClubId(1));
        assert_eq!(state.club(ClubId(4)).unwrap().name, "late");
        assert!(state.club(ClubId(2)).is_none());
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = AllocationState::new(
            [5],
            vec![
                Club::new(ClubId(1), "a", [1], [0]),
                Club::new(ClubId(1), "b", [1], [0]),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, ClubbankError::DuplicateClub(ClubId(1))));
    }

    #[test]
    fn over_commitment_rejected() {
        let err = AllocationState::new(
            [2],
            vec![
                Club::new(ClubId(0), "a", [2], [2]),
                Club::new(ClubId(1), "b", [2], [1]),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, ClubbankError::InvalidState { .. }));
    }

    #[test]
    fn unit_ceiling_enforced() {
        let over = constants::MAX_UNITS + 1;
        let err = AllocationState::new([over], vec![Club::new(ClubId(0), "a", [1], [0])])
            .unwrap_err();
        assert!(matches!(err, ClubbankError::InvalidState { .. }));
        let err = AllocationState::new([5], vec![Club::new(ClubId(0), "a", [over], [0])])
            .unwrap_err();
        assert!(matches!(err, ClubbankError::InvalidState { .. }));
    }

    #[test]
    fn ragged_vectors_rejected() {
        let err = AllocationState::new([2, 2], vec![Club::new(ClubId(0), "a", [2], [1])])
            .unwrap_err();
        assert!(matches!(err, ClubbankError::MalformedMatrixDimensions { .. }));
    }

    #[test]
    fn from_matrices_reconstructs_total() {
        let state = AllocationState::from_matrices(
            &[3, 3, 2],
            &[vec![0, 1, 0], vec![2, 0, 0], vec![3, 0, 2]],
            &[vec![7, 5, 3], vec![3, 2, 2], vec![9, 0, 2]],
            None,
            "Club",
        )
        .unwrap();
        assert_eq!(state.total, ResourceVector::from([8, 4, 4]));
        assert_eq!(state.available().unwrap(), ResourceVector::from([3, 3, 2]));
        assert_eq!(state.club_names(), vec!["Club 0", "Club 1", "Club 2"]);
    }

    #[test]
    fn from_matrices_rejects_shape_mismatch() {
        let err = AllocationState::from_matrices(
            &[3, 3],
            &[vec![0, 1, 0]],
            &[vec![7, 5, 3]],
            None,
            "Club",
        )
        .unwrap_err();
        assert!(matches!(err, ClubbankError::MalformedMatrixDimensions { .. }));

        let err = AllocationState::from_matrices(
            &[3],
            &[vec![0], vec![1]],
            &[vec![1]],
            None,
            "Club",
        )
        .unwrap_err();
        assert!(matches!(err, ClubbankError::MalformedMatrixDimensions { .. }));

        let names = vec!["only one".to_string()];
        let err = AllocationState::from_matrices(
            &[3],
            &[vec![0], vec![1]],
            &[vec![1], vec![1]],
            Some(&names),
            "Club",
        )
        .unwrap_err();
        assert!(matches!(err, ClubbankError::MalformedMatrixDimensions { .. }));
    }

    #[test]
    fn from_matrices_rejects_negative_and_over_max() {
        let err = AllocationState::from_matrices(&[-1], &[vec![0]], &[vec![1]], None, "Club")
            .unwrap_err();
        assert!(matches!(err, ClubbankError::InvalidState { .. }));

        let err = AllocationState::from_matrices(&[1], &[vec![3]], &[vec![2]], None, "Club")
            .unwrap_err();
        assert!(matches!(err, ClubbankError::InvalidState { .. }));
    }

    #[test]
    fn delta_applies_and_validates() {
        let state = basic();
        let next = state
            .with_allocation_delta(ClubId(0), &ResourceVector::from([0, 2, 0]))
            .unwrap();
        assert_eq!(next.clubs[0].allocation, ResourceVector::from([0, 3, 0]));
        assert_eq!(next.available().unwrap(), ResourceVector::from([5, 2, 5]));
        // Original untouched.
        assert_eq!(state.clubs[0].allocation, ResourceVector::from([0, 1, 0]));

        // C declared no projectors.
        let err = state
            .with_allocation_delta(ClubId(2), &ResourceVector::from([0, 1, 0]))
            .unwrap_err();
        assert!(matches!(err, ClubbankError::InvalidState { .. }));

        // Within A's maximum, beyond the installed total.
        let err = state
            .with_allocation_delta(ClubId(0), &ResourceVector::from([6, 0, 0]))
            .unwrap_err();
        assert!(matches!(err, ClubbankError::InvalidState { .. }));

        let err = state
            .with_allocation_delta(ClubId(9), &ResourceVector::from([1, 0, 0]))
            .unwrap_err();
        assert!(matches!(err, ClubbankError::UnknownClub(ClubId(9))));
    }

    #[test]
    fn name_sequence_resolves_names() {
        let state = basic();
        assert_eq!(
            state.name_sequence(&[ClubId(1), ClubId(0), ClubId(7)]),
            vec!["B", "A", "club:7"]
        );
    }

    #[test]
    fn random_states_are_valid() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let state = AllocationState::random(&mut rng, 5, 3, 10);
            assert!(state.validate().is_ok());
        }
    }
}
