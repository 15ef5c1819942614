//! Resource vectors: one whole-unit count per resource kind.
//!
//! Every vector in a state has the same length *m* (the number of resource
//! kinds). Comparisons are element-wise; a vector "fits within" another when
//! no component is larger.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whole-unit counts, one per resource kind, in resource-kind order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceVector(pub Vec<u32>);

impl ResourceVector {
    /// All-zero vector with `m` components.
    #[must_use]
    pub fn zeros(m: usize) -> Self {
        Self(vec![0; m])
    }

    /// Convert wire values, rejecting negative or oversized components.
    ///
    /// Returns the index of the first offending component on failure.
    pub fn try_from_signed(values: &[i64]) -> std::result::Result<Self, usize> {
        values
            .iter()
            .enumerate()
            .map(|(j, &v)| u32::try_from(v).map_err(|_| j))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Convert wire values, rejecting only negative components. Values
    /// beyond `u32::MAX` saturate, which still compares above any valid
    /// need (see [`crate::constants::MAX_UNITS`]).
    ///
    /// Returns the index of the first negative component on failure.
    pub fn saturating_from_signed(values: &[i64]) -> std::result::Result<Self, usize> {
        values
            .iter()
            .enumerate()
            .map(|(j, &v)| {
                if v < 0 {
                    Err(j)
                } else {
                    Ok(u32::try_from(v).unwrap_or(u32::MAX))
                }
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Number of components (resource kinds).
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// Whether every component is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&v| v == 0)
    }

    /// `self ≤ other` element-wise. Vectors of different lengths never fit.
    #[must_use]
    pub fn fits_within(&self, other: &Self) -> bool {
        self.len() == other.len() && self.0.iter().zip(&other.0).all(|(a, b)| a <= b)
    }

    /// Index of the first component where `self > other`.
    #[must_use]
    pub fn first_excess(&self, other: &Self) -> Option<usize> {
        self.0.iter().zip(&other.0).position(|(a, b)| a > b)
    }

    /// Element-wise sum. `None` on length mismatch or overflow.
    #[must_use]
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        if self.len() != other.len() {
            return None;
        }
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| a.checked_add(*b))
            .collect::<Option<Vec<_>>>()
            .map(Self)
    }

    /// Element-wise difference. `None` on length mismatch or if any
    /// component would go negative.
    #[must_use]
    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        if self.len() != other.len() {
            return None;
        }
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| a.checked_sub(*b))
            .collect::<Option<Vec<_>>>()
            .map(Self)
    }

    /// Join components with `separator`, e.g. `"0; 2; 0"`.
    #[must_use]
    pub fn render(&self, separator: &str) -> String {
        self.0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl From<Vec<u32>> for ResourceVector {
    fn from(values: Vec<u32>) -> Self {
        Self(values)
    }
}

impl<const N: usize> From<[u32; N]> for ResourceVector {
    fn from(values: [u32; N]) -> Self {
        Self(values.to_vec())
    }
}

impl fmt::Display for ResourceVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.render(", "))
    }
}
