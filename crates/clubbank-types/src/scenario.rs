//! Named preset states used to (re)initialize a session.

use serde::{Deserialize, Serialize};

use crate::AllocationState;

/// Documented safety of a scenario's state as loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyOutcome {
    Safe,
    Unsafe,
}

/// A complete, invariant-satisfying state snapshot with a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    /// Display labels for the resource kinds, in vector order.
    pub resource_kinds: Vec<String>,
    pub state: AllocationState,
    pub expected: SafetyOutcome,
}

impl Scenario {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        resource_kinds: &[&str],
        state: AllocationState,
        expected: SafetyOutcome,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            resource_kinds: resource_kinds.iter().map(|k| (*k).to_string()).collect(),
            state,
            expected,
        }
    }
}
