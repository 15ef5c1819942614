//! Scenario catalog: named preset states for demonstration and testing.
//!
//! | Name        | Clubs × kinds | As loaded |
//! |-------------|---------------|-----------|
//! | `basic`     | 3 × 3         | safe      |
//! | `complex`   | 5 × 4         | safe      |
//! | `contended` | 5 × 3         | safe; Drama Club asking for `[0,2,0]` is denied as unsafe |
//! | `unsafe`    | 3 × 3         | unsafe, pool exhausted |

use std::collections::BTreeMap;

use clubbank_types::{
    AllocationState, Club, ClubId, ClubbankError, Result, SafetyOutcome, Scenario, constants,
};

/// Read-only table of named scenarios, iterated in name order.
#[derive(Debug, Clone, Default)]
pub struct ScenarioCatalog {
    scenarios: BTreeMap<String, Scenario>,
}

impl ScenarioCatalog {
    /// An empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in presets.
    ///
    /// # Errors
    /// Only if a preset were to break an invariant.
    pub fn builtin() -> Result<Self> {
        let mut catalog = Self::new();
        catalog.register(basic()?)?;
        catalog.register(complex()?)?;
        catalog.register(contended()?)?;
        catalog.register(unsafe_state()?)?;
        Ok(catalog)
    }

    /// Add a scenario.
    ///
    /// # Errors
    /// `Configuration` if the name is taken, or any validation error of the
    /// scenario's state.
    pub fn register(&mut self, scenario: Scenario) -> Result<()> {
        scenario.state.validate()?;
        if scenario.resource_kinds.len() != scenario.state.resource_count() {
            return Err(ClubbankError::Configuration(format!(
                "scenario {} labels {} resource kinds but has {}",
                scenario.name,
                scenario.resource_kinds.len(),
                scenario.state.resource_count()
            )));
        }
        if self.scenarios.contains_key(&scenario.name) {
            return Err(ClubbankError::Configuration(format!(
                "scenario {} registered twice",
                scenario.name
            )));
        }
        self.scenarios.insert(scenario.name.clone(), scenario);
        Ok(())
    }

    /// A copy of the named scenario.
    ///
    /// # Errors
    /// `UnknownScenario` if the name is not registered.
    pub fn load(&self, name: &str) -> Result<Scenario> {
        self.get(name)
            .cloned()
            .ok_or_else(|| ClubbankError::UnknownScenario(name.to_string()))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Scenario> {
        self.scenarios.get(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.scenarios.keys().map(String::as_str).collect()
    }

    /// Registered scenarios, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

fn clubs<const M: usize>(rows: &[(&str, [u32; M], [u32; M])]) -> Result<Vec<Club>> {
    rows.iter()
        .enumerate()
        .map(|(i, (name, max, alloc))| {
            let id = ClubId::from_index(i).ok_or_else(|| {
                ClubbankError::MalformedMatrixDimensions {
                    reason: "too many clubs".to_string(),
                }
            })?;
            Ok(Club::new(id, *name, *max, *alloc))
        })
        .collect()
}

fn basic() -> Result<Scenario> {
    let state = AllocationState::new(
        [10, 5, 7],
        clubs(&[
            ("Drama Club", [7, 5, 3], [0, 1, 0]),
            ("Music Club", [3, 2, 2], [2, 0, 0]),
            ("Dance Club", [9, 0, 2], [3, 0, 2]),
        ])?,
    )?;
    Ok(Scenario::new(
        "basic",
        "Basic safe state scenario",
        &constants::DEFAULT_RESOURCE_KINDS,
        state,
        SafetyOutcome::Safe,
    ))
}

fn complex() -> Result<Scenario> {
    let state = AllocationState::new(
        [3, 14, 12, 12],
        clubs(&[
            ("Tech Club", [0, 0, 1, 2], [0, 0, 1, 2]),
            ("Art Club", [1, 7, 5, 0], [1, 0, 0, 0]),
            ("Sports Club", [2, 3, 5, 6], [1, 3, 5, 4]),
            ("Literature Club", [0, 6, 5, 2], [0, 6, 3, 2]),
            ("Photography Club", [0, 6, 5, 6], [0, 0, 1, 4]),
        ])?,
    )?;
    Ok(Scenario::new(
        "complex",
        "Complex scenario with 5 clubs and 4 resources",
        &["Stage", "Projector", "Sound", "Lighting"],
        state,
        SafetyOutcome::Safe,
    ))
}

fn contended() -> Result<Scenario> {
    let state = AllocationState::new(
        [10, 5, 7],
        clubs(&[
            ("Drama Club", [7, 5, 3], [0, 1, 0]),
            ("Music Club", [3, 2, 2], [3, 0, 2]),
            ("Dance Club", [9, 0, 2], [3, 0, 2]),
            ("Debate Club", [2, 2, 2], [2, 1, 1]),
            ("Robotics Club", [4, 3, 3], [0, 0, 2]),
        ])?,
    )?;
    Ok(Scenario::new(
        "contended",
        "Safe state where Drama Club requesting [0, 2, 0] would lead to an unsafe state",
        &constants::DEFAULT_RESOURCE_KINDS,
        state,
        SafetyOutcome::Safe,
    ))
}

fn unsafe_state() -> Result<Scenario> {
    let state = AllocationState::new(
        [6, 1, 4],
        clubs(&[
            ("Drama Club", [7, 5, 3], [0, 1, 0]),
            ("Music Club", [3, 2, 2], [3, 0, 2]),
            ("Dance Club", [9, 0, 2], [3, 0, 2]),
        ])?,
    )?;
    Ok(Scenario::new(
        "unsafe",
        "Unsafe state scenario",
        &constants::DEFAULT_RESOURCE_KINDS,
        state,
        SafetyOutcome::Unsafe,
    ))
}
