//! Session handle: the live state store and audit log behind one lock.
//!
//! Every mutating operation (request commit, scenario load, reset,
//! administrative edit) takes the write guard for its whole duration, so
//! the availability read, tentative delta, safety check, commit and audit
//! append form one atomic unit. Pure reads take the read guard and always
//! see a fully committed state.
//!
//! No operation waits on anything but the guard: denied requests return
//! immediately and are never queued.

use chrono::{DateTime, Utc};
use clubbank_ledger::{AuditLog, CsvExport, StateStore};
use clubbank_safety::{SafetyReport, check_safety, parse_request};
use clubbank_types::{
    AllocationState, Club, ClubId, ClubbankError, DecisionRecord, EngineConfig, ResetPolicy,
    ResourceVector, Result, Scenario,
};
use parking_lot::RwLock;

use crate::{Processed, RequestProcessor, ScenarioCatalog};

/// State guarded by the session lock.
#[derive(Debug)]
struct SessionState {
    store: StateStore,
    log: AuditLog,
    /// Labels of the live state's resource kinds.
    resource_kinds: Vec<String>,
    /// Scenario the live state was loaded from, cleared by edits.
    scenario: Option<String>,
}

/// A safety report together with the state it was computed on and that
/// state's resource labels, all read under one lock.
#[derive(Debug, Clone)]
pub struct SafetyCheck {
    pub report: SafetyReport,
    pub state: AllocationState,
    pub resource_kinds: Vec<String>,
}

/// Consistent copy of the live session.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub state: AllocationState,
    pub resource_kinds: Vec<String>,
    pub scenario: Option<String>,
}

/// Result of a reset.
#[derive(Debug, Clone)]
pub struct ResetSummary {
    pub cleared_logs: usize,
    pub state_reset: bool,
    pub at: DateTime<Utc>,
}

/// Administrative edit of a single club. `None` fields stay unchanged.
#[derive(Debug, Clone, Default)]
pub struct ClubEdit {
    pub club_id: ClubId,
    pub name: Option<String>,
    pub max_need: Option<ResourceVector>,
    pub allocation: Option<ResourceVector>,
}

/// One independent allocation session.
///
/// Sessions share nothing; tests and multi-tenant hosts create as many as
/// they like.
#[derive(Debug)]
pub struct Session {
    inner: RwLock<SessionState>,
    processor: RequestProcessor,
    catalog: ScenarioCatalog,
    config: EngineConfig,
}

impl Session {
    /// Create a session with the built-in catalog, starting from the
    /// configured default scenario.
    ///
    /// # Errors
    /// `Configuration` if the config is invalid, `UnknownScenario` if the
    /// default scenario is not in the catalog.
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_catalog(config, ScenarioCatalog::builtin()?)
    }

    /// Create a session over a custom catalog.
    ///
    /// # Errors
    /// As [`Self::new`].
    pub fn with_catalog(config: EngineConfig, catalog: ScenarioCatalog) -> Result<Self> {
        config.validate()?;
        let initial = catalog.load(&config.default_scenario)?;
        let inner = SessionState {
            store: StateStore::new(initial.state)?,
            log: AuditLog::new(),
            resource_kinds: initial.resource_kinds,
            scenario: Some(initial.name),
        };
        tracing::info!(scenario = %config.default_scenario, "session started");
        Ok(Self {
            inner: RwLock::new(inner),
            processor: RequestProcessor::new(&config),
            catalog,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn catalog(&self) -> &ScenarioCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn processor(&self) -> &RequestProcessor {
        &self.processor
    }

    // -----------------------------------------------------------------
    // Requests
    // -----------------------------------------------------------------

    /// Run a request against the live state; grants are committed.
    ///
    /// # Errors
    /// `UnknownClub` / `MalformedRequest` (nothing logged), or an internal
    /// error if the commit is refused.
    pub fn process_request(&self, club_id: ClubId, request: &ResourceVector) -> Result<Processed> {
        let mut guard = self.inner.write();
        let SessionState { store, log, .. } = &mut *guard;
        self.processor
            .process(store, log, club_id, request)
            .inspect_err(|e| report_error("process_request", e))
    }

    /// Like [`Self::process_request`] but takes the request as wire values,
    /// so a negative component is rejected as `MalformedRequest`.
    ///
    /// # Errors
    /// As [`Self::process_request`].
    pub fn process_raw_request(&self, club_id: ClubId, raw: &[i64]) -> Result<Processed> {
        let mut guard = self.inner.write();
        let SessionState { store, log, .. } = &mut *guard;
        let request = parse_request(store.state(), club_id, raw)?;
        self.processor
            .process(store, log, club_id, &request)
            .inspect_err(|e| report_error("process_request", e))
    }

    /// Append a decision taken against a caller-supplied state.
    pub fn record_decision(&self, record: DecisionRecord) {
        self.inner.write().log.append(record);
    }

    // -----------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------

    /// Safety of the live state. Never mutates, never logs.
    ///
    /// # Errors
    /// Internal error if the live state is inconsistent.
    pub fn check_current_safety(&self) -> Result<SafetyCheck> {
        let (state, resource_kinds) = {
            let guard = self.inner.read();
            (guard.store.snapshot(), guard.resource_kinds.clone())
        };
        let report = check_safety(&state).inspect_err(|e| report_error("check_current_safety", e))?;
        Ok(SafetyCheck {
            report,
            state,
            resource_kinds,
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let guard = self.inner.read();
        SessionSnapshot {
            state: guard.store.snapshot(),
            resource_kinds: guard.resource_kinds.clone(),
            scenario: guard.scenario.clone(),
        }
    }

    /// Audit records, oldest first.
    #[must_use]
    pub fn logs(&self) -> Vec<DecisionRecord> {
        self.inner.read().log.all().to_vec()
    }

    #[must_use]
    pub fn export_logs(&self) -> CsvExport {
        self.inner.read().log.export(Utc::now())
    }

    // -----------------------------------------------------------------
    // Replacement
    // -----------------------------------------------------------------

    /// Replace the live state with a catalog scenario. Not logged as a
    /// decision.
    ///
    /// # Errors
    /// `UnknownScenario`; the live state is untouched.
    pub fn load_scenario(&self, name: &str) -> Result<(Scenario, SafetyReport)> {
        let scenario = self.catalog.load(name)?;
        let mut guard = self.inner.write();
        let report = replace_state(&mut guard, scenario.state.clone(), "scenario load")?;
        guard.resource_kinds.clone_from(&scenario.resource_kinds);
        guard.scenario = Some(scenario.name.clone());
        tracing::info!(scenario = name, safe = report.safe, "scenario loaded");
        Ok((scenario, report))
    }

    /// Clear the audit log and, under [`ResetPolicy::LogsAndState`], reload
    /// the default scenario.
    ///
    /// # Errors
    /// `UnknownScenario` if the default scenario vanished from the catalog.
    pub fn reset(&self) -> Result<ResetSummary> {
        let reload = match self.config.reset_policy {
            ResetPolicy::LogsOnly => None,
            ResetPolicy::LogsAndState => Some(self.catalog.load(&self.config.default_scenario)?),
        };
        let mut guard = self.inner.write();
        let state_reset = if let Some(scenario) = reload {
            replace_state(&mut guard, scenario.state, "reset")?;
            guard.resource_kinds = scenario.resource_kinds;
            guard.scenario = Some(scenario.name);
            true
        } else {
            false
        };
        let cleared_logs = guard.log.reset();
        tracing::info!(cleared_logs, state_reset, "system reset");
        Ok(ResetSummary {
            cleared_logs,
            state_reset,
            at: Utc::now(),
        })
    }

    /// Administrative edit of one club. Goes through the same invariant
    /// check as any replacement; traced, not logged as a decision.
    ///
    /// # Errors
    /// `UnknownClub`, `MalformedMatrixDimensions` or `InvalidState`; the
    /// live state is untouched.
    pub fn edit_club(&self, edit: ClubEdit) -> Result<SafetyCheck> {
        let mut guard = self.inner.write();
        let current = guard
            .store
            .state()
            .club(edit.club_id)
            .cloned()
            .ok_or(ClubbankError::UnknownClub(edit.club_id))?;
        let club = Club {
            id: current.id,
            name: edit.name.unwrap_or(current.name),
            max_need: edit.max_need.unwrap_or(current.max_need),
            allocation: edit.allocation.unwrap_or(current.allocation),
        };
        let next = guard.store.state().with_club(club)?;
        let report = replace_state(&mut guard, next.clone(), "club edit")?;
        guard.scenario = None;
        tracing::info!(club_id = %edit.club_id, safe = report.safe, "club edited");
        Ok(SafetyCheck {
            report,
            state: next,
            resource_kinds: guard.resource_kinds.clone(),
        })
    }

    /// Administrative change of the installed total.
    ///
    /// # Errors
    /// `InvalidState` if clubs already hold more than the new total;
    /// `MalformedMatrixDimensions` on a length change.
    pub fn set_total(&self, total: ResourceVector) -> Result<SafetyCheck> {
        let mut guard = self.inner.write();
        if total.len() != guard.store.state().resource_count() {
            return Err(ClubbankError::MalformedMatrixDimensions {
                reason: format!(
                    "total has {} entries, expected {}",
                    total.len(),
                    guard.store.state().resource_count()
                ),
            });
        }
        let next = guard.store.state().with_total(total)?;
        let report = replace_state(&mut guard, next.clone(), "total edit")?;
        guard.scenario = None;
        tracing::info!(total = %next.total, safe = report.safe, "installed total changed");
        Ok(SafetyCheck {
            report,
            state: next,
            resource_kinds: guard.resource_kinds.clone(),
        })
    }
}

/// Validate, safety-check and install `next`. The safety result is
/// reported, not enforced: unsafe demonstration states are legal.
fn replace_state(
    guard: &mut SessionState,
    next: AllocationState,
    cause: &'static str,
) -> Result<SafetyReport> {
    next.validate()?;
    let report = check_safety(&next)?;
    if !report.safe {
        tracing::warn!(cause, "installing a state with no safe sequence");
    }
    guard.store.replace(next)?;
    Ok(report)
}

fn report_error(operation: &'static str, err: &ClubbankError) {
    if err.is_internal() {
        tracing::error!(operation, error = %err, "engine invariant broken; operation aborted");
    } else {
        tracing::debug!(operation, error = %err, "request rejected");
    }
}
