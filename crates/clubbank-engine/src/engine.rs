//! Engine facade: every logical operation behind one entry point.
//!
//! Two kinds of operation share one session:
//!
//! - **Stateless** ([`Engine::run_request`], [`Engine::check_safety`]): the
//!   caller supplies the matrices, which are authoritative for that call.
//!   The live state is never read or written. `run_request` decisions are
//!   still appended to the session's audit log.
//! - **Session-backed** (everything else): operate on the live state under
//!   the session lock.

use chrono::Utc;
use clubbank_ledger::CsvExport;
use clubbank_safety::check_safety;
use clubbank_types::{ClubbankError, EngineConfig, Result, constants};

use crate::api::{
    EditClubInput, HEALTHY_STATUS, HealthOutput, LogsOutput, Operation, OperationOutput,
    RequestInput, RequestOutput, ResetOutput, RunRequestInput, SafetyOutput, ScenarioListOutput,
    ScenarioSummary, StateInput, StateView, unsigned_vector,
};
use crate::session::{ClubEdit, SafetyCheck, Session};

/// One engine instance: a session plus the operations over it.
#[derive(Debug)]
pub struct Engine {
    session: Session,
}

impl Engine {
    /// # Errors
    /// `Configuration` or `UnknownScenario` if the config is unusable.
    pub fn new(config: EngineConfig) -> Result<Self> {
        Ok(Self {
            session: Session::new(config)?,
        })
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    // -----------------------------------------------------------------
    // Stateless
    // -----------------------------------------------------------------

    /// Evaluate a request against caller-supplied matrices.
    ///
    /// # Errors
    /// `MalformedMatrixDimensions` / `InvalidState` for bad matrices,
    /// `UnknownClub` / `MalformedRequest` for a bad request. Nothing is
    /// logged on error.
    pub fn run_request(&self, input: &RunRequestInput) -> Result<RequestOutput> {
        let state = input
            .state
            .to_state(&self.session.config().club_name_prefix)
            .inspect_err(|e| tracing::debug!(error = %e, "supplied state rejected"))?;
        let request =
            clubbank_safety::parse_request(&state, input.request.club_id, &input.request.resources)?;
        let processed = self
            .session
            .processor()
            .decide(&state, input.request.club_id, &request)?;
        self.session.record_decision(processed.record.clone());
        RequestOutput::from_processed(processed)
    }

    /// Safety of caller-supplied matrices. Not logged.
    ///
    /// # Errors
    /// `MalformedMatrixDimensions` / `InvalidState` for bad matrices.
    pub fn check_safety(&self, input: &StateInput) -> Result<SafetyOutput> {
        let state = input
            .to_state(&self.session.config().club_name_prefix)
            .inspect_err(|e| tracing::debug!(error = %e, "supplied state rejected"))?;
        let report = check_safety(&state)?;
        SafetyOutput::new(&state, report.safe, &report.sequence)
    }

    // -----------------------------------------------------------------
    // Session-backed
    // -----------------------------------------------------------------

    /// Evaluate a request against the live state, committing a grant.
    ///
    /// # Errors
    /// As [`Session::process_raw_request`].
    pub fn submit_request(&self, input: &RequestInput) -> Result<RequestOutput> {
        let processed = self
            .session
            .process_raw_request(input.club_id, &input.resources)?;
        RequestOutput::from_processed(processed)
    }

    /// # Errors
    /// Internal error if the live state is inconsistent.
    pub fn check_current_safety(&self) -> Result<SafetyOutput> {
        let check = self.session.check_current_safety()?;
        SafetyOutput::new(&check.state, check.report.safe, &check.report.sequence)
    }

    /// # Errors
    /// Internal error if the live state is inconsistent.
    pub fn get_state(&self) -> Result<StateView> {
        let snapshot = self.session.snapshot();
        let report = check_safety(&snapshot.state)?;
        let description = snapshot
            .scenario
            .as_deref()
            .and_then(|name| self.session.catalog().get(name))
            .map(|s| s.description.clone());
        Ok(StateView::new(
            &snapshot.state,
            snapshot.resource_kinds,
            report.safe,
            &report.sequence,
        )?
        .with_scenario(snapshot.scenario, description))
    }

    #[must_use]
    pub fn get_logs(&self) -> LogsOutput {
        let logs = self.session.logs();
        LogsOutput {
            total_requests: logs.len(),
            logs,
        }
    }

    #[must_use]
    pub fn export_logs(&self) -> CsvExport {
        self.session.export_logs()
    }

    /// # Errors
    /// `UnknownScenario` if the default scenario is missing.
    pub fn reset_system(&self) -> Result<ResetOutput> {
        let summary = self.session.reset()?;
        let message = if summary.state_reset {
            "System reset successfully. Logs cleared and default scenario reloaded."
        } else {
            "System reset successfully. Logs cleared."
        };
        Ok(ResetOutput {
            message: message.to_string(),
            cleared_logs: summary.cleared_logs,
            state_reset: summary.state_reset,
            timestamp: summary.at,
        })
    }

    /// # Errors
    /// `UnknownScenario`; the live state is untouched.
    pub fn load_scenario(&self, name: &str) -> Result<StateView> {
        let (scenario, report) = self.session.load_scenario(name)?;
        Ok(StateView::new(
            &scenario.state,
            scenario.resource_kinds,
            report.safe,
            &report.sequence,
        )?
        .with_scenario(Some(scenario.name), Some(scenario.description)))
    }

    /// # Errors
    /// `UnknownClub`, `MalformedMatrixDimensions` or `InvalidState`.
    pub fn edit_club(&self, input: &EditClubInput) -> Result<StateView> {
        let edit = ClubEdit {
            club_id: input.club_id,
            name: input.name.clone(),
            max_need: input
                .max_need
                .as_deref()
                .map(|v| unsigned_vector("max_need", v))
                .transpose()?,
            allocation: input
                .allocation
                .as_deref()
                .map(|v| unsigned_vector("allocation", v))
                .transpose()?,
        };
        let check = self.session.edit_club(edit)?;
        Self::view_after_edit(check)
    }

    /// # Errors
    /// `MalformedMatrixDimensions` or `InvalidState`.
    pub fn set_total(&self, total: &[i64]) -> Result<StateView> {
        let check = self.session.set_total(unsigned_vector("total", total)?)?;
        Self::view_after_edit(check)
    }

    fn view_after_edit(check: SafetyCheck) -> Result<StateView> {
        StateView::new(
            &check.state,
            check.resource_kinds,
            check.report.safe,
            &check.report.sequence,
        )
    }

    #[must_use]
    pub fn list_scenarios(&self) -> ScenarioListOutput {
        ScenarioListOutput {
            scenarios: self
                .session
                .catalog()
                .iter()
                .map(ScenarioSummary::from)
                .collect(),
        }
    }

    #[must_use]
    pub fn health_check(&self) -> HealthOutput {
        HealthOutput {
            status: HEALTHY_STATUS.to_string(),
            message: format!("{} engine is running", constants::ENGINE_NAME),
            engine: constants::ENGINE_NAME.to_string(),
            version: constants::VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }

    // -----------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------

    /// Run one decoded operation.
    ///
    /// # Errors
    /// Whatever the operation returns. Every failure is traced with its
    /// operation name and code.
    pub fn dispatch(&self, op: &Operation) -> Result<OperationOutput> {
        let result = match op {
            Operation::RunRequest(input) => self.run_request(input).map(OperationOutput::Request),
            Operation::CheckSafety(input) => self.check_safety(input).map(OperationOutput::Safety),
            Operation::SubmitRequest(input) => {
                self.submit_request(input).map(OperationOutput::Request)
            }
            Operation::CheckCurrentSafety => {
                self.check_current_safety().map(OperationOutput::Safety)
            }
            Operation::GetState => self.get_state().map(OperationOutput::State),
            Operation::GetLogs => Ok(OperationOutput::Logs(self.get_logs())),
            Operation::ExportLogs => Ok(OperationOutput::Export(self.export_logs())),
            Operation::ResetSystem => self.reset_system().map(OperationOutput::Reset),
            Operation::LoadScenario(input) => {
                self.load_scenario(&input.scenario).map(OperationOutput::State)
            }
            Operation::EditClub(input) => self.edit_club(input).map(OperationOutput::State),
            Operation::SetTotal(input) => self.set_total(&input.total).map(OperationOutput::State),
            Operation::ListScenarios => Ok(OperationOutput::Scenarios(self.list_scenarios())),
            Operation::HealthCheck => Ok(OperationOutput::Health(self.health_check())),
        };
        if let Err(err) = &result {
            trace_failure(op.name(), err);
        }
        result
    }
}

fn trace_failure(op: &'static str, err: &ClubbankError) {
    if err.is_internal() {
        tracing::error!(op, code = err.code(), error = %err, "operation aborted");
    } else {
        tracing::debug!(op, code = err.code(), error = %err, "operation rejected");
    }
}
