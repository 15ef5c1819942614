//! Wire types for the logical operations.
//!
//! Field names are `snake_case`; operation names are `camelCase` in the
//! `op` tag. Vectors are plain integer arrays. Inputs carry signed integers
//! so negative values reach validation and are reported as typed errors
//! instead of decoding failures.

use chrono::{DateTime, Utc};
use clubbank_ledger::CsvExport;
use clubbank_types::{
    AllocationState, ClubId, ClubbankError, DecisionRecord, RequestOutcome, ResourceVector, Result,
    SafetyOutcome, Scenario, constants,
};
use serde::{Deserialize, Serialize};

use crate::Processed;

pub const SAFE_STATE_MESSAGE: &str = "System is in a safe state";
pub const UNSAFE_STATE_MESSAGE: &str = "System is in an unsafe state";
pub const HEALTHY_STATUS: &str = "healthy";

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// A caller-supplied allocation state, as matrices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateInput {
    pub allocation: Vec<Vec<i64>>,
    pub max_need: Vec<Vec<i64>>,
    pub available: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub club_names: Option<Vec<String>>,
}

impl StateInput {
    /// Validate the matrices and build the state they describe.
    ///
    /// # Errors
    /// `MalformedMatrixDimensions` or `InvalidState`.
    pub fn to_state(&self, name_prefix: &str) -> Result<AllocationState> {
        AllocationState::from_matrices(
            &self.available,
            &self.allocation,
            &self.max_need,
            self.club_names.as_deref(),
            name_prefix,
        )
    }
}

/// One club's request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestInput {
    pub club_id: ClubId,
    pub resources: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequestInput {
    #[serde(flatten)]
    pub state: StateInput,
    pub request: RequestInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioInput {
    pub scenario: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditClubInput {
    pub club_id: ClubId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub max_need: Option<Vec<i64>>,
    #[serde(default)]
    pub allocation: Option<Vec<i64>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetTotalInput {
    pub total: Vec<i64>,
}

/// Convert an edited vector, rejecting components outside the unit range.
///
/// # Errors
/// `InvalidState` naming the first bad component.
pub fn unsigned_vector(field: &str, values: &[i64]) -> Result<ResourceVector> {
    ResourceVector::try_from_signed(values).map_err(|j| ClubbankError::InvalidState {
        reason: format!("{field}[{j}] must be a unit count in 0..={}", constants::MAX_UNITS),
    })
}

/// Every operation the engine answers, tagged by `op`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Operation {
    /// Evaluate a request against supplied matrices. Logged, never committed.
    RunRequest(RunRequestInput),
    /// Safety of supplied matrices. Not logged.
    CheckSafety(StateInput),
    /// Evaluate a request against the live state; grants are committed.
    SubmitRequest(RequestInput),
    CheckCurrentSafety,
    GetState,
    GetLogs,
    ExportLogs,
    ResetSystem,
    LoadScenario(ScenarioInput),
    EditClub(EditClubInput),
    SetTotal(SetTotalInput),
    ListScenarios,
    HealthCheck,
}

impl Operation {
    /// Name as it appears in the `op` tag.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::RunRequest(_) => "runRequest",
            Self::CheckSafety(_) => "checkSafety",
            Self::SubmitRequest(_) => "submitRequest",
            Self::CheckCurrentSafety => "checkCurrentSafety",
            Self::GetState => "getState",
            Self::GetLogs => "getLogs",
            Self::ExportLogs => "exportLogs",
            Self::ResetSystem => "resetSystem",
            Self::LoadScenario(_) => "loadScenario",
            Self::EditClub(_) => "editClub",
            Self::SetTotal(_) => "setTotal",
            Self::ListScenarios => "listScenarios",
            Self::HealthCheck => "healthCheck",
        }
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Result of `runRequest` and `submitRequest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOutput {
    /// True only when the request was granted.
    pub safe: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_sequence: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_allocation: Option<Vec<ResourceVector>>,
    pub need_matrix: Vec<ResourceVector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_available: Option<ResourceVector>,
    pub log_entry: DecisionRecord,
}

impl RequestOutput {
    /// # Errors
    /// `InvalidState` if the granted state cannot derive its availability.
    pub fn from_processed(processed: Processed) -> Result<Self> {
        let (new_allocation, new_available) = match &processed.outcome {
            RequestOutcome::Granted { state, .. } => {
                (Some(state.allocation_matrix()), Some(state.available()?))
            }
            RequestOutcome::Denied { .. } => (None, None),
        };
        let record = processed.record;
        Ok(Self {
            safe: processed.outcome.is_granted(),
            message: record.message.clone(),
            safe_sequence: (!record.safe_sequence.is_empty()).then(|| record.safe_sequence.clone()),
            new_allocation,
            need_matrix: processed.need_matrix,
            new_available,
            log_entry: record,
        })
    }
}

/// Result of `checkSafety` and `checkCurrentSafety`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyOutput {
    pub safe: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_sequence: Option<Vec<String>>,
    pub need_matrix: Vec<ResourceVector>,
    pub available: ResourceVector,
}

impl SafetyOutput {
    /// # Errors
    /// `InvalidState` if `state` is inconsistent.
    pub fn new(state: &AllocationState, safe: bool, sequence: &[ClubId]) -> Result<Self> {
        Ok(Self {
            safe,
            message: if safe {
                SAFE_STATE_MESSAGE
            } else {
                UNSAFE_STATE_MESSAGE
            }
            .to_string(),
            safe_sequence: safe.then(|| state.name_sequence(sequence)),
            need_matrix: state.need_matrix()?,
            available: state.available()?,
        })
    }
}

/// Full matrices of a state, plus scenario metadata when known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub resource_kinds: Vec<String>,
    pub club_names: Vec<String>,
    pub total: ResourceVector,
    pub available: ResourceVector,
    pub allocation: Vec<ResourceVector>,
    pub max_need: Vec<ResourceVector>,
    pub need_matrix: Vec<ResourceVector>,
    pub safe: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_sequence: Option<Vec<String>>,
}

impl StateView {
    /// # Errors
    /// `InvalidState` if `state` is inconsistent.
    pub fn new(
        state: &AllocationState,
        resource_kinds: Vec<String>,
        safe: bool,
        sequence: &[ClubId],
    ) -> Result<Self> {
        Ok(Self {
            scenario: None,
            description: None,
            resource_kinds,
            club_names: state.club_names(),
            total: state.total.clone(),
            available: state.available()?,
            allocation: state.allocation_matrix(),
            max_need: state.max_matrix(),
            need_matrix: state.need_matrix()?,
            safe,
            safe_sequence: safe.then(|| state.name_sequence(sequence)),
        })
    }

    #[must_use]
    pub fn with_scenario(mut self, name: Option<String>, description: Option<String>) -> Self {
        self.scenario = name;
        self.description = description;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogsOutput {
    /// Oldest first.
    pub logs: Vec<DecisionRecord>,
    pub total_requests: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetOutput {
    pub message: String,
    pub cleared_logs: usize,
    pub state_reset: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub description: String,
    pub clubs: usize,
    pub resource_kinds: Vec<String>,
    pub expected: SafetyOutcome,
}

impl From<&Scenario> for ScenarioSummary {
    fn from(s: &Scenario) -> Self {
        Self {
            name: s.name.clone(),
            description: s.description.clone(),
            clubs: s.state.club_count(),
            resource_kinds: s.resource_kinds.clone(),
            expected: s.expected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioListOutput {
    pub scenarios: Vec<ScenarioSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthOutput {
    pub status: String,
    pub message: String,
    pub engine: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Any successful operation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OperationOutput {
    Request(RequestOutput),
    Safety(SafetyOutput),
    State(StateView),
    Logs(LogsOutput),
    Export(CsvExport),
    Reset(ResetOutput),
    Scenarios(ScenarioListOutput),
    Health(HealthOutput),
}

/// A failed operation, as sent to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorOutput {
    pub error: String,
    pub code: String,
    /// True when the engine itself is at fault rather than the input.
    pub internal: bool,
}

impl From<&ClubbankError> for ErrorOutput {
    fn from(err: &ClubbankError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code().to_string(),
            internal: err.is_internal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_request_parses_flattened_state() {
        let json = r#"{
            "op": "runRequest",
            "allocation": [[0,1,0],[2,0,0],[3,0,2]],
            "max_need": [[7,5,3],[3,2,2],[9,0,2]],
            "available": [5,4,5],
            "request": {"club_id": 0, "resources": [0,2,0]}
        }"#;
        let op: Operation = serde_json::from_str(json).unwrap();
        let Operation::RunRequest(input) = op else {
            panic!("wrong variant");
        };
        assert_eq!(input.request.club_id, ClubId(0));
        assert_eq!(input.state.available, vec![5, 4, 5]);
        assert!(input.state.club_names.is_none());
    }

    #[test]
    fn unit_operations_parse_from_tag_alone() {
        let op: Operation = serde_json::from_str(r#"{"op":"getLogs"}"#).unwrap();
        assert_eq!(op, Operation::GetLogs);
        assert_eq!(op.name(), "getLogs");
        let op: Operation = serde_json::from_str(r#"{"op":"healthCheck"}"#).unwrap();
        assert_eq!(op, Operation::HealthCheck);
    }

    #[test]
    fn negative_club_id_fails_decoding() {
        let json = r#"{"op":"submitRequest","club_id":-1,"resources":[0]}"#;
        assert!(serde_json::from_str::<Operation>(json).is_err());
    }

    #[test]
    fn unknown_op_fails_decoding() {
        assert!(serde_json::from_str::<Operation>(r#"{"op":"launchMissiles"}"#).is_err());
    }

    #[test]
    fn negative_edit_vector_is_invalid_state() {
        let err = unsigned_vector("max_need", &[1, -1]).unwrap_err();
        assert!(matches!(err, ClubbankError::InvalidState { ref reason } if reason.contains("max_need[1]")));
    }

    #[test]
    fn error_output_carries_code() {
        let out = ErrorOutput::from(&ClubbankError::UnknownClub(ClubId(4)));
        assert_eq!(out.code, ClubbankError::UnknownClub(ClubId(4)).code());
        assert!(!out.internal);
    }

    #[test]
    fn unsafe_safety_output_omits_sequence() {
        let state = StateInput {
            allocation: vec![vec![1], vec![1]],
            max_need: vec![vec![2], vec![2]],
            available: vec![0],
            club_names: None,
        }
        .to_state("Club")
        .unwrap();
        let out = SafetyOutput::new(&state, false, &[]).unwrap();
        assert_eq!(out.message, UNSAFE_STATE_MESSAGE);
        let json = serde_json::to_value(&out).unwrap();
        assert!(json.get("safe_sequence").is_none());
    }
}
