//! Request processor: turns a resource request into a recorded decision.
//!
//! The processor wraps the pure resource-request algorithm with the
//! bookkeeping around it:
//!
//! - **decide**: evaluate against any state and build the audit record,
//!   touching nothing (used for caller-supplied states)
//! - **process**: decide against the live store, commit on grant, append
//!   the record (used by the session, under its write guard)
//!
//! Validation failures (`UnknownClub`, `MalformedRequest`) produce no record.

use chrono::Utc;
use clubbank_ledger::{AuditLog, StateStore};
use clubbank_safety::{evaluate_request, state_digest_hex};
use clubbank_types::{
    AllocationState, ClubId, ClubbankError, DecisionId, DecisionRecord, DenialReason,
    EngineConfig, RequestOutcome, ResourceVector, Result,
};

/// A decision together with its audit record.
#[derive(Debug, Clone)]
pub struct Processed {
    pub outcome: RequestOutcome,
    pub record: DecisionRecord,
    /// Need rows of the state after the decision (unchanged on denial).
    pub need_matrix: Vec<ResourceVector>,
}

/// Orchestrates single resource requests.
#[derive(Debug, Clone)]
pub struct RequestProcessor {
    /// Labels for resource kinds, used in log fields.
    resource_kinds: Vec<String>,
}

impl RequestProcessor {
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            resource_kinds: config.resource_kinds.clone(),
        }
    }

    /// Evaluate a request against `state` and build its record. Pure.
    ///
    /// # Errors
    /// `UnknownClub`, `MalformedRequest`, or `InvariantViolation` from the
    /// request algorithm.
    pub fn decide(
        &self,
        state: &AllocationState,
        club_id: ClubId,
        request: &ResourceVector,
    ) -> Result<Processed> {
        let outcome = evaluate_request(state, club_id, request)?;
        let club_name = state
            .club(club_id)
            .map_or_else(|| club_id.to_string(), |c| c.name.clone());

        let (safe_sequence, need_matrix) = match &outcome {
            RequestOutcome::Granted { sequence, state: next } => {
                (next.name_sequence(sequence), next.need_matrix()?)
            }
            RequestOutcome::Denied { reason } => {
                self.trace_denial(state, club_id, &club_name, request, *reason);
                (Vec::new(), state.need_matrix()?)
            }
        };

        let record = DecisionRecord {
            id: DecisionId::new(),
            club_id,
            club_name: club_name.clone(),
            requested_resources: request.clone(),
            decision: outcome.decision(),
            reason: outcome.denial_reason(),
            message: outcome.message(&club_name),
            safe_sequence,
            state_digest: state_digest_hex(state),
            timestamp: Utc::now(),
        };

        Ok(Processed {
            outcome,
            record,
            need_matrix,
        })
    }

    /// Decide against the live store; on grant commit the delta. The record
    /// is appended in both cases.
    ///
    /// # Errors
    /// As [`Self::decide`], plus `InvariantViolation` if the store refuses
    /// to commit a granted delta. Nothing is committed or logged on error.
    pub fn process(
        &self,
        store: &mut StateStore,
        log: &mut AuditLog,
        club_id: ClubId,
        request: &ResourceVector,
    ) -> Result<Processed> {
        let processed = self.decide(store.state(), club_id, request)?;

        if let RequestOutcome::Granted { sequence, .. } = &processed.outcome {
            commit(store, club_id, request)?;
            tracing::info!(
                %club_id,
                club = %processed.record.club_name,
                %request,
                sequence = ?sequence,
                "request granted"
            );
        }

        log.append(processed.record.clone());
        Ok(processed)
    }

    fn trace_denial(
        &self,
        state: &AllocationState,
        club_id: ClubId,
        club_name: &str,
        request: &ResourceVector,
        reason: DenialReason,
    ) {
        let bound = match reason {
            DenialReason::ExceedsMaximumNeed => state.club(club_id).and_then(|c| c.need().ok()),
            DenialReason::ExceedsAvailable => state.available().ok(),
            DenialReason::UnsafeStateDenied => None,
        };
        let kind = bound
            .and_then(|b| request.first_excess(&b))
            .map(|j| self.kind_label(j));
        tracing::info!(
            %club_id,
            club = club_name,
            %request,
            %reason,
            kind = kind.as_deref().unwrap_or("-"),
            "request denied"
        );
    }

    fn kind_label(&self, index: usize) -> String {
        self.resource_kinds
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("resource[{index}]"))
    }
}

/// Apply a granted delta. The store re-validates and checks supply
/// conservation; a refusal here means the decision and the store disagree.
fn commit(store: &mut StateStore, club_id: ClubId, delta: &ResourceVector) -> Result<()> {
    store.apply_allocation_delta(club_id, delta).map_err(|e| {
        tracing::error!(%club_id, %delta, error = %e, "granted request could not be committed");
        ClubbankError::InvariantViolation {
            reason: format!("granted request for {club_id} could not be committed: {e}"),
        }
    })
}
