//! The resource-request algorithm.
//!
//! Checks, in order (first failure wins):
//! 1. the club exists                      -> `UnknownClub` error
//! 2. the request has one entry per kind   -> `MalformedRequest` error
//! 3. `request ≤ need[club]`               -> denied, `ExceedsMaximumNeed`
//! 4. `request ≤ available`                -> denied, `ExceedsAvailable`
//! 5. the tentative state is safe          -> granted, else `UnsafeStateDenied`
//!
//! The tentative state is a copy; the input state is never touched.

use clubbank_types::{
    AllocationState, ClubId, ClubbankError, DenialReason, RequestOutcome, ResourceVector, Result,
};

use crate::{check_safety, verify_witness};

/// Convert a wire request vector for `club_id`, checking rules 1 and 2.
///
/// # Errors
/// `UnknownClub`, then `MalformedRequest` for a wrong length or a negative
/// component. Components too large for a unit count saturate, so they are
/// denied as `ExceedsMaximumNeed` later rather than rejected here.
pub fn parse_request(state: &AllocationState, club_id: ClubId, raw: &[i64]) -> Result<ResourceVector> {
    if state.club(club_id).is_none() {
        return Err(ClubbankError::UnknownClub(club_id));
    }
    check_length(state, raw.len())?;
    ResourceVector::saturating_from_signed(raw).map_err(|j| ClubbankError::MalformedRequest {
        reason: format!("resources[{j}] must be a non-negative unit count"),
    })
}

/// Run the resource-request algorithm for `club_id` asking for `request`.
///
/// # Errors
/// - `UnknownClub` / `MalformedRequest` for rules 1–2
/// - `InvariantViolation` if the checker returns a sequence that does not
///   replay; the request is not granted in that case
pub fn evaluate_request(
    state: &AllocationState,
    club_id: ClubId,
    request: &ResourceVector,
) -> Result<RequestOutcome> {
    let club = state.club(club_id).ok_or(ClubbankError::UnknownClub(club_id))?;
    check_length(state, request.len())?;

    let need = club.need()?;
    if let Some(j) = request.first_excess(&need) {
        tracing::debug!(%club_id, resource = j, %request, %need, "request exceeds declared need");
        return Ok(RequestOutcome::Denied {
            reason: DenialReason::ExceedsMaximumNeed,
        });
    }

    let available = state.available()?;
    if let Some(j) = request.first_excess(&available) {
        tracing::debug!(%club_id, resource = j, %request, %available, "request exceeds availability");
        return Ok(RequestOutcome::Denied {
            reason: DenialReason::ExceedsAvailable,
        });
    }

    let tentative = state.with_allocation_delta(club_id, request)?;
    let report = check_safety(&tentative)?;
    if !report.safe {
        return Ok(RequestOutcome::Denied {
            reason: DenialReason::UnsafeStateDenied,
        });
    }

    if !verify_witness(&tentative, &report.sequence) {
        tracing::error!(%club_id, sequence = ?report.sequence, "safe sequence failed replay");
        return Err(ClubbankError::InvariantViolation {
            reason: format!("safe sequence {:?} does not replay", report.sequence),
        });
    }

    Ok(RequestOutcome::Granted {
        sequence: report.sequence,
        state: tentative,
    })
}

fn check_length(state: &AllocationState, len: usize) -> Result<()> {
    let m = state.resource_count();
    if len != m {
        return Err(ClubbankError::MalformedRequest {
            reason: format!("request has {len} entries, expected {m}"),
        });
    }
    Ok(())
}
