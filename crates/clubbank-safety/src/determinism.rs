//! State digests for audit replay.
//!
//! Every decision records the digest of the state it was evaluated against.
//! Re-running the same request on a state with the same digest must produce
//! the same decision and the same safe sequence.

use clubbank_types::{AllocationState, ResourceVector};
use sha2::{Digest, Sha256};

/// Compute a SHA-256 digest over a state.
///
/// Depends on:
/// - total vector
/// - club ids, names, maximum and allocation vectors (in id order)
#[must_use]
pub fn compute_state_digest(state: &AllocationState) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"clubbank:state:v1:");
    update_vector(&mut hasher, &state.total);
    hasher.update((state.clubs.len() as u64).to_le_bytes());

    for club in &state.clubs {
        hasher.update(club.id.0.to_le_bytes());
        hasher.update((club.name.len() as u64).to_le_bytes());
        hasher.update(club.name.as_bytes());
        update_vector(&mut hasher, &club.max_need);
        update_vector(&mut hasher, &club.allocation);
    }

    let result = hasher.finalize();
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&result);
    digest
}

/// Hex form of [`compute_state_digest`], as stored in decision records.
#[must_use]
pub fn state_digest_hex(state: &AllocationState) -> String {
    hex::encode(compute_state_digest(state))
}

fn update_vector(hasher: &mut Sha256, v: &ResourceVector) {
    hasher.update((v.len() as u64).to_le_bytes());
    for unit in v.as_slice() {
        hasher.update(unit.to_le_bytes());
    }
}
