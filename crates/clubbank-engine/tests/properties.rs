//! Randomized properties of the request path.
//!
//! Random states come from `AllocationState::random` (the `test-helpers`
//! feature of clubbank-types); requests are random vectors bounded by each
//! club's maximum so all three denial reasons show up.

use clubbank_engine::RequestProcessor;
use clubbank_ledger::{AuditLog, StateStore};
use clubbank_safety::{check_safety, verify_witness};
use clubbank_types::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_request(rng: &mut StdRng, state: &AllocationState) -> (ClubId, ResourceVector) {
    let club = &state.clubs[rng.gen_range(0..state.club_count())];
    let units: Vec<u32> = club
        .max_need
        .as_slice()
        .iter()
        .map(|&hi| rng.gen_range(0..=hi.min(3)))
        .collect();
    (club.id, ResourceVector(units))
}

#[test]
fn invariants_hold_over_random_request_sequences() {
    let mut rng = StdRng::seed_from_u64(0x0C1B);
    let processor = RequestProcessor::new(&EngineConfig::default());

    for _ in 0..40 {
        let initial = AllocationState::random(&mut rng, 5, 3, 8);
        let started_safe = check_safety(&initial).unwrap().safe;
        let total = initial.total.clone();
        let mut store = StateStore::new(initial).unwrap();
        let mut log = AuditLog::new();

        for _ in 0..60 {
            let before = store.snapshot();
            let (club, req) = random_request(&mut rng, &before);
            let processed = processor.process(&mut store, &mut log, club, &req).unwrap();
            let after = store.snapshot();

            assert!(after.validate().is_ok());
            assert_eq!(after.total, total);
            store.verify().unwrap();

            match processed.outcome {
                RequestOutcome::Granted { ref sequence, .. } => {
                    assert!(verify_witness(&after, sequence));
                    assert!(check_safety(&after).unwrap().safe);
                }
                RequestOutcome::Denied { .. } => assert_eq!(after, before),
            }
            if started_safe {
                assert!(check_safety(&after).unwrap().safe, "safe state became unsafe");
            }
        }
        assert_eq!(log.len(), 60);
    }
}

#[test]
fn same_input_same_decision() {
    let mut rng = StdRng::seed_from_u64(7);
    let processor = RequestProcessor::new(&EngineConfig::default());

    for _ in 0..100 {
        let state = AllocationState::random(&mut rng, 4, 3, 6);
        let (club, req) = random_request(&mut rng, &state);
        let a = processor.decide(&state, club, &req).unwrap();
        let b = processor.decide(&state, club, &req).unwrap();
        assert_eq!(a.outcome, b.outcome);
        assert_eq!(a.record.safe_sequence, b.record.safe_sequence);
        assert_eq!(a.record.message, b.record.message);
        assert_eq!(a.record.state_digest, b.record.state_digest);
    }
}

#[test]
fn safety_check_is_pure() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..100 {
        let state = AllocationState::random(&mut rng, 6, 4, 10);
        let copy = state.clone();
        let first = check_safety(&state).unwrap();
        let second = check_safety(&state).unwrap();
        assert_eq!(first, second);
        assert_eq!(state, copy);
        if first.safe {
            assert_eq!(first.sequence.len(), state.club_count());
            assert!(verify_witness(&state, &first.sequence));
        } else {
            assert!(first.sequence.is_empty());
        }
    }
}
