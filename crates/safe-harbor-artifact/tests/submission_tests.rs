//! Integration tests for local report submission.

mod common;

use rand::SeedableRng;
use rand::rngs::StdRng;
use safe_harbor_artifact::{SubmissionReceipt, submit, submit_with_rng};

fn matches_reference_pattern(raw: &str) -> bool {
    raw.len() == 9
        && raw.starts_with("DV-")
        && raw[3..].bytes().all(|byte| byte.is_ascii_digit())
}

#[test]
fn submission_tests_reference_ids_match_pattern() {
    let fields = common::partially_filled();
    for _ in 0..200 {
        let receipt = submit(&fields);
        let raw = receipt.reference_id.to_string();
        assert!(matches_reference_pattern(&raw), "{raw} should match DV-######");
        assert!((100_000..=999_999).contains(&receipt.reference_id.suffix()));
    }
}

#[test]
fn submission_tests_receipt_round_trips_through_json() {
    let fields = common::partially_filled();
    let receipt = submit_with_rng(&fields, &mut StdRng::seed_from_u64(42));

    let encoded = receipt.to_json_bytes().expect("encoding should succeed");
    let decoded = SubmissionReceipt::from_json_bytes(&encoded).expect("decoding should succeed");
    assert_eq!(decoded, receipt);
    assert_eq!(decoded.entries[1].value, "Not specified");
}
