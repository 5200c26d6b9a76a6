//! Validates submission receipts against the frozen JSON schema.

use jsonschema::JSONSchema;
use rand::SeedableRng;
use rand::rngs::StdRng;
use safe_harbor_artifact::SubmissionReceipt;
use safe_harbor_core::FieldValue;
use safe_harbor_wizard::report::ReportForm;
use serde_json::{Value, json};

const SCHEMA_PATH: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../contracts/submission-receipt.schema.json"
);
const FIXTURE_PATH: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../contracts/fixtures/submission-receipt.valid.json"
);

fn load_json(path: &str) -> Value {
    let raw = std::fs::read_to_string(path).expect("json file should be readable");
    serde_json::from_str(&raw).expect("json file should be valid")
}

fn compile_validator() -> JSONSchema {
    let schema = load_json(SCHEMA_PATH);
    JSONSchema::compile(&schema).expect("schema should compile")
}

fn submitted_receipt(seed: u64) -> SubmissionReceipt {
    let mut report = ReportForm::new();
    report
        .set_field("incidentType", FieldValue::choice("digital"))
        .expect("type should be settable");
    report
        .set_field("incidentDescription", FieldValue::text("Tracker found on car"))
        .expect("description should be settable");
    report.advance();
    report
        .set_field("contactBack", FieldValue::Flag(true))
        .expect("contact opt-in should be settable");
    report.advance();
    report
        .submit_with_rng(&mut StdRng::seed_from_u64(seed))
        .expect("submission should succeed")
        .clone()
}

#[test]
fn receipt_fixture_matches_schema() {
    let validator = compile_validator();
    let fixture = load_json(FIXTURE_PATH);
    assert!(
        validator.is_valid(&fixture),
        "receipt fixture should validate against schema"
    );
}

#[test]
fn receipt_fixture_decodes_into_receipt_type() {
    let raw = std::fs::read(FIXTURE_PATH).expect("fixture should be readable");
    let receipt = SubmissionReceipt::from_json_bytes(&raw).expect("fixture should decode");
    assert_eq!(receipt.reference_id.to_string(), "DV-482913");
    assert_eq!(receipt.entries.len(), 10);
}

#[test]
fn generated_receipts_match_schema() {
    let validator = compile_validator();
    for seed in [0, 1, 42, 9_999] {
        let receipt = submitted_receipt(seed);
        let bytes = receipt.to_json_bytes().expect("receipt should encode");
        let value: Value = serde_json::from_slice(&bytes).expect("receipt should be JSON");
        assert!(
            validator.is_valid(&value),
            "generated receipt for seed {seed} should validate"
        );
    }
}

#[test]
fn schema_rejects_malformed_reference_ids() {
    let validator = compile_validator();
    for reference_id in ["DV-12345", "DV-1234567", "dv-123456", "DV-012345"] {
        let receipt = json!({
            "schema_version": "v1",
            "reference_id": reference_id,
            "entries": []
        });
        assert!(
            !validator.is_valid(&receipt),
            "{reference_id} should be rejected"
        );
    }
}

#[test]
fn schema_rejects_unknown_version_and_extra_fields() {
    let validator = compile_validator();
    let mut fixture = load_json(FIXTURE_PATH);
    fixture["schema_version"] = json!("v2");
    assert!(!validator.is_valid(&fixture));

    let mut fixture = load_json(FIXTURE_PATH);
    fixture["submitted_from"] = json!("203.0.113.7");
    assert!(!validator.is_valid(&fixture));
}
