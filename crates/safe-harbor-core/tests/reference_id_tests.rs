//! Tests reference identifier parsing and JSON encoding.

use safe_harbor_core::ReferenceId;

#[test]
fn reference_id_tests_parse_canonical_form() {
    let id: ReferenceId = "DV-482913".parse().expect("canonical id should parse");
    assert_eq!(id.suffix(), 482_913);
    assert_eq!(id.to_string(), "DV-482913");
}

#[test]
fn reference_id_tests_reject_malformed_input() {
    for raw in ["DV-12345", "DV-1234567", "dv-123456", "DV-12a456", "DV-099999", "123456"] {
        assert!(raw.parse::<ReferenceId>().is_err(), "{raw} should be rejected");
    }
}

#[test]
fn reference_id_tests_encode_as_json_string() {
    let id = ReferenceId::new(555_123).expect("id should be in range");
    let encoded = serde_json::to_string(&id).expect("encoding should succeed");
    assert_eq!(encoded, "\"DV-555123\"");

    let decoded: ReferenceId = serde_json::from_str(&encoded).expect("decoding should succeed");
    assert_eq!(decoded, id);
}
