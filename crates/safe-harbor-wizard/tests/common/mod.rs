//! Shared fixtures for wizard integration tests.

use safe_harbor_artifact::{ArtifactError, ExportSink};
use safe_harbor_core::FieldValue;
use safe_harbor_wizard::report::ReportForm;

/// Creates a report with both required step-1 fields filled.
#[allow(dead_code)]
pub fn report_with_required_fields() -> ReportForm {
    let mut report = ReportForm::new();
    report
        .set_field("incidentType", FieldValue::choice("physical"))
        .expect("incident type should be settable on step 1");
    report
        .set_field(
            "incidentDescription",
            FieldValue::text("He grabbed my arm during an argument."),
        )
        .expect("description should be settable on step 1");
    report
}

/// Export sink recording deliveries, optionally refusing them.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub refuse: bool,
    pub delivered: Vec<(String, Vec<u8>)>,
}

impl ExportSink for RecordingSink {
    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> Result<(), ArtifactError> {
        if self.refuse {
            return Err(ArtifactError::Export("download blocked".to_string()));
        }
        self.delivered.push((filename.to_string(), bytes.to_vec()));
        Ok(())
    }
}
