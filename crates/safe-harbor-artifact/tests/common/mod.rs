//! Shared fixtures for artifact integration tests.

use safe_harbor_artifact::{ArtifactError, Clipboard, ExportSink};
use safe_harbor_core::{FieldDef, FieldValue, Fields};

/// Field table mirroring a small plan.
pub const PLAN_DEFS: &[FieldDef] = &[
    FieldDef::text("warningSigns"),
    FieldDef::text("safeLocations"),
    FieldDef::text("emergencyContacts"),
];

/// Creates fields with the first and last values filled.
#[allow(dead_code)]
pub fn partially_filled() -> Fields {
    let mut fields = Fields::from_defs(PLAN_DEFS);
    fields
        .set("warningSigns", FieldValue::text("He checks my phone"))
        .expect("fixture field should exist");
    fields
        .set("emergencyContacts", FieldValue::text("Sam: 555-0101\nHotline"))
        .expect("fixture field should exist");
    fields
}

/// Sink recording deliveries in memory, optionally refusing them.
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

/// Clipboard recording writes in memory, optionally refusing them.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct RecordingClipboard {
    pub refuse: bool,
    pub content: Option<String>,
}

impl Clipboard for RecordingClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ArtifactError> {
        if self.refuse {
            return Err(ArtifactError::Clipboard("permission denied".to_string()));
        }
        self.content = Some(text.to_string());
        Ok(())
    }
}
