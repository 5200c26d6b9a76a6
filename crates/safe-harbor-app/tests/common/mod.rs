//! Shared fixtures for app integration tests.

use safe_harbor_app::{AppConfig, AppShell};
use safe_harbor_artifact::{ArtifactError, Clipboard, ExportSink};
use safe_harbor_core::FieldValue;
use safe_harbor_privacy::InMemoryBrowsingContext;

/// Shell type used across app tests.
#[allow(dead_code)]
pub type TestShell = AppShell<InMemoryBrowsingContext, RecordingSink>;

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

/// Clipboard recording the last write, optionally refusing.
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

/// Creates a shell with default config at `start`.
#[allow(dead_code)]
pub fn shell_at(start: &str) -> TestShell {
    AppShell::new(
        &AppConfig::default(),
        InMemoryBrowsingContext::new(start),
        RecordingSink::default(),
        0,
    )
    .expect("default config should mount")
}

/// Fills both required report fields on the mounted report.
#[allow(dead_code)]
pub fn fill_required_report(shell: &mut TestShell) {
    let report = shell.report_mut().expect("report should be mounted");
    report
        .set_field("incidentType", FieldValue::choice("physical"))
        .expect("type should be settable");
    report
        .set_field("incidentDescription", FieldValue::text("Shoved me into a wall"))
        .expect("description should be settable");
}
