#![warn(missing_docs)]
//! # safe-harbor-artifact
//!
//! ## Purpose
//! Turns a completed draft into something the user can read, keep, or hand
//! over: review lines, a submission receipt, or a plain-text export.
//!
//! ## Responsibilities
//! - Label and render field values for review screens.
//! - Generate `DV-######` reference identifiers for submitted reports.
//! - Render the flat `Label:\nvalue\n\n` text document and deliver it through
//!   an [`ExportSink`].
//! - Copy single values through a [`Clipboard`].
//! - Fingerprint exported documents so logs can refer to them without content.
//!
//! ## Data flow
//! Wizard finalizers pass a [`Fields`] snapshot -> [`submit`] or
//! [`export_to_sink`] -> [`SubmissionReceipt`] / [`ExportedDocument`] held by
//! the wizard for the rest of the view lifetime.
//!
//! ## Ownership and lifetimes
//! Artifacts own their strings and bytes; they never borrow the draft, so the
//! draft can be dropped independently.
//!
//! ## Error model
//! Sink and clipboard refusals return [`ArtifactError`]. Callers surface them
//! at the point of action; the draft is never touched.
//!
//! ## Security and privacy notes
//! Nothing is transmitted. The only durable write is an explicit export through
//! [`FileExportSink`]. Logs carry a SHA-256 fingerprint and byte count, never
//! document content.

use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;
use safe_harbor_core::{
    FieldValue, Fields, REFERENCE_MAX, REFERENCE_MIN, ReferenceId, field_label,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::info;

/// Filename used for plain-text safety plan downloads.
pub const EXPORT_FILENAME: &str = "my_safety_plan.txt";

/// Canonical schema tag for v1 submission receipts.
pub const RECEIPT_SCHEMA_VERSION_V1: &str = "v1";

/// One labelled value rendered for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewLine {
    /// Machine field name.
    pub field: String,
    /// Human-readable label derived from the field name.
    pub label: String,
    /// Rendered value (`Not specified` when blank).
    pub value: String,
}

impl ReviewLine {
    fn from_entry(name: &str, value: &FieldValue) -> Self {
        Self {
            field: name.to_string(),
            label: field_label(name),
            value: value.display_or_placeholder(),
        }
    }
}

/// Renders every field in definition order, blank ones as `Not specified`.
pub fn format_for_review(fields: &Fields) -> Vec<ReviewLine> {
    fields
        .iter()
        .map(|(name, value)| ReviewLine::from_entry(name, value))
        .collect()
}

/// Renders only the fields that carry user input, in definition order.
pub fn non_empty_entries(fields: &Fields) -> Vec<ReviewLine> {
    fields
        .iter()
        .filter(|(_, value)| !value.is_blank())
        .map(|(name, value)| ReviewLine::from_entry(name, value))
        .collect()
}

/// Receipt returned to the user after submitting a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    /// Receipt schema version for external transmitters.
    pub schema_version: String,
    /// Record-keeping token shown to the user.
    pub reference_id: ReferenceId,
    /// Reviewed report content at submission time.
    pub entries: Vec<ReviewLine>,
}

impl SubmissionReceipt {
    /// Serializes the receipt to compact JSON bytes.
    ///
    /// # Errors
    /// Returns [`ArtifactError::Codec`] when JSON serialization fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        serde_json::to_vec(self).map_err(ArtifactError::Codec)
    }

    /// Deserializes a receipt from JSON bytes.
    ///
    /// # Errors
    /// Returns [`ArtifactError::Codec`] when JSON decoding fails.
    pub fn from_json_bytes(raw: &[u8]) -> Result<Self, ArtifactError> {
        serde_json::from_slice(raw).map_err(ArtifactError::Codec)
    }
}

/// Draws a reference identifier from `rng`.
pub fn generate_reference_id<R: Rng + ?Sized>(rng: &mut R) -> ReferenceId {
    ReferenceId::clamped(rng.random_range(REFERENCE_MIN..=REFERENCE_MAX))
}

/// Submits a report locally using the thread RNG.
///
/// No network call happens here; a deployment that transmits reports does so
/// with the returned receipt.
pub fn submit(fields: &Fields) -> SubmissionReceipt {
    submit_with_rng(fields, &mut rand::rng())
}

/// Submits a report locally using a caller-provided RNG.
pub fn submit_with_rng<R: Rng + ?Sized>(fields: &Fields, rng: &mut R) -> SubmissionReceipt {
    let receipt = SubmissionReceipt {
        schema_version: RECEIPT_SCHEMA_VERSION_V1.to_string(),
        reference_id: generate_reference_id(rng),
        entries: format_for_review(fields),
    };
    info!(fields = receipt.entries.len(), "report submitted locally");
    receipt
}

/// Renders the flat plain-text document for every field.
///
/// Format: `Label:\nvalue\n\n` per field in definition order; blank values
/// render as `Not specified` and are never omitted.
pub fn export_as_text(fields: &Fields) -> Vec<u8> {
    let mut document = String::new();
    for line in format_for_review(fields) {
        document.push_str(&line.label);
        document.push_str(":\n");
        document.push_str(&line.value);
        document.push_str("\n\n");
    }
    document.into_bytes()
}

/// Returns a short SHA-256 fingerprint for log correlation.
pub fn document_fingerprint(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(&digest[..8])
}

/// Document produced by one successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    /// Filename the sink received.
    pub filename: String,
    /// Exported bytes.
    pub bytes: Vec<u8>,
    /// Short content fingerprint.
    pub fingerprint: String,
}

/// Local download target for exported documents.
pub trait ExportSink {
    /// Delivers one document.
    ///
    /// # Errors
    /// Returns [`ArtifactError::Export`] when the environment refuses.
    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> Result<(), ArtifactError>;
}

/// Sink writing downloads into a directory chosen by the user.
#[derive(Debug, Clone)]
pub struct FileExportSink {
    dir: PathBuf,
}

impl FileExportSink {
    /// Creates a sink targeting `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for FileExportSink {
    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> Result<(), ArtifactError> {
        let path = self.dir.join(filename);
        fs::write(&path, bytes).map_err(|error| {
            ArtifactError::Export(format!("unable to write '{}': {error}", path.display()))
        })
    }
}

/// Renders `fields` as text and delivers it as [`EXPORT_FILENAME`].
///
/// # Errors
/// Propagates the sink error; nothing is retained on failure.
pub fn export_to_sink(
    fields: &Fields,
    sink: &mut dyn ExportSink,
) -> Result<ExportedDocument, ArtifactError> {
    let bytes = export_as_text(fields);
    sink.deliver(EXPORT_FILENAME, &bytes)?;

    let fingerprint = document_fingerprint(&bytes);
    info!(
        filename = EXPORT_FILENAME,
        bytes = bytes.len(),
        fingerprint = %fingerprint,
        "document exported"
    );

    Ok(ExportedDocument {
        filename: EXPORT_FILENAME.to_string(),
        bytes,
        fingerprint,
    })
}

/// System clipboard abstraction.
pub trait Clipboard {
    /// Replaces the clipboard content.
    ///
    /// # Errors
    /// Returns [`ArtifactError::Clipboard`] when the environment refuses.
    fn write_text(&mut self, text: &str) -> Result<(), ArtifactError>;
}

/// Copies the verbatim value of one field.
///
/// # Errors
/// - [`ArtifactError::UnknownField`] when `name` is not defined.
/// - [`ArtifactError::NothingToCopy`] for flags and blank values.
/// - Clipboard refusals as reported by `clipboard`.
pub fn copy_field(
    fields: &Fields,
    name: &str,
    clipboard: &mut dyn Clipboard,
) -> Result<(), ArtifactError> {
    let value = fields
        .get(name)
        .ok_or_else(|| ArtifactError::UnknownField(name.to_string()))?;

    match value.as_str() {
        Some(text) if !value.is_blank() => clipboard.write_text(text),
        _ => Err(ArtifactError::NothingToCopy(name.to_string())),
    }
}

/// Artifact generation and delivery errors.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Download target refused the document.
    #[error("export failed: {0}")]
    Export(String),
    /// Clipboard refused the write.
    #[error("clipboard write failed: {0}")]
    Clipboard(String),
    /// Field is not part of the form.
    #[error("unknown field: {0}")]
    UnknownField(String),
    /// Field holds nothing copyable.
    #[error("field {0} has no text to copy")]
    NothingToCopy(String),
    /// JSON encoding/decoding error.
    #[error("receipt codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    //! Unit tests for review rendering and identifiers.

    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use safe_harbor_core::FieldDef;

    use super::*;

    const DEFS: &[FieldDef] = &[
        FieldDef::text("warningSigns"),
        FieldDef::flag("contactBack"),
        FieldDef::text("petsPlan"),
    ];

    #[test]
    fn review_lines_use_placeholder_for_blank_values() {
        let mut fields = Fields::from_defs(DEFS);
        fields
            .set("warningSigns", FieldValue::text("slammed doors"))
            .unwrap();

        let lines = format_for_review(&fields);
        assert_eq!(lines[0].label, "Warning Signs");
        assert_eq!(lines[0].value, "slammed doors");
        assert_eq!(lines[1].value, "No");
        assert_eq!(lines[2].value, "Not specified");

        let non_empty = non_empty_entries(&fields);
        assert_eq!(non_empty.len(), 2);
        assert_eq!(non_empty[1].field, "contactBack");
    }

    #[test]
    fn seeded_reference_ids_are_reproducible_and_in_range() {
        let first = generate_reference_id(&mut StdRng::seed_from_u64(7));
        let second = generate_reference_id(&mut StdRng::seed_from_u64(7));
        assert_eq!(first, second);
        assert!((REFERENCE_MIN..=REFERENCE_MAX).contains(&first.suffix()));
    }

    #[test]
    fn fingerprint_is_sixteen_hex_chars() {
        let fingerprint = document_fingerprint(b"Warning Signs:\nNot specified\n\n");
        assert_eq!(fingerprint.len(), 16);
        assert!(fingerprint.bytes().all(|byte| byte.is_ascii_hexdigit()));
    }
}
