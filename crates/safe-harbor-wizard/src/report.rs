//! Incident report: details -> sharing preferences -> review & submit.
//!
//! Step 1 requires an incident type and a description. Step 2 never blocks.
//! Step 3 submits locally and yields a `DV-######` reference identifier.

use rand::Rng;
use safe_harbor_artifact::{ReviewLine, SubmissionReceipt, format_for_review, submit_with_rng};
use safe_harbor_core::{FieldDef, FieldValue, Fields};

use crate::{Advance, FieldUpdate, Finalizer, StepDef, Validator, Wizard, WizardError};

/// Incident type options, in display order.
pub const INCIDENT_TYPES: &[&str] = &[
    "physical",
    "emotional",
    "sexual",
    "financial",
    "stalking",
    "digital",
    "other",
];

/// Contact channel options.
pub const CONTACT_METHODS: &[&str] = &["email", "phone", "text"];

/// Report fields in definition order.
pub const REPORT_FIELDS: &[FieldDef] = &[
    FieldDef::choice("incidentType", INCIDENT_TYPES, ""),
    FieldDef::text("incidentDescription"),
    FieldDef::text("incidentDate"),
    FieldDef::text("incidentLocation"),
    FieldDef::flag("shareWithPolice"),
    FieldDef::flag("shareWithServices"),
    FieldDef::flag("contactBack"),
    FieldDef::choice("contactMethod", CONTACT_METHODS, "email"),
    FieldDef::text("contactDetails"),
    FieldDef::text("additionalInfo"),
];

/// Report steps.
pub const REPORT_STEPS: &[StepDef] = &[
    StepDef {
        title: "Incident Details",
        fields: &[
            "incidentType",
            "incidentDescription",
            "incidentDate",
            "incidentLocation",
        ],
        validator: Validator::RequireNonBlank(&["incidentType", "incidentDescription"]),
    },
    StepDef {
        title: "Information Sharing",
        fields: &[
            "shareWithPolice",
            "shareWithServices",
            "contactBack",
            "contactMethod",
            "contactDetails",
            "additionalInfo",
        ],
        validator: Validator::Always,
    },
    StepDef {
        title: "Review & Submit",
        fields: &[],
        validator: Validator::Always,
    },
];

/// Returns the display label of an incident type option.
pub fn incident_type_label(value: &str) -> Option<&'static str> {
    match value {
        "physical" => Some("Physical Abuse"),
        "emotional" => Some("Emotional/Verbal Abuse"),
        "sexual" => Some("Sexual Abuse"),
        "financial" => Some("Financial Abuse"),
        "stalking" => Some("Stalking/Harassment"),
        "digital" => Some("Digital/Cyber Abuse"),
        "other" => Some("Other"),
        _ => None,
    }
}

/// Who the report may be shared with, and how to reach the reporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharingSummary {
    /// One line per sharing choice, or the anonymous-only line.
    pub recipients: Vec<&'static str>,
    /// `method: details` when the reporter asked to be contacted.
    pub contact: Option<String>,
}

/// Summarizes the sharing step for the review screen.
pub fn sharing_summary(fields: &Fields) -> SharingSummary {
    let flag = |name| fields.get(name).and_then(FieldValue::as_flag).unwrap_or(false);

    let mut recipients = Vec::new();
    if flag("shareWithPolice") {
        recipients.push("Share with law enforcement");
    }
    if flag("shareWithServices") {
        recipients.push("Share with support services");
    }
    if recipients.is_empty() {
        recipients.push("Not sharing with any services (anonymous report only)");
    }

    let contact = flag("contactBack").then(|| {
        let text = |name| {
            fields
                .get(name)
                .and_then(FieldValue::as_str)
                .unwrap_or_default()
        };
        format!("{}: {}", text("contactMethod"), text("contactDetails"))
    });

    SharingSummary {
        recipients,
        contact,
    }
}

struct LocalSubmission<'r, R: ?Sized> {
    rng: &'r mut R,
}

impl<R: Rng + ?Sized> Finalizer for LocalSubmission<'_, R> {
    type Artifact = SubmissionReceipt;

    fn finalize(&mut self, fields: &Fields) -> Result<SubmissionReceipt, WizardError> {
        Ok(submit_with_rng(fields, &mut *self.rng))
    }
}

/// Incident report form owning its wizard.
#[derive(Debug, Clone)]
pub struct ReportForm {
    wizard: Wizard<SubmissionReceipt>,
}

impl ReportForm {
    /// Creates an empty report at step 1.
    pub fn new() -> Self {
        Self {
            wizard: Wizard::from_tables(REPORT_FIELDS, REPORT_STEPS),
        }
    }

    /// Returns the underlying wizard for rendering.
    pub fn wizard(&self) -> &Wizard<SubmissionReceipt> {
        &self.wizard
    }

    /// See [`Wizard::set_field`].
    ///
    /// # Errors
    /// Propagates [`WizardError`] from the wizard.
    pub fn set_field(&mut self, name: &str, value: FieldValue) -> Result<FieldUpdate, WizardError> {
        self.wizard.set_field(name, value)
    }

    /// See [`Wizard::advance`].
    pub fn advance(&mut self) -> Advance {
        self.wizard.advance()
    }

    /// See [`Wizard::retreat`].
    pub fn retreat(&mut self) -> bool {
        self.wizard.retreat()
    }

    /// See [`Wizard::jump_back`].
    ///
    /// # Errors
    /// Propagates [`WizardError`] from the wizard.
    pub fn jump_back(&mut self, step: usize) -> Result<(), WizardError> {
        self.wizard.jump_back(step)
    }

    /// Review lines for the whole report.
    pub fn review(&self) -> Vec<ReviewLine> {
        format_for_review(self.wizard.fields())
    }

    /// Sharing summary for the review step.
    pub fn sharing(&self) -> SharingSummary {
        sharing_summary(self.wizard.fields())
    }

    /// Submits the report using the thread RNG.
    ///
    /// # Errors
    /// See [`Wizard::finalize`].
    pub fn submit(&mut self) -> Result<&SubmissionReceipt, WizardError> {
        self.submit_with_rng(&mut rand::rng())
    }

    /// Submits the report using a caller-provided RNG.
    ///
    /// Repeated calls return the first receipt unchanged.
    ///
    /// # Errors
    /// See [`Wizard::finalize`].
    pub fn submit_with_rng<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<&SubmissionReceipt, WizardError> {
        self.wizard.finalize(&mut LocalSubmission { rng })
    }
}

impl Default for ReportForm {
    fn default() -> Self {
        Self::new()
    }
}
