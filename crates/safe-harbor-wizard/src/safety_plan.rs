//! Personal safety plan: four free-text sections and a review/export step.
//!
//! No step ever blocks progress. The review shows only answered fields; the
//! export renders every field and refuses an entirely empty plan.

use safe_harbor_artifact::{
    ArtifactError, Clipboard, ExportSink, ExportedDocument, ReviewLine, copy_field,
    export_to_sink, non_empty_entries,
};
use safe_harbor_core::{FieldDef, FieldValue, Fields};
use tracing::debug;

use crate::{Advance, FieldUpdate, Finalizer, StepDef, Validator, Wizard, WizardError};

/// Shown on the review step when nothing has been filled in.
pub const EMPTY_PLAN_MESSAGE: &str =
    "You haven't added any information to your safety plan yet.";

/// Plan fields in definition (and export) order.
pub const PLAN_FIELDS: &[FieldDef] = &[
    FieldDef::text("warningSigns"),
    FieldDef::text("safeLocations"),
    FieldDef::text("emergencyContacts"),
    FieldDef::text("supportPeople"),
    FieldDef::text("escapeRoutes"),
    FieldDef::text("essentialItems"),
    FieldDef::text("childrenPlan"),
    FieldDef::text("petsPlan"),
    FieldDef::text("legalDocuments"),
    FieldDef::text("technology"),
];

/// Plan steps.
pub const PLAN_STEPS: &[StepDef] = &[
    StepDef {
        title: "Personal Safety",
        fields: &["warningSigns", "safeLocations", "technology"],
        validator: Validator::Always,
    },
    StepDef {
        title: "Support Network",
        fields: &["emergencyContacts", "supportPeople"],
        validator: Validator::Always,
    },
    StepDef {
        title: "Emergency Plan",
        fields: &["escapeRoutes", "essentialItems", "legalDocuments"],
        validator: Validator::Always,
    },
    StepDef {
        title: "Children & Pets",
        fields: &["childrenPlan", "petsPlan"],
        validator: Validator::Always,
    },
    StepDef {
        title: "Review Plan",
        fields: &[],
        validator: Validator::Always,
    },
];

/// Content of the review step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanReview {
    /// Nothing has been written yet; export is unavailable.
    Empty,
    /// Answered fields in definition order.
    Entries(Vec<ReviewLine>),
}

struct PlanExport<'s> {
    sink: &'s mut dyn ExportSink,
}

impl Finalizer for PlanExport<'_> {
    type Artifact = ExportedDocument;

    fn finalize(&mut self, fields: &Fields) -> Result<ExportedDocument, WizardError> {
        if fields.all_blank() {
            return Err(WizardError::EmptyDraft);
        }
        Ok(export_to_sink(fields, &mut *self.sink)?)
    }
}

/// Safety plan form owning its wizard.
#[derive(Debug, Clone)]
pub struct SafetyPlanForm {
    wizard: Wizard<ExportedDocument>,
}

impl SafetyPlanForm {
    /// Creates an empty plan at step 1.
    pub fn new() -> Self {
        Self {
            wizard: Wizard::from_tables(PLAN_FIELDS, PLAN_STEPS),
        }
    }

    /// Returns the underlying wizard for rendering.
    pub fn wizard(&self) -> &Wizard<ExportedDocument> {
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

    /// Returns to the first section from the empty-review prompt.
    ///
    /// # Errors
    /// Returns [`WizardError::AlreadyCompleted`] after export.
    pub fn restart(&mut self) -> Result<(), WizardError> {
        self.wizard.jump_back(1)
    }

    /// Builds the review step content.
    pub fn review(&self) -> PlanReview {
        let entries = non_empty_entries(self.wizard.fields());
        if entries.is_empty() {
            return PlanReview::Empty;
        }
        PlanReview::Entries(entries)
    }

    /// Exports the plan as text through `sink`.
    ///
    /// Repeated calls after success return the first document without
    /// delivering again.
    ///
    /// # Errors
    /// - [`WizardError::EmptyDraft`] when no field holds input.
    /// - [`WizardError::Artifact`] when the sink refuses; the draft stays
    ///   editable for a retry.
    /// - See [`Wizard::finalize`] for step errors.
    pub fn export(&mut self, sink: &mut dyn ExportSink) -> Result<&ExportedDocument, WizardError> {
        self.wizard.finalize(&mut PlanExport { sink })
    }

    /// Copies one answered field to the clipboard.
    ///
    /// # Errors
    /// Propagates [`ArtifactError`]; the draft is unaffected.
    pub fn copy(&self, name: &str, clipboard: &mut dyn Clipboard) -> Result<(), ArtifactError> {
        copy_field(self.wizard.fields(), name, clipboard)?;
        debug!(field = name, "plan field copied");
        Ok(())
    }
}

impl Default for SafetyPlanForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for plan configuration.

    use super::*;

    #[test]
    fn step_table_is_consistent() {
        Wizard::<ExportedDocument>::new(PLAN_FIELDS, PLAN_STEPS)
            .expect("plan tables should validate");
    }

    #[test]
    fn review_reports_empty_plan() {
        assert_eq!(SafetyPlanForm::new().review(), PlanReview::Empty);
    }
}
