#![warn(missing_docs)]
//! # safe-harbor-wizard
//!
//! ## Purpose
//! Implements the guided multi-step disclosure state machine and its two
//! concrete configurations, the incident [`report`] and the personal
//! [`safety_plan`].
//!
//! ## Responsibilities
//! - Hold one in-memory draft per mounted form.
//! - Gate forward transitions on the current step's validator.
//! - Allow unconditional backward transitions.
//! - Restrict field updates to steps already reached.
//! - Finalize exactly once through a [`Finalizer`] and freeze the draft.
//!
//! ## Data flow
//! View input -> [`Wizard::set_field`] -> [`Wizard::advance`] /
//! [`Wizard::retreat`] -> at the last step [`Wizard::finalize`] hands a
//! [`Fields`] snapshot to the artifact layer and caches its output.
//!
//! ## Ownership and lifetimes
//! A [`Wizard`] owns its draft outright and is owned by the view that mounted
//! it. Dropping the view drops the draft; nothing is shared or global.
//!
//! ## Error model
//! Blocked transitions are ordinary [`Advance`] values that name the missing
//! fields. Misuse (unknown fields, unreached steps, finalizing early) and
//! artifact delivery failures return [`WizardError`] and never change state.
//!
//! ## Security and privacy notes
//! Transitions are logged with step numbers and field names only. Field
//! values never reach a log line.
//!
//! ## Example
//! ```rust
//! use safe_harbor_core::FieldValue;
//! use safe_harbor_wizard::Advance;
//! use safe_harbor_wizard::report::ReportForm;
//!
//! let mut report = ReportForm::new();
//! assert!(matches!(report.advance(), Advance::Blocked { .. }));
//! report.set_field("incidentType", FieldValue::choice("physical")).unwrap();
//! report.set_field("incidentDescription", FieldValue::text("pushed me")).unwrap();
//! assert_eq!(report.advance(), Advance::Advanced { step: 2 });
//! ```

pub mod report;
pub mod safety_plan;

use std::fmt;

use safe_harbor_artifact::ArtifactError;
use safe_harbor_core::{CoreError, FieldDef, FieldValue, Fields};
use thiserror::Error;
use tracing::debug;

/// Validation rule attached to one step.
#[derive(Clone, Copy)]
pub enum Validator {
    /// The step never blocks progress.
    Always,
    /// Every listed field must hold non-blank input.
    RequireNonBlank(&'static [&'static str]),
    /// Caller-supplied rule returning the names of missing fields.
    Custom(fn(&StepScope<'_>) -> Vec<&'static str>),
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("Always"),
            Self::RequireNonBlank(required) => {
                f.debug_tuple("RequireNonBlank").field(required).finish()
            }
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Validator {
    fn missing(&self, scope: &StepScope<'_>) -> Vec<&'static str> {
        match self {
            Self::Always => Vec::new(),
            Self::RequireNonBlank(required) => required
                .iter()
                .copied()
                .filter(|name| scope.get(name).is_none_or(FieldValue::is_blank))
                .collect(),
            Self::Custom(rule) => rule(scope),
        }
    }
}

/// Static description of one wizard step.
#[derive(Debug, Clone, Copy)]
pub struct StepDef {
    /// Title shown in progress indicators.
    pub title: &'static str,
    /// Fields filled on this step.
    pub fields: &'static [&'static str],
    /// Rule gating the transition out of this step.
    pub validator: Validator,
}

/// Read access to the fields owned by one step.
///
/// Validators only see their own step, so a rule can never read fields the
/// user has not reached yet.
#[derive(Debug, Clone, Copy)]
pub struct StepScope<'a> {
    fields: &'a Fields,
    step: &'a StepDef,
}

impl<'a> StepScope<'a> {
    /// Returns the value of `name` when this step owns it.
    pub fn get(&self, name: &str) -> Option<&'a FieldValue> {
        if !self.step.fields.contains(&name) {
            return None;
        }
        self.fields.get(name)
    }

    /// Returns the step title.
    pub fn title(&self) -> &'static str {
        self.step.title
    }
}

/// Result of a forward transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// The wizard moved to `step`.
    Advanced {
        /// New 1-based step.
        step: usize,
    },
    /// The current step is incomplete; nothing changed.
    Blocked {
        /// Required fields that are still blank.
        missing: Vec<&'static str>,
    },
    /// Already at the last step; finalize instead.
    AtLastStep,
    /// The draft is finalized; transitions are frozen.
    Completed,
}

/// Result of a field update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldUpdate {
    /// The draft now holds the new value.
    Applied,
    /// The draft is finalized; the update was ignored.
    IgnoredCompleted,
}

/// Produces the terminal artifact of a wizard.
pub trait Finalizer {
    /// Artifact cached by the wizard after success.
    type Artifact;

    /// Builds the artifact from the final field snapshot.
    ///
    /// # Errors
    /// Returns [`WizardError`] when the artifact cannot be produced; the
    /// wizard stays open for a retry.
    fn finalize(&mut self, fields: &Fields) -> Result<Self::Artifact, WizardError>;
}

/// Generic guided multi-step state machine over one draft.
#[derive(Debug, Clone)]
pub struct Wizard<A> {
    steps: &'static [StepDef],
    fields: Fields,
    current: usize,
    artifact: Option<A>,
}

impl<A> Wizard<A> {
    /// Creates a wizard at step 1 with initial field values.
    ///
    /// # Errors
    /// Returns [`WizardError::InvalidConfig`] when there are no steps, a step
    /// names an undefined field, or a field belongs to zero or several steps.
    pub fn new(defs: &[FieldDef], steps: &'static [StepDef]) -> Result<Self, WizardError> {
        if steps.is_empty() {
            return Err(WizardError::InvalidConfig("wizard has no steps".to_string()));
        }

        for def in defs {
            let owners = steps
                .iter()
                .filter(|step| step.fields.contains(&def.name))
                .count();
            if owners != 1 {
                return Err(WizardError::InvalidConfig(format!(
                    "field {} belongs to {owners} steps",
                    def.name
                )));
            }
        }

        for step in steps {
            if let Some(name) = step
                .fields
                .iter()
                .find(|name| !defs.iter().any(|def| def.name == **name))
            {
                return Err(WizardError::InvalidConfig(format!(
                    "step {} names undefined field {name}",
                    step.title
                )));
            }
        }

        Ok(Self::from_tables(defs, steps))
    }

    /// Builds a wizard from tables already known to be consistent.
    pub(crate) fn from_tables(defs: &[FieldDef], steps: &'static [StepDef]) -> Self {
        Self {
            steps,
            fields: Fields::from_defs(defs),
            current: 1,
            artifact: None,
        }
    }

    /// Returns the 1-based current step.
    pub fn current_step(&self) -> usize {
        self.current
    }

    /// Returns the number of steps.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Returns the step definitions.
    pub fn steps(&self) -> &'static [StepDef] {
        self.steps
    }

    /// Returns `true` at the review/finalize step.
    pub fn is_last_step(&self) -> bool {
        self.current == self.steps.len()
    }

    /// Returns `true` once finalization succeeded.
    pub fn completed(&self) -> bool {
        self.artifact.is_some()
    }

    /// Returns the draft for rendering.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Returns the cached artifact after finalization.
    pub fn artifact(&self) -> Option<&A> {
        self.artifact.as_ref()
    }

    /// Returns the 1-based step owning `name`.
    pub fn step_of(&self, name: &str) -> Option<usize> {
        self.steps
            .iter()
            .position(|step| step.fields.contains(&name))
            .map(|index| index + 1)
    }

    /// Returns the blank required fields of the current step.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.missing_for(self.current)
    }

    /// Updates one field of a step already reached.
    ///
    /// # Errors
    /// - [`WizardError::StepNotReached`] for fields of later steps.
    /// - [`WizardError::Field`] for unknown fields or wrongly shaped values.
    pub fn set_field(&mut self, name: &str, value: FieldValue) -> Result<FieldUpdate, WizardError> {
        if self.completed() {
            debug!(field = name, "ignored field update on finalized draft");
            return Ok(FieldUpdate::IgnoredCompleted);
        }

        let owner = self
            .step_of(name)
            .ok_or_else(|| WizardError::Field(CoreError::UnknownField(name.to_string())))?;
        if owner > self.current {
            return Err(WizardError::StepNotReached {
                field: name.to_string(),
                step: owner,
                current: self.current,
            });
        }

        self.fields.set(name, value)?;
        Ok(FieldUpdate::Applied)
    }

    /// Moves forward when the current step validates.
    pub fn advance(&mut self) -> Advance {
        if self.completed() {
            return Advance::Completed;
        }

        let missing = self.missing_fields();
        if !missing.is_empty() {
            debug!(step = self.current, missing = ?missing, "advance blocked");
            return Advance::Blocked { missing };
        }

        if self.is_last_step() {
            return Advance::AtLastStep;
        }

        self.current += 1;
        debug!(step = self.current, "wizard advanced");
        Advance::Advanced { step: self.current }
    }

    /// Moves back one step; returns `false` at step 1 or after finalization.
    pub fn retreat(&mut self) -> bool {
        if self.completed() || self.current == 1 {
            return false;
        }
        self.current -= 1;
        debug!(step = self.current, "wizard retreated");
        true
    }

    /// Jumps back to an earlier (or the current) step.
    ///
    /// # Errors
    /// - [`WizardError::StepOutOfRange`] outside `1..=current`.
    /// - [`WizardError::AlreadyCompleted`] after finalization.
    pub fn jump_back(&mut self, step: usize) -> Result<(), WizardError> {
        if self.completed() {
            return Err(WizardError::AlreadyCompleted);
        }
        if step == 0 || step > self.current {
            return Err(WizardError::StepOutOfRange {
                requested: step,
                current: self.current,
            });
        }
        self.current = step;
        debug!(step, "wizard jumped back");
        Ok(())
    }

    /// Finalizes the draft at the last step.
    ///
    /// Every step is re-validated first, since fields of earlier steps stay
    /// editable on the review step. A second call returns the cached artifact
    /// without invoking `finalizer` again.
    ///
    /// # Errors
    /// - [`WizardError::NotAtReviewStep`] before the last step.
    /// - [`WizardError::Incomplete`] when any step lost required input.
    /// - Whatever `finalizer` reports; the draft stays editable.
    pub fn finalize<F>(&mut self, finalizer: &mut F) -> Result<&A, WizardError>
    where
        F: Finalizer<Artifact = A> + ?Sized,
    {
        if self.artifact.is_none() {
            if !self.is_last_step() {
                return Err(WizardError::NotAtReviewStep {
                    current: self.current,
                    last: self.steps.len(),
                });
            }

            if let Some((step, missing)) = (1..=self.steps.len())
                .map(|step| (step, self.missing_for(step)))
                .find(|(_, missing)| !missing.is_empty())
            {
                return Err(WizardError::Incomplete { step, missing });
            }

            let artifact = finalizer.finalize(&self.fields)?;
            debug!(steps = self.steps.len(), "wizard finalized");
            self.artifact = Some(artifact);
        }

        self.artifact.as_ref().ok_or(WizardError::AlreadyCompleted)
    }

    fn missing_for(&self, step: usize) -> Vec<&'static str> {
        let Some(def) = self.steps.get(step.wrapping_sub(1)) else {
            return Vec::new();
        };
        let scope = StepScope {
            fields: &self.fields,
            step: def,
        };
        def.validator.missing(&scope)
    }
}

/// Wizard misuse and finalization errors.
#[derive(Debug, Error)]
pub enum WizardError {
    /// Step table is inconsistent with the field table.
    #[error("invalid wizard configuration: {0}")]
    InvalidConfig(String),
    /// Field model rejected the update.
    #[error("field update rejected: {0}")]
    Field(#[from] CoreError),
    /// Field belongs to a step the user has not reached.
    #[error("field {field} belongs to step {step}, current step is {current}")]
    StepNotReached {
        /// Rejected field.
        field: String,
        /// Step owning the field.
        step: usize,
        /// Current step.
        current: usize,
    },
    /// Jump target is not an earlier step.
    #[error("cannot jump to step {requested} from step {current}")]
    StepOutOfRange {
        /// Requested step.
        requested: usize,
        /// Current step.
        current: usize,
    },
    /// Finalization requested before the review step.
    #[error("finalize is only available on step {last}, current step is {current}")]
    NotAtReviewStep {
        /// Current step.
        current: usize,
        /// Review step.
        last: usize,
    },
    /// A step lost required input after it was passed.
    #[error("step {step} is missing {missing:?}")]
    Incomplete {
        /// First incomplete step.
        step: usize,
        /// Blank required fields.
        missing: Vec<&'static str>,
    },
    /// The draft holds no input at all; nothing to export.
    #[error("draft is empty")]
    EmptyDraft,
    /// The draft is finalized and frozen.
    #[error("draft is already finalized")]
    AlreadyCompleted,
    /// Artifact delivery failed.
    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),
}

#[cfg(test)]
mod tests {
    //! Unit tests for generic transition rules.

    use super::*;

    const DEFS: &[FieldDef] = &[
        FieldDef::text("name"),
        FieldDef::text("notes"),
        FieldDef::flag("confirmed"),
    ];

    fn confirmed_checked(scope: &StepScope<'_>) -> Vec<&'static str> {
        match scope.get("confirmed").and_then(FieldValue::as_flag) {
            Some(true) => Vec::new(),
            _ => vec!["confirmed"],
        }
    }

    const STEPS: &[StepDef] = &[
        StepDef {
            title: "One",
            fields: &["name"],
            validator: Validator::RequireNonBlank(&["name"]),
        },
        StepDef {
            title: "Two",
            fields: &["notes", "confirmed"],
            validator: Validator::Custom(confirmed_checked),
        },
        StepDef {
            title: "Done",
            fields: &[],
            validator: Validator::Always,
        },
    ];

    struct Counting(u32);

    impl Finalizer for Counting {
        type Artifact = u32;

        fn finalize(&mut self, _fields: &Fields) -> Result<u32, WizardError> {
            self.0 += 1;
            Ok(self.0)
        }
    }

    #[test]
    fn rejects_inconsistent_configuration() {
        const ORPHAN: &[FieldDef] = &[FieldDef::text("name"), FieldDef::text("orphan")];
        assert!(Wizard::<u32>::new(ORPHAN, STEPS).is_err());
        assert!(Wizard::<u32>::new(DEFS, &[]).is_err());
    }

    #[test]
    fn scope_hides_fields_of_other_steps() {
        let wizard = Wizard::<u32>::new(DEFS, STEPS).unwrap();
        let scope = StepScope {
            fields: wizard.fields(),
            step: &STEPS[0],
        };
        assert!(scope.get("name").is_some());
        assert!(scope.get("notes").is_none());
    }

    #[test]
    fn custom_validator_gates_second_step() {
        let mut wizard = Wizard::<u32>::new(DEFS, STEPS).unwrap();
        wizard.set_field("name", FieldValue::text("A")).unwrap();
        assert_eq!(wizard.advance(), Advance::Advanced { step: 2 });
        assert_eq!(
            wizard.advance(),
            Advance::Blocked {
                missing: vec!["confirmed"]
            }
        );
        wizard.set_field("confirmed", FieldValue::Flag(true)).unwrap();
        assert_eq!(wizard.advance(), Advance::Advanced { step: 3 });
        assert_eq!(wizard.advance(), Advance::AtLastStep);
    }

    #[test]
    fn finalize_runs_finalizer_once() {
        let mut wizard = Wizard::<u32>::new(DEFS, STEPS).unwrap();
        wizard.set_field("name", FieldValue::text("A")).unwrap();
        wizard.advance();
        wizard.set_field("confirmed", FieldValue::Flag(true)).unwrap();
        wizard.advance();

        let mut finalizer = Counting(0);
        assert_eq!(*wizard.finalize(&mut finalizer).unwrap(), 1);
        assert_eq!(*wizard.finalize(&mut finalizer).unwrap(), 1);
        assert_eq!(finalizer.0, 1);
        assert!(!wizard.retreat());
        assert_eq!(wizard.advance(), Advance::Completed);
    }

    #[test]
    fn finalize_revalidates_earlier_steps() {
        let mut wizard = Wizard::<u32>::new(DEFS, STEPS).unwrap();
        wizard.set_field("name", FieldValue::text("A")).unwrap();
        wizard.advance();
        wizard.set_field("confirmed", FieldValue::Flag(true)).unwrap();
        wizard.advance();
        wizard.set_field("name", FieldValue::text("  ")).unwrap();

        let result = wizard.finalize(&mut Counting(0));
        assert!(matches!(result, Err(WizardError::Incomplete { step: 1, .. })));
        assert!(!wizard.completed());
    }
}
