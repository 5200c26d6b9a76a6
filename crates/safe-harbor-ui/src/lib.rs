#![warn(missing_docs)]
//! # safe-harbor-ui
//!
//! ## Purpose
//! Defines the presentation-state projections rendered around the portal
//! views.
//!
//! ## Responsibilities
//! - Project privacy mode into banner and toggle text.
//! - Project wizard position into numbered step indicators.
//! - Hold transient indicators (copy confirmation, action outcome).
//!
//! ## Data flow
//! Shell state ([`PrivacyMode`], mounted [`Wizard`]) is read on every render
//! and projected into the owned structs of this crate.
//!
//! ## Ownership and lifetimes
//! Projections own their strings or borrow `'static` text, so a rendered frame
//! never holds a borrow into a draft.
//!
//! ## Error model
//! This crate favors explicit state over recoverable errors. Indicators expire
//! by comparing caller-supplied timestamps.
//!
//! ## Security and privacy notes
//! Projections carry field names and step titles only; no draft value is
//! copied into UI state.

use safe_harbor_privacy::PrivacyMode;
use safe_harbor_wizard::Wizard;

/// Banner shown while incognito mode is active.
pub const INCOGNITO_BANNER: &str =
    "Incognito mode is active. Your browsing on this site is not being saved to history.";

/// Toggle label while incognito mode is active.
pub const TOGGLE_LABEL_ACTIVE: &str = "Incognito On";

/// Toggle label while incognito mode is inactive.
pub const TOGGLE_LABEL_INACTIVE: &str = "Browse Privately";

/// Label of the always-visible escape control.
pub const QUICK_EXIT_LABEL: &str = "Quick Exit";

/// How long the "Copied" confirmation stays visible.
pub const COPY_INDICATOR_MS: u64 = 2_000;

/// Text shown next to a freshly copied field.
pub const COPIED_LABEL: &str = "Copied";

/// Chrome rendered around every view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellChrome {
    /// App version string sourced from root `VERSION`.
    pub version: String,
    /// Banner text, present only while incognito mode is active.
    pub incognito_banner: Option<&'static str>,
    /// Label of the privacy toggle.
    pub privacy_toggle_label: &'static str,
    /// Label of the escape control.
    pub quick_exit_label: &'static str,
}

impl ShellChrome {
    /// Projects the current privacy mode into chrome text.
    pub fn project(version: impl Into<String>, privacy: &PrivacyMode) -> Self {
        let active = privacy.is_active();
        Self {
            version: version.into(),
            incognito_banner: active.then_some(INCOGNITO_BANNER),
            privacy_toggle_label: if active {
                TOGGLE_LABEL_ACTIVE
            } else {
                TOGGLE_LABEL_INACTIVE
            },
            quick_exit_label: QUICK_EXIT_LABEL,
        }
    }
}

/// Progress state of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Step lies behind the current one (or the draft is finalized).
    Complete,
    /// Step is being edited.
    Current,
    /// Step has not been reached.
    Upcoming,
}

/// Numbered progress indicator for one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepIndicator {
    /// 1-based step number.
    pub number: usize,
    /// Step title.
    pub title: &'static str,
    /// Progress state.
    pub status: StepStatus,
    /// Whether clicking jumps back to this step.
    pub clickable: bool,
}

/// Projects a wizard into one indicator per step.
pub fn step_indicators<A>(wizard: &Wizard<A>) -> Vec<StepIndicator> {
    let current = wizard.current_step();
    let completed = wizard.completed();

    wizard
        .steps()
        .iter()
        .enumerate()
        .map(|(index, step)| {
            let number = index + 1;
            let status = if completed || number < current {
                StepStatus::Complete
            } else if number == current {
                StepStatus::Current
            } else {
                StepStatus::Upcoming
            };
            StepIndicator {
                number,
                title: step.title,
                status,
                clickable: !completed && number < current,
            }
        })
        .collect()
}

/// Transient "Copied" confirmation for one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyIndicator {
    shown: Option<(String, u64)>,
}

impl CopyIndicator {
    /// Creates a hidden indicator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows the confirmation for `field`, replacing any previous one.
    pub fn show(&mut self, field: impl Into<String>, now_ms: u64) {
        self.shown = Some((field.into(), now_ms));
    }

    /// Returns `true` while the confirmation for `field` is visible.
    pub fn is_showing(&self, field: &str, now_ms: u64) -> bool {
        self.shown.as_ref().is_some_and(|(shown, at_ms)| {
            shown == field && now_ms.saturating_sub(*at_ms) < COPY_INDICATOR_MS
        })
    }

    /// Returns the label to render next to `field`, if any.
    pub fn label_for(&self, field: &str, now_ms: u64) -> Option<&'static str> {
        self.is_showing(field, now_ms).then_some(COPIED_LABEL)
    }

    /// Drops an expired confirmation.
    pub fn on_tick(&mut self, now_ms: u64) {
        if self
            .shown
            .as_ref()
            .is_some_and(|(_, at_ms)| now_ms.saturating_sub(*at_ms) >= COPY_INDICATOR_MS)
        {
            self.shown = None;
        }
    }
}

/// Outcome of the last user-initiated action (submit, export, copy).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ActionStatus {
    /// Nothing attempted yet.
    #[default]
    Idle,
    /// Action completed; carries the user-facing confirmation.
    Succeeded(String),
    /// Action failed; carries the user-facing message. The draft is intact.
    Failed(String),
}

impl ActionStatus {
    /// Returns `true` after a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns the message to render, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Succeeded(message) | Self::Failed(message) => Some(message),
        }
    }
}
