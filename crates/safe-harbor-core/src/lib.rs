#![warn(missing_docs)]
//! # safe-harbor-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `safe-harbor` workspace.
//!
//! ## Responsibilities
//! - Describe disclosure form fields (text, yes/no flags, enumerated choices).
//! - Hold field values in definition order for one in-memory draft.
//! - Derive human-readable labels from machine field names.
//! - Represent the `DV-######` reference identifier handed to the user.
//!
//! ## Data flow
//! Form instances declare [`FieldDef`] tables -> wizard drafts own a [`Fields`]
//! map built from them -> the artifact layer reads entries in definition order
//! and labels them with [`field_label`].
//!
//! ## Ownership and lifetimes
//! Field definitions are `'static` tables; values are owned `String`s so a
//! draft never borrows from view/input buffers.
//!
//! ## Error model
//! Unknown fields, kind mismatches, out-of-set choices, and malformed reference
//! identifiers return [`CoreError`] variants.
//!
//! ## Security and privacy notes
//! Nothing in this crate persists or logs values. `Debug` output of [`Fields`]
//! is the only way values leave the map, and callers must not log it.
//!
//! ## Example
//! ```rust
//! use safe_harbor_core::{field_label, FieldDef, FieldValue, Fields};
//!
//! const DEFS: &[FieldDef] = &[FieldDef::text("warningSigns")];
//! let mut fields = Fields::from_defs(DEFS);
//! fields.set("warningSigns", FieldValue::text("raised voice")).unwrap();
//! assert_eq!(field_label("warningSigns"), "Warning Signs");
//! assert!(!fields.all_blank());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed prefix of every reference identifier.
pub const REFERENCE_PREFIX: &str = "DV-";

/// Smallest numeric suffix of a reference identifier.
pub const REFERENCE_MIN: u32 = 100_000;

/// Largest numeric suffix of a reference identifier.
pub const REFERENCE_MAX: u32 = 999_999;

/// Rendering used for empty values in review and export contexts.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Value shape accepted by one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text, possibly multi-line.
    Text,
    /// Yes/no checkbox.
    Flag,
    /// One value out of a fixed option set.
    Choice(&'static [&'static str]),
}

/// Static description of one form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Machine field name (camelCase), also the source of its label.
    pub name: &'static str,
    /// Accepted value shape.
    pub kind: FieldKind,
    /// Initial choice for [`FieldKind::Choice`] fields (`""` means unselected).
    pub default_choice: &'static str,
}

impl FieldDef {
    /// Declares a free-text field.
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            default_choice: "",
        }
    }

    /// Declares a yes/no field, initially `false`.
    pub const fn flag(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Flag,
            default_choice: "",
        }
    }

    /// Declares an enumerated field with an initial selection.
    pub const fn choice(
        name: &'static str,
        options: &'static [&'static str],
        default_choice: &'static str,
    ) -> Self {
        Self {
            name,
            kind: FieldKind::Choice(options),
            default_choice,
        }
    }

    /// Returns the initial value for this definition.
    pub fn initial_value(&self) -> FieldValue {
        match self.kind {
            FieldKind::Text => FieldValue::Text(String::new()),
            FieldKind::Flag => FieldValue::Flag(false),
            FieldKind::Choice(_) => FieldValue::Choice(self.default_choice.to_string()),
        }
    }
}

/// One field value held by a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Free-text value.
    Text(String),
    /// Checkbox value.
    Flag(bool),
    /// Selected option (`""` when nothing is selected).
    Choice(String),
}

impl FieldValue {
    /// Builds a text value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Builds a choice value.
    pub fn choice(value: impl Into<String>) -> Self {
        Self::Choice(value.into())
    }

    /// Returns `true` when the value carries no user input.
    ///
    /// Whitespace-only text counts as blank. Flags are never blank: an
    /// unchecked box is an answer ("No"), not a missing one.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(value) | Self::Choice(value) => value.trim().is_empty(),
            Self::Flag(_) => false,
        }
    }

    /// Returns the string payload of text/choice values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) | Self::Choice(value) => Some(value),
            Self::Flag(_) => None,
        }
    }

    /// Returns the flag payload of yes/no values.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(value) => Some(*value),
            _ => None,
        }
    }

    /// Renders the value verbatim, or [`NOT_SPECIFIED`] when blank.
    pub fn display_or_placeholder(&self) -> String {
        match self {
            Self::Flag(true) => "Yes".to_string(),
            Self::Flag(false) => "No".to_string(),
            Self::Text(value) | Self::Choice(value) if value.trim().is_empty() => {
                NOT_SPECIFIED.to_string()
            }
            Self::Text(value) | Self::Choice(value) => value.clone(),
        }
    }

    fn matches(&self, kind: FieldKind) -> bool {
        matches!(
            (self, kind),
            (Self::Text(_), FieldKind::Text)
                | (Self::Flag(_), FieldKind::Flag)
                | (Self::Choice(_), FieldKind::Choice(_))
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldEntry {
    def: FieldDef,
    value: FieldValue,
}

/// Field values of one draft, kept in definition order.
///
/// Keys are fixed at construction: values can be replaced, never added or
/// removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fields {
    entries: Vec<FieldEntry>,
}

impl Fields {
    /// Builds a map holding the initial value of every definition.
    pub fn from_defs(defs: &[FieldDef]) -> Self {
        Self {
            entries: defs
                .iter()
                .map(|def| FieldEntry {
                    def: *def,
                    value: def.initial_value(),
                })
                .collect(),
        }
    }

    /// Returns the value of `name`, if the field exists.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|entry| entry.def.name == name)
            .map(|entry| &entry.value)
    }

    /// Returns the definition of `name`, if the field exists.
    pub fn def(&self, name: &str) -> Option<&FieldDef> {
        self.entries
            .iter()
            .find(|entry| entry.def.name == name)
            .map(|entry| &entry.def)
    }

    /// Returns `true` when the text/choice value of `name` is blank or the
    /// field is unknown.
    pub fn is_blank(&self, name: &str) -> bool {
        self.get(name).is_none_or(FieldValue::is_blank)
    }

    /// Replaces the value of `name`.
    ///
    /// # Errors
    /// - [`CoreError::UnknownField`] when `name` is not defined.
    /// - [`CoreError::KindMismatch`] when `value` has the wrong shape.
    /// - [`CoreError::InvalidChoice`] when a choice is outside the option set.
    pub fn set(&mut self, name: &str, value: FieldValue) -> Result<(), CoreError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.def.name == name)
            .ok_or_else(|| CoreError::UnknownField(name.to_string()))?;

        if !value.matches(entry.def.kind) {
            return Err(CoreError::KindMismatch {
                field: entry.def.name,
                expected: entry.def.kind,
            });
        }

        if let (FieldKind::Choice(options), FieldValue::Choice(selected)) = (entry.def.kind, &value)
            && !selected.is_empty()
            && !options.contains(&selected.as_str())
        {
            return Err(CoreError::InvalidChoice {
                field: entry.def.name,
                value: selected.clone(),
            });
        }

        entry.value = value;
        Ok(())
    }

    /// Iterates `(name, value)` pairs in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.entries.iter().map(|entry| (entry.def.name, &entry.value))
    }

    /// Returns `true` when every field is blank.
    ///
    /// Flags are ignored here since they always hold an answer.
    pub fn all_blank(&self) -> bool {
        self.entries
            .iter()
            .filter(|entry| entry.def.kind != FieldKind::Flag)
            .all(|entry| entry.value.is_blank())
    }

    /// Returns the number of defined fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no fields are defined.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Derives a display label from a camelCase field name.
///
/// A space is inserted before every uppercase letter after the first
/// character, then the first character is uppercased:
/// `incidentDescription` -> `Incident Description`.
pub fn field_label(name: &str) -> String {
    let mut label = String::with_capacity(name.len() + 4);
    for (index, ch) in name.chars().enumerate() {
        if index == 0 {
            label.extend(ch.to_uppercase());
            continue;
        }
        if ch.is_uppercase() {
            label.push(' ');
        }
        label.push(ch);
    }
    label
}

/// Record-keeping token of a submitted report, rendered as `DV-######`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReferenceId(u32);

impl ReferenceId {
    /// Wraps a numeric suffix.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidReferenceId`] outside `100000..=999999`.
    pub fn new(suffix: u32) -> Result<Self, CoreError> {
        if !(REFERENCE_MIN..=REFERENCE_MAX).contains(&suffix) {
            return Err(CoreError::InvalidReferenceId(suffix.to_string()));
        }
        Ok(Self(suffix))
    }

    /// Wraps a numeric suffix, clamping it into `100000..=999999`.
    pub fn clamped(suffix: u32) -> Self {
        Self(suffix.clamp(REFERENCE_MIN, REFERENCE_MAX))
    }

    /// Returns the six-digit numeric suffix.
    pub fn suffix(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{REFERENCE_PREFIX}{:06}", self.0)
    }
}

impl FromStr for ReferenceId {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidReferenceId(raw.to_string());
        let digits = raw.strip_prefix(REFERENCE_PREFIX).ok_or_else(invalid)?;
        if digits.len() != 6 || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(invalid());
        }
        let suffix = digits.parse::<u32>().map_err(|_| invalid())?;
        Self::new(suffix).map_err(|_| invalid())
    }
}

impl TryFrom<String> for ReferenceId {
    type Error = CoreError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<ReferenceId> for String {
    fn from(id: ReferenceId) -> Self {
        id.to_string()
    }
}

/// Error type for field model and identifier validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Field name is not part of the form definition.
    #[error("unknown field: {0}")]
    UnknownField(String),
    /// Value shape does not match the field kind.
    #[error("field {field} expects a {expected:?} value")]
    KindMismatch {
        /// Field that rejected the value.
        field: &'static str,
        /// Kind declared by the definition.
        expected: FieldKind,
    },
    /// Choice value is not one of the declared options.
    #[error("field {field} does not offer the choice {value:?}")]
    InvalidChoice {
        /// Field that rejected the value.
        field: &'static str,
        /// Rejected option.
        value: String,
    },
    /// Reference identifier is not `DV-` followed by six digits in range.
    #[error("invalid reference identifier: {0}")]
    InvalidReferenceId(String),
}
