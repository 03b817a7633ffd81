//! Error types for the validation engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// One rule token rejected one field value.
///
/// `message` is a template; `{name}` placeholders are filled from `params`
/// when the failure is rendered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleError {
    /// Rule name, e.g. `required` or `min`.
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
}

impl RuleError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            params: BTreeMap::new(),
        }
    }

    /// Attach a placeholder value.
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// The message with every known placeholder filled in.
    ///
    /// Unknown placeholders are left as written.
    pub fn interpolate_message(&self) -> String {
        let mut out = String::with_capacity(self.message.len());
        let mut rest = self.message.as_str();

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    let key = &after[..close];
                    match self.params.get(key) {
                        Some(value) => out.push_str(value),
                        None => {
                            out.push('{');
                            out.push_str(key);
                            out.push('}');
                        }
                    }
                    rest = &after[close + 1..];
                }
                None => {
                    out.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.interpolate_message())
    }
}

impl std::error::Error for RuleError {}

/// A rule failure attached to the field it was raised for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldFailure {
    pub field: String,
    #[serde(flatten)]
    pub error: RuleError,
}

/// All rule failures of one engine run, in the order they were found.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ValidationErrors {
    pub failures: Vec<FieldFailure>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an error for a field.
    pub fn add(&mut self, field: impl Into<String>, error: RuleError) {
        self.failures.push(FieldFailure {
            field: field.into(),
            error,
        });
    }

    /// Merge another collection into this one, keeping order.
    pub fn merge(&mut self, other: ValidationErrors) {
        self.failures.extend(other.failures);
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Errors reported for one field.
    pub fn get(&self, field: &str) -> Vec<&RuleError> {
        self.failures
            .iter()
            .filter(|f| f.field == field)
            .map(|f| &f.error)
            .collect()
    }

    /// Field names with at least one error, first occurrence first.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for failure in &self.failures {
            if !names.contains(&failure.field.as_str()) {
                names.push(&failure.field);
            }
        }
        names
    }

    /// Every interpolated message, in report order.
    pub fn messages(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(|f| f.error.interpolate_message())
            .collect()
    }

    /// Convert to Result - Ok if no errors, Err otherwise.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed: {} error(s)", self.len())
    }
}

impl std::error::Error for ValidationErrors {}

/// Why an engine run did not pass.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineFailure {
    /// One or more rules rejected the data.
    #[error("{0}")]
    Invalid(ValidationErrors),

    /// A rule token the engine does not understand.
    #[error("unsupported rule '{rule}' on field '{field}'")]
    UnsupportedRule { field: String, rule: String },
}

impl From<ValidationErrors> for EngineFailure {
    fn from(errors: ValidationErrors) -> Self {
        EngineFailure::Invalid(errors)
    }
}
