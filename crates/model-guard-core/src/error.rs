//! Errors raised by a validation pass.

use crate::pass::PassState;
use model_guard_validate::{FieldFailure, ValidationErrors};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[cfg(feature = "config")]
use crate::config::ConfigError;

/// Everything that can abort a create or update.
#[derive(Debug, Error)]
pub enum GuardError {
    /// The engine rejected the model's attributes.
    #[error(transparent)]
    ValidationFailure(#[from] ValidationFailure),

    /// A field declared mapping-shaped rules that do not mention the field.
    #[error("invalid rules declared on {model}::{field}: the rule mapping has no '{field}' entry")]
    InvalidRuleDeclaration { model: String, field: String },

    /// A validate override returned something that is not a rule set.
    #[error("the validate override should return a rule set, got {found}")]
    InvalidOverrideResult { found: String },

    /// The engine met a rule token it does not understand.
    #[error("unsupported rule '{rule}' on {model}::{field}")]
    UnsupportedRule {
        model: String,
        field: String,
        rule: String,
    },

    /// A validation pass was used again after it failed or finished.
    #[error("the validation pass for {model} is already {state}")]
    PassFinished { model: String, state: PassState },

    /// The model could not be serialized into attributes.
    #[error("failed to read attributes of {model}: {source}")]
    Attributes {
        model: String,
        #[source]
        source: serde_json::Error,
    },

    /// The model serialized to something other than a JSON object.
    #[error("attributes of {model} must serialize to an object, got {found}")]
    AttributesNotObject { model: String, found: String },

    #[cfg(feature = "config")]
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, GuardError>;

impl GuardError {
    /// The validation failure, if this error is one.
    pub fn as_validation_failure(&self) -> Option<&ValidationFailure> {
        match self {
            GuardError::ValidationFailure(failure) => Some(failure),
            _ => None,
        }
    }

    /// Whether the error comes from the data rather than from declarations.
    pub fn is_validation_failure(&self) -> bool {
        matches!(self, GuardError::ValidationFailure(_))
    }
}

/// A model failed validation.
///
/// Carries every message the engine reported, in report order. Serializes to:
///
/// ```json
/// {
///   "error": {
///     "type": "validation_error",
///     "model": "Item",
///     "message": "The name field is required.",
///     "messages": ["The name field is required."]
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationFailure {
    model: String,
    message: String,
    messages: Vec<String>,
    failures: Vec<FieldFailure>,
}

impl ValidationFailure {
    /// Build a failure from a list of messages.
    ///
    /// A single message doubles as the summary message. With zero or several
    /// messages the summary is the generic fallback naming the model.
    pub fn new(model: impl Into<String>, messages: Vec<String>) -> Self {
        let model = model.into();
        let message = match messages.as_slice() {
            [only] => only.clone(),
            _ => Self::fallback_message(&model),
        };
        Self {
            model,
            message,
            messages,
            failures: Vec::new(),
        }
    }

    /// Build a failure from a single message.
    pub fn single(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(model, vec![message.into()])
    }

    /// Build a failure from engine errors, keeping per-field details.
    pub fn from_errors(model: impl Into<String>, errors: ValidationErrors) -> Self {
        let mut failure = Self::new(model, errors.messages());
        failure.failures = errors.failures;
        failure
    }

    fn fallback_message(model: &str) -> String {
        format!("Error occurred while validating model {}", model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Summary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Every failure message, in the engine's order.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Per-field details when the failure came from an engine run.
    pub fn failures(&self) -> &[FieldFailure] {
        &self.failures
    }

    /// Messages reported for one field.
    pub fn messages_for(&self, field: &str) -> Vec<String> {
        self.failures
            .iter()
            .filter(|f| f.field == field)
            .map(|f| f.error.interpolate_message())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationFailure {}

/// Internal error structure for JSON serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    error_type: String,
    model: String,
    message: String,
    messages: Vec<String>,
}

/// Wrapper for the error response format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

impl Serialize for ValidationFailure {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let wrapper = ErrorWrapper {
            error: ErrorBody {
                error_type: "validation_error".to_string(),
                model: self.model.clone(),
                message: self.message.clone(),
                messages: self.messages.clone(),
            },
        };
        wrapper.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ValidationFailure {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let wrapper = ErrorWrapper::deserialize(deserializer)?;
        Ok(Self {
            model: wrapper.error.model,
            message: wrapper.error.message,
            messages: wrapper.error.messages,
            failures: Vec::new(),
        })
    }
}
