//! Failure message templates.
//!
//! Templates use `{param}` placeholders filled from [`RuleError::params`].
//! Every error carries an `attribute` param: the field name with
//! underscores rendered as spaces.

use crate::error::RuleError;
use std::collections::HashMap;

/// How a size rule measured the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeKind {
    Numeric,
    String,
    Array,
}

impl SizeKind {
    fn suffix(self) -> &'static str {
        match self {
            SizeKind::Numeric => "numeric",
            SizeKind::String => "string",
            SizeKind::Array => "array",
        }
    }
}

/// Human-readable form of a field name.
pub fn attribute_name(field: &str) -> String {
    field.replace('_', " ")
}

/// Built-in template for a rule, optionally specialised by size kind.
pub fn default_template(code: &str, kind: Option<SizeKind>) -> &'static str {
    match (code, kind) {
        ("required", _) => "The {attribute} field is required.",
        ("string", _) => "The {attribute} field must be a string.",
        ("integer", _) => "The {attribute} field must be an integer.",
        ("boolean", _) => "The {attribute} field must be true or false.",
        ("numeric", _) => "The {attribute} field must be a number.",
        ("array", _) => "The {attribute} field must be an array.",
        ("min", Some(SizeKind::Numeric)) => "The {attribute} field must be at least {min}.",
        ("min", Some(SizeKind::Array)) => "The {attribute} field must have at least {min} items.",
        ("min", _) => "The {attribute} field must be at least {min} characters.",
        ("max", Some(SizeKind::Numeric)) => "The {attribute} field must not be greater than {max}.",
        ("max", Some(SizeKind::Array)) => "The {attribute} field must not have more than {max} items.",
        ("max", _) => "The {attribute} field must not be greater than {max} characters.",
        ("between", Some(SizeKind::Numeric)) => "The {attribute} field must be between {min} and {max}.",
        ("between", Some(SizeKind::Array)) => "The {attribute} field must have between {min} and {max} items.",
        ("between", _) => "The {attribute} field must be between {min} and {max} characters.",
        ("size", Some(SizeKind::Numeric)) => "The {attribute} field must be {size}.",
        ("size", Some(SizeKind::Array)) => "The {attribute} field must contain {size} items.",
        ("size", _) => "The {attribute} field must be {size} characters.",
        ("email", _) => "The {attribute} field must be a valid email address.",
        ("url", _) => "The {attribute} field must be a valid URL.",
        ("in", _) | ("not_in", _) => "The selected {attribute} is invalid.",
        ("regex", _) => "The {attribute} field format is invalid.",
        ("alpha", _) => "The {attribute} field must only contain letters.",
        ("alpha_num", _) => "The {attribute} field must only contain letters and numbers.",
        ("confirmed", _) => "The {attribute} field confirmation does not match.",
        ("accepted", _) => "The {attribute} field must be accepted.",
        _ => "The {attribute} field is invalid.",
    }
}

/// Build a rule error with the default template and the `attribute` param.
pub fn rule_error(field: &str, code: &str, kind: Option<SizeKind>) -> RuleError {
    let mut error = RuleError::new(code, default_template(code, kind))
        .param("attribute", attribute_name(field));
    if let Some(kind) = kind {
        error = error.param("kind", kind.suffix());
    }
    error
}

/// Custom message overrides.
///
/// Lookup order for a failure of rule `min` on field `name`:
/// `name.min`, then `min`, then the built-in template.
#[derive(Debug, Clone, Default)]
pub struct Messages {
    overrides: HashMap<String, String>,
}

impl Messages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the message for a `field.rule` or `rule` key.
    pub fn set(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), template.into());
        self
    }

    /// Apply any matching override to `error`, in place.
    pub fn apply(&self, field: &str, error: &mut RuleError) {
        let specific = format!("{}.{}", field, error.code);
        if let Some(template) = self
            .overrides
            .get(&specific)
            .or_else(|| self.overrides.get(&error.code))
        {
            error.message = template.clone();
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Messages
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            overrides: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
