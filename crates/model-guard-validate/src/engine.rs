//! The validation engine seam and the bundled token engine.

use crate::error::{EngineFailure, ValidationErrors};
use crate::messages::Messages;
use crate::rule_set::RuleSet;
use crate::rules::{check, FieldContext};
use crate::token::{RuleToken, TokenError};
use serde_json::{Map, Value};

/// Evaluates a rule set against a model's attributes.
///
/// Implementations must report every failing rule, not only the first one,
/// and keep the order in which they were found.
///
/// Any `Fn(&Map<String, Value>, &RuleSet) -> Result<(), EngineFailure>` is an
/// engine, which keeps test doubles short.
pub trait ValidationEngine: Send + Sync {
    fn validate(&self, data: &Map<String, Value>, rules: &RuleSet) -> Result<(), EngineFailure>;
}

impl<F> ValidationEngine for F
where
    F: Fn(&Map<String, Value>, &RuleSet) -> Result<(), EngineFailure> + Send + Sync,
{
    fn validate(&self, data: &Map<String, Value>, rules: &RuleSet) -> Result<(), EngineFailure> {
        self(data, rules)
    }
}

/// Engine for the `required|string|min:3` token grammar.
///
/// ## Example
///
/// ```rust
/// use model_guard_validate::{RuleEngine, RuleSet, ValidationEngine};
/// use serde_json::json;
///
/// let rules = RuleSet::new().with("name", "required|string|min:3");
/// let data = json!({"name": "Al"}).as_object().cloned().unwrap();
///
/// let failure = RuleEngine::new().validate(&data, &rules).unwrap_err();
/// assert_eq!(
///     failure.to_string(),
///     "Validation failed: 1 error(s)"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    messages: Messages,
    lenient: bool,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom failure messages.
    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    /// Skip unknown rule tokens instead of failing with
    /// [`EngineFailure::UnsupportedRule`].
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    pub fn is_lenient(&self) -> bool {
        self.lenient
    }

    fn parse_tokens(&self, field: &str, raw: Vec<String>) -> Result<Vec<RuleToken>, EngineFailure> {
        let mut tokens = Vec::with_capacity(raw.len());
        for text in raw {
            match RuleToken::parse(&text) {
                Ok(token) => tokens.push(token),
                Err(TokenError::Unknown(rule)) if self.lenient => {
                    tracing::warn!(field, rule = %rule, "skipping unknown rule");
                }
                Err(TokenError::Unknown(rule)) | Err(TokenError::BadArguments(rule)) => {
                    return Err(EngineFailure::UnsupportedRule {
                        field: field.to_string(),
                        rule,
                    })
                }
            }
        }
        Ok(tokens)
    }
}

impl ValidationEngine for RuleEngine {
    fn validate(&self, data: &Map<String, Value>, rules: &RuleSet) -> Result<(), EngineFailure> {
        let mut errors = ValidationErrors::new();

        for (field, expr) in rules.iter() {
            let tokens = self.parse_tokens(field, expr.tokens())?;
            let value = data.get(field);

            let ctx = FieldContext {
                field,
                value,
                data,
                numeric: tokens.iter().any(RuleToken::is_numeric_type),
            };
            let nullable = tokens.contains(&RuleToken::Nullable);
            // Absent and blank values only face implicit rules.
            let present = match value {
                None => false,
                Some(Value::String(s)) => !s.trim().is_empty(),
                Some(_) => true,
            };

            for token in &tokens {
                if !token.is_implicit() {
                    if !present {
                        continue;
                    }
                    if nullable && matches!(value, Some(Value::Null)) {
                        continue;
                    }
                }

                if let Err(mut error) = check(token, &ctx) {
                    self.messages.apply(field, &mut error);
                    errors.add(field, error);
                }
            }
        }

        errors.into_result().map_err(EngineFailure::Invalid)
    }
}
