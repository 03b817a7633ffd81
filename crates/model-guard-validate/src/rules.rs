//! Evaluation of individual rule tokens against a field value.

use crate::error::RuleError;
use crate::messages::{rule_error, SizeKind};
use crate::token::{display_number, RuleToken};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

// Pre-compiled regex patterns
static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static URL_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        // RFC 5322 simplified email regex
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
        ).unwrap()
    })
}

fn url_regex() -> &'static Regex {
    URL_REGEX.get_or_init(|| Regex::new(r"^(https?|ftp)://[^\s/$.?#].[^\s]*$").unwrap())
}

/// Everything a rule may look at while checking one field.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    pub field: &'a str,
    /// `None` when the key is absent from the data.
    pub value: Option<&'a Value>,
    /// The whole attribute map, for cross-field rules.
    pub data: &'a Map<String, Value>,
    /// Whether the field's rules include `integer` or `numeric`.
    pub numeric: bool,
}

/// Check one token. `Ok(())` when the value passes.
pub fn check(token: &RuleToken, ctx: &FieldContext<'_>) -> Result<(), RuleError> {
    let fail = |kind: Option<SizeKind>| rule_error(ctx.field, token.name(), kind);

    match token {
        RuleToken::Required => {
            if is_filled(ctx.value) {
                Ok(())
            } else {
                Err(fail(None))
            }
        }
        RuleToken::Accepted => match ctx.value {
            Some(Value::Bool(true)) => Ok(()),
            Some(Value::Number(n)) if n.as_i64() == Some(1) => Ok(()),
            Some(Value::String(s)) if matches!(s.as_str(), "yes" | "on" | "1" | "true") => Ok(()),
            _ => Err(fail(None)),
        },
        // Handled by the engine before any rule runs.
        RuleToken::Nullable => Ok(()),
        RuleToken::String => expect(matches!(ctx.value, Some(Value::String(_))), fail),
        RuleToken::Integer => expect(is_integer(ctx.value), fail),
        RuleToken::Numeric => expect(as_number(ctx.value).is_some(), fail),
        RuleToken::Boolean => expect(is_boolean(ctx.value), fail),
        RuleToken::Array => expect(
            matches!(ctx.value, Some(Value::Array(_) | Value::Object(_))),
            fail,
        ),
        RuleToken::Min { min } => {
            let (size, kind) = measure(ctx);
            if size >= *min {
                Ok(())
            } else {
                Err(fail(Some(kind)).param("min", display_number(*min)))
            }
        }
        RuleToken::Max { max } => {
            let (size, kind) = measure(ctx);
            if size <= *max {
                Ok(())
            } else {
                Err(fail(Some(kind)).param("max", display_number(*max)))
            }
        }
        RuleToken::Between { min, max } => {
            let (size, kind) = measure(ctx);
            if size >= *min && size <= *max {
                Ok(())
            } else {
                Err(fail(Some(kind))
                    .param("min", display_number(*min))
                    .param("max", display_number(*max)))
            }
        }
        RuleToken::Size { size: expected } => {
            let (size, kind) = measure(ctx);
            if (size - expected).abs() < f64::EPSILON {
                Ok(())
            } else {
                Err(fail(Some(kind)).param("size", display_number(*expected)))
            }
        }
        RuleToken::Email => expect(
            as_str(ctx.value).is_some_and(|s| email_regex().is_match(s)),
            fail,
        ),
        RuleToken::Url => expect(
            as_str(ctx.value).is_some_and(|s| url_regex().is_match(s)),
            fail,
        ),
        RuleToken::In { values } => expect(
            scalar_text(ctx.value).is_some_and(|v| values.contains(&v)),
            fail,
        ),
        RuleToken::NotIn { values } => expect(
            scalar_text(ctx.value).map_or(true, |v| !values.contains(&v)),
            fail,
        ),
        // Parsed tokens carry a pattern that compiles; a hand-built one that
        // does not matches nothing.
        RuleToken::Regex { pattern } => expect(
            Regex::new(pattern)
                .ok()
                .zip(scalar_text(ctx.value))
                .is_some_and(|(regex, v)| regex.is_match(&v)),
            |_| fail(None).param("pattern", pattern.clone()),
        ),
        RuleToken::Alpha => expect(
            as_str(ctx.value).is_some_and(|s| !s.is_empty() && s.chars().all(char::is_alphabetic)),
            fail,
        ),
        RuleToken::AlphaNum => expect(
            as_str(ctx.value)
                .is_some_and(|s| !s.is_empty() && s.chars().all(char::is_alphanumeric)),
            fail,
        ),
        RuleToken::Confirmed => {
            let confirmation = ctx.data.get(&format!("{}_confirmation", ctx.field));
            expect(confirmation == ctx.value && confirmation.is_some(), fail)
        }
    }
}

fn expect<F>(ok: bool, fail: F) -> Result<(), RuleError>
where
    F: Fn(Option<SizeKind>) -> RuleError,
{
    if ok {
        Ok(())
    } else {
        Err(fail(None))
    }
}

/// Present and not null, not a blank string, not an empty collection.
pub fn is_filled(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(_) => true,
    }
}

fn is_integer(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Number(n)) => n.is_i64() || n.is_u64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().is_ok(),
        _ => false,
    }
}

fn is_boolean(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(_)) => true,
        Some(Value::Number(n)) => matches!(n.as_i64(), Some(0 | 1)),
        Some(Value::String(s)) => matches!(s.as_str(), "0" | "1"),
        _ => false,
    }
}

fn as_number(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn as_str(value: Option<&Value>) -> Option<&str> {
    match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

/// Strings, numbers and booleans compared as text for `in`/`regex`.
fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(if *b { "1" } else { "0" }.to_string()),
        _ => None,
    }
}

/// Size of a value for min/max/between/size.
///
/// Numbers count by value only when the field carries a numeric type rule;
/// otherwise they are measured by the length of their text.
fn measure(ctx: &FieldContext<'_>) -> (f64, SizeKind) {
    if ctx.numeric {
        if let Some(n) = as_number(ctx.value) {
            return (n, SizeKind::Numeric);
        }
    }
    match ctx.value {
        Some(Value::Array(items)) => (items.len() as f64, SizeKind::Array),
        Some(Value::Object(map)) => (map.len() as f64, SizeKind::Array),
        Some(Value::String(s)) => (s.chars().count() as f64, SizeKind::String),
        Some(Value::Number(n)) => (n.to_string().chars().count() as f64, SizeKind::String),
        Some(Value::Bool(b)) => (if *b { 1.0 } else { 0.0 }, SizeKind::String),
        None | Some(Value::Null) => (0.0, SizeKind::String),
    }
}
