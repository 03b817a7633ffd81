//! Parsed rule tokens.
//!
//! A token is the text between delimiters in a rule expression, e.g.
//! `required`, `min:3` or `in:draft,published`. The part before the first
//! `:` names the rule, the rest holds its comma-separated arguments.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleToken {
    Required,
    Nullable,
    String,
    Integer,
    Boolean,
    Numeric,
    Array,
    Min { min: f64 },
    Max { max: f64 },
    Between { min: f64, max: f64 },
    Size { size: f64 },
    Email,
    Url,
    In { values: Vec<String> },
    NotIn { values: Vec<String> },
    Regex { pattern: String },
    Alpha,
    AlphaNum,
    Confirmed,
    Accepted,
}

/// Why a token could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Rule name not recognised.
    Unknown(String),
    /// Rule name recognised but its arguments are missing or malformed.
    BadArguments(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Unknown(token) => write!(f, "unknown rule '{}'", token),
            TokenError::BadArguments(token) => write!(f, "malformed arguments in '{}'", token),
        }
    }
}

impl std::error::Error for TokenError {}

impl RuleToken {
    /// Parse one token such as `"between:3,10"`.
    pub fn parse(token: &str) -> Result<Self, TokenError> {
        let token = token.trim();
        let (name, args) = match token.split_once(':') {
            Some((name, args)) => (name.trim(), Some(args)),
            None => (token, None),
        };

        let bad = || TokenError::BadArguments(token.to_string());
        let number = |s: &str| s.trim().parse::<f64>().map_err(|_| bad());
        let list = |s: &str| -> Vec<String> { s.split(',').map(|v| v.trim().to_string()).collect() };

        let parsed = match (name, args) {
            ("required", None) => RuleToken::Required,
            ("nullable", None) => RuleToken::Nullable,
            ("string", None) => RuleToken::String,
            ("integer", None) => RuleToken::Integer,
            ("boolean", None) => RuleToken::Boolean,
            ("numeric", None) => RuleToken::Numeric,
            ("array", None) => RuleToken::Array,
            ("email", None) => RuleToken::Email,
            ("url", None) => RuleToken::Url,
            ("alpha", None) => RuleToken::Alpha,
            ("alpha_num", None) => RuleToken::AlphaNum,
            ("confirmed", None) => RuleToken::Confirmed,
            ("accepted", None) => RuleToken::Accepted,
            ("min", Some(args)) => RuleToken::Min { min: number(args)? },
            ("max", Some(args)) => RuleToken::Max { max: number(args)? },
            ("size", Some(args)) => RuleToken::Size { size: number(args)? },
            ("between", Some(args)) => {
                let (min, max) = args.split_once(',').ok_or_else(bad)?;
                RuleToken::Between {
                    min: number(min)?,
                    max: number(max)?,
                }
            }
            ("in", Some(args)) => RuleToken::In { values: list(args) },
            ("not_in", Some(args)) => RuleToken::NotIn { values: list(args) },
            ("regex", Some(args)) if !args.is_empty() => {
                let pattern = strip_delimiters(args);
                regex::Regex::new(pattern).map_err(|_| bad())?;
                RuleToken::Regex {
                    pattern: pattern.to_string(),
                }
            }
            (
                "required" | "nullable" | "string" | "integer" | "boolean" | "numeric" | "array"
                | "email" | "url" | "alpha" | "alpha_num" | "confirmed" | "accepted" | "min"
                | "max" | "size" | "between" | "in" | "not_in" | "regex",
                _,
            ) => return Err(bad()),
            _ => return Err(TokenError::Unknown(token.to_string())),
        };

        Ok(parsed)
    }

    /// The rule name, used as error code and message key.
    pub fn name(&self) -> &'static str {
        match self {
            RuleToken::Required => "required",
            RuleToken::Nullable => "nullable",
            RuleToken::String => "string",
            RuleToken::Integer => "integer",
            RuleToken::Boolean => "boolean",
            RuleToken::Numeric => "numeric",
            RuleToken::Array => "array",
            RuleToken::Min { .. } => "min",
            RuleToken::Max { .. } => "max",
            RuleToken::Between { .. } => "between",
            RuleToken::Size { .. } => "size",
            RuleToken::Email => "email",
            RuleToken::Url => "url",
            RuleToken::In { .. } => "in",
            RuleToken::NotIn { .. } => "not_in",
            RuleToken::Regex { .. } => "regex",
            RuleToken::Alpha => "alpha",
            RuleToken::AlphaNum => "alpha_num",
            RuleToken::Confirmed => "confirmed",
            RuleToken::Accepted => "accepted",
        }
    }

    /// Implicit rules are evaluated even when the field is absent.
    pub fn is_implicit(&self) -> bool {
        matches!(self, RuleToken::Required | RuleToken::Accepted)
    }

    /// Rules that make size rules compare the numeric value instead of a length.
    pub fn is_numeric_type(&self) -> bool {
        matches!(self, RuleToken::Integer | RuleToken::Numeric)
    }
}

/// `regex:/^a+$/` and `regex:^a+$` are both accepted.
fn strip_delimiters(pattern: &str) -> &str {
    pattern
        .strip_prefix('/')
        .and_then(|p| p.strip_suffix('/'))
        .unwrap_or(pattern)
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl fmt::Display for RuleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleToken::Min { min } => write!(f, "min:{}", format_number(*min)),
            RuleToken::Max { max } => write!(f, "max:{}", format_number(*max)),
            RuleToken::Size { size } => write!(f, "size:{}", format_number(*size)),
            RuleToken::Between { min, max } => {
                write!(f, "between:{},{}", format_number(*min), format_number(*max))
            }
            RuleToken::In { values } => write!(f, "in:{}", values.join(",")),
            RuleToken::NotIn { values } => write!(f, "not_in:{}", values.join(",")),
            RuleToken::Regex { pattern } => write!(f, "regex:/{}/", pattern),
            other => f.write_str(other.name()),
        }
    }
}

pub(crate) fn display_number(n: f64) -> String {
    format_number(n)
}
