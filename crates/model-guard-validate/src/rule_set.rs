//! Rule expressions and the ordered per-field rule map.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Separator used by joined rule strings such as `"required|string"`.
pub const RULE_DELIMITER: char = '|';

/// A rule expression as declared on a model or a field.
///
/// Either a single delimiter-joined string or an ordered token list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleExpr {
    /// `"required|string|min:3"`
    Joined(String),
    /// `["required", "string", "min:3"]`
    Tokens(Vec<String>),
}

impl RuleExpr {
    /// Split the expression into its individual tokens.
    ///
    /// Empty segments (`"required||string"`) are dropped.
    pub fn tokens(&self) -> Vec<String> {
        match self {
            RuleExpr::Joined(s) => split_joined(s),
            RuleExpr::Tokens(tokens) => tokens.clone(),
        }
    }

    pub fn is_joined(&self) -> bool {
        matches!(self, RuleExpr::Joined(_))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RuleExpr::Joined(s) => s.split(RULE_DELIMITER).all(|t| t.trim().is_empty()),
            RuleExpr::Tokens(tokens) => tokens.is_empty(),
        }
    }
}

fn split_joined(s: &str) -> Vec<String> {
    s.split(RULE_DELIMITER)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

impl From<&str> for RuleExpr {
    fn from(s: &str) -> Self {
        RuleExpr::Joined(s.to_string())
    }
}

impl From<String> for RuleExpr {
    fn from(s: String) -> Self {
        RuleExpr::Joined(s)
    }
}

impl From<Vec<String>> for RuleExpr {
    fn from(tokens: Vec<String>) -> Self {
        RuleExpr::Tokens(tokens)
    }
}

impl From<Vec<&str>> for RuleExpr {
    fn from(tokens: Vec<&str>) -> Self {
        RuleExpr::Tokens(tokens.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for RuleExpr {
    fn from(tokens: [&str; N]) -> Self {
        RuleExpr::Tokens(tokens.iter().map(|t| t.to_string()).collect())
    }
}

impl fmt::Display for RuleExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleExpr::Joined(s) => f.write_str(s),
            RuleExpr::Tokens(tokens) => f.write_str(&tokens.join("|")),
        }
    }
}

/// Mapping from field name to rule expression.
///
/// Keeps insertion order: fields are validated, and their failures reported,
/// in the order they were first added. Re-inserting a field replaces its
/// expression in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    entries: Vec<(String, RuleExpr)>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the expression for `field`, returning the old one.
    pub fn insert(&mut self, field: impl Into<String>, expr: impl Into<RuleExpr>) -> Option<RuleExpr> {
        let field = field.into();
        let expr = expr.into();
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some((_, slot)) => Some(std::mem::replace(slot, expr)),
            None => {
                self.entries.push((field, expr));
                None
            }
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, expr: impl Into<RuleExpr>) -> Self {
        self.insert(field, expr);
        self
    }

    pub fn get(&self, field: &str) -> Option<&RuleExpr> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, expr)| expr)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleExpr)> {
        self.entries.iter().map(|(name, expr)| (name.as_str(), expr))
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Tokens for a field, splitting a joined entry. Empty when absent.
    pub fn tokens(&self, field: &str) -> Vec<String> {
        self.get(field).map(RuleExpr::tokens).unwrap_or_default()
    }

    /// Convert a JSON value into a rule set.
    ///
    /// The value must be an object whose members are strings or arrays of
    /// strings. On mismatch, returns a short description of what was found.
    pub fn from_json(value: serde_json::Value) -> Result<Self, String> {
        let serde_json::Value::Object(map) = value else {
            return Err(json_kind(&value).to_string());
        };

        let mut rules = RuleSet::new();
        for (field, expr) in map {
            let expr = match expr {
                serde_json::Value::String(s) => RuleExpr::Joined(s),
                serde_json::Value::Array(items) => {
                    let mut tokens = Vec::with_capacity(items.len());
                    for item in items {
                        match item {
                            serde_json::Value::String(s) => tokens.push(s),
                            other => {
                                return Err(format!(
                                    "{} in rules for '{}'",
                                    json_kind(&other),
                                    field
                                ))
                            }
                        }
                    }
                    RuleExpr::Tokens(tokens)
                }
                other => return Err(format!("{} as rules for '{}'", json_kind(&other), field)),
            };
            rules.insert(field, expr);
        }
        Ok(rules)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl<K, E> FromIterator<(K, E)> for RuleSet
where
    K: Into<String>,
    E: Into<RuleExpr>,
{
    fn from_iter<I: IntoIterator<Item = (K, E)>>(iter: I) -> Self {
        let mut rules = RuleSet::new();
        for (field, expr) in iter {
            rules.insert(field, expr);
        }
        rules
    }
}

impl IntoIterator for RuleSet {
    type Item = (String, RuleExpr);
    type IntoIter = std::vec::IntoIter<(String, RuleExpr)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for RuleSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, expr) in &self.entries {
            map.serialize_entry(field, expr)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RuleSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RuleSetVisitor;

        impl<'de> Visitor<'de> for RuleSetVisitor {
            type Value = RuleSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to rule expressions")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut rules = RuleSet::new();
                while let Some((field, expr)) = access.next_entry::<String, RuleExpr>()? {
                    rules.insert(field, expr);
                }
                Ok(rules)
            }
        }

        deserializer.deserialize_map(RuleSetVisitor)
    }
}
