//! Model-side traits.

use crate::assembler::assemble;
use crate::declarations::ModelDeclarations;
use crate::error::{GuardError, Result};
use crate::pass::ValidationPass;
use crate::phase::Phase;
use model_guard_validate::{RuleSet, ValidationEngine};
use serde::Serialize;
use serde_json::{Map, Value};

/// A model type with rule declarations.
///
/// ## Example
///
/// ```rust
/// use model_guard_core::{FieldDecl, FieldType, Guarded, ModelDeclarations};
/// use model_guard_validate::RuleSet;
/// use serde::Serialize;
/// use std::sync::OnceLock;
///
/// #[derive(Serialize)]
/// struct Item {
///     name: String,
///     description: Option<String>,
/// }
///
/// impl Guarded for Item {
///     fn declarations() -> &'static ModelDeclarations {
///         static DECL: OnceLock<ModelDeclarations> = OnceLock::new();
///         DECL.get_or_init(|| {
///             ModelDeclarations::builder("Item")
///                 .on_create(RuleSet::new().with("name", "required"))
///                 .field(FieldDecl::new("description", FieldType::String).nullable().on_update("max:500"))
///                 .build()
///         })
///     }
/// }
/// ```
pub trait Guarded: Serialize {
    /// Declarations for this model type, built once.
    fn declarations() -> &'static ModelDeclarations;

    /// Current field values, by field name.
    ///
    /// Defaults to serializing the model, which must produce a JSON object.
    fn attributes(&self) -> Result<Map<String, Value>> {
        let model = Self::declarations().model();
        let value = serde_json::to_value(self).map_err(|source| GuardError::Attributes {
            model: model.to_string(),
            source,
        })?;
        match value {
            Value::Object(map) => Ok(map),
            other => Err(GuardError::AttributesNotObject {
                model: model.to_string(),
                found: json_kind(&other).to_string(),
            }),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The validation capability, available on every [`Guarded`] model.
///
/// The persistence layer calls these directly, or goes through
/// [`LifecycleHooks`](crate::LifecycleHooks).
pub trait Validatable: Sized {
    /// Fresh rule set for creating this model.
    fn collect_create_rules(&self) -> Result<RuleSet>;

    /// Fresh rule set for updating this model.
    fn collect_update_rules(&self) -> Result<RuleSet>;

    /// Validate against the rules of `phase`, returning the model on success.
    fn validate(&self, engine: &dyn ValidationEngine, phase: Phase) -> Result<&Self>;

    /// Let `override_fn` rewrite the rules of `phase` instead of validating.
    fn validate_with<F>(&self, phase: Phase, override_fn: F) -> Result<RuleSet>
    where
        F: FnOnce(RuleSet) -> Value;
}

impl<M: Guarded> Validatable for M {
    fn collect_create_rules(&self) -> Result<RuleSet> {
        assemble(M::declarations(), Phase::Create)
    }

    fn collect_update_rules(&self) -> Result<RuleSet> {
        assemble(M::declarations(), Phase::Update)
    }

    fn validate(&self, engine: &dyn ValidationEngine, phase: Phase) -> Result<&Self> {
        ValidationPass::new(self, phase).validate(engine)
    }

    fn validate_with<F>(&self, phase: Phase, override_fn: F) -> Result<RuleSet>
    where
        F: FnOnce(RuleSet) -> Value,
    {
        ValidationPass::new(self, phase).validate_with(override_fn)
    }
}
