//! Per-model rule declarations.
//!
//! A model registers its class-level rule sets and its fields once, at
//! definition time, through [`ModelDeclarations::builder`]. The assembler reads
//! these declarations on every validation pass.

use crate::phase::Phase;
use model_guard_validate::{RuleExpr, RuleSet};

/// Canonical rule token for each primitive field type.
pub const TYPE_MAPPING: [(&str, &str); 3] = [
    ("string", "string"),
    ("integer", "integer"),
    ("boolean", "boolean"),
];

/// Declared type of a model field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Boolean,
    Float,
    Array,
    Object,
    /// A composite, user-defined type.
    Named(String),
}

impl FieldType {
    pub fn name(&self) -> &str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Float => "float",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Named(name) => name,
        }
    }

    /// Built-in types are everything but named composites.
    pub fn is_builtin(&self) -> bool {
        !matches!(self, FieldType::Named(_))
    }

    /// The rule token inferred from this type, if any.
    pub fn type_rule(&self) -> Option<&'static str> {
        if !self.is_builtin() {
            return None;
        }
        TYPE_MAPPING
            .iter()
            .find(|(ty, _)| *ty == self.name())
            .map(|(_, rule)| *rule)
    }
}

/// Field-level rule payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulePayload {
    /// A mapping that must contain an entry for the field itself.
    Mapping(RuleSet),
    /// A bare expression implicitly keyed to the field.
    Expr(RuleExpr),
}

impl From<RuleSet> for RulePayload {
    fn from(rules: RuleSet) -> Self {
        RulePayload::Mapping(rules)
    }
}

impl From<RuleExpr> for RulePayload {
    fn from(expr: RuleExpr) -> Self {
        RulePayload::Expr(expr)
    }
}

impl From<&str> for RulePayload {
    fn from(s: &str) -> Self {
        RulePayload::Expr(s.into())
    }
}

impl From<String> for RulePayload {
    fn from(s: String) -> Self {
        RulePayload::Expr(s.into())
    }
}

impl From<Vec<&str>> for RulePayload {
    fn from(tokens: Vec<&str>) -> Self {
        RulePayload::Expr(tokens.into())
    }
}

impl<const N: usize> From<[&str; N]> for RulePayload {
    fn from(tokens: [&str; N]) -> Self {
        RulePayload::Expr(tokens.into())
    }
}

/// One declared field of a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    name: String,
    ty: FieldType,
    nullable: bool,
    create: Option<RulePayload>,
    update: Option<RulePayload>,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: false,
            create: None,
            update: None,
        }
    }

    /// The field accepts null.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Rules applied when the model is created. Only the first declaration counts.
    pub fn on_create(mut self, payload: impl Into<RulePayload>) -> Self {
        if self.create.is_some() {
            trace_debug!(field = %self.name, phase = "create", "ignoring repeated field rules");
        } else {
            self.create = Some(payload.into());
        }
        self
    }

    /// Rules applied when the model is updated. Only the first declaration counts.
    pub fn on_update(mut self, payload: impl Into<RulePayload>) -> Self {
        if self.update.is_some() {
            trace_debug!(field = %self.name, phase = "update", "ignoring repeated field rules");
        } else {
            self.update = Some(payload.into());
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &FieldType {
        &self.ty
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn rules_for(&self, phase: Phase) -> Option<&RulePayload> {
        match phase {
            Phase::Create => self.create.as_ref(),
            Phase::Update => self.update.as_ref(),
        }
    }
}

/// All rule declarations of one model type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDeclarations {
    model: String,
    create: Option<RuleSet>,
    update: Option<RuleSet>,
    fields: Vec<FieldDecl>,
}

impl ModelDeclarations {
    pub fn builder(model: impl Into<String>) -> ModelDeclarationsBuilder {
        ModelDeclarationsBuilder {
            decl: ModelDeclarations {
                model: model.into(),
                create: None,
                update: None,
                fields: Vec::new(),
            },
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Class-level rules for a phase.
    pub fn rules_for(&self, phase: Phase) -> Option<&RuleSet> {
        match phase {
            Phase::Create => self.create.as_ref(),
            Phase::Update => self.update.as_ref(),
        }
    }

    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether anything at all is declared for the phase.
    pub fn has_rules_for(&self, phase: Phase) -> bool {
        self.rules_for(phase).is_some() || self.fields.iter().any(|f| f.rules_for(phase).is_some())
    }
}

/// Builder for [`ModelDeclarations`].
///
/// ## Example
///
/// ```rust
/// use model_guard_core::{FieldDecl, FieldType, ModelDeclarations, Phase};
/// use model_guard_validate::RuleSet;
///
/// let decl = ModelDeclarations::builder("Item")
///     .on_create(RuleSet::new().with("name", "required"))
///     .field(FieldDecl::new("name", FieldType::String).on_update("min:3"))
///     .build();
///
/// assert!(decl.has_rules_for(Phase::Create));
/// assert!(decl.has_rules_for(Phase::Update));
/// ```
#[derive(Debug, Clone)]
pub struct ModelDeclarationsBuilder {
    decl: ModelDeclarations,
}

impl ModelDeclarationsBuilder {
    /// Class-level rules for creation. Only the first declaration counts.
    pub fn on_create(mut self, rules: RuleSet) -> Self {
        if self.decl.create.is_some() {
            trace_debug!(model = %self.decl.model, phase = "create", "ignoring repeated model rules");
        } else {
            self.decl.create = Some(rules);
        }
        self
    }

    /// Class-level rules for updates. Only the first declaration counts.
    pub fn on_update(mut self, rules: RuleSet) -> Self {
        if self.decl.update.is_some() {
            trace_debug!(model = %self.decl.model, phase = "update", "ignoring repeated model rules");
        } else {
            self.decl.update = Some(rules);
        }
        self
    }

    /// Declare a field. Redeclaring a field name replaces the earlier one.
    pub fn field(mut self, field: FieldDecl) -> Self {
        match self.decl.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => {
                trace_debug!(model = %self.decl.model, field = %field.name, "field redeclared");
                *existing = field;
            }
            None => self.decl.fields.push(field),
        }
        self
    }

    pub fn build(self) -> ModelDeclarations {
        self.decl
    }
}
