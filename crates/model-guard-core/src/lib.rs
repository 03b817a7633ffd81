//! # model-guard-core
//!
//! Declarative validation for persisted models. A model declares rules once,
//! at class level (`name => "required"`) or per field, and every create or
//! update runs a fresh validation pass over them:
//!
//! 1. class-level rules for the phase are copied into an empty rule set
//! 2. field-level rules are merged in, together with a type rule inferred
//!    from the field's declared type (`string`, `integer`, `boolean`) and a
//!    leading `nullable` for fields that accept null
//! 3. the assembled set goes to a [`ValidationEngine`], and any failures are
//!    raised as a [`ValidationFailure`] carrying every message
//!
//! Most users want the `model-guard` facade crate instead of this one.
//!
//! ## Features
//!
//! - `tracing` (default) - debug logs for each pass
//! - `config` (default) - [`GuardConfig::load`] from `MODEL_GUARD_*`
//!   environment variables and `.env` files

#[macro_use]
mod tracing_macros;

pub mod assembler;
mod config;
mod declarations;
mod error;
mod guard;
mod model;
mod pass;
mod phase;


pub use assembler::{assemble, collect_class_rules, collect_field_rules, merge_field_rules, NULLABLE_RULE};
#[cfg(feature = "config")]
pub use config::ConfigError;
pub use config::{GuardConfig, ENV_PREFIX};
pub use declarations::{
    FieldDecl, FieldType, ModelDeclarations, ModelDeclarationsBuilder, RulePayload, TYPE_MAPPING,
};
pub use error::{GuardError, Result, ValidationFailure};
pub use guard::{LifecycleHooks, ModelGuard};
pub use model::{Guarded, Validatable};
pub use pass::{PassState, ValidationPass};
pub use phase::Phase;

// Re-export the engine seam so model code needs a single import path.
pub use model_guard_validate::{EngineFailure, RuleEngine, RuleExpr, RuleSet, ValidationEngine};

/// Prelude module for model declarations
pub mod prelude {
    pub use crate::declarations::{FieldDecl, FieldType, ModelDeclarations};
    pub use crate::error::{GuardError, Result, ValidationFailure};
    pub use crate::guard::{LifecycleHooks, ModelGuard};
    pub use crate::model::{Guarded, Validatable};
    pub use crate::phase::Phase;
    pub use model_guard_validate::{RuleEngine, RuleSet, ValidationEngine};
}
