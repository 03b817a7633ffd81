//! # model-guard
//!
//! Declarative validation for persisted models.
//!
//! A model declares its rules once: class-level rule sets for create and
//! update, plus per-field rules that are merged with a rule inferred from the
//! field's type. Every write then runs a fresh validation pass, and a failing
//! pass aborts the write with every message the engine reported.
//!
//! ## Quick Start
//!
//! ```rust
//! use model_guard::prelude::*;
//! use std::sync::OnceLock;
//!
//! #[derive(Serialize)]
//! struct Article {
//!     #[serde(skip_serializing_if = "Option::is_none")]
//!     title: Option<String>,
//!     summary: Option<String>,
//! }
//!
//! impl Guarded for Article {
//!     fn declarations() -> &'static ModelDeclarations {
//!         static DECL: OnceLock<ModelDeclarations> = OnceLock::new();
//!         DECL.get_or_init(|| {
//!             ModelDeclarations::builder("Article")
//!                 .on_create(RuleSet::new().with("title", "required"))
//!                 .field(FieldDecl::new("title", FieldType::String).on_create("min:3"))
//!                 .field(FieldDecl::new("summary", FieldType::String).nullable().on_update("max:140"))
//!                 .build()
//!         })
//!     }
//! }
//!
//! let guard = ModelGuard::new();
//!
//! let draft = Article { title: Some("Rust".into()), summary: None };
//! assert!(guard.before_create(&draft).is_ok());
//!
//! let empty = Article { title: None, summary: None };
//! let err = guard.before_create(&empty).unwrap_err();
//! assert_eq!(
//!     err.as_validation_failure().unwrap().messages(),
//!     ["The title field is required."]
//! );
//! ```
//!
//! ## Optional Features
//!
//! - `tracing` (default) - debug logs for assembly and each validation pass
//! - `config` (default) - [`GuardConfig::load`] from `MODEL_GUARD_*`
//!   environment variables and `.env` files
//! - `full` - All optional features enabled

// Re-export core functionality
pub use model_guard_core::*;

// Re-export the engine crate
pub use model_guard_validate as validate;
pub use model_guard_validate::{Messages, RuleError, RuleToken, ValidationErrors};

// Re-export commonly used external types
pub use serde;
pub use serde_json;
pub use tracing;

/// Prelude module - import everything you need with `use model_guard::prelude::*`
pub mod prelude {
    pub use model_guard_core::{
        // Declarations
        FieldDecl,
        FieldType,
        // Errors
        GuardError,
        // Models
        Guarded,
        // Lifecycle
        LifecycleHooks,
        ModelDeclarations,
        ModelGuard,
        Phase,
        Result,
        Validatable,
        ValidationFailure,
    };

    // Configuration
    pub use model_guard_core::GuardConfig;

    // Engine
    pub use model_guard_validate::{EngineFailure, Messages, RuleEngine, RuleSet, ValidationEngine};

    // Re-export serde for convenience
    pub use serde::{Deserialize, Serialize};
}
