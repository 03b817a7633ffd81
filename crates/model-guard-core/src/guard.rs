//! Lifecycle integration.

use crate::config::GuardConfig;
use crate::error::{GuardError, Result};
use crate::model::Guarded;
use crate::pass::ValidationPass;
use crate::phase::Phase;
use model_guard_validate::{RuleEngine, RuleSet, ValidationEngine};
use std::fmt;
use std::sync::Arc;

/// Hooks a persistence layer calls right before writing a model.
///
/// Returning an error aborts the write; the error reaches the caller of the
/// create or update unchanged.
pub trait LifecycleHooks {
    /// Called before a new model is inserted. Applies create rules.
    fn before_create<M: Guarded>(&self, model: &M) -> Result<()>;

    /// Called before an existing model is saved. Applies update rules.
    fn before_update<M: Guarded>(&self, model: &M) -> Result<()>;
}

/// Runs validation passes with a shared engine and configuration.
///
/// ## Example
///
/// ```rust
/// use model_guard_core::{FieldDecl, FieldType, Guarded, LifecycleHooks, ModelDeclarations, ModelGuard};
/// use serde::Serialize;
/// use std::sync::OnceLock;
///
/// #[derive(Serialize)]
/// struct Item {
///     name: Option<String>,
/// }
///
/// impl Guarded for Item {
///     fn declarations() -> &'static ModelDeclarations {
///         static DECL: OnceLock<ModelDeclarations> = OnceLock::new();
///         DECL.get_or_init(|| {
///             ModelDeclarations::builder("Item")
///                 .field(FieldDecl::new("name", FieldType::String).on_create("required"))
///                 .build()
///         })
///     }
/// }
///
/// let guard = ModelGuard::new();
/// assert!(guard.before_create(&Item { name: Some("Widget".into()) }).is_ok());
/// assert!(guard.before_create(&Item { name: None }).is_err());
/// ```
#[derive(Clone)]
pub struct ModelGuard {
    engine: Arc<dyn ValidationEngine>,
    config: GuardConfig,
    /// The engine is the bundled [`RuleEngine`] built from `config`.
    bundled: bool,
}

impl ModelGuard {
    /// A guard using the bundled [`RuleEngine`] and default configuration.
    pub fn new() -> Self {
        Self::from_config(GuardConfig::default())
    }

    /// A guard using the bundled engine, set up from `config`.
    pub fn from_config(config: GuardConfig) -> Self {
        Self {
            engine: Self::bundled_engine(&config),
            config,
            bundled: true,
        }
    }

    fn bundled_engine(config: &GuardConfig) -> Arc<dyn ValidationEngine> {
        Arc::new(RuleEngine::new().lenient(config.lenient_rules))
    }

    /// A guard delegating to a custom engine.
    pub fn with_engine(engine: impl ValidationEngine + 'static) -> Self {
        Self::with_engine_arc(Arc::new(engine))
    }

    pub fn with_engine_arc(engine: Arc<dyn ValidationEngine>) -> Self {
        Self {
            engine,
            config: GuardConfig::default(),
            bundled: false,
        }
    }

    /// Replace the configuration.
    ///
    /// The bundled engine is rebuilt so `lenient_rules` takes effect. A custom
    /// engine is kept as is and decides on unknown rules by itself.
    pub fn config(mut self, config: GuardConfig) -> Self {
        if self.bundled {
            self.engine = Self::bundled_engine(&config);
        } else if config.lenient_rules {
            trace_warn!("lenient_rules has no effect on a custom validation engine");
        }
        self.config = config;
        self
    }

    /// A guard configured from the environment (see [`GuardConfig::load`]).
    #[cfg(feature = "config")]
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_config(GuardConfig::load()?))
    }

    pub fn settings(&self) -> &GuardConfig {
        &self.config
    }

    pub fn engine(&self) -> &dyn ValidationEngine {
        self.engine.as_ref()
    }

    /// Validate `model` against the rules of `phase`.
    pub fn validate<'m, M: Guarded>(&self, model: &'m M, phase: Phase) -> Result<&'m M> {
        let mut pass = ValidationPass::new(model, phase);
        let rules = pass.collect_rules()?;
        self.log_rules(M::declarations().model(), phase, rules);

        let outcome = pass.validate(self.engine.as_ref());
        match &outcome {
            Ok(_) => {
                trace_debug!(model = M::declarations().model(), phase = phase.name(), "model valid");
            }
            Err(err @ GuardError::UnsupportedRule { .. }) => {
                trace_warn!(
                    model = M::declarations().model(),
                    error = %err,
                    "rule set cannot be evaluated"
                );
            }
            Err(err) => {
                trace_info!(
                    model = M::declarations().model(),
                    phase = phase.name(),
                    error = %err,
                    "model rejected"
                );
            }
        }
        outcome
    }

    /// Collect the rules of `phase` and let `override_fn` replace them.
    pub fn validate_with<M, F>(&self, model: &M, phase: Phase, override_fn: F) -> Result<RuleSet>
    where
        M: Guarded,
        F: FnOnce(RuleSet) -> serde_json::Value,
    {
        ValidationPass::new(model, phase).validate_with(override_fn)
    }

    fn log_rules(&self, model: &str, phase: Phase, rules: &RuleSet) {
        if self.config.log_rules {
            trace_debug!(model, phase = phase.name(), rules = ?rules, "assembled rules");
        }
    }

    fn hook<M: Guarded>(&self, model: &M, phase: Phase) -> Result<()> {
        if !self.config.auto_validate {
            trace_debug!(model = M::declarations().model(), phase = phase.name(), "auto validation off");
            return Ok(());
        }
        self.validate(model, phase).map(|_| ())
    }
}

impl LifecycleHooks for ModelGuard {
    fn before_create<M: Guarded>(&self, model: &M) -> Result<()> {
        self.hook(model, Phase::Create)
    }

    fn before_update<M: Guarded>(&self, model: &M) -> Result<()> {
        self.hook(model, Phase::Update)
    }
}

impl Default for ModelGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ModelGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelGuard")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declarations::{FieldDecl, FieldType, ModelDeclarations};
    use model_guard_validate::EngineFailure;
    use serde::Serialize;
    use serde_json::{Map, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::OnceLock;

    #[derive(Debug, Serialize)]
    struct Item {
        name: Option<String>,
        code: Option<String>,
    }

    impl Guarded for Item {
        fn declarations() -> &'static ModelDeclarations {
            static DECL: OnceLock<ModelDeclarations> = OnceLock::new();
            DECL.get_or_init(|| {
                ModelDeclarations::builder("Item")
                    .field(
                        FieldDecl::new("name", FieldType::String)
                            .on_create("required")
                            .on_update("min:3"),
                    )
                    .field(FieldDecl::new("code", FieldType::String).nullable().on_update("shiny"))
                    .build()
            })
        }
    }

    fn item(name: Option<&str>) -> Item {
        Item {
            name: name.map(String::from),
            code: None,
        }
    }

    #[test]
    fn before_create_uses_create_rules() {
        let guard = ModelGuard::new();
        assert!(guard.before_create(&item(Some("ab"))).is_ok());

        let err = guard.before_create(&item(None)).unwrap_err();
        let failure = err.as_validation_failure().unwrap();
        assert!(failure
            .messages()
            .contains(&"The name field is required.".to_string()));
    }

    #[test]
    fn before_update_uses_update_rules() {
        let guard = ModelGuard::from_config(GuardConfig {
            lenient_rules: true,
            ..GuardConfig::default()
        });
        // No `required` on update, but min:3 applies.
        let err = guard.before_update(&item(Some("ab"))).unwrap_err();
        assert_eq!(
            err.as_validation_failure().unwrap().messages(),
            ["The name field must be at least 3 characters."]
        );
        assert!(guard.before_update(&item(Some("abc"))).is_ok());
    }

    #[test]
    fn config_switches_bundled_engine_to_lenient() {
        let guard = ModelGuard::new().config(GuardConfig {
            lenient_rules: true,
            ..GuardConfig::default()
        });
        assert!(guard.settings().lenient_rules);
        assert!(guard.before_update(&item(Some("abc"))).is_ok());

        // And back to strict.
        let guard = guard.config(GuardConfig::default());
        assert!(matches!(
            guard.before_update(&item(Some("abc"))),
            Err(crate::GuardError::UnsupportedRule { .. })
        ));
    }

    #[test]
    fn config_keeps_custom_engine() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let engine = move |_: &Map<String, Value>, _: &RuleSet| -> std::result::Result<(), EngineFailure> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };

        let guard = ModelGuard::with_engine(engine).config(GuardConfig {
            lenient_rules: true,
            ..GuardConfig::default()
        });
        assert!(guard.before_create(&item(None)).is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unknown_rule_surfaces_when_strict() {
        let guard = ModelGuard::new();
        let err = guard.before_update(&item(Some("abc"))).unwrap_err();
        assert!(matches!(
            err,
            crate::GuardError::UnsupportedRule { ref field, ref rule, .. }
                if field == "code" && rule == "shiny"
        ));
    }

    #[test]
    fn auto_validate_off_skips_hooks() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let engine = move |_: &Map<String, Value>, _: &RuleSet| -> std::result::Result<(), EngineFailure> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };

        let guard = ModelGuard::with_engine(engine).config(GuardConfig {
            auto_validate: false,
            ..GuardConfig::default()
        });
        assert!(guard.before_create(&item(None)).is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        // Explicit validation still runs.
        assert!(guard.validate(&item(None), Phase::Create).is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn override_path_never_reaches_engine() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let engine = move |_: &Map<String, Value>, _: &RuleSet| -> std::result::Result<(), EngineFailure> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };
        let guard = ModelGuard::with_engine(engine);

        let err = guard
            .validate_with(&item(None), Phase::Create, |_| Value::String("required".into()))
            .unwrap_err();
        assert!(matches!(err, crate::GuardError::InvalidOverrideResult { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
