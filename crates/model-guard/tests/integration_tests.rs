//! Integration tests for model-guard
//!
//! These tests drive declarations, assembly, the bundled engine, and the
//! lifecycle hooks together, the way a persistence layer would.

use model_guard::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("model_guard_core=debug"))
        .with_test_writer()
        .try_init();
}

fn counting_engine(calls: Arc<AtomicUsize>) -> impl ValidationEngine {
    move |_: &serde_json::Map<String, serde_json::Value>, _: &RuleSet| -> std::result::Result<(), EngineFailure> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Test models
// ============================================================================

#[derive(Debug, Clone, Serialize)]
struct Product {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sku: Option<String>,
    stock: Option<i64>,
}

impl Guarded for Product {
    fn declarations() -> &'static ModelDeclarations {
        static DECL: OnceLock<ModelDeclarations> = OnceLock::new();
        DECL.get_or_init(|| {
            ModelDeclarations::builder("Product")
                .field(FieldDecl::new("name", FieldType::String).on_create("required"))
                .field(
                    FieldDecl::new("sku", FieldType::String)
                        .on_create("required|alpha_num")
                        .on_update(["alpha_num", "size:8"]),
                )
                .field(
                    FieldDecl::new("stock", FieldType::Integer)
                        .nullable()
                        .on_update("min:0"),
                )
                .build()
        })
    }
}

fn product(name: Option<&str>, sku: Option<&str>, stock: Option<i64>) -> Product {
    Product {
        name: name.map(String::from),
        sku: sku.map(String::from),
        stock,
    }
}

#[derive(Debug, Serialize)]
struct Account {
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
}

impl Guarded for Account {
    fn declarations() -> &'static ModelDeclarations {
        static DECL: OnceLock<ModelDeclarations> = OnceLock::new();
        DECL.get_or_init(|| {
            ModelDeclarations::builder("Account")
                .on_create(RuleSet::new().with("username", "required"))
                .field(
                    FieldDecl::new("username", FieldType::String)
                        .on_create(RuleSet::new().with("username", "min:3")),
                )
                .build()
        })
    }
}

#[derive(Debug, Serialize)]
struct Setting {
    key: String,
}

impl Guarded for Setting {
    fn declarations() -> &'static ModelDeclarations {
        static DECL: OnceLock<ModelDeclarations> = OnceLock::new();
        DECL.get_or_init(|| ModelDeclarations::builder("Setting").build())
    }
}

// ============================================================================
// Lifecycle Tests
// ============================================================================

mod lifecycle_tests {
    use super::*;

    #[test]
    fn scalar_create_rule_accepts_valid_model() {
        init_tracing();
        let guard = ModelGuard::new();
        assert!(guard
            .before_create(&product(Some("Lamp"), Some("LMP00001"), None))
            .is_ok());
    }

    #[test]
    fn scalar_create_rule_rejects_missing_field() {
        let guard = ModelGuard::new();
        let err = guard
            .before_create(&product(None, Some("LMP00001"), None))
            .unwrap_err();

        let failure = err.as_validation_failure().expect("validation failure");
        assert_eq!(failure.model(), "Product");
        assert_eq!(failure.messages(), ["The name field is required."]);
        assert_eq!(failure.message(), "The name field is required.");
    }

    #[test]
    fn two_failures_are_both_reported_in_order() {
        let guard = ModelGuard::new();
        let err = guard.before_create(&product(None, None, None)).unwrap_err();

        let failure = err.as_validation_failure().unwrap();
        assert_eq!(
            failure.messages(),
            ["The name field is required.", "The sku field is required."]
        );
        assert_eq!(
            failure.message(),
            "Error occurred while validating model Product"
        );
    }

    #[test]
    fn update_applies_update_rules_only() {
        let guard = ModelGuard::new();

        // No `required` on update, so a missing name is fine.
        assert!(guard
            .before_update(&product(None, Some("LMP00001"), Some(3)))
            .is_ok());

        let err = guard
            .before_update(&product(None, Some("LMP-1"), Some(-1)))
            .unwrap_err();
        assert_eq!(
            err.as_validation_failure().unwrap().messages(),
            [
                "The sku field must only contain letters and numbers.",
                "The sku field must be 8 characters.",
                "The stock field must be at least 0.",
            ]
        );
    }

    #[test]
    fn nullable_field_accepts_null_on_update() {
        let guard = ModelGuard::new();
        assert!(guard
            .before_update(&product(Some("Lamp"), Some("LMP00001"), None))
            .is_ok());
    }

    #[test]
    fn model_without_rules_always_passes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let guard = ModelGuard::with_engine(counting_engine(calls.clone()));

        let setting = Setting { key: String::new() };
        assert!(guard.before_create(&setting).is_ok());
        assert!(guard.before_update(&setting).is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn auto_validate_off_lets_invalid_models_through() {
        let guard = ModelGuard::from_config(GuardConfig {
            auto_validate: false,
            ..GuardConfig::default()
        });
        assert!(guard.before_create(&product(None, None, None)).is_ok());
        assert!(guard
            .validate(&product(None, None, None), Phase::Create)
            .is_err());
    }

    #[test]
    fn custom_messages_reach_the_failure() {
        let engine = RuleEngine::new().with_messages(
            Messages::new().set("name.required", "Give the {attribute} a name, please."),
        );
        let guard = ModelGuard::with_engine(engine);

        let err = guard
            .before_create(&product(None, Some("LMP00001"), None))
            .unwrap_err();
        assert_eq!(
            err.as_validation_failure().unwrap().messages(),
            ["Give the name a name, please."]
        );
    }
}

// ============================================================================
// Rule Assembly Tests
// ============================================================================

mod assembly_tests {
    use super::*;

    #[test]
    fn class_and_field_rules_merge() {
        let account = Account { username: None };
        let rules = account.collect_create_rules().unwrap();
        assert_eq!(rules.tokens("username"), vec!["required", "string", "min:3"]);
    }

    #[test]
    fn merged_rules_are_enforced() {
        let guard = ModelGuard::new();
        let err = guard
            .before_create(&Account {
                username: Some("al".into()),
            })
            .unwrap_err();
        assert_eq!(
            err.as_validation_failure().unwrap().messages(),
            ["The username field must be at least 3 characters."]
        );
    }

    #[test]
    fn passes_never_accumulate_rules() {
        let account = Account { username: None };
        let first = account.collect_create_rules().unwrap();
        for _ in 0..3 {
            assert_eq!(account.collect_create_rules().unwrap(), first);
        }
    }

    #[test]
    fn create_and_update_rules_are_not_swapped() {
        let item = product(None, None, None);
        let create = item.collect_create_rules().unwrap();
        let update = item.collect_update_rules().unwrap();

        assert_eq!(create.tokens("sku"), vec!["string", "required", "alpha_num"]);
        assert_eq!(update.tokens("sku"), vec!["string", "alpha_num", "size:8"]);
        assert!(!create.contains("stock"));
        assert_eq!(update.tokens("stock"), vec!["nullable", "integer", "min:0"]);
    }
}

// ============================================================================
// Override Tests
// ============================================================================

mod override_tests {
    use super::*;

    #[test]
    fn override_returning_a_string_is_rejected_before_the_engine() {
        let calls = Arc::new(AtomicUsize::new(0));
        let guard = ModelGuard::with_engine(counting_engine(calls.clone()));

        let err = guard
            .validate_with(&product(None, None, None), Phase::Create, |_| {
                serde_json::json!("required|string")
            })
            .unwrap_err();

        assert!(matches!(err, GuardError::InvalidOverrideResult { ref found } if found == "string"));
        assert_eq!(
            err.to_string(),
            "the validate override should return a rule set, got string"
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn override_can_extend_collected_rules() {
        let item = product(None, None, None);
        let rules = item
            .validate_with(Phase::Create, |mut rules| {
                rules.insert("stock", "required|integer");
                serde_json::to_value(rules).unwrap()
            })
            .unwrap();

        assert_eq!(rules.tokens("name"), vec!["string", "required"]);
        assert_eq!(rules.tokens("stock"), vec!["required", "integer"]);
    }
}

// ============================================================================
// Persistence Simulation Tests
// ============================================================================

mod repository_tests {
    use super::*;

    /// In-memory store that validates before every write.
    struct Repository<M> {
        guard: ModelGuard,
        rows: Vec<M>,
    }

    impl<M: Guarded> Repository<M> {
        fn new(guard: ModelGuard) -> Self {
            Self {
                guard,
                rows: Vec::new(),
            }
        }

        fn create(&mut self, model: M) -> Result<usize> {
            self.guard.before_create(&model)?;
            self.rows.push(model);
            Ok(self.rows.len() - 1)
        }

        fn update(&mut self, id: usize, model: M) -> Result<()> {
            self.guard.before_update(&model)?;
            self.rows[id] = model;
            Ok(())
        }
    }

    #[test]
    fn failed_create_writes_nothing() {
        let mut repo = Repository::new(ModelGuard::new());

        let err = repo.create(product(None, Some("LMP00001"), None)).unwrap_err();
        assert!(err.is_validation_failure());
        assert!(repo.rows.is_empty());

        let id = repo.create(product(Some("Lamp"), Some("LMP00001"), Some(4))).unwrap();
        assert_eq!(id, 0);
        assert_eq!(repo.rows.len(), 1);
    }

    #[test]
    fn failed_update_keeps_previous_row() {
        let mut repo = Repository::new(ModelGuard::new());
        let id = repo.create(product(Some("Lamp"), Some("LMP00001"), Some(4))).unwrap();

        assert!(repo.update(id, product(Some("Lamp"), Some("LMP00001"), Some(-4))).is_err());
        assert_eq!(repo.rows[id].stock, Some(4));

        repo.update(id, product(Some("Desk lamp"), Some("LMP00001"), Some(9)))
            .unwrap();
        assert_eq!(repo.rows[id].name.as_deref(), Some("Desk lamp"));
    }

    #[test]
    fn failure_serializes_for_api_responses() {
        let mut repo = Repository::new(ModelGuard::new());
        let err = repo.create(product(None, None, None)).unwrap_err();

        let json = serde_json::to_value(err.as_validation_failure().unwrap()).unwrap();
        assert_eq!(json["error"]["type"], "validation_error");
        assert_eq!(json["error"]["model"], "Product");
        assert_eq!(json["error"]["messages"].as_array().unwrap().len(), 2);
    }
}
