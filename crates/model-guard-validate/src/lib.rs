//! # model-guard validation engine
//!
//! Evaluates per-field rule expressions such as `"required|string|min:3"`
//! against a model's attributes and reports every failure, in order.
//!
//! ## Example
//!
//! ```rust
//! use model_guard_validate::prelude::*;
//! use serde_json::json;
//!
//! let rules = RuleSet::new()
//!     .with("name", "required|string")
//!     .with("email", ["required", "email"]);
//! let data = json!({"name": "Widget", "email": "not-an-email"});
//!
//! match RuleEngine::new().validate(data.as_object().unwrap(), &rules) {
//!     Err(EngineFailure::Invalid(errors)) => {
//!         assert_eq!(errors.messages(), vec!["The email field must be a valid email address."]);
//!     }
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```
//!
//! ## Rules
//!
//! - `required`, `accepted` - checked even when the field is absent
//! - `nullable` - a null value skips the other rules of the field
//! - `string`, `integer`, `boolean`, `numeric`, `array` - type checks
//! - `min:n`, `max:n`, `between:a,b`, `size:n` - length, item count, or value
//!   when the field also carries `integer`/`numeric`
//! - `email`, `url`, `regex:/pattern/`, `alpha`, `alpha_num` - formats
//! - `in:a,b`, `not_in:a,b` - membership
//! - `confirmed` - `<field>_confirmation` must match

mod engine;
mod error;
mod messages;
mod rule_set;
mod rules;
mod token;


pub use engine::{RuleEngine, ValidationEngine};
pub use error::{EngineFailure, FieldFailure, RuleError, ValidationErrors};
pub use messages::{attribute_name, Messages, SizeKind};
pub use rule_set::{RuleExpr, RuleSet, RULE_DELIMITER};
pub use rules::{check, is_filled, FieldContext};
pub use token::{RuleToken, TokenError};

/// Prelude module for validation
pub mod prelude {
    pub use crate::engine::{RuleEngine, ValidationEngine};
    pub use crate::error::{EngineFailure, RuleError, ValidationErrors};
    pub use crate::messages::Messages;
    pub use crate::rule_set::{RuleExpr, RuleSet};
    pub use crate::token::RuleToken;
}
