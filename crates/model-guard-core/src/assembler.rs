//! The rule assembler.
//!
//! Builds the rule set for one validation pass out of a model's
//! declarations: class-level rules first, then field-level rules merged with
//! the rules inferred from each field's type.

use crate::declarations::{FieldDecl, ModelDeclarations, RulePayload};
use crate::error::{GuardError, Result};
use crate::phase::Phase;
use model_guard_validate::{RuleExpr, RuleSet};

/// Token prepended for fields whose type accepts null.
pub const NULLABLE_RULE: &str = "nullable";

/// Copy the class-level rules of `phase` into `rules`.
///
/// Each declared field overwrites whatever `rules` already holds for it.
/// A model without class-level rules for the phase leaves `rules` untouched.
pub fn collect_class_rules<'r>(
    rules: &'r mut RuleSet,
    decl: &ModelDeclarations,
    phase: Phase,
) -> &'r mut RuleSet {
    if let Some(class_rules) = decl.rules_for(phase) {
        for (field, expr) in class_rules.iter() {
            rules.insert(field, expr.clone());
        }
    }
    rules
}

/// Merge the field-level rules of `phase` into `rules`.
///
/// # Errors
///
/// [`GuardError::InvalidRuleDeclaration`] when a field declares a rule mapping
/// without an entry for itself.
pub fn collect_field_rules<'r>(
    rules: &'r mut RuleSet,
    decl: &ModelDeclarations,
    phase: Phase,
) -> Result<&'r mut RuleSet> {
    for field in decl.fields() {
        let Some(payload) = field.rules_for(phase) else {
            continue;
        };

        let expr = match payload {
            RulePayload::Mapping(mapping) => mapping.get(field.name()).cloned().ok_or_else(|| {
                GuardError::InvalidRuleDeclaration {
                    model: decl.model().to_string(),
                    field: field.name().to_string(),
                }
            })?,
            RulePayload::Expr(expr) => expr.clone(),
        };

        let merged = merge_field_rules(rules.get(field.name()), field, &expr);
        rules.insert(field.name(), RuleExpr::Tokens(merged));
    }
    Ok(rules)
}

/// Combine a field's existing rules, its type rules and a new expression.
///
/// For fields of a mapped primitive type the result starts with `nullable`
/// (when the field accepts null), then the existing tokens, then the type
/// token. The new expression's tokens are appended and duplicates dropped.
pub fn merge_field_rules(existing: Option<&RuleExpr>, field: &FieldDecl, expr: &RuleExpr) -> Vec<String> {
    let existing = existing.map(RuleExpr::tokens).unwrap_or_default();

    let mut merged = match field.ty().type_rule() {
        Some(type_rule) => {
            let mut base = Vec::with_capacity(existing.len() + 2);
            if field.is_nullable() {
                base.push(NULLABLE_RULE.to_string());
            }
            base.extend(existing);
            base.push(type_rule.to_string());
            base
        }
        None => existing,
    };

    merged.extend(expr.tokens());
    dedupe(merged)
}

/// Drop repeated tokens, keeping the first occurrence of each.
pub fn dedupe(tokens: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if !seen.contains(&token) {
            seen.push(token);
        }
    }
    seen
}

/// Build a fresh rule set for one pass: class rules, then field rules.
pub fn assemble(decl: &ModelDeclarations, phase: Phase) -> Result<RuleSet> {
    let mut rules = RuleSet::new();
    collect_class_rules(&mut rules, decl, phase);
    collect_field_rules(&mut rules, decl, phase)?;
    trace_debug!(
        model = decl.model(),
        phase = phase.name(),
        fields = rules.len(),
        "rules collected"
    );
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declarations::FieldType;

    fn tokens(rules: &RuleSet, field: &str) -> Vec<String> {
        rules.tokens(field)
    }

    #[test]
    fn class_rules_overwrite_existing_entries() {
        let decl = ModelDeclarations::builder("Item")
            .on_create(RuleSet::new().with("name", "required"))
            .build();
        let mut rules = RuleSet::new().with("name", "nullable").with("age", "integer");

        collect_class_rules(&mut rules, &decl, Phase::Create);

        assert_eq!(rules.get("name"), Some(&RuleExpr::from("required")));
        assert_eq!(rules.get("age"), Some(&RuleExpr::from("integer")));
    }

    #[test]
    fn class_rules_of_other_phase_are_ignored() {
        let decl = ModelDeclarations::builder("Item")
            .on_update(RuleSet::new().with("name", "required"))
            .build();
        let mut rules = RuleSet::new();

        collect_class_rules(&mut rules, &decl, Phase::Create);
        assert!(rules.is_empty());
    }

    #[test]
    fn scalar_payload_gets_type_rule() {
        let decl = ModelDeclarations::builder("Item")
            .field(FieldDecl::new("name", FieldType::String).on_create("required"))
            .build();
        let mut rules = RuleSet::new();

        collect_field_rules(&mut rules, &decl, Phase::Create).unwrap();
        assert_eq!(tokens(&rules, "name"), vec!["string", "required"]);
    }

    #[test]
    fn nullable_primitive_gets_nullable_first() {
        let decl = ModelDeclarations::builder("Item")
            .field(
                FieldDecl::new("bio", FieldType::String)
                    .nullable()
                    .on_update(["max:200"]),
            )
            .build();
        let mut rules = RuleSet::new();

        collect_field_rules(&mut rules, &decl, Phase::Update).unwrap();
        assert_eq!(tokens(&rules, "bio"), vec!["nullable", "string", "max:200"]);
    }

    #[test]
    fn class_and_field_rules_merge_for_composite_type() {
        let decl = ModelDeclarations::builder("Item")
            .on_create(RuleSet::new().with("name", "required"))
            .field(
                FieldDecl::new("name", FieldType::Named("Name".into()))
                    .on_create(RuleSet::new().with("name", "min:3")),
            )
            .build();

        let rules = assemble(&decl, Phase::Create).unwrap();
        assert_eq!(tokens(&rules, "name"), vec!["required", "min:3"]);
    }

    #[test]
    fn class_and_field_rules_merge_with_type_inference() {
        let decl = ModelDeclarations::builder("Item")
            .on_create(RuleSet::new().with("name", "required"))
            .field(
                FieldDecl::new("name", FieldType::String)
                    .on_create(RuleSet::new().with("name", "min:3")),
            )
            .build();

        let rules = assemble(&decl, Phase::Create).unwrap();
        assert_eq!(tokens(&rules, "name"), vec!["required", "string", "min:3"]);
    }

    #[test]
    fn existing_joined_string_is_split_before_merging() {
        let field = FieldDecl::new("name", FieldType::String);
        let merged = merge_field_rules(
            Some(&RuleExpr::from("required|string")),
            &field,
            &RuleExpr::from("string"),
        );
        assert_eq!(merged, vec!["required", "string"]);
    }

    #[test]
    fn new_joined_expression_contributes_each_token() {
        let field = FieldDecl::new("age", FieldType::Integer);
        let merged = merge_field_rules(None, &field, &RuleExpr::from("required|min:18"));
        assert_eq!(merged, vec!["integer", "required", "min:18"]);
    }

    #[test]
    fn mapping_without_self_key_is_rejected() {
        let decl = ModelDeclarations::builder("Item")
            .field(
                FieldDecl::new("name", FieldType::String)
                    .on_create(RuleSet::new().with("title", "required")),
            )
            .build();
        let mut rules = RuleSet::new();

        let err = collect_field_rules(&mut rules, &decl, Phase::Create).unwrap_err();
        assert!(matches!(
            err,
            GuardError::InvalidRuleDeclaration { ref model, ref field }
                if model == "Item" && field == "name"
        ));
    }

    #[test]
    fn non_primitive_builtin_gets_no_type_rule() {
        let decl = ModelDeclarations::builder("Item")
            .field(FieldDecl::new("price", FieldType::Float).nullable().on_create("numeric"))
            .build();

        let rules = assemble(&decl, Phase::Create).unwrap();
        assert_eq!(tokens(&rules, "price"), vec!["numeric"]);
    }

    #[test]
    fn assemble_is_fresh_per_call() {
        let decl = ModelDeclarations::builder("Item")
            .field(FieldDecl::new("name", FieldType::String).nullable().on_create("required"))
            .build();

        let first = assemble(&decl, Phase::Create).unwrap();
        let second = assemble(&decl, Phase::Create).unwrap();
        assert_eq!(first, second);
        assert_eq!(tokens(&second, "name"), vec!["nullable", "string", "required"]);
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let tokens = vec!["required", "string", "required", "min:3", "string"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(dedupe(tokens), vec!["required", "string", "min:3"]);
    }
}
