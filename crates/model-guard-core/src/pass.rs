//! A single validation pass over one model.
//!
//! States: `Untouched -> RulesCollected -> Validated | Failed`. The terminal
//! transitions consume the pass, so a finished pass can never run again and
//! its rule set never leaks into a later one. A pass left `Failed` by rule
//! collection refuses every further call with [`GuardError::PassFinished`].

use crate::assembler::assemble;
use crate::error::{GuardError, Result, ValidationFailure};
use crate::model::Guarded;
use crate::phase::Phase;
use model_guard_validate::{EngineFailure, RuleSet, ValidationEngine};

/// Where a pass currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    Untouched,
    RulesCollected,
    Validated,
    Failed,
}

impl PassState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PassState::Validated | PassState::Failed)
    }

    pub fn name(self) -> &'static str {
        match self {
            PassState::Untouched => "untouched",
            PassState::RulesCollected => "rules_collected",
            PassState::Validated => "validated",
            PassState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PassState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub struct ValidationPass<'m, M: Guarded> {
    model: &'m M,
    phase: Phase,
    state: PassState,
    rules: RuleSet,
}

impl<'m, M: Guarded> ValidationPass<'m, M> {
    pub fn new(model: &'m M, phase: Phase) -> Self {
        Self {
            model,
            phase,
            state: PassState::Untouched,
            rules: RuleSet::new(),
        }
    }

    pub fn state(&self) -> PassState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Rules collected so far; empty before [`collect_rules`](Self::collect_rules).
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    fn transition(&mut self, to: PassState) {
        trace_debug!(
            model = M::declarations().model(),
            phase = self.phase.name(),
            from = self.state.name(),
            to = to.name(),
            "validation pass"
        );
        self.state = to;
    }

    /// Assemble the rule set for this pass. Collecting twice is a no-op.
    ///
    /// # Errors
    ///
    /// The assembler's error on the first failed attempt, then
    /// [`GuardError::PassFinished`] on every later call.
    pub fn collect_rules(&mut self) -> Result<&RuleSet> {
        if self.state.is_terminal() {
            return Err(GuardError::PassFinished {
                model: M::declarations().model().to_string(),
                state: self.state,
            });
        }
        if self.state == PassState::Untouched {
            match assemble(M::declarations(), self.phase) {
                Ok(rules) => {
                    self.rules = rules;
                    self.transition(PassState::RulesCollected);
                }
                Err(err) => {
                    self.transition(PassState::Failed);
                    return Err(err);
                }
            }
        }
        Ok(&self.rules)
    }

    /// Run the engine over the model's attributes.
    ///
    /// An empty rule set passes without consulting the engine.
    pub fn validate(mut self, engine: &dyn ValidationEngine) -> Result<&'m M> {
        self.collect_rules()?;
        match self.run_engine(engine) {
            Ok(()) => {
                self.transition(PassState::Validated);
                Ok(self.model)
            }
            Err(err) => {
                self.transition(PassState::Failed);
                Err(err)
            }
        }
    }

    fn run_engine(&self, engine: &dyn ValidationEngine) -> Result<()> {
        if self.rules.is_empty() {
            return Ok(());
        }

        let model = M::declarations().model();
        let attributes = self.model.attributes()?;
        engine
            .validate(&attributes, &self.rules)
            .map_err(|failure| match failure {
                EngineFailure::Invalid(errors) => {
                    ValidationFailure::from_errors(model, errors).into()
                }
                EngineFailure::UnsupportedRule { field, rule } => GuardError::UnsupportedRule {
                    model: model.to_string(),
                    field,
                    rule,
                },
            })
    }

    /// Hand the collected rules to `override_fn` instead of running an engine.
    ///
    /// The override must return a JSON object of field name to rule string or
    /// list of rule strings; that object becomes the pass's rule set.
    pub fn validate_with<F>(mut self, override_fn: F) -> Result<RuleSet>
    where
        F: FnOnce(RuleSet) -> serde_json::Value,
    {
        self.collect_rules()?;
        let collected = std::mem::take(&mut self.rules);

        match RuleSet::from_json(override_fn(collected)) {
            Ok(rules) => {
                self.transition(PassState::Validated);
                Ok(rules)
            }
            Err(found) => {
                self.transition(PassState::Failed);
                Err(GuardError::InvalidOverrideResult { found })
            }
        }
    }
}
