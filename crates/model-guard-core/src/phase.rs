//! Lifecycle phases that select which rules apply.

use serde::{Deserialize, Serialize};

/// The persistence operation a validation pass runs for.
///
/// Creating a model reads `CreateRules` declarations, updating reads
/// `UpdateRules`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Rules for creating new records
    Create,
    /// Rules for updating existing records
    Update,
}

impl Phase {
    /// `true` selects [`Phase::Create`].
    pub fn for_create(for_create: bool) -> Self {
        if for_create {
            Phase::Create
        } else {
            Phase::Update
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::Create => "create",
            Phase::Update => "update",
        }
    }
}

impl From<bool> for Phase {
    fn from(for_create: bool) -> Self {
        Phase::for_create(for_create)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
