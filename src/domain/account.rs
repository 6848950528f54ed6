use serde::{Deserialize, Serialize};

use crate::domain::common::{Displayable, NamedEntity};

/// An entry in the school's chart of accounts.
///
/// Accounts are static reference data: loaded once with the ledger snapshot
/// and never mutated by the engine. The `id` is the human chart code
/// (for example `400-01`), not a generated identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub kind: AccountKind,
}

impl Account {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
        }
    }

    /// True for accounts that appear on the income statement.
    pub fn is_income(&self) -> bool {
        self.kind == AccountKind::Income
    }
}

impl NamedEntity for Account {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Account {
    fn display_label(&self) -> String {
        format!("{} {}", self.id, self.name)
    }
}

/// Enumerates the supported account classifications.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccountKind {
    Income,
    Expense,
    Liability,
}
