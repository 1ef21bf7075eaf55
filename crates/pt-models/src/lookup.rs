//! Seeded lookup tables
//!
//! Tables: document_types, budget_categories

use pt_core::traits::{Id, Identifiable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentType {
    pub id: Id,
    pub name: String,
}

impl DocumentType {
    /// Names seeded into an empty table
    pub const DEFAULTS: &'static [&'static str] =
        &["Brief", "Report", "Acceptance act", "Contract", "Revisions"];
}

impl Identifiable for DocumentType {
    fn id(&self) -> Id {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BudgetCategory {
    pub id: Id,
    pub name: String,
}

impl Identifiable for BudgetCategory {
    fn id(&self) -> Id {
        self.id
    }
}
