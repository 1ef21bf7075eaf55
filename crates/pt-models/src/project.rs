//! Project model
//!
//! Tables: projects, project_stages, project_budget_items

use chrono::{DateTime, NaiveDate, Utc};
use pt_core::traits::{Entity, Id, Identifiable, ProjectScoped, Timestamped};
use pt_core::types::ProjectStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Project entity
///
/// Always has exactly one customer. The PM is optional at the storage level;
/// projects created through the engine always get one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Id,
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub planned_budget: Decimal,
    pub actual_cost: Decimal,
    pub customer_id: Id,
    pub pm_id: Option<Id>,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for Project {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for Project {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Project {
    const TABLE_NAME: &'static str = "projects";
    const TYPE_NAME: &'static str = "Project";
}

impl Project {
    /// Link used in notifications about this project
    pub fn link(&self) -> String {
        Self::link_for(self.id)
    }

    pub fn link_for(id: Id) -> String {
        format!("/projects/{}", id)
    }

    /// Filename-safe slug of the first 20 characters of the title
    pub fn file_slug(&self) -> String {
        self.title
            .chars()
            .take(20)
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect()
    }
}

/// Insert struct for projects
#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub planned_budget: Decimal,
    pub customer_id: Id,
    pub pm_id: Option<Id>,
}

/// Caller input for project creation
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectInput {
    #[validate(length(min = 1, max = 255, message = "can't be blank"))]
    pub title: String,

    #[validate(length(min = 1, message = "can't be blank"))]
    pub description: String,

    pub customer_id: Id,

    /// Defaults to the acting manager
    pub pm_id: Option<Id>,

    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,

    #[serde(default)]
    #[validate(custom = "crate::non_negative")]
    pub planned_budget: Decimal,
}

/// A named phase of a project
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStage {
    pub id: Id,
    pub project_id: Id,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProjectStage {
    #[serde(default)]
    pub project_id: Id,

    #[validate(length(min = 1, max = 255, message = "can't be blank"))]
    pub name: String,

    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ProjectScoped for ProjectStage {
    fn project_id(&self) -> Id {
        self.project_id
    }
}

/// Planned vs. actual amount for one budget category of a project
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItem {
    pub id: Id,
    pub project_id: Id,
    pub category_id: Id,
    pub planned_amount: Decimal,
    pub actual_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewBudgetItem {
    #[serde(default)]
    pub project_id: Id,

    pub category_id: Id,

    #[validate(custom = "crate::non_negative")]
    pub planned_amount: Decimal,

    #[serde(default)]
    #[validate(custom = "crate::non_negative")]
    pub actual_amount: Decimal,
}

impl BudgetItem {
    pub fn variance(&self) -> Decimal {
        self.planned_amount - self.actual_amount
    }
}

impl ProjectScoped for BudgetItem {
    fn project_id(&self) -> Id {
        self.project_id
    }
}
