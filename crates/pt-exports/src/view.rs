//! Read-only view of a project, fully resolved for rendering

use chrono::{DateTime, NaiveDate, Utc};
use pt_models::Project;
use rust_decimal::Decimal;
use serde::Serialize;

/// Placeholder for a missing name or date
pub const DASH: &str = "—";

/// One task line of an export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskLine {
    pub title: String,
    pub assignee_name: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub status_name: String,
    pub cost: Decimal,
}

/// One budget item with its category name resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetLine {
    pub category: String,
    pub planned_amount: Decimal,
    pub actual_amount: Decimal,
}

/// Everything an export needs, loaded up front.
///
/// Renderers never touch the store.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectExportView {
    pub project: Project,
    pub status_name: String,
    pub pm_name: Option<String>,
    pub customer_name: Option<String>,
    pub tasks: Vec<TaskLine>,
    pub budget_items: Vec<BudgetLine>,
    pub generated_at: DateTime<Utc>,
}

impl ProjectExportView {
    pub fn total_cost(&self) -> Decimal {
        self.tasks.iter().map(|t| t.cost).sum()
    }

    pub fn pm_display(&self) -> &str {
        self.pm_name.as_deref().unwrap_or(DASH)
    }

    pub fn customer_display(&self) -> &str {
        self.customer_name.as_deref().unwrap_or(DASH)
    }
}

impl TaskLine {
    pub fn assignee_display(&self) -> &str {
        self.assignee_name.as_deref().unwrap_or(DASH)
    }

    pub fn deadline_display(&self) -> String {
        self.deadline
            .map(|d| d.to_string())
            .unwrap_or_else(|| DASH.to_string())
    }
}

/// Whole units with thousands separators, e.g. `1,250,000`
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp(0);
    let digits = rounded.abs().trunc().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded.is_sign_negative() && !rounded.is_zero() {
        grouped.insert(0, '-');
    }
    grouped
}

/// Two decimal places, no grouping
pub fn format_money(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}
