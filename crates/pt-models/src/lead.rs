//! Lead model
//!
//! Table: leads

use chrono::{DateTime, NaiveDate, Utc};
use pt_core::traits::{Entity, Id, Identifiable, Timestamped};
use pt_core::types::LeadStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A customer-submitted request awaiting a manager decision
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Id,
    pub title: String,
    pub description: String,
    pub budget: Decimal,
    pub desired_deadline: Option<NaiveDate>,
    pub status: LeadStatus,
    pub customer_id: Id,
    /// Storage key of the attached brief, if any
    pub attachment_key: Option<String>,
    /// Project created when the lead was approved
    pub project_id: Option<Id>,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for Lead {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for Lead {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Lead {
    const TABLE_NAME: &'static str = "leads";
    const TYPE_NAME: &'static str = "Lead";
}

/// Insert struct for leads
#[derive(Debug, Clone, PartialEq)]
pub struct NewLead {
    pub title: String,
    pub description: String,
    pub budget: Decimal,
    pub desired_deadline: Option<NaiveDate>,
    pub customer_id: Id,
    pub attachment_key: Option<String>,
}

/// Caller input for lead submission
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadInput {
    #[validate(length(min = 1, max = 255, message = "can't be blank"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    #[validate(custom = "crate::non_negative")]
    pub budget: Decimal,

    pub desired_deadline: Option<NaiveDate>,
}
