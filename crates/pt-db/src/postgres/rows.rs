//! Row types and their mapping into domain models
//!
//! Columns holding a role or status are read as text and parsed back;
//! an unknown code surfaces as [`RepositoryError::Decode`].

use chrono::{DateTime, NaiveDate, Utc};
use pt_models::{
    BudgetCategory, BudgetItem, Document, DocumentType, Lead, Notification, Project,
    ProjectMessage, ProjectStage, Task, TaskHistory, User,
};
use rust_decimal::Decimal;
use sqlx::FromRow;

use crate::error::{RepositoryError, RepositoryResult};

pub(super) const USER_COLUMNS: &str = "id, username, password_hash, full_name, email, phone, \
     position, avatar_url, role, created_at";

pub(super) const PROJECT_COLUMNS: &str = "p.id, p.title, p.description, p.status, p.start_date, \
     p.end_date, p.planned_budget, p.actual_cost, p.customer_id, p.pm_id, p.created_at";

pub(super) const TASK_COLUMNS: &str = "t.id, t.project_id, t.stage_id, t.title, t.description, \
     t.status, t.deadline, t.cost, t.assignee_id, t.created_at";

pub(super) const LEAD_COLUMNS: &str = "l.id, l.title, l.description, l.budget, l.desired_deadline, \
     l.status, l.customer_id, l.attachment_key, l.project_id, l.created_at";

pub(super) const NOTIFICATION_COLUMNS: &str = "id, user_id, message, link, is_read, created_at";

#[derive(Debug, FromRow)]
pub(super) struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub avatar_url: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> RepositoryResult<Self> {
        Ok(User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            full_name: row.full_name,
            email: row.email,
            phone: row.phone,
            position: row.position,
            avatar_url: row.avatar_url,
            role: row.role.parse()?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct ProjectRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub planned_budget: Decimal,
    pub actual_cost: Decimal,
    pub customer_id: i64,
    pub pm_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = RepositoryError;

    fn try_from(row: ProjectRow) -> RepositoryResult<Self> {
        Ok(Project {
            id: row.id,
            title: row.title,
            description: row.description,
            status: row.status.parse()?,
            start_date: row.start_date,
            end_date: row.end_date,
            planned_budget: row.planned_budget,
            actual_cost: row.actual_cost,
            customer_id: row.customer_id,
            pm_id: row.pm_id,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct TaskRow {
    pub id: i64,
    pub project_id: i64,
    pub stage_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub status: String,
    pub deadline: Option<NaiveDate>,
    pub cost: Decimal,
    pub assignee_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = RepositoryError;

    fn try_from(row: TaskRow) -> RepositoryResult<Self> {
        Ok(Task {
            id: row.id,
            project_id: row.project_id,
            stage_id: row.stage_id,
            title: row.title,
            description: row.description,
            status: row.status.parse()?,
            deadline: row.deadline,
            cost: row.cost,
            assignee_id: row.assignee_id,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct TaskHistoryRow {
    pub id: i64,
    pub task_id: i64,
    pub old_status: Option<String>,
    pub new_status: String,
    pub changed_by: i64,
    pub changed_at: DateTime<Utc>,
}

impl TryFrom<TaskHistoryRow> for TaskHistory {
    type Error = RepositoryError;

    fn try_from(row: TaskHistoryRow) -> RepositoryResult<Self> {
        Ok(TaskHistory {
            id: row.id,
            task_id: row.task_id,
            old_status: row.old_status.map(|s| s.parse()).transpose()?,
            new_status: row.new_status.parse()?,
            changed_by: row.changed_by,
            changed_at: row.changed_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct LeadRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub budget: Decimal,
    pub desired_deadline: Option<NaiveDate>,
    pub status: String,
    pub customer_id: i64,
    pub attachment_key: Option<String>,
    pub project_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<LeadRow> for Lead {
    type Error = RepositoryError;

    fn try_from(row: LeadRow) -> RepositoryResult<Self> {
        Ok(Lead {
            id: row.id,
            title: row.title,
            description: row.description,
            budget: row.budget,
            desired_deadline: row.desired_deadline,
            status: row.status.parse()?,
            customer_id: row.customer_id,
            attachment_key: row.attachment_key,
            project_id: row.project_id,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct StageRow {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl From<StageRow> for ProjectStage {
    fn from(row: StageRow) -> Self {
        ProjectStage {
            id: row.id,
            project_id: row.project_id,
            name: row.name,
            start_date: row.start_date,
            end_date: row.end_date,
        }
    }
}

#[derive(Debug, FromRow)]
pub(super) struct BudgetItemRow {
    pub id: i64,
    pub project_id: i64,
    pub category_id: i64,
    pub planned_amount: Decimal,
    pub actual_amount: Decimal,
}

impl From<BudgetItemRow> for BudgetItem {
    fn from(row: BudgetItemRow) -> Self {
        BudgetItem {
            id: row.id,
            project_id: row.project_id,
            category_id: row.category_id,
            planned_amount: row.planned_amount,
            actual_amount: row.actual_amount,
        }
    }
}

#[derive(Debug, FromRow)]
pub(super) struct MessageRow {
    pub id: i64,
    pub project_id: i64,
    pub sender_id: i64,
    pub content: String,
    pub is_revision: bool,
    pub created_at: DateTime<Utc>,
}

impl From<MessageRow> for ProjectMessage {
    fn from(row: MessageRow) -> Self {
        ProjectMessage {
            id: row.id,
            project_id: row.project_id,
            sender_id: row.sender_id,
            content: row.content,
            is_revision: row.is_revision,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(super) struct DocumentRow {
    pub id: i64,
    pub project_id: i64,
    pub title: String,
    pub document_type_id: i64,
    pub file_key: Option<String>,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            id: row.id,
            project_id: row.project_id,
            title: row.title,
            document_type_id: row.document_type_id,
            file_key: row.file_key,
            author_id: row.author_id,
            created_at: row.created_at,
        }
    }
}

/// Shared shape of the `document_types` and `budget_categories` tables
#[derive(Debug, FromRow)]
pub(super) struct LookupRow {
    pub id: i64,
    pub name: String,
}

impl From<LookupRow> for DocumentType {
    fn from(row: LookupRow) -> Self {
        DocumentType {
            id: row.id,
            name: row.name,
        }
    }
}

impl From<LookupRow> for BudgetCategory {
    fn from(row: LookupRow) -> Self {
        BudgetCategory {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(Debug, FromRow)]
pub(super) struct NotificationRow {
    pub id: i64,
    pub user_id: i64,
    pub message: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Notification {
            id: row.id,
            user_id: row.user_id,
            message: row.message,
            link: row.link,
            is_read: row.is_read,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(super) struct WorkloadRow {
    pub id: i64,
    pub full_name: String,
    pub role: String,
    pub active_tasks: i64,
    pub total_tasks: i64,
}

/// Convert a batch of rows, failing on the first one that does not decode
pub(super) fn decode_all<R, T>(rows: Vec<R>) -> RepositoryResult<Vec<T>>
where
    T: TryFrom<R, Error = RepositoryError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// Postgres counts are signed
pub(super) fn count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
