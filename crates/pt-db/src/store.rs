//! Store traits
//!
//! Reads go straight through [`Store`] and take the caller's [`Scope`].
//! Writes happen inside a [`StoreTransaction`]: rows that guard a state
//! transition are locked first, every write of one operation lands in the
//! same transaction, and nothing is visible until `commit`.

use async_trait::async_trait;
use pt_auth::Scope;
use pt_core::traits::Id;
use pt_core::types::{LeadStatus, Role, TaskStatus};
use pt_models::{
    BudgetCategory, BudgetItem, Document, DocumentType, Lead, NewBudgetItem, NewDocument,
    NewLead, NewNotification, NewProject, NewProjectMessage, NewProjectStage, NewTask,
    NewTaskHistory, NewUser, Notification, ProfileUpdate, Project, ProjectMessage, ProjectStage,
    Task, TaskHistory, User, UserSummary,
};
use pt_notifications::NotificationStore;
use serde::Serialize;

use crate::error::RepositoryResult;

/// Task counts for one employee
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadEntry {
    pub employee: UserSummary,
    /// Tasks in ToDo or InProgress
    pub active_tasks: u64,
    pub total_tasks: u64,
}

/// Entity store
#[async_trait]
pub trait Store: NotificationStore + Send + Sync {
    // Users

    async fn find_user(&self, id: Id) -> RepositoryResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> RepositoryResult<Option<User>>;

    /// Users holding any of `roles`, ordered by full name
    async fn list_users(&self, roles: &[Role]) -> RepositoryResult<Vec<User>>;

    async fn count_users(&self) -> RepositoryResult<u64>;

    /// Fails with `Conflict` when the username is taken
    async fn insert_user(&self, user: NewUser) -> RepositoryResult<User>;

    // Projects, tasks, leads: scoped

    async fn list_projects(&self, scope: Scope) -> RepositoryResult<Vec<Project>>;

    async fn find_project(&self, scope: Scope, id: Id) -> RepositoryResult<Option<Project>>;

    async fn list_tasks(&self, scope: Scope) -> RepositoryResult<Vec<Task>>;

    async fn find_task(&self, scope: Scope, id: Id) -> RepositoryResult<Option<Task>>;

    async fn list_leads(&self, scope: Scope) -> RepositoryResult<Vec<Lead>>;

    async fn find_lead(&self, scope: Scope, id: Id) -> RepositoryResult<Option<Lead>>;

    // Project children. Callers resolve project visibility first.

    async fn list_project_tasks(&self, project_id: Id) -> RepositoryResult<Vec<Task>>;

    /// Chronological
    async fn list_messages(&self, project_id: Id) -> RepositoryResult<Vec<ProjectMessage>>;

    async fn list_documents(&self, project_id: Id) -> RepositoryResult<Vec<Document>>;

    async fn find_document(&self, id: Id) -> RepositoryResult<Option<Document>>;

    async fn list_stages(&self, project_id: Id) -> RepositoryResult<Vec<ProjectStage>>;

    async fn list_budget_items(&self, project_id: Id) -> RepositoryResult<Vec<BudgetItem>>;

    /// Oldest first
    async fn task_history(&self, task_id: Id) -> RepositoryResult<Vec<TaskHistory>>;

    // Lookups

    async fn list_document_types(&self) -> RepositoryResult<Vec<DocumentType>>;

    async fn insert_document_type(&self, name: &str) -> RepositoryResult<DocumentType>;

    async fn list_budget_categories(&self) -> RepositoryResult<Vec<BudgetCategory>>;

    async fn insert_budget_category(&self, name: &str) -> RepositoryResult<BudgetCategory>;

    // Reports

    /// One entry per employee, ordered by full name
    async fn workload(&self) -> RepositoryResult<Vec<WorkloadEntry>>;

    /// Start a write transaction
    async fn begin(&self) -> RepositoryResult<Box<dyn StoreTransaction>>;
}

/// A unit of writes. Dropping it without `commit` discards every write.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Load a task and hold it against concurrent transitions
    async fn lock_task(&mut self, id: Id) -> RepositoryResult<Option<Task>>;

    /// Load a lead and hold it against concurrent transitions
    async fn lock_lead(&mut self, id: Id) -> RepositoryResult<Option<Lead>>;

    async fn find_project(&mut self, id: Id) -> RepositoryResult<Option<Project>>;

    async fn find_user(&mut self, id: Id) -> RepositoryResult<Option<User>>;

    async fn list_users(&mut self, roles: &[Role]) -> RepositoryResult<Vec<User>>;

    async fn insert_project(&mut self, project: NewProject) -> RepositoryResult<Project>;

    async fn insert_task(&mut self, task: NewTask) -> RepositoryResult<Task>;

    async fn insert_stage(&mut self, stage: NewProjectStage) -> RepositoryResult<ProjectStage>;

    async fn insert_budget_item(&mut self, item: NewBudgetItem) -> RepositoryResult<BudgetItem>;

    async fn set_task_status(&mut self, id: Id, status: TaskStatus) -> RepositoryResult<()>;

    async fn append_task_history(&mut self, entry: NewTaskHistory) -> RepositoryResult<TaskHistory>;

    async fn insert_lead(&mut self, lead: NewLead) -> RepositoryResult<Lead>;

    async fn set_lead_status(
        &mut self,
        id: Id,
        status: LeadStatus,
        project_id: Option<Id>,
    ) -> RepositoryResult<()>;

    async fn insert_message(&mut self, message: NewProjectMessage) -> RepositoryResult<ProjectMessage>;

    async fn insert_document(&mut self, document: NewDocument) -> RepositoryResult<Document>;

    async fn update_user_profile(&mut self, id: Id, update: &ProfileUpdate) -> RepositoryResult<User>;

    async fn insert_notification(&mut self, notification: NewNotification) -> RepositoryResult<Notification>;

    async fn commit(self: Box<Self>) -> RepositoryResult<()>;
}
