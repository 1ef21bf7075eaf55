//! In-memory store
//!
//! All tables live behind one `tokio::sync::RwLock`. A transaction takes the
//! write half for its whole lifetime and works on a staged copy of the
//! tables; `commit` swaps the copy in, dropping the transaction discards it.
//! This serializes writers, which gives the same guarantees row locks give
//! the Postgres backend.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use pt_auth::Scope;
use pt_core::result::TrackerResult;
use pt_core::traits::Id;
use pt_core::types::{LeadStatus, Role, TaskStatus};
use pt_models::{
    BudgetCategory, BudgetItem, Document, DocumentType, Lead, NewBudgetItem, NewDocument,
    NewLead, NewNotification, NewProject, NewProjectMessage, NewProjectStage, NewTask,
    NewTaskHistory, NewUser, Notification, ProfileUpdate, Project, ProjectMessage, ProjectStage,
    Task, TaskHistory, User,
};
use pt_notifications::NotificationStore;
use rust_decimal::Decimal;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use crate::error::{RepositoryError, RepositoryResult};
use crate::store::{Store, StoreTransaction, WorkloadEntry};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: Vec<User>,
    projects: Vec<Project>,
    stages: Vec<ProjectStage>,
    budget_categories: Vec<BudgetCategory>,
    budget_items: Vec<BudgetItem>,
    tasks: Vec<Task>,
    task_history: Vec<TaskHistory>,
    leads: Vec<Lead>,
    messages: Vec<ProjectMessage>,
    documents: Vec<Document>,
    document_types: Vec<DocumentType>,
    notifications: Vec<Notification>,
}

/// Next id for an append-only table whose ids only grow
fn next_id<T>(rows: &[T], id: impl Fn(&T) -> Id) -> Id {
    rows.last().map(|r| id(r) + 1).unwrap_or(1)
}

impl Tables {
    fn project_visible(&self, scope: Scope, project: &Project) -> bool {
        match scope {
            Scope::All => true,
            Scope::OwnedByCustomer(customer) => project.customer_id == customer,
            Scope::AssignedTo(user) => self
                .tasks
                .iter()
                .any(|t| t.project_id == project.id && t.assignee_id == Some(user)),
            Scope::Nothing => false,
        }
    }

    fn task_visible(&self, scope: Scope, task: &Task) -> bool {
        match scope {
            Scope::All => true,
            Scope::OwnedByCustomer(customer) => self
                .projects
                .iter()
                .any(|p| p.id == task.project_id && p.customer_id == customer),
            Scope::AssignedTo(user) => task.assignee_id == Some(user),
            Scope::Nothing => false,
        }
    }

    fn lead_visible(scope: Scope, lead: &Lead) -> bool {
        match scope {
            Scope::All => true,
            Scope::OwnedByCustomer(customer) => lead.customer_id == customer,
            Scope::AssignedTo(_) | Scope::Nothing => false,
        }
    }

    fn users_with_roles(&self, roles: &[Role]) -> Vec<User> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .filter(|u| roles.contains(&u.role))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));
        users
    }

    fn push_notification(&mut self, new: NewNotification) -> Notification {
        let notification = Notification {
            id: next_id(&self.notifications, |n| n.id),
            user_id: new.user_id,
            message: new.message,
            link: new.link,
            is_read: false,
            created_at: Utc::now(),
        };
        self.notifications.push(notification.clone());
        notification
    }

    fn mark_read_where(&mut self, pred: impl Fn(&Notification) -> bool) -> u64 {
        let mut count = 0;
        for n in self.notifications.iter_mut().filter(|n| n.is_unread() && pred(n)) {
            n.mark_read();
            count += 1;
        }
        count
    }
}

/// In-memory entity store
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn append(&self, notification: NewNotification) -> TrackerResult<Notification> {
        Ok(self.tables.write().await.push_notification(notification))
    }

    async fn unread_count(&self, user_id: Id) -> TrackerResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && n.is_unread())
            .count() as u64)
    }

    async fn list_recent(&self, user_id: Id, limit: usize) -> TrackerResult<Vec<Notification>> {
        let tables = self.tables.read().await;
        Ok(tables
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn mark_all_read(&self, user_id: Id) -> TrackerResult<u64> {
        let mut tables = self.tables.write().await;
        Ok(tables.mark_read_where(|n| n.user_id == user_id))
    }

    async fn mark_read_for_link(&self, user_id: Id, link: &str) -> TrackerResult<u64> {
        let mut tables = self.tables.write().await;
        Ok(tables.mark_read_where(|n| n.user_id == user_id && n.link.as_deref() == Some(link)))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user(&self, id: Id) -> RepositoryResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn list_users(&self, roles: &[Role]) -> RepositoryResult<Vec<User>> {
        Ok(self.tables.read().await.users_with_roles(roles))
    }

    async fn count_users(&self) -> RepositoryResult<u64> {
        Ok(self.tables.read().await.users.len() as u64)
    }

    async fn insert_user(&self, new: NewUser) -> RepositoryResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == new.username) {
            return Err(RepositoryError::Conflict(format!(
                "username {} is already taken",
                new.username
            )));
        }
        let user = User {
            id: next_id(&tables.users, |u| u.id),
            username: new.username,
            password_hash: new.password_hash,
            full_name: new.full_name,
            email: new.email,
            phone: new.phone,
            position: new.position,
            avatar_url: None,
            role: new.role,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn list_projects(&self, scope: Scope) -> RepositoryResult<Vec<Project>> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .iter()
            .filter(|p| tables.project_visible(scope, p))
            .cloned()
            .collect())
    }

    async fn find_project(&self, scope: Scope, id: Id) -> RepositoryResult<Option<Project>> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .iter()
            .find(|p| p.id == id && tables.project_visible(scope, p))
            .cloned())
    }

    async fn list_tasks(&self, scope: Scope) -> RepositoryResult<Vec<Task>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .filter(|t| tables.task_visible(scope, t))
            .cloned()
            .collect())
    }

    async fn find_task(&self, scope: Scope, id: Id) -> RepositoryResult<Option<Task>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .find(|t| t.id == id && tables.task_visible(scope, t))
            .cloned())
    }

    async fn list_leads(&self, scope: Scope) -> RepositoryResult<Vec<Lead>> {
        let tables = self.tables.read().await;
        Ok(tables
            .leads
            .iter()
            .filter(|l| Tables::lead_visible(scope, l))
            .cloned()
            .collect())
    }

    async fn find_lead(&self, scope: Scope, id: Id) -> RepositoryResult<Option<Lead>> {
        let tables = self.tables.read().await;
        Ok(tables
            .leads
            .iter()
            .find(|l| l.id == id && Tables::lead_visible(scope, l))
            .cloned())
    }

    async fn list_project_tasks(&self, project_id: Id) -> RepositoryResult<Vec<Task>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn list_messages(&self, project_id: Id) -> RepositoryResult<Vec<ProjectMessage>> {
        let tables = self.tables.read().await;
        Ok(tables
            .messages
            .iter()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn list_documents(&self, project_id: Id) -> RepositoryResult<Vec<Document>> {
        let tables = self.tables.read().await;
        Ok(tables
            .documents
            .iter()
            .filter(|d| d.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn find_document(&self, id: Id) -> RepositoryResult<Option<Document>> {
        let tables = self.tables.read().await;
        Ok(tables.documents.iter().find(|d| d.id == id).cloned())
    }

    async fn list_stages(&self, project_id: Id) -> RepositoryResult<Vec<ProjectStage>> {
        let tables = self.tables.read().await;
        Ok(tables
            .stages
            .iter()
            .filter(|s| s.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn list_budget_items(&self, project_id: Id) -> RepositoryResult<Vec<BudgetItem>> {
        let tables = self.tables.read().await;
        Ok(tables
            .budget_items
            .iter()
            .filter(|b| b.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn task_history(&self, task_id: Id) -> RepositoryResult<Vec<TaskHistory>> {
        let tables = self.tables.read().await;
        Ok(tables
            .task_history
            .iter()
            .filter(|h| h.task_id == task_id)
            .cloned()
            .collect())
    }

    async fn list_document_types(&self) -> RepositoryResult<Vec<DocumentType>> {
        Ok(self.tables.read().await.document_types.clone())
    }

    async fn insert_document_type(&self, name: &str) -> RepositoryResult<DocumentType> {
        let mut tables = self.tables.write().await;
        let doc_type = DocumentType {
            id: next_id(&tables.document_types, |d| d.id),
            name: name.to_string(),
        };
        tables.document_types.push(doc_type.clone());
        Ok(doc_type)
    }

    async fn list_budget_categories(&self) -> RepositoryResult<Vec<BudgetCategory>> {
        Ok(self.tables.read().await.budget_categories.clone())
    }

    async fn insert_budget_category(&self, name: &str) -> RepositoryResult<BudgetCategory> {
        let mut tables = self.tables.write().await;
        let category = BudgetCategory {
            id: next_id(&tables.budget_categories, |c| c.id),
            name: name.to_string(),
        };
        tables.budget_categories.push(category.clone());
        Ok(category)
    }

    async fn workload(&self) -> RepositoryResult<Vec<WorkloadEntry>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users_with_roles(&[Role::Employee])
            .into_iter()
            .map(|employee| {
                let assigned = tables
                    .tasks
                    .iter()
                    .filter(|t| t.assignee_id == Some(employee.id));
                let (active, total) = assigned.fold((0, 0), |(active, total), t| {
                    (active + u64::from(t.status.is_active()), total + 1)
                });
                WorkloadEntry {
                    employee: employee.summary(),
                    active_tasks: active,
                    total_tasks: total,
                }
            })
            .collect())
    }

    async fn begin(&self) -> RepositoryResult<Box<dyn StoreTransaction>> {
        let guard = self.tables.clone().write_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryTransaction { guard, staged }))
    }
}

/// Write transaction over a staged copy of the tables
pub struct MemoryTransaction {
    guard: OwnedRwLockWriteGuard<Tables>,
    staged: Tables,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn lock_task(&mut self, id: Id) -> RepositoryResult<Option<Task>> {
        Ok(self.staged.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn lock_lead(&mut self, id: Id) -> RepositoryResult<Option<Lead>> {
        Ok(self.staged.leads.iter().find(|l| l.id == id).cloned())
    }

    async fn find_project(&mut self, id: Id) -> RepositoryResult<Option<Project>> {
        Ok(self.staged.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn find_user(&mut self, id: Id) -> RepositoryResult<Option<User>> {
        Ok(self.staged.users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_users(&mut self, roles: &[Role]) -> RepositoryResult<Vec<User>> {
        Ok(self.staged.users_with_roles(roles))
    }

    async fn insert_project(&mut self, new: NewProject) -> RepositoryResult<Project> {
        let project = Project {
            id: next_id(&self.staged.projects, |p| p.id),
            title: new.title,
            description: new.description,
            status: new.status,
            start_date: new.start_date,
            end_date: new.end_date,
            planned_budget: new.planned_budget,
            actual_cost: Decimal::ZERO,
            customer_id: new.customer_id,
            pm_id: new.pm_id,
            created_at: Utc::now(),
        };
        self.staged.projects.push(project.clone());
        Ok(project)
    }

    async fn insert_task(&mut self, new: NewTask) -> RepositoryResult<Task> {
        if !self.staged.projects.iter().any(|p| p.id == new.project_id) {
            return Err(RepositoryError::not_found("Project", new.project_id));
        }
        let task = Task {
            id: next_id(&self.staged.tasks, |t| t.id),
            project_id: new.project_id,
            stage_id: new.stage_id,
            title: new.title,
            description: new.description,
            status: new.status,
            deadline: new.deadline,
            cost: new.cost,
            assignee_id: new.assignee_id,
            created_at: Utc::now(),
        };
        self.staged.tasks.push(task.clone());
        Ok(task)
    }

    async fn insert_stage(&mut self, new: NewProjectStage) -> RepositoryResult<ProjectStage> {
        let stage = ProjectStage {
            id: next_id(&self.staged.stages, |s| s.id),
            project_id: new.project_id,
            name: new.name,
            start_date: new.start_date,
            end_date: new.end_date,
        };
        self.staged.stages.push(stage.clone());
        Ok(stage)
    }

    async fn insert_budget_item(&mut self, new: NewBudgetItem) -> RepositoryResult<BudgetItem> {
        if !self.staged.budget_categories.iter().any(|c| c.id == new.category_id) {
            return Err(RepositoryError::not_found("BudgetCategory", new.category_id));
        }
        let item = BudgetItem {
            id: next_id(&self.staged.budget_items, |b| b.id),
            project_id: new.project_id,
            category_id: new.category_id,
            planned_amount: new.planned_amount,
            actual_amount: new.actual_amount,
        };
        self.staged.budget_items.push(item.clone());
        Ok(item)
    }

    async fn set_task_status(&mut self, id: Id, status: TaskStatus) -> RepositoryResult<()> {
        let task = self
            .staged
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| RepositoryError::not_found("Task", id))?;
        task.status = status;
        Ok(())
    }

    async fn append_task_history(&mut self, entry: NewTaskHistory) -> RepositoryResult<TaskHistory> {
        let row = TaskHistory {
            id: next_id(&self.staged.task_history, |h| h.id),
            task_id: entry.task_id,
            old_status: entry.old_status,
            new_status: entry.new_status,
            changed_by: entry.changed_by,
            changed_at: Utc::now(),
        };
        self.staged.task_history.push(row.clone());
        Ok(row)
    }

    async fn insert_lead(&mut self, new: NewLead) -> RepositoryResult<Lead> {
        let lead = Lead {
            id: next_id(&self.staged.leads, |l| l.id),
            title: new.title,
            description: new.description,
            budget: new.budget,
            desired_deadline: new.desired_deadline,
            status: LeadStatus::New,
            customer_id: new.customer_id,
            attachment_key: new.attachment_key,
            project_id: None,
            created_at: Utc::now(),
        };
        self.staged.leads.push(lead.clone());
        Ok(lead)
    }

    async fn set_lead_status(
        &mut self,
        id: Id,
        status: LeadStatus,
        project_id: Option<Id>,
    ) -> RepositoryResult<()> {
        let lead = self
            .staged
            .leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| RepositoryError::not_found("Lead", id))?;
        lead.status = status;
        if project_id.is_some() {
            lead.project_id = project_id;
        }
        Ok(())
    }

    async fn insert_message(&mut self, new: NewProjectMessage) -> RepositoryResult<ProjectMessage> {
        let message = ProjectMessage {
            id: next_id(&self.staged.messages, |m| m.id),
            project_id: new.project_id,
            sender_id: new.sender_id,
            content: new.content,
            is_revision: new.is_revision,
            created_at: Utc::now(),
        };
        self.staged.messages.push(message.clone());
        Ok(message)
    }

    async fn insert_document(&mut self, new: NewDocument) -> RepositoryResult<Document> {
        if !self
            .staged
            .document_types
            .iter()
            .any(|d| d.id == new.document_type_id)
        {
            return Err(RepositoryError::not_found("DocumentType", new.document_type_id));
        }
        let document = Document {
            id: next_id(&self.staged.documents, |d| d.id),
            project_id: new.project_id,
            title: new.title,
            document_type_id: new.document_type_id,
            file_key: new.file_key,
            author_id: new.author_id,
            created_at: Utc::now(),
        };
        self.staged.documents.push(document.clone());
        Ok(document)
    }

    async fn update_user_profile(&mut self, id: Id, update: &ProfileUpdate) -> RepositoryResult<User> {
        let user = self
            .staged
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| RepositoryError::not_found("User", id))?;
        user.full_name = update.full_name.clone();
        user.email = update.email.clone();
        user.phone = update.phone.clone();
        user.position = update.position.clone();
        Ok(user.clone())
    }

    async fn insert_notification(&mut self, notification: NewNotification) -> RepositoryResult<Notification> {
        Ok(self.staged.push_notification(notification))
    }

    async fn commit(self: Box<Self>) -> RepositoryResult<()> {
        let MemoryTransaction { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pt_core::types::ProjectStatus;

    async fn user(store: &MemoryStore, username: &str, role: Role) -> User {
        store
            .insert_user(NewUser {
                username: username.into(),
                password_hash: String::new(),
                full_name: username.to_uppercase(),
                email: None,
                phone: None,
                position: None,
                role,
            })
            .await
            .unwrap()
    }

    fn new_project(customer_id: Id) -> NewProject {
        NewProject {
            title: "Website".into(),
            description: "Landing page".into(),
            status: ProjectStatus::New,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            end_date: None,
            planned_budget: Decimal::new(5000, 0),
            customer_id,
            pm_id: None,
        }
    }

    fn new_task(project_id: Id, assignee: Id) -> NewTask {
        NewTask {
            project_id,
            stage_id: None,
            title: "Layout".into(),
            description: String::new(),
            status: TaskStatus::ToDo,
            deadline: None,
            cost: Decimal::ZERO,
            assignee_id: Some(assignee),
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryStore::new();
        user(&store, "pm", Role::Pm).await;
        let err = store
            .insert_user(NewUser {
                username: "pm".into(),
                password_hash: String::new(),
                full_name: "Other".into(),
                email: None,
                phone: None,
                position: None,
                role: Role::Pm,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_uncommitted_transaction_rolls_back() {
        let store = MemoryStore::new();
        let cust = user(&store, "cust", Role::Customer).await;

        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_project(new_project(cust.id)).await.unwrap();
            tx.insert_notification(NewNotification::new(cust.id, "created"))
                .await
                .unwrap();
        }

        assert!(store.list_projects(Scope::All).await.unwrap().is_empty());
        assert_eq!(store.unread_count(cust.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_commit_publishes_writes() {
        let store = MemoryStore::new();
        let cust = user(&store, "cust", Role::Customer).await;

        let mut tx = store.begin().await.unwrap();
        let project = tx.insert_project(new_project(cust.id)).await.unwrap();
        tx.commit().await.unwrap();

        let found = store.find_project(Scope::All, project.id).await.unwrap();
        assert_eq!(found.map(|p| p.title), Some("Website".to_string()));
    }

    #[tokio::test]
    async fn test_scopes_filter_rows() {
        let store = MemoryStore::new();
        let c1 = user(&store, "c1", Role::Customer).await;
        let c2 = user(&store, "c2", Role::Customer).await;
        let emp = user(&store, "emp", Role::Employee).await;

        let mut tx = store.begin().await.unwrap();
        let p1 = tx.insert_project(new_project(c1.id)).await.unwrap();
        let p2 = tx.insert_project(new_project(c2.id)).await.unwrap();
        let t1 = tx.insert_task(new_task(p1.id, emp.id)).await.unwrap();
        tx.insert_task(new_task(p1.id, emp.id)).await.unwrap();
        tx.commit().await.unwrap();

        let ids = |ps: Vec<Project>| ps.into_iter().map(|p| p.id).collect::<Vec<_>>();

        assert_eq!(ids(store.list_projects(Scope::OwnedByCustomer(c1.id)).await.unwrap()), vec![p1.id]);
        assert_eq!(ids(store.list_projects(Scope::OwnedByCustomer(c2.id)).await.unwrap()), vec![p2.id]);
        assert_eq!(ids(store.list_projects(Scope::AssignedTo(emp.id)).await.unwrap()), vec![p1.id]);
        assert!(store.list_projects(Scope::Nothing).await.unwrap().is_empty());

        assert_eq!(store.list_tasks(Scope::OwnedByCustomer(c1.id)).await.unwrap().len(), 2);
        assert!(store.list_tasks(Scope::OwnedByCustomer(c2.id)).await.unwrap().is_empty());
        assert!(store
            .find_task(Scope::OwnedByCustomer(c2.id), t1.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_workload_counts() {
        let store = MemoryStore::new();
        let cust = user(&store, "cust", Role::Customer).await;
        let emp = user(&store, "emp", Role::Employee).await;
        let idle = user(&store, "idle", Role::Employee).await;

        let mut tx = store.begin().await.unwrap();
        let p = tx.insert_project(new_project(cust.id)).await.unwrap();
        let t1 = tx.insert_task(new_task(p.id, emp.id)).await.unwrap();
        tx.insert_task(new_task(p.id, emp.id)).await.unwrap();
        tx.set_task_status(t1.id, TaskStatus::Done).await.unwrap();
        tx.commit().await.unwrap();

        let workload = store.workload().await.unwrap();
        assert_eq!(workload.len(), 2);
        let busy = workload.iter().find(|w| w.employee.id == emp.id).unwrap();
        assert_eq!((busy.active_tasks, busy.total_tasks), (1, 2));
        let free = workload.iter().find(|w| w.employee.id == idle.id).unwrap();
        assert_eq!((free.active_tasks, free.total_tasks), (0, 0));
    }
}
