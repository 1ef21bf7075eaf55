//! PostgreSQL store
//!
//! Scopes become SQL predicates so out-of-scope rows never leave the
//! database. Transactions lock guarded rows with `SELECT ... FOR UPDATE`.

mod rows;

use async_trait::async_trait;
use pt_auth::Scope;
use pt_core::result::TrackerResult;
use pt_core::traits::Id;
use pt_core::types::{LeadStatus, Role, TaskStatus};
use pt_models::{
    BudgetCategory, BudgetItem, Document, DocumentType, Lead, NewBudgetItem, NewDocument,
    NewLead, NewNotification, NewProject, NewProjectMessage, NewProjectStage, NewTask,
    NewTaskHistory, NewUser, Notification, ProfileUpdate, Project, ProjectMessage, ProjectStage,
    Task, TaskHistory, User, UserSummary,
};
use pt_notifications::NotificationStore;
use sqlx::{PgConnection, Postgres, Transaction};

use crate::error::{RepositoryError, RepositoryResult};
use crate::pool::Database;
use crate::store::{Store, StoreTransaction, WorkloadEntry};
use rows::*;

/// SQL predicate for a scope plus the value bound to its placeholder.
///
/// `param` is the placeholder index the predicate may use.
fn project_filter(scope: Scope, param: usize) -> (String, Option<Id>) {
    match scope {
        Scope::All => ("TRUE".to_string(), None),
        Scope::OwnedByCustomer(customer) => (format!("p.customer_id = ${}", param), Some(customer)),
        Scope::AssignedTo(user) => (
            format!(
                "EXISTS (SELECT 1 FROM tasks a WHERE a.project_id = p.id AND a.assignee_id = ${})",
                param
            ),
            Some(user),
        ),
        Scope::Nothing => ("FALSE".to_string(), None),
    }
}

fn task_filter(scope: Scope, param: usize) -> (String, Option<Id>) {
    match scope {
        Scope::All => ("TRUE".to_string(), None),
        Scope::OwnedByCustomer(customer) => (
            format!(
                "EXISTS (SELECT 1 FROM projects o WHERE o.id = t.project_id AND o.customer_id = ${})",
                param
            ),
            Some(customer),
        ),
        Scope::AssignedTo(user) => (format!("t.assignee_id = ${}", param), Some(user)),
        Scope::Nothing => ("FALSE".to_string(), None),
    }
}

fn lead_filter(scope: Scope, param: usize) -> (String, Option<Id>) {
    match scope {
        Scope::All => ("TRUE".to_string(), None),
        Scope::OwnedByCustomer(customer) => (format!("l.customer_id = ${}", param), Some(customer)),
        Scope::AssignedTo(_) | Scope::Nothing => ("FALSE".to_string(), None),
    }
}

fn role_codes(roles: &[Role]) -> Vec<String> {
    roles.iter().map(|r| r.as_str().to_string()).collect()
}

fn unique_violation(err: sqlx::Error, what: impl FnOnce() -> String) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::Conflict(what()),
        _ => RepositoryError::Database(err),
    }
}

/// PostgreSQL-backed entity store
#[derive(Clone)]
pub struct PgStore {
    db: Database,
}

impl PgStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn lookup<T: From<LookupRow>>(&self, table: &str) -> RepositoryResult<Vec<T>> {
        let rows = sqlx::query_as::<_, LookupRow>(&format!(
            "SELECT id, name FROM {} ORDER BY id",
            table
        ))
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.into_iter().map(T::from).collect())
    }

    async fn insert_lookup<T: From<LookupRow>>(&self, table: &str, name: &str) -> RepositoryResult<T> {
        let row = sqlx::query_as::<_, LookupRow>(&format!(
            "INSERT INTO {} (name) VALUES ($1) RETURNING id, name",
            table
        ))
        .bind(name)
        .fetch_one(self.db.pool())
        .await
        .map_err(|e| unique_violation(e, || format!("{} {} already exists", table, name)))?;
        Ok(T::from(row))
    }
}

#[async_trait]
impl NotificationStore for PgStore {
    async fn append(&self, notification: NewNotification) -> TrackerResult<Notification> {
        let mut conn = self.db.pool().acquire().await.map_err(RepositoryError::from)?;
        Ok(insert_notification(&mut conn, notification).await?)
    }

    async fn unread_count(&self, user_id: Id) -> TrackerResult<u64> {
        let (n,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .fetch_one(self.db.pool())
        .await
        .map_err(RepositoryError::from)?;
        Ok(count(n))
    }

    async fn list_recent(&self, user_id: Id, limit: usize) -> TrackerResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            "SELECT {} FROM notifications WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2",
            NOTIFICATION_COLUMNS
        ))
        .bind(user_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(self.db.pool())
        .await
        .map_err(RepositoryError::from)?;
        Ok(rows.into_iter().map(Notification::from).collect())
    }

    async fn mark_all_read(&self, user_id: Id) -> TrackerResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .execute(self.db.pool())
        .await
        .map_err(RepositoryError::from)?;
        Ok(result.rows_affected())
    }

    async fn mark_read_for_link(&self, user_id: Id, link: &str) -> TrackerResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE \
             WHERE user_id = $1 AND link = $2 AND NOT is_read",
        )
        .bind(user_id)
        .bind(link)
        .execute(self.db.pool())
        .await
        .map_err(RepositoryError::from)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user(&self, id: Id) -> RepositoryResult<Option<User>> {
        let mut conn = self.db.pool().acquire().await?;
        find_user(&mut conn, id).await
    }

    async fn find_user_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(self.db.pool())
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn list_users(&self, roles: &[Role]) -> RepositoryResult<Vec<User>> {
        let mut conn = self.db.pool().acquire().await?;
        list_users(&mut conn, roles).await
    }

    async fn count_users(&self) -> RepositoryResult<u64> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.db.pool())
            .await?;
        Ok(count(n))
    }

    async fn insert_user(&self, user: NewUser) -> RepositoryResult<User> {
        let username = user.username.clone();
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (username, password_hash, full_name, email, phone, position, role) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user.username)
        .bind(user.password_hash)
        .bind(user.full_name)
        .bind(user.email)
        .bind(user.phone)
        .bind(user.position)
        .bind(user.role.as_str())
        .fetch_one(self.db.pool())
        .await
        .map_err(|e| unique_violation(e, || format!("username {} is already taken", username)))?;
        User::try_from(row)
    }

    async fn list_projects(&self, scope: Scope) -> RepositoryResult<Vec<Project>> {
        let (filter, bind) = project_filter(scope, 1);
        let sql = format!(
            "SELECT {} FROM projects p WHERE {} ORDER BY p.id",
            PROJECT_COLUMNS, filter
        );
        let mut query = sqlx::query_as::<_, ProjectRow>(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        decode_all(query.fetch_all(self.db.pool()).await?)
    }

    async fn find_project(&self, scope: Scope, id: Id) -> RepositoryResult<Option<Project>> {
        let (filter, bind) = project_filter(scope, 2);
        let sql = format!(
            "SELECT {} FROM projects p WHERE p.id = $1 AND {}",
            PROJECT_COLUMNS, filter
        );
        let mut query = sqlx::query_as::<_, ProjectRow>(&sql).bind(id);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        query
            .fetch_optional(self.db.pool())
            .await?
            .map(Project::try_from)
            .transpose()
    }

    async fn list_tasks(&self, scope: Scope) -> RepositoryResult<Vec<Task>> {
        let (filter, bind) = task_filter(scope, 1);
        let sql = format!(
            "SELECT {} FROM tasks t WHERE {} ORDER BY t.id",
            TASK_COLUMNS, filter
        );
        let mut query = sqlx::query_as::<_, TaskRow>(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        decode_all(query.fetch_all(self.db.pool()).await?)
    }

    async fn find_task(&self, scope: Scope, id: Id) -> RepositoryResult<Option<Task>> {
        let (filter, bind) = task_filter(scope, 2);
        let sql = format!(
            "SELECT {} FROM tasks t WHERE t.id = $1 AND {}",
            TASK_COLUMNS, filter
        );
        let mut query = sqlx::query_as::<_, TaskRow>(&sql).bind(id);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        query
            .fetch_optional(self.db.pool())
            .await?
            .map(Task::try_from)
            .transpose()
    }

    async fn list_leads(&self, scope: Scope) -> RepositoryResult<Vec<Lead>> {
        let (filter, bind) = lead_filter(scope, 1);
        let sql = format!(
            "SELECT {} FROM leads l WHERE {} ORDER BY l.id",
            LEAD_COLUMNS, filter
        );
        let mut query = sqlx::query_as::<_, LeadRow>(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        decode_all(query.fetch_all(self.db.pool()).await?)
    }

    async fn find_lead(&self, scope: Scope, id: Id) -> RepositoryResult<Option<Lead>> {
        let (filter, bind) = lead_filter(scope, 2);
        let sql = format!(
            "SELECT {} FROM leads l WHERE l.id = $1 AND {}",
            LEAD_COLUMNS, filter
        );
        let mut query = sqlx::query_as::<_, LeadRow>(&sql).bind(id);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        query
            .fetch_optional(self.db.pool())
            .await?
            .map(Lead::try_from)
            .transpose()
    }

    async fn list_project_tasks(&self, project_id: Id) -> RepositoryResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {} FROM tasks t WHERE t.project_id = $1 ORDER BY t.id",
            TASK_COLUMNS
        ))
        .bind(project_id)
        .fetch_all(self.db.pool())
        .await?;
        decode_all(rows)
    }

    async fn list_messages(&self, project_id: Id) -> RepositoryResult<Vec<ProjectMessage>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, project_id, sender_id, content, is_revision, created_at
            FROM project_messages
            WHERE project_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(project_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.into_iter().map(ProjectMessage::from).collect())
    }

    async fn list_documents(&self, project_id: Id) -> RepositoryResult<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, project_id, title, document_type_id, file_key, author_id, created_at
            FROM documents
            WHERE project_id = $1
            ORDER BY id
            "#,
        )
        .bind(project_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn find_document(&self, id: Id) -> RepositoryResult<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, project_id, title, document_type_id, file_key, author_id, created_at
            FROM documents
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(row.map(Document::from))
    }

    async fn list_stages(&self, project_id: Id) -> RepositoryResult<Vec<ProjectStage>> {
        let rows = sqlx::query_as::<_, StageRow>(
            r#"
            SELECT id, project_id, name, start_date, end_date
            FROM project_stages
            WHERE project_id = $1
            ORDER BY id
            "#,
        )
        .bind(project_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.into_iter().map(ProjectStage::from).collect())
    }

    async fn list_budget_items(&self, project_id: Id) -> RepositoryResult<Vec<BudgetItem>> {
        let rows = sqlx::query_as::<_, BudgetItemRow>(
            r#"
            SELECT id, project_id, category_id, planned_amount, actual_amount
            FROM project_budget_items
            WHERE project_id = $1
            ORDER BY id
            "#,
        )
        .bind(project_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.into_iter().map(BudgetItem::from).collect())
    }

    async fn task_history(&self, task_id: Id) -> RepositoryResult<Vec<TaskHistory>> {
        let rows = sqlx::query_as::<_, TaskHistoryRow>(
            r#"
            SELECT id, task_id, old_status, new_status, changed_by, changed_at
            FROM task_history
            WHERE task_id = $1
            ORDER BY changed_at, id
            "#,
        )
        .bind(task_id)
        .fetch_all(self.db.pool())
        .await?;
        decode_all(rows)
    }

    async fn list_document_types(&self) -> RepositoryResult<Vec<DocumentType>> {
        self.lookup("document_types").await
    }

    async fn insert_document_type(&self, name: &str) -> RepositoryResult<DocumentType> {
        self.insert_lookup("document_types", name).await
    }

    async fn list_budget_categories(&self) -> RepositoryResult<Vec<BudgetCategory>> {
        self.lookup("budget_categories").await
    }

    async fn insert_budget_category(&self, name: &str) -> RepositoryResult<BudgetCategory> {
        self.insert_lookup("budget_categories", name).await
    }

    async fn workload(&self) -> RepositoryResult<Vec<WorkloadEntry>> {
        let rows = sqlx::query_as::<_, WorkloadRow>(
            r#"
            SELECT u.id, u.full_name, u.role,
                   COUNT(t.id) FILTER (WHERE t.status IN ('to_do', 'in_progress')) AS active_tasks,
                   COUNT(t.id) AS total_tasks
            FROM users u
            LEFT JOIN tasks t ON t.assignee_id = u.id
            WHERE u.role = 'employee'
            GROUP BY u.id, u.full_name, u.role
            ORDER BY u.full_name, u.id
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(WorkloadEntry {
                    employee: UserSummary {
                        id: row.id,
                        full_name: row.full_name,
                        role: row.role.parse()?,
                    },
                    active_tasks: count(row.active_tasks),
                    total_tasks: count(row.total_tasks),
                })
            })
            .collect()
    }

    async fn begin(&self) -> RepositoryResult<Box<dyn StoreTransaction>> {
        let tx = self.db.pool().begin().await?;
        Ok(Box::new(PgTransaction { tx }))
    }
}

// Queries shared by the pool-level reads and the transaction

async fn find_user(conn: &mut PgConnection, id: Id) -> RepositoryResult<Option<User>> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {} FROM users WHERE id = $1",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    row.map(User::try_from).transpose()
}

async fn list_users(conn: &mut PgConnection, roles: &[Role]) -> RepositoryResult<Vec<User>> {
    let rows = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {} FROM users WHERE role = ANY($1) ORDER BY full_name, id",
        USER_COLUMNS
    ))
    .bind(role_codes(roles))
    .fetch_all(conn)
    .await?;
    decode_all(rows)
}

async fn insert_notification(
    conn: &mut PgConnection,
    notification: NewNotification,
) -> RepositoryResult<Notification> {
    let row = sqlx::query_as::<_, NotificationRow>(&format!(
        "INSERT INTO notifications (user_id, message, link) VALUES ($1, $2, $3) RETURNING {}",
        NOTIFICATION_COLUMNS
    ))
    .bind(notification.user_id)
    .bind(notification.message)
    .bind(notification.link)
    .fetch_one(conn)
    .await?;
    Ok(Notification::from(row))
}

/// Write transaction on one pooled connection
pub struct PgTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTransaction for PgTransaction {
    async fn lock_task(&mut self, id: Id) -> RepositoryResult<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {} FROM tasks t WHERE t.id = $1 FOR UPDATE",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        row.map(Task::try_from).transpose()
    }

    async fn lock_lead(&mut self, id: Id) -> RepositoryResult<Option<Lead>> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {} FROM leads l WHERE l.id = $1 FOR UPDATE",
            LEAD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        row.map(Lead::try_from).transpose()
    }

    async fn find_project(&mut self, id: Id) -> RepositoryResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {} FROM projects p WHERE p.id = $1",
            PROJECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        row.map(Project::try_from).transpose()
    }

    async fn find_user(&mut self, id: Id) -> RepositoryResult<Option<User>> {
        find_user(&mut self.tx, id).await
    }

    async fn list_users(&mut self, roles: &[Role]) -> RepositoryResult<Vec<User>> {
        list_users(&mut self.tx, roles).await
    }

    async fn insert_project(&mut self, project: NewProject) -> RepositoryResult<Project> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "INSERT INTO projects AS p \
             (title, description, status, start_date, end_date, planned_budget, customer_id, pm_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            PROJECT_COLUMNS
        ))
        .bind(project.title)
        .bind(project.description)
        .bind(project.status.as_str())
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.planned_budget)
        .bind(project.customer_id)
        .bind(project.pm_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Project::try_from(row)
    }

    async fn insert_task(&mut self, task: NewTask) -> RepositoryResult<Task> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "INSERT INTO tasks AS t \
             (project_id, stage_id, title, description, status, deadline, cost, assignee_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(task.project_id)
        .bind(task.stage_id)
        .bind(task.title)
        .bind(task.description)
        .bind(task.status.as_str())
        .bind(task.deadline)
        .bind(task.cost)
        .bind(task.assignee_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Task::try_from(row)
    }

    async fn insert_stage(&mut self, stage: NewProjectStage) -> RepositoryResult<ProjectStage> {
        let row = sqlx::query_as::<_, StageRow>(
            r#"
            INSERT INTO project_stages (project_id, name, start_date, end_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, project_id, name, start_date, end_date
            "#,
        )
        .bind(stage.project_id)
        .bind(stage.name)
        .bind(stage.start_date)
        .bind(stage.end_date)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(ProjectStage::from(row))
    }

    async fn insert_budget_item(&mut self, item: NewBudgetItem) -> RepositoryResult<BudgetItem> {
        let row = sqlx::query_as::<_, BudgetItemRow>(
            r#"
            INSERT INTO project_budget_items (project_id, category_id, planned_amount, actual_amount)
            VALUES ($1, $2, $3, $4)
            RETURNING id, project_id, category_id, planned_amount, actual_amount
            "#,
        )
        .bind(item.project_id)
        .bind(item.category_id)
        .bind(item.planned_amount)
        .bind(item.actual_amount)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(BudgetItem::from(row))
    }

    async fn set_task_status(&mut self, id: Id, status: TaskStatus) -> RepositoryResult<()> {
        let result = sqlx::query("UPDATE tasks SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&mut *self.tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Task", id));
        }
        Ok(())
    }

    async fn append_task_history(&mut self, entry: NewTaskHistory) -> RepositoryResult<TaskHistory> {
        let row = sqlx::query_as::<_, TaskHistoryRow>(
            r#"
            INSERT INTO task_history (task_id, old_status, new_status, changed_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, task_id, old_status, new_status, changed_by, changed_at
            "#,
        )
        .bind(entry.task_id)
        .bind(entry.old_status.map(|s| s.as_str()))
        .bind(entry.new_status.as_str())
        .bind(entry.changed_by)
        .fetch_one(&mut *self.tx)
        .await?;
        TaskHistory::try_from(row)
    }

    async fn insert_lead(&mut self, lead: NewLead) -> RepositoryResult<Lead> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            "INSERT INTO leads AS l \
             (title, description, budget, desired_deadline, status, customer_id, attachment_key) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            LEAD_COLUMNS
        ))
        .bind(lead.title)
        .bind(lead.description)
        .bind(lead.budget)
        .bind(lead.desired_deadline)
        .bind(LeadStatus::New.as_str())
        .bind(lead.customer_id)
        .bind(lead.attachment_key)
        .fetch_one(&mut *self.tx)
        .await?;
        Lead::try_from(row)
    }

    async fn set_lead_status(
        &mut self,
        id: Id,
        status: LeadStatus,
        project_id: Option<Id>,
    ) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE leads SET status = $2, project_id = COALESCE($3, project_id) WHERE id = $1",
        )
        .bind(id)
        .bind(status.as_str())
        .bind(project_id)
        .execute(&mut *self.tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Lead", id));
        }
        Ok(())
    }

    async fn insert_message(&mut self, message: NewProjectMessage) -> RepositoryResult<ProjectMessage> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO project_messages (project_id, sender_id, content, is_revision)
            VALUES ($1, $2, $3, $4)
            RETURNING id, project_id, sender_id, content, is_revision, created_at
            "#,
        )
        .bind(message.project_id)
        .bind(message.sender_id)
        .bind(message.content)
        .bind(message.is_revision)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(ProjectMessage::from(row))
    }

    async fn insert_document(&mut self, document: NewDocument) -> RepositoryResult<Document> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            INSERT INTO documents (project_id, title, document_type_id, file_key, author_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, project_id, title, document_type_id, file_key, author_id, created_at
            "#,
        )
        .bind(document.project_id)
        .bind(document.title)
        .bind(document.document_type_id)
        .bind(document.file_key)
        .bind(document.author_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(Document::from(row))
    }

    async fn update_user_profile(&mut self, id: Id, update: &ProfileUpdate) -> RepositoryResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET full_name = $2, email = $3, phone = $4, position = $5 \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(&update.full_name)
        .bind(&update.email)
        .bind(&update.phone)
        .bind(&update.position)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or_else(|| RepositoryError::not_found("User", id))?;
        User::try_from(row)
    }

    async fn insert_notification(&mut self, notification: NewNotification) -> RepositoryResult<Notification> {
        insert_notification(&mut self.tx, notification).await
    }

    async fn commit(self: Box<Self>) -> RepositoryResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_and_nothing_bind_no_value() {
        for filter in [project_filter, task_filter, lead_filter] {
            assert_eq!(filter(Scope::All, 1), ("TRUE".to_string(), None));
            assert_eq!(filter(Scope::Nothing, 1), ("FALSE".to_string(), None));
        }
    }

    #[test]
    fn test_filters_use_requested_placeholder() {
        let (sql, bind) = project_filter(Scope::OwnedByCustomer(4), 2);
        assert_eq!(sql, "p.customer_id = $2");
        assert_eq!(bind, Some(4));

        let (sql, bind) = task_filter(Scope::AssignedTo(9), 1);
        assert_eq!(sql, "t.assignee_id = $1");
        assert_eq!(bind, Some(9));

        let (sql, _) = project_filter(Scope::AssignedTo(9), 1);
        assert!(sql.contains("a.assignee_id = $1"));
    }

    #[test]
    fn test_employees_see_no_leads() {
        assert_eq!(lead_filter(Scope::AssignedTo(3), 1), ("FALSE".to_string(), None));
    }

    #[test]
    fn test_role_codes() {
        assert_eq!(role_codes(&[Role::Head, Role::Pm]), vec!["head", "pm"]);
    }
}
