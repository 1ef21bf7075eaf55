//! Shared fixtures for service tests

use std::sync::Arc;

use chrono::NaiveDate;
use pt_auth::{CurrentUser, RequestContext};
use pt_core::config::AppConfig;
use pt_core::traits::Id;
use pt_core::types::{ProjectStatus, Role, TaskStatus};
use pt_db::{MemoryStore, Store};
use pt_files::MemoryStorage;
use pt_models::{
    DocumentType, Lead, NewLead, NewProject, NewTask, NewUser, Notification, Project, Task, User,
};
use pt_notifications::NotificationStore;
use rust_decimal::Decimal;

use crate::Tracker;

pub(crate) struct Fixture {
    pub tracker: Tracker,
    pub store: Arc<MemoryStore>,
    pub head: User,
    pub pm: User,
    pub emp: User,
    pub other_emp: User,
    pub cust: User,
    pub other_cust: User,
}

async fn insert_user(store: &MemoryStore, username: &str, full_name: &str, role: Role) -> User {
    store
        .insert_user(NewUser {
            username: username.into(),
            password_hash: String::new(),
            full_name: full_name.into(),
            email: None,
            phone: None,
            position: None,
            role,
        })
        .await
        .unwrap()
}

impl Fixture {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let config = AppConfig::default();
        let tracker = Tracker::new(store.clone(), Arc::new(MemoryStorage::default()), &config.auth);

        for name in DocumentType::DEFAULTS {
            store.insert_document_type(name).await.unwrap();
        }
        store.insert_budget_category("Development").await.unwrap();

        Self {
            head: insert_user(&store, "head", "Ivanov I.I. (Head)", Role::Head).await,
            pm: insert_user(&store, "pm", "Petrov P.P. (PM)", Role::Pm).await,
            emp: insert_user(&store, "emp", "Sidorov S.S. (Employee)", Role::Employee).await,
            other_emp: insert_user(&store, "emp2", "Kuznetsov K.K.", Role::Employee).await,
            cust: insert_user(&store, "cust", "Vector LLC (Customer)", Role::Customer).await,
            other_cust: insert_user(&store, "cust2", "Orbit LLC", Role::Customer).await,
            tracker,
            store,
        }
    }

    pub fn ctx(&self, user: &User) -> RequestContext {
        RequestContext::user(CurrentUser::from(user))
    }

    pub async fn project_for(&self, customer_id: Id) -> Project {
        let mut tx = self.store.begin().await.unwrap();
        let project = tx
            .insert_project(NewProject {
                title: "Website".into(),
                description: "Corporate site".into(),
                status: ProjectStatus::New,
                start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                end_date: None,
                planned_budget: Decimal::new(100_000, 0),
                customer_id,
                pm_id: Some(self.pm.id),
            })
            .await
            .unwrap();
        tx.commit().await.unwrap();
        project
    }

    pub async fn task_in(&self, project_id: Id, assignee: Id) -> Task {
        let mut tx = self.store.begin().await.unwrap();
        let task = tx
            .insert_task(NewTask {
                project_id,
                stage_id: None,
                title: "Layout".into(),
                description: String::new(),
                status: TaskStatus::ToDo,
                deadline: NaiveDate::from_ymd_opt(2024, 4, 1),
                cost: Decimal::new(15_000, 0),
                assignee_id: Some(assignee),
            })
            .await
            .unwrap();
        tx.commit().await.unwrap();
        task
    }

    pub async fn lead_from(&self, customer_id: Id) -> Lead {
        let mut tx = self.store.begin().await.unwrap();
        let lead = tx
            .insert_lead(NewLead {
                title: "Mobile app".into(),
                description: "iOS and Android".into(),
                budget: Decimal::new(500_000, 0),
                desired_deadline: NaiveDate::from_ymd_opt(2024, 12, 31),
                customer_id,
                attachment_key: None,
            })
            .await
            .unwrap();
        tx.commit().await.unwrap();
        lead
    }

    /// Everything ever sent to `user_id`, newest first
    pub async fn notifications_of(&self, user_id: Id) -> Vec<Notification> {
        self.store.list_recent(user_id, usize::MAX).await.unwrap()
    }
}
