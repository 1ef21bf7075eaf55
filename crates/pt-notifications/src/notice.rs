//! Notification templates
//!
//! Each event the engine emits has one constructor here that decides the
//! message text and link.

use pt_core::traits::Id;
use pt_models::{Lead, NewNotification, Project, Task};
use serde::{Deserialize, Serialize};

/// Event that produced a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    ProjectCreated,
    TaskAssigned,
    TaskCompleted,
    TaskStatusChanged,
    LeadSubmitted,
    LeadApproved,
    LeadRejected,
    MessagePosted,
    RevisionRequested,
}

/// A rendered notification addressed to one recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub notification: NewNotification,
}

const LEADS_LINK: &str = "/leads";

impl Notice {
    fn new(kind: NoticeKind, recipient: Id, message: String, link: String) -> Self {
        Self {
            kind,
            notification: NewNotification::new(recipient, message).with_link(link),
        }
    }

    /// To the customer of a newly created project
    pub fn project_created(project: &Project) -> Self {
        Self::new(
            NoticeKind::ProjectCreated,
            project.customer_id,
            format!("A new project was created for you: {}", project.title),
            project.link(),
        )
    }

    pub fn task_assigned(assignee: Id, task: &Task) -> Self {
        Self::new(
            NoticeKind::TaskAssigned,
            assignee,
            format!("New task: {}", task.title),
            Project::link_for(task.project_id),
        )
    }

    /// To the project's PM when a task is completed
    pub fn task_completed(pm: Id, task: &Task, actor_name: &str) -> Self {
        Self::new(
            NoticeKind::TaskCompleted,
            pm,
            format!("Task '{}' completed by {}", task.title, actor_name),
            Project::link_for(task.project_id),
        )
    }

    pub fn task_status_changed(pm: Id, task: &Task, actor_name: &str) -> Self {
        Self::new(
            NoticeKind::TaskStatusChanged,
            pm,
            format!(
                "Task '{}' moved to {} by {}",
                task.title,
                task.status.display_name(),
                actor_name
            ),
            Project::link_for(task.project_id),
        )
    }

    /// To a manager when a customer submits a lead
    pub fn lead_submitted(manager: Id, lead: &Lead, customer_name: &str) -> Self {
        Self::new(
            NoticeKind::LeadSubmitted,
            manager,
            format!("New lead from {}: {}", customer_name, lead.title),
            LEADS_LINK.to_string(),
        )
    }

    pub fn lead_approved(lead: &Lead, project: &Project) -> Self {
        Self::new(
            NoticeKind::LeadApproved,
            lead.customer_id,
            format!("Your lead '{}' was approved. Project created.", lead.title),
            project.link(),
        )
    }

    pub fn lead_rejected(lead: &Lead) -> Self {
        Self::new(
            NoticeKind::LeadRejected,
            lead.customer_id,
            format!("Your lead '{}' was rejected.", lead.title),
            LEADS_LINK.to_string(),
        )
    }

    pub fn message_posted(recipient: Id, project: &Project, revision: bool) -> Self {
        let (kind, message) = if revision {
            (
                NoticeKind::RevisionRequested,
                format!("Revision requested in project {}", project.title),
            )
        } else {
            (
                NoticeKind::MessagePosted,
                format!("New message in project {}", project.title),
            )
        };
        Self::new(kind, recipient, message, project.link())
    }

    pub fn recipient(&self) -> Id {
        self.notification.user_id
    }

    pub fn into_notification(self) -> NewNotification {
        self.notification
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use pt_core::types::{LeadStatus, ProjectStatus, TaskStatus};
    use rust_decimal::Decimal;

    fn project() -> Project {
        Project {
            id: 5,
            title: "Website".into(),
            description: "Corporate site".into(),
            status: ProjectStatus::New,
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end_date: None,
            planned_budget: Decimal::ZERO,
            actual_cost: Decimal::ZERO,
            customer_id: 4,
            pm_id: Some(2),
            created_at: Utc::now(),
        }
    }

    fn lead() -> Lead {
        Lead {
            id: 9,
            title: "Mobile app".into(),
            description: String::new(),
            budget: Decimal::ZERO,
            desired_deadline: None,
            status: LeadStatus::New,
            customer_id: 4,
            attachment_key: None,
            project_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_project_created_goes_to_customer() {
        let notice = Notice::project_created(&project());
        assert_eq!(notice.kind, NoticeKind::ProjectCreated);
        assert_eq!(notice.recipient(), 4);
        assert_eq!(notice.notification.link.as_deref(), Some("/projects/5"));
    }

    #[test]
    fn test_task_completed_message() {
        let task = Task {
            id: 1,
            project_id: 5,
            stage_id: None,
            title: "Mockups".into(),
            description: String::new(),
            status: TaskStatus::Done,
            deadline: None,
            cost: Decimal::ZERO,
            assignee_id: Some(3),
            created_at: Utc::now(),
        };
        let notice = Notice::task_completed(2, &task, "Ivan Ivanov");
        assert_eq!(notice.recipient(), 2);
        assert_eq!(notice.notification.message, "Task 'Mockups' completed by Ivan Ivanov");
        assert_eq!(notice.notification.link.as_deref(), Some("/projects/5"));
    }

    #[test]
    fn test_lead_notices() {
        let lead = lead();
        let approved = Notice::lead_approved(&lead, &project());
        assert_eq!(approved.recipient(), 4);
        assert_eq!(approved.notification.link.as_deref(), Some("/projects/5"));

        let rejected = Notice::lead_rejected(&lead);
        assert_eq!(rejected.kind, NoticeKind::LeadRejected);
        assert_eq!(rejected.notification.link.as_deref(), Some("/leads"));
    }

    #[test]
    fn test_revision_message_kind() {
        let notice = Notice::message_posted(2, &project(), true);
        assert_eq!(notice.kind, NoticeKind::RevisionRequested);
    }
}
