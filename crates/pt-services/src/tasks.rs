//! Task creation and status transitions
//!
//! Every status change appends exactly one history row in the same
//! transaction that updates the task, with the task row locked.

use pt_auth::{Action, CurrentUser, Policy, RequestContext};
use pt_core::error::TrackerError;
use pt_core::result::TrackerResult;
use pt_core::traits::Id;
use pt_core::types::{Role, TaskStatus};
use pt_models::{CreateTaskInput, NewTask, NewTaskHistory, StatusTimeline, Task};
use pt_notifications::Notice;
use tracing::{debug, info, instrument};

use crate::tracker::{actor_name, not_found, notify, Tracker};
use crate::validation::validate;

/// How a transition picks its legality check and notice
#[derive(Debug, Clone, Copy)]
enum TransitionKind {
    /// Completion as offered to assignees; allowed from any state
    Complete,
    /// General move along the task state machine
    Move,
}

impl Tracker {
    /// Assign a new task to an employee
    #[instrument(skip(self, ctx, input), fields(project_id = input.project_id))]
    pub async fn create_task(&self, ctx: &RequestContext, input: CreateTaskInput) -> TrackerResult<Task> {
        let user = ctx.require()?;
        Policy::authorize(user, Action::CreateTask)?;
        validate(&input)?;

        let mut tx = self.store.begin().await?;

        let project = tx
            .find_project(input.project_id)
            .await?
            .ok_or_else(|| not_found("Project", input.project_id))?;
        if !project.status.accepts_tasks() {
            return Err(TrackerError::invalid_state(format!(
                "project {} is {} and accepts no new tasks",
                project.id,
                project.status.display_name()
            )));
        }
        match tx.find_user(input.assignee_id).await? {
            Some(assignee) if assignee.role == Role::Employee => {}
            _ => return Err(TrackerError::invalid_field("assignee_id", "must reference an employee")),
        }

        let task = tx
            .insert_task(NewTask {
                project_id: project.id,
                stage_id: input.stage_id,
                title: input.title.trim().to_string(),
                description: input.description,
                status: TaskStatus::ToDo,
                deadline: Some(input.deadline),
                cost: input.cost,
                assignee_id: Some(input.assignee_id),
            })
            .await?;
        notify(&mut tx, Notice::task_assigned(input.assignee_id, &task)).await?;
        tx.commit().await?;

        info!(task_id = task.id, assignee_id = input.assignee_id, "task created");
        Ok(task)
    }

    /// Mark a task Done. Managers and the assignee may complete; the
    /// project's PM is told.
    #[instrument(skip(self, ctx))]
    pub async fn complete_task(&self, ctx: &RequestContext, task_id: Id) -> TrackerResult<Task> {
        let user = ctx.require()?;
        self.transition(user, task_id, TaskStatus::Done, TransitionKind::Complete)
            .await
    }

    /// Move a task along the state machine
    #[instrument(skip(self, ctx))]
    pub async fn change_task_status(
        &self,
        ctx: &RequestContext,
        task_id: Id,
        status: TaskStatus,
    ) -> TrackerResult<Task> {
        let user = ctx.require()?;
        self.transition(user, task_id, status, TransitionKind::Move)
            .await
    }

    /// Status timeline of a visible task
    pub async fn task_timeline(&self, ctx: &RequestContext, task_id: Id) -> TrackerResult<StatusTimeline> {
        let user = ctx.require()?;
        let task = self.task_for(user, task_id).await?;
        let history = self.store.task_history(task.id).await?;
        Ok(StatusTimeline::reconstruct(task.id, &history))
    }

    async fn transition(
        &self,
        user: &CurrentUser,
        task_id: Id,
        next: TaskStatus,
        kind: TransitionKind,
    ) -> TrackerResult<Task> {
        // Visibility first: out-of-scope tasks are NotFound, not Forbidden
        let visible = self.task_for(user, task_id).await?;
        Policy::authorize_task_update(user, &visible)?;

        let mut tx = self.store.begin().await?;
        let mut task = tx
            .lock_task(task_id)
            .await?
            .ok_or_else(|| not_found("Task", task_id))?;
        Policy::authorize_task_update(user, &task)?;

        let previous = task.status;
        if let TransitionKind::Move = kind {
            if !previous.can_transition_to(next) {
                debug!(task_id, from = %previous, to = %next, "illegal task transition");
                return Err(TrackerError::invalid_state(format!(
                    "task cannot move from {} to {}",
                    previous.display_name(),
                    next.display_name()
                )));
            }
        }

        tx.append_task_history(NewTaskHistory {
            task_id,
            old_status: Some(previous),
            new_status: next,
            changed_by: user.id,
        })
        .await?;
        tx.set_task_status(task_id, next).await?;
        task.status = next;

        let pm_id = tx.find_project(task.project_id).await?.and_then(|p| p.pm_id);
        if let Some(pm_id) = pm_id {
            let name = actor_name(&mut tx, user).await?;
            let notice = match kind {
                TransitionKind::Complete => Notice::task_completed(pm_id, &task, &name),
                TransitionKind::Move => Notice::task_status_changed(pm_id, &task, &name),
            };
            notify(&mut tx, notice).await?;
        }
        tx.commit().await?;

        info!(task_id, from = %previous, to = %next, actor = user.id, "task status changed");
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use chrono::NaiveDate;
    use pt_core::types::ProjectStatus;
    use pt_db::Store;
    use rust_decimal::Decimal;

    fn input(project_id: Id, assignee_id: Id) -> CreateTaskInput {
        CreateTaskInput {
            title: "Checkout page".into(),
            description: String::new(),
            project_id,
            stage_id: None,
            assignee_id,
            deadline: NaiveDate::from_ymd_opt(2024, 5, 15).unwrap(),
            cost: Decimal::new(8_000, 0),
        }
    }

    #[tokio::test]
    async fn test_create_task_notifies_assignee() {
        let fx = Fixture::new().await;
        let project = fx.project_for(fx.cust.id).await;

        let task = fx
            .tracker
            .create_task(&fx.ctx(&fx.pm), input(project.id, fx.emp.id))
            .await
            .unwrap();
        assert_eq!(task.status, TaskStatus::ToDo);
        assert_eq!(task.assignee_id, Some(fx.emp.id));

        let inbox = fx.notifications_of(fx.emp.id).await;
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].message, "New task: Checkout page");
        assert_eq!(inbox[0].link.as_deref(), Some(project.link().as_str()));
    }

    #[tokio::test]
    async fn test_create_task_rejections() {
        let fx = Fixture::new().await;
        let project = fx.project_for(fx.cust.id).await;

        let err = fx
            .tracker
            .create_task(&fx.ctx(&fx.emp), input(project.id, fx.emp.id))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::Forbidden { .. }));

        let err = fx
            .tracker
            .create_task(&fx.ctx(&fx.pm), input(project.id, fx.cust.id))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::Validation(ref e) if e.has_error("assignee_id")));

        let mut negative = input(project.id, fx.emp.id);
        negative.cost = Decimal::new(-1, 0);
        let err = fx.tracker.create_task(&fx.ctx(&fx.pm), negative).await.unwrap_err();
        assert!(matches!(err, TrackerError::Validation(ref e) if e.has_error("cost")));

        let err = fx
            .tracker
            .create_task(&fx.ctx(&fx.pm), input(9999, fx.emp.id))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::NotFound { .. }));

        assert!(fx.notifications_of(fx.emp.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_completed_project_accepts_no_tasks() {
        let fx = Fixture::new().await;
        let mut tx = fx.store.begin().await.unwrap();
        let project = tx
            .insert_project(pt_models::NewProject {
                title: "Archive".into(),
                description: String::new(),
                status: ProjectStatus::Completed,
                start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                end_date: None,
                planned_budget: Decimal::ZERO,
                customer_id: fx.cust.id,
                pm_id: None,
            })
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let err = fx
            .tracker
            .create_task(&fx.ctx(&fx.head), input(project.id, fx.emp.id))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_assignee_completes_task() {
        let fx = Fixture::new().await;
        let project = fx.project_for(fx.cust.id).await;
        let task = fx.task_in(project.id, fx.emp.id).await;

        let done = fx.tracker.complete_task(&fx.ctx(&fx.emp), task.id).await.unwrap();
        assert_eq!(done.status, TaskStatus::Done);

        let history = fx.store.task_history(task.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].old_status, Some(TaskStatus::ToDo));
        assert_eq!(history[0].new_status, TaskStatus::Done);
        assert_eq!(history[0].changed_by, fx.emp.id);

        let inbox = fx.notifications_of(fx.pm.id).await;
        assert_eq!(inbox.len(), 1);
        assert_eq!(
            inbox[0].message,
            "Task 'Layout' completed by Sidorov S.S. (Employee)"
        );
    }

    #[tokio::test]
    async fn test_customer_cannot_complete_visible_task() {
        let fx = Fixture::new().await;
        let project = fx.project_for(fx.cust.id).await;
        let task = fx.task_in(project.id, fx.emp.id).await;

        let err = fx.tracker.complete_task(&fx.ctx(&fx.cust), task.id).await.unwrap_err();
        assert!(matches!(err, TrackerError::Forbidden { .. }));

        let unchanged = fx.store.find_task(pt_auth::Scope::All, task.id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, TaskStatus::ToDo);
        assert!(fx.store.task_history(task.id).await.unwrap().is_empty());
        assert!(fx.notifications_of(fx.pm.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_other_employee_gets_not_found() {
        let fx = Fixture::new().await;
        let project = fx.project_for(fx.cust.id).await;
        let task = fx.task_in(project.id, fx.emp.id).await;

        let err = fx
            .tracker
            .complete_task(&fx.ctx(&fx.other_emp), task.id)
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_completing_done_task_records_another_row() {
        let fx = Fixture::new().await;
        let project = fx.project_for(fx.cust.id).await;
        let task = fx.task_in(project.id, fx.emp.id).await;
        let head = fx.ctx(&fx.head);

        fx.tracker.complete_task(&head, task.id).await.unwrap();
        fx.tracker.complete_task(&head, task.id).await.unwrap();

        let history = fx.store.task_history(task.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].old_status, Some(TaskStatus::Done));
        assert_eq!(history[1].new_status, TaskStatus::Done);
    }

    #[tokio::test]
    async fn test_change_status_follows_state_machine() {
        let fx = Fixture::new().await;
        let project = fx.project_for(fx.cust.id).await;
        let task = fx.task_in(project.id, fx.emp.id).await;
        let emp = fx.ctx(&fx.emp);

        let moved = fx
            .tracker
            .change_task_status(&emp, task.id, TaskStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(moved.status, TaskStatus::InProgress);

        fx.tracker
            .change_task_status(&emp, task.id, TaskStatus::Cancelled)
            .await
            .unwrap();

        let err = fx
            .tracker
            .change_task_status(&emp, task.id, TaskStatus::InProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::InvalidState { .. }));

        let timeline = fx.tracker.task_timeline(&emp, task.id).await.unwrap();
        assert_eq!(
            timeline.statuses(),
            vec![TaskStatus::InProgress, TaskStatus::Cancelled]
        );
        assert_eq!(timeline.current(), Some(TaskStatus::Cancelled));

        let inbox = fx.notifications_of(fx.pm.id).await;
        assert_eq!(inbox.len(), 2);
        assert!(inbox[0].message.contains("Cancelled"));
    }

    #[tokio::test]
    async fn test_history_reconstructs_every_transition() {
        let fx = Fixture::new().await;
        let project = fx.project_for(fx.cust.id).await;
        let task = fx.task_in(project.id, fx.emp.id).await;
        let pm = fx.ctx(&fx.pm);

        let path = [
            TaskStatus::InProgress,
            TaskStatus::ToDo,
            TaskStatus::InProgress,
            TaskStatus::Done,
        ];
        for status in path {
            fx.tracker.change_task_status(&pm, task.id, status).await.unwrap();
        }

        let history = fx.store.task_history(task.id).await.unwrap();
        assert_eq!(history.len(), path.len());
        for pair in history.windows(2) {
            assert_eq!(pair[0].new_status, pair[1].old_status.unwrap());
        }
        let timeline = StatusTimeline::reconstruct(task.id, &history);
        assert_eq!(timeline.statuses(), path.to_vec());
    }
}
