//! Task model and status history
//!
//! Tables: tasks, task_history

use chrono::{DateTime, NaiveDate, Utc};
use pt_core::traits::{Entity, Id, Identifiable, ProjectScoped, Timestamped};
use pt_core::types::TaskStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Task entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Id,
    pub project_id: Id,
    pub stage_id: Option<Id>,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub deadline: Option<NaiveDate>,
    pub cost: Decimal,
    pub assignee_id: Option<Id>,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for Task {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for Task {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl ProjectScoped for Task {
    fn project_id(&self) -> Id {
        self.project_id
    }
}

impl Entity for Task {
    const TABLE_NAME: &'static str = "tasks";
    const TYPE_NAME: &'static str = "Task";
}

impl Task {
    pub fn is_assigned_to(&self, user_id: Id) -> bool {
        self.assignee_id == Some(user_id)
    }
}

/// Insert struct for tasks
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub project_id: Id,
    pub stage_id: Option<Id>,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub deadline: Option<NaiveDate>,
    pub cost: Decimal,
    pub assignee_id: Option<Id>,
}

/// Caller input for task creation
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskInput {
    #[validate(length(min = 1, max = 255, message = "can't be blank"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub project_id: Id,
    pub stage_id: Option<Id>,
    pub assignee_id: Id,
    pub deadline: NaiveDate,

    #[serde(default)]
    #[validate(custom = "crate::non_negative")]
    pub cost: Decimal,
}

/// One recorded status change. Rows are never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskHistory {
    pub id: Id,
    pub task_id: Id,
    /// `None` only for a row recording the task's initial status
    pub old_status: Option<TaskStatus>,
    pub new_status: TaskStatus,
    pub changed_by: Id,
    pub changed_at: DateTime<Utc>,
}

impl Identifiable for TaskHistory {
    fn id(&self) -> Id {
        self.id
    }
}

impl Entity for TaskHistory {
    const TABLE_NAME: &'static str = "task_history";
    const TYPE_NAME: &'static str = "TaskHistory";
}

/// Insert struct for history rows
#[derive(Debug, Clone, PartialEq)]
pub struct NewTaskHistory {
    pub task_id: Id,
    pub old_status: Option<TaskStatus>,
    pub new_status: TaskStatus,
    pub changed_by: Id,
}

/// Status timeline of a single task rebuilt from its history rows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTimeline {
    pub task_id: Id,
    /// `(status, entered_at, changed_by)` in chronological order
    pub entries: Vec<(TaskStatus, DateTime<Utc>, Id)>,
}

impl StatusTimeline {
    /// Rebuild the timeline. Rows for other tasks are ignored; rows are
    /// ordered by `(changed_at, id)` so equal timestamps keep insert order.
    pub fn reconstruct(task_id: Id, history: &[TaskHistory]) -> Self {
        let mut rows: Vec<&TaskHistory> = history.iter().filter(|h| h.task_id == task_id).collect();
        rows.sort_by_key(|h| (h.changed_at, h.id));
        Self {
            task_id,
            entries: rows
                .into_iter()
                .map(|h| (h.new_status, h.changed_at, h.changed_by))
                .collect(),
        }
    }

    /// Status after the last recorded change
    pub fn current(&self) -> Option<TaskStatus> {
        self.entries.last().map(|(status, _, _)| *status)
    }

    /// Statuses in the order they were entered
    pub fn statuses(&self) -> Vec<TaskStatus> {
        self.entries.iter().map(|(s, _, _)| *s).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn row(id: Id, task_id: Id, old: Option<TaskStatus>, new: TaskStatus, at: DateTime<Utc>) -> TaskHistory {
        TaskHistory {
            id,
            task_id,
            old_status: old,
            new_status: new,
            changed_by: 3,
            changed_at: at,
        }
    }

    #[test]
    fn test_timeline_reconstruction() {
        let t0 = Utc::now();
        let history = vec![
            row(3, 1, Some(TaskStatus::InProgress), TaskStatus::Done, t0 + Duration::minutes(5)),
            row(1, 1, Some(TaskStatus::ToDo), TaskStatus::InProgress, t0),
            row(2, 9, Some(TaskStatus::ToDo), TaskStatus::Cancelled, t0),
        ];

        let timeline = StatusTimeline::reconstruct(1, &history);
        assert_eq!(
            timeline.statuses(),
            vec![TaskStatus::InProgress, TaskStatus::Done]
        );
        assert_eq!(timeline.current(), Some(TaskStatus::Done));
    }

    #[test]
    fn test_timeline_ties_keep_insert_order() {
        let t0 = Utc::now();
        let history = vec![
            row(5, 1, Some(TaskStatus::InProgress), TaskStatus::ToDo, t0),
            row(4, 1, Some(TaskStatus::ToDo), TaskStatus::InProgress, t0),
        ];
        let timeline = StatusTimeline::reconstruct(1, &history);
        assert_eq!(timeline.current(), Some(TaskStatus::ToDo));
    }

    #[test]
    fn test_empty_timeline() {
        let timeline = StatusTimeline::reconstruct(1, &[]);
        assert_eq!(timeline.current(), None);
    }
}
