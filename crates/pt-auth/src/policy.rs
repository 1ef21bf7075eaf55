//! Role policy
//!
//! Single source of truth for who may see which rows and who may trigger
//! which operation. Read scope is expressed as a [`Scope`] that the store
//! turns into a predicate; write guards are checked with [`Policy::authorize`].
//!
//! | Role     | Projects                         | Tasks               | Leads              |
//! |----------|----------------------------------|---------------------|--------------------|
//! | head     | all                              | all                 | all                |
//! | pm       | all                              | all                 | all                |
//! | customer | customer_id = user               | tasks of own projects | customer_id = user |
//! | employee | projects with a task assigned to user | assignee_id = user | none            |

use pt_core::error::TrackerError;
use pt_core::traits::Id;
use pt_core::types::Role;
use pt_models::Task;

use crate::context::CurrentUser;

/// Row filter for one entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every row
    All,
    /// Rows belonging to projects whose customer is the given user
    OwnedByCustomer(Id),
    /// Rows reachable through a task assigned to the given user
    AssignedTo(Id),
    /// No rows
    Nothing,
}

impl Scope {
    pub fn is_nothing(&self) -> bool {
        matches!(self, Self::Nothing)
    }
}

/// Write operations guarded by role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateProject,
    CreateTask,
    ApproveLead,
    RejectLead,
    CreateLead,
    ExportProject,
    ViewWorkload,
    ViewEmployees,
    ManageProjectPlan,
}

impl Action {
    /// Roles allowed to perform the action
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Self::CreateProject
            | Self::CreateTask
            | Self::ApproveLead
            | Self::RejectLead
            | Self::ExportProject
            | Self::ViewWorkload
            | Self::ViewEmployees
            | Self::ManageProjectPlan => &[Role::Head, Role::Pm],
            Self::CreateLead => &[Role::Customer],
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::CreateProject => "create projects",
            Self::CreateTask => "create tasks",
            Self::ApproveLead => "approve leads",
            Self::RejectLead => "reject leads",
            Self::CreateLead => "submit leads",
            Self::ExportProject => "export projects",
            Self::ViewWorkload => "view the workload report",
            Self::ViewEmployees => "view the employee directory",
            Self::ManageProjectPlan => "manage project stages and budgets",
        }
    }
}

/// Role policy
pub struct Policy;

impl Policy {
    pub fn project_scope(user: &CurrentUser) -> Scope {
        match user.role {
            Role::Head | Role::Pm => Scope::All,
            Role::Customer => Scope::OwnedByCustomer(user.id),
            Role::Employee => Scope::AssignedTo(user.id),
        }
    }

    pub fn task_scope(user: &CurrentUser) -> Scope {
        match user.role {
            Role::Head | Role::Pm => Scope::All,
            Role::Customer => Scope::OwnedByCustomer(user.id),
            Role::Employee => Scope::AssignedTo(user.id),
        }
    }

    pub fn lead_scope(user: &CurrentUser) -> Scope {
        match user.role {
            Role::Head | Role::Pm => Scope::All,
            Role::Customer => Scope::OwnedByCustomer(user.id),
            Role::Employee => Scope::Nothing,
        }
    }

    pub fn allows(user: &CurrentUser, action: Action) -> bool {
        action.allowed_roles().contains(&user.role)
    }

    /// `Forbidden` unless the user's role may perform the action
    pub fn authorize(user: &CurrentUser, action: Action) -> Result<(), TrackerError> {
        if Self::allows(user, action) {
            Ok(())
        } else {
            tracing::debug!(user_id = user.id, role = %user.role, ?action, "action denied");
            Err(TrackerError::forbidden(format!(
                "{} may not {}",
                user.role.display_name(),
                action.describe()
            )))
        }
    }

    /// Managers may change any task; otherwise only its current assignee
    pub fn authorize_task_update(user: &CurrentUser, task: &Task) -> Result<(), TrackerError> {
        if user.is_manager() || task.is_assigned_to(user.id) {
            Ok(())
        } else {
            tracing::debug!(user_id = user.id, task_id = task.id, "task update denied");
            Err(TrackerError::forbidden("Only managers or the assignee may change this task"))
        }
    }

    /// Revision requests are a customer-only flag
    pub fn may_flag_revision(user: &CurrentUser) -> bool {
        user.is_customer()
    }
}
