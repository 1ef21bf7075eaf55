//! Domain enumerations used throughout Project Tracker
//!
//! Roles and statuses are closed sets. They are stored as their `as_str()`
//! code and parsed back with `FromStr`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a stored code does not name a known variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} code: {value}")]
pub struct UnknownCode {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! coded_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $code:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $code),+
                }
            }
        }

        impl FromStr for $ty {
            type Err = UnknownCode;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok($ty::$variant),)+
                    other => Err(UnknownCode {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// User role. Seeded once, never changes at runtime.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Head,
    Pm,
    Employee,
    Customer,
}

coded_enum!(Role, "role", {
    Head => "head",
    Pm => "pm",
    Employee => "employee",
    Customer => "customer",
});

impl Role {
    /// Head and PM share administrative rights over projects, tasks and leads
    pub fn is_manager(&self) -> bool {
        matches!(self, Self::Head | Self::Pm)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Head => "Head",
            Self::Pm => "Project manager",
            Self::Employee => "Employee",
            Self::Customer => "Customer",
        }
    }
}

/// Project lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    New,
    InProgress,
    Completed,
    Paused,
}

coded_enum!(ProjectStatus, "project status", {
    New => "new",
    InProgress => "in_progress",
    Completed => "completed",
    Paused => "paused",
});

impl ProjectStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::InProgress => "In progress",
            Self::Completed => "Completed",
            Self::Paused => "Paused",
        }
    }

    /// Completed projects accept no new tasks
    pub fn accepts_tasks(&self) -> bool {
        !matches!(self, Self::Completed)
    }
}

/// Task status machine.
///
/// ```text
/// ToDo <-> InProgress
///   \         |
///    +--> Done / Cancelled   (terminal)
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    ToDo,
    InProgress,
    Done,
    Cancelled,
}

coded_enum!(TaskStatus, "task status", {
    ToDo => "to_do",
    InProgress => "in_progress",
    Done => "done",
    Cancelled => "cancelled",
});

impl TaskStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ToDo => "To do",
            Self::InProgress => "In progress",
            Self::Done => "Done",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Cancelled)
    }

    /// Counted in an employee's active workload
    pub fn is_active(&self) -> bool {
        matches!(self, Self::ToDo | Self::InProgress)
    }

    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (ToDo, InProgress)
                | (ToDo, Done)
                | (ToDo, Cancelled)
                | (InProgress, ToDo)
                | (InProgress, Done)
                | (InProgress, Cancelled)
        )
    }
}

/// Lead decision status. `Approved` and `Rejected` are terminal for approval.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
    Approved,
    Rejected,
}

coded_enum!(LeadStatus, "lead status", {
    New => "new",
    Approved => "approved",
    Rejected => "rejected",
});

impl LeadStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::New)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_codes_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), *role);
        }
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_manager_roles() {
        assert!(Role::Head.is_manager());
        assert!(Role::Pm.is_manager());
        assert!(!Role::Employee.is_manager());
        assert!(!Role::Customer.is_manager());
    }

    #[test]
    fn test_task_state_machine() {
        assert!(TaskStatus::ToDo.can_transition_to(TaskStatus::Done));
        assert!(TaskStatus::InProgress.can_transition_to(TaskStatus::ToDo));
        assert!(!TaskStatus::Done.can_transition_to(TaskStatus::InProgress));
        assert!(!TaskStatus::Cancelled.can_transition_to(TaskStatus::ToDo));
        assert!(!TaskStatus::ToDo.can_transition_to(TaskStatus::ToDo));
        assert!(TaskStatus::Done.is_terminal());
        assert_eq!(TaskStatus::default(), TaskStatus::ToDo);
    }

    #[test]
    fn test_unknown_code() {
        let err = "archived".parse::<ProjectStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown project status code: archived");
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let status: LeadStatus = serde_json::from_str("\"approved\"").unwrap();
        assert_eq!(status, LeadStatus::Approved);
    }
}
