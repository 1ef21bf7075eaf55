//! # pt-models
//!
//! Domain models for Project Tracker.
//!
//! Entities reference each other by id only. Every persisted struct has a
//! matching `New*` insert struct, and operations that take caller input have
//! a validated `*Input` DTO.

pub use pt_core::traits::{Entity, Id, Identifiable, ProjectScoped, Timestamped};
pub use pt_core::types::{LeadStatus, ProjectStatus, Role, TaskStatus};

pub mod document;
pub mod lead;
pub mod lookup;
pub mod message;
pub mod notification;
pub mod project;
pub mod task;
pub mod user;

pub use document::{Document, NewDocument, UploadDocumentInput};
pub use lead::{CreateLeadInput, Lead, NewLead};
pub use lookup::{BudgetCategory, DocumentType};
pub use message::{NewProjectMessage, PostMessageInput, ProjectMessage};
pub use notification::{NewNotification, Notification};
pub use project::{
    BudgetItem, CreateProjectInput, NewBudgetItem, NewProject, NewProjectStage, Project,
    ProjectStage,
};
pub use task::{
    CreateTaskInput, NewTask, NewTaskHistory, StatusTimeline, Task, TaskHistory,
};
pub use user::{NewUser, ProfileUpdate, User, UserSummary};

/// Money amounts and costs may be zero but never negative
pub(crate) fn non_negative(
    value: &rust_decimal::Decimal,
) -> Result<(), validator::ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = validator::ValidationError::new("range");
        err.message = Some("must not be negative".into());
        return Err(err);
    }
    Ok(())
}
