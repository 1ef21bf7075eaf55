//! Role-scoped reads
//!
//! | Role     | Projects                     | Tasks                 | Leads            |
//! |----------|------------------------------|-----------------------|------------------|
//! | head, pm | all                          | all                   | all              |
//! | customer | own                          | tasks of own projects | own              |
//! | employee | with a task assigned to them | assigned to them      | none             |
//!
//! Single reads answer `NotFound` for ids outside the caller's scope, so a
//! caller cannot probe for rows they may not see.

use pt_auth::{CurrentUser, Policy, RequestContext};
use pt_core::result::TrackerResult;
use pt_core::traits::Id;
use pt_models::{Lead, Project, Task};
use tracing::instrument;

use crate::tracker::{not_found, Tracker};

impl Tracker {
    #[instrument(skip(self, ctx))]
    pub async fn visible_projects(&self, ctx: &RequestContext) -> TrackerResult<Vec<Project>> {
        let user = ctx.require()?;
        Ok(self.store.list_projects(Policy::project_scope(user)).await?)
    }

    #[instrument(skip(self, ctx))]
    pub async fn visible_tasks(&self, ctx: &RequestContext) -> TrackerResult<Vec<Task>> {
        let user = ctx.require()?;
        Ok(self.store.list_tasks(Policy::task_scope(user)).await?)
    }

    #[instrument(skip(self, ctx))]
    pub async fn visible_leads(&self, ctx: &RequestContext) -> TrackerResult<Vec<Lead>> {
        let user = ctx.require()?;
        Ok(self.store.list_leads(Policy::lead_scope(user)).await?)
    }

    pub async fn project(&self, ctx: &RequestContext, id: Id) -> TrackerResult<Project> {
        self.project_for(ctx.require()?, id).await
    }

    pub async fn task(&self, ctx: &RequestContext, id: Id) -> TrackerResult<Task> {
        self.task_for(ctx.require()?, id).await
    }

    pub async fn lead(&self, ctx: &RequestContext, id: Id) -> TrackerResult<Lead> {
        self.lead_for(ctx.require()?, id).await
    }

    pub(crate) async fn project_for(&self, user: &CurrentUser, id: Id) -> TrackerResult<Project> {
        self.store
            .find_project(Policy::project_scope(user), id)
            .await?
            .ok_or_else(|| not_found("Project", id))
    }

    pub(crate) async fn task_for(&self, user: &CurrentUser, id: Id) -> TrackerResult<Task> {
        self.store
            .find_task(Policy::task_scope(user), id)
            .await?
            .ok_or_else(|| not_found("Task", id))
    }

    pub(crate) async fn lead_for(&self, user: &CurrentUser, id: Id) -> TrackerResult<Lead> {
        self.store
            .find_lead(Policy::lead_scope(user), id)
            .await?
            .ok_or_else(|| not_found("Lead", id))
    }
}
