//! Project creation, detail view and project plan (stages, budget items)

use pt_auth::{Action, Policy, RequestContext};
use pt_core::error::TrackerError;
use pt_core::result::TrackerResult;
use pt_core::traits::Id;
use pt_core::types::{ProjectStatus, Role};
use pt_models::{
    BudgetCategory, BudgetItem, CreateProjectInput, Document, NewBudgetItem, NewProject,
    NewProjectStage, Project, ProjectMessage, ProjectStage, Task, UserSummary,
};
use pt_notifications::Notice;
use serde::Serialize;
use tracing::{info, instrument};

use crate::tracker::{not_found, notify, Tracker};
use crate::validation::validate;

/// A project with everything its page shows
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    pub project: Project,
    pub customer: Option<UserSummary>,
    pub pm: Option<UserSummary>,
    pub tasks: Vec<Task>,
    /// Chronological
    pub messages: Vec<ProjectMessage>,
    pub documents: Vec<Document>,
    pub stages: Vec<ProjectStage>,
    pub budget_items: Vec<BudgetItem>,
}

impl Tracker {
    /// Create a project for an existing customer. The PM defaults to the actor.
    #[instrument(skip(self, ctx, input), fields(title = %input.title))]
    pub async fn create_project(
        &self,
        ctx: &RequestContext,
        input: CreateProjectInput,
    ) -> TrackerResult<Project> {
        let user = ctx.require()?;
        Policy::authorize(user, Action::CreateProject)?;
        validate(&input)?;
        if let Some(end) = input.end_date {
            if end < input.start_date {
                return Err(TrackerError::invalid_field("end_date", "must not precede the start date"));
            }
        }

        let mut tx = self.store.begin().await?;

        match tx.find_user(input.customer_id).await? {
            Some(customer) if customer.role == Role::Customer => {}
            _ => return Err(TrackerError::invalid_field("customer_id", "must reference a customer")),
        }
        let pm_id = input.pm_id.unwrap_or(user.id);
        match tx.find_user(pm_id).await? {
            Some(pm) if pm.role.is_manager() => {}
            _ => return Err(TrackerError::invalid_field("pm_id", "must reference a manager")),
        }

        let project = tx
            .insert_project(NewProject {
                title: input.title.trim().to_string(),
                description: input.description,
                status: ProjectStatus::New,
                start_date: input.start_date,
                end_date: input.end_date,
                planned_budget: input.planned_budget,
                customer_id: input.customer_id,
                pm_id: Some(pm_id),
            })
            .await?;
        notify(&mut tx, Notice::project_created(&project)).await?;
        tx.commit().await?;

        info!(project_id = project.id, customer_id = project.customer_id, "project created");
        Ok(project)
    }

    /// Load a visible project with its children and mark the caller's
    /// notifications about it as read.
    #[instrument(skip(self, ctx))]
    pub async fn project_detail(&self, ctx: &RequestContext, id: Id) -> TrackerResult<ProjectDetail> {
        let user = ctx.require()?;
        let project = self.project_for(user, id).await?;

        let customer = self.store.find_user(project.customer_id).await?.map(|u| u.summary());
        let pm = match project.pm_id {
            Some(pm_id) => self.store.find_user(pm_id).await?.map(|u| u.summary()),
            None => None,
        };

        let detail = ProjectDetail {
            tasks: self.store.list_project_tasks(id).await?,
            messages: self.store.list_messages(id).await?,
            documents: self.store.list_documents(id).await?,
            stages: self.store.list_stages(id).await?,
            budget_items: self.store.list_budget_items(id).await?,
            customer,
            pm,
            project,
        };

        self.notifications
            .mark_read_for_link(user.id, &detail.project.link())
            .await?;
        Ok(detail)
    }

    #[instrument(skip(self, ctx, stage), fields(name = %stage.name))]
    pub async fn add_stage(
        &self,
        ctx: &RequestContext,
        project_id: Id,
        mut stage: NewProjectStage,
    ) -> TrackerResult<ProjectStage> {
        let user = ctx.require()?;
        Policy::authorize(user, Action::ManageProjectPlan)?;
        validate(&stage)?;
        if let (Some(start), Some(end)) = (stage.start_date, stage.end_date) {
            if end < start {
                return Err(TrackerError::invalid_field("end_date", "must not precede the start date"));
            }
        }

        let mut tx = self.store.begin().await?;
        tx.find_project(project_id)
            .await?
            .ok_or_else(|| not_found("Project", project_id))?;
        stage.project_id = project_id;
        let stage = tx.insert_stage(stage).await?;
        tx.commit().await?;

        info!(stage_id = stage.id, project_id, "stage added");
        Ok(stage)
    }

    #[instrument(skip(self, ctx, item))]
    pub async fn add_budget_item(
        &self,
        ctx: &RequestContext,
        project_id: Id,
        mut item: NewBudgetItem,
    ) -> TrackerResult<BudgetItem> {
        let user = ctx.require()?;
        Policy::authorize(user, Action::ManageProjectPlan)?;
        validate(&item)?;

        let mut tx = self.store.begin().await?;
        tx.find_project(project_id)
            .await?
            .ok_or_else(|| not_found("Project", project_id))?;
        item.project_id = project_id;
        let item = tx.insert_budget_item(item).await?;
        tx.commit().await?;

        info!(budget_item_id = item.id, project_id, "budget item added");
        Ok(item)
    }

    pub async fn budget_categories(&self, ctx: &RequestContext) -> TrackerResult<Vec<BudgetCategory>> {
        ctx.require()?;
        Ok(self.store.list_budget_categories().await?)
    }

    #[instrument(skip(self, ctx))]
    pub async fn create_budget_category(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> TrackerResult<BudgetCategory> {
        let user = ctx.require()?;
        Policy::authorize(user, Action::ManageProjectPlan)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::invalid_field("name", "can't be blank"));
        }
        Ok(self.store.insert_budget_category(name).await?)
    }

    /// Customer and PM names for a project, for exports and listings
    pub(crate) async fn participants(
        &self,
        project: &Project,
    ) -> TrackerResult<(Option<String>, Option<String>)> {
        let customer = self
            .store
            .find_user(project.customer_id)
            .await?
            .map(|u| u.full_name);
        let pm = match project.pm_id {
            Some(id) => self.store.find_user(id).await?.map(|u| u.full_name),
            None => None,
        };
        Ok((customer, pm))
    }
}
