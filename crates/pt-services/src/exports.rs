//! Project exports: budget sheet and technical brief

use std::collections::HashMap;

use chrono::Utc;
use pt_auth::{Action, Policy, RequestContext};
use pt_core::result::TrackerResult;
use pt_core::traits::Id;
use pt_core::types::Role;
use pt_exports::{BudgetLine, ExportKind, ExportedFile, ProjectExportView, TaskLine};
use pt_models::Project;
use tracing::{info, instrument};

use crate::tracker::Tracker;

impl Tracker {
    #[instrument(skip(self, ctx))]
    pub async fn export_project(
        &self,
        ctx: &RequestContext,
        project_id: Id,
        kind: ExportKind,
    ) -> TrackerResult<ExportedFile> {
        let user = ctx.require()?;
        Policy::authorize(user, Action::ExportProject)?;
        let project = self.project_for(user, project_id).await?;

        let view = self.export_view(project).await?;
        let file = pt_exports::render(kind, &view)?;
        info!(project_id, ?kind, size = file.bytes.len(), "project exported");
        Ok(file)
    }

    /// Resolve names and labels into a read-only view for the renderers
    async fn export_view(&self, project: Project) -> TrackerResult<ProjectExportView> {
        let (customer_name, pm_name) = self.participants(&project).await?;

        let names: HashMap<Id, String> = self
            .store
            .list_users(Role::ALL)
            .await?
            .into_iter()
            .map(|u| (u.id, u.full_name))
            .collect();
        let tasks = self
            .store
            .list_project_tasks(project.id)
            .await?
            .into_iter()
            .map(|task| TaskLine {
                assignee_name: task.assignee_id.and_then(|id| names.get(&id).cloned()),
                status_name: task.status.display_name().to_string(),
                title: task.title,
                deadline: task.deadline,
                cost: task.cost,
            })
            .collect();

        let categories: HashMap<Id, String> = self
            .store
            .list_budget_categories()
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();
        let budget_items = self
            .store
            .list_budget_items(project.id)
            .await?
            .into_iter()
            .map(|item| BudgetLine {
                category: categories
                    .get(&item.category_id)
                    .cloned()
                    .unwrap_or_else(|| format!("#{}", item.category_id)),
                planned_amount: item.planned_amount,
                actual_amount: item.actual_amount,
            })
            .collect();

        Ok(ProjectExportView {
            status_name: project.status.display_name().to_string(),
            project,
            pm_name,
            customer_name,
            tasks,
            budget_items,
            generated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use pt_core::error::TrackerError;
    use pt_models::NewBudgetItem;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_budget_sheet_lists_tasks_and_budget() {
        let fx = Fixture::new().await;
        let project = fx.project_for(fx.cust.id).await;
        fx.task_in(project.id, fx.emp.id).await;
        let pm = fx.ctx(&fx.pm);
        let category = fx.tracker.budget_categories(&pm).await.unwrap()[0].id;
        fx.tracker
            .add_budget_item(
                &pm,
                project.id,
                NewBudgetItem {
                    project_id: 0,
                    category_id: category,
                    planned_amount: Decimal::new(20_000, 0),
                    actual_amount: Decimal::new(15_000, 0),
                },
            )
            .await
            .unwrap();

        let file = fx
            .tracker
            .export_project(&pm, project.id, ExportKind::BudgetSheet)
            .await
            .unwrap();
        assert_eq!(file.filename, format!("budget_{}_Website.csv", project.id));

        let text = String::from_utf8(file.bytes).unwrap();
        assert!(text.contains("Project manager:,Petrov P.P. (PM)"));
        assert!(text.contains("Customer:,Vector LLC (Customer)"));
        assert!(text.contains("1,Layout,Sidorov S.S. (Employee),2024-04-01,To do,15000.00"));
        assert!(text.contains("Development,20000.00,15000.00,5000.00"));
    }

    #[tokio::test]
    async fn test_brief_document() {
        let fx = Fixture::new().await;
        let project = fx.project_for(fx.cust.id).await;

        let file = fx
            .tracker
            .export_project(&fx.ctx(&fx.head), project.id, ExportKind::Brief)
            .await
            .unwrap();
        let text = String::from_utf8(file.bytes).unwrap();
        assert!(text.starts_with("# Technical brief: Website"));
        assert!(text.contains("Corporate site"));
    }

    #[tokio::test]
    async fn test_exports_are_manager_only() {
        let fx = Fixture::new().await;
        let project = fx.project_for(fx.cust.id).await;
        fx.task_in(project.id, fx.emp.id).await;

        for user in [&fx.cust, &fx.emp] {
            let err = fx
                .tracker
                .export_project(&fx.ctx(user), project.id, ExportKind::BudgetSheet)
                .await
                .unwrap_err();
            assert!(matches!(err, TrackerError::Forbidden { .. }));
        }
    }
}
