//! Leads: customer submissions and the manager decision on them

use bytes::Bytes;
use chrono::{NaiveDate, Utc};
use pt_auth::{Action, CurrentUser, Policy, RequestContext};
use pt_core::result::{Transition, TrackerResult};
use pt_core::traits::Id;
use pt_core::types::{LeadStatus, ProjectStatus, Role};
use pt_files::storage_key;
use pt_models::{CreateLeadInput, Lead, NewLead, NewProject};
use pt_notifications::Notice;
use tracing::{debug, info, instrument, warn};

use crate::tracker::{actor_name, not_found, notify, Tracker};
use crate::validation::validate;

const ATTACHMENT_PREFIX: &str = "leads";

/// A file uploaded together with a lead or document
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Bytes,
}

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl Tracker {
    /// Submit a lead. Every head and PM is told about it.
    #[instrument(skip(self, ctx, input, attachment), fields(title = %input.title))]
    pub async fn create_lead(
        &self,
        ctx: &RequestContext,
        input: CreateLeadInput,
        attachment: Option<Attachment>,
    ) -> TrackerResult<Lead> {
        let user = ctx.require()?;
        Policy::authorize(user, Action::CreateLead)?;
        validate(&input)?;

        let attachment_key = match attachment {
            Some(file) => {
                self.files.check_size(file.bytes.len())?;
                let key = storage_key(ATTACHMENT_PREFIX, &file.filename);
                self.files.put(&key, file.bytes).await?;
                Some(key)
            }
            None => None,
        };

        match self.insert_lead(user, input, attachment_key.clone()).await {
            Ok(lead) => {
                info!(lead_id = lead.id, customer_id = user.id, "lead submitted");
                Ok(lead)
            }
            Err(err) => {
                if let Some(key) = attachment_key {
                    if let Err(cleanup) = self.files.delete(&key).await {
                        warn!(%key, error = %cleanup, "orphaned lead attachment");
                    }
                }
                Err(err)
            }
        }
    }

    async fn insert_lead(
        &self,
        user: &CurrentUser,
        input: CreateLeadInput,
        attachment_key: Option<String>,
    ) -> TrackerResult<Lead> {
        let mut tx = self.store.begin().await?;
        let lead = tx
            .insert_lead(NewLead {
                title: input.title.trim().to_string(),
                description: input.description,
                budget: input.budget,
                desired_deadline: input.desired_deadline,
                customer_id: user.id,
                attachment_key,
            })
            .await?;

        let customer_name = actor_name(&mut tx, user).await?;
        for manager in tx.list_users(&[Role::Head, Role::Pm]).await? {
            notify(&mut tx, Notice::lead_submitted(manager.id, &lead, &customer_name)).await?;
        }
        tx.commit().await?;
        Ok(lead)
    }

    /// Turn a new lead into a project led by the approving manager.
    ///
    /// A lead that already left `New` is returned as `Unchanged` and nothing
    /// is written, so a repeated or concurrent approval creates one project.
    #[instrument(skip(self, ctx))]
    pub async fn approve_lead(&self, ctx: &RequestContext, lead_id: Id) -> TrackerResult<Transition<Lead>> {
        let user = ctx.require()?;
        Policy::authorize(user, Action::ApproveLead)?;

        let mut tx = self.store.begin().await?;
        let mut lead = tx
            .lock_lead(lead_id)
            .await?
            .ok_or_else(|| not_found("Lead", lead_id))?;
        if !lead.status.is_pending() {
            debug!(lead_id, status = %lead.status, "lead already decided");
            return Ok(Transition::Unchanged(lead));
        }

        let project = tx
            .insert_project(NewProject {
                title: lead.title.clone(),
                description: lead.description.clone(),
                status: ProjectStatus::New,
                start_date: today(),
                end_date: lead.desired_deadline,
                planned_budget: lead.budget,
                customer_id: lead.customer_id,
                pm_id: Some(user.id),
            })
            .await?;
        tx.set_lead_status(lead_id, LeadStatus::Approved, Some(project.id))
            .await?;
        lead.status = LeadStatus::Approved;
        lead.project_id = Some(project.id);

        notify(&mut tx, Notice::lead_approved(&lead, &project)).await?;
        tx.commit().await?;

        info!(lead_id, project_id = project.id, "lead approved");
        Ok(Transition::Applied(lead))
    }

    /// Reject a lead in any state. An approved lead keeps its project.
    #[instrument(skip(self, ctx))]
    pub async fn reject_lead(&self, ctx: &RequestContext, lead_id: Id) -> TrackerResult<Lead> {
        let user = ctx.require()?;
        Policy::authorize(user, Action::RejectLead)?;

        let mut tx = self.store.begin().await?;
        let mut lead = tx
            .lock_lead(lead_id)
            .await?
            .ok_or_else(|| not_found("Lead", lead_id))?;
        tx.set_lead_status(lead_id, LeadStatus::Rejected, None).await?;
        lead.status = LeadStatus::Rejected;

        notify(&mut tx, Notice::lead_rejected(&lead)).await?;
        tx.commit().await?;

        info!(lead_id, "lead rejected");
        Ok(lead)
    }

    /// Attachment of a visible lead
    pub async fn lead_attachment(&self, ctx: &RequestContext, lead_id: Id) -> TrackerResult<crate::Download> {
        let user = ctx.require()?;
        let lead = self.lead_for(user, lead_id).await?;
        let key = lead
            .attachment_key
            .ok_or_else(|| not_found("Attachment", lead_id))?;
        self.download(&key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use pt_auth::Scope;
    use pt_core::error::TrackerError;
    use pt_db::Store;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn input() -> CreateLeadInput {
        CreateLeadInput {
            title: "Mobile app".into(),
            description: "iOS and Android".into(),
            budget: Decimal::new(500_000, 0),
            desired_deadline: NaiveDate::from_ymd_opt(2024, 12, 31),
        }
    }

    #[tokio::test]
    async fn test_create_lead_notifies_every_manager() {
        let fx = Fixture::new().await;
        let lead = fx
            .tracker
            .create_lead(&fx.ctx(&fx.cust), input(), None)
            .await
            .unwrap();
        assert_eq!(lead.status, LeadStatus::New);
        assert_eq!(lead.customer_id, fx.cust.id);
        assert!(lead.project_id.is_none());

        for manager in [&fx.head, &fx.pm] {
            let inbox = fx.notifications_of(manager.id).await;
            assert_eq!(inbox.len(), 1);
            assert_eq!(inbox[0].message, "New lead from Vector LLC (Customer): Mobile app");
            assert_eq!(inbox[0].link.as_deref(), Some("/leads"));
        }
        assert!(fx.notifications_of(fx.emp.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_create_lead_stores_attachment() {
        let fx = Fixture::new().await;
        let ctx = fx.ctx(&fx.cust);
        let lead = fx
            .tracker
            .create_lead(
                &ctx,
                input(),
                Some(Attachment {
                    filename: "requirements.pdf".into(),
                    bytes: Bytes::from_static(b"%PDF-1.4"),
                }),
            )
            .await
            .unwrap();

        let key = lead.attachment_key.clone().unwrap();
        assert!(key.starts_with("leads/"));
        assert!(key.ends_with("_requirements.pdf"));

        let download = fx.tracker.lead_attachment(&ctx, lead.id).await.unwrap();
        assert_eq!(download.filename, "requirements.pdf");
        assert_eq!(download.content_type, "application/pdf");
        assert_eq!(&download.bytes[..], b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_only_customers_submit_leads() {
        let fx = Fixture::new().await;
        for user in [&fx.head, &fx.pm, &fx.emp] {
            let err = fx.tracker.create_lead(&fx.ctx(user), input(), None).await.unwrap_err();
            assert!(matches!(err, TrackerError::Forbidden { .. }));
        }

        let mut negative = input();
        negative.budget = Decimal::new(-10, 0);
        let err = fx
            .tracker
            .create_lead(&fx.ctx(&fx.cust), negative, None)
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::Validation(ref e) if e.has_error("budget")));
    }

    #[tokio::test]
    async fn test_approve_creates_project_once() {
        let fx = Fixture::new().await;
        let lead = fx.lead_from(fx.cust.id).await;
        let pm = fx.ctx(&fx.pm);

        let first = fx.tracker.approve_lead(&pm, lead.id).await.unwrap();
        assert!(first.is_applied());
        let approved = first.into_value();
        assert_eq!(approved.status, LeadStatus::Approved);
        let project_id = approved.project_id.unwrap();

        let projects = fx.store.list_projects(Scope::All).await.unwrap();
        assert_eq!(projects.len(), 1);
        let project = &projects[0];
        assert_eq!(project.id, project_id);
        assert_eq!(project.title, "Mobile app");
        assert_eq!(project.description, "iOS and Android");
        assert_eq!(project.customer_id, fx.cust.id);
        assert_eq!(project.pm_id, Some(fx.pm.id));
        assert_eq!(project.start_date, today());
        assert_eq!(project.end_date, NaiveDate::from_ymd_opt(2024, 12, 31));
        assert_eq!(project.planned_budget, Decimal::new(500_000, 0));
        assert_eq!(project.status, ProjectStatus::New);

        let inbox = fx.notifications_of(fx.cust.id).await;
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].message, "Your lead 'Mobile app' was approved. Project created.");
        assert_eq!(inbox[0].link, Some(format!("/projects/{}", project_id)));

        // a second approval, even by another manager, changes nothing
        let second = fx.tracker.approve_lead(&fx.ctx(&fx.head), lead.id).await.unwrap();
        assert!(!second.is_applied());
        assert_eq!(second.value().project_id, Some(project_id));
        assert_eq!(fx.store.list_projects(Scope::All).await.unwrap().len(), 1);
        assert_eq!(fx.notifications_of(fx.cust.id).await.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_approvals_create_one_project() {
        let fx = Arc::new(Fixture::new().await);
        let lead = fx.lead_from(fx.cust.id).await;

        let handles: Vec<_> = [fx.head.clone(), fx.pm.clone()]
            .into_iter()
            .map(|manager| {
                let fx = fx.clone();
                tokio::spawn(async move {
                    fx.tracker.approve_lead(&fx.ctx(&manager), lead.id).await.unwrap()
                })
            })
            .collect();

        let mut applied = 0;
        for handle in handles {
            if handle.await.unwrap().is_applied() {
                applied += 1;
            }
        }
        assert_eq!(applied, 1);
        assert_eq!(fx.store.list_projects(Scope::All).await.unwrap().len(), 1);
        assert_eq!(fx.notifications_of(fx.cust.id).await.len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_lead_cannot_be_approved() {
        let fx = Fixture::new().await;
        let lead = fx.lead_from(fx.cust.id).await;
        let head = fx.ctx(&fx.head);

        let rejected = fx.tracker.reject_lead(&head, lead.id).await.unwrap();
        assert_eq!(rejected.status, LeadStatus::Rejected);
        let inbox = fx.notifications_of(fx.cust.id).await;
        assert_eq!(inbox[0].message, "Your lead 'Mobile app' was rejected.");
        assert_eq!(inbox[0].link.as_deref(), Some("/leads"));

        let outcome = fx.tracker.approve_lead(&head, lead.id).await.unwrap();
        assert!(!outcome.is_applied());
        assert_eq!(outcome.value().status, LeadStatus::Rejected);
        assert!(fx.store.list_projects(Scope::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reject_after_approval_keeps_project() {
        let fx = Fixture::new().await;
        let lead = fx.lead_from(fx.cust.id).await;
        let pm = fx.ctx(&fx.pm);

        let project_id = fx
            .tracker
            .approve_lead(&pm, lead.id)
            .await
            .unwrap()
            .into_value()
            .project_id;
        fx.tracker.reject_lead(&pm, lead.id).await.unwrap();

        let stored = fx.store.find_lead(Scope::All, lead.id).await.unwrap().unwrap();
        assert_eq!(stored.status, LeadStatus::Rejected);
        assert_eq!(stored.project_id, project_id);
    }

    #[tokio::test]
    async fn test_decisions_are_manager_only() {
        let fx = Fixture::new().await;
        let lead = fx.lead_from(fx.cust.id).await;

        for user in [&fx.emp, &fx.cust] {
            let ctx = fx.ctx(user);
            assert!(matches!(
                fx.tracker.approve_lead(&ctx, lead.id).await.unwrap_err(),
                TrackerError::Forbidden { .. }
            ));
            assert!(matches!(
                fx.tracker.reject_lead(&ctx, lead.id).await.unwrap_err(),
                TrackerError::Forbidden { .. }
            ));
        }
        let stored = fx.store.find_lead(Scope::All, lead.id).await.unwrap().unwrap();
        assert_eq!(stored.status, LeadStatus::New);

        let err = fx.tracker.approve_lead(&fx.ctx(&fx.pm), 9999).await.unwrap_err();
        assert!(matches!(err, TrackerError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_customer_sees_only_own_leads() {
        let fx = Fixture::new().await;
        let own = fx.lead_from(fx.cust.id).await;
        let foreign = fx.lead_from(fx.other_cust.id).await;
        let ctx = fx.ctx(&fx.cust);

        let leads = fx.tracker.visible_leads(&ctx).await.unwrap();
        assert_eq!(leads.iter().map(|l| l.id).collect::<Vec<_>>(), vec![own.id]);
        assert!(matches!(
            fx.tracker.lead(&ctx, foreign.id).await.unwrap_err(),
            TrackerError::NotFound { .. }
        ));
    }
}
