//! Project discussion

use pt_auth::{Policy, RequestContext};
use pt_core::result::TrackerResult;
use pt_core::traits::Id;
use pt_models::{NewProjectMessage, PostMessageInput, ProjectMessage};
use pt_notifications::Notice;
use tracing::{info, instrument};

use crate::tracker::{notify, Tracker};
use crate::validation::validate;

impl Tracker {
    /// Post to a visible project. Customer messages go to the PM, everyone
    /// else's go to the customer. Only customers may flag a revision request.
    #[instrument(skip(self, ctx, input))]
    pub async fn post_message(
        &self,
        ctx: &RequestContext,
        project_id: Id,
        input: PostMessageInput,
    ) -> TrackerResult<ProjectMessage> {
        let user = ctx.require()?;
        validate(&input)?;
        let project = self.project_for(user, project_id).await?;

        let is_revision = input.is_revision && Policy::may_flag_revision(user);
        let recipient = if user.is_customer() {
            project.pm_id
        } else {
            Some(project.customer_id)
        };

        let mut tx = self.store.begin().await?;
        let message = tx
            .insert_message(NewProjectMessage {
                project_id,
                sender_id: user.id,
                content: input.content,
                is_revision,
            })
            .await?;
        if let Some(recipient) = recipient.filter(|id| *id != user.id) {
            notify(&mut tx, Notice::message_posted(recipient, &project, is_revision)).await?;
        }
        tx.commit().await?;

        info!(message_id = message.id, project_id, is_revision, "message posted");
        Ok(message)
    }

    /// Chronological discussion of a visible project
    pub async fn project_messages(
        &self,
        ctx: &RequestContext,
        project_id: Id,
    ) -> TrackerResult<Vec<ProjectMessage>> {
        let project = self.project_for(ctx.require()?, project_id).await?;
        Ok(self.store.list_messages(project.id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use pt_core::error::TrackerError;

    fn message(content: &str, is_revision: bool) -> PostMessageInput {
        PostMessageInput {
            content: content.into(),
            is_revision,
        }
    }

    #[tokio::test]
    async fn test_customer_message_goes_to_pm() {
        let fx = Fixture::new().await;
        let project = fx.project_for(fx.cust.id).await;

        let posted = fx
            .tracker
            .post_message(&fx.ctx(&fx.cust), project.id, message("Please change the logo", true))
            .await
            .unwrap();
        assert!(posted.is_revision);

        let inbox = fx.notifications_of(fx.pm.id).await;
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].message, "Revision requested in project Website");
        assert!(fx.notifications_of(fx.cust.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_staff_message_goes_to_customer_without_revision_flag() {
        let fx = Fixture::new().await;
        let project = fx.project_for(fx.cust.id).await;

        let posted = fx
            .tracker
            .post_message(&fx.ctx(&fx.head), project.id, message("Draft is ready", true))
            .await
            .unwrap();
        assert!(!posted.is_revision);

        let inbox = fx.notifications_of(fx.cust.id).await;
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].message, "New message in project Website");
        assert_eq!(inbox[0].link, Some(project.link()));
    }

    #[tokio::test]
    async fn test_messages_need_a_visible_project() {
        let fx = Fixture::new().await;
        let foreign = fx.project_for(fx.other_cust.id).await;

        let err = fx
            .tracker
            .post_message(&fx.ctx(&fx.cust), foreign.id, message("Hello", false))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::NotFound { .. }));

        let err = fx
            .tracker
            .post_message(&fx.ctx(&fx.emp), foreign.id, message("Hello", false))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::NotFound { .. }));

        let err = fx
            .tracker
            .post_message(&fx.ctx(&fx.other_cust), foreign.id, message("", false))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::Validation(ref e) if e.has_error("content")));
    }

    #[tokio::test]
    async fn test_messages_are_chronological() {
        let fx = Fixture::new().await;
        let project = fx.project_for(fx.cust.id).await;
        let cust = fx.ctx(&fx.cust);
        let pm = fx.ctx(&fx.pm);

        fx.tracker.post_message(&cust, project.id, message("first", false)).await.unwrap();
        fx.tracker.post_message(&pm, project.id, message("second", false)).await.unwrap();
        fx.tracker.post_message(&cust, project.id, message("third", false)).await.unwrap();

        let contents: Vec<_> = fx
            .tracker
            .project_messages(&cust, project.id)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }
}
