//! Sessions, profiles and staff reports

use pt_auth::{hash_password, verify_password, Action, AuthError, CurrentUser, Policy, RequestContext};
use pt_core::result::TrackerResult;
use pt_core::types::Role;
use pt_db::WorkloadEntry;
use pt_models::{NewUser, ProfileUpdate, User, UserSummary};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::tracker::{not_found, Tracker};
use crate::validation::validate;

/// A signed session token and the user it was issued for
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

impl Tracker {
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> TrackerResult<LoginOutcome> {
        let user = match self.store.find_user_by_username(username.trim()).await? {
            Some(user) if verify_password(password, &user.password_hash) => user,
            _ => {
                debug!("login rejected");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let token = self
            .jwt
            .create_token(&CurrentUser::from(&user), self.token_ttl_seconds)
            .map_err(AuthError::from)?;
        info!(user_id = user.id, role = %user.role, "user logged in");
        Ok(LoginOutcome { token, user })
    }

    /// Resolve a session token into a request context
    pub fn authenticate(&self, token: &str) -> TrackerResult<RequestContext> {
        let user = self.jwt.current_user(token).map_err(AuthError::from)?;
        Ok(RequestContext::user(user))
    }

    pub async fn me(&self, ctx: &RequestContext) -> TrackerResult<User> {
        let user = ctx.require()?;
        self.store
            .find_user(user.id)
            .await?
            .ok_or_else(|| not_found("User", user.id))
    }

    #[instrument(skip(self, ctx, update))]
    pub async fn update_profile(&self, ctx: &RequestContext, update: ProfileUpdate) -> TrackerResult<User> {
        let user = ctx.require()?;
        let update = update.normalized();
        validate(&update)?;

        let mut tx = self.store.begin().await?;
        let updated = tx.update_user_profile(user.id, &update).await?;
        tx.commit().await?;

        info!(user_id = user.id, "profile updated");
        Ok(updated)
    }

    /// Create an account with a hashed password. Used by seeding.
    pub(crate) async fn register(
        &self,
        username: &str,
        password: &str,
        full_name: &str,
        email: &str,
        position: &str,
        role: Role,
    ) -> TrackerResult<User> {
        let password_hash = hash_password(password)?;
        let user = self
            .store
            .insert_user(NewUser {
                username: username.to_string(),
                password_hash,
                full_name: full_name.to_string(),
                email: Some(email.to_string()),
                phone: None,
                position: Some(position.to_string()),
                role,
            })
            .await?;
        Ok(user)
    }

    /// Active and total task counts per employee
    #[instrument(skip(self, ctx))]
    pub async fn workload(&self, ctx: &RequestContext) -> TrackerResult<Vec<WorkloadEntry>> {
        let user = ctx.require()?;
        Policy::authorize(user, Action::ViewWorkload)?;
        Ok(self.store.workload().await?)
    }

    pub async fn employees(&self, ctx: &RequestContext) -> TrackerResult<Vec<UserSummary>> {
        let user = ctx.require()?;
        Policy::authorize(user, Action::ViewEmployees)?;
        Ok(self
            .store
            .list_users(&[Role::Employee])
            .await?
            .iter()
            .map(User::summary)
            .collect())
    }

    /// Users that can be picked as a project's customer
    pub async fn customers(&self, ctx: &RequestContext) -> TrackerResult<Vec<UserSummary>> {
        let user = ctx.require()?;
        Policy::authorize(user, Action::CreateProject)?;
        Ok(self
            .store
            .list_users(&[Role::Customer])
            .await?
            .iter()
            .map(User::summary)
            .collect())
    }
}
