//! Handle Discord login. Evaluated fresh on every authentication; nothing is cached.
//!
//! code -> access token -> identity -> guild membership -> local user -> roles

use crate::domain::{AuthorizationContext, DomainError};
use crate::ports::{ChatGateway, IdentityProvider, UserStore};
use crate::shared::ManagedChannel;
use crate::usecases::RoleBridge;
use std::sync::Arc;
use tracing::{debug, info};

pub struct LoginService {
    identity: Arc<dyn IdentityProvider>,
    chat: Arc<dyn ChatGateway>,
    users: Arc<dyn UserStore>,
    roles: RoleBridge,
    channel: ManagedChannel,
}

impl LoginService {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        chat: Arc<dyn ChatGateway>,
        users: Arc<dyn UserStore>,
        roles: RoleBridge,
        channel: ManagedChannel,
    ) -> Self {
        Self {
            identity,
            chat,
            users,
            roles,
            channel,
        }
    }

    /// Where to send the browser to start the OAuth flow.
    pub fn authorize_url(&self, state: &str) -> Result<String, DomainError> {
        self.identity.authorize_url(state)
    }

    /// Complete the OAuth code flow and log the caller in.
    pub async fn authenticate(&self, code: &str) -> Result<AuthorizationContext, DomainError> {
        let token = self.identity.exchange_code(code).await?;
        let identity = self.identity.fetch_identity(&token).await?;
        debug!(discord_id = identity.id, username = %identity.username, "identity fetched");
        self.login(identity.id).await
    }

    /// Log in an already verified Discord account.
    pub async fn login(&self, discord_id: u64) -> Result<AuthorizationContext, DomainError> {
        let guild_id = self.channel.guild_id;
        let name = self
            .chat
            .member_display_name(guild_id, discord_id)
            .await
            .map_err(|e| not_a_member(e, discord_id, guild_id))?;

        let user = self.users.save_or_update(discord_id, &name).await?;
        let role_names = self
            .chat
            .member_role_names(guild_id, discord_id)
            .await
            .map_err(|e| not_a_member(e, discord_id, guild_id))?;
        info!(user = %user.name, discord_id, roles = ?role_names, "discord roles");

        let roles = self.roles.roles_for(&role_names);
        info!(user = %user.name, %roles, "user logged in with roles");

        Ok(AuthorizationContext::new(user.id, user.name, roles))
    }
}

/// A member lookup that finds nobody means the caller is not in the guild.
fn not_a_member(e: DomainError, discord_id: u64, guild_id: u64) -> DomainError {
    match e {
        DomainError::NotFound(_) => DomainError::Unauthorized(format!(
            "discord user {} is not a member of guild {}",
            discord_id, guild_id
        )),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExternalIdentity;
    use crate::usecases::test_support::*;

    const OFFICER: u64 = 7;
    const RAIDER: u64 = 8;

    fn service(users: Arc<MemoryUserStore>) -> LoginService {
        service_with(users, FakeChat::default())
    }

    fn service_with(users: Arc<MemoryUserStore>, chat: FakeChat) -> LoginService {
        let chat = chat
            .with_member(OFFICER, "Jaina", &["Member", "Officer"])
            .with_member(RAIDER, "Thrall", &["Raider"]);
        LoginService::new(
            Arc::new(FakeIdentity {
                code: "abc".into(),
                identity: ExternalIdentity {
                    id: OFFICER,
                    username: "jaina".into(),
                    attributes: Default::default(),
                },
            }),
            Arc::new(chat),
            users,
            RoleBridge::new(["Raider".to_string()], ["Officer".to_string()]),
            ManagedChannel {
                guild_id: GUILD_ID,
                channel_id: CHANNEL_ID,
            },
        )
    }

    #[tokio::test]
    async fn officer_login_is_admin_and_user() {
        let users = Arc::new(MemoryUserStore::default());
        let ctx = service(Arc::clone(&users)).authenticate("abc").await.unwrap();

        assert!(ctx.is_admin());
        assert!(ctx.can_access());
        assert_eq!(ctx.user_name(), "Jaina");
        let stored = users.users.lock().unwrap().clone();
        assert_eq!(stored.len(), 1);
        assert!(ctx.is_user(stored[0].id));
        assert_eq!(stored[0].discord_id, OFFICER);
    }

    #[tokio::test]
    async fn repeated_login_updates_the_same_user() {
        let users = Arc::new(MemoryUserStore::default());
        let svc = service(Arc::clone(&users));

        let first = svc.login(RAIDER).await.unwrap();
        let second = svc.login(RAIDER).await.unwrap();

        assert_eq!(first.user_id(), second.user_id());
        assert_eq!(users.users.lock().unwrap().len(), 1);
        assert!(second.can_access());
        assert!(!second.is_admin());
    }

    #[tokio::test]
    async fn non_member_is_unauthorized_and_not_stored() {
        let users = Arc::new(MemoryUserStore::default());
        let err = service(Arc::clone(&users)).login(99).await.unwrap_err();

        assert!(matches!(err, DomainError::Unauthorized(_)));
        assert!(users.users.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bad_code_fails_in_the_identity_provider() {
        let err = service(Arc::new(MemoryUserStore::default()))
            .authenticate("wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Identity(_)));
    }

    #[tokio::test]
    async fn member_leaving_mid_login_is_unauthorized() {
        let chat = FakeChat {
            roles_missing_for: vec![RAIDER],
            ..Default::default()
        };
        let err = service_with(Arc::new(MemoryUserStore::default()), chat)
            .login(RAIDER)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Unauthorized(_)));
    }
}
