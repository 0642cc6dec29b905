//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{
    DomainError, Emote, EmoteRef, ExternalIdentity, ExternalMessage, LocalUser, MessageBody, Raid,
    RaidSubscription,
};
use secrecy::Secret;

/// Raid store. The core only touches `discord_message_id`; everything else is domain-owned.
#[async_trait::async_trait]
pub trait RaidStore: Send + Sync {
    /// Returns `DomainError::NotFound` when no raid has this id.
    async fn find(&self, raid_id: i64) -> Result<Raid, DomainError>;

    async fn save(&self, raid: &Raid) -> Result<(), DomainError>;

    /// Participant answers for a raid, in insertion order.
    async fn subscriptions(&self, raid_id: i64) -> Result<Vec<RaidSubscription>, DomainError>;

    /// Raid whose embed is the given Discord message, if any.
    async fn find_by_message_id(&self, message_id: u64) -> Result<Option<Raid>, DomainError>;

    /// Insert or replace the answer of `subscription.user_id` for `subscription.raid_id`.
    async fn save_subscription(&self, subscription: &RaidSubscription) -> Result<(), DomainError>;
}

/// Local user records, keyed by Discord id.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Create the user or refresh its display name. Returns the stored record.
    async fn save_or_update(&self, discord_id: u64, name: &str) -> Result<LocalUser, DomainError>;

    async fn find_by_discord_id(&self, discord_id: u64) -> Result<Option<LocalUser>, DomainError>;
}

/// Builds the embed for a raid. Pure; no I/O.
pub trait EmbedRenderer: Send + Sync {
    fn render(&self, raid: &Raid, subscriptions: &[RaidSubscription], raid_url: &str)
    -> MessageBody;
}

/// Discord REST surface. Every call is a remote round-trip bounded by the adapter's timeout.
///
/// Adapters must return `DomainError::NotFound` for unknown messages/members and
/// `DomainError::RemoteTransient` for everything else.
#[async_trait::async_trait]
pub trait ChatGateway: Send + Sync {
    /// The bot's own user id, resolved when the adapter is built.
    fn bot_user_id(&self) -> u64;

    async fn fetch_message(
        &self,
        channel_id: u64,
        message_id: u64,
    ) -> Result<ExternalMessage, DomainError>;

    async fn send_message(
        &self,
        channel_id: u64,
        body: &MessageBody,
    ) -> Result<ExternalMessage, DomainError>;

    async fn edit_message(
        &self,
        channel_id: u64,
        message_id: u64,
        body: &MessageBody,
    ) -> Result<(), DomainError>;

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<(), DomainError>;

    async fn add_reaction(
        &self,
        channel_id: u64,
        message_id: u64,
        emote: &Emote,
    ) -> Result<(), DomainError>;

    /// Remove one user's reaction (not the whole emote) from a message.
    async fn remove_reaction(
        &self,
        channel_id: u64,
        message_id: u64,
        user_id: u64,
        emote: &EmoteRef,
    ) -> Result<(), DomainError>;

    /// Effective name of a guild member. `NotFound` if the user is not in the guild.
    async fn member_display_name(&self, guild_id: u64, user_id: u64)
    -> Result<String, DomainError>;

    /// Names of the guild roles the member holds.
    async fn member_role_names(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Vec<String>, DomainError>;

    async fn send_private_message(&self, user_id: u64, text: &str) -> Result<(), DomainError>;
}

/// OAuth2 authorization-code identity provider (Discord).
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authorization URL the browser is redirected to.
    fn authorize_url(&self, state: &str) -> Result<String, DomainError>;

    /// Exchange the callback code for an access token.
    async fn exchange_code(&self, code: &str) -> Result<Secret<String>, DomainError>;

    /// Fetch the caller's identity with the access token.
    async fn fetch_identity(
        &self,
        access_token: &Secret<String>,
    ) -> Result<ExternalIdentity, DomainError>;
}
