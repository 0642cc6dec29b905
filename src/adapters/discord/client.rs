//! Implements ChatGateway using serenity's HTTP client.
//!
//! Every REST call is bounded by `tokio::time::timeout`; an elapsed timeout is a
//! RemoteTransient like any other platform failure. No retries here: callers decide.

use crate::adapters::discord::mapper;
use crate::domain::{DomainError, Emote, EmoteRef, ExternalMessage, MessageBody};
use crate::ports::ChatGateway;
use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serenity::all::{ChannelId, CreateMessage, EditMessage, GuildId, MessageId, UserId};
use serenity::http::Http;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Discord gateway adapter. The `Http` client is shared with the serenity gateway client.
pub struct SerenityGateway {
    http: Arc<Http>,
    bot_user_id: u64,
    timeout: Duration,
}

impl SerenityGateway {
    /// Build the REST client and resolve the bot's own identity.
    pub async fn connect(token: &Secret<String>, timeout: Duration) -> Result<Self, DomainError> {
        let http = Arc::new(Http::new(token.expose_secret()));
        let mut gateway = Self {
            http,
            bot_user_id: 0,
            timeout,
        };
        let me = gateway
            .bounded("get_current_user", gateway.http.get_current_user())
            .await?;
        gateway.bot_user_id = me.id.get();
        info!(bot_user_id = gateway.bot_user_id, name = %me.name, "Discord bot identity resolved");
        Ok(gateway)
    }

    pub fn http(&self) -> Arc<Http> {
        Arc::clone(&self.http)
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, serenity::Error>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(|e| mapper::map_error(op, e)),
            Err(_) => Err(DomainError::RemoteTransient(format!(
                "{}: timed out after {:?}",
                op, self.timeout
            ))),
        }
    }
}

#[async_trait]
impl ChatGateway for SerenityGateway {
    fn bot_user_id(&self) -> u64 {
        self.bot_user_id
    }

    async fn fetch_message(
        &self,
        channel_id: u64,
        message_id: u64,
    ) -> Result<ExternalMessage, DomainError> {
        let message = self
            .bounded(
                "fetch_message",
                ChannelId::new(channel_id).message(&*self.http, MessageId::new(message_id)),
            )
            .await?;
        Ok(mapper::external_message(&message))
    }

    async fn send_message(
        &self,
        channel_id: u64,
        body: &MessageBody,
    ) -> Result<ExternalMessage, DomainError> {
        let builder = CreateMessage::new().embed(mapper::embed(body));
        let message = self
            .bounded(
                "send_message",
                ChannelId::new(channel_id).send_message(&*self.http, builder),
            )
            .await?;
        debug!(channel_id, message_id = message.id.get(), "message sent");
        Ok(mapper::external_message(&message))
    }

    async fn edit_message(
        &self,
        channel_id: u64,
        message_id: u64,
        body: &MessageBody,
    ) -> Result<(), DomainError> {
        let builder = EditMessage::new().embed(mapper::embed(body));
        self.bounded(
            "edit_message",
            ChannelId::new(channel_id).edit_message(&*self.http, MessageId::new(message_id), builder),
        )
        .await?;
        Ok(())
    }

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<(), DomainError> {
        self.bounded(
            "delete_message",
            ChannelId::new(channel_id).delete_message(&*self.http, MessageId::new(message_id)),
        )
        .await
    }

    async fn add_reaction(
        &self,
        channel_id: u64,
        message_id: u64,
        emote: &Emote,
    ) -> Result<(), DomainError> {
        let reaction = mapper::reaction_for_emote(emote);
        self.bounded(
            "add_reaction",
            self.http.create_reaction(
                ChannelId::new(channel_id),
                MessageId::new(message_id),
                &reaction,
            ),
        )
        .await
    }

    async fn remove_reaction(
        &self,
        channel_id: u64,
        message_id: u64,
        user_id: u64,
        emote: &EmoteRef,
    ) -> Result<(), DomainError> {
        let reaction = mapper::reaction_for_ref(emote);
        self.bounded(
            "remove_reaction",
            self.http.delete_reaction(
                ChannelId::new(channel_id),
                MessageId::new(message_id),
                UserId::new(user_id),
                &reaction,
            ),
        )
        .await
    }

    async fn member_display_name(&self, guild_id: u64, user_id: u64) -> Result<String, DomainError> {
        let member = self
            .bounded(
                "get_member",
                self.http
                    .get_member(GuildId::new(guild_id), UserId::new(user_id)),
            )
            .await?;
        Ok(member.display_name().to_string())
    }

    async fn member_role_names(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Vec<String>, DomainError> {
        let guild = GuildId::new(guild_id);
        let member = self
            .bounded("get_member", self.http.get_member(guild, UserId::new(user_id)))
            .await?;
        let roles = self
            .bounded("get_guild_roles", self.http.get_guild_roles(guild))
            .await?;
        Ok(roles
            .into_iter()
            .filter(|r| member.roles.contains(&r.id))
            .map(|r| r.name)
            .collect())
    }

    async fn send_private_message(&self, user_id: u64, text: &str) -> Result<(), DomainError> {
        let dm = self
            .bounded(
                "create_dm_channel",
                UserId::new(user_id).create_dm_channel(&*self.http),
            )
            .await?;
        self.bounded("send_private_message", dm.id.say(&*self.http, text))
            .await?;
        debug!(user_id, "private message sent");
        Ok(())
    }
}
