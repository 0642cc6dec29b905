//! Embed lifecycle: publish, update in place, and retire the single Discord message of a raid.
//!
//! - A raid without a live message gets a new one, seeded with the reaction buttons
//! - A raid whose message still exists is edited in place (reactions untouched)
//! - A stale message id (deleted externally, or unreachable) degrades to re-creation
//!
//! Calls for the same raid must be serialized by the caller.

use crate::domain::{DomainError, EmoteRegistry, MessageBody, Raid};
use crate::ports::{ChatGateway, EmbedRenderer, RaidStore};
use crate::shared::{ManagedChannel, RaidUrls};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What `publish_or_update` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Created { message_id: u64 },
    Updated { message_id: u64 },
}

pub struct EmbedService {
    chat: Arc<dyn ChatGateway>,
    raids: Arc<dyn RaidStore>,
    renderer: Arc<dyn EmbedRenderer>,
    emotes: Arc<EmoteRegistry>,
    channel: ManagedChannel,
    urls: RaidUrls,
}

impl EmbedService {
    pub fn new(
        chat: Arc<dyn ChatGateway>,
        raids: Arc<dyn RaidStore>,
        renderer: Arc<dyn EmbedRenderer>,
        emotes: Arc<EmoteRegistry>,
        channel: ManagedChannel,
        urls: RaidUrls,
    ) -> Self {
        Self {
            chat,
            raids,
            renderer,
            emotes,
            channel,
            urls,
        }
    }

    /// Render the raid and push it to Discord, creating the message if needed.
    pub async fn publish_or_update(&self, raid_id: i64) -> Result<PublishOutcome, DomainError> {
        let mut raid = self.raids.find(raid_id).await?;
        let subscriptions = self.raids.subscriptions(raid_id).await?;
        let body = self
            .renderer
            .render(&raid, &subscriptions, &self.urls.raid_url(raid.id));

        if let Some(message_id) = self.live_message_id(&raid).await {
            self.chat
                .edit_message(self.channel.channel_id, message_id, &body)
                .await?;
            debug!(raid_id, message_id, "raid embed updated");
            return Ok(PublishOutcome::Updated { message_id });
        }

        let message_id = self.create_message(&mut raid, &body).await?;
        Ok(PublishOutcome::Created { message_id })
    }

    /// Delete the raid's message (best effort) and clear the stored id.
    pub async fn remove(&self, raid_id: i64) -> Result<(), DomainError> {
        let mut raid = self.raids.find(raid_id).await?;
        let Some(message_id) = raid.discord_message_id else {
            return Ok(());
        };

        if let Err(e) = self
            .chat
            .delete_message(self.channel.channel_id, message_id)
            .await
        {
            warn!(raid_id, message_id, error = %e, "could not remove raid embed");
        }

        raid.discord_message_id = None;
        self.raids.save(&raid).await?;
        info!(raid_id, message_id, "raid embed removed");
        Ok(())
    }

    /// The stored message id, if that message can still be retrieved.
    /// Any retrieval failure is treated as "deleted externally".
    async fn live_message_id(&self, raid: &Raid) -> Option<u64> {
        let message_id = raid.discord_message_id?;
        match self
            .chat
            .fetch_message(self.channel.channel_id, message_id)
            .await
        {
            Ok(message) => Some(message.id),
            Err(e) => {
                warn!(raid_id = raid.id, message_id, error = %e, "raid embed not found, re-creating");
                None
            }
        }
    }

    /// Send a new message, seed reactions one at a time in registry order, then store its id.
    ///
    /// A failed seed deletes the half-seeded message (best effort) and leaves the stored id
    /// untouched, so the next publish re-creates the message with every button.
    async fn create_message(&self, raid: &mut Raid, body: &MessageBody) -> Result<u64, DomainError> {
        let message = self
            .chat
            .send_message(self.channel.channel_id, body)
            .await?;

        for emote in self.emotes.seed_order() {
            if let Err(e) = self
                .chat
                .add_reaction(self.channel.channel_id, message.id, emote)
                .await
            {
                warn!(raid_id = raid.id, message_id = message.id, emote = %emote, error = %e, "seeding failed, discarding new embed");
                self.discard(raid.id, message.id).await;
                return Err(e);
            }
        }

        raid.discord_message_id = Some(message.id);
        if let Err(e) = self.raids.save(raid).await {
            self.discard(raid.id, message.id).await;
            return Err(e);
        }

        info!(raid_id = raid.id, message_id = message.id, "raid embed created");
        Ok(message.id)
    }

    async fn discard(&self, raid_id: i64, message_id: u64) {
        if let Err(e) = self
            .chat
            .delete_message(self.channel.channel_id, message_id)
            .await
        {
            warn!(raid_id, message_id, error = %e, "could not delete unfinished raid embed");
        }
    }
}
