//! Discord event handler for serenity.
//!
//! Forwards reaction-add events to the reaction worker through a bounded channel.
//! All filtering happens in the dispatcher; the handler only maps and enqueues.

use crate::adapters::discord::mapper;
use crate::domain::ReactionEvent;
use serenity::all::{Context, EventHandler, GatewayIntents, Reaction, Ready};
use serenity::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub struct ReactionHandler {
    tx: mpsc::Sender<ReactionEvent>,
}

impl ReactionHandler {
    pub fn new(tx: mpsc::Sender<ReactionEvent>) -> Self {
        Self { tx }
    }

    /// Gateway intents the bot needs: guild metadata and reactions.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGE_REACTIONS
    }
}

#[async_trait]
impl EventHandler for ReactionHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            user = %ready.user.name,
            guilds = ready.guilds.len(),
            "Discord gateway ready"
        );
    }

    async fn reaction_add(&self, _ctx: Context, reaction: Reaction) {
        let Some(event) = mapper::reaction_event(&reaction) else {
            debug!(message_id = reaction.message_id.get(), "reaction without user, skipped");
            return;
        };
        // Waits when the queue is full.
        if self.tx.send(event).await.is_err() {
            warn!("reaction worker stopped, event dropped");
        }
    }
}
