//! Reaction-to-action protocol: turns a raw reaction-add event into a semantic action.
//!
//! Each event is handled in one pass, no retries:
//! 1. drop reactions from the bot itself (seeding) or any other bot
//! 2. drop reactions outside the managed channel
//! 3. drop reactions on messages the bot did not author
//! 4. resolve custom emote -> class, else -> response (unicode and unknown emotes resolve to nothing)
//! 5. deliver to every listener of the resolved kind, exactly once each
//! 6. remove the user's reaction so the embed behaves like a set of stateless buttons
//!
//! Dispatch always happens before removal. Events only read current message state and the
//! removal is idempotent, so concurrent handling of events for the same message is safe.

use crate::domain::{CharacterClass, EmoteRef, EmoteRegistry, ReactionEvent, SubscriptionResponse};
use crate::ports::{ChatGateway, ClassChoiceListener, ResponseListener};
use crate::shared::ManagedChannel;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

/// Publish-subscribe registry with one typed channel per action kind.
#[derive(Default)]
pub struct ReactionListeners {
    class_choice: RwLock<Vec<Arc<dyn ClassChoiceListener>>>,
    response: RwLock<Vec<Arc<dyn ResponseListener>>>,
}

impl ReactionListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe_class_choice(&self, listener: Arc<dyn ClassChoiceListener>) {
        self.class_choice
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    pub fn subscribe_response(&self, listener: Arc<dyn ResponseListener>) {
        self.response
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    // Snapshots so no lock is held across an await.
    fn class_choice_listeners(&self) -> Vec<Arc<dyn ClassChoiceListener>> {
        self.class_choice
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn response_listeners(&self) -> Vec<Arc<dyn ResponseListener>> {
        self.response
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// How a single event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    IgnoredBot,
    IgnoredChannel,
    IgnoredForeignMessage,
    /// Unicode emoji or a custom emote outside the registry.
    Unresolved,
    ClassChoice(CharacterClass),
    Response(SubscriptionResponse),
}

/// Semantic value resolved from an emote.
enum Action {
    Class(CharacterClass),
    Response(SubscriptionResponse),
}

pub struct ReactionDispatcher {
    chat: Arc<dyn ChatGateway>,
    emotes: Arc<EmoteRegistry>,
    listeners: Arc<ReactionListeners>,
    channel: ManagedChannel,
}

impl ReactionDispatcher {
    pub fn new(
        chat: Arc<dyn ChatGateway>,
        emotes: Arc<EmoteRegistry>,
        listeners: Arc<ReactionListeners>,
        channel: ManagedChannel,
    ) -> Self {
        Self {
            chat,
            emotes,
            listeners,
            channel,
        }
    }

    pub async fn dispatch(&self, event: &ReactionEvent) -> DispatchOutcome {
        if event.user_is_bot || event.user_id == self.chat.bot_user_id() {
            return DispatchOutcome::IgnoredBot;
        }
        if event.channel_id != self.channel.channel_id {
            return DispatchOutcome::IgnoredChannel;
        }

        match self
            .chat
            .fetch_message(event.channel_id, event.message_id)
            .await
        {
            Ok(message) if message.author_id == self.chat.bot_user_id() => {}
            Ok(_) => return DispatchOutcome::IgnoredForeignMessage,
            Err(e) => {
                debug!(message_id = event.message_id, error = %e, "reacted message unavailable, dropping event");
                return DispatchOutcome::IgnoredForeignMessage;
            }
        }

        let outcome = match self.resolve(&event.emote) {
            Some(Action::Class(class)) => {
                self.deliver_class_choice(event, class).await;
                DispatchOutcome::ClassChoice(class)
            }
            Some(Action::Response(response)) => {
                self.deliver_response(event, response).await;
                DispatchOutcome::Response(response)
            }
            None => {
                debug!(message_id = event.message_id, emote = ?event.emote, "reaction has no action");
                DispatchOutcome::Unresolved
            }
        };

        self.remove_user_reaction(event).await;
        outcome
    }

    fn resolve(&self, emote: &EmoteRef) -> Option<Action> {
        let EmoteRef::Custom { id, .. } = emote else {
            return None;
        };
        self.emotes
            .class_for(*id)
            .map(Action::Class)
            .or_else(|| self.emotes.response_for(*id).map(Action::Response))
    }

    async fn deliver_class_choice(&self, event: &ReactionEvent, class: CharacterClass) {
        for listener in self.listeners.class_choice_listeners() {
            if let Err(e) = listener
                .on_class_choice(event.user_id, event.message_id, class)
                .await
            {
                warn!(user_id = event.user_id, message_id = event.message_id, %class, error = %e, "class choice listener failed");
            }
        }
    }

    async fn deliver_response(&self, event: &ReactionEvent, response: SubscriptionResponse) {
        for listener in self.listeners.response_listeners() {
            if let Err(e) = listener
                .on_response(event.user_id, event.message_id, response)
                .await
            {
                warn!(user_id = event.user_id, message_id = event.message_id, %response, error = %e, "response listener failed");
            }
        }
    }

    async fn remove_user_reaction(&self, event: &ReactionEvent) {
        if let Err(e) = self
            .chat
            .remove_reaction(
                event.channel_id,
                event.message_id,
                event.user_id,
                &event.emote,
            )
            .await
        {
            warn!(user_id = event.user_id, message_id = event.message_id, error = %e, "could not remove user reaction");
        }
    }
}
