//! Domain listener: records clicks on a raid embed as subscriptions, then re-renders the embed.

use crate::domain::{CharacterClass, DomainError, Raid, RaidSubscription, SubscriptionResponse};
use crate::ports::{ClassChoiceListener, RaidStore, ResponseListener, UserStore};
use crate::usecases::EmbedService;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// What a single click changes on the participant's subscription.
#[derive(Clone, Copy)]
enum Change {
    Class(CharacterClass),
    Response(SubscriptionResponse),
}

pub struct SignupListener {
    raids: Arc<dyn RaidStore>,
    users: Arc<dyn UserStore>,
    embeds: Arc<EmbedService>,
    // Serializes read-modify-publish so two clicks on one raid cannot race the embed.
    gate: Mutex<()>,
}

impl SignupListener {
    pub fn new(
        raids: Arc<dyn RaidStore>,
        users: Arc<dyn UserStore>,
        embeds: Arc<EmbedService>,
    ) -> Self {
        Self {
            raids,
            users,
            embeds,
            gate: Mutex::new(()),
        }
    }

    async fn apply(
        &self,
        discord_user_id: u64,
        message_id: u64,
        change: Change,
    ) -> Result<(), DomainError> {
        let _guard = self.gate.lock().await;

        let Some(raid) = self.raids.find_by_message_id(message_id).await? else {
            debug!(message_id, "click on a message that is not a raid embed");
            return Ok(());
        };
        let Some(user) = self.users.find_by_discord_id(discord_user_id).await? else {
            debug!(discord_user_id, raid_id = raid.id, "click from a user who never logged in");
            return Ok(());
        };

        let current = self.current_subscription(&raid, user.id).await?;
        let subscription = match (current, change) {
            (Some(mut s), Change::Class(class)) => {
                s.character_class = Some(class);
                s
            }
            (Some(mut s), Change::Response(response)) => {
                s.response = response;
                s
            }
            (None, change) => RaidSubscription {
                raid_id: raid.id,
                user_id: user.id,
                user_name: user.name.clone(),
                response: match change {
                    Change::Response(r) => r,
                    Change::Class(_) => SubscriptionResponse::Present,
                },
                character_class: match change {
                    Change::Class(c) => Some(c),
                    Change::Response(_) => None,
                },
            },
        };

        self.raids.save_subscription(&subscription).await?;
        info!(
            raid_id = raid.id,
            user = %user.name,
            response = %subscription.response,
            class = ?subscription.character_class,
            "subscription updated"
        );

        self.embeds.publish_or_update(raid.id).await?;
        Ok(())
    }

    async fn current_subscription(
        &self,
        raid: &Raid,
        user_id: i64,
    ) -> Result<Option<RaidSubscription>, DomainError> {
        Ok(self
            .raids
            .subscriptions(raid.id)
            .await?
            .into_iter()
            .find(|s| s.user_id == user_id))
    }
}

#[async_trait::async_trait]
impl ClassChoiceListener for SignupListener {
    async fn on_class_choice(
        &self,
        discord_user_id: u64,
        message_id: u64,
        class: CharacterClass,
    ) -> Result<(), DomainError> {
        self.apply(discord_user_id, message_id, Change::Class(class))
            .await
    }
}

#[async_trait::async_trait]
impl ResponseListener for SignupListener {
    async fn on_response(
        &self,
        discord_user_id: u64,
        message_id: u64,
        response: SubscriptionResponse,
    ) -> Result<(), DomainError> {
        self.apply(discord_user_id, message_id, Change::Response(response))
            .await
    }
}
