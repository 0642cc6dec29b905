//! Inbound ports. The reaction dispatcher calls into domain listeners.
//!
//! Class choices and RSVP responses are separate capability surfaces: a listener
//! implements one, the other, or both.

use crate::domain::{CharacterClass, DomainError, SubscriptionResponse};

/// Receives a user's class pick on a raid embed.
#[async_trait::async_trait]
pub trait ClassChoiceListener: Send + Sync {
    async fn on_class_choice(
        &self,
        discord_user_id: u64,
        message_id: u64,
        class: CharacterClass,
    ) -> Result<(), DomainError>;
}

/// Receives a user's RSVP answer on a raid embed.
#[async_trait::async_trait]
pub trait ResponseListener: Send + Sync {
    async fn on_response(
        &self,
        discord_user_id: u64,
        message_id: u64,
        response: SubscriptionResponse,
    ) -> Result<(), DomainError>;
}
