//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod emotes;
pub mod entities;
pub mod errors;
pub mod roles;

pub use emotes::{Emote, EmoteRegistry};
pub use entities::{
    CharacterClass, EmbedField, EmoteRef, ExternalIdentity, ExternalMessage, LocalUser,
    MessageBody, Raid, RaidSubscription, RaidType, ReactionEvent, SubscriptionResponse,
};
pub use errors::DomainError;
pub use roles::{AuthorizationContext, RoleSet, UserRole};
