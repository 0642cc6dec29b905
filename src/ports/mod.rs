//! Port traits. API boundaries for the hexagon.
//!
//! - Inbound: Called by the reaction dispatcher into domain listeners
//! - Outbound: Called by application into infrastructure

pub mod inbound;
pub mod outbound;

pub use inbound::{ClassChoiceListener, ResponseListener};
pub use outbound::{ChatGateway, EmbedRenderer, IdentityProvider, RaidStore, UserStore};
