//! Discord login adapter: OAuth2 code flow plus request/response hooks.

pub mod discord;
pub mod hooks;

pub use discord::DiscordIdentityProvider;
pub use hooks::{AvatarUrlEnricher, OutboundRequestHook, UserAgentHook, UserInfoEnricher};
