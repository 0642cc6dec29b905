//! Composable hooks around the OAuth HTTP calls.
//!
//! `OutboundRequestHook` decorates every request before it is sent (token exchange and
//! user-info alike). `UserInfoEnricher` post-processes the identity returned by user-info.

use crate::domain::ExternalIdentity;
use reqwest::RequestBuilder;
use reqwest::header::USER_AGENT;

/// Discord rejects requests carrying a library default agent.
pub const DEFAULT_USER_AGENT: &str = concat!("RaidSync/", env!("CARGO_PKG_VERSION"));

pub trait OutboundRequestHook: Send + Sync {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder;
}

/// Sets a fixed User-Agent header.
#[derive(Debug, Clone)]
pub struct UserAgentHook {
    agent: String,
}

impl UserAgentHook {
    pub fn new(agent: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
        }
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }
}

impl Default for UserAgentHook {
    fn default() -> Self {
        Self::new(DEFAULT_USER_AGENT)
    }
}

impl OutboundRequestHook for UserAgentHook {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(USER_AGENT, self.agent.as_str())
    }
}

pub trait UserInfoEnricher: Send + Sync {
    fn enrich(&self, identity: &mut ExternalIdentity);
}

/// Adds `avatar_url` built from the `avatar` hash, when the user has one.
#[derive(Debug, Clone, Default)]
pub struct AvatarUrlEnricher;

const CDN_BASE: &str = "https://cdn.discordapp.com";

impl UserInfoEnricher for AvatarUrlEnricher {
    fn enrich(&self, identity: &mut ExternalIdentity) {
        let Some(hash) = identity
            .attributes
            .get("avatar")
            .and_then(|v| v.as_str())
            .map(String::from)
        else {
            return;
        };
        let ext = if hash.starts_with("a_") { "gif" } else { "png" };
        identity.attributes.insert(
            "avatar_url".into(),
            format!("{}/avatars/{}/{}.{}", CDN_BASE, identity.id, hash, ext).into(),
        );
    }
}
