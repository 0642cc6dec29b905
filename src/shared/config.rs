//! Application configuration. Discord credentials, role mapping, paths.

use crate::domain::DomainError;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::collections::HashMap;

/// Default capacity for the reaction event channel. When full, the gateway handler waits
/// on send().await until a worker frees a slot.
pub const DEFAULT_REACTION_QUEUE_SIZE: usize = 256;

/// Default number of reaction events handled concurrently.
pub const DEFAULT_REACTION_WORKERS: usize = 4;
const MAX_REACTION_WORKERS: usize = 1024;
const MAX_REACTION_QUEUE_SIZE: usize = 65_536;

/// Default bound on every Discord REST call.
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Bot token. Read from RAID_SYNC_DISCORD_TOKEN.
    #[serde(default)]
    pub discord_token: Option<Secret<String>>,

    /// Guild (community) whose members may log in. Read from RAID_SYNC_GUILD_ID.
    #[serde(default)]
    pub guild_id: Option<u64>,

    /// The one channel raid embeds are published to. Read from RAID_SYNC_CHANNEL_ID.
    #[serde(default)]
    pub channel_id: Option<u64>,

    /// Comma-separated guild role names granting USER. Read from RAID_SYNC_USER_ROLES.
    #[serde(default)]
    pub user_roles: Option<String>,

    /// Comma-separated guild role names granting ADMIN. Read from RAID_SYNC_ADMIN_ROLES.
    #[serde(default)]
    pub admin_roles: Option<String>,

    /// Public base URL of the web app, used for raid links. Read from RAID_SYNC_PUBLIC_URL.
    #[serde(default)]
    pub public_url: Option<String>,

    pub data_dir: Option<String>,

    /// Emote overrides, `MAGE = "mage:1234"`. Only settable from the config file.
    #[serde(default)]
    pub emotes: HashMap<String, String>,

    #[serde(default)]
    pub reaction_workers: Option<usize>,

    #[serde(default)]
    pub reaction_queue_size: Option<usize>,

    #[serde(default)]
    pub remote_timeout_secs: Option<u64>,

    // ─────────────────────────────────────────────────────────────────────────
    // OAuth2 (Discord login)
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(default)]
    pub oauth_client_id: Option<String>,

    #[serde(default)]
    pub oauth_client_secret: Option<Secret<String>>,

    #[serde(default)]
    pub oauth_redirect_uri: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        if let Ok(path) = std::env::var("RAID_SYNC_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        // Environment wins over the file.
        c = c.add_source(config::Environment::with_prefix("RAID_SYNC").try_parsing(true));
        c.build()?.try_deserialize()
    }

    /// Resolve the guild/channel handles. Missing token, guild or channel is fatal.
    pub fn managed_channel(&self) -> Result<ManagedChannel, DomainError> {
        if self.discord_token().is_none() {
            return Err(DomainError::Configuration(
                "RAID_SYNC_DISCORD_TOKEN is not set".into(),
            ));
        }
        let guild_id = self
            .guild_id
            .filter(|id| *id != 0)
            .ok_or_else(|| DomainError::Configuration("RAID_SYNC_GUILD_ID is not set".into()))?;
        let channel_id = self
            .channel_id
            .filter(|id| *id != 0)
            .ok_or_else(|| DomainError::Configuration("RAID_SYNC_CHANNEL_ID is not set".into()))?;
        Ok(ManagedChannel {
            guild_id,
            channel_id,
        })
    }

    /// Bot token, if set and non-blank.
    pub fn discord_token(&self) -> Option<&Secret<String>> {
        self.discord_token
            .as_ref()
            .filter(|t| !t.expose_secret().trim().is_empty())
    }

    pub fn user_role_names(&self) -> Vec<String> {
        split_names(self.user_roles.as_deref())
    }

    pub fn admin_role_names(&self) -> Vec<String> {
        split_names(self.admin_roles.as_deref())
    }

    /// Returns the public URL. Defaults to http://localhost:8080.
    pub fn public_url_or_default(&self) -> String {
        self.public_url
            .clone()
            .unwrap_or_else(|| "http://localhost:8080".to_string())
    }

    pub fn data_dir_or_default(&self) -> String {
        self.data_dir.clone().unwrap_or_else(|| "./data".to_string())
    }

    pub fn reaction_workers_or_default(&self) -> usize {
        self.reaction_workers
            .filter(|n| *n > 0)
            .map_or(DEFAULT_REACTION_WORKERS, |n| n.min(MAX_REACTION_WORKERS))
    }

    pub fn reaction_queue_size_or_default(&self) -> usize {
        self.reaction_queue_size
            .filter(|n| *n > 0)
            .map_or(DEFAULT_REACTION_QUEUE_SIZE, |n| n.min(MAX_REACTION_QUEUE_SIZE))
    }

    pub fn remote_timeout_secs_or_default(&self) -> u64 {
        self.remote_timeout_secs
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_REMOTE_TIMEOUT_SECS)
    }

    /// Returns true if Discord login is fully configured.
    pub fn is_oauth_configured(&self) -> bool {
        self.oauth_client_id.is_some()
            && self.oauth_client_secret.is_some()
            && self.oauth_redirect_uri.is_some()
    }
}

/// Split a comma-separated list, trimming whitespace and dropping empty entries.
/// Case is preserved: role matching is exact.
fn split_names(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

/// Guild and channel handles, resolved once at startup and passed to each component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagedChannel {
    pub guild_id: u64,
    pub channel_id: u64,
}

impl ManagedChannel {
    pub fn channel_id(&self) -> u64 {
        self.channel_id
    }
}

/// Canonical links into the web app.
#[derive(Debug, Clone)]
pub struct RaidUrls {
    base: String,
}

impl RaidUrls {
    pub fn new(base: impl Into<String>) -> Self {
        let base: String = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn raid_url(&self, raid_id: i64) -> String {
        format!("{}/raids/{}", self.base, raid_id)
    }
}
