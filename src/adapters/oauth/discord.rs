//! Discord OAuth2 authorization-code flow. Implements IdentityProvider with reqwest.
//!
//! Both outbound calls (token exchange, user-info) pass through the request hooks;
//! the user-info payload then runs through the enricher chain.

use crate::adapters::oauth::hooks::{OutboundRequestHook, UserAgentHook, UserInfoEnricher};
use crate::domain::{DomainError, ExternalIdentity};
use crate::ports::IdentityProvider;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

pub const DISCORD_API_BASE: &str = "https://discord.com/api";

/// Only the identity is needed; guild membership is checked with the bot token.
const SCOPE: &str = "identify";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
}

pub struct DiscordIdentityProvider {
    client: Client,
    api_base: String,
    client_id: String,
    client_secret: Secret<String>,
    redirect_uri: String,
    hooks: Vec<Arc<dyn OutboundRequestHook>>,
    enrichers: Vec<Arc<dyn UserInfoEnricher>>,
}

impl DiscordIdentityProvider {
    /// Provider against the public Discord API, with the default User-Agent hook installed.
    pub fn new(client_id: String, client_secret: Secret<String>, redirect_uri: String) -> Self {
        Self {
            client: Client::new(),
            api_base: DISCORD_API_BASE.to_string(),
            client_id,
            client_secret,
            redirect_uri,
            hooks: vec![Arc::new(UserAgentHook::default())],
            enrichers: Vec::new(),
        }
    }

    /// Point at another API root (e.g. a local mock server).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_hook(mut self, hook: Arc<dyn OutboundRequestHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn with_enricher(mut self, enricher: Arc<dyn UserInfoEnricher>) -> Self {
        self.enrichers.push(enricher);
        self
    }

    fn hooked(&self, mut request: RequestBuilder) -> RequestBuilder {
        for hook in &self.hooks {
            request = hook.apply(request);
        }
        request
    }

    async fn send(&self, op: &str, request: RequestBuilder) -> Result<Response, DomainError> {
        let res = self
            .hooked(request)
            .send()
            .await
            .map_err(|e| DomainError::Identity(format!("{} request failed: {}", op, e)))?;
        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_else(|_| "unknown".to_string());
            warn!(op, %status, "Discord OAuth call rejected");
            return Err(DomainError::Identity(format!(
                "{} returned {}: {}",
                op, status, text
            )));
        }
        Ok(res)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for DiscordIdentityProvider {
    fn authorize_url(&self, state: &str) -> Result<String, DomainError> {
        let url = Url::parse_with_params(
            &format!("{}/oauth2/authorize", self.api_base),
            &[
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("scope", SCOPE),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| DomainError::Configuration(format!("invalid OAuth URL: {}", e)))?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<Secret<String>, DomainError> {
        let request = self
            .client
            .post(format!("{}/oauth2/token", self.api_base))
            .header("Accept", "application/json")
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose_secret().as_str()),
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ]);
        let token: TokenResponse = self
            .send("token exchange", request)
            .await?
            .json()
            .await
            .map_err(|e| DomainError::Identity(format!("invalid token response: {}", e)))?;
        debug!(token_type = ?token.token_type, "OAuth code exchanged");
        Ok(Secret::new(token.access_token))
    }

    async fn fetch_identity(
        &self,
        access_token: &Secret<String>,
    ) -> Result<ExternalIdentity, DomainError> {
        let request = self
            .client
            .get(format!("{}/users/@me", self.api_base))
            .bearer_auth(access_token.expose_secret());
        let body: serde_json::Value = self
            .send("user info", request)
            .await?
            .json()
            .await
            .map_err(|e| DomainError::Identity(format!("invalid user info: {}", e)))?;

        let serde_json::Value::Object(attributes) = body else {
            return Err(DomainError::Identity("user info is not an object".into()));
        };
        // Snowflakes come as strings.
        let id = attributes
            .get("id")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<u64>().ok())
            .ok_or_else(|| DomainError::Identity("user info has no valid id".into()))?;
        let username = attributes
            .get("username")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let mut identity = ExternalIdentity {
            id,
            username,
            attributes,
        };
        for enricher in &self.enrichers {
            enricher.enrich(&mut identity);
        }
        Ok(identity)
    }
}
