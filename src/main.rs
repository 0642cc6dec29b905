//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run the Discord gateway.
//! No business logic here.

use raid_sync::adapters::discord::{ReactionHandler, SerenityGateway};
use raid_sync::adapters::oauth::{AvatarUrlEnricher, DiscordIdentityProvider};
use raid_sync::adapters::persistence::SqliteRepo;
use raid_sync::adapters::render::PlainEmbedRenderer;
use raid_sync::domain::EmoteRegistry;
use raid_sync::ports::{ChatGateway, EmbedRenderer, IdentityProvider, RaidStore, UserStore};
use raid_sync::shared::{AppConfig, RaidUrls};
use raid_sync::usecases::{
    EmbedService, ReactionDispatcher, ReactionListeners, ReactionWorker, SignupListener,
};
use secrecy::{ExposeSecret, Secret};
use serenity::Client;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv::dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env found"),
    }

    let cfg = AppConfig::load().map_err(|e| anyhow::anyhow!("config: {}", e))?;
    // Missing token, guild or channel: refuse to start.
    let channel = cfg.managed_channel().map_err(|e| anyhow::anyhow!("{}", e))?;
    let token = cfg
        .discord_token()
        .ok_or_else(|| anyhow::anyhow!("RAID_SYNC_DISCORD_TOKEN is not set"))?;
    info!(
        guild_id = channel.guild_id,
        channel_id = channel.channel_id,
        "managed channel"
    );

    let emotes = Arc::new(
        EmoteRegistry::with_overrides(&cfg.emotes).map_err(|e| anyhow::anyhow!("{}", e))?,
    );

    // --- Discord REST (bounded calls) ---
    let remote_timeout = Duration::from_secs(cfg.remote_timeout_secs_or_default());
    let gateway = SerenityGateway::connect(token, remote_timeout)
        .await
        .map_err(|e| anyhow::anyhow!("Discord connect failed: {}", e))?;
    let chat: Arc<dyn ChatGateway> = Arc::new(gateway);

    // --- Storage ---
    let data_path = PathBuf::from(cfg.data_dir_or_default());
    let sqlite_repo = Arc::new(
        SqliteRepo::connect(&data_path)
            .await
            .map_err(|e| anyhow::anyhow!("SQLite connect failed: {}", e))?,
    );
    info!(path = %sqlite_repo.path().display(), "database ready");
    let raids: Arc<dyn RaidStore> = Arc::clone(&sqlite_repo) as Arc<dyn RaidStore>;
    let users: Arc<dyn UserStore> = Arc::clone(&sqlite_repo) as Arc<dyn UserStore>;

    // --- Services ---
    let urls = RaidUrls::new(cfg.public_url_or_default());
    let renderer: Arc<dyn EmbedRenderer> = Arc::new(PlainEmbedRenderer::new(Arc::clone(&emotes)));
    let embeds = Arc::new(EmbedService::new(
        Arc::clone(&chat),
        Arc::clone(&raids),
        renderer,
        Arc::clone(&emotes),
        channel,
        urls,
    ));

    let listeners = Arc::new(ReactionListeners::new());
    let signup = Arc::new(SignupListener::new(
        Arc::clone(&raids),
        Arc::clone(&users),
        Arc::clone(&embeds),
    ));
    listeners.subscribe_class_choice(signup.clone());
    listeners.subscribe_response(signup);

    let dispatcher = Arc::new(ReactionDispatcher::new(
        Arc::clone(&chat),
        Arc::clone(&emotes),
        listeners,
        channel,
    ));

    // --- OAuth settings (validated here; the login callback is served elsewhere) ---
    if cfg.is_oauth_configured() {
        let (Some(client_id), Some(secret), Some(redirect)) = (
            cfg.oauth_client_id.clone(),
            cfg.oauth_client_secret.as_ref(),
            cfg.oauth_redirect_uri.clone(),
        ) else {
            anyhow::bail!("OAuth configuration incomplete");
        };
        let identity: Arc<dyn IdentityProvider> = Arc::new(
            DiscordIdentityProvider::new(
                client_id,
                Secret::new(secret.expose_secret().clone()),
                redirect,
            )
            .with_enricher(Arc::new(AvatarUrlEnricher)),
        );
        let url = identity
            .authorize_url("raid-sync")
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        info!(
            %url,
            user_roles = ?cfg.user_role_names(),
            admin_roles = ?cfg.admin_role_names(),
            "Discord OAuth settings valid; this process does not serve the login callback"
        );
    } else {
        warn!("RAID_SYNC_OAUTH_* not set, Discord OAuth settings skipped");
    }

    // --- Reaction pipeline: bounded channel for backpressure (gateway waits when full) ---
    let queue_size = cfg.reaction_queue_size_or_default();
    let workers = cfg.reaction_workers_or_default();
    info!(queue_size, workers, "reaction pipeline");
    let (reaction_tx, reaction_rx) = mpsc::channel(queue_size);
    let worker = tokio::spawn(ReactionWorker::new(dispatcher, reaction_rx, workers).run());

    // --- Gateway ---
    let mut client = Client::builder(token.expose_secret(), ReactionHandler::intents())
        .event_handler(ReactionHandler::new(reaction_tx))
        .await
        .map_err(|e| anyhow::anyhow!("Discord client build failed: {}", e))?;
    let shard_manager = client.shard_manager.clone();

    tokio::select! {
        res = client.start() => {
            if let Err(e) = res {
                warn!(error = %e, "Discord gateway stopped");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown requested");
            shard_manager.shutdown_all().await;
        }
    }

    // Dropping the client drops the handler and its sender; the worker then drains and exits.
    drop(client);
    if tokio::time::timeout(remote_timeout, worker).await.is_err() {
        warn!("reaction worker did not finish in time");
    }
    info!("bye");
    Ok(())
}
