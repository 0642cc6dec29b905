//! Application use cases. Orchestrate domain logic via ports.

pub mod embed_service;
pub mod login_service;
pub mod notifier;
pub mod reaction_dispatcher;
pub mod reaction_worker;
pub mod role_bridge;
pub mod signup_listener;

#[cfg(test)]
pub mod test_support;

pub use embed_service::{EmbedService, PublishOutcome};
pub use login_service::LoginService;
pub use notifier::RaidNotifier;
pub use reaction_dispatcher::{DispatchOutcome, ReactionDispatcher, ReactionListeners};
pub use reaction_worker::ReactionWorker;
pub use role_bridge::RoleBridge;
pub use signup_listener::SignupListener;
