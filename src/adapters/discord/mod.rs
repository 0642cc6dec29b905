//! Discord adapter: serenity REST client and gateway event handler.

pub mod client;
pub mod handler;
pub mod mapper;

pub use client::SerenityGateway;
pub use handler::ReactionHandler;
