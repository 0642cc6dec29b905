//! Local storage for raids, subscriptions and users.

pub mod sqlite_repo;

pub use sqlite_repo::SqliteRepo;
