//! SQLite-backed repository via libsql. Implements RaidStore and UserStore.
//!
//! One database file (raids.db) in the data directory with three tables:
//! `raids`, `raid_subscriptions` (one row per raid and user), `users` (unique Discord id).
//! Discord snowflakes fit in 63 bits and are stored as INTEGER.

use crate::domain::{
    CharacterClass, DomainError, LocalUser, Raid, RaidSubscription, RaidType, SubscriptionResponse,
};
use crate::ports::{RaidStore, UserStore};
use chrono::{DateTime, TimeZone, Utc};
use libsql::{Connection, Database, Row, params};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::info;

const RAIDS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS raids (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    raid_type TEXT NOT NULL,
    date INTEGER NOT NULL,
    comment TEXT,
    discord_message_id INTEGER
)"#;
const RAIDS_MESSAGE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_raids_message ON raids (discord_message_id)";

const SUBSCRIPTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS raid_subscriptions (
    raid_id INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    user_name TEXT NOT NULL,
    response TEXT NOT NULL,
    character_class TEXT,
    PRIMARY KEY (raid_id, user_id)
)"#;

const USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    discord_id INTEGER NOT NULL UNIQUE,
    name TEXT NOT NULL
)"#;

fn repo_err(e: impl Display) -> DomainError {
    DomainError::Repo(e.to_string())
}

/// SQLite repository. Safe to share via Arc; each call opens its own connection.
pub struct SqliteRepo {
    db: Database,
    db_path: PathBuf,
}

impl SqliteRepo {
    /// Connect to (or create) the database and ensure the schema exists.
    ///
    /// Sets WAL mode and synchronous=NORMAL: reaction workers read while the listener writes.
    pub async fn connect(base_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(repo_err)?;
        let db_path = base.join("raids.db");
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(repo_err)?;
        let conn = db.connect().map_err(repo_err)?;

        // PRAGMA returns a row; execute() fails on rows, so query and drain.
        for pragma in ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL"] {
            let mut rows = conn
                .query(pragma, ())
                .await
                .map_err(|e| DomainError::Repo(format!("{} failed: {}", pragma, e)))?;
            while rows.next().await.map_err(repo_err)?.is_some() {}
        }

        for ddl in [
            RAIDS_TABLE,
            RAIDS_MESSAGE_INDEX,
            SUBSCRIPTIONS_TABLE,
            USERS_TABLE,
        ] {
            conn.execute(ddl, ()).await.map_err(repo_err)?;
        }

        info!(path = %db_path.display(), "SQLite connected with WAL mode");
        Ok(Self { db, db_path })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn conn(&self) -> Result<Connection, DomainError> {
        self.db.connect().map_err(repo_err)
    }

    /// Insert a new raid without a published message.
    pub async fn create_raid(
        &self,
        raid_type: RaidType,
        date: DateTime<Utc>,
        comment: Option<&str>,
    ) -> Result<Raid, DomainError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO raids (raid_type, date, comment) VALUES (?1, ?2, ?3)",
            params![raid_type.key(), date.timestamp(), comment],
        )
        .await
        .map_err(repo_err)?;
        let id = conn.last_insert_rowid();
        info!(raid_id = id, raid_type = raid_type.key(), "raid created");
        Ok(Raid {
            id,
            raid_type,
            date,
            comment: comment.map(String::from),
            discord_message_id: None,
        })
    }

    fn row_to_raid(row: &Row) -> Result<Raid, DomainError> {
        let id: i64 = row.get(0).map_err(repo_err)?;
        let raid_type: String = row.get(1).map_err(repo_err)?;
        let ts: i64 = row.get(2).map_err(repo_err)?;
        let comment: Option<String> = row.get(3).ok();
        let message_id: Option<i64> = row.get(4).ok();
        Ok(Raid {
            id,
            raid_type: raid_type.parse().map_err(DomainError::Repo)?,
            date: Utc
                .timestamp_opt(ts, 0)
                .single()
                .ok_or_else(|| DomainError::Repo(format!("raid {} has invalid date {}", id, ts)))?,
            comment,
            discord_message_id: message_id.map(|m| m as u64),
        })
    }

    fn row_to_subscription(row: &Row) -> Result<RaidSubscription, DomainError> {
        let response: String = row.get(3).map_err(repo_err)?;
        let class: Option<String> = row.get(4).ok();
        Ok(RaidSubscription {
            raid_id: row.get(0).map_err(repo_err)?,
            user_id: row.get(1).map_err(repo_err)?,
            user_name: row.get(2).map_err(repo_err)?,
            response: response
                .parse::<SubscriptionResponse>()
                .map_err(DomainError::Repo)?,
            character_class: class
                .map(|c| c.parse::<CharacterClass>().map_err(DomainError::Repo))
                .transpose()?,
        })
    }

    fn row_to_user(row: &Row) -> Result<LocalUser, DomainError> {
        let discord_id: i64 = row.get(1).map_err(repo_err)?;
        Ok(LocalUser {
            id: row.get(0).map_err(repo_err)?,
            discord_id: discord_id as u64,
            name: row.get(2).map_err(repo_err)?,
        })
    }
}

const RAID_COLUMNS: &str = "id, raid_type, date, comment, discord_message_id";

#[async_trait::async_trait]
impl RaidStore for SqliteRepo {
    async fn find(&self, raid_id: i64) -> Result<Raid, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                &format!("SELECT {} FROM raids WHERE id = ?1", RAID_COLUMNS),
                params![raid_id],
            )
            .await
            .map_err(repo_err)?;
        match rows.next().await.map_err(repo_err)? {
            Some(row) => Self::row_to_raid(&row),
            None => Err(DomainError::NotFound(format!("raid {}", raid_id))),
        }
    }

    async fn save(&self, raid: &Raid) -> Result<(), DomainError> {
        let conn = self.conn()?;
        let updated = conn
            .execute(
                r#"
                UPDATE raids SET raid_type = ?2, date = ?3, comment = ?4, discord_message_id = ?5
                WHERE id = ?1
                "#,
                params![
                    raid.id,
                    raid.raid_type.key(),
                    raid.date.timestamp(),
                    raid.comment.clone(),
                    raid.discord_message_id.map(|m| m as i64)
                ],
            )
            .await
            .map_err(repo_err)?;
        if updated == 0 {
            return Err(DomainError::NotFound(format!("raid {}", raid.id)));
        }
        Ok(())
    }

    async fn subscriptions(&self, raid_id: i64) -> Result<Vec<RaidSubscription>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                r#"
                SELECT raid_id, user_id, user_name, response, character_class
                FROM raid_subscriptions
                WHERE raid_id = ?1
                ORDER BY rowid
                "#,
                params![raid_id],
            )
            .await
            .map_err(repo_err)?;
        let mut subs = Vec::new();
        while let Some(row) = rows.next().await.map_err(repo_err)? {
            subs.push(Self::row_to_subscription(&row)?);
        }
        Ok(subs)
    }

    async fn find_by_message_id(&self, message_id: u64) -> Result<Option<Raid>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {} FROM raids WHERE discord_message_id = ?1",
                    RAID_COLUMNS
                ),
                params![message_id as i64],
            )
            .await
            .map_err(repo_err)?;
        match rows.next().await.map_err(repo_err)? {
            Some(row) => Self::row_to_raid(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn save_subscription(&self, subscription: &RaidSubscription) -> Result<(), DomainError> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO raid_subscriptions (raid_id, user_id, user_name, response, character_class)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (raid_id, user_id) DO UPDATE SET
                user_name = excluded.user_name,
                response = excluded.response,
                character_class = excluded.character_class
            "#,
            params![
                subscription.raid_id,
                subscription.user_id,
                subscription.user_name.as_str(),
                subscription.response.key(),
                subscription.character_class.map(|c| c.key())
            ],
        )
        .await
        .map_err(repo_err)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl UserStore for SqliteRepo {
    async fn save_or_update(&self, discord_id: u64, name: &str) -> Result<LocalUser, DomainError> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO users (discord_id, name) VALUES (?1, ?2)
            ON CONFLICT (discord_id) DO UPDATE SET name = excluded.name
            "#,
            params![discord_id as i64, name],
        )
        .await
        .map_err(repo_err)?;
        self.find_by_discord_id(discord_id)
            .await?
            .ok_or_else(|| DomainError::Repo(format!("user {} vanished after upsert", discord_id)))
    }

    async fn find_by_discord_id(&self, discord_id: u64) -> Result<Option<LocalUser>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                "SELECT id, discord_id, name FROM users WHERE discord_id = ?1",
                params![discord_id as i64],
            )
            .await
            .map_err(repo_err)?;
        match rows.next().await.map_err(repo_err)? {
            Some(row) => Self::row_to_user(&row).map(Some),
            None => Ok(None),
        }
    }
}
