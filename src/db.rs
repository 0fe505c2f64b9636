//! SQLite storage engine.
//!
//! Each repository is a cheap, cloneable handle over the shared
//! [`SqlitePool`]. Repositories take the evaluation instant `now` from their
//! callers, so every visibility decision in a call uses one consistent clock
//! reading.

use std::time::Duration;

use sqlx::{
    sqlite::{
        SqliteAutoVacuum, SqliteConnectOptions, SqliteJournalMode, SqliteLockingMode,
        SqlitePoolOptions,
    },
    Sqlite, SqlitePool, Transaction,
};

use crate::{config::Config, error::Error};

pub mod health;
pub mod message;
pub mod queue;
pub mod subscription;
pub mod topic;

pub use health::HealthRepository;
pub use message::MessageRepository;
pub use queue::QueueRepository;
pub use subscription::SubscriptionRepository;
pub use topic::TopicRepository;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQL predicate selecting the messages deliverable at `now`, which every
/// query using it binds as `$2`. [`Message::is_visible`] is its in-memory
/// counterpart.
///
/// [`Message::is_visible`]: crate::message::Message::is_visible
pub(crate) const VISIBLE: &str = "scheduled_at <= $2 AND expired_at > $2";

/// SQL predicate selecting the messages a cleanup at `$2` removes. The
/// in-memory counterpart is [`Message::is_expired`].
///
/// [`Message::is_expired`]: crate::message::Message::is_expired
pub(crate) const EXPIRED: &str = "expired_at <= $2";

/// Opens the database described by `config` and brings its schema up to date.
pub async fn connect(config: &Config) -> Result<SqlitePool, Error> {
    let opts = SqliteConnectOptions::new()
        .filename(config.db_path())
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .locking_mode(SqliteLockingMode::Normal)
        .busy_timeout(BUSY_TIMEOUT)
        .optimize_on_close(true, None)
        .auto_vacuum(SqliteAutoVacuum::Full);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections())
        .connect_with(opts)
        .await?;

    migrate(&pool).await?;

    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), Error> {
    tracing::info!("running migrations");
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Rolls back `tx`, logging rather than surfacing a failed rollback so the
/// caller can return the error that caused it.
pub(crate) async fn rollback(tx: Transaction<'_, Sqlite>) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!(error = %e, "database rollback error");
    }
}

/// Converts an API-level offset/limit pair into SQLite bind values.
pub(crate) fn page(offset: u32, limit: u32) -> (i64, i64) {
    (i64::from(offset), i64::from(limit))
}
