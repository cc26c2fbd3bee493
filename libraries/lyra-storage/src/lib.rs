//! Lyra Storage
//!
//! Persistent session store for Lyra.
//!
//! This crate keeps the small amount of client state that must survive a
//! restart: the last played track and, for anonymous use, the favorite and
//! dislike id lists.
//!
//! # Architecture
//!
//! - **`SqliteSessionStore`**: key/value rows in a `SQLite` file, JSON values
//! - **`MemorySessionStore`**: same contract, process lifetime only
//! - **`session`**: typed accessors for the well-known keys
//!
//! # Example
//!
//! ```rust,no_run
//! use lyra_storage::{create_pool, run_migrations, session, SqliteSessionStore};
//! use lyra_core::TrackId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://lyra.db").await?;
//! run_migrations(&pool).await?;
//!
//! let store = SqliteSessionStore::new(pool);
//! session::set_current_track_id(&store, TrackId::new(5)).await?;
//! assert_eq!(session::current_track_id(&store).await?, Some(TrackId::new(5)));
//! # Ok(())
//! # }
//! ```

mod error;
mod memory;
pub mod session;
mod sqlite;

pub use error::StorageError;
pub use memory::MemorySessionStore;
pub use sqlite::SqliteSessionStore;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// This should be called once when the application starts to ensure
/// the database schema is up to date.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StorageError> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `sqlite://lyra.db` or `sqlite::memory:`)
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, StorageError> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!(url = %database_url, "Creating session store pool");

    let in_memory = database_url.contains(":memory:");

    let mut options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .busy_timeout(std::time::Duration::from_secs(30));
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    // Every connection to `:memory:` opens its own empty database.
    let max_connections = if in_memory { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Open (or create) a file-backed store and bring its schema up to date.
pub async fn open(database_url: &str) -> Result<SqliteSessionStore, StorageError> {
    let pool = create_pool(database_url).await?;
    run_migrations(&pool).await?;
    Ok(SqliteSessionStore::new(pool))
}
