use sqlx::sqlite::{self, SqliteConnectOptions, SqlitePool};
use std::str::FromStr;
use std::time::Duration;

/// Open (or create) the trade journal database under `data_folder` and
/// bootstrap its schema.
pub async fn connect(data_folder: &str) -> Result<SqlitePool, sqlx::Error> {
    std::fs::create_dir_all(data_folder)?;
    let db_filename = format!("{}/trading_journal.db", data_folder);

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_filename))?
        .create_if_missing(true)
        .journal_mode(sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlite::SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(30));

    let pool = SqlitePool::connect_with(options).await?;
    apply_schema(&pool).await?;
    Ok(pool)
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let schema = include_str!("../sql/schema.sql");
    sqlx::raw_sql(schema).execute(pool).await?;
    Ok(())
}

/// In-memory journal for tests. A single connection keeps the database
/// alive for the pool's lifetime.
#[cfg(test)]
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    apply_schema(&pool).await?;
    Ok(pool)
}
