//! Database layer for the Constance tracker
//!
//! Queries that take part in a completion event accept `&mut PgConnection`
//! so they can run inside the caller's transaction.

use common::models::XpProgress;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::info;

pub mod categories;
pub mod checks;
pub mod goals;
pub mod groups;
pub mod habits;
pub mod levels;
pub mod routines;
pub mod tasks;
pub mod users;

/// Create a database connection pool
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    info!("Database connected");
    Ok(pool)
}

/// Run database migrations from SQL files
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    info!("Running migrations...");

    let migration_sql = include_str!("../../../migrations/001_initial.sql");
    sqlx::raw_sql(migration_sql).execute(pool).await?;

    info!("Migrations complete");
    Ok(())
}

/// Read the embedded XP columns shared by users, routines, habits and categories
pub(crate) fn xp_from_row(row: &PgRow) -> XpProgress {
    XpProgress {
        xp: row.get("xp"),
        level: row.get("level"),
        actual_level_xp: row.get("actual_level_xp"),
        next_level_xp: row.get("next_level_xp"),
    }
}

pub(crate) fn decode_err(column: &str, value: &str) -> sqlx::Error {
    sqlx::Error::Decode(format!("unexpected {} value '{}'", column, value).into())
}
