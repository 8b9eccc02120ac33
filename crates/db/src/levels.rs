//! Level table queries

use sqlx::{PgPool, Row};

/// Load every (level, cumulative xp) pair
pub async fn load_all(pool: &PgPool) -> Result<Vec<(i32, f64)>, sqlx::Error> {
    let rows = sqlx::query("SELECT level, xp FROM levels ORDER BY level")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|r| (r.get("level"), r.get("xp")))
        .collect())
}
