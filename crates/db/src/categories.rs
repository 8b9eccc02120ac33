//! Category queries

use common::models::Category;
use sqlx::{PgConnection, Row};
use uuid::Uuid;

use crate::xp_from_row;

/// Load and lock the given categories
///
/// Rows are returned whoever owns them; missing IDs are absent from the result.
/// Callers check ownership against the acting user.
pub async fn get_many(
    conn: &mut PgConnection,
    ids: &[Uuid],
) -> Result<Vec<Category>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query(
        r#"
        SELECT id, user_id, name, xp, level, actual_level_xp, next_level_xp
        FROM categories
        WHERE id = ANY($1)
        ORDER BY id
        FOR UPDATE
        "#,
    )
    .bind(ids)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .iter()
        .map(|r| Category {
            id: r.get("id"),
            user_id: r.get("user_id"),
            name: r.get("name"),
            xp: xp_from_row(r),
        })
        .collect())
}

/// Persist a category's XP
pub async fn update_xp(conn: &mut PgConnection, category: &Category) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE categories
        SET xp = $2, level = $3, actual_level_xp = $4, next_level_xp = $5
        WHERE id = $1
        "#,
    )
    .bind(category.id)
    .bind(category.xp.xp)
    .bind(category.xp.level)
    .bind(category.xp.actual_level_xp)
    .bind(category.xp.next_level_xp)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
