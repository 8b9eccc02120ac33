//! Routine queries

use common::models::Routine;
use sqlx::{PgConnection, Row};
use uuid::Uuid;

use crate::xp_from_row;

/// Get a routine owned by `user_id`
pub async fn get_for_user(
    conn: &mut PgConnection,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<Routine>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, user_id, name, xp, level, actual_level_xp, next_level_xp
        FROM routines
        WHERE id = $1 AND user_id = $2
        FOR UPDATE
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(|r| Routine {
        id: r.get("id"),
        user_id: r.get("user_id"),
        name: r.get("name"),
        xp: xp_from_row(&r),
    }))
}

/// Persist a routine's XP
pub async fn update_xp(conn: &mut PgConnection, routine: &Routine) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE routines
        SET xp = $2, level = $3, actual_level_xp = $4, next_level_xp = $5
        WHERE id = $1
        "#,
    )
    .bind(routine.id)
    .bind(routine.xp.xp)
    .bind(routine.xp.level)
    .bind(routine.xp.actual_level_xp)
    .bind(routine.xp.next_level_xp)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
