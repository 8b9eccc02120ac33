//! Habit queries

use common::models::Habit;
use sqlx::{PgConnection, Row};
use uuid::Uuid;

use crate::xp_from_row;

/// Get a habit owned by `user_id`, with its category links
pub async fn get_for_user(
    conn: &mut PgConnection,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<Habit>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, user_id, name, xp, level, actual_level_xp, next_level_xp,
               constance, dificulty, importance
        FROM habits
        WHERE id = $1 AND user_id = $2
        FOR UPDATE
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let category_ids = sqlx::query("SELECT category_id FROM habit_categories WHERE habit_id = $1")
        .bind(id)
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(|r| r.get("category_id"))
        .collect();

    Ok(Some(Habit {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        xp: xp_from_row(&row),
        constance: row.get("constance"),
        dificulty: row.get("dificulty"),
        importance: row.get("importance"),
        category_ids,
    }))
}

/// Persist a habit's XP and completion counter
pub async fn update_progress(conn: &mut PgConnection, habit: &Habit) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE habits
        SET xp = $2, level = $3, actual_level_xp = $4, next_level_xp = $5, constance = $6
        WHERE id = $1
        "#,
    )
    .bind(habit.id)
    .bind(habit.xp.xp)
    .bind(habit.xp.level)
    .bind(habit.xp.actual_level_xp)
    .bind(habit.xp.next_level_xp)
    .bind(habit.constance)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
