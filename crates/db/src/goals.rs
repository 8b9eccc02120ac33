//! Goal queries

use common::models::{Goal, GoalStatus};
use sqlx::{PgConnection, Row};
use uuid::Uuid;

use crate::decode_err;

/// Get a goal owned by `user_id`, with its category links
pub async fn get_for_user(
    conn: &mut PgConnection,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<Goal>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, user_id, name, target_value, current_value, start_date, end_date,
               complete, status, xp_reward
        FROM goals
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

    let category_ids = sqlx::query("SELECT category_id FROM goal_categories WHERE goal_id = $1")
        .bind(id)
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(|r| r.get("category_id"))
        .collect();

    let status: String = row.get("status");
    Ok(Some(Goal {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        target_value: row.get("target_value"),
        current_value: row.get("current_value"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        complete: row.get("complete"),
        status: GoalStatus::parse(&status).ok_or_else(|| decode_err("status", &status))?,
        xp_reward: row.get("xp_reward"),
        category_ids,
    }))
}

/// Persist completion state and reward
pub async fn update_completion(conn: &mut PgConnection, goal: &Goal) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE goals
        SET complete = $2, status = $3, xp_reward = $4
        WHERE id = $1
        "#,
    )
    .bind(goal.id)
    .bind(goal.complete)
    .bind(goal.status.as_str())
    .bind(goal.xp_reward)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
