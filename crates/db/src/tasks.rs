//! Task queries

use chrono::NaiveDate;
use common::models::Task;
use sqlx::{PgConnection, Row};
use uuid::Uuid;

/// Get a task owned by `user_id`, with its category links
pub async fn get_for_user(
    conn: &mut PgConnection,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<Task>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, user_id, name, dificulty, importance, one_time_task, marked_to_delete
        FROM tasks
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

    let category_ids = sqlx::query("SELECT category_id FROM task_categories WHERE task_id = $1")
        .bind(id)
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(|r| r.get("category_id"))
        .collect();

    Ok(Some(Task {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        dificulty: row.get("dificulty"),
        importance: row.get("importance"),
        one_time_task: row.get("one_time_task"),
        marked_to_delete: row.get("marked_to_delete"),
        category_ids,
    }))
}

/// Set or clear the deferred deletion marker
pub async fn set_marked_to_delete(
    conn: &mut PgConnection,
    id: Uuid,
    marked_to_delete: Option<NaiveDate>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE tasks SET marked_to_delete = $2 WHERE id = $1")
        .bind(id)
        .bind(marked_to_delete)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
