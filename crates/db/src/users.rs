//! User queries

use std::collections::BTreeSet;

use chrono::NaiveDate;
use common::models::{ConstanceConfiguration, User};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use crate::{decode_err, xp_from_row};

fn user_from_row(row: &PgRow, completed_days: BTreeSet<NaiveDate>) -> Result<User, sqlx::Error> {
    let config: String = row.get("constance_configuration");
    Ok(User {
        id: row.get("id"),
        name: row.get("name"),
        xp: xp_from_row(row),
        constance: row.get("constance"),
        max_constance: row.get("max_constance"),
        constance_configuration: ConstanceConfiguration::parse(&config)
            .ok_or_else(|| decode_err("constance_configuration", &config))?,
        completed_days,
    })
}

/// Completed days of a user
pub async fn completed_days(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<BTreeSet<NaiveDate>, sqlx::Error> {
    let rows = sqlx::query("SELECT day FROM user_completed_days WHERE user_id = $1")
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows.into_iter().map(|r| r.get("day")).collect())
}

/// Get a user and lock the row for the rest of the transaction
pub async fn get_for_update(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<Option<User>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, name, xp, level, actual_level_xp, next_level_xp,
               constance, max_constance, constance_configuration
        FROM users
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => {
            let days = completed_days(conn, id).await?;
            Ok(Some(user_from_row(&row, days)?))
        }
        None => Ok(None),
    }
}

/// Get user by ID without locking
pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    let mut conn = pool.acquire().await?;
    let row = sqlx::query(
        r#"
        SELECT id, name, xp, level, actual_level_xp, next_level_xp,
               constance, max_constance, constance_configuration
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => {
            let days = completed_days(&mut conn, id).await?;
            Ok(Some(user_from_row(&row, days)?))
        }
        None => Ok(None),
    }
}

/// IDs of every user, for batch recomputation
pub async fn list_ids(pool: &PgPool) -> Result<Vec<Uuid>, sqlx::Error> {
    let rows = sqlx::query("SELECT id FROM users ORDER BY created_at")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|r| r.get("id")).collect())
}

/// Persist XP and streak counters
pub async fn update_progress(conn: &mut PgConnection, user: &User) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE users
        SET xp = $2,
            level = $3,
            actual_level_xp = $4,
            next_level_xp = $5,
            constance = $6,
            max_constance = $7,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(user.id)
    .bind(user.xp.xp)
    .bind(user.xp.level)
    .bind(user.xp.actual_level_xp)
    .bind(user.xp.next_level_xp)
    .bind(user.constance)
    .bind(user.max_constance)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Persist only the streak counters
pub async fn update_constance(
    conn: &mut PgConnection,
    user_id: Uuid,
    constance: i32,
    max_constance: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE users
        SET constance = $2, max_constance = $3, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(constance)
    .bind(max_constance)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Record a completed day
pub async fn mark_day(
    conn: &mut PgConnection,
    user_id: Uuid,
    day: NaiveDate,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO user_completed_days (user_id, day)
        VALUES ($1, $2)
        ON CONFLICT (user_id, day) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(day)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Forget a completed day
pub async fn unmark_day(
    conn: &mut PgConnection,
    user_id: Uuid,
    day: NaiveDate,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM user_completed_days WHERE user_id = $1 AND day = $2")
        .bind(user_id)
        .bind(day)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
