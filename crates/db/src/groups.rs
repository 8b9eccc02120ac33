//! Item group queries
//!
//! A group is a habit or task placed in a routine section; `kind` says which.

use chrono::NaiveDate;
use common::models::{ItemGroup, ItemKind};
use sqlx::{PgConnection, Row};
use uuid::Uuid;

use crate::decode_err;

/// Get a group of the given kind that lives somewhere inside `routine_id`
pub async fn get_in_routine(
    conn: &mut PgConnection,
    group_id: Uuid,
    kind: ItemKind,
    routine_id: Uuid,
) -> Result<Option<ItemGroup>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT g.id, g.section_id, g.kind,
               COALESCE(g.habit_id, g.task_id) as item_id,
               g.start_time
        FROM item_groups g
        JOIN routine_sections s ON s.id = g.section_id
        WHERE g.id = $1 AND g.kind = $2 AND s.routine_id = $3
        "#,
    )
    .bind(group_id)
    .bind(kind.as_str())
    .bind(routine_id)
    .fetch_optional(&mut *conn)
    .await?;

    row.map(|r| {
        let kind: String = r.get("kind");
        Ok(ItemGroup {
            id: r.get("id"),
            section_id: r.get("section_id"),
            kind: ItemKind::parse(&kind).ok_or_else(|| decode_err("kind", &kind))?,
            item_id: r.get("item_id"),
            start_time: r.get("start_time"),
        })
    })
    .transpose()
}

/// State of every other group of a routine on `date`: (group id, checked, skipped)
///
/// Groups without a record for the date come back as neither checked nor skipped.
pub async fn day_states(
    conn: &mut PgConnection,
    routine_id: Uuid,
    date: NaiveDate,
    exclude_group: Uuid,
) -> Result<Vec<(Uuid, bool, bool)>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT g.id,
               COALESCE(c.checked, FALSE) as checked,
               COALESCE(c.skipped, FALSE) as skipped
        FROM item_groups g
        JOIN routine_sections s ON s.id = g.section_id
        LEFT JOIN item_checks c ON c.group_id = g.id AND c.check_date = $2
        WHERE s.routine_id = $1 AND g.id <> $3
        ORDER BY s.position, g.start_time NULLS LAST, g.id
        "#,
    )
    .bind(routine_id)
    .bind(date)
    .bind(exclude_group)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| (r.get("id"), r.get("checked"), r.get("skipped")))
        .collect())
}

/// How the user's routines other than `routine_id` stand on `date`
///
/// Returns (any group checked, any routine with every group checked or skipped).
/// Routines without groups never count as complete.
pub async fn other_routines_day(
    conn: &mut PgConnection,
    user_id: Uuid,
    routine_id: Uuid,
    date: NaiveDate,
) -> Result<(bool, bool), sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT
            EXISTS (
                SELECT 1
                FROM item_checks c
                JOIN item_groups g ON g.id = c.group_id
                JOIN routine_sections s ON s.id = g.section_id
                JOIN routines r ON r.id = s.routine_id
                WHERE r.user_id = $1 AND r.id <> $2
                  AND c.check_date = $3 AND c.checked
            ) as any_checked,
            EXISTS (
                SELECT 1
                FROM routines r
                WHERE r.user_id = $1 AND r.id <> $2
                  AND EXISTS (
                      SELECT 1
                      FROM item_groups g
                      JOIN routine_sections s ON s.id = g.section_id
                      WHERE s.routine_id = r.id
                  )
                  AND NOT EXISTS (
                      SELECT 1
                      FROM item_groups g
                      JOIN routine_sections s ON s.id = g.section_id
                      LEFT JOIN item_checks c ON c.group_id = g.id AND c.check_date = $3
                      WHERE s.routine_id = r.id
                        AND NOT COALESCE(c.checked OR c.skipped, FALSE)
                  )
            ) as any_complete
        "#,
    )
    .bind(user_id)
    .bind(routine_id)
    .bind(date)
    .fetch_one(&mut *conn)
    .await?;

    Ok((row.get("any_checked"), row.get("any_complete")))
}
