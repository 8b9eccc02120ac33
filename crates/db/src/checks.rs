//! Check record queries
//!
//! `(group_id, check_date)` is unique, so writing a record for a date that
//! already has one replaces it in place.

use chrono::NaiveDate;
use common::models::{ItemCheck, ItemKind};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Row};
use uuid::Uuid;

use crate::decode_err;

fn check_from_row(row: &PgRow) -> Result<ItemCheck, sqlx::Error> {
    let kind: String = row.get("kind");
    Ok(ItemCheck {
        id: row.get("id"),
        group_id: row.get("group_id"),
        kind: ItemKind::parse(&kind).ok_or_else(|| decode_err("kind", &kind))?,
        check_date: row.get("check_date"),
        check_time: row.get("check_time"),
        checked: row.get("checked"),
        skipped: row.get("skipped"),
        xp_generated: row.get("xp_generated"),
    })
}

/// Get the record of a group on a date
pub async fn get_for_date(
    conn: &mut PgConnection,
    group_id: Uuid,
    date: NaiveDate,
) -> Result<Option<ItemCheck>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, group_id, kind, check_date, check_time, checked, skipped, xp_generated
        FROM item_checks
        WHERE group_id = $1 AND check_date = $2
        FOR UPDATE
        "#,
    )
    .bind(group_id)
    .bind(date)
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(check_from_row).transpose()
}

/// Insert a record, or override the existing one for the same (group, date)
pub async fn upsert(conn: &mut PgConnection, check: &ItemCheck) -> Result<ItemCheck, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO item_checks
            (id, group_id, kind, check_date, check_time, checked, skipped, xp_generated)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (group_id, check_date) DO UPDATE
        SET check_time = EXCLUDED.check_time,
            checked = EXCLUDED.checked,
            skipped = EXCLUDED.skipped,
            xp_generated = EXCLUDED.xp_generated
        RETURNING id, group_id, kind, check_date, check_time, checked, skipped, xp_generated
        "#,
    )
    .bind(check.id)
    .bind(check.group_id)
    .bind(check.kind.as_str())
    .bind(check.check_date)
    .bind(check.check_time)
    .bind(check.checked)
    .bind(check.skipped)
    .bind(check.xp_generated)
    .fetch_one(&mut *conn)
    .await?;

    check_from_row(&row)
}
