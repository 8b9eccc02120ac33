//! Constance recalculation and the background service that runs it

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use tokio::time::interval;
use tracing::{error, info};

use crate::streak::{current_constance, longest_run};

/// Recompute every user's streak from their completed days as of `today`
///
/// Stored `constance` only moves on completion events, so a user who stops
/// checking items keeps a stale streak until this runs. `max_constance` is
/// raised when the history holds a longer run and is never lowered.
pub async fn recalculate_all_constance(
    pool: &PgPool,
    today: NaiveDate,
) -> Result<RecalculationStats, sqlx::Error> {
    info!("Starting constance recalculation as of {}", today);

    let user_ids = db::users::list_ids(pool).await?;
    info!("Fetched {} users", user_ids.len());

    let mut users_updated = 0;
    let mut streaks_broken = 0;

    for user_id in &user_ids {
        let mut tx = pool.begin().await?;
        let Some(user) = db::users::get_for_update(&mut tx, *user_id).await? else {
            continue;
        };

        let constance = current_constance(&user.completed_days, today);
        let max_constance = user.max_constance.max(longest_run(&user.completed_days));

        if constance != user.constance || max_constance != user.max_constance {
            if constance < user.constance {
                streaks_broken += 1;
            }
            db::users::update_constance(&mut tx, user.id, constance, max_constance).await?;
            users_updated += 1;
        }
        tx.commit().await?;
    }

    info!(
        "Recalculation complete: {} users checked, {} updated, {} streaks broken",
        user_ids.len(),
        users_updated,
        streaks_broken
    );

    Ok(RecalculationStats {
        users_checked: user_ids.len(),
        users_updated,
        streaks_broken,
    })
}

#[derive(Debug)]
pub struct RecalculationStats {
    pub users_checked: usize,
    pub users_updated: usize,
    pub streaks_broken: usize,
}

/// Background service that periodically recalculates streaks
pub struct RecalcService {
    pool: PgPool,
    interval: Duration,
}

impl RecalcService {
    pub fn new(pool: PgPool, interval: Duration) -> Self {
        Self { pool, interval }
    }

    /// Start the background recalculation loop
    pub async fn run(self) {
        info!("Starting recalc service (interval: {:?})", self.interval);

        let mut ticker = interval(self.interval);

        // Skip the first immediate tick - let the server start up first
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let today = Utc::now().date_naive();
            if let Err(e) = recalculate_all_constance(&self.pool, today).await {
                error!("Recalculation failed: {}", e);
            }
        }
    }
}
