//! Transactional check/uncheck/skip and goal completion handling

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use common::models::{Category, CheckRequest, Goal, ItemCheck, ItemKind, RefreshSnapshot, User};
use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use crate::completion::{
    apply_transition, ensure_categories_loaded, resolve_target, CompletionContext, CompletionItem,
    DayEffect, OtherRoutinesDay, SiblingState,
};
use crate::goals;
use crate::ladder::StaticLevelTable;
use crate::{db_err, streak};

/// Handles completion events for routines and goals
pub struct CheckItemService {
    pool: PgPool,
    levels: Arc<StaticLevelTable>,
}

impl CheckItemService {
    pub fn new(pool: PgPool, levels: Arc<StaticLevelTable>) -> Self {
        Self { pool, levels }
    }

    /// Build the service with the level table currently stored in the database
    pub async fn load(pool: PgPool) -> Result<Self, common::Error> {
        let rows = db::levels::load_all(&pool).await.map_err(db_err)?;
        if rows.is_empty() {
            return Err(common::Error::Config("Level table is empty".to_string()));
        }
        let levels = StaticLevelTable::new(rows);
        info!("Loaded {} levels (max {})", levels.len(), levels.max_level());
        Ok(Self::new(pool, Arc::new(levels)))
    }

    pub fn levels(&self) -> &StaticLevelTable {
        &self.levels
    }

    /// Check, uncheck, skip or unskip one item group for a date
    ///
    /// Times and deletion markers are stamped in UTC, the same clock the
    /// routes use for default dates.
    pub async fn check_item(
        &self,
        user_id: Uuid,
        request: CheckRequest,
    ) -> Result<RefreshSnapshot, common::Error> {
        self.check_item_at(user_id, request, Utc::now().naive_utc())
            .await
    }

    pub async fn check_item_at(
        &self,
        user_id: Uuid,
        request: CheckRequest,
        now: NaiveDateTime,
    ) -> Result<RefreshSnapshot, common::Error> {
        let (kind, target, action) = resolve_target(&request)?;

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let mut ctx = load_context(
            &mut tx,
            user_id,
            request.routine_id,
            kind,
            target.group_id,
            target.date,
        )
        .await?;
        let outcome = apply_transition(&mut ctx, action, now, self.levels.as_ref())?;

        persist_context(&mut tx, &ctx, &outcome.check, outcome.day).await?;
        tx.commit().await.map_err(|e| {
            warn!("Commit failed for group {}: {}", target.group_id, e);
            db_err(e)
        })?;

        info!(
            "{:?} {} group {} on {} for user {} ({} XP)",
            outcome.transition,
            kind.as_str(),
            target.group_id,
            target.date,
            user_id,
            outcome.xp_delta
        );
        Ok(ctx.snapshot(&outcome.check))
    }

    /// Complete a goal and pay out its reward
    pub async fn complete_goal(
        &self,
        user_id: Uuid,
        goal_id: Uuid,
        completed_on: NaiveDate,
    ) -> Result<Goal, common::Error> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let (mut goal, mut user, mut categories) = load_goal(&mut tx, user_id, goal_id).await?;

        goals::complete_goal(
            &mut goal,
            &mut user,
            &mut categories,
            completed_on,
            self.levels.as_ref(),
        )?;

        persist_goal(&mut tx, &goal, &user, &categories).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(goal)
    }

    /// Reopen a completed goal and take its reward back
    pub async fn uncomplete_goal(&self, user_id: Uuid, goal_id: Uuid) -> Result<Goal, common::Error> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let (mut goal, mut user, mut categories) = load_goal(&mut tx, user_id, goal_id).await?;

        goals::uncomplete_goal(&mut goal, &mut user, &mut categories, self.levels.as_ref())?;

        persist_goal(&mut tx, &goal, &user, &categories).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(goal)
    }

    /// Current streak of a user as seen on `reference`
    pub async fn current_constance(
        &self,
        user_id: Uuid,
        reference: NaiveDate,
    ) -> Result<(User, i32), common::Error> {
        let user = db::users::get_by_id(&self.pool, user_id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| common::Error::NotFound(format!("User {}", user_id)))?;
        let current = streak::current_constance(&user.completed_days, reference);
        Ok((user, current))
    }
}

async fn load_context(
    conn: &mut PgConnection,
    user_id: Uuid,
    routine_id: Uuid,
    kind: ItemKind,
    group_id: Uuid,
    date: NaiveDate,
) -> Result<CompletionContext, common::Error> {
    let user = db::users::get_for_update(conn, user_id)
        .await
        .map_err(db_err)?
        .ok_or_else(|| common::Error::NotFound(format!("User {}", user_id)))?;

    let routine = db::routines::get_for_user(conn, routine_id, user_id)
        .await
        .map_err(db_err)?
        .ok_or_else(|| common::Error::NotFound(format!("Routine {}", routine_id)))?;

    let group = db::groups::get_in_routine(conn, group_id, kind, routine_id)
        .await
        .map_err(db_err)?
        .ok_or_else(|| common::Error::NotFound(format!("Item group {}", group_id)))?;

    let item = match kind {
        ItemKind::Habit => {
            let habit = db::habits::get_for_user(conn, group.item_id, user_id)
                .await
                .map_err(db_err)?
                .ok_or_else(|| common::Error::NotFound(format!("Habit {}", group.item_id)))?;
            let categories = load_categories(conn, &habit.category_ids).await?;
            CompletionItem::Habit { habit, categories }
        }
        ItemKind::Task => {
            let task = db::tasks::get_for_user(conn, group.item_id, user_id)
                .await
                .map_err(db_err)?
                .ok_or_else(|| common::Error::NotFound(format!("Task {}", group.item_id)))?;
            let categories = load_categories(conn, &task.category_ids).await?;
            CompletionItem::Task { task, categories }
        }
    };

    let existing = db::checks::get_for_date(conn, group_id, date)
        .await
        .map_err(db_err)?;

    let siblings = db::groups::day_states(conn, routine_id, date, group_id)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(|(group_id, checked, skipped)| SiblingState {
            group_id,
            checked,
            skipped,
        })
        .collect();

    let (any_checked, any_complete) =
        db::groups::other_routines_day(conn, user_id, routine_id, date)
            .await
            .map_err(db_err)?;

    Ok(CompletionContext {
        user,
        routine,
        group,
        item,
        date,
        existing,
        siblings,
        other_routines: OtherRoutinesDay {
            any_checked,
            any_complete,
        },
    })
}

async fn load_categories(
    conn: &mut PgConnection,
    ids: &[Uuid],
) -> Result<Vec<Category>, common::Error> {
    let categories = db::categories::get_many(conn, ids).await.map_err(db_err)?;
    ensure_categories_loaded(ids, &categories)?;
    Ok(categories)
}

async fn persist_context(
    conn: &mut PgConnection,
    ctx: &CompletionContext,
    check: &ItemCheck,
    day: DayEffect,
) -> Result<(), common::Error> {
    db::users::update_progress(conn, &ctx.user)
        .await
        .map_err(db_err)?;
    match day {
        DayEffect::Marked => db::users::mark_day(conn, ctx.user.id, ctx.date)
            .await
            .map_err(db_err)?,
        DayEffect::Unmarked => db::users::unmark_day(conn, ctx.user.id, ctx.date)
            .await
            .map_err(db_err)?,
        DayEffect::Unchanged => {}
    }

    db::routines::update_xp(conn, &ctx.routine)
        .await
        .map_err(db_err)?;

    match &ctx.item {
        CompletionItem::Habit { habit, .. } => db::habits::update_progress(conn, habit)
            .await
            .map_err(db_err)?,
        CompletionItem::Task { task, .. } => {
            db::tasks::set_marked_to_delete(conn, task.id, task.marked_to_delete)
                .await
                .map_err(db_err)?
        }
    }

    for category in ctx.item.categories() {
        db::categories::update_xp(conn, category)
            .await
            .map_err(db_err)?;
    }

    db::checks::upsert(conn, check).await.map_err(db_err)?;
    Ok(())
}

async fn load_goal(
    conn: &mut PgConnection,
    user_id: Uuid,
    goal_id: Uuid,
) -> Result<(Goal, User, Vec<Category>), common::Error> {
    let user = db::users::get_for_update(conn, user_id)
        .await
        .map_err(db_err)?
        .ok_or_else(|| common::Error::NotFound(format!("User {}", user_id)))?;
    let goal = db::goals::get_for_user(conn, goal_id, user_id)
        .await
        .map_err(db_err)?
        .ok_or_else(|| common::Error::NotFound(format!("Goal {}", goal_id)))?;
    let categories = load_categories(conn, &goal.category_ids).await?;
    Ok((goal, user, categories))
}

async fn persist_goal(
    conn: &mut PgConnection,
    goal: &Goal,
    user: &User,
    categories: &[Category],
) -> Result<(), common::Error> {
    db::users::update_progress(conn, user)
        .await
        .map_err(db_err)?;
    for category in categories {
        db::categories::update_xp(conn, category)
            .await
            .map_err(db_err)?;
    }
    db::goals::update_completion(conn, goal)
        .await
        .map_err(db_err)?;
    Ok(())
}
