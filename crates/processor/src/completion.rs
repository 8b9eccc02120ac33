//! Check/uncheck/skip state machine for item groups inside a routine
//!
//! Everything here works on a `CompletionContext` that was loaded up front,
//! so a transition is a pure function of the loaded rows. Persisting the
//! mutated context is the caller's job.
//!
//! States per (group, date): no record, checked, unchecked, skipped, unskipped.
//! There is never more than one record per date; every transition reuses the
//! existing record when there is one.

use chrono::{NaiveDate, NaiveDateTime};
use common::models::{
    Category, CheckRequest, CheckSummary, ConstanceConfiguration, GroupRef, Habit, ItemCheck,
    ItemGroup, ItemKind, ProgressSummary, RefreshSnapshot, Routine, Task, User, UserSummary,
};
use common::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::ladder::LevelTable;
use crate::propagation::{XpCalculator, XpTargets};
use crate::streak;

/// XP granted per point of `dificulty * importance`
const XP_PER_EFFORT_POINT: f64 = 10.0;

/// What the request asks for, before looking at the stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckAction {
    /// Check, or uncheck when already checked
    Toggle,
    /// Skip, or unskip when already skipped
    Skip,
}

/// Transition actually taken for the date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Check,
    Uncheck,
    Skip,
    Unskip,
}

/// Effect of a transition on the user's completed days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayEffect {
    Marked,
    Unmarked,
    Unchanged,
}

/// The habit or task a group points at, with the categories it feeds
#[derive(Debug, Clone)]
pub enum CompletionItem {
    Habit {
        habit: Habit,
        categories: Vec<Category>,
    },
    Task {
        task: Task,
        categories: Vec<Category>,
    },
}

impl CompletionItem {
    pub fn kind(&self) -> ItemKind {
        match self {
            CompletionItem::Habit { .. } => ItemKind::Habit,
            CompletionItem::Task { .. } => ItemKind::Task,
        }
    }

    pub fn owner_id(&self) -> Uuid {
        match self {
            CompletionItem::Habit { habit, .. } => habit.user_id,
            CompletionItem::Task { task, .. } => task.user_id,
        }
    }

    pub fn categories(&self) -> &[Category] {
        match self {
            CompletionItem::Habit { categories, .. } | CompletionItem::Task { categories, .. } => {
                categories
            }
        }
    }

    fn xp_for_check(&self) -> f64 {
        match self {
            CompletionItem::Habit { habit, .. } => {
                XP_PER_EFFORT_POINT * f64::from(habit.dificulty) * f64::from(habit.importance)
            }
            // Tasks only earn XP through their categories
            CompletionItem::Task { task, categories } if !categories.is_empty() => {
                XP_PER_EFFORT_POINT * f64::from(task.dificulty) * f64::from(task.importance)
            }
            CompletionItem::Task { .. } => 0.0,
        }
    }
}

/// State of another group of the same routine on the same date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiblingState {
    pub group_id: Uuid,
    pub checked: bool,
    pub skipped: bool,
}

/// The user's other routines on the same date
///
/// Completed days belong to the user, so a day earned in one routine must
/// survive an uncheck in another.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OtherRoutinesDay {
    /// Some group in another routine is checked on the date
    pub any_checked: bool,
    /// Another routine has every group checked or skipped on the date
    pub any_complete: bool,
}

/// Every row one check/uncheck/skip event can read or write
#[derive(Debug, Clone)]
pub struct CompletionContext {
    pub user: User,
    pub routine: Routine,
    pub group: ItemGroup,
    pub item: CompletionItem,
    pub date: NaiveDate,
    /// Stored record for (group, date), if any
    pub existing: Option<ItemCheck>,
    /// The routine's other groups and their state on `date`
    pub siblings: Vec<SiblingState>,
    pub other_routines: OtherRoutinesDay,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOutcome {
    pub transition: Transition,
    /// Record to store for (group, date), replacing any existing one
    pub check: ItemCheck,
    pub xp_delta: f64,
    pub day: DayEffect,
}

/// Pull the single targeted group out of a request
pub fn resolve_target(request: &CheckRequest) -> Result<(ItemKind, GroupRef, CheckAction), Error> {
    let action = if request.skip.unwrap_or(false) {
        CheckAction::Skip
    } else {
        CheckAction::Toggle
    };

    match (&request.habit_group, &request.task_group) {
        (Some(group), None) => Ok((ItemKind::Habit, group.clone(), action)),
        (None, Some(group)) => Ok((ItemKind::Task, group.clone(), action)),
        (None, None) => Err(Error::InvalidRequest(
            "Request names neither a habit group nor a task group".to_string(),
        )),
        (Some(_), Some(_)) => Err(Error::InvalidRequest(
            "Request names both a habit group and a task group".to_string(),
        )),
    }
}

/// Fail with `NotFound` unless every linked category id was loaded
pub fn ensure_categories_loaded(ids: &[Uuid], categories: &[Category]) -> Result<(), Error> {
    match ids.iter().find(|id| !categories.iter().any(|c| c.id == **id)) {
        Some(id) => Err(Error::NotFound(format!("Category {}", id))),
        None => Ok(()),
    }
}

/// Decide the transition from the stored record and the requested action
pub fn resolve_transition(
    existing: Option<&ItemCheck>,
    action: CheckAction,
) -> Result<Transition, Error> {
    let (checked, skipped) = existing.map_or((false, false), |c| (c.checked, c.skipped));

    match action {
        CheckAction::Toggle if checked => Ok(Transition::Uncheck),
        CheckAction::Toggle => Ok(Transition::Check),
        CheckAction::Skip if checked => Err(Error::InvalidRequest(
            "Cannot skip an item that is already checked".to_string(),
        )),
        CheckAction::Skip if skipped => Ok(Transition::Unskip),
        CheckAction::Skip => Ok(Transition::Skip),
    }
}

impl CompletionContext {
    fn ensure_owned(&self) -> Result<(), Error> {
        let user_id = self.user.id;
        if self.routine.user_id != user_id {
            return Err(Error::NotFound(format!("Routine {}", self.routine.id)));
        }
        if self.item.owner_id() != user_id {
            return Err(Error::NotFound(format!("Item group {}", self.group.id)));
        }
        if self.item.categories().iter().any(|c| c.user_id != user_id) {
            return Err(Error::NotFound(format!(
                "Categories of item group {}",
                self.group.id
            )));
        }
        if self.group.kind != self.item.kind() {
            return Err(Error::NotFound(format!("Item group {}", self.group.id)));
        }
        Ok(())
    }

    fn apply_xp(&mut self, amount: f64, remove: bool, levels: &impl LevelTable) -> Result<(), Error> {
        if amount == 0.0 {
            return Ok(());
        }
        let calculator = XpCalculator::new(levels);
        let targets = match &mut self.item {
            CompletionItem::Habit { habit, categories } => XpTargets::for_habit(
                &mut self.user.xp,
                &mut self.routine.xp,
                &mut habit.xp,
                categories,
            ),
            CompletionItem::Task { categories, .. } => {
                XpTargets::for_task(&mut self.user.xp, &mut self.routine.xp, categories)
            }
        };
        if remove {
            calculator.remove(targets, amount)
        } else {
            calculator.add(targets, amount)
        }
    }

    fn day_is_complete(&self, check: &ItemCheck) -> bool {
        (check.checked || check.skipped) && self.siblings.iter().all(|s| s.checked || s.skipped)
    }

    fn any_checked(&self, check: &ItemCheck) -> bool {
        check.checked || self.siblings.iter().any(|s| s.checked) || self.other_routines.any_checked
    }

    fn update_day(&mut self, transition: Transition, check: &ItemCheck) -> DayEffect {
        let date = self.date;
        let already = self.user.completed_days.contains(&date);

        let mark = match (self.user.constance_configuration, transition) {
            (ConstanceConfiguration::AnyItem, Transition::Check) => !already,
            (ConstanceConfiguration::Complete, Transition::Check | Transition::Skip) => {
                !already && self.day_is_complete(check)
            }
            _ => false,
        };
        let unmark = match (self.user.constance_configuration, transition) {
            (ConstanceConfiguration::AnyItem, Transition::Uncheck) => {
                already && !self.any_checked(check)
            }
            (ConstanceConfiguration::Complete, Transition::Uncheck | Transition::Unskip) => {
                already && !self.day_is_complete(check) && !self.other_routines.any_complete
            }
            _ => false,
        };

        if mark {
            streak::mark_day_completed(&mut self.user, date);
            DayEffect::Marked
        } else if unmark {
            streak::unmark_day_complete(&mut self.user, date);
            DayEffect::Unmarked
        } else {
            DayEffect::Unchanged
        }
    }

    /// Read model of the context after a transition
    pub fn snapshot(&self, check: &ItemCheck) -> RefreshSnapshot {
        let habit = match &self.item {
            CompletionItem::Habit { habit, .. } => Some(ProgressSummary::of(habit.id, &habit.xp)),
            CompletionItem::Task { .. } => None,
        };

        RefreshSnapshot {
            user: UserSummary {
                id: self.user.id,
                xp: self.user.xp.xp,
                level: self.user.xp.level,
                constance: self.user.constance,
                max_constance: self.user.max_constance,
            },
            routine: ProgressSummary::of(self.routine.id, &self.routine.xp),
            habit,
            categories: self
                .item
                .categories()
                .iter()
                .map(|c| ProgressSummary::of(c.id, &c.xp))
                .collect(),
            check: CheckSummary {
                group_id: check.group_id,
                date: check.check_date,
                checked: check.checked,
                skipped: check.skipped,
                xp_generated: check.xp_generated,
            },
        }
    }
}

/// Run one check/uncheck/skip event against a loaded context
///
/// On error the context may be left untouched or partially updated in memory,
/// so callers must discard it rather than persist it.
pub fn apply_transition(
    ctx: &mut CompletionContext,
    action: CheckAction,
    now: NaiveDateTime,
    levels: &impl LevelTable,
) -> Result<CompletionOutcome, Error> {
    ctx.ensure_owned()?;
    if let Some(existing) = &ctx.existing {
        if existing.group_id != ctx.group.id || existing.check_date != ctx.date {
            return Err(Error::Internal(format!(
                "Loaded check {} does not belong to group {} on {}",
                existing.id, ctx.group.id, ctx.date
            )));
        }
    }

    let transition = resolve_transition(ctx.existing.as_ref(), action)?;
    let today = now.date();

    let mut check = ctx.existing.clone().unwrap_or_else(|| ItemCheck {
        id: Uuid::new_v4(),
        group_id: ctx.group.id,
        kind: ctx.group.kind,
        check_date: ctx.date,
        check_time: now.time(),
        checked: false,
        skipped: false,
        xp_generated: 0.0,
    });
    check.check_time = now.time();

    let xp_delta = match transition {
        Transition::Check => {
            let xp = ctx.item.xp_for_check();
            ctx.apply_xp(xp, false, levels)?;
            match &mut ctx.item {
                CompletionItem::Habit { habit, .. } => habit.constance += 1,
                CompletionItem::Task { task, .. } if task.one_time_task => {
                    task.marked_to_delete = Some(today);
                }
                CompletionItem::Task { .. } => {}
            }
            check.checked = true;
            check.skipped = false;
            check.xp_generated = xp;
            xp
        }
        Transition::Uncheck => {
            let xp = check.xp_generated;
            ctx.apply_xp(xp, true, levels)?;
            match &mut ctx.item {
                CompletionItem::Habit { habit, .. } => habit.constance -= 1,
                CompletionItem::Task { task, .. } if task.one_time_task => {
                    task.marked_to_delete = None;
                }
                CompletionItem::Task { .. } => {}
            }
            check.checked = false;
            check.xp_generated = 0.0;
            -xp
        }
        Transition::Skip => {
            check.checked = false;
            check.skipped = true;
            check.xp_generated = 0.0;
            0.0
        }
        Transition::Unskip => {
            check.skipped = false;
            0.0
        }
    };

    let day = ctx.update_day(transition, &check);

    debug!(
        "Group {} on {}: {:?} ({} XP, day {:?})",
        ctx.group.id, ctx.date, transition, xp_delta, day
    );
    if transition == Transition::Check && xp_delta > 0.0 {
        info!(
            "User {} earned {} XP from {} group {}",
            ctx.user.id,
            xp_delta,
            ctx.group.kind.as_str(),
            ctx.group.id
        );
    }

    ctx.existing = Some(check.clone());
    Ok(CompletionOutcome {
        transition,
        check,
        xp_delta,
        day,
    })
}
