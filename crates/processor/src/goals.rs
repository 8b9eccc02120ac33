//! Goal rewards and goal completion

use chrono::{Duration, NaiveDate};
use common::models::{Category, Goal, GoalStatus, User};
use common::Error;
use tracing::info;

use crate::ladder::LevelTable;
use crate::propagation::{XpCalculator, XpTargets};

/// Multiplier every completed goal earns for keeping up with it
const CONSTANCE_BONUS: f64 = 1.3;
/// Extra multiplier for goals finished ahead of their end date
const EARLY_COMPLETION_BONUS: f64 = 1.25;
/// Days before `end_date` a completion must land to count as early
const EARLY_MARGIN_DAYS: i64 = 1;

/// Size tier of a goal target: (base xp, difficulty multiplier)
fn target_tier(target_value: f64) -> (f64, f64) {
    if target_value <= 5.0 {
        (50.0, 1.0)
    } else if target_value <= 50.0 {
        (100.0, 1.2)
    } else if target_value <= 200.0 {
        (200.0, 1.5)
    } else {
        (300.0, 2.0)
    }
}

fn urgency_multiplier(window_days: i64) -> f64 {
    match window_days {
        d if d <= 7 => 1.5,
        d if d <= 30 => 1.2,
        _ => 1.0,
    }
}

/// One-shot XP reward for completing a goal, rounded to whole points
pub fn calculate_goal_xp(
    target_value: f64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    completed_early: bool,
) -> f64 {
    let (base, difficulty) = target_tier(target_value);
    let window_days = (end_date - start_date).num_days().max(0);
    let urgency = urgency_multiplier(window_days);
    let early = if completed_early {
        EARLY_COMPLETION_BONUS
    } else {
        1.0
    };

    (base * difficulty * urgency * CONSTANCE_BONUS * early).round()
}

/// Whether a completion on `completed_on` beats `end_date` by the early margin
pub fn is_completed_early(completed_on: NaiveDate, end_date: NaiveDate) -> bool {
    completed_on <= end_date - Duration::days(EARLY_MARGIN_DAYS)
}

fn ensure_goal_owned(goal: &Goal, user: &User, categories: &[Category]) -> Result<(), Error> {
    if goal.user_id != user.id {
        return Err(Error::NotFound(format!("Goal {}", goal.id)));
    }
    if categories.iter().any(|c| c.user_id != user.id) {
        return Err(Error::NotFound(format!("Categories of goal {}", goal.id)));
    }
    Ok(())
}

/// Mark a goal complete and pay its reward to the user and the goal's categories
pub fn complete_goal(
    goal: &mut Goal,
    user: &mut User,
    categories: &mut [Category],
    completed_on: NaiveDate,
    levels: &impl LevelTable,
) -> Result<f64, Error> {
    ensure_goal_owned(goal, user, categories)?;
    if goal.complete {
        return Err(Error::Conflict(format!("Goal {} is already complete", goal.id)));
    }

    let early = is_completed_early(completed_on, goal.end_date);
    let reward = calculate_goal_xp(goal.target_value, goal.start_date, goal.end_date, early);

    XpCalculator::new(levels).add(XpTargets::for_goal(&mut user.xp, categories), reward)?;

    goal.xp_reward = reward;
    goal.complete = true;
    goal.status = GoalStatus::Completed;

    info!(
        "Goal {} completed by {} (early: {}), awarded {} XP",
        goal.id, user.id, early, reward
    );
    Ok(reward)
}

/// Revert a completed goal, removing exactly the reward it paid out
pub fn uncomplete_goal(
    goal: &mut Goal,
    user: &mut User,
    categories: &mut [Category],
    levels: &impl LevelTable,
) -> Result<f64, Error> {
    ensure_goal_owned(goal, user, categories)?;
    if !goal.complete {
        return Err(Error::Conflict(format!("Goal {} is not complete", goal.id)));
    }

    let reward = goal.xp_reward;
    XpCalculator::new(levels).remove(XpTargets::for_goal(&mut user.xp, categories), reward)?;

    goal.xp_reward = 0.0;
    goal.complete = false;
    goal.status = GoalStatus::InProgress;

    info!("Goal {} reopened by {}, removed {} XP", goal.id, user.id, reward);
    Ok(reward)
}
