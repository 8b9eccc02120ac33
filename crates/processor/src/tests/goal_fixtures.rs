//! Goal reward vectors and goal completion scenarios
//!
//! The reward vectors in `fixtures/goal_rewards.json` are the reference
//! values the tier constants are calibrated against.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::goals::{calculate_goal_xp, complete_goal, is_completed_early, uncomplete_goal};
use crate::ladder::StaticLevelTable;
use common::models::{
    Category, ConstanceConfiguration, Goal, GoalStatus, User, XpProgress,
};
use common::Error;

#[derive(Debug, Deserialize)]
struct RewardFixture {
    name: String,
    target_value: f64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    completed_early: bool,
    xp: f64,
}

fn load_fixtures() -> Vec<RewardFixture> {
    serde_json::from_str(include_str!("fixtures/goal_rewards.json")).expect("Invalid JSON")
}

fn day(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, m, d).unwrap()
}

fn make_user() -> User {
    User {
        id: Uuid::new_v4(),
        name: "ana".to_string(),
        xp: XpProgress::starting(100.0),
        constance: 0,
        max_constance: 0,
        constance_configuration: ConstanceConfiguration::AnyItem,
        completed_days: BTreeSet::new(),
    }
}

fn make_goal(user_id: Uuid, category_ids: Vec<Uuid>) -> Goal {
    Goal {
        id: Uuid::new_v4(),
        user_id,
        name: "read 20 books".to_string(),
        target_value: 20.0,
        current_value: 20.0,
        start_date: day(1, 1),
        end_date: day(1, 31),
        complete: false,
        status: GoalStatus::InProgress,
        xp_reward: 0.0,
        category_ids,
    }
}

#[test]
fn test_reward_fixtures() {
    let fixtures = load_fixtures();
    assert_eq!(fixtures.len(), 4);

    for f in fixtures {
        let xp = calculate_goal_xp(f.target_value, f.start_date, f.end_date, f.completed_early);
        assert_eq!(xp, f.xp, "fixture '{}'", f.name);
    }
}

#[test]
fn test_tier_boundaries_are_inclusive() {
    let start = day(1, 1);
    let end = day(6, 1);

    assert_eq!(calculate_goal_xp(5.0, start, end, false), 65.0);
    assert_eq!(calculate_goal_xp(5.5, start, end, false), 156.0);
    assert_eq!(calculate_goal_xp(50.0, start, end, false), 156.0);
    assert_eq!(calculate_goal_xp(200.0, start, end, false), 390.0);
    assert_eq!(calculate_goal_xp(201.0, start, end, false), 780.0);
}

#[test]
fn test_urgency_windows() {
    let start = day(1, 1);

    let week = calculate_goal_xp(2.0, start, day(1, 8), false);
    let month = calculate_goal_xp(2.0, start, day(1, 31), false);
    let longer = calculate_goal_xp(2.0, start, day(2, 1), false);

    assert_eq!(week, 98.0);
    assert_eq!(month, 78.0);
    assert_eq!(longer, 65.0);
}

#[test]
fn test_early_margin() {
    let end = day(1, 31);

    assert!(is_completed_early(day(1, 30), end));
    assert!(is_completed_early(day(1, 2), end));
    assert!(!is_completed_early(day(1, 31), end));
    assert!(!is_completed_early(day(2, 3), end));
}

#[test]
fn test_complete_then_uncomplete_goal() {
    let levels = StaticLevelTable::quadratic(50);
    let mut user = make_user();
    let mut categories = vec![Category {
        id: Uuid::new_v4(),
        user_id: user.id,
        name: "reading".to_string(),
        xp: XpProgress::starting(100.0),
    }];
    let mut goal = make_goal(user.id, vec![categories[0].id]);

    // Finished on the last day: not early
    let reward = complete_goal(&mut goal, &mut user, &mut categories, day(1, 31), &levels).unwrap();

    assert_eq!(reward, 187.0);
    assert!(goal.complete);
    assert_eq!(goal.status, GoalStatus::Completed);
    assert_eq!(goal.xp_reward, 187.0);
    assert_eq!(user.xp.xp, 187.0);
    assert_eq!(user.xp.level, 2);
    assert_eq!(categories[0].xp.xp, 187.0);

    let removed = uncomplete_goal(&mut goal, &mut user, &mut categories, &levels).unwrap();

    assert_eq!(removed, 187.0);
    assert!(!goal.complete);
    assert_eq!(goal.status, GoalStatus::InProgress);
    assert_eq!(goal.xp_reward, 0.0);
    assert_eq!(user.xp.xp, 0.0);
    assert_eq!(categories[0].xp.xp, 0.0);
    // Landing exactly on zero does not walk the level back down
    assert_eq!(user.xp.level, 2);
    assert_eq!(categories[0].xp.level, 2);
}

#[test]
fn test_goal_completion_is_one_shot() {
    let levels = StaticLevelTable::quadratic(50);
    let mut user = make_user();
    let mut categories: Vec<Category> = Vec::new();
    let mut goal = make_goal(user.id, Vec::new());

    complete_goal(&mut goal, &mut user, &mut categories, day(1, 10), &levels).unwrap();
    let xp_after_first = user.xp.xp;

    let err = complete_goal(&mut goal, &mut user, &mut categories, day(1, 11), &levels).unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert_eq!(user.xp.xp, xp_after_first);
}

#[test]
fn test_uncomplete_open_goal_rejected() {
    let levels = StaticLevelTable::quadratic(50);
    let mut user = make_user();
    let mut categories: Vec<Category> = Vec::new();
    let mut goal = make_goal(user.id, Vec::new());

    let err = uncomplete_goal(&mut goal, &mut user, &mut categories, &levels).unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[test]
fn test_goal_with_foreign_category_not_found() {
    let levels = StaticLevelTable::quadratic(50);
    let mut user = make_user();
    let mut categories = vec![Category {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        name: "reading".to_string(),
        xp: XpProgress::starting(100.0),
    }];
    let mut goal = make_goal(user.id, vec![categories[0].id]);

    let err = complete_goal(&mut goal, &mut user, &mut categories, day(1, 10), &levels).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert!(!goal.complete);
    assert_eq!(user.xp, XpProgress::starting(100.0));
    assert_eq!(categories[0].xp, XpProgress::starting(100.0));
}

#[test]
fn test_foreign_goal_not_found() {
    let levels = StaticLevelTable::quadratic(50);
    let mut user = make_user();
    let mut categories: Vec<Category> = Vec::new();
    let mut goal = make_goal(Uuid::new_v4(), Vec::new());

    let err = complete_goal(&mut goal, &mut user, &mut categories, day(1, 10), &levels).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(goal.xp_reward, 0.0);
}
