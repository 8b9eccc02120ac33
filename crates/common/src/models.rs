//! Domain models

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Experience and level state embedded in users, routines, habits and categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XpProgress {
    pub xp: f64,
    pub level: i32,
    /// XP threshold of the current level
    pub actual_level_xp: f64,
    /// XP threshold of `level + 1`
    pub next_level_xp: f64,
}

impl XpProgress {
    /// Fresh progress sitting at level 1 with no XP
    pub fn starting(next_level_xp: f64) -> Self {
        Self {
            xp: 0.0,
            level: 1,
            actual_level_xp: 0.0,
            next_level_xp,
        }
    }
}

/// How a calendar day qualifies for the user's streak
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstanceConfiguration {
    /// One checked item is enough
    #[default]
    AnyItem,
    /// Every item group of the routine must be checked or skipped
    Complete,
}

impl ConstanceConfiguration {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstanceConfiguration::AnyItem => "ANY_ITEM",
            ConstanceConfiguration::Complete => "COMPLETE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ANY_ITEM" => Some(ConstanceConfiguration::AnyItem),
            "COMPLETE" => Some(ConstanceConfiguration::Complete),
            _ => None,
        }
    }
}

/// A tracker user with the streak-relevant fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub xp: XpProgress,
    /// Current streak as of the last recompute
    pub constance: i32,
    /// All-time streak high-water mark
    pub max_constance: i32,
    pub constance_configuration: ConstanceConfiguration,
    pub completed_days: BTreeSet<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub xp: XpProgress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub xp: XpProgress,
    /// Lifetime completion counter
    pub constance: i32,
    pub dificulty: i32,
    pub importance: i32,
    pub category_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub dificulty: i32,
    pub importance: i32,
    pub one_time_task: bool,
    /// Deferred deletion marker set when a one-time task is completed
    pub marked_to_delete: Option<NaiveDate>,
    pub category_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Routine {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub xp: XpProgress,
}

/// Which kind of item a group places inside a routine section
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Habit,
    Task,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Habit => "habit",
            ItemKind::Task => "task",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "habit" => Some(ItemKind::Habit),
            "task" => Some(ItemKind::Task),
            _ => None,
        }
    }
}

/// Placement of a habit or task inside a routine section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemGroup {
    pub id: Uuid,
    pub section_id: Uuid,
    pub kind: ItemKind,
    /// Habit or task id, depending on `kind`
    pub item_id: Uuid,
    pub start_time: Option<NaiveTime>,
}

/// Completion record of one item group on one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCheck {
    pub id: Uuid,
    pub group_id: Uuid,
    pub kind: ItemKind,
    pub check_date: NaiveDate,
    pub check_time: NaiveTime,
    pub checked: bool,
    pub skipped: bool,
    pub xp_generated: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalStatus {
    InProgress,
    Completed,
    Failed,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::InProgress => "IN_PROGRESS",
            GoalStatus::Completed => "COMPLETED",
            GoalStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "IN_PROGRESS" => Some(GoalStatus::InProgress),
            "COMPLETED" => Some(GoalStatus::Completed),
            "FAILED" => Some(GoalStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub target_value: f64,
    pub current_value: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub complete: bool,
    pub status: GoalStatus,
    /// One-shot reward, zero while the goal is not complete
    pub xp_reward: f64,
    pub category_ids: Vec<Uuid>,
}

/// Reference to an item group on a given date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRef {
    pub group_id: Uuid,
    pub date: NaiveDate,
}

/// Check/uncheck/skip request for one item group of a routine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRequest {
    pub routine_id: Uuid,
    #[serde(default)]
    pub task_group: Option<GroupRef>,
    #[serde(default)]
    pub habit_group: Option<GroupRef>,
    #[serde(default)]
    pub skip: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressSummary {
    pub id: Uuid,
    pub xp: f64,
    pub level: i32,
    pub actual_level_xp: f64,
    pub next_level_xp: f64,
}

impl ProgressSummary {
    pub fn of(id: Uuid, progress: &XpProgress) -> Self {
        Self {
            id,
            xp: progress.xp,
            level: progress.level,
            actual_level_xp: progress.actual_level_xp,
            next_level_xp: progress.next_level_xp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub id: Uuid,
    pub xp: f64,
    pub level: i32,
    pub constance: i32,
    pub max_constance: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckSummary {
    pub group_id: Uuid,
    pub date: NaiveDate,
    pub checked: bool,
    pub skipped: bool,
    pub xp_generated: f64,
}

/// Read model of the state left behind by one completion event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefreshSnapshot {
    pub user: UserSummary,
    pub routine: ProgressSummary,
    pub habit: Option<ProgressSummary>,
    pub categories: Vec<ProgressSummary>,
    pub check: CheckSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_request_defaults_missing_groups() {
        let json = r#"{
            "routine_id": "6f1c2d9e-1a7b-4c55-9a0e-3b2f6d8e1c44",
            "habit_group": { "group_id": "0b6f7a52-2c1e-4f0a-8d3b-5e9c1a2b3c4d", "date": "2026-03-02" }
        }"#;
        let request: CheckRequest = serde_json::from_str(json).unwrap();

        assert!(request.task_group.is_none());
        assert!(request.skip.is_none());
        assert_eq!(
            request.habit_group.unwrap().date,
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
        );
    }

    #[test]
    fn test_enum_string_forms_round_trip() {
        for kind in [ItemKind::Habit, ItemKind::Task] {
            assert_eq!(ItemKind::parse(kind.as_str()), Some(kind));
        }
        for status in [GoalStatus::InProgress, GoalStatus::Completed, GoalStatus::Failed] {
            assert_eq!(GoalStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(
            ConstanceConfiguration::parse("COMPLETE"),
            Some(ConstanceConfiguration::Complete)
        );
        assert_eq!(ConstanceConfiguration::parse("sometimes"), None);
    }
}
