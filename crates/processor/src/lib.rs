//! Gamification engine: XP ladder, streaks, goal rewards and item completion

pub mod completion;
pub mod goals;
pub mod handler;
pub mod ladder;
pub mod propagation;
pub mod recalculate;
pub mod streak;

#[cfg(test)]
mod ladder_test;
#[cfg(test)]
mod tests;

pub use handler::CheckItemService;
pub use ladder::{LevelTable, StaticLevelTable, XpLadder};
pub use recalculate::{recalculate_all_constance, RecalcService, RecalculationStats};

pub(crate) fn db_err(e: sqlx::Error) -> common::Error {
    common::Error::Database(e.to_string())
}
