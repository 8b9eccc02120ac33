//! XP ladder: level bookkeeping for any entity carrying `XpProgress`

use std::collections::BTreeMap;

use common::models::XpProgress;
use common::Error;

/// Cumulative XP required to reach each level
pub trait LevelTable {
    /// XP threshold of `level`, `None` if the table has no such level
    fn lookup(&self, level: i32) -> Option<f64>;

    /// Like `lookup`, but a missing level is an error
    fn threshold(&self, level: i32) -> Result<f64, Error> {
        self.lookup(level).ok_or(Error::MissingLevel(level))
    }
}

/// In-memory level table keyed by exact level
#[derive(Debug, Clone, Default)]
pub struct StaticLevelTable {
    levels: BTreeMap<i32, f64>,
}

impl StaticLevelTable {
    pub fn new(levels: impl IntoIterator<Item = (i32, f64)>) -> Self {
        let mut levels: BTreeMap<i32, f64> = levels.into_iter().collect();
        // Level 0 always resolves to threshold 0
        levels.entry(0).or_insert(0.0);
        Self { levels }
    }

    /// Default curve: level L needs 100 * (L - 1)^2 XP
    pub fn quadratic(max_level: i32) -> Self {
        Self::new((1..=max_level).map(|level| {
            let steps = f64::from(level - 1);
            (level, 100.0 * steps * steps)
        }))
    }

    pub fn max_level(&self) -> i32 {
        self.levels.keys().next_back().copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl LevelTable for StaticLevelTable {
    fn lookup(&self, level: i32) -> Option<f64> {
        self.levels.get(&level).copied()
    }
}

/// XP mutation operations, kept as the only way level boundaries move
pub trait XpLadder {
    /// Add XP, climbing as many levels as the new total reaches
    fn add_xp(&mut self, amount: f64, table: &impl LevelTable) -> Result<(), Error>;

    /// Remove XP, descending levels while the total is still positive
    fn remove_xp(&mut self, amount: f64, table: &impl LevelTable) -> Result<(), Error>;
}

impl XpLadder for XpProgress {
    fn add_xp(&mut self, amount: f64, table: &impl LevelTable) -> Result<(), Error> {
        self.xp += amount;

        while self.xp >= self.next_level_xp {
            self.level += 1;
            self.actual_level_xp = table.threshold(self.level)?;
            self.next_level_xp = table.threshold(self.level + 1)?;
        }

        Ok(())
    }

    fn remove_xp(&mut self, amount: f64, table: &impl LevelTable) -> Result<(), Error> {
        self.xp -= amount;

        // Descent stops once XP is no longer positive, so negative XP keeps its level
        while self.xp < self.actual_level_xp && self.xp > 0.0 {
            self.level -= 1;
            self.actual_level_xp = table.threshold(self.level)?;
            self.next_level_xp = table.threshold(self.level + 1)?;
        }

        Ok(())
    }
}
