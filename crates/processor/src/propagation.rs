//! XP propagation across every entity touched by one completion event

use common::models::{Category, XpProgress};
use common::Error;
use tracing::debug;

use crate::ladder::{LevelTable, XpLadder};

/// Entities receiving the same XP delta
pub struct XpTargets<'a> {
    pub user: &'a mut XpProgress,
    pub routine: Option<&'a mut XpProgress>,
    pub habit: Option<&'a mut XpProgress>,
    pub categories: &'a mut [Category],
}

impl<'a> XpTargets<'a> {
    /// Habit completion: user, routine, habit and its categories
    pub fn for_habit(
        user: &'a mut XpProgress,
        routine: &'a mut XpProgress,
        habit: &'a mut XpProgress,
        categories: &'a mut [Category],
    ) -> Self {
        Self {
            user,
            routine: Some(routine),
            habit: Some(habit),
            categories,
        }
    }

    /// Task completion: user, routine and the task's categories
    pub fn for_task(
        user: &'a mut XpProgress,
        routine: &'a mut XpProgress,
        categories: &'a mut [Category],
    ) -> Self {
        Self {
            user,
            routine: Some(routine),
            habit: None,
            categories,
        }
    }

    /// Goal completion: user and the goal's categories
    pub fn for_goal(user: &'a mut XpProgress, categories: &'a mut [Category]) -> Self {
        Self {
            user,
            routine: None,
            habit: None,
            categories,
        }
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Add,
    Remove,
}

/// Applies one XP delta to a whole bundle, all or nothing
pub struct XpCalculator<'t, T: LevelTable> {
    levels: &'t T,
}

impl<'t, T: LevelTable> XpCalculator<'t, T> {
    pub fn new(levels: &'t T) -> Self {
        Self { levels }
    }

    pub fn add(&self, targets: XpTargets<'_>, amount: f64) -> Result<(), Error> {
        self.apply(targets, amount, Direction::Add)
    }

    pub fn remove(&self, targets: XpTargets<'_>, amount: f64) -> Result<(), Error> {
        self.apply(targets, amount, Direction::Remove)
    }

    fn step(&self, progress: &mut XpProgress, amount: f64, direction: Direction) -> Result<(), Error> {
        match direction {
            Direction::Add => progress.add_xp(amount, self.levels),
            Direction::Remove => progress.remove_xp(amount, self.levels),
        }
    }

    fn apply(&self, targets: XpTargets<'_>, amount: f64, direction: Direction) -> Result<(), Error> {
        if amount < 0.0 {
            return Err(Error::InvalidRequest(format!(
                "XP delta must be non-negative, got {}",
                amount
            )));
        }

        // Work on copies; originals are only replaced once every member succeeded
        let mut user = targets.user.clone();
        self.step(&mut user, amount, direction)?;

        let routine = match targets.routine.as_deref() {
            Some(progress) => {
                let mut staged = progress.clone();
                self.step(&mut staged, amount, direction)?;
                Some(staged)
            }
            None => None,
        };

        let habit = match targets.habit.as_deref() {
            Some(progress) => {
                let mut staged = progress.clone();
                self.step(&mut staged, amount, direction)?;
                Some(staged)
            }
            None => None,
        };

        let mut categories = Vec::with_capacity(targets.categories.len());
        for category in targets.categories.iter() {
            let mut staged = category.xp.clone();
            self.step(&mut staged, amount, direction)?;
            categories.push(staged);
        }

        *targets.user = user;
        if let (Some(target), Some(staged)) = (targets.routine, routine) {
            *target = staged;
        }
        if let (Some(target), Some(staged)) = (targets.habit, habit) {
            *target = staged;
        }
        for (category, staged) in targets.categories.iter_mut().zip(categories) {
            category.xp = staged;
        }

        debug!(
            "Applied {} XP ({}) to user, {} categories",
            amount,
            match direction {
                Direction::Add => "add",
                Direction::Remove => "remove",
            },
            targets.categories.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ladder::StaticLevelTable;
    use uuid::Uuid;

    fn table() -> StaticLevelTable {
        StaticLevelTable::new([(1, 0.0), (2, 100.0), (3, 300.0)])
    }

    fn category(xp: f64, level: i32, actual: f64, next: f64) -> Category {
        Category {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "health".to_string(),
            xp: XpProgress {
                xp,
                level,
                actual_level_xp: actual,
                next_level_xp: next,
            },
        }
    }

    #[test]
    fn test_habit_bundle_applies_to_every_member() {
        let mut user = XpProgress::starting(100.0);
        let mut routine = XpProgress::starting(100.0);
        let mut habit = XpProgress::starting(100.0);
        let mut categories = vec![category(0.0, 1, 0.0, 100.0), category(50.0, 1, 0.0, 100.0)];

        XpCalculator::new(&table())
            .add(
                XpTargets::for_habit(&mut user, &mut routine, &mut habit, &mut categories),
                60.0,
            )
            .unwrap();

        assert_eq!(user.xp, 60.0);
        assert_eq!(routine.xp, 60.0);
        assert_eq!(habit.xp, 60.0);
        assert_eq!(categories[0].xp.xp, 60.0);
        assert_eq!(categories[1].xp.xp, 110.0);
        assert_eq!(categories[1].xp.level, 2);
    }

    #[test]
    fn test_empty_categories_is_a_noop_for_categories() {
        let mut user = XpProgress::starting(100.0);
        let mut categories: Vec<Category> = Vec::new();

        XpCalculator::new(&table())
            .add(XpTargets::for_goal(&mut user, &mut categories), 30.0)
            .unwrap();

        assert_eq!(user.xp, 30.0);
    }

    #[test]
    fn test_failure_leaves_no_partial_application() {
        let mut user = XpProgress::starting(100.0);
        let mut routine = XpProgress::starting(100.0);
        // This category climbs past the top of the table and fails
        let mut categories = vec![
            category(0.0, 1, 0.0, 100.0),
            category(250.0, 2, 100.0, 300.0),
        ];
        let before = categories.clone();

        let err = XpCalculator::new(&table())
            .add(
                XpTargets::for_task(&mut user, &mut routine, &mut categories),
                60.0,
            )
            .unwrap_err();

        assert!(matches!(err, Error::MissingLevel(4)));
        assert_eq!(user, XpProgress::starting(100.0));
        assert_eq!(routine, XpProgress::starting(100.0));
        assert_eq!(categories[0].xp, before[0].xp);
        assert_eq!(categories[1].xp, before[1].xp);
    }

    #[test]
    fn test_remove_is_inverse_of_add() {
        let mut user = XpProgress::starting(100.0);
        let mut categories = vec![category(90.0, 1, 0.0, 100.0)];
        let table = table();
        let calculator = XpCalculator::new(&table);

        calculator
            .add(XpTargets::for_goal(&mut user, &mut categories), 75.0)
            .unwrap();
        calculator
            .remove(XpTargets::for_goal(&mut user, &mut categories), 75.0)
            .unwrap();

        assert_eq!(user, XpProgress::starting(100.0));
        assert_eq!(categories[0].xp.xp, 90.0);
        assert_eq!(categories[0].xp.level, 1);
    }

    #[test]
    fn test_negative_delta_rejected() {
        let mut user = XpProgress::starting(100.0);
        let mut categories: Vec<Category> = Vec::new();

        let err = XpCalculator::new(&table())
            .add(XpTargets::for_goal(&mut user, &mut categories), -5.0)
            .unwrap_err();

        assert!(matches!(err, Error::InvalidRequest(_)));
    }
}
