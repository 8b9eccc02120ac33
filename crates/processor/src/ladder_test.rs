#[cfg(test)]
mod tests {
    use crate::ladder::*;
    use common::models::XpProgress;
    use common::Error;

    fn table() -> StaticLevelTable {
        StaticLevelTable::new([(1, 0.0), (2, 100.0), (3, 300.0), (4, 600.0), (5, 1000.0)])
    }

    fn at_level_one(xp: f64) -> XpProgress {
        XpProgress {
            xp,
            level: 1,
            actual_level_xp: 0.0,
            next_level_xp: 100.0,
        }
    }

    #[test]
    fn test_add_xp_crosses_one_level() {
        let mut progress = at_level_one(90.0);
        progress.add_xp(20.0, &table()).unwrap();

        assert_eq!(progress.xp, 110.0);
        assert_eq!(progress.level, 2);
        assert_eq!(progress.actual_level_xp, 100.0);
        assert_eq!(progress.next_level_xp, 300.0);
    }

    #[test]
    fn test_add_xp_multi_level_jump() {
        let mut progress = at_level_one(90.0);
        progress.add_xp(400.0, &table()).unwrap();

        assert_eq!(progress.xp, 490.0);
        assert_eq!(progress.level, 3);
        assert_eq!(progress.actual_level_xp, 300.0);
        assert_eq!(progress.next_level_xp, 600.0);
    }

    #[test]
    fn test_add_xp_exactly_on_threshold_levels_up() {
        let mut progress = at_level_one(0.0);
        progress.add_xp(100.0, &table()).unwrap();

        assert_eq!(progress.level, 2);
    }

    #[test]
    fn test_add_then_remove_restores_xp() {
        let mut progress = at_level_one(90.0);
        progress.add_xp(20.0, &table()).unwrap();
        progress.remove_xp(20.0, &table()).unwrap();

        assert_eq!(progress, at_level_one(90.0));
    }

    #[test]
    fn test_remove_xp_descends_levels() {
        let mut progress = at_level_one(90.0);
        progress.add_xp(400.0, &table()).unwrap();
        progress.remove_xp(450.0, &table()).unwrap();

        assert_eq!(progress.xp, 40.0);
        assert_eq!(progress.level, 1);
        assert_eq!(progress.actual_level_xp, 0.0);
        assert_eq!(progress.next_level_xp, 100.0);
    }

    #[test]
    fn test_remove_xp_below_zero_keeps_level_one() {
        let mut progress = at_level_one(10.0);
        progress.remove_xp(30.0, &table()).unwrap();

        assert_eq!(progress.xp, -20.0);
        assert_eq!(progress.level, 1);
        assert_eq!(progress.actual_level_xp, 0.0);
    }

    #[test]
    fn test_remove_xp_to_negative_from_higher_level_does_not_descend() {
        // xp > 0 gates the descent: dropping straight past zero leaves level 3 untouched
        let mut progress = XpProgress {
            xp: 350.0,
            level: 3,
            actual_level_xp: 300.0,
            next_level_xp: 600.0,
        };
        progress.remove_xp(400.0, &table()).unwrap();

        assert_eq!(progress.xp, -50.0);
        assert_eq!(progress.level, 3);
        assert_eq!(progress.actual_level_xp, 300.0);
    }

    #[test]
    fn test_missing_level_is_an_error() {
        let mut progress = at_level_one(0.0);
        let err = progress.add_xp(5000.0, &table()).unwrap_err();

        assert!(matches!(err, Error::MissingLevel(6)));
    }

    #[test]
    fn test_level_zero_always_resolves_to_zero() {
        assert_eq!(table().lookup(0), Some(0.0));
        assert_eq!(StaticLevelTable::quadratic(10).lookup(0), Some(0.0));
    }

    #[test]
    fn test_quadratic_curve() {
        let table = StaticLevelTable::quadratic(5);

        assert_eq!(table.lookup(1), Some(0.0));
        assert_eq!(table.lookup(2), Some(100.0));
        assert_eq!(table.lookup(3), Some(400.0));
        assert_eq!(table.lookup(5), Some(1600.0));
        assert_eq!(table.max_level(), 5);
    }
}
