//! The verdict depends only on the grid, never on how the work was split.

use proptest::prelude::*;

use gridcheck::scheduler::WorkerExit;
use gridcheck::{
    validate_parallel, validate_sequential, GenerateConfig, LockStrategy, RunConfig, Verdict,
};

fn run_config() -> impl Strategy<Value = RunConfig> {
    (
        1usize..9,
        1usize..10,
        prop_oneof![Just(LockStrategy::Mutex), Just(LockStrategy::TestAndSet)],
    )
        .prop_map(|(workers, batch, lock)| RunConfig {
            workers,
            batch,
            lock,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn solved_grids_are_valid_under_any_split(
        box_size in 1usize..4,
        seed in any::<u64>(),
        config in run_config(),
    ) {
        let grid = GenerateConfig { box_size, seed, corrupt: false }.generate();
        let report = validate_parallel(&grid, &config);
        prop_assert_eq!(report.verdict, Verdict::Valid);
        prop_assert_eq!(report.units_granted(), 3 * grid.side());
        prop_assert_eq!(report.error_events().count(), 0);
        prop_assert!(report.workers.iter().all(|w| w.exit == WorkerExit::Exhausted));
    }

    #[test]
    fn corrupted_grids_are_invalid_under_any_split(
        box_size in 2usize..4,
        seed in any::<u64>(),
        config in run_config(),
    ) {
        let grid = GenerateConfig { box_size, seed, corrupt: true }.generate();
        let report = validate_parallel(&grid, &config);
        prop_assert_eq!(report.verdict, Verdict::Invalid);
        prop_assert_eq!(validate_sequential(&grid).verdict, Verdict::Invalid);
        prop_assert!(report.error_events().count() >= 1);
        prop_assert!(report.units_granted() <= 3 * grid.side());
    }

    #[test]
    fn out_of_range_cell_is_invalid(
        seed in any::<u64>(),
        row in 0usize..9,
        col in 0usize..9,
        value in prop_oneof![-5i64..=0, 10i64..100],
        config in run_config(),
    ) {
        let grid = GenerateConfig { box_size: 3, seed, corrupt: false }
            .generate()
            .with_cell(row, col, value);
        prop_assert_eq!(validate_parallel(&grid, &config).verdict, Verdict::Invalid);
    }
}
