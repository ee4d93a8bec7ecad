//! Full runs over small known grids.

use gridcheck::scheduler::WorkerExit;
use gridcheck::{
    validate_parallel, validate_sequential, GenerateConfig, Grid, LockStrategy, RunConfig,
    Verdict,
};

fn four() -> Grid {
    let rows: [[i64; 4]; 4] = [[1, 2, 3, 4], [3, 4, 1, 2], [2, 1, 4, 3], [4, 3, 2, 1]];
    Grid::from_rows(&rows).unwrap()
}

fn nine() -> Grid {
    let rows: [[i64; 9]; 9] = [
        [5, 3, 4, 6, 7, 8, 9, 1, 2],
        [6, 7, 2, 1, 9, 5, 3, 4, 8],
        [1, 9, 8, 3, 4, 2, 5, 6, 7],
        [8, 5, 9, 7, 6, 1, 4, 2, 3],
        [4, 2, 6, 8, 5, 3, 7, 9, 1],
        [7, 1, 3, 9, 2, 4, 8, 5, 6],
        [9, 6, 1, 5, 3, 7, 2, 8, 4],
        [2, 8, 7, 4, 1, 9, 6, 3, 5],
        [3, 4, 5, 2, 8, 6, 1, 7, 9],
    ];
    Grid::from_rows(&rows).unwrap()
}

fn config(workers: usize, batch: usize, lock: LockStrategy) -> RunConfig {
    RunConfig {
        workers,
        batch,
        lock,
    }
}

#[test]
fn four_by_four_valid_grants_every_unit() {
    let report = validate_parallel(&four(), &config(2, 2, LockStrategy::Mutex));
    assert_eq!(report.verdict, Verdict::Valid);
    assert_eq!(report.units_granted(), 12);
    assert_eq!(
        report.workers.iter().map(|w| w.units_validated).sum::<usize>(),
        12
    );
    let validated = report
        .events
        .iter()
        .filter(|e| e.to_string().contains(" validated "))
        .count();
    assert_eq!(validated, 12);
}

#[test]
fn four_by_four_with_duplicate_is_invalid() {
    let grid = four().with_cell(0, 0, 2);
    for lock in [LockStrategy::Mutex, LockStrategy::TestAndSet] {
        let report = validate_parallel(&grid, &config(2, 2, lock));
        assert_eq!(report.verdict, Verdict::Invalid);
        assert!(report
            .events
            .iter()
            .any(|e| e.to_string().contains("found error")));
        // Every worker stopped because of the flag, one way or another.
        assert!(report.workers.iter().all(|w| matches!(
            w.exit,
            WorkerExit::FoundInvalid | WorkerExit::Cancelled
        )));
    }
}

#[test]
fn nine_by_nine_timing_is_consistent() {
    let report = validate_parallel(&nine(), &config(3, 3, LockStrategy::TestAndSet));
    assert_eq!(report.verdict, Verdict::Valid);
    assert_eq!(report.units_granted(), 27);

    let c = &report.contention;
    assert!(c.cs_count >= 9 + 3);
    assert!(c.worst_entry_ns >= c.mean_entry_ns);
    assert!(c.worst_exit_ns >= c.mean_exit_ns);
    assert!(c.mean_exit_ns >= c.mean_entry_ns);
    assert_eq!(c.worker_count, 3);
    assert!(report.total_ns() >= c.worst_exit_ns);
}

#[test]
fn merged_stream_is_sorted_and_complete() {
    let report = validate_parallel(&nine(), &config(4, 2, LockStrategy::Mutex));
    assert!(report
        .events
        .windows(2)
        .all(|w| w[0].timestamp_ns <= w[1].timestamp_ns));

    // One CS window per trip, one grab per grant, one validation per unit.
    let grants: usize = report.workers.iter().map(|w| w.grants.len()).sum();
    let expected = report.contention.cs_count as usize + grants + 27;
    assert_eq!(report.events.len(), expected);
}

#[test]
fn sequential_agrees_with_parallel_on_generated_grids() {
    for seed in 0..8u64 {
        for corrupt in [false, true] {
            let grid = GenerateConfig {
                box_size: 3,
                seed,
                corrupt,
            }
            .generate();
            let seq = validate_sequential(&grid);
            let par = validate_parallel(&grid, &config(3, 2, LockStrategy::TestAndSet));
            assert_eq!(seq.verdict, par.verdict, "seed={seed} corrupt={corrupt}");
            assert_eq!(seq.verdict.is_valid(), !corrupt);
        }
    }
}

#[test]
fn single_cell_grid() {
    let valid = Grid::from_cells(1, vec![1]).unwrap();
    let report = validate_parallel(&valid, &config(4, 1, LockStrategy::Mutex));
    assert_eq!(report.verdict, Verdict::Valid);
    assert_eq!(report.units_granted(), 3);

    let invalid = Grid::from_cells(1, vec![7]).unwrap();
    let report = validate_parallel(&invalid, &config(1, 1, LockStrategy::Mutex));
    assert_eq!(report.verdict, Verdict::Invalid);
}
