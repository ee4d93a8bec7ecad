//! Property tests for work-queue grants under contention.
//!
//! Many threads hammer one queue. Whatever the interleaving, the grants of
//! each kind must tile `0..total` exactly, and each worker must see kinds in
//! row, column, subgroup order.

use std::thread;

use proptest::prelude::*;

use gridcheck::events::{EventLog, RunClock};
use gridcheck::scheduler::{InvalidFlag, LockStrategy, TaskAssignment, UnitCounts, WorkQueue};
use gridcheck::UnitKind;

fn strategy() -> impl Strategy<Value = LockStrategy> {
    prop_oneof![Just(LockStrategy::Mutex), Just(LockStrategy::TestAndSet)]
}

fn drain_concurrently(queue: &WorkQueue<'_>, workers: usize) -> Vec<Vec<TaskAssignment>> {
    let clock = RunClock::start();
    thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|id| {
                s.spawn(move || {
                    let mut log = EventLog::new(id, clock);
                    std::iter::from_fn(|| queue.try_acquire(&mut log)).collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn grants_tile_every_kind_exactly(
        rows in 0usize..40,
        cols in 0usize..40,
        subs in 0usize..40,
        batch in 1usize..8,
        workers in 1usize..12,
        lock in strategy(),
    ) {
        let flag = InvalidFlag::new();
        let totals = UnitCounts { rows, cols, subs };
        let queue = WorkQueue::new(totals, batch, lock, &flag);
        let per_worker = drain_concurrently(&queue, workers);

        for grants in &per_worker {
            prop_assert!(grants.windows(2).all(|w| w[0].kind <= w[1].kind));
            prop_assert!(grants.iter().all(|a| a.count >= 1 && a.count <= batch));
        }

        for kind in UnitKind::ALL {
            let mut ranges: Vec<_> = per_worker
                .iter()
                .flatten()
                .filter(|a| a.kind == kind)
                .map(|a| a.range())
                .collect();
            ranges.sort_by_key(|r| r.start);
            let mut next = 0;
            for r in &ranges {
                prop_assert_eq!(r.start, next, "gap or overlap in {:?}", kind);
                next = r.end;
            }
            prop_assert_eq!(next, totals.get(kind));
        }
        prop_assert_eq!(queue.remaining(), UnitCounts::default());
    }

    #[test]
    fn grants_never_overlap_when_closed_midway(
        n in 1usize..40,
        batch in 1usize..5,
        workers in 2usize..10,
        close_after in 0usize..20,
    ) {
        let flag = InvalidFlag::new();
        let queue = WorkQueue::new(UnitCounts::uniform(n), batch, LockStrategy::TestAndSet, &flag);
        let clock = RunClock::start();

        let per_worker: Vec<Vec<TaskAssignment>> = thread::scope(|s| {
            let handles: Vec<_> = (0..workers)
                .map(|id| {
                    let queue = &queue;
                    let flag = &flag;
                    s.spawn(move || {
                        let mut log = EventLog::new(id, clock);
                        let mut grants = Vec::new();
                        while let Some(a) = queue.try_acquire(&mut log) {
                            grants.push(a);
                            if id == 0 && grants.len() > close_after {
                                flag.set();
                            }
                        }
                        grants
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let mut seen = vec![[false; 3]; n];
        for a in per_worker.iter().flatten() {
            let slot = UnitKind::ALL.iter().position(|&k| k == a.kind).unwrap();
            for i in a.range() {
                prop_assert!(!seen[i][slot], "unit {:?} {} granted twice", a.kind, i);
                seen[i][slot] = true;
            }
        }
        let granted: usize = per_worker.iter().flatten().map(|a| a.count).sum();
        prop_assert_eq!(granted + queue.remaining().total(), 3 * n);
    }
}
