//! Property tests for the post-barrier log mergers.
//!
//! The merged stream should equal a naive stable sort of the concatenated
//! buffers, whatever the partitioning and however many timestamps tie.

use proptest::prelude::*;

use gridcheck::events::{merge_events, merge_text_buffers, EventKind, LogEvent};
use gridcheck::UnitKind;

/// Per-worker buffers with non-decreasing timestamps drawn from a small range
/// so ties are common.
fn buffers_strategy() -> impl Strategy<Value = Vec<Vec<LogEvent>>> {
    prop::collection::vec(prop::collection::vec(0u64..4, 0..20), 1..6).prop_map(|deltas| {
        deltas
            .into_iter()
            .enumerate()
            .map(|(worker, steps)| {
                let mut t = 0;
                steps
                    .into_iter()
                    .enumerate()
                    .map(|(index, step)| {
                        t += step;
                        LogEvent {
                            timestamp_ns: t,
                            worker,
                            kind: EventKind::Validated {
                                kind: UnitKind::Row,
                                index,
                            },
                        }
                    })
                    .collect()
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn structured_merge_is_a_stable_sort(buffers in buffers_strategy()) {
        let mut expected: Vec<LogEvent> = buffers.iter().flatten().copied().collect();
        expected.sort_by_key(|e| e.timestamp_ns);

        let merged = merge_events(buffers.clone());
        prop_assert_eq!(&merged, &expected);

        // Within one worker the original order survives.
        for (worker, buffer) in buffers.iter().enumerate() {
            let mine: Vec<LogEvent> = merged.iter().filter(|e| e.worker == worker).copied().collect();
            prop_assert_eq!(&mine, buffer);
        }
    }

    #[test]
    fn text_merge_matches_structured_merge(
        buffers in buffers_strategy(),
        noise in prop::collection::vec("[a-z ]{0,12}\\.", 0..4),
    ) {
        let mut texts: Vec<String> = buffers
            .iter()
            .map(|b| b.iter().map(|e| format!("{e}\n")).collect())
            .collect();
        // Lines without a trailing integer are dropped wherever they appear.
        for (i, line) in noise.iter().enumerate() {
            let slot = i % texts.len();
            texts[slot].push_str(line);
            texts[slot].push('\n');
        }

        let structured: Vec<String> = merge_events(buffers).iter().map(|e| e.to_string()).collect();
        let text: Vec<String> = merge_text_buffers(&texts).iter().map(|l| l.to_string()).collect();
        prop_assert_eq!(text, structured);
    }
}
