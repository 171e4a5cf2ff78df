//! Property tests for handle uniqueness and free-list bounds.

use proptest::prelude::*;
use std::collections::HashSet;
use std::time::Duration;
use sync_calls::{CallHandle, RouteResult, SlotPool, SlotPoolConfig, WaitOutcome};

#[derive(Debug, Clone)]
enum Op {
    Acquire,
    /// Release the outstanding lease at this position (modulo count).
    Release(usize),
    /// Route a reply to a previously issued handle (modulo count).
    RouteOld(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Acquire),
        2 => any::<usize>().prop_map(Op::Release),
        1 => any::<usize>().prop_map(Op::RouteOld),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn outstanding_handles_are_unique_and_free_list_bounded(
        max_free in 1usize..8,
        ops in prop::collection::vec(op(), 1..200),
    ) {
        let pool = SlotPool::<u32>::with_config(
            SlotPoolConfig::default().with_max_free_slots(max_free),
        ).unwrap();
        let mut held = Vec::new();
        let mut issued: Vec<CallHandle> = Vec::new();

        for op in ops {
            match op {
                Op::Acquire => {
                    let slot = pool.acquire();
                    issued.push(slot.handle());
                    held.push(slot);
                }
                Op::Release(i) if !held.is_empty() => {
                    let index = i % held.len();
                    held.swap_remove(index).release();
                }
                Op::RouteOld(i) if !issued.is_empty() => {
                    let handle = issued[i % issued.len()];
                    let live = held.iter().any(|slot| slot.handle() == handle);
                    let result = pool.route(handle, 0);
                    // Only a live occupancy that has not been answered yet may match.
                    if !live {
                        prop_assert_eq!(result, RouteResult::Stale);
                    }
                }
                _ => {}
            }

            let live: HashSet<_> = held.iter().map(|slot| slot.handle()).collect();
            prop_assert_eq!(live.len(), held.len());
            let identifiers: HashSet<_> = held.iter().map(|slot| slot.identifier()).collect();
            prop_assert_eq!(identifiers.len(), held.len());
            prop_assert!(pool.free_slots() <= max_free);
            prop_assert_eq!(pool.outstanding(), held.len());
        }
    }

    #[test]
    fn every_issued_handle_is_distinct(rounds in 1usize..100, width in 1usize..6) {
        let pool = SlotPool::<u32>::new();
        let mut seen = HashSet::new();
        for _ in 0..rounds {
            let batch: Vec<_> = (0..width).map(|_| pool.acquire()).collect();
            for slot in &batch {
                prop_assert!(seen.insert(slot.handle()));
            }
        }
        prop_assert!(pool.allocated_slots() <= width);
    }

    #[test]
    fn routed_reply_reaches_only_its_occupancy(value in any::<u32>(), reuse in 1usize..10) {
        let pool = SlotPool::<u32>::with_config(
            SlotPoolConfig::default().with_max_free_slots(1),
        ).unwrap();
        let mut old = Vec::new();
        for _ in 0..reuse {
            let slot = pool.acquire();
            old.push(slot.handle());
            slot.release();
        }

        let slot = pool.acquire();
        for handle in &old {
            prop_assert_eq!(pool.route(*handle, value.wrapping_add(1)), RouteResult::Stale);
        }
        prop_assert_eq!(pool.route(slot.handle(), value), RouteResult::Delivered);
        prop_assert_eq!(slot.get_message(Duration::from_millis(10)), WaitOutcome::Delivered(value));
    }
}
