//! Property-based invariant tests for the window calculator.
//!
//! For any sequence of collection mutations, measurements and scroll input:
//!
//! 1. The range stays inside the collection.
//! 2. Placeholders plus the materialized size equal the total content size.
//! 3. Item offsets are monotonic.
//! 4. Rejected mutations change nothing.

use proptest::prelude::*;
use scrollwin::{WindowOptions, WindowRange, WindowRangeCalculator};

#[derive(Clone, Debug)]
enum Op {
    Add { at: usize, count: usize },
    Remove { at: usize, count: usize },
    Move { from: usize, count: usize, to: usize },
    Measure { size: u32 },
    Scroll { fraction: f64 },
    ShiftTo { fraction: f64 },
    Reset { total: usize, keep: bool },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..400, 0usize..30).prop_map(|(at, count)| Op::Add { at, count }),
        (0usize..400, 0usize..30).prop_map(|(at, count)| Op::Remove { at, count }),
        (0usize..400, 1usize..10, 0usize..400)
            .prop_map(|(from, count, to)| Op::Move { from, count, to }),
        (0u32..80).prop_map(|size| Op::Measure { size }),
        (0.0f64..=1.0).prop_map(|fraction| Op::Scroll { fraction }),
        (0.0f64..=1.0).prop_map(|fraction| Op::ShiftTo { fraction }),
        (0usize..300, any::<bool>()).prop_map(|(total, keep)| Op::Reset { total, keep }),
    ]
}

fn assert_invariants(calc: &WindowRangeCalculator) -> Result<(), TestCaseError> {
    let range = calc.range();
    let total = calc.total_count();
    prop_assert!(range.start_index <= range.end_index);
    prop_assert!(range.end_index <= total);
    if total == 0 {
        prop_assert_eq!(range, WindowRange::EMPTY);
    }

    let p = calc.placeholders();
    let materialized = calc.sizes().range_size(range);
    prop_assert_eq!(p.backward + materialized + p.forward, calc.total_size());

    for i in range.start_index..range.end_index {
        let size = calc.sizes().effective_size(i) as u64;
        prop_assert_eq!(calc.sizes().offset(i) + size, calc.sizes().offset(i + 1));
    }
    Ok(())
}

fn apply(calc: &mut WindowRangeCalculator, op: &Op) {
    let total = calc.total_count();
    match *op {
        Op::Add { at, count } => {
            let _ = calc.add_items(at, count, None);
        }
        Op::Remove { at, count } => {
            let _ = calc.remove_items(at, count);
        }
        Op::Move { from, count, to } => {
            let _ = calc.move_items(from, count, to);
        }
        Op::Measure { size } => {
            let range = calc.range();
            calc.apply_measurements((range.start_index..range.end_index).map(|i| (i, size)));
        }
        Op::Scroll { fraction } => {
            let max = calc.max_scroll_position();
            calc.scroll_position_change((max as f64 * fraction) as u64);
            calc.check_triggers_visibility();
        }
        Op::ShiftTo { fraction } => {
            calc.shift_range_to_index((total as f64 * fraction) as usize);
        }
        Op::Reset { total, keep } => {
            calc.reset_items(total, keep, None);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn window_invariants_hold_for_any_event_sequence(
        initial in 0usize..300,
        page_size in 0usize..60,
        viewport in 0u32..600,
        estimate in 0u32..50,
        ops in proptest::collection::vec(op_strategy(), 1..40),
    ) {
        let mut calc = WindowRangeCalculator::new(
            WindowOptions::new(page_size)
                .with_viewport_height(viewport)
                .with_estimated_item_size(estimate),
        );
        calc.reset_items(initial, false, None);
        assert_invariants(&calc)?;
        for op in &ops {
            apply(&mut calc, op);
            assert_invariants(&calc)?;
        }
    }

    #[test]
    fn rejected_mutations_change_nothing(
        total in 0usize..200,
        at in 0usize..400,
        count in 1usize..50,
    ) {
        let mut calc =
            WindowRangeCalculator::new(WindowOptions::new(20).with_estimated_item_size(10));
        calc.reset_items(total, false, None);
        let before = calc.snapshot();

        if calc.remove_items(at, count).is_err() {
            prop_assert_eq!(calc.snapshot(), before);
            prop_assert_eq!(calc.total_count(), total);
        }
        let before = calc.snapshot();
        if calc.add_items(at, count, None).is_err() {
            prop_assert!(at > calc.total_count());
            prop_assert_eq!(calc.snapshot(), before);
        }
    }
}
