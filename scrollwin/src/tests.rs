use crate::fenwick::Fenwick;
use crate::*;

use alloc::vec::Vec;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        debug_assert!(start < end_exclusive);
        start + (self.next_u64() % (end_exclusive - start) as u64) as usize
    }

    fn gen_range_u32(&mut self, start: u32, end_exclusive: u32) -> u32 {
        self.gen_range_usize(start as usize, end_exclusive as usize) as u32
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

fn calculator(
    total: usize,
    page_size: usize,
    item_size: u32,
    viewport: u32,
) -> WindowRangeCalculator {
    let mut calc = WindowRangeCalculator::new(
        WindowOptions::new(page_size)
            .with_estimated_item_size(item_size)
            .with_viewport_height(viewport),
    );
    calc.reset_items(total, false, None);
    calc
}

fn assert_window_invariants(calc: &WindowRangeCalculator) {
    let range = calc.range();
    let total = calc.total_count();
    assert!(range.start_index <= range.end_index, "{range:?}");
    assert!(range.end_index <= total, "{range:?} total={total}");
    let p = calc.placeholders();
    assert_eq!(
        p.backward + calc.sizes().range_size(range) + p.forward,
        calc.total_size(),
        "placeholders must cover the whole content"
    );
}

fn naive_offset(t: &ItemSizeTracker, index: usize) -> u64 {
    (0..index).map(|i| t.effective_size(i) as u64).sum()
}

#[test]
fn fenwick_push_matches_bulk_build() {
    let mut rng = Lcg::new(7);
    let values: Vec<u64> = (0..257).map(|_| rng.next_u64() % 100).collect();
    let bulk = Fenwick::from_values(values.iter().copied());
    let mut pushed = Fenwick::from_values(core::iter::empty());
    for v in &values {
        pushed.push_value(*v);
    }
    assert_eq!(pushed.len(), bulk.len());
    assert_eq!(pushed.total(), bulk.total());
    for i in 0..=values.len() {
        assert_eq!(pushed.prefix_sum(i), bulk.prefix_sum(i), "prefix {i}");
    }
}

#[test]
fn unknown_sizes_use_average_of_known_sizes() {
    let mut t = ItemSizeTracker::new(10, 0);
    assert_eq!(t.total_size(), 0);

    t.set_size(0, 10);
    t.set_size(1, 30);
    assert_eq!(t.estimate(), 20);
    assert_eq!(t.offset(2), 40);
    assert_eq!(t.total_size(), 40 + 8 * 20);
    assert_eq!(t.size(5), None);
    assert_eq!(t.effective_size(5), 20);
}

#[test]
fn estimated_item_size_applies_until_first_measurement() {
    let mut t = ItemSizeTracker::new(4, 25);
    assert_eq!(t.total_size(), 100);
    t.set_size(3, 5);
    assert_eq!(t.total_size(), 20);
}

#[test]
fn offsets_are_consistent_with_sizes() {
    let mut rng = Lcg::new(42);
    let mut t = ItemSizeTracker::new(300, 12);
    for _ in 0..200 {
        let i = rng.gen_range_usize(0, 300);
        t.set_size(i, rng.gen_range_u32(0, 40));
    }
    for _ in 0..100 {
        let i = rng.gen_range_usize(0, 301);
        assert_eq!(t.offset(i), naive_offset(&t, i), "offset {i}");
    }
    for i in 0..299 {
        if t.effective_size(i) > 0 {
            assert!(t.offset(i) < t.offset(i + 1));
        }
    }
}

#[test]
fn index_at_offset_finds_covering_item() {
    let mut rng = Lcg::new(9);
    let mut t = ItemSizeTracker::new(120, 8);
    for i in 0..120 {
        if rng.gen_bool() {
            t.set_size(i, rng.gen_range_u32(1, 30));
        }
    }
    let total = t.total_size();
    for _ in 0..300 {
        let px = rng.next_u64() % (total + 20);
        let index = t.index_at_offset(px).unwrap();
        if px >= total {
            assert_eq!(index, 119);
        } else {
            let item = t.item(index).unwrap();
            assert!(item.offset <= px && px < item.end(), "px={px} item={item:?}");
        }
    }
    assert_eq!(ItemSizeTracker::new(0, 10).index_at_offset(0), None);
}

#[test]
fn given_sizes_are_never_remeasured() {
    let mut t = ItemSizeTracker::new(3, 0);
    let missing = t.set_given_sizes(0, &[Some(10), None, Some(30)]);
    assert_eq!(missing, alloc::vec![1]);
    assert_eq!(t.source(0), Some(SizeSource::Given));
    assert_eq!(t.source(1), Some(SizeSource::Unknown));
    assert_eq!(t.effective_size(1), 20);

    assert_eq!(t.set_size(0, 99), 0);
    assert_eq!(t.size(0), Some(10));
    assert!(!t.needs_measure(0));
    assert!(t.needs_measure(1));
}

#[test]
fn measurements_travel_with_items() {
    let mut t = ItemSizeTracker::new(10, 10);
    t.set_size(2, 50);
    t.insert(0, 3);
    assert_eq!(t.size(5), Some(50));
    t.remove(0, 4);
    assert_eq!(t.size(1), Some(50));
    t.move_items(1, 1, 7);
    assert_eq!(t.size(7), Some(50));
    assert_eq!(t.len(), 9);
    assert_eq!(t.total_size(), 50 + 8 * 50);
}

#[test]
fn append_keeps_prefix_sums_intact() {
    let mut t = ItemSizeTracker::new(5, 10);
    for i in 0..5 {
        t.set_size(i, (i as u32 + 1) * 3);
    }
    t.insert(5, 4);
    t.set_size(7, 11);
    for i in 0..=9 {
        assert_eq!(t.offset(i), naive_offset(&t, i));
    }
}

#[test]
fn collection_change_remaps_indexes() {
    let add = CollectionChange::Add { index: 5, count: 3 };
    assert_eq!(add.remap_index(4), Some(4));
    assert_eq!(add.remap_index(5), Some(8));

    let remove = CollectionChange::Remove { index: 2, count: 2 };
    assert_eq!(remove.remap_index(1), Some(1));
    assert_eq!(remove.remap_index(3), None);
    assert_eq!(remove.remap_index(4), Some(2));

    // [0 1 2 3 4 5 6 7 8 9] -> [0 1 4 5 6 2 3 7 8 9]
    let mv = CollectionChange::Move {
        from: 2,
        count: 2,
        to: 5,
    };
    let after: Vec<usize> = (0..10).map(|i| mv.remap_index(i).unwrap()).collect();
    assert_eq!(after, alloc::vec![0, 1, 5, 6, 2, 3, 4, 7, 8, 9]);

    assert_eq!(CollectionChange::Reset { total: 3 }.remap_index(0), None);
}

#[test]
fn collection_change_validation() {
    assert!(CollectionChange::Add { index: 10, count: 1 }.validate(10).is_ok());
    assert_eq!(
        CollectionChange::Add { index: 11, count: 1 }.validate(10),
        Err(WindowError::AddOutOfBounds {
            index: 11,
            count: 1,
            total: 10
        })
    );
    assert!(CollectionChange::Remove { index: 8, count: 3 }.validate(10).is_err());
    assert!(CollectionChange::Remove { index: usize::MAX, count: 2 }.validate(10).is_err());
    assert!(
        CollectionChange::Move {
            from: 0,
            count: 3,
            to: 8
        }
        .validate(10)
        .is_err()
    );
    assert!(
        CollectionChange::Move {
            from: 0,
            count: 3,
            to: 7
        }
        .validate(10)
        .is_ok()
    );
}

#[test]
fn reset_starts_at_the_first_page() {
    let calc = calculator(1000, 20, 10, 100);
    assert_eq!(calc.range(), WindowRange::new(0, 20));
    assert_eq!(
        calc.placeholders(),
        Placeholders {
            backward: 0,
            forward: 9800
        }
    );
    assert_eq!(
        calc.items_out_of_range(),
        ItemsOutOfRange {
            backward: false,
            forward: true
        }
    );
}

#[test]
fn reset_to_empty_is_idempotent() {
    let mut calc = calculator(50, 20, 10, 100);
    for _ in 0..2 {
        let r = calc.reset_items(0, false, None);
        assert_eq!(r.range, WindowRange::EMPTY);
        assert_eq!(r.placeholders, Placeholders::default());
    }
    assert_eq!(calc.first_visible_index(), None);
    assert_eq!(calc.active_element_index(), None);
}

#[test]
fn small_collections_are_fully_materialized() {
    let calc = calculator(7, 20, 10, 100);
    assert_eq!(calc.range(), WindowRange::new(0, 7));
    let unvirtualized = calculator(500, 0, 10, 100);
    assert_eq!(unvirtualized.range(), WindowRange::new(0, 500));
}

#[test]
fn reset_keeping_scroll_position_reinterprets_offset() {
    let mut calc = calculator(1000, 20, 10, 40);
    calc.scroll_position_change(5000);
    let r = calc.reset_items(2000, true, None);
    assert!(r.range.contains(500), "{:?}", r.range);
    assert_eq!(calc.scroll_position(), 5000);

    let r = calc.reset_items(2000, false, None);
    assert_eq!(r.range, WindowRange::new(0, 20));
    assert_eq!(calc.scroll_position(), 0);
}

#[test]
fn far_scroll_jumps_the_range() {
    let mut calc = calculator(1000, 20, 10, 40);
    let r = calc.scroll_position_change(5000);
    assert!(r.range_changed());
    assert!(r.range.contains(500));
    assert_eq!(r.range.len(), 20);
    assert_eq!(r.shift_direction, Some(ScrollDirection::Forward));
    assert_window_invariants(&calc);

    let r = calc.scroll_position_change(0);
    assert_eq!(r.range, WindowRange::new(0, 20));
    assert_eq!(r.shift_direction, Some(ScrollDirection::Backward));
}

#[test]
fn jump_range_covers_viewport_and_trigger_zones() {
    // 20px items, viewport 200 => trigger offsets 60px.
    let mut calc = calculator(1000, 20, 20, 200);
    let r = calc.scroll_position_change(10_000);
    assert_eq!(r.range, WindowRange::new(495, 515));

    let r = calc.check_triggers_visibility();
    assert!(!r.range_changed());
    assert_eq!(r.more_data_needed, None);
    assert!(!calc.triggers().is_visible(ScrollDirection::Forward));
    assert!(!calc.triggers().is_visible(ScrollDirection::Backward));

    // A page shorter than the viewport still starts at the viewport top.
    let mut calc = calculator(1000, 5, 20, 200);
    let r = calc.scroll_position_change(10_000);
    assert_eq!(r.range, WindowRange::new(500, 505));
}

#[test]
fn visible_forward_trigger_shifts_by_segment() {
    // 10px items, viewport 100 => trigger offsets 30px, segment 5.
    let mut calc = calculator(1000, 20, 10, 100);
    let r = calc.scroll_position_change(10);
    assert!(!r.range_changed());

    let r = calc.scroll_position_change(80);
    assert_eq!(r.shift_direction, Some(ScrollDirection::Forward));
    assert_eq!(r.range, WindowRange::new(1, 25));
    assert_eq!(
        r.placeholders,
        Placeholders {
            backward: 10,
            forward: 9750
        }
    );

    // The trigger moved with the range edge.
    let r = calc.scroll_position_change(85);
    assert!(!r.range_changed());
    assert_window_invariants(&calc);
}

#[test]
fn trigger_that_stays_visible_shifts_again_on_recheck() {
    let mut calc = calculator(1000, 20, 10, 300);
    let r = calc.check_triggers_visibility();
    assert_eq!(r.range, WindowRange::new(0, 25));

    // No new intersection: scroll input alone does nothing.
    let r = calc.scroll_position_change(0);
    assert!(!r.range_changed());

    let r = calc.check_triggers_visibility();
    assert_eq!(r.range, WindowRange::new(0, 30));
}

#[test]
fn trigger_at_collection_edge_requests_more_data() {
    let mut calc = calculator(10, 20, 10, 50);
    let r = calc.check_triggers_visibility();
    assert_eq!(r.more_data_needed, Some(ScrollDirection::Backward));

    let r = calc.scroll_position_change(50);
    assert_eq!(r.more_data_needed, Some(ScrollDirection::Forward));
    assert!(!r.range_changed());
}

#[test]
fn reported_trigger_visibility_drives_shifts() {
    let mut calc = calculator(1000, 20, 10, 100);
    let r = calc.set_trigger_visible(ScrollDirection::Forward, true);
    assert_eq!(r.shift_direction, Some(ScrollDirection::Forward));
    let r = calc.set_trigger_visible(ScrollDirection::Forward, true);
    assert!(!r.range_changed());

    calc.shift_range_to_index(500);
    let r = calc.set_trigger_visible(ScrollDirection::Backward, true);
    assert_eq!(r.shift_direction, Some(ScrollDirection::Backward));
    assert_eq!(r.range.start_index, 495);
    assert_window_invariants(&calc);
}

#[test]
fn edge_trigger_mode_moves_trigger_to_range_border() {
    let mut calc = calculator(1000, 20, 10, 100);
    assert_eq!(calc.trigger_offsets().forward, 30);
    calc.set_trigger_offset_mode(ScrollDirection::Forward, TriggerOffsetMode::Edge);
    assert_eq!(calc.trigger_offsets().forward, 0);
    assert_eq!(calc.triggers().offset_mode(ScrollDirection::Forward), TriggerOffsetMode::Edge);
    let r = calc.scroll_position_change(80);
    assert!(!r.range_changed());
}

#[test]
fn backward_shift_hides_items_below_the_viewport() {
    let mut calc = calculator(1000, 20, 10, 100);
    calc.shift_range_to_index(500);
    assert_eq!(calc.range(), WindowRange::new(500, 520));

    // The backward trigger sits 30px below item 500. Items starting past
    // 5000 + 100 + 60 are dropped.
    let r = calc.scroll_position_change(5000);
    assert_eq!(r.shift_direction, Some(ScrollDirection::Backward));
    assert_eq!(r.range, WindowRange::new(495, 517));

    let r = calc.shift_range_to_direction(ScrollDirection::Backward);
    assert_eq!(r.range, WindowRange::new(490, 517));
    assert_window_invariants(&calc);
}

#[test]
fn shift_range_to_index_is_noop_inside_range() {
    let mut calc = calculator(1000, 20, 10, 100);
    let r = calc.shift_range_to_index(5);
    assert!(!r.range_changed());
    let r = calc.shift_range_to_index(999);
    assert_eq!(r.range, WindowRange::new(980, 1000));
    assert_eq!(r.shift_direction, Some(ScrollDirection::Forward));

    // The viewport is still at the top: triggers are not evaluated against a distant block.
    let r = calc.check_triggers_visibility();
    assert!(!r.range_changed());
    assert_eq!(r.more_data_needed, None);
}

#[test]
fn adding_before_range_shifts_both_bounds() {
    let mut calc = calculator(100, 20, 10, 100);
    calc.shift_range_to_index(40);
    let r = calc.add_items(0, 10, None).unwrap();
    assert_eq!(r.range, WindowRange::new(50, 70));
    assert_eq!(
        r.placeholders,
        Placeholders {
            backward: 500,
            forward: 400
        }
    );
}

#[test]
fn adding_inside_range_grows_end() {
    let mut calc = calculator(100, 20, 10, 100);
    calc.shift_range_to_index(40);
    let r = calc.add_items(45, 5, None).unwrap();
    assert_eq!(r.range, WindowRange::new(40, 65));

    // The first materialized index is inside the range too.
    let r = calc.add_items(40, 5, None).unwrap();
    assert_eq!(r.range, WindowRange::new(40, 70));
    assert_eq!(r.placeholders.backward, r.old_placeholders.backward);
}

#[test]
fn appending_to_materialized_tail_grows_by_segment() {
    let mut calc = calculator(30, 20, 10, 100);
    calc.shift_range_to_index(25);
    assert_eq!(calc.range(), WindowRange::new(10, 30));
    let r = calc.add_items(30, 10, None).unwrap();
    assert_eq!(r.range, WindowRange::new(10, 35));
}

#[test]
fn adding_after_range_only_changes_forward_placeholder() {
    let mut calc = calculator(100, 20, 10, 100);
    let r = calc.add_items(50, 10, None).unwrap();
    assert!(!r.range_changed());
    assert_eq!(r.placeholders.forward, r.old_placeholders.forward + 100);
}

#[test]
fn adding_to_empty_collection_fills_first_page() {
    let mut calc = calculator(0, 20, 10, 100);
    let r = calc.add_items(0, 50, None).unwrap();
    assert_eq!(r.range, WindowRange::new(0, 20));
}

#[test]
fn removing_items_shifts_and_refills() {
    let mut calc = calculator(100, 20, 10, 100);
    calc.shift_range_to_index(40);

    let r = calc.remove_items(0, 10).unwrap();
    assert_eq!(r.range, WindowRange::new(30, 50));

    let r = calc.remove_items(40, 5).unwrap();
    assert_eq!(r.range, WindowRange::new(30, 50));

    // Straddles the start of the range.
    let r = calc.remove_items(25, 10).unwrap();
    assert_eq!(r.range, WindowRange::new(25, 45));
    assert_eq!(calc.total_count(), 75);
    assert_window_invariants(&calc);
}

#[test]
fn removing_everything_collapses_the_window() {
    let mut calc = calculator(30, 20, 10, 100);
    let r = calc.remove_items(0, 30).unwrap();
    assert_eq!(r.range, WindowRange::EMPTY);
    assert_eq!(r.placeholders, Placeholders::default());
}

#[test]
fn invalid_mutations_leave_state_untouched() {
    let mut calc = calculator(100, 20, 10, 100);
    calc.shift_range_to_index(40);
    let snapshot = calc.snapshot();

    assert!(calc.remove_items(95, 10).is_err());
    assert!(calc.add_items(101, 1, None).is_err());
    assert!(calc.move_items(95, 10, 0).is_err());

    assert_eq!(calc.snapshot(), snapshot);
    assert_eq!(calc.total_count(), 100);
}

#[test]
fn moving_items_keeps_range_and_measurements() {
    let mut calc = calculator(100, 20, 10, 100);
    calc.apply_measurements([(0, 50)]);
    let r = calc.move_items(0, 1, 10).unwrap();
    assert!(!r.range_changed());
    assert_eq!(calc.sizes().size(10), Some(50));
    assert_window_invariants(&calc);
}

#[test]
fn first_visible_and_active_element() {
    let mut calc = calculator(100, 20, 10, 100);
    assert_eq!(calc.active_element_index(), Some(0));

    calc.scroll_position_change(25);
    assert_eq!(calc.first_visible_index(), Some(3));

    calc.shift_range_to_index(0);
    calc.scroll_position_change(150);
    assert_eq!(calc.active_element_index(), Some(16));
}

#[test]
fn active_element_at_bottom_is_last_item() {
    let mut calc = calculator(30, 20, 10, 100);
    calc.shift_range_to_index(29);
    calc.scroll_position_change(200);
    assert_eq!(calc.active_element_index(), Some(29));
}

#[test]
fn scroll_offset_for_index_aligns() {
    let calc = calculator(100, 20, 10, 100);
    assert_eq!(calc.scroll_offset_for_index(50, Align::Start), 500);
    assert_eq!(calc.scroll_offset_for_index(50, Align::End), 410);
    assert_eq!(calc.scroll_offset_for_index(50, Align::Center), 455);
    assert_eq!(calc.scroll_offset_for_index(5, Align::Auto), 0);
    assert_eq!(calc.scroll_offset_for_index(99, Align::Start), 900);
}

#[test]
fn given_sizes_size_the_window_by_pixels() {
    let mut calc = WindowRangeCalculator::new(WindowOptions::default().with_viewport_height(100));
    let given: Vec<Option<u32>> = (0..100).map(|_| Some(20)).collect();
    let r = calc.reset_items(100, false, Some(&given));
    // viewport × page_multiplier = 300px of 20px items.
    assert_eq!(r.range, WindowRange::new(0, 15));
    assert!(calc.missing_given_sizes().is_empty());
}

#[test]
fn missing_given_sizes_are_reported() {
    let mut calc = WindowRangeCalculator::new(WindowOptions::new(20));
    calc.reset_items(3, false, Some(&[Some(10), None, Some(10)]));
    assert_eq!(calc.missing_given_sizes(), &[1]);
    assert_eq!(calc.total_size(), 30);
}

#[test]
fn remove_mode_invalidates_detached_measurements() {
    for (mode, expect_stale) in [(VisibilityMode::Remove, true), (VisibilityMode::Hide, false)] {
        let mut calc = WindowRangeCalculator::new(
            WindowOptions::new(20)
                .with_mode(mode)
                .with_estimated_item_size(10)
                .with_viewport_height(100),
        );
        calc.reset_items(100, false, None);
        calc.apply_measurements((0..20).map(|i| (i, 10)));
        assert!(!calc.sizes().needs_measure(3));

        calc.shift_range_to_index(50);
        assert_eq!(calc.sizes().needs_measure(3), expect_stale, "{mode:?}");
        assert_eq!(calc.sizes().size(3), Some(10));
    }
}

#[test]
fn snapshot_restores_range() {
    let mut calc = calculator(1000, 20, 10, 40);
    calc.scroll_position_change(5000);
    let snapshot = calc.snapshot();

    let mut other = calculator(1000, 20, 10, 0);
    let r = other.restore_snapshot(snapshot);
    assert_eq!(r.range, snapshot.range);
    assert_eq!(other.viewport_size(), 40);
    assert_eq!(other.scroll_position(), 5000);
}

#[test]
fn invalid_options_fall_back_to_defaults() {
    let calc = WindowRangeCalculator::new(
        WindowOptions::new(20)
            .with_page_multiplier(f32::NAN)
            .with_trigger_coefficients(-1.0, 0.5)
            .with_segment_size(Some(0)),
    );
    let defaults = WindowOptions::default();
    assert_eq!(calc.options().page_multiplier, defaults.page_multiplier);
    assert_eq!(
        calc.options().backward_trigger_coefficient,
        defaults.backward_trigger_coefficient
    );
    assert_eq!(calc.options().forward_trigger_coefficient, 0.5);
    assert_eq!(calc.options().segment_size(), 5);
}

#[test]
fn randomized_mutations_preserve_window_invariants() {
    let mut rng = Lcg::new(0xC0FFEE);
    for _ in 0..20 {
        let mut calc = calculator(rng.gen_range_usize(0, 200), 20, 10, 120);
        for _ in 0..60 {
            let total = calc.total_count();
            match rng.gen_range_usize(0, 6) {
                0 => {
                    let at = rng.gen_range_usize(0, total + 1);
                    calc.add_items(at, rng.gen_range_usize(0, 15), None).unwrap();
                }
                1 if total > 0 => {
                    let at = rng.gen_range_usize(0, total);
                    let count = rng.gen_range_usize(0, total - at + 1);
                    calc.remove_items(at, count).unwrap();
                }
                2 if total > 1 => {
                    let count = rng.gen_range_usize(1, total);
                    let from = rng.gen_range_usize(0, total - count + 1);
                    let to = rng.gen_range_usize(0, total - count + 1);
                    calc.move_items(from, count, to).unwrap();
                }
                3 => {
                    let range = calc.range();
                    let sizes: Vec<(usize, u32)> = (range.start_index..range.end_index)
                        .map(|i| (i, rng.gen_range_u32(0, 40)))
                        .collect();
                    calc.apply_measurements(sizes);
                }
                4 => {
                    let max = calc.max_scroll_position();
                    calc.scroll_position_change(rng.next_u64() % (max + 1));
                    calc.check_triggers_visibility();
                }
                _ => {
                    let target = rng.gen_range_usize(0, total.max(1));
                    calc.shift_range_to_index(target);
                }
            }
            assert_window_invariants(&calc);
        }
    }
}
