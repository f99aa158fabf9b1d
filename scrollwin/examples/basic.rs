// Example: window over a large list, scroll far away, then bring an item into view.
use scrollwin::{Align, WindowOptions, WindowRangeCalculator};

fn main() {
    let mut calc = WindowRangeCalculator::new(
        WindowOptions::new(40)
            .with_viewport_height(600)
            .with_estimated_item_size(24),
    );
    calc.reset_items(1_000_000, false, None);
    println!("range={:?} placeholders={:?}", calc.range(), calc.placeholders());

    let r = calc.scroll_position_change(123_456);
    println!(
        "after scroll: range={:?} changed={} direction={:?}",
        r.range,
        r.range_changed(),
        r.shift_direction
    );

    // The UI rendered the range and measured it.
    let range = calc.range();
    calc.apply_measurements(
        (range.start_index..range.end_index).map(|i| (i, 20 + (i % 3) as u32)),
    );
    println!("average size={}", calc.sizes().average_size());

    calc.shift_range_to_index(999_999);
    let off = calc.scroll_offset_for_index(999_999, Align::End);
    calc.scroll_position_change(off);
    println!("after scroll_to_index: offset={} range={:?}", off, calc.range());
}
