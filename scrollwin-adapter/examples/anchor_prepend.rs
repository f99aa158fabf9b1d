use std::sync::{Arc, Mutex};

use scrollwin::WindowOptions;
use scrollwin_adapter::{ControllerOptions, ScrollWindowController};

fn main() {
    // Example: keep the visual scroll position while older messages are prepended (chat/timeline).
    //
    // The adapter flow is:
    // 1) report the collection change (the controller captures the item at the viewport top)
    // 2) render the new range and report measured sizes
    // 3) apply the requested scroll correction so the same item stays in the same place
    let corrections = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&corrections);

    let mut c = ScrollWindowController::<u64>::new(
        ControllerOptions::new(
            WindowOptions::new(100)
                .with_viewport_height(200)
                .with_estimated_item_size(10),
        )
        .with_on_scroll_correction_requested(Some(move |offset: u64| {
            sink.lock().expect("poisoned").push(offset)
        })),
    );
    c.reset_items(100, false);
    c.scroll_position_change(450, 0);
    println!(
        "before prepend: scroll={} first_visible={:?}",
        c.scroll_position(),
        c.first_visible_index()
    );

    // Prepend 10 items; old items shift by +10 indexes.
    c.add_items(0, 10).expect("index is in bounds");

    // The UI rendered the new range; new items turned out taller than estimated.
    let range = c.range();
    c.render_committed(
        (range.start_index..range.end_index).map(|i| (i, if i < 10 { 24 } else { 10 })),
        16,
    );

    println!(
        "after prepend: corrections={:?} first_visible={:?}",
        corrections.lock().expect("poisoned"),
        c.first_visible_index()
    );
}
