use std::sync::{Arc, Mutex};

use futures::FutureExt;
use scrollwin::{Align, WindowOptions, WindowRange};
use scrollwin_adapter::{ControllerOptions, ScrollCompleter, ScrollWindowController};

fn main() {
    // Example: scroll to an item that is not materialized yet.
    //
    // The controller moves the range first; the actual scroll request is issued after the UI
    // committed the render, and the returned completion resolves once the UI confirms it.
    let requests: Arc<Mutex<Vec<ScrollCompleter>>> = Arc::default();
    let sink = Arc::clone(&requests);

    let mut c = ScrollWindowController::<u64>::new(
        ControllerOptions::new(
            WindowOptions::new(20)
                .with_viewport_height(40)
                .with_estimated_item_size(10),
        )
        .with_on_range_changed(Some(|range: WindowRange| println!("range changed: {range:?}")))
        .with_on_scroll_to_element_requested(Some(
            move |key: &u64, align: Align, force: bool, completer: ScrollCompleter| {
                println!("scroll request: key={key} align={align:?} force={force}");
                sink.lock().expect("poisoned").push(completer);
            },
        )),
    );
    c.reset_items(1000, false);

    let mut done = c.scroll_to_item(990, Align::Start, false, |key| Some(*key as usize));
    println!("before render: {:?}", (&mut done).now_or_never());

    let range = c.range();
    c.render_committed((range.start_index..range.end_index).map(|i| (i, 10)), 16);

    // The UI scrolled; confirm the request.
    for completer in requests.lock().expect("poisoned").drain(..) {
        completer.complete();
    }
    println!("after confirm: {:?}", done.now_or_never());
}
