// Example: report rows entering and leaving a 300px viewport while it scrolls.
use viewport_detection::{
    Container, DetectorOptions, Error, Host, Rect, ScrollMetrics, VisibilityTracker,
};

use std::cell::Cell;

/// A column of 40 rows, 80px tall, stacked 100px apart under node 0.
struct Column {
    scroll_top: Cell<f64>,
}

impl Host for Column {
    type Node = usize;

    fn scroll_metrics(&self, container: &Container<usize>) -> Option<ScrollMetrics> {
        match container {
            Container::Viewport => Some(ScrollMetrics::new(
                self.scroll_top.get(),
                0.0,
                400.0,
                300.0,
            )),
            Container::Element(_) => None,
        }
    }

    fn children(&self, node: &usize) -> Vec<usize> {
        if *node == 0 {
            (1..=40).collect()
        } else {
            Vec::new()
        }
    }

    fn select(&self, _root: &usize, selector: &str) -> Result<Vec<usize>, Error> {
        Err(Error::InvalidSelector(selector.to_owned()))
    }

    fn offset_rect(&self, node: &usize) -> Option<Rect> {
        let top = (*node as f64 - 1.0) * 100.0;
        Some(Rect::from_offset_size(top, 0.0, 400.0, 80.0))
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("viewport_detection=debug")
        .init();

    let host = Column {
        scroll_top: Cell::new(0.0),
    };
    let options = DetectorOptions::new()
        .with_debounce(50, true)
        .with_on_visible(|row| println!("row {row} visible"))
        .with_on_invisible(|row| println!("row {row} hidden"));
    let mut tracker = VisibilityTracker::new(&host, &0, options).expect("viewport is measurable");

    // A scroll event every 16ms; the leading-edge debounce evaluates once per 50ms burst.
    let mut now_ms = 0u64;
    for step in 0..60 {
        now_ms += 16;
        host.scroll_top.set(step as f64 * 40.0);
        if let Some(e) = tracker.on_scroll(&host, now_ms).expect("viewport is measurable") {
            println!("t={now_ms} entered={} exited={}", e.entered, e.exited);
        }
        if step % 10 == 9 {
            // Pause long enough for the debounce timer to expire.
            now_ms += 100;
            tracker.tick(&host, now_ms).expect("viewport is measurable");
        }
    }

    let visible: Vec<_> = tracker.visible_nodes().collect();
    println!("visible at the end: {visible:?}");
}
