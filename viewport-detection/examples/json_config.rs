// Example: build options from a JSON config with named handlers.
//
// Run with `cargo run --example json_config --features serde`. The `invisible` handler is not
// registered, so with `debug` on the tracker reports it instead of calling it.
use std::collections::HashMap;
use std::sync::Arc;

use viewport_detection::{
    Container, DetectorConfig, Error, Host, Rect, ScrollMetrics, VisibilityCallback,
    VisibilityTracker,
};

struct Gallery {
    scroll_left: f64,
}

impl Host for Gallery {
    type Node = u32;

    fn scroll_metrics(&self, _container: &Container<u32>) -> Option<ScrollMetrics> {
        Some(ScrollMetrics::new(0.0, self.scroll_left, 640.0, 480.0))
    }

    fn children(&self, _node: &u32) -> Vec<u32> {
        (1..=12).collect()
    }

    fn select(&self, root: &u32, selector: &str) -> Result<Vec<u32>, Error> {
        match selector {
            "img" => Ok(self.children(root)),
            _ => Err(Error::InvalidSelector(selector.to_owned())),
        }
    }

    fn offset_rect(&self, node: &u32) -> Option<Rect> {
        let left = (*node as f64 - 1.0) * 320.0;
        Some(Rect::from_offset_size(0.0, left, 300.0, 200.0))
    }
}

const CONFIG: &str = r#"{
    "debug": true,
    "target": "img",
    "offset": { "right": 320 },
    "visible": "loadImage",
    "invisible": "unloadImage"
}"#;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("viewport_detection=debug")
        .init();

    let mut handlers: HashMap<&str, VisibilityCallback<u32>> = HashMap::new();
    handlers.insert("loadImage", Arc::new(|img: &u32| println!("loading image {img}")));

    let config: DetectorConfig = serde_json::from_str(CONFIG).expect("valid config");
    let options = config.into_options(|name| handlers.get(name).cloned());

    let mut host = Gallery { scroll_left: 0.0 };
    let mut tracker = VisibilityTracker::new(&host, &0, options).expect("valid target");

    for step in 1..=8u64 {
        host.scroll_left += 500.0;
        tracker
            .on_scroll(&host, step * 100)
            .expect("viewport is measurable");
    }
    let visible: Vec<_> = tracker.visible_nodes().collect();
    println!("visible images: {visible:?}");
}
