// Example: one registry driving two feeds that scroll independently.
//
// The host owns the real scroll subscriptions; the registry tells it when to add and remove
// them, and repeated setup calls for the same feed are no-ops.
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use viewport_detection::{Container, DetectorOptions, Error, Host, Rect, ScrollMetrics};
use viewport_detection_adapter::{Registry, ScrollListener};

const NEWS: u32 = 1;
const CHAT: u32 = 2;

struct App {
    news_scroll: Cell<f64>,
    chat_scroll: Cell<f64>,
}

impl Host for App {
    type Node = u32;

    fn scroll_metrics(&self, container: &Container<u32>) -> Option<ScrollMetrics> {
        let top = match container {
            Container::Element(NEWS) => self.news_scroll.get(),
            Container::Element(CHAT) => self.chat_scroll.get(),
            _ => return None,
        };
        Some(ScrollMetrics::new(top, 0.0, 300.0, 200.0))
    }

    fn children(&self, node: &u32) -> Vec<u32> {
        (1..=20).map(|i| node * 100 + i).collect()
    }

    fn select(&self, _root: &u32, selector: &str) -> Result<Vec<u32>, Error> {
        Err(Error::InvalidSelector(selector.to_owned()))
    }

    fn offset_rect(&self, node: &u32) -> Option<Rect> {
        let row = (node % 100) as f64 - 1.0;
        Some(Rect::from_offset_size(row * 60.0, 0.0, 300.0, 50.0))
    }
}

/// Stands in for the host's event-listener bookkeeping.
#[derive(Clone, Default)]
struct Subscriptions(Rc<RefCell<Vec<Container<u32>>>>);

impl ScrollListener<u32> for Subscriptions {
    fn attach(&mut self, container: &Container<u32>) {
        println!("subscribe {container:?}");
        self.0.borrow_mut().push(container.clone());
    }

    fn detach(&mut self, container: &Container<u32>) {
        println!("unsubscribe {container:?}");
        self.0.borrow_mut().retain(|c| c != container);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("viewport_detection=debug,viewport_detection_adapter=debug")
        .init();

    let app = App {
        news_scroll: Cell::new(0.0),
        chat_scroll: Cell::new(0.0),
    };
    let subs = Subscriptions::default();
    let mut registry = Registry::new();

    for _ in 0..2 {
        registry
            .attach(
                &app,
                NEWS,
                DetectorOptions::new()
                    .with_container_element(NEWS)
                    .with_infinite(false)
                    .with_on_visible(|item| println!("news item {item} seen")),
                || subs.clone(),
            )
            .expect("news feed is measurable");
    }
    registry
        .attach(
            &app,
            CHAT,
            DetectorOptions::new()
                .with_container_element(CHAT)
                .with_debounce(80, false)
                .with_on_visible(|msg| println!("chat message {msg} shown"))
                .with_on_invisible(|msg| println!("chat message {msg} hidden")),
            || subs.clone(),
        )
        .expect("chat is measurable");
    println!("{} feeds, {} subscriptions", registry.len(), subs.0.borrow().len());

    let mut now_ms = 0;
    for _ in 0..30 {
        now_ms += 16;
        app.news_scroll.set(app.news_scroll.get() + 45.0);
        app.chat_scroll.set(app.chat_scroll.get() + 20.0);
        registry
            .on_scroll(&app, &Container::Element(NEWS), now_ms)
            .expect("news feed is measurable");
        registry
            .on_scroll(&app, &Container::Element(CHAT), now_ms)
            .expect("chat is measurable");
    }
    while let Some(deadline) = registry.next_deadline() {
        now_ms = deadline;
        registry.tick(&app, now_ms).expect("feeds are measurable");
    }

    println!("subscriptions left: {:?}", subs.0.borrow());
    registry.detach(&CHAT);
    println!("subscriptions after detaching chat: {:?}", subs.0.borrow());
}
