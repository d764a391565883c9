use crate::*;

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::Cell;
use core::sync::atomic::{AtomicBool, Ordering};
use std::panic::AssertUnwindSafe;
use std::sync::Mutex;

const ROOT: u32 = 0;
const SCROLLER: u32 = 1000;

/// An in-memory document: node `0` is the root, nodes `1..=n` are its children.
struct TestHost {
    rects: Vec<Rect>,
    viewport: Cell<ScrollMetrics>,
    scroller: Option<ScrollMetrics>,
    metric_reads: Cell<usize>,
}

impl TestHost {
    fn new(viewport: ScrollMetrics, rects: Vec<Rect>) -> Self {
        Self {
            rects,
            viewport: Cell::new(viewport),
            scroller: None,
            metric_reads: Cell::new(0),
        }
    }

    /// A 100x100 viewport with one 100x10 row every 50px.
    fn rows(count: usize) -> Self {
        let rects = (0..count)
            .map(|i| Rect::from_offset_size(i as f64 * 50.0, 0.0, 100.0, 10.0))
            .collect();
        Self::new(ScrollMetrics::new(0.0, 0.0, 100.0, 100.0), rects)
    }

    fn scroll_to(&self, top: f64) {
        let mut m = self.viewport.get();
        m.scroll_top = top;
        self.viewport.set(m);
    }
}

impl Host for TestHost {
    type Node = u32;

    fn scroll_metrics(&self, container: &Container<u32>) -> Option<ScrollMetrics> {
        self.metric_reads.set(self.metric_reads.get() + 1);
        match container {
            Container::Viewport => Some(self.viewport.get()),
            Container::Element(SCROLLER) => self.scroller,
            Container::Element(_) => None,
        }
    }

    fn children(&self, node: &u32) -> Vec<u32> {
        if *node == ROOT {
            (1..=self.rects.len() as u32).collect()
        } else {
            Vec::new()
        }
    }

    fn select(&self, root: &u32, selector: &str) -> Result<Vec<u32>, Error> {
        match selector {
            ".odd" => Ok(self
                .children(root)
                .into_iter()
                .filter(|n| n % 2 == 1)
                .collect()),
            ".missing" => Ok(vec![99]),
            _ => Err(Error::InvalidSelector(selector.to_string())),
        }
    }

    fn offset_rect(&self, node: &u32) -> Option<Rect> {
        let index = node.checked_sub(1)? as usize;
        self.rects.get(index).copied()
    }
}

type Log = Arc<Mutex<Vec<(&'static str, u32)>>>;

fn recording(options: DetectorOptions<u32>) -> (DetectorOptions<u32>, Log) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let on_visible = Arc::clone(&log);
    let on_invisible = Arc::clone(&log);
    let options = options
        .with_on_visible(move |n| on_visible.lock().unwrap().push(("visible", *n)))
        .with_on_invisible(move |n| on_invisible.lock().unwrap().push(("invisible", *n)));
    (options, log)
}

fn drain(log: &Log) -> Vec<(&'static str, u32)> {
    core::mem::take(&mut *log.lock().unwrap())
}

#[test]
fn container_bounds_apply_offsets() {
    let m = ScrollMetrics::new(30.0, 5.0, 200.0, 100.0);
    let b = m.bounds(&Offset::new(10.0, -20.0, 15.0, 4.0));
    assert_eq!(b.top, 40.0);
    assert_eq!(b.right, 185.0);
    assert_eq!(b.bottom, 145.0);
    assert_eq!(b.left, 9.0);
}

#[test]
fn intersection_is_inclusive_on_every_edge() {
    let c = Rect::from_offset_size(100.0, 100.0, 100.0, 100.0);
    // Touching from the left, right, above and below.
    assert!(Rect::from_offset_size(120.0, 50.0, 50.0, 10.0).intersects(&c));
    assert!(Rect::from_offset_size(120.0, 200.0, 50.0, 10.0).intersects(&c));
    assert!(Rect::from_offset_size(90.0, 120.0, 10.0, 10.0).intersects(&c));
    assert!(Rect::from_offset_size(200.0, 120.0, 10.0, 10.0).intersects(&c));
    // One pixel away.
    assert!(!Rect::from_offset_size(120.0, 49.0, 50.0, 10.0).intersects(&c));
    assert!(!Rect::from_offset_size(201.0, 120.0, 10.0, 10.0).intersects(&c));
}

#[test]
fn element_touching_container_left_edge_is_visible() {
    let host = TestHost::new(
        ScrollMetrics::new(0.0, 100.0, 100.0, 100.0),
        vec![Rect::from_offset_size(0.0, 50.0, 50.0, 10.0)],
    );
    let (options, log) = recording(DetectorOptions::new());
    let t = VisibilityTracker::new(&host, &ROOT, options).unwrap();
    assert_eq!(t.elements()[0].position().right, 100.0);
    assert!(t.elements()[0].is_visible());
    assert_eq!(drain(&log), vec![("visible", 1)]);
}

#[test]
fn elements_visible_at_load_fire_once_without_scrolling() {
    let host = TestHost::rows(5); // rows at 0, 50, 100, 150, 200
    let (options, log) = recording(DetectorOptions::new());
    let t = VisibilityTracker::new(&host, &ROOT, options).unwrap();

    assert_eq!(t.len(), 5);
    assert_eq!(
        drain(&log),
        vec![("visible", 1), ("visible", 2), ("visible", 3)]
    );
    assert_eq!(t.visible_nodes().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(t.is_listening());
}

#[test]
fn transitions_never_repeat_in_infinite_mode() {
    let host = TestHost::rows(5);
    let (options, log) = recording(DetectorOptions::new());
    let mut t = VisibilityTracker::new(&host, &ROOT, options).unwrap();
    drain(&log);

    // Same bounds again: no callbacks.
    let e = t.refresh(&host).unwrap();
    assert!(e.is_unchanged());
    assert!(drain(&log).is_empty());

    host.scroll_to(120.0); // bounds 120..220: rows 4 and 5
    let e = t.refresh(&host).unwrap();
    assert_eq!(e.entered, 2);
    assert_eq!(e.exited, 3);
    assert_eq!(
        drain(&log),
        vec![
            ("invisible", 1),
            ("invisible", 2),
            ("invisible", 3),
            ("visible", 4),
            ("visible", 5),
        ]
    );

    let e = t.refresh(&host).unwrap();
    assert_eq!(e, Evaluation::default());

    host.scroll_to(0.0);
    t.refresh(&host).unwrap();
    assert_eq!(
        drain(&log),
        vec![
            ("visible", 1),
            ("visible", 2),
            ("visible", 3),
            ("invisible", 4),
            ("invisible", 5),
        ]
    );
}

#[test]
fn non_infinite_elements_freeze_after_first_sighting() {
    let host = TestHost::rows(5);
    let (options, log) = recording(DetectorOptions::new().with_infinite(false));
    let mut t = VisibilityTracker::new(&host, &ROOT, options).unwrap();
    assert_eq!(t.seen_count(), 3);
    drain(&log);

    host.scroll_to(120.0);
    let e = t.refresh(&host).unwrap();
    assert_eq!(e.exited, 0);
    assert_eq!(drain(&log), vec![("visible", 4), ("visible", 5)]);
    assert!(t.elements().iter().all(|el| el.is_visible()));
    assert!(t.elements().iter().all(|el| !el.is_infinite()));

    host.scroll_to(1000.0);
    t.refresh(&host).unwrap();
    assert!(drain(&log).is_empty());
    assert!(t.elements().iter().all(|el| el.is_visible()));
}

#[test]
fn non_infinite_never_fires_invisible_for_unseen_elements() {
    let host = TestHost::rows(5);
    let (options, log) = recording(DetectorOptions::new().with_infinite(false));
    let mut t = VisibilityTracker::new(&host, &ROOT, options).unwrap();
    drain(&log);

    host.scroll_to(10_000.0);
    t.refresh(&host).unwrap();
    assert!(drain(&log).is_empty());
    assert!(!t.elements()[4].is_visible());
}

#[test]
fn completion_stops_scroll_evaluation() {
    let host = TestHost::rows(5);
    let (options, log) = recording(DetectorOptions::new().with_infinite(false));
    let mut t = VisibilityTracker::new(&host, &ROOT, options).unwrap();
    drain(&log);

    host.scroll_to(120.0);
    let e = t.on_scroll(&host, 10).unwrap().unwrap();
    assert!(e.completed);
    assert!(t.is_complete());
    assert!(!t.is_listening());
    assert_eq!(drain(&log), vec![("visible", 4), ("visible", 5)]);

    let reads = host.metric_reads.get();
    for now_ms in [20u64, 30, 40, 1000] {
        host.scroll_to(now_ms as f64);
        assert_eq!(t.on_scroll(&host, now_ms).unwrap(), None);
    }
    assert_eq!(host.metric_reads.get(), reads);
    assert!(drain(&log).is_empty());
}

#[test]
fn completion_during_initial_pass_is_terminal() {
    let host = TestHost::rows(2);
    let mut t =
        VisibilityTracker::new(&host, &ROOT, DetectorOptions::new().with_infinite(false)).unwrap();
    assert!(!t.is_listening());
    assert_eq!(t.on_scroll(&host, 0).unwrap(), None);
    assert_eq!(t.next_deadline(), None);
}

#[test]
fn leading_debounce_runs_once_per_burst() {
    let host = TestHost::rows(5);
    let mut t = VisibilityTracker::new(
        &host,
        &ROOT,
        DetectorOptions::new().with_debounce(100, true),
    )
    .unwrap();

    let mut runs = 0;
    for now_ms in [0u64, 10, 20, 30, 40] {
        if t.on_scroll(&host, now_ms).unwrap().is_some() {
            assert_eq!(now_ms, 0);
            runs += 1;
        }
    }
    assert_eq!(runs, 1);
    assert_eq!(t.next_deadline(), Some(140));

    // The timer expires without a trailing run.
    assert_eq!(t.tick(&host, 140).unwrap(), None);
    assert_eq!(t.next_deadline(), None);

    // A new burst runs again on its first event.
    assert!(t.on_scroll(&host, 500).unwrap().is_some());
}

#[test]
fn trailing_debounce_runs_after_quiet_period() {
    let host = TestHost::rows(5);
    let (options, log) = recording(DetectorOptions::new().with_debounce(100, false));
    let mut t = VisibilityTracker::new(&host, &ROOT, options).unwrap();
    drain(&log);

    for now_ms in [0u64, 10, 20, 30, 40] {
        host.scroll_to(now_ms as f64 * 3.0); // ends at 120
        assert_eq!(t.on_scroll(&host, now_ms).unwrap(), None);
    }
    assert_eq!(t.next_deadline(), Some(140));
    assert_eq!(t.tick(&host, 139).unwrap(), None);
    assert!(drain(&log).is_empty());

    let e = t.tick(&host, 140).unwrap().unwrap();
    assert_eq!(e.entered, 2);
    assert_eq!(t.tick(&host, 400).unwrap(), None);
    assert_eq!(drain(&log).len(), 5);
}

#[test]
fn overdue_trailing_pass_runs_before_the_next_scroll() {
    let host = TestHost::rows(5);
    let mut t = VisibilityTracker::new(
        &host,
        &ROOT,
        DetectorOptions::new().with_debounce(50, false),
    )
    .unwrap();

    assert_eq!(t.on_scroll(&host, 0).unwrap(), None);
    // The adapter missed the deadline; the next event flushes the pending pass.
    assert!(t.on_scroll(&host, 80).unwrap().is_some());
    assert_eq!(t.next_deadline(), Some(130));
}

#[test]
fn zero_wait_leading_debounce_runs_every_event() {
    let mut d = Debouncer::new(Debounce::default());
    assert!(d.call(0));
    assert!(d.call(1));
    assert!(d.call(1));
    assert!(!d.poll(1));
}

#[test]
fn trailing_pass_can_complete_tracking() {
    let host = TestHost::rows(5);
    let (options, log) = recording(
        DetectorOptions::new()
            .with_infinite(false)
            .with_debounce(100, false),
    );
    let mut t = VisibilityTracker::new(&host, &ROOT, options).unwrap();
    drain(&log);

    host.scroll_to(120.0);
    assert_eq!(t.on_scroll(&host, 0).unwrap(), None);
    let e = t.tick(&host, 100).unwrap().unwrap();
    assert!(e.completed);

    // Another burst cannot arm a new pass once the tracker stopped listening.
    assert_eq!(t.on_scroll(&host, 150).unwrap(), None);
    assert_eq!(t.next_deadline(), None);
    assert_eq!(drain(&log), vec![("visible", 4), ("visible", 5)]);
}

#[test]
fn detach_cancels_pending_pass() {
    let host = TestHost::rows(5);
    let (options, log) = recording(DetectorOptions::new().with_debounce(100, false));
    let mut t = VisibilityTracker::new(&host, &ROOT, options).unwrap();
    drain(&log);

    host.scroll_to(120.0);
    t.on_scroll(&host, 0).unwrap();
    t.detach();
    t.detach();
    assert!(!t.is_listening());
    assert_eq!(t.tick(&host, 200).unwrap(), None);
    assert!(drain(&log).is_empty());
}

#[test]
fn offset_top_excludes_elements_above_bounds() {
    let host = TestHost::new(
        ScrollMetrics::new(0.0, 0.0, 100.0, 100.0),
        vec![
            Rect::from_offset_size(0.0, 0.0, 100.0, 5.0),
            Rect::from_offset_size(20.0, 0.0, 100.0, 5.0),
        ],
    );
    let (options, log) =
        recording(DetectorOptions::new().with_offset(Offset::new(10.0, 0.0, 0.0, 0.0)));
    let t = VisibilityTracker::new(&host, &ROOT, options).unwrap();
    assert_eq!(t.container_bounds(host.viewport.get()).top, 10.0);
    assert!(!t.elements()[0].is_visible());
    assert!(t.elements()[1].is_visible());
    assert_eq!(drain(&log), vec![("visible", 2)]);
}

#[test]
fn negative_bottom_offset_shrinks_bounds() {
    let host = TestHost::rows(3); // rows at 0, 50, 100
    let t = VisibilityTracker::new(
        &host,
        &ROOT,
        DetectorOptions::new().with_offset(Offset::new(0.0, 0.0, -51.0, 0.0)),
    )
    .unwrap();
    let visible: Vec<u32> = t.visible_nodes().copied().collect();
    assert_eq!(visible, vec![1]);
}

#[test]
fn element_container_is_measured_instead_of_viewport() {
    let mut host = TestHost::rows(5);
    host.scroller = Some(ScrollMetrics::new(150.0, 0.0, 100.0, 20.0));
    let t = VisibilityTracker::new(
        &host,
        &ROOT,
        DetectorOptions::new().with_container_element(SCROLLER),
    )
    .unwrap();
    assert_eq!(t.visible_nodes().copied().collect::<Vec<_>>(), vec![4]);
}

#[test]
fn unmeasurable_container_fails_fast() {
    let host = TestHost::rows(2);
    let err = VisibilityTracker::new(&host, &ROOT, DetectorOptions::new().with_container_element(7))
        .unwrap_err();
    assert_eq!(err, Error::ContainerUnavailable);
}

#[test]
fn selector_and_filter_targets() {
    let host = TestHost::rows(5);

    let t = VisibilityTracker::new(&host, &ROOT, DetectorOptions::new().with_selector(".odd"))
        .unwrap();
    let nodes: Vec<u32> = t.elements().iter().map(|el| *el.node()).collect();
    assert_eq!(nodes, vec![1, 3, 5]);

    let t = VisibilityTracker::new(&host, &ROOT, DetectorOptions::new().with_filter(|n| *n > 3))
        .unwrap();
    let nodes: Vec<u32> = t.elements().iter().map(|el| *el.node()).collect();
    assert_eq!(nodes, vec![4, 5]);

    let err = VisibilityTracker::new(&host, &ROOT, DetectorOptions::new().with_selector("]["))
        .unwrap_err();
    assert_eq!(err, Error::InvalidSelector(String::from("][")));

    let err = VisibilityTracker::new(&host, &ROOT, DetectorOptions::new().with_selector(".missing"))
        .unwrap_err();
    assert_eq!(err, Error::TargetGeometryUnavailable);
}

#[test]
fn empty_target_set_completes_immediately_in_non_infinite_mode() {
    let host = TestHost::rows(0);
    let t =
        VisibilityTracker::new(&host, &ROOT, DetectorOptions::new().with_infinite(false)).unwrap();
    assert!(t.is_empty());
    assert!(t.is_complete());
    assert!(!t.is_listening());

    let t = VisibilityTracker::new(&host, &ROOT, DetectorOptions::new()).unwrap();
    assert!(t.is_listening());
}

#[test]
fn unresolved_handlers_are_skipped() {
    let host = TestHost::rows(5);
    for debug in [false, true] {
        let options = DetectorOptions::new()
            .with_debug(debug)
            .with_visible_handler(Handler::Unresolved(String::from("onShow")))
            .with_invisible_handler(Handler::Unresolved(String::from("onHide")));
        let mut t = VisibilityTracker::new(&host, &ROOT, options).unwrap();
        host.scroll_to(120.0);
        let e = t.refresh(&host).unwrap();
        // State still transitions even though nothing was called.
        assert_eq!(e.entered, 2);
        assert_eq!(e.exited, 3);
        host.scroll_to(0.0);
    }
}

/// Collects formatted `tracing` output.
#[cfg(feature = "tracing")]
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

#[cfg(feature = "tracing")]
impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[cfg(feature = "tracing")]
impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(feature = "tracing")]
#[test]
fn unresolved_handlers_are_reported_only_with_debug() {
    let host = TestHost::rows(5);
    for debug in [false, true] {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::ERROR)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let options = DetectorOptions::new()
                .with_debug(debug)
                .with_visible_handler(Handler::Unresolved(String::from("onShow")));
            VisibilityTracker::new(&host, &ROOT, options).unwrap();
        });

        let out = logs.contents();
        assert_eq!(
            out.contains("viewportDetection: 'onShow' is not a function."),
            debug,
            "debug={debug} output={out:?}"
        );
    }
}

#[test]
fn panicking_handler_still_counts_the_element() {
    let host = TestHost::rows(2);
    host.scroll_to(1000.0);
    let armed = Arc::new(AtomicBool::new(true));
    let trip = Arc::clone(&armed);
    let options = DetectorOptions::new()
        .with_infinite(false)
        .with_on_visible(move |n| {
            if *n == 1 && trip.swap(false, Ordering::SeqCst) {
                panic!("handler failed");
            }
        });
    let mut t = VisibilityTracker::new(&host, &ROOT, options).unwrap();
    assert_eq!(t.seen_count(), 0);

    host.scroll_to(0.0);
    let res = std::panic::catch_unwind(AssertUnwindSafe(|| t.refresh(&host)));
    assert!(res.is_err());
    assert!(!armed.load(Ordering::SeqCst));
    assert!(t.elements()[0].is_visible());
    assert_eq!(t.seen_count(), 1);

    // The next pass picks up the rest and completes.
    t.refresh(&host).unwrap();
    assert_eq!(t.seen_count(), 2);
    assert!(t.is_complete());
    assert!(!t.is_listening());
}

#[test]
fn geometry_is_a_snapshot() {
    let mut host = TestHost::rows(2);
    let (options, log) = recording(DetectorOptions::new());
    let mut t = VisibilityTracker::new(&host, &ROOT, options).unwrap();
    drain(&log);

    // Moving the element after setup is not observed.
    host.rects[0] = Rect::from_offset_size(5000.0, 0.0, 10.0, 10.0);
    t.refresh(&host).unwrap();
    assert!(drain(&log).is_empty());
    assert_eq!(t.elements()[0].position().top, 0.0);
}

#[test]
fn config_resolves_named_handlers() {
    let hits = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&hits);
    let cb: VisibilityCallback<u32> = Arc::new(move |n: &u32| sink.lock().unwrap().push(*n));

    let config = DetectorConfig {
        infinite: false,
        target: Some(String::from(".odd")),
        visible: Some(String::from("reveal")),
        invisible: Some(String::from("nope")),
        ..DetectorConfig::default()
    };
    let options = config.into_options(|name| (name == "reveal").then(|| Arc::clone(&cb)));
    assert!(matches!(options.on_visible, Handler::Callback(_)));
    assert!(matches!(&options.on_invisible, Handler::Unresolved(n) if n == "nope"));
    assert!(matches!(&options.target, Target::Selector(s) if s == ".odd"));
    assert_eq!(options.container, Container::Viewport);
    assert!(!options.infinite);

    let host = TestHost::rows(5);
    VisibilityTracker::new(&host, &ROOT, options).unwrap();
    assert_eq!(*hits.lock().unwrap(), vec![1, 3]);
}

#[test]
fn config_children_selector_maps_to_default_target() {
    let config = DetectorConfig {
        target: Some(String::from(CHILDREN_SELECTOR)),
        ..DetectorConfig::default()
    };
    let options = config.into_options::<u32>(|_| None);
    assert!(matches!(options.target, Target::Children));
    assert!(matches!(options.on_visible, Handler::Noop));
    assert!(options.infinite);
    assert_eq!(options.debounce, Debounce::new(0, true));
}

#[cfg(feature = "serde")]
#[test]
fn config_deserializes_with_defaults() {
    let config: DetectorConfig = serde_json::from_str(
        r#"{
            "debounce": { "wait": 250 },
            "offset": { "top": 10, "bottom": -20 },
            "infinite": false,
            "visible": "reveal"
        }"#,
    )
    .unwrap();
    assert_eq!(config.debounce, Debounce::new(250, true));
    assert_eq!(config.offset, Offset::new(10.0, 0.0, -20.0, 0.0));
    assert!(!config.infinite);
    assert!(!config.debug);
    assert_eq!(config.target, None);
    assert_eq!(config.visible.as_deref(), Some("reveal"));
    assert_eq!(config.invisible, None);
}
