use viewport_detection::{DetectorOptions, Error, Evaluation, Host, VisibilityTracker};

use crate::ScrollListener;

/// A framework-neutral controller that wraps a `VisibilityTracker` and owns its scroll
/// subscription.
///
/// This type does not hold any UI objects. Adapters drive it by calling:
/// - `on_scroll(host, now_ms)` when the container scrolls
/// - `tick(host, now_ms)` once `next_deadline()` has passed (for trailing debounce)
///
/// The listener is attached on creation (unless the initial pass already completed tracking)
/// and detached exactly once: when every element has been seen in non-infinite mode, on
/// `detach()`, or when the controller is dropped.
#[derive(Debug)]
pub struct Controller<N, L: ScrollListener<N>> {
    tracker: VisibilityTracker<N>,
    listener: L,
    subscribed: bool,
}

impl<N, L: ScrollListener<N>> Controller<N, L> {
    pub fn new<H>(
        host: &H,
        root: &N,
        options: DetectorOptions<N>,
        listener: L,
    ) -> Result<Self, Error>
    where
        H: Host<Node = N> + ?Sized,
    {
        let tracker = VisibilityTracker::new(host, root, options)?;
        Ok(Self::from_tracker(tracker, listener))
    }

    pub fn from_tracker(tracker: VisibilityTracker<N>, mut listener: L) -> Self {
        let subscribed = tracker.is_listening();
        if subscribed {
            listener.attach(&tracker.options().container);
        }
        Self {
            tracker,
            listener,
            subscribed,
        }
    }

    pub fn tracker(&self) -> &VisibilityTracker<N> {
        &self.tracker
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// Whether the scroll listener is currently attached.
    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.tracker.next_deadline()
    }

    /// Call this when the container reports a scroll event.
    pub fn on_scroll<H>(&mut self, host: &H, now_ms: u64) -> Result<Option<Evaluation>, Error>
    where
        H: Host<Node = N> + ?Sized,
    {
        let res = self.tracker.on_scroll(host, now_ms);
        self.sync_listener();
        res
    }

    /// Advances the debounce timer.
    pub fn tick<H>(&mut self, host: &H, now_ms: u64) -> Result<Option<Evaluation>, Error>
    where
        H: Host<Node = N> + ?Sized,
    {
        let res = self.tracker.tick(host, now_ms);
        self.sync_listener();
        res
    }

    /// Stops tracking and releases the scroll listener. Idempotent.
    pub fn detach(&mut self) {
        self.tracker.detach();
        self.sync_listener();
    }

    fn sync_listener(&mut self) {
        if self.subscribed && !self.tracker.is_listening() {
            vdebug!("releasing scroll listener");
            self.subscribed = false;
            self.listener.detach(&self.tracker.options().container);
        }
    }
}

impl<N, L: ScrollListener<N>> Drop for Controller<N, L> {
    fn drop(&mut self) {
        if self.subscribed {
            vtrace!("Controller dropped while subscribed");
            self.subscribed = false;
            self.listener.detach(&self.tracker.options().container);
        }
    }
}
