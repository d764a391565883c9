use alloc::vec::Vec;

use crate::{
    Debouncer, DetectorOptions, Error, Evaluation, Handler, Host, Rect, ScrollMetrics, Target,
};

/// A target element and its cached geometry.
#[derive(Clone, Debug)]
pub struct TrackedElement<N> {
    node: N,
    position: Rect,
    visible: bool,
    infinite: bool,
    counted: bool,
}

impl<N> TrackedElement<N> {
    pub fn node(&self) -> &N {
        &self.node
    }

    /// The rect captured when the tracker was created.
    pub fn position(&self) -> Rect {
        self.position
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether this element may toggle back to invisible.
    ///
    /// Non-infinite elements count toward completion once and never revert.
    pub fn is_infinite(&self) -> bool {
        self.infinite
    }
}

/// Detects when elements enter or leave a container's visible bounds.
///
/// This type is UI-agnostic:
/// - It does not hold UI objects, only the host's node handles.
/// - Your adapter forwards scroll events and a monotonic clock (`on_scroll`/`tick`).
/// - Geometry is read through a [`Host`].
///
/// Element rects are captured once at creation. Layout changes made afterwards are not
/// reflected, and nodes added or removed later are not re-scanned; create a new tracker to
/// pick them up.
#[derive(Clone, Debug)]
pub struct VisibilityTracker<N> {
    options: DetectorOptions<N>,
    elements: Vec<TrackedElement<N>>,
    seen: usize,
    listening: bool,
    debouncer: Debouncer,
}

impl<N> VisibilityTracker<N> {
    /// Creates a tracker for the targets under `root`.
    ///
    /// Snapshots every target's rect and runs an initial pass, so elements already in view fire
    /// `on_visible` before this returns. The tracker starts listening unless that pass already
    /// completed it.
    ///
    /// Fails if the container cannot be measured, the selector is rejected, or a target has no
    /// geometry.
    pub fn new<H>(host: &H, root: &N, options: DetectorOptions<N>) -> Result<Self, Error>
    where
        H: Host<Node = N> + ?Sized,
    {
        let metrics = host
            .scroll_metrics(&options.container)
            .ok_or(Error::ContainerUnavailable)?;
        let nodes = select_targets(host, root, &options.target)?;

        let mut elements = Vec::with_capacity(nodes.len());
        for node in nodes {
            let position = host
                .offset_rect(&node)
                .ok_or(Error::TargetGeometryUnavailable)?;
            elements.push(TrackedElement {
                node,
                position,
                visible: false,
                infinite: options.infinite,
                counted: false,
            });
        }

        vdebug!(
            elements = elements.len(),
            infinite = options.infinite,
            wait_ms = options.debounce.wait_ms,
            immediate = options.debounce.immediate,
            "VisibilityTracker::new"
        );

        let mut tracker = Self {
            debouncer: Debouncer::new(options.debounce),
            options,
            elements,
            seen: 0,
            listening: true,
        };
        let bounds = tracker.container_bounds(metrics);
        tracker.evaluate(bounds);
        Ok(tracker)
    }

    pub fn options(&self) -> &DetectorOptions<N> {
        &self.options
    }

    pub fn elements(&self) -> &[TrackedElement<N>] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of non-infinite elements that have been seen at least once.
    pub fn seen_count(&self) -> usize {
        self.seen
    }

    /// Whether scroll events are still evaluated.
    ///
    /// Becomes `false` once every element has been seen in non-infinite mode, or after
    /// [`VisibilityTracker::detach`]. Never becomes `true` again.
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn is_complete(&self) -> bool {
        !self.options.infinite && self.seen == self.elements.len()
    }

    /// Nodes currently marked visible, in document order.
    pub fn visible_nodes(&self) -> impl Iterator<Item = &N> {
        self.elements
            .iter()
            .filter(|el| el.visible)
            .map(|el| &el.node)
    }

    /// Effective container bounds for `metrics`, with the configured offset applied.
    pub fn container_bounds(&self, metrics: ScrollMetrics) -> Rect {
        metrics.bounds(&self.options.offset)
    }

    /// Reads the current container bounds from the host.
    pub fn current_bounds<H>(&self, host: &H) -> Result<Rect, Error>
    where
        H: Host<Node = N> + ?Sized,
    {
        let metrics = host
            .scroll_metrics(&self.options.container)
            .ok_or(Error::ContainerUnavailable)?;
        Ok(self.container_bounds(metrics))
    }

    /// Runs one visibility pass against `bounds`.
    ///
    /// Handlers fire only on transitions. In non-infinite mode elements never revert to
    /// invisible, and the tracker stops listening once all of them have been seen.
    ///
    /// A panicking handler aborts the rest of the pass. The element it was called for is already
    /// marked visible and counted.
    pub fn evaluate(&mut self, bounds: Rect) -> Evaluation {
        let mut evaluation = Evaluation::default();

        for i in 0..self.elements.len() {
            let element = &self.elements[i];
            if element.position.intersects(&bounds) {
                if element.visible {
                    continue;
                }
                let element = &mut self.elements[i];
                element.visible = true;
                if !element.infinite && !element.counted {
                    element.counted = true;
                    self.seen += 1;
                }
                evaluation.entered += 1;
                self.invoke_callback(&self.options.on_visible, &self.elements[i]);
            } else if element.infinite && element.visible {
                self.elements[i].visible = false;
                evaluation.exited += 1;
                self.invoke_callback(&self.options.on_invisible, &self.elements[i]);
            }
        }

        if self.is_complete() {
            evaluation.completed = true;
            if self.listening {
                vdebug!(elements = self.elements.len(), "all elements seen; detaching");
                self.listening = false;
            }
        }

        vtrace!(
            entered = evaluation.entered,
            exited = evaluation.exited,
            completed = evaluation.completed,
            "evaluate"
        );
        evaluation
    }

    /// Reads the container bounds from the host and runs one pass.
    pub fn refresh<H>(&mut self, host: &H) -> Result<Evaluation, Error>
    where
        H: Host<Node = N> + ?Sized,
    {
        let bounds = self.current_bounds(host)?;
        Ok(self.evaluate(bounds))
    }

    /// Invokes `handler` with the element's node.
    ///
    /// An [`Handler::Unresolved`] handler is skipped; with `debug` enabled it is reported at
    /// error level.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn invoke_callback(&self, handler: &Handler<N>, element: &TrackedElement<N>) {
        match handler {
            Handler::Noop => {}
            Handler::Callback(cb) => cb(&element.node),
            Handler::Unresolved(name) => {
                if self.options.debug {
                    verror!("viewportDetection: '{}' is not a function.", name);
                }
            }
        }
    }

    /// Call this when the container reports a scroll event.
    ///
    /// Runs a due trailing pass first, then applies the debounce policy. Returns the pass that
    /// ran, if any. Once the tracker has stopped listening, new scroll events are ignored.
    pub fn on_scroll<H>(&mut self, host: &H, now_ms: u64) -> Result<Option<Evaluation>, Error>
    where
        H: Host<Node = N> + ?Sized,
    {
        let flushed = self.tick(host, now_ms)?;
        if !self.listening {
            vtrace!(now_ms, "on_scroll: not listening");
            return Ok(flushed);
        }
        if self.debouncer.call(now_ms) {
            return self.refresh(host).map(Some);
        }
        Ok(flushed)
    }

    /// Advances the debounce timer; runs the trailing pass once it is due.
    ///
    /// A trailing pass armed before the tracker stopped listening still runs.
    pub fn tick<H>(&mut self, host: &H, now_ms: u64) -> Result<Option<Evaluation>, Error>
    where
        H: Host<Node = N> + ?Sized,
    {
        if self.debouncer.poll(now_ms) {
            vtrace!(now_ms, "trailing pass");
            return self.refresh(host).map(Some);
        }
        Ok(None)
    }

    /// When the adapter should call [`VisibilityTracker::tick`] next, if a timer is armed.
    pub fn next_deadline(&self) -> Option<u64> {
        self.debouncer.deadline()
    }

    /// Stops listening and drops any armed timer. Idempotent.
    pub fn detach(&mut self) {
        if self.listening {
            vdebug!("VisibilityTracker::detach");
        }
        self.listening = false;
        self.debouncer.cancel();
    }
}

fn select_targets<H>(
    host: &H,
    root: &H::Node,
    target: &Target<H::Node>,
) -> Result<Vec<H::Node>, Error>
where
    H: Host + ?Sized,
{
    match target {
        Target::Children => Ok(host.children(root)),
        Target::Selector(selector) => host.select(root, selector),
        Target::Filter(filter) => {
            let mut nodes = host.children(root);
            nodes.retain(|node| filter(node));
            Ok(nodes)
        }
    }
}

