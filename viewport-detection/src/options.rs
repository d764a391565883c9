use alloc::string::String;
use alloc::sync::Arc;

use crate::{Debounce, Offset};

/// A callback fired with the node whose visibility changed.
pub type VisibilityCallback<N> = Arc<dyn Fn(&N) + Send + Sync>;

/// A predicate selecting which direct children of the root are tracked.
pub type TargetFilter<N> = Arc<dyn Fn(&N) -> bool + Send + Sync>;

/// The selector the default target corresponds to: every direct child of the root.
pub const CHILDREN_SELECTOR: &str = "> *";

/// The scroll container whose bounds define what is visible.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Container<N> {
    /// The top-level viewport (the window).
    Viewport,
    /// A scrollable element.
    Element(N),
}

impl<N> Default for Container<N> {
    fn default() -> Self {
        Self::Viewport
    }
}

/// Which elements under the root are tracked.
#[derive(Clone)]
pub enum Target<N> {
    /// Every direct child of the root.
    Children,
    /// Nodes under the root matching a host-evaluated selector.
    Selector(String),
    /// Direct children of the root accepted by a predicate.
    Filter(TargetFilter<N>),
}

impl<N> Default for Target<N> {
    fn default() -> Self {
        Self::Children
    }
}

impl<N> core::fmt::Debug for Target<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Children => f.write_str("Children"),
            Self::Selector(s) => f.debug_tuple("Selector").field(s).finish(),
            Self::Filter(_) => f.write_str("Filter(..)"),
        }
    }
}

/// A visibility transition handler.
#[derive(Clone)]
pub enum Handler<N> {
    /// Does nothing.
    Noop,
    /// Invoked with the transitioning node.
    Callback(VisibilityCallback<N>),
    /// A handler that was named in a data config but could not be resolved to a callback.
    ///
    /// Invoking it is not an error: it is skipped, and reported when `debug` is enabled.
    Unresolved(String),
}

impl<N> Default for Handler<N> {
    fn default() -> Self {
        Self::Noop
    }
}

impl<N> Handler<N> {
    pub fn callback(f: impl Fn(&N) + Send + Sync + 'static) -> Self {
        Self::Callback(Arc::new(f))
    }
}

impl<N> core::fmt::Debug for Handler<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Noop => f.write_str("Noop"),
            Self::Callback(_) => f.write_str("Callback(..)"),
            Self::Unresolved(name) => f.debug_tuple("Unresolved").field(name).finish(),
        }
    }
}

/// Configuration for [`crate::VisibilityTracker`].
///
/// Fixed once the tracker is created. Closures live in `Arc`s, so cloning is cheap.
pub struct DetectorOptions<N> {
    pub container: Container<N>,
    pub target: Target<N>,
    pub on_visible: Handler<N>,
    pub on_invisible: Handler<N>,
    pub debounce: Debounce,
    /// Padding applied to the container bounds before intersection testing.
    pub offset: Offset,
    /// When `false`, each element fires `on_visible` once and then freezes, and the tracker
    /// stops listening once every element has been seen.
    pub infinite: bool,
    /// Report misconfigured handlers through `tracing`.
    pub debug: bool,
}

impl<N: Clone> Clone for DetectorOptions<N> {
    fn clone(&self) -> Self {
        Self {
            container: self.container.clone(),
            target: self.target.clone(),
            on_visible: self.on_visible.clone(),
            on_invisible: self.on_invisible.clone(),
            debounce: self.debounce,
            offset: self.offset,
            infinite: self.infinite,
            debug: self.debug,
        }
    }
}

impl<N> Default for DetectorOptions<N> {
    fn default() -> Self {
        Self {
            container: Container::Viewport,
            target: Target::Children,
            on_visible: Handler::Noop,
            on_invisible: Handler::Noop,
            debounce: Debounce::default(),
            offset: Offset::default(),
            infinite: true,
            debug: false,
        }
    }
}

impl<N> DetectorOptions<N> {
    /// Default options: the viewport, every direct child, no handlers, leading-edge debounce
    /// with no wait, zero offsets, infinite mode.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(mut self, container: Container<N>) -> Self {
        self.container = container;
        self
    }

    /// Tracks against a scrollable element instead of the viewport.
    pub fn with_container_element(mut self, node: N) -> Self {
        self.container = Container::Element(node);
        self
    }

    pub fn with_target(mut self, target: Target<N>) -> Self {
        self.target = target;
        self
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.target = Target::Selector(selector.into());
        self
    }

    pub fn with_filter(mut self, filter: impl Fn(&N) -> bool + Send + Sync + 'static) -> Self {
        self.target = Target::Filter(Arc::new(filter));
        self
    }

    pub fn with_on_visible(mut self, f: impl Fn(&N) + Send + Sync + 'static) -> Self {
        self.on_visible = Handler::callback(f);
        self
    }

    pub fn with_on_invisible(mut self, f: impl Fn(&N) + Send + Sync + 'static) -> Self {
        self.on_invisible = Handler::callback(f);
        self
    }

    pub fn with_visible_handler(mut self, handler: Handler<N>) -> Self {
        self.on_visible = handler;
        self
    }

    pub fn with_invisible_handler(mut self, handler: Handler<N>) -> Self {
        self.on_invisible = handler;
        self
    }

    pub fn with_debounce(mut self, wait_ms: u64, immediate: bool) -> Self {
        self.debounce = Debounce::new(wait_ms, immediate);
        self
    }

    pub fn with_offset(mut self, offset: Offset) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_infinite(mut self, infinite: bool) -> Self {
        self.infinite = infinite;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

impl<N: core::fmt::Debug> core::fmt::Debug for DetectorOptions<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DetectorOptions")
            .field("container", &self.container)
            .field("target", &self.target)
            .field("on_visible", &self.on_visible)
            .field("on_invisible", &self.on_invisible)
            .field("debounce", &self.debounce)
            .field("offset", &self.offset)
            .field("infinite", &self.infinite)
            .field("debug", &self.debug)
            .finish()
    }
}

/// Plain-data configuration, e.g. loaded from JSON.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize` using the option
/// names `debug`, `debounce.{wait,immediate}`, `offset.{top,right,bottom,left}`, `infinite`,
/// `target`, `visible` and `invisible`. Missing fields take their defaults.
///
/// Handlers are referenced by name and resolved in [`DetectorConfig::into_options`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct DetectorConfig {
    pub debug: bool,
    pub debounce: Debounce,
    pub offset: Offset,
    pub infinite: bool,
    /// Target selector; `None` or `"> *"` track every direct child.
    pub target: Option<String>,
    pub visible: Option<String>,
    pub invisible: Option<String>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            debug: false,
            debounce: Debounce::default(),
            offset: Offset::default(),
            infinite: true,
            target: None,
            visible: None,
            invisible: None,
        }
    }
}

impl DetectorConfig {
    /// Converts into options tracking the viewport.
    ///
    /// `resolve` maps handler names to callbacks; names it does not know become
    /// [`Handler::Unresolved`].
    pub fn into_options<N>(
        self,
        mut resolve: impl FnMut(&str) -> Option<VisibilityCallback<N>>,
    ) -> DetectorOptions<N> {
        let mut handler = |name: Option<String>| match name {
            None => Handler::Noop,
            Some(name) => match resolve(&name) {
                Some(cb) => Handler::Callback(cb),
                None => Handler::Unresolved(name),
            },
        };
        let on_visible = handler(self.visible);
        let on_invisible = handler(self.invisible);
        let target = match self.target {
            Some(selector) if selector.trim() != CHILDREN_SELECTOR => Target::Selector(selector),
            _ => Target::Children,
        };

        DetectorOptions {
            container: Container::Viewport,
            target,
            on_visible,
            on_invisible,
            debounce: self.debounce,
            offset: self.offset,
            infinite: self.infinite,
            debug: self.debug,
        }
    }
}
