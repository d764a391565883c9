use alloc::vec::Vec;

use crate::{Container, Error, Rect, ScrollMetrics};

/// The document capabilities the tracker needs from its host.
///
/// Implementations wrap whatever the UI layer uses as a document (a browser DOM, a retained
/// widget tree, a test double). `Node` should be a cheap, non-owning handle such as an id or a
/// weak reference: the tracker clones and stores it, and must not keep removed nodes alive.
pub trait Host {
    type Node: Clone;

    /// Current scroll position and inner size of `container`.
    ///
    /// Returns `None` if the container cannot be measured (e.g. it was removed).
    fn scroll_metrics(&self, container: &Container<Self::Node>) -> Option<ScrollMetrics>;

    /// Direct children of `node`, in document order.
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Nodes under `root` matching `selector`, in document order.
    fn select(&self, root: &Self::Node, selector: &str) -> Result<Vec<Self::Node>, Error>;

    /// Document-space rect of `node` (its offset plus its size).
    fn offset_rect(&self, node: &Self::Node) -> Option<Rect>;
}

impl<H: Host + ?Sized> Host for &H {
    type Node = H::Node;

    fn scroll_metrics(&self, container: &Container<Self::Node>) -> Option<ScrollMetrics> {
        (**self).scroll_metrics(container)
    }

    fn children(&self, node: &Self::Node) -> Vec<Self::Node> {
        (**self).children(node)
    }

    fn select(&self, root: &Self::Node, selector: &str) -> Result<Vec<Self::Node>, Error> {
        (**self).select(root, selector)
    }

    fn offset_rect(&self, node: &Self::Node) -> Option<Rect> {
        (**self).offset_rect(node)
    }
}
