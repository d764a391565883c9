/// An axis-aligned rectangle in document pixels.
///
/// `top`/`bottom` grow downwards and `left`/`right` grow to the right, matching the
/// coordinate space of scroll offsets.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Rect {
    /// Builds a rect from a document offset (top-left corner) and a size.
    pub fn from_offset_size(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            right: left + width,
            bottom: top + height,
            left,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Returns `true` if the two rects overlap or touch.
    ///
    /// Edges are inclusive: a rect whose `right` equals the other's `left` intersects it.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left <= other.right
            && self.right >= other.left
            && self.top <= other.bottom
            && self.bottom >= other.top
    }
}

/// Padding applied to each edge of the container bounds.
///
/// Values are added to the corresponding edge, so a positive `top` moves the top edge down
/// while a positive `bottom` moves the bottom edge down as well (grows the bounds).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Offset {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Offset {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// The same offset on every edge.
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }
}

/// Scroll position and inner size of a container, as reported by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_left: f64,
    pub width: f64,
    pub height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, scroll_left: f64, width: f64, height: f64) -> Self {
        Self {
            scroll_top,
            scroll_left,
            width,
            height,
        }
    }

    /// Effective visible bounds of the container after applying `offset`.
    pub fn bounds(&self, offset: &Offset) -> Rect {
        Rect {
            top: self.scroll_top + offset.top,
            right: self.scroll_left + self.width + offset.right,
            bottom: self.scroll_top + self.height + offset.bottom,
            left: self.scroll_left + offset.left,
        }
    }
}

/// Summary of one visibility pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Evaluation {
    /// Elements that became visible (and fired `on_visible`).
    pub entered: usize,
    /// Elements that became invisible (and fired `on_invisible`).
    pub exited: usize,
    /// Every element has been seen in non-infinite mode; the tracker stopped listening.
    pub completed: bool,
}

impl Evaluation {
    pub fn is_unchanged(&self) -> bool {
        self.entered == 0 && self.exited == 0
    }
}
