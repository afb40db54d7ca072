//! Scrollable pane abstraction.
//!
//! The controller only ever needs four things from a pane: read/write the
//! current scroll offset, and read the content and viewport extents. Any
//! host viewport (a DOM element wrapper, a terminal column, a test stub)
//! satisfies this.

/// Which of the two panes an event or write refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneSide {
    A,
    B,
}

impl PaneSide {
    /// The opposite pane.
    pub fn other(self) -> Self {
        match self {
            PaneSide::A => PaneSide::B,
            PaneSide::B => PaneSide::A,
        }
    }
}

/// A host viewport the controller can synchronize.
///
/// `scroll_offset` is the live, mutable scroll position; `content_extent`
/// and `viewport_extent` are read-only measurements. The maximum scroll
/// offset (scroll range) is derived as
/// `max(0, content_extent - viewport_extent)` — panes never compute it
/// themselves.
pub trait Pane {
    fn scroll_offset(&self) -> f64;
    fn set_scroll_offset(&mut self, offset: f64);
    fn content_extent(&self) -> f64;
    fn viewport_extent(&self) -> f64;

    /// Scrollable range of this pane.
    fn scroll_range(&self) -> f64 {
        (self.content_extent() - self.viewport_extent()).max(0.0)
    }
}

/// A plain in-memory pane: an offset plus fixed extents.
///
/// Used by the terminal demo host (one per text column) and by tests; also
/// handy for hosts that track scroll positions themselves and only mirror
/// them into a real widget after synchronization.
#[derive(Debug, Clone)]
pub struct MemPane {
    offset: f64,
    content: f64,
    viewport: f64,
}

impl MemPane {
    pub fn new(content_extent: f64, viewport_extent: f64) -> Self {
        Self { offset: 0.0, content: content_extent, viewport: viewport_extent }
    }

    /// Replace the measured extents (content grew/shrank, viewport
    /// resized). The offset is clamped back into the new range.
    pub fn resize(&mut self, content_extent: f64, viewport_extent: f64) {
        self.content = content_extent;
        self.viewport = viewport_extent;
        self.offset = self.offset.clamp(0.0, self.scroll_range());
    }
}

impl Pane for MemPane {
    fn scroll_offset(&self) -> f64 {
        self.offset
    }

    fn set_scroll_offset(&mut self, offset: f64) {
        self.offset = offset.clamp(0.0, self.scroll_range());
    }

    fn content_extent(&self) -> f64 {
        self.content
    }

    fn viewport_extent(&self) -> f64 {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_range_is_content_minus_viewport() {
        let pane = MemPane::new(1000.0, 200.0);
        assert_eq!(pane.scroll_range(), 800.0);
    }

    #[test]
    fn scroll_range_never_negative() {
        let pane = MemPane::new(100.0, 200.0);
        assert_eq!(pane.scroll_range(), 0.0);
    }

    #[test]
    fn set_offset_clamps_into_range() {
        let mut pane = MemPane::new(1000.0, 200.0);
        pane.set_scroll_offset(900.0);
        assert_eq!(pane.scroll_offset(), 800.0);
        pane.set_scroll_offset(-10.0);
        assert_eq!(pane.scroll_offset(), 0.0);
    }

    #[test]
    fn resize_reclamps_offset() {
        let mut pane = MemPane::new(1000.0, 200.0);
        pane.set_scroll_offset(800.0);
        pane.resize(500.0, 200.0);
        assert_eq!(pane.scroll_offset(), 300.0);
    }

    #[test]
    fn side_other_flips() {
        assert_eq!(PaneSide::A.other(), PaneSide::B);
        assert_eq!(PaneSide::B.other(), PaneSide::A);
    }
}
