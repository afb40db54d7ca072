//! Axis-to-axis conversion over a built scroll map.
//!
//! One algorithm serves all six conversions between pane A, pane B and the
//! virtual axis: binary search for the containing segment, then linear
//! interpolation. There is no "primary pane" — both panes are peers of the
//! virtual axis.

use crate::map::Segment;

/// One of the three coordinate spaces of the scroll map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Pane A pixels.
    A,
    /// Pane B pixels.
    B,
    /// Shared virtual pixels.
    Virtual,
}

impl Segment {
    fn start(&self, axis: Axis) -> f64 {
        match axis {
            Axis::A => self.a_px,
            Axis::B => self.b_px,
            Axis::Virtual => self.v_px,
        }
    }

    fn len(&self, axis: Axis) -> f64 {
        match axis {
            Axis::A => self.a_s,
            Axis::B => self.b_s,
            Axis::Virtual => self.v_s,
        }
    }
}

/// Convert `value` on axis `from` to the corresponding position on axis
/// `to`. O(log n) in the segment count.
///
/// Never clamps: a value below the first segment's start behaves as that
/// start, and a value past the last segment's start extrapolates along the
/// last segment's slope (possibly overshooting the nominal end of the
/// target axis). Callers clamp before or after as appropriate.
///
/// An empty segment list returns 0 — the defined fallback, not an error.
pub fn lookup(segments: &[Segment], from: Axis, to: Axis, value: f64) -> f64 {
    if segments.is_empty() {
        return 0.0;
    }

    // Rightmost segment whose start on `from` is <= value.
    let idx = segments
        .partition_point(|seg| seg.start(from) <= value)
        .saturating_sub(1);
    let seg = &segments[idx];

    let span = seg.len(from);
    if span == 0.0 {
        // Zero-width interval on the source axis (e.g. a virtual stretch
        // during which this pane does not move): its whole extent maps to
        // the segment start on the target axis.
        return seg.start(to);
    }
    let t = (value - seg.start(from)) / span;
    seg.start(to) + t * seg.len(to)
}
