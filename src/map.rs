//! Scroll map construction: anchor correspondences → ordered segment table.
//!
//! Pure geometry, no I/O. The map is a piecewise-linear correspondence
//! between three axes: pane A pixels, pane B pixels, and a shared virtual
//! axis sized so that both panes reach their scroll limits at the same
//! virtual position (`v_total`).

use log::debug;

// ---------------------------------------------------------------------------
// Anchor
// ---------------------------------------------------------------------------

/// A caller-asserted correspondence: pixel `a_px` in pane A is "the same
/// place" as pixel `b_px` in pane B.
///
/// Anchors are ephemeral input to [`build_map`]; they carry no identity
/// beyond their coordinates. `snap` marks the anchor as a settle/brake
/// target for the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub a_px: f64,
    pub b_px: f64,
    pub snap: bool,
}

impl Anchor {
    pub fn new(a_px: f64, b_px: f64) -> Self {
        Self { a_px, b_px, snap: false }
    }

    /// An anchor flagged as a snap/brake target.
    pub fn snap(a_px: f64, b_px: f64) -> Self {
        Self { a_px, b_px, snap: true }
    }
}

// ---------------------------------------------------------------------------
// Segment / MapData
// ---------------------------------------------------------------------------

/// One interval of the scroll map: a start position on each axis plus the
/// interval's length on each axis, where `v_s = max(a_s, b_s)`.
///
/// Within a segment the axis with the larger span (the dominant pane) moves
/// at native 1:1 speed along the virtual axis; the shorter axis is
/// stretched proportionally to cover the same virtual distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a_px: f64,
    pub b_px: f64,
    pub v_px: f64,
    pub a_s: f64,
    pub b_s: f64,
    pub v_s: f64,
    /// Snap flag of the anchor this segment begins at.
    pub snap: bool,
}

/// A fully built scroll map. Immutable once built; a stale map is replaced
/// wholesale by rebuilding, never patched.
#[derive(Debug, Clone, PartialEq)]
pub struct MapData {
    /// Contiguous, non-overlapping segments ordered by ascending `a_px`
    /// (equivalently `v_px`).
    pub segments: Vec<Segment>,
    /// Total length of the virtual axis (sum of all `v_s`).
    pub v_total: f64,
    /// Anchors rejected during sanitization (non-monotonic or duplicate).
    pub dropped: usize,
    /// Whether any segment start is a snap target.
    pub has_snap: bool,
}

impl MapData {
    /// The inert fallback map: no segments, zero extent. Lookups over it
    /// return 0 and the controller degrades to "no synchronization".
    pub fn empty() -> Self {
        Self { segments: Vec::new(), v_total: 0.0, dropped: 0, has_snap: false }
    }
}

// ---------------------------------------------------------------------------
// build_map
// ---------------------------------------------------------------------------

/// Sanitize one extent: non-finite → 0, negative → 0.
fn clean_extent(extent: f64) -> f64 {
    if extent.is_finite() { extent.max(0.0) } else { 0.0 }
}

/// Build a scroll map from anchor correspondences and the two panes'
/// maximum scroll offsets.
///
/// Anchor coordinates are rounded to whole pixels and clamped into range,
/// then sorted by `a_px`. A synthetic `(0, 0)` head and
/// `(extent_a, extent_b)` tail bracket the caller's anchors. An anchor is
/// accepted only if its `b_px` does not go backwards and its `a_px` is
/// strictly past the previous accepted anchor (first of a duplicate `a_px`
/// wins). Rejected anchors are counted in `dropped`, not errors: anchor
/// lists come from imprecise document structure and partial usability
/// beats failure.
///
/// Zero anchors (or all rejected) still produce exactly one segment
/// spanning the full extents — never an empty result.
pub fn build_map(anchors: &[Anchor], extent_a: f64, extent_b: f64) -> MapData {
    let extent_a = clean_extent(extent_a);
    let extent_b = clean_extent(extent_b);

    // 丸め+クランプ後に a_px でソート。NaN 座標の anchor は total_cmp で
    // 末尾に集まり、受理条件 (比較が false になる) で自然に drop される。
    let mut sorted: Vec<Anchor> = anchors
        .iter()
        .map(|an| Anchor {
            a_px: an.a_px.round().clamp(0.0, extent_a),
            b_px: an.b_px.round().clamp(0.0, extent_b),
            snap: an.snap,
        })
        .collect();
    sorted.sort_by(|x, y| x.a_px.total_cmp(&y.a_px));

    // Boundary points: synthetic head, accepted anchors, synthetic tail.
    let mut bounds: Vec<Anchor> = Vec::with_capacity(sorted.len() + 2);
    bounds.push(Anchor::new(0.0, 0.0));
    let mut dropped = 0usize;
    for an in sorted {
        let last = bounds.last().expect("head is always present");
        // (a) b must not go backwards — a backwards B mapping would make
        // interpolation ambiguous. (b) a must strictly advance — equal
        // positions would create zero-length duplicate segments.
        if an.b_px >= last.b_px && an.a_px > last.a_px {
            bounds.push(an);
        } else {
            dropped += 1;
        }
    }
    let last = bounds.last().expect("head is always present");
    if bounds.len() == 1 || last.a_px != extent_a || last.b_px != extent_b {
        bounds.push(Anchor::new(extent_a, extent_b));
    }

    let mut segments = Vec::with_capacity(bounds.len() - 1);
    let mut v_px = 0.0;
    let mut has_snap = false;
    for pair in bounds.windows(2) {
        let a_s = pair[1].a_px - pair[0].a_px;
        let b_s = pair[1].b_px - pair[0].b_px;
        let v_s = a_s.max(b_s);
        segments.push(Segment {
            a_px: pair[0].a_px,
            b_px: pair[0].b_px,
            v_px,
            a_s,
            b_s,
            v_s,
            snap: pair[0].snap,
        });
        has_snap |= pair[0].snap;
        v_px += v_s;
    }

    debug!(
        "build_map: {} anchors -> {} segments, v_total={v_px}, dropped={dropped}",
        anchors.len(),
        segments.len(),
    );
    MapData { segments, v_total: v_px, dropped, has_snap }
}
