#![no_main]

use duoscroll::lookup::{Axis, lookup};
use duoscroll::map::{Anchor, build_map};
use libfuzzer_sys::fuzz_target;

/// Raw bytes → (extent_a, extent_b, anchors). Every f64 bit pattern is fair
/// game, including NaN and infinities; the low mantissa bit of `a_px`
/// doubles as the snap flag.
fn decode(data: &[u8]) -> (f64, f64, Vec<Anchor>) {
    let mut vals = data
        .chunks_exact(8)
        .map(|c| f64::from_le_bytes(c.try_into().unwrap()));
    let extent_a = vals.next().unwrap_or(0.0);
    let extent_b = vals.next().unwrap_or(0.0);
    let mut anchors = Vec::new();
    loop {
        let (Some(a), Some(b)) = (vals.next(), vals.next()) else {
            break;
        };
        if a.to_bits() & 1 == 1 {
            anchors.push(Anchor::snap(a, b));
        } else {
            anchors.push(Anchor::new(a, b));
        }
    }
    (extent_a, extent_b, anchors)
}

fuzz_target!(|data: &[u8]| {
    let (extent_a, extent_b, anchors) = decode(data);

    // Must not panic, whatever the input.
    let map = build_map(&anchors, extent_a, extent_b);

    // Never empty: zero anchors still yield the full-extent segment.
    assert!(!map.segments.is_empty());
    assert!(map.dropped <= anchors.len());

    for seg in &map.segments {
        assert!(seg.a_s >= 0.0, "negative a span: {seg:?}");
        assert!(seg.b_s >= 0.0, "negative b span: {seg:?}");
        assert_eq!(seg.v_s, seg.a_s.max(seg.b_s), "v span not dominant: {seg:?}");
    }

    // Segment starts ascend on every axis and stay contiguous. Coordinates
    // are whole pixels, so additions are exact up to 2^53; beyond that we
    // allow for the rounding of huge extents.
    for pair in map.segments.windows(2) {
        // x == y also covers the +inf running offsets of near-MAX extents.
        let rel =
            |x: f64, y: f64| x == y || (x - y).abs() <= 1e-9 * x.abs().max(y.abs()).max(1.0);
        assert!(rel(pair[0].a_px + pair[0].a_s, pair[1].a_px), "a gap: {pair:?}");
        assert!(rel(pair[0].b_px + pair[0].b_s, pair[1].b_px), "b gap: {pair:?}");
        assert!(rel(pair[0].v_px + pair[0].v_s, pair[1].v_px), "v gap: {pair:?}");
        assert!(pair[0].a_px <= pair[1].a_px);
        assert!(pair[0].b_px <= pair[1].b_px);
        assert!(pair[0].v_px <= pair[1].v_px);
    }

    // v_total can only overflow to +inf when the extents themselves are near
    // f64::MAX; the geometry checks below need finite arithmetic.
    if !map.v_total.is_finite() {
        return;
    }

    // Lookups along the virtual axis stay inside both panes' ranges.
    for i in 0..=16 {
        let v = map.v_total * (i as f64) / 16.0;
        let a = lookup(&map.segments, Axis::Virtual, Axis::A, v);
        let b = lookup(&map.segments, Axis::Virtual, Axis::B, v);
        assert!(a.is_finite() && b.is_finite(), "non-finite lookup at v={v}");
        assert!((-1e-6..=extent_a.max(0.0) + 1e-6).contains(&a) || extent_a > 1e15);
        assert!((-1e-6..=extent_b.max(0.0) + 1e-6).contains(&b) || extent_b > 1e15);
    }
});
