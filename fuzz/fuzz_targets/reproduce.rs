use duoscroll::lookup::{Axis, lookup};
use duoscroll::map::{Anchor, build_map};
use log::info;

/// Same byte layout as the fuzz_map target.
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

fn main() {
    env_logger::init();

    let path = std::env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: reproduce <fuzz_map-artifact-file>");
        std::process::exit(1);
    });

    let data = std::fs::read(&path).unwrap_or_else(|e| {
        eprintln!("Failed to read {path}: {e}");
        std::process::exit(1);
    });

    let (extent_a, extent_b, anchors) = decode(&data);
    eprintln!(
        "=== Input: {} ({} bytes) -> extents ({extent_a}, {extent_b}), {} anchors ===",
        path,
        data.len(),
        anchors.len(),
    );
    for an in &anchors {
        info!("anchor a={} b={} snap={}", an.a_px, an.b_px, an.snap);
    }

    let map = build_map(&anchors, extent_a, extent_b);
    eprintln!(
        "map: {} segments, v_total={}, dropped={}, has_snap={}",
        map.segments.len(),
        map.v_total,
        map.dropped,
        map.has_snap,
    );
    for (i, seg) in map.segments.iter().enumerate() {
        eprintln!(
            "  seg[{i}]: a={}+{} b={}+{} v={}+{} snap={}",
            seg.a_px, seg.a_s, seg.b_px, seg.b_s, seg.v_px, seg.v_s, seg.snap,
        );
    }

    // Lookup sweep along the virtual axis.
    if map.v_total.is_finite() && map.v_total > 0.0 {
        for i in 0..=8 {
            let v = map.v_total * f64::from(i) / 8.0;
            let a = lookup(&map.segments, Axis::Virtual, Axis::A, v);
            let b = lookup(&map.segments, Axis::Virtual, Axis::B, v);
            eprintln!("  v={v} -> a={a} b={b}");
        }
    }
}
