#![no_main]

use duoscroll::controller::{ControllerOptions, SyncController};
use duoscroll::map::Anchor;
use duoscroll::pane::{MemPane, PaneSide};
use duoscroll::sched::QueuedScheduler;
use duoscroll::wheel::{BrakeSettings, WheelDeltaMode, WheelEvent};
use libfuzzer_sys::fuzz_target;

fn read_f64(data: &[u8], at: usize) -> f64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&data[at..at + 8]);
    f64::from_le_bytes(buf)
}

/// Interleaved event stream against a live controller. Deltas and offsets
/// are kept finite (the host contract) but otherwise unconstrained; anchor
/// coordinates are raw bit patterns.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let n_anchors = (data[0] as usize).min(8);
    let mut pos = 1;
    let mut anchors = Vec::with_capacity(n_anchors);
    for _ in 0..n_anchors {
        if pos + 16 > data.len() {
            break;
        }
        anchors.push(Anchor::new(read_f64(data, pos), read_f64(data, pos + 8)));
        pos += 16;
    }

    let supplied = anchors.clone();
    let opts = ControllerOptions::new(Box::new(move || Ok(supplied.clone())));
    let mut c = SyncController::new(
        MemPane::new(6400.0, 480.0),
        MemPane::new(11200.0, 600.0),
        QueuedScheduler::new(),
        opts,
    );

    let finite = |x: f64| if x.is_finite() { x.clamp(-1e9, 1e9) } else { 0.0 };

    while pos + 9 <= data.len() {
        let op = data[pos];
        let arg = read_f64(data, pos + 1);
        pos += 9;
        match op % 12 {
            0 => {
                c.pane_a_mut().set_scroll_offset(finite(arg));
                c.handle_scroll(PaneSide::A);
            }
            1 => {
                c.pane_b_mut().set_scroll_offset(finite(arg));
                c.handle_scroll(PaneSide::B);
            }
            2 => {
                c.handle_wheel(
                    PaneSide::A,
                    &WheelEvent::vertical(finite(arg), WheelDeltaMode::Pixel),
                );
            }
            3 => {
                c.handle_wheel(
                    PaneSide::B,
                    &WheelEvent::vertical(finite(arg), WheelDeltaMode::Line),
                );
            }
            4 => {
                if c.scheduler_mut().take_frame().is_some() {
                    c.on_frame();
                }
            }
            5 => c.scroll_to(arg),
            6 => c.invalidate(),
            7 => c.wheel_settings_mut().smooth = arg,
            8 => c.wheel_settings_mut().snap_px = arg,
            9 => {
                c.wheel_settings_mut().brake =
                    Some(BrakeSettings { min_factor: arg, zone_px: 50.0 });
            }
            10 => c.set_enabled(arg.to_bits() & 1 == 0),
            _ => c.set_align_offset(finite(arg)),
        }

        assert!(c.v_current().is_finite(), "v_current went non-finite");
        assert!(c.v_current() >= 0.0, "v_current went negative: {}", c.v_current());
        assert!(c.pane_a().scroll_offset().is_finite());
        assert!(c.pane_b().scroll_offset().is_finite());
    }

    // Let any in-flight pump run out (bounded: a tiny fuzzed smooth factor
    // may legitimately need many frames, so no termination assert here).
    for _ in 0..256 {
        if c.scheduler_mut().take_frame().is_none() {
            break;
        }
        c.on_frame();
        assert!(c.v_current().is_finite());
    }

    c.destroy();
    c.on_frame();
});
