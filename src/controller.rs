//! The sync controller: map caching, echo suppression, wheel pump.
//!
//! Owns the only mutable state in the crate. The host forwards native
//! events (`handle_scroll`, `handle_wheel`) and frame callbacks
//! (`on_frame`); the controller keeps both panes on the shared virtual
//! axis defined by the scroll map.
//!
//! Event flow for a programmatic write:
//!   set A → host fires scroll-A → echo (suppressed) — never ping-pongs
//!   back into a re-derivation of B.
//!
//! ## echo 抑制の仕組み
//!
//! Controller がペインへ書き込んだ値は expectation として記録される。
//! 直後の native scroll イベントでオフセットが expectation の許容誤差内
//! なら自分の書き込みの反響とみなして破棄する。expectation はどちらの
//! 場合も消費されるので、抑制されるのは「次の1イベント」だけ。誤差以上
//! ずれたイベントは本物のユーザースクロール (スクロールバードラッグ等)
//! として全再同期する。

use anyhow::Result;
use log::{debug, error};

use crate::lookup::{Axis, lookup};
use crate::map::{Anchor, MapData, build_map};
use crate::pane::{Pane, PaneSide};
use crate::sched::{FrameHandle, FrameScheduler};
use crate::wheel::{WheelEvent, WheelSettings, brake_factor};

/// Default echo-suppression window in pane px. Empirical UX constant, not
/// a correctness requirement; override via [`ControllerOptions`].
pub const DEFAULT_ECHO_TOLERANCE_PX: f64 = 3.0;

/// Default pump-stop threshold in virtual px. Empirical, overridable.
pub const DEFAULT_STOP_THRESHOLD_PX: f64 = 2.0;

/// Supplies the current anchor list, invoked on every map rebuild.
pub type AnchorSupplier = Box<dyn FnMut() -> Result<Vec<Anchor>>>;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Construction-time configuration for [`SyncController`].
pub struct ControllerOptions {
    /// Anchor supplier; errors degrade the controller to an empty map.
    pub anchors: AnchorSupplier,
    /// Called after each completed two-pane sync.
    pub on_sync: Option<Box<dyn FnMut()>>,
    /// Called after each map rebuild (including the empty fallback).
    pub on_map: Option<Box<dyn FnMut(&MapData)>>,
    /// Called when the anchor supplier fails.
    pub on_error: Option<Box<dyn FnMut(&anyhow::Error)>>,
    /// Uniform shift applied when translating between virtual and pane
    /// coordinates: moves where in the viewport an anchor visually lands.
    pub align_offset: f64,
    /// Wheel behavior; live-tunable afterwards via `wheel_settings_mut`.
    pub wheel: WheelSettings,
    /// Echo-suppression window in pane px.
    pub echo_tolerance_px: f64,
    /// Pump-stop threshold in virtual px.
    pub stop_threshold_px: f64,
}

impl ControllerOptions {
    pub fn new(anchors: AnchorSupplier) -> Self {
        Self {
            anchors,
            on_sync: None,
            on_map: None,
            on_error: None,
            align_offset: 0.0,
            wheel: WheelSettings::default(),
            echo_tolerance_px: DEFAULT_ECHO_TOLERANCE_PX,
            stop_threshold_px: DEFAULT_STOP_THRESHOLD_PX,
        }
    }
}

/// Sanitize a tunable constant at point of use.
fn clean_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value >= 0.0 { value } else { fallback }
}

fn axis_of(side: PaneSide) -> Axis {
    match side {
        PaneSide::A => Axis::A,
        PaneSide::B => Axis::B,
    }
}

fn idx(side: PaneSide) -> usize {
    match side {
        PaneSide::A => 0,
        PaneSide::B => 1,
    }
}

/// Nearest snap/brake candidate boundary to `v`, in virtual px.
///
/// When any boundary is snap-flagged, only flagged boundaries count;
/// otherwise every segment start plus the virtual end is a candidate.
/// Simple configurations without explicit flags rely on this fallback.
fn nearest_boundary(map: &MapData, v: f64) -> Option<f64> {
    let mut best: Option<f64> = None;
    let mut consider = |candidate: f64| {
        if best.is_none_or(|b| (candidate - v).abs() < (b - v).abs()) {
            best = Some(candidate);
        }
    };
    for seg in &map.segments {
        if !map.has_snap || seg.snap {
            consider(seg.v_px);
        }
    }
    if !map.has_snap && !map.segments.is_empty() {
        consider(map.v_total);
    }
    best
}

// ---------------------------------------------------------------------------
// SyncController
// ---------------------------------------------------------------------------

/// Keeps two panes' scroll positions consistent along the virtual axis.
///
/// Single-threaded and event-driven: all state mutation happens inside
/// `handle_scroll`, `handle_wheel`, `on_frame`, or the direct entry points.
/// Within one call both pane writes complete before returning — the host
/// never observes a half-synced state.
pub struct SyncController<A: Pane, B: Pane, S: FrameScheduler> {
    pane_a: A,
    pane_b: B,
    sched: S,
    opts: ControllerOptions,

    map: Option<MapData>,
    dirty: bool,
    /// Current position on the virtual axis, clamped to [0, v_total].
    v_current: f64,
    /// Accumulated wheel delta not yet applied (the pump's debt).
    wheel_remaining: f64,
    /// True while the in-flight pump is a snap settle (brake bypassed).
    snapping: bool,
    pending_frame: Option<FrameHandle>,
    /// Last value this controller wrote to each pane, per [`PaneSide`].
    expected: [Option<f64>; 2],
    enabled: bool,
    destroyed: bool,
}

impl<A: Pane, B: Pane, S: FrameScheduler> SyncController<A, B, S> {
    /// Create a controller. No map is built here — it is built lazily the
    /// first time an event needs it.
    pub fn new(pane_a: A, pane_b: B, sched: S, opts: ControllerOptions) -> Self {
        Self {
            pane_a,
            pane_b,
            sched,
            opts,
            map: None,
            dirty: true,
            v_current: 0.0,
            wheel_remaining: 0.0,
            snapping: false,
            pending_frame: None,
            expected: [None, None],
            enabled: true,
            destroyed: false,
        }
    }

    // --- accessors ---

    pub fn pane_a(&self) -> &A {
        &self.pane_a
    }

    pub fn pane_b(&self) -> &B {
        &self.pane_b
    }

    /// Mutable pane access. Host writes through this are native scrolling
    /// from the controller's point of view: follow them with
    /// [`handle_scroll`](Self::handle_scroll).
    pub fn pane_a_mut(&mut self) -> &mut A {
        &mut self.pane_a
    }

    pub fn pane_b_mut(&mut self) -> &mut B {
        &mut self.pane_b
    }

    pub fn scheduler(&self) -> &S {
        &self.sched
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.sched
    }

    pub fn v_current(&self) -> f64 {
        self.v_current
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if !self.destroyed {
            self.enabled = enabled;
        }
    }

    pub fn wheel_settings(&self) -> &WheelSettings {
        &self.opts.wheel
    }

    /// Live-tune wheel behavior (smooth factor, snap range, braking).
    pub fn wheel_settings_mut(&mut self) -> &mut WheelSettings {
        &mut self.opts.wheel
    }

    pub fn set_align_offset(&mut self, align_offset: f64) {
        self.opts.align_offset = align_offset;
    }

    // --- map lifecycle ---

    /// Mark the cached map stale. Cheap and idempotent; the rebuild
    /// happens lazily on next access.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Resolve map staleness. The single choke point: every event path
    /// goes through here, so callers never observe a stale map.
    ///
    /// A failing anchor supplier degrades to the empty map (controller
    /// stays alive, synchronization inert) and reports via `on_error`.
    pub fn ensure_map(&mut self) -> &MapData {
        if self.destroyed {
            return self.map.get_or_insert_with(MapData::empty);
        }
        if self.dirty || self.map.is_none() {
            let extent_a = self.pane_a.scroll_range();
            let extent_b = self.pane_b.scroll_range();
            let map = match (self.opts.anchors)() {
                Ok(anchors) => build_map(&anchors, extent_a, extent_b),
                Err(e) => {
                    error!("ensure_map: anchor supplier failed: {e:#}");
                    if let Some(cb) = self.opts.on_error.as_mut() {
                        cb(&e);
                    }
                    MapData::empty()
                }
            };
            self.dirty = false;
            // The map changed under us: the previous virtual position is
            // meaningless. Re-derive it from pane A's live offset.
            self.v_current = lookup(
                &map.segments,
                Axis::A,
                Axis::Virtual,
                self.pane_a.scroll_offset() + self.opts.align_offset,
            )
            .clamp(0.0, map.v_total);
            debug!(
                "ensure_map: rebuilt ({} segments, v_total={}, dropped={}), v_current={}",
                map.segments.len(),
                map.v_total,
                map.dropped,
                self.v_current,
            );
            if let Some(cb) = self.opts.on_map.as_mut() {
                cb(&map);
            }
            self.map = Some(map);
        }
        self.map.as_ref().expect("map was just ensured")
    }

    // --- event intake ---

    /// Handle a native scroll notification from one pane.
    ///
    /// Echoes of the controller's own writes are discarded; genuine
    /// scrolls re-derive the virtual position from the moved pane and
    /// write the opposite pane.
    pub fn handle_scroll(&mut self, side: PaneSide) {
        if self.destroyed || !self.enabled {
            return;
        }
        self.ensure_map();

        let offset = match side {
            PaneSide::A => self.pane_a.scroll_offset(),
            PaneSide::B => self.pane_b.scroll_offset(),
        };
        // Consume the expectation either way: only the next-following
        // organic event is suppressed, never every future event.
        if let Some(e) = self.expected[idx(side)].take()
            && (offset - e).abs() < clean_or(self.opts.echo_tolerance_px, DEFAULT_ECHO_TOLERANCE_PX)
        {
            debug!("handle_scroll: {side:?} echo suppressed (offset={offset}, expected={e})");
            return;
        }

        let align = self.opts.align_offset;
        let map = self.map.as_ref().expect("ensured above");
        let v = lookup(&map.segments, axis_of(side), Axis::Virtual, offset + align)
            .clamp(0.0, map.v_total);
        let other = side.other();
        let target = lookup(&map.segments, Axis::Virtual, axis_of(other), v) - align;
        debug!("handle_scroll: {side:?} offset={offset} → v={v}, {other:?} target={target}");
        self.v_current = v;
        self.write_pane(other, target);
        self.fire_sync();
    }

    /// Handle a wheel event from one pane. Returns `true` if the event
    /// was consumed (the host should suppress its default scrolling).
    pub fn handle_wheel(&mut self, side: PaneSide, ev: &WheelEvent) -> bool {
        if self.destroyed || !self.enabled {
            return false;
        }
        // Modifier gestures and horizontal-only motion belong to the host.
        if ev.has_gesture_modifier() || ev.delta_y == 0.0 || !ev.delta_y.is_finite() {
            return false;
        }
        let smooth = self.opts.wheel.smooth_factor();
        if smooth == 0.0 {
            return false;
        }

        let viewport = match side {
            PaneSide::A => self.pane_a.viewport_extent(),
            PaneSide::B => self.pane_b.viewport_extent(),
        };
        let delta = ev.delta_px(viewport);

        self.ensure_map();
        // New user input cancels an in-flight snap's semantic effect; the
        // scheduled continuation simply becomes an ordinary pump.
        self.snapping = false;

        if smooth >= 1.0 {
            let v_total = self.map.as_ref().expect("ensured above").v_total;
            self.v_current = (self.v_current + delta).clamp(0.0, v_total);
            debug!("handle_wheel: instant delta={delta} → v={}", self.v_current);
            self.sync_panes();
        } else {
            self.wheel_remaining += delta;
            debug!(
                "handle_wheel: {side:?} delta={delta}, wheel_remaining={}",
                self.wheel_remaining
            );
            if self.pending_frame.is_none() {
                self.pending_frame = Some(self.sched.request_frame());
            }
        }
        true
    }

    /// One pump step. The host calls this when a requested frame fires.
    ///
    /// Drains `wheel_remaining * smooth` from the debt, applies it (brake
    /// damped) to the virtual position, syncs both panes, and reschedules
    /// until the remaining debt falls below the stop threshold — then
    /// attempts a snap settle.
    pub fn on_frame(&mut self) {
        if self.destroyed {
            return;
        }
        self.pending_frame = None;
        if !self.enabled {
            self.wheel_remaining = 0.0;
            self.snapping = false;
            return;
        }
        self.ensure_map();

        let smooth = self.opts.wheel.smooth_factor().min(1.0);
        if smooth == 0.0 {
            // Settings were tuned off mid-pump: drop the debt, end cleanly.
            self.wheel_remaining = 0.0;
            self.snapping = false;
            return;
        }

        let map = self.map.as_ref().expect("ensured above");
        let v_total = map.v_total;
        let drain = self.wheel_remaining * smooth;
        let damp = if self.snapping {
            1.0
        } else {
            match &self.opts.wheel.brake {
                Some(brake) => match nearest_boundary(map, self.v_current) {
                    Some(b) => brake_factor(brake, (b - self.v_current).abs()),
                    None => 1.0,
                },
                None => 1.0,
            }
        };

        // Damping reduces the motion applied, not the debt retired: the
        // user fights a brake rather than moving slower through time.
        self.v_current = (self.v_current + drain * damp).clamp(0.0, v_total);
        self.wheel_remaining -= drain;
        debug!(
            "on_frame: drain={drain} damp={damp} → v={}, remaining={}",
            self.v_current, self.wheel_remaining
        );
        self.sync_panes();

        let stop = clean_or(self.opts.stop_threshold_px, DEFAULT_STOP_THRESHOLD_PX);
        if self.wheel_remaining.abs() > stop {
            self.pending_frame = Some(self.sched.request_frame());
        } else {
            self.wheel_remaining = 0.0;
            let was_snapping = self.snapping;
            self.snapping = false;
            if !was_snapping {
                self.try_snap();
            }
        }
    }

    // --- direct entry points ---

    /// Jump to a virtual position (clamped) and sync both panes.
    pub fn scroll_to(&mut self, v: f64) {
        if self.destroyed || !self.enabled || !v.is_finite() {
            return;
        }
        self.ensure_map();
        let v_total = self.map.as_ref().expect("ensured above").v_total;
        self.v_current = v.clamp(0.0, v_total);
        self.wheel_remaining = 0.0;
        self.snapping = false;
        self.sync_panes();
    }

    /// Tear down: cancel the pending frame and turn every further method
    /// into a no-op. Idempotent; the panes are never touched again.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.enabled = false;
        self.wheel_remaining = 0.0;
        self.snapping = false;
        if let Some(handle) = self.pending_frame.take() {
            self.sched.cancel_frame(handle);
        }
        debug!("destroy: controller torn down");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    // --- internals ---

    /// Write both panes from `v_current`. Both writes happen before this
    /// returns — atomic from the host's perspective.
    fn sync_panes(&mut self) {
        let align = self.opts.align_offset;
        let map = self.map.as_ref().expect("callers ensure the map first");
        let target_a = lookup(&map.segments, Axis::Virtual, Axis::A, self.v_current) - align;
        let target_b = lookup(&map.segments, Axis::Virtual, Axis::B, self.v_current) - align;
        self.write_pane(PaneSide::A, target_a);
        self.write_pane(PaneSide::B, target_b);
        self.fire_sync();
    }

    /// Clamp into the pane's range, write, and record the expectation for
    /// echo suppression.
    fn write_pane(&mut self, side: PaneSide, target: f64) {
        let clamped = match side {
            PaneSide::A => {
                let t = target.clamp(0.0, self.pane_a.scroll_range());
                self.pane_a.set_scroll_offset(t);
                t
            }
            PaneSide::B => {
                let t = target.clamp(0.0, self.pane_b.scroll_range());
                self.pane_b.set_scroll_offset(t);
                t
            }
        };
        self.expected[idx(side)] = Some(clamped);
    }

    fn fire_sync(&mut self) {
        if let Some(cb) = self.opts.on_sync.as_mut() {
            cb();
        }
    }

    /// After a pump drains: if a candidate boundary is within snap range,
    /// schedule another drain whose debt is the signed distance to it.
    /// Snapping reuses the pump wholesale — it is not a second animation
    /// primitive.
    fn try_snap(&mut self) {
        let snap_px = clean_or(self.opts.wheel.snap_px, 0.0);
        if snap_px == 0.0 {
            return;
        }
        let map = self.map.as_ref().expect("callers ensure the map first");
        let Some(target) = nearest_boundary(map, self.v_current) else {
            return;
        };
        let dist = target - self.v_current;
        if dist == 0.0 || dist.abs() > snap_px {
            return;
        }
        debug!("try_snap: settling {dist}px onto boundary at v={target}");
        self.snapping = true;
        self.wheel_remaining = dist;
        if self.pending_frame.is_none() {
            self.pending_frame = Some(self.sched.request_frame());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pane::MemPane;
    use crate::sched::QueuedScheduler;
    use crate::wheel::{BrakeSettings, WheelDeltaMode};
    use std::cell::Cell;
    use std::rc::Rc;

    type TestController = SyncController<MemPane, MemPane, QueuedScheduler>;

    /// Pane A scrolls 0..1000, pane B 0..1000, one anchor (200 → 600).
    fn controller_with(opts: ControllerOptions) -> TestController {
        // content − viewport = 1000 scroll range per pane
        let pane_a = MemPane::new(1200.0, 200.0);
        let pane_b = MemPane::new(1600.0, 600.0);
        SyncController::new(pane_a, pane_b, QueuedScheduler::new(), opts)
    }

    fn anchor_opts() -> ControllerOptions {
        ControllerOptions::new(Box::new(|| Ok(vec![Anchor::new(200.0, 600.0)])))
    }

    /// Drain all scheduled frames (bounded to catch runaway pumps).
    fn run_pump(c: &mut TestController) {
        for _ in 0..1000 {
            if c.scheduler_mut().take_frame().is_none() {
                return;
            }
            c.on_frame();
        }
        panic!("pump did not terminate within 1000 frames");
    }

    // --- map lifecycle tests ---

    #[test]
    fn map_built_lazily_and_cached() {
        let calls = Rc::new(Cell::new(0));
        let calls2 = calls.clone();
        let mut c = controller_with(ControllerOptions::new(Box::new(move || {
            calls2.set(calls2.get() + 1);
            Ok(vec![])
        })));
        assert_eq!(calls.get(), 0);
        c.ensure_map();
        c.ensure_map();
        assert_eq!(calls.get(), 1);
        c.invalidate();
        c.ensure_map();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn supplier_error_degrades_to_empty_map() {
        let errors = Rc::new(Cell::new(0));
        let errors2 = errors.clone();
        let mut opts =
            ControllerOptions::new(Box::new(|| anyhow::bail!("no anchors today")));
        opts.on_error = Some(Box::new(move |_| errors2.set(errors2.get() + 1)));
        let mut c = controller_with(opts);
        let map = c.ensure_map();
        assert!(map.segments.is_empty());
        assert_eq!(map.v_total, 0.0);
        assert_eq!(errors.get(), 1);
        // Controller stays operational: events are accepted, just inert.
        c.pane_a_mut().set_scroll_offset(100.0);
        c.handle_scroll(PaneSide::A);
        assert_eq!(c.pane_b().scroll_offset(), 0.0);
    }

    #[test]
    fn on_map_fires_even_for_fallback() {
        let maps = Rc::new(Cell::new(0));
        let maps2 = maps.clone();
        let mut opts = ControllerOptions::new(Box::new(|| anyhow::bail!("boom")));
        opts.on_map = Some(Box::new(move |_| maps2.set(maps2.get() + 1)));
        let mut c = controller_with(opts);
        c.ensure_map();
        assert_eq!(maps.get(), 1);
    }

    // --- scroll event / echo suppression tests ---

    #[test]
    fn genuine_scroll_syncs_other_pane() {
        let mut c = controller_with(anchor_opts());
        c.pane_a_mut().set_scroll_offset(200.0);
        c.handle_scroll(PaneSide::A);
        assert_eq!(c.pane_b().scroll_offset(), 600.0);
        assert_eq!(c.v_current(), 600.0);
    }

    #[test]
    fn echo_within_tolerance_suppressed() {
        let mut c = controller_with(anchor_opts());
        c.pane_a_mut().set_scroll_offset(200.0);
        c.handle_scroll(PaneSide::A); // writes B=600, expectation recorded
        // B fires its native event 1px off the written value: echo.
        c.pane_b_mut().set_scroll_offset(601.0);
        c.handle_scroll(PaneSide::B);
        assert_eq!(c.pane_a().scroll_offset(), 200.0, "A must not move on echo");
    }

    #[test]
    fn delta_at_tolerance_triggers_resync() {
        let mut c = controller_with(anchor_opts());
        c.pane_a_mut().set_scroll_offset(200.0);
        c.handle_scroll(PaneSide::A); // B ← 600
        // At (not under) the tolerance: genuine scroll, A must re-sync.
        // b=603 → v=606 (B is stretched ×2 in this segment) → a=206.
        c.pane_b_mut().set_scroll_offset(603.0);
        c.handle_scroll(PaneSide::B);
        assert!((c.pane_a().scroll_offset() - 206.0).abs() < 1e-9);
    }

    #[test]
    fn expectation_consumed_by_first_event() {
        let mut c = controller_with(anchor_opts());
        c.pane_a_mut().set_scroll_offset(200.0);
        c.handle_scroll(PaneSide::A);
        c.handle_scroll(PaneSide::B); // echo at exactly the written value
        // Second event at the same offset: expectation is gone, so this is
        // organic — but it derives the identical v, so A stays put anyway.
        c.handle_scroll(PaneSide::B);
        assert_eq!(c.pane_a().scroll_offset(), 200.0);
    }

    #[test]
    fn sync_callback_fires() {
        let syncs = Rc::new(Cell::new(0));
        let syncs2 = syncs.clone();
        let mut opts = anchor_opts();
        opts.on_sync = Some(Box::new(move || syncs2.set(syncs2.get() + 1)));
        let mut c = controller_with(opts);
        c.pane_a_mut().set_scroll_offset(100.0);
        c.handle_scroll(PaneSide::A);
        assert_eq!(syncs.get(), 1);
    }

    // --- wheel tests ---

    #[test]
    fn wheel_accumulates_and_pumps() {
        let mut c = controller_with(anchor_opts());
        let consumed =
            c.handle_wheel(PaneSide::A, &WheelEvent::vertical(400.0, WheelDeltaMode::Pixel));
        assert!(consumed);
        assert_eq!(c.pane_a().scroll_offset(), 0.0, "nothing moves before a frame");
        run_pump(&mut c);
        assert!((c.v_current() - 400.0).abs() <= DEFAULT_STOP_THRESHOLD_PX);
        // Both panes synced to the drained position.
        assert!(c.pane_b().scroll_offset() > 0.0);
    }

    #[test]
    fn rapid_wheel_events_accumulate() {
        let mut c = controller_with(anchor_opts());
        c.handle_wheel(PaneSide::A, &WheelEvent::vertical(100.0, WheelDeltaMode::Pixel));
        c.handle_wheel(PaneSide::A, &WheelEvent::vertical(100.0, WheelDeltaMode::Pixel));
        run_pump(&mut c);
        assert!((c.v_current() - 200.0).abs() <= DEFAULT_STOP_THRESHOLD_PX);
    }

    #[test]
    fn wheel_clamps_at_zero() {
        let mut c = controller_with(anchor_opts());
        for _ in 0..5 {
            c.handle_wheel(PaneSide::A, &WheelEvent::vertical(-5000.0, WheelDeltaMode::Pixel));
            run_pump(&mut c);
        }
        assert_eq!(c.v_current(), 0.0);
        assert_eq!(c.pane_a().scroll_offset(), 0.0);
        assert_eq!(c.pane_b().scroll_offset(), 0.0);
    }

    #[test]
    fn wheel_clamps_at_end() {
        let mut c = controller_with(anchor_opts());
        c.handle_wheel(PaneSide::A, &WheelEvent::vertical(1_000_000.0, WheelDeltaMode::Pixel));
        run_pump(&mut c);
        let v_total = c.ensure_map().v_total;
        assert_eq!(c.v_current(), v_total);
        assert_eq!(c.pane_a().scroll_offset(), 1000.0);
        assert_eq!(c.pane_b().scroll_offset(), 1000.0);
    }

    #[test]
    fn instant_smooth_applies_same_tick() {
        let mut opts = anchor_opts();
        opts.wheel.smooth = 1.0;
        let mut c = controller_with(opts);
        c.handle_wheel(PaneSide::A, &WheelEvent::vertical(600.0, WheelDeltaMode::Pixel));
        assert_eq!(c.v_current(), 600.0);
        assert_eq!(c.pane_a().scroll_offset(), 200.0);
        assert_eq!(c.pane_b().scroll_offset(), 600.0);
        assert!(!c.scheduler_mut().frame_pending());
    }

    #[test]
    fn wheel_ignored_with_modifiers() {
        let mut c = controller_with(anchor_opts());
        let mut ev = WheelEvent::vertical(100.0, WheelDeltaMode::Pixel);
        ev.shift = true;
        assert!(!c.handle_wheel(PaneSide::A, &ev));
        assert!(!c.scheduler_mut().frame_pending());
    }

    #[test]
    fn horizontal_only_wheel_ignored() {
        let mut c = controller_with(anchor_opts());
        let ev = WheelEvent {
            delta_x: 50.0,
            delta_y: 0.0,
            mode: WheelDeltaMode::Pixel,
            shift: false,
            ctrl: false,
            meta: false,
        };
        assert!(!c.handle_wheel(PaneSide::A, &ev));
    }

    #[test]
    fn zero_smooth_disables_wheel() {
        let mut opts = anchor_opts();
        opts.wheel.smooth = 0.0;
        let mut c = controller_with(opts);
        assert!(!c.handle_wheel(PaneSide::A, &WheelEvent::vertical(100.0, WheelDeltaMode::Pixel)));
    }

    #[test]
    fn line_mode_scaled_by_line_height() {
        let mut opts = anchor_opts();
        opts.wheel.smooth = 1.0;
        let mut c = controller_with(opts);
        c.handle_wheel(PaneSide::A, &WheelEvent::vertical(3.0, WheelDeltaMode::Line));
        assert_eq!(c.v_current(), 48.0);
    }

    #[test]
    fn scroll_mid_pump_rederives_position() {
        let mut c = controller_with(anchor_opts());
        c.handle_wheel(PaneSide::A, &WheelEvent::vertical(400.0, WheelDeltaMode::Pixel));
        // One frame only, pump still in flight.
        c.scheduler_mut().take_frame();
        c.on_frame();
        assert!(c.scheduler_mut().frame_pending());
        // User drags pane A's scrollbar mid-pump: takes priority.
        c.pane_a_mut().set_scroll_offset(900.0);
        c.handle_scroll(PaneSide::A);
        assert_eq!(c.v_current(), 1300.0); // 600 + (900-200)
        // The continuation keeps draining from the new position.
        run_pump(&mut c);
        assert!(c.v_current() >= 1300.0);
    }

    // --- braking tests ---

    #[test]
    fn braking_slows_motion_not_debt() {
        let mut opts = anchor_opts();
        opts.wheel.smooth = 0.5;
        opts.wheel.brake = Some(BrakeSettings { min_factor: 0.1, zone_px: 10_000.0 });
        let mut c = controller_with(opts);
        c.handle_wheel(PaneSide::A, &WheelEvent::vertical(400.0, WheelDeltaMode::Pixel));
        run_pump(&mut c);
        // The huge zone keeps damping < 1 everywhere, so applied motion
        // falls short of the debt retired.
        assert!(c.v_current() < 400.0 - DEFAULT_STOP_THRESHOLD_PX);
        assert!(c.v_current() > 0.0);
    }

    #[test]
    fn no_brake_outside_zone_matches_undamped_run() {
        let mut braked = {
            let mut opts = anchor_opts();
            opts.wheel.brake = Some(BrakeSettings { min_factor: 0.1, zone_px: 1.0 });
            controller_with(opts)
        };
        let mut plain = controller_with(anchor_opts());
        for c in [&mut braked, &mut plain] {
            // Start clear of the v=0 boundary so the tiny zone never engages.
            c.scroll_to(300.0);
            c.handle_wheel(PaneSide::A, &WheelEvent::vertical(100.0, WheelDeltaMode::Pixel));
            run_pump(c);
        }
        assert!((braked.v_current() - plain.v_current()).abs() < 1e-9);
    }

    // --- snap tests ---

    #[test]
    fn pump_settles_onto_snap_anchor() {
        let mut opts = ControllerOptions::new(Box::new(|| Ok(vec![Anchor::snap(200.0, 600.0)])));
        opts.wheel.snap_px = 50.0;
        let mut c = controller_with(opts);
        // Drain lands near v=590; the anchor boundary is at v=600.
        c.handle_wheel(PaneSide::A, &WheelEvent::vertical(590.0, WheelDeltaMode::Pixel));
        run_pump(&mut c);
        assert!(
            (c.v_current() - 600.0).abs() <= DEFAULT_STOP_THRESHOLD_PX,
            "v={} did not settle onto the anchor",
            c.v_current()
        );
    }

    #[test]
    fn snap_out_of_range_does_nothing() {
        let mut opts = ControllerOptions::new(Box::new(|| Ok(vec![Anchor::snap(200.0, 600.0)])));
        opts.wheel.snap_px = 20.0;
        let mut c = controller_with(opts);
        c.handle_wheel(PaneSide::A, &WheelEvent::vertical(400.0, WheelDeltaMode::Pixel));
        run_pump(&mut c);
        assert!((c.v_current() - 400.0).abs() <= DEFAULT_STOP_THRESHOLD_PX);
        assert!((c.v_current() - 600.0).abs() > 20.0);
    }

    #[test]
    fn unflagged_boundaries_snap_when_none_flagged() {
        let mut opts = anchor_opts(); // anchor not snap-flagged
        opts.wheel.snap_px = 50.0;
        let mut c = controller_with(opts);
        c.handle_wheel(PaneSide::A, &WheelEvent::vertical(590.0, WheelDeltaMode::Pixel));
        run_pump(&mut c);
        // Fallback: every boundary is a candidate, including v=600.
        assert!((c.v_current() - 600.0).abs() <= DEFAULT_STOP_THRESHOLD_PX);
    }

    #[test]
    fn new_wheel_input_cancels_snap() {
        let mut opts = ControllerOptions::new(Box::new(|| Ok(vec![Anchor::snap(200.0, 600.0)])));
        opts.wheel.snap_px = 50.0;
        let mut c = controller_with(opts);
        c.handle_wheel(PaneSide::A, &WheelEvent::vertical(590.0, WheelDeltaMode::Pixel));
        // Drain the wheel pump until the snap pump gets scheduled.
        while !c.snapping {
            if c.scheduler_mut().take_frame().is_none() {
                break;
            }
            c.on_frame();
        }
        assert!(c.snapping, "snap should be in flight");
        // Fresh wheel input: next pump is ordinary, not a snap-continuation.
        c.handle_wheel(PaneSide::A, &WheelEvent::vertical(300.0, WheelDeltaMode::Pixel));
        assert!(!c.snapping);
        run_pump(&mut c);
        assert!(c.v_current() > 600.0 + 50.0);
    }

    // --- lifecycle tests ---

    #[test]
    fn disabled_controller_ignores_events() {
        let mut c = controller_with(anchor_opts());
        c.set_enabled(false);
        c.pane_a_mut().set_scroll_offset(200.0);
        c.handle_scroll(PaneSide::A);
        assert_eq!(c.pane_b().scroll_offset(), 0.0);
        assert!(!c.handle_wheel(PaneSide::A, &WheelEvent::vertical(100.0, WheelDeltaMode::Pixel)));
    }

    #[test]
    fn destroy_cancels_pending_frame() {
        let mut c = controller_with(anchor_opts());
        c.handle_wheel(PaneSide::A, &WheelEvent::vertical(400.0, WheelDeltaMode::Pixel));
        assert!(c.scheduler_mut().frame_pending());
        c.destroy();
        assert!(!c.scheduler_mut().frame_pending());
    }

    #[test]
    fn destroy_is_idempotent_and_final() {
        let mut c = controller_with(anchor_opts());
        c.destroy();
        c.destroy();
        assert!(c.is_destroyed());
        // All remaining methods are no-ops; the panes are never touched.
        c.handle_scroll(PaneSide::A);
        c.handle_wheel(PaneSide::A, &WheelEvent::vertical(100.0, WheelDeltaMode::Pixel));
        c.on_frame();
        c.scroll_to(500.0);
        c.set_enabled(true);
        assert!(!c.enabled());
        assert_eq!(c.pane_a().scroll_offset(), 0.0);
        assert_eq!(c.pane_b().scroll_offset(), 0.0);
    }

    #[test]
    fn scroll_to_jumps_and_syncs() {
        let mut c = controller_with(anchor_opts());
        c.scroll_to(600.0);
        assert_eq!(c.pane_a().scroll_offset(), 200.0);
        assert_eq!(c.pane_b().scroll_offset(), 600.0);
        c.scroll_to(1e9);
        assert_eq!(c.v_current(), 1400.0);
    }

    // --- alignment offset tests ---

    #[test]
    fn align_offset_round_trips() {
        let mut opts = anchor_opts();
        opts.align_offset = 50.0;
        let mut c = controller_with(opts);
        c.pane_a_mut().set_scroll_offset(150.0); // +50 → a=200 → v=600
        c.handle_scroll(PaneSide::A);
        assert_eq!(c.v_current(), 600.0);
        assert_eq!(c.pane_b().scroll_offset(), 550.0); // 600 − 50
    }
}
