//! Wheel input model: events, delta normalization, behavior settings.
//!
//! Pure logic, no I/O. The controller consumes [`WheelEvent`]s the host
//! forwards from its native event source and interprets them under the
//! live-tunable [`WheelSettings`].

/// Unit mode of a wheel event's deltas, mirroring the host conventions
/// (DOM `deltaMode`, terminal line scrolls).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDeltaMode {
    /// Deltas are already in pixels.
    Pixel,
    /// Deltas are in text lines.
    Line,
    /// Deltas are in viewport pages.
    Page,
}

/// Pixels per line for [`WheelDeltaMode::Line`] deltas.
pub const LINE_HEIGHT_PX: f64 = 16.0;

/// A wheel event as forwarded by the host.
#[derive(Debug, Clone, Copy)]
pub struct WheelEvent {
    pub delta_x: f64,
    pub delta_y: f64,
    pub mode: WheelDeltaMode,
    /// Shift held — horizontal-scroll gesture in most hosts.
    pub shift: bool,
    /// Ctrl held — zoom gesture in most hosts.
    pub ctrl: bool,
    /// Meta/Cmd held.
    pub meta: bool,
}

impl WheelEvent {
    /// A plain vertical wheel event with no modifiers.
    pub fn vertical(delta_y: f64, mode: WheelDeltaMode) -> Self {
        Self { delta_x: 0.0, delta_y, mode, shift: false, ctrl: false, meta: false }
    }

    /// True if a modifier associated with a non-scroll browser gesture is
    /// held; such events belong to the host, not the controller.
    pub fn has_gesture_modifier(&self) -> bool {
        self.shift || self.ctrl || self.meta
    }

    /// Vertical delta in pixels, given the viewport extent of the pane the
    /// event arrived on (needed for page-mode deltas).
    pub fn delta_px(&self, viewport_extent: f64) -> f64 {
        match self.mode {
            WheelDeltaMode::Pixel => self.delta_y,
            WheelDeltaMode::Line => self.delta_y * LINE_HEIGHT_PX,
            WheelDeltaMode::Page => self.delta_y * viewport_extent,
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Anchor-proximity braking: wheel drain is damped near segment boundaries
/// to make fine alignment easier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrakeSettings {
    /// Damping factor exactly on a boundary, in (0, 1].
    pub min_factor: f64,
    /// Radius of the braking zone around each boundary, in virtual px.
    pub zone_px: f64,
}

/// Wheel behavior configuration. Live-tunable on the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelSettings {
    /// Smoothing factor: 0 disables wheel handling entirely, (0, 1)
    /// drains the accumulated delta across frames, >= 1 applies deltas
    /// instantly.
    pub smooth: f64,
    /// Snap-settle range in virtual px; 0 disables snapping.
    pub snap_px: f64,
    /// Optional braking near anchors.
    pub brake: Option<BrakeSettings>,
}

impl Default for WheelSettings {
    fn default() -> Self {
        Self { smooth: 0.3, snap_px: 0.0, brake: None }
    }
}

impl WheelSettings {
    /// Smoothing factor sanitized at point of use: non-finite or negative
    /// values degrade to the default rather than freezing the scroll
    /// experience.
    pub fn smooth_factor(&self) -> f64 {
        if self.smooth.is_finite() && self.smooth >= 0.0 {
            self.smooth
        } else {
            WheelSettings::default().smooth
        }
    }
}

// ---------------------------------------------------------------------------
// Braking curve
// ---------------------------------------------------------------------------

/// Damping multiplier at `distance` virtual px from the nearest boundary.
///
/// Smoothstep (`3t² − 2t³`) rather than linear: zero slope at both ends of
/// the zone, so braking engages and releases without a velocity step.
pub fn brake_factor(brake: &BrakeSettings, distance: f64) -> f64 {
    let zone = if brake.zone_px.is_finite() { brake.zone_px.max(0.0) } else { 0.0 };
    let min = if brake.min_factor.is_finite() {
        brake.min_factor.clamp(0.0, 1.0)
    } else {
        1.0
    };
    if zone == 0.0 || distance >= zone {
        return 1.0;
    }
    let t = (distance / zone).clamp(0.0, 1.0);
    let s = t * t * (3.0 - 2.0 * t);
    min + (1.0 - min) * s
}
