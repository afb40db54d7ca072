//! duoscroll: two-pane scroll synchronization over a shared virtual axis.
//!
//! Two viewports showing related but differently sized content (a source
//! editor and its rendered preview, say) are kept in lockstep: a sparse
//! list of anchor correspondences is compiled into a piecewise-linear
//! scroll map ([`map::build_map`]), positions are converted between the
//! panes and the virtual axis with one O(log n) lookup
//! ([`lookup::lookup`]), and a [`controller::SyncController`] drives the
//! live positions, suppressing the event echoes its own writes produce,
//! smoothing wheel input across frames, and optionally settling near
//! anchors.
//!
//! The map builder and lookup are pure and usable on their own; the
//! controller is the only stateful piece and the only one that touches
//! pane handles or a frame scheduler.

pub mod config;
pub mod controller;
pub mod demo;
pub mod lookup;
pub mod map;
pub mod pane;
pub mod sched;
pub mod watch;
pub mod wheel;

pub use controller::{ControllerOptions, SyncController};
pub use lookup::{Axis, lookup};
pub use map::{Anchor, MapData, Segment, build_map};
pub use pane::{MemPane, Pane, PaneSide};
pub use sched::{FrameHandle, FrameScheduler, QueuedScheduler};
pub use wheel::{BrakeSettings, WheelDeltaMode, WheelEvent, WheelSettings};
