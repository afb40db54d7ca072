//! Terminal demo host: two text files side by side, scroll-synced.
//!
//! Layout:
//!   col 0..split            : pane A (left file)
//!   col split               : divider
//!   col split+1..term_cols  : pane B (right file)
//!   row term_rows-1         : status bar
//!
//! Each text line occupies [`LINE_HEIGHT_PX`] virtual pixels, so the pane
//! extents the controller sees behave like a pixel-based host. Anchors are
//! derived from heading lines (leading `#`) whose text appears in both
//! files, paired in order and flagged as snap targets.
//!
//! The event loop is dirty-flag + frame-budget: input events mark the
//! screen dirty; when the budget elapses we drain the controller's queued
//! frame (the wheel pump), redraw, and check the file watcher.

use std::cell::{Cell, RefCell};
use std::io::{self, Write, stdout};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::{
    ExecutableCommand, QueueableCommand, cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyModifiers, MouseEventKind,
    },
    style::{self, Stylize},
    terminal,
};
use log::{debug, error, info};

use crate::config::Config;
use crate::controller::{ControllerOptions, SyncController};
use crate::map::Anchor;
use crate::pane::{MemPane, Pane, PaneSide};
use crate::sched::QueuedScheduler;
use crate::watch::PairWatcher;
use crate::wheel::{LINE_HEIGHT_PX, WheelDeltaMode, WheelEvent};

type DemoController = SyncController<MemPane, MemPane, QueuedScheduler>;

/// Poll interval while idle (keeps the file watcher responsive).
const IDLE_POLL: Duration = Duration::from_millis(200);

// ---------------------------------------------------------------------------
// RawGuard — Drop で raw mode / alternate screen / mouse capture を復元
// ---------------------------------------------------------------------------

struct RawGuard {
    cleaned: bool,
}

impl RawGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        stdout().execute(terminal::EnterAlternateScreen)?;
        stdout().execute(cursor::Hide)?;
        stdout().execute(EnableMouseCapture)?;
        Ok(Self { cleaned: false })
    }

    fn cleanup(&mut self) {
        if self.cleaned {
            return;
        }
        self.cleaned = true;
        let mut out = stdout();
        let _ = out.execute(DisableMouseCapture);
        let _ = out.execute(cursor::Show);
        let _ = out.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

impl Drop for RawGuard {
    fn drop(&mut self) {
        self.cleanup();
    }
}

// ---------------------------------------------------------------------------
// Anchors from headings
// ---------------------------------------------------------------------------

/// Pair up heading lines (leading `#`) with identical trimmed text that
/// appear in both files, in order. Each pair becomes a snap-flagged anchor
/// at the heading's line position.
fn heading_anchors(left: &[String], right: &[String]) -> Vec<Anchor> {
    let headings = |lines: &[String]| -> Vec<(usize, String)> {
        lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.trim_start().starts_with('#'))
            .map(|(i, l)| (i, l.trim().to_string()))
            .collect()
    };
    let left_h = headings(left);
    let right_h = headings(right);

    let mut anchors = Vec::new();
    let mut next_right = 0;
    for (l_idx, text) in &left_h {
        // In-order matching: never pair backwards, skip unmatched headings.
        if let Some(pos) = right_h[next_right..].iter().position(|(_, t)| t == text) {
            let (r_idx, _) = right_h[next_right + pos];
            anchors.push(Anchor::snap(
                *l_idx as f64 * LINE_HEIGHT_PX,
                r_idx as f64 * LINE_HEIGHT_PX,
            ));
            next_right += pos + 1;
        }
    }
    anchors
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

struct PaneText {
    left: Vec<String>,
    right: Vec<String>,
}

fn read_lines(path: &Path) -> anyhow::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    Ok(text.lines().map(str::to_string).collect())
}

/// Content rows available above the status bar.
fn content_rows(term_rows: u16) -> u16 {
    term_rows.saturating_sub(1)
}

fn pane_extents(line_count: usize, term_rows: u16) -> (f64, f64) {
    let content = line_count as f64 * LINE_HEIGHT_PX;
    let viewport = f64::from(content_rows(term_rows)) * LINE_HEIGHT_PX;
    (content, viewport)
}

/// Nudge one pane natively (keyboard scrolling) and notify the controller
/// as a host scroll event would.
fn nudge(ctrl: &mut DemoController, side: PaneSide, delta_px: f64) {
    match side {
        PaneSide::A => {
            let pane = ctrl.pane_a_mut();
            let target = pane.scroll_offset() + delta_px;
            pane.set_scroll_offset(target);
        }
        PaneSide::B => {
            let pane = ctrl.pane_b_mut();
            let target = pane.scroll_offset() + delta_px;
            pane.set_scroll_offset(target);
        }
    }
    ctrl.handle_scroll(side);
}

/// Run the demo viewer on two text files.
pub fn run(left_path: PathBuf, right_path: PathBuf, config: Config, watch: bool) -> anyhow::Result<()> {
    let text = Rc::new(RefCell::new(PaneText {
        left: read_lines(&left_path)?,
        right: read_lines(&right_path)?,
    }));

    let watcher = if watch {
        match PairWatcher::new(&left_path, &right_path) {
            Ok(w) => Some(w),
            Err(e) => {
                error!("watch: disabled ({e:#})");
                None
            }
        }
    } else {
        None
    };

    let (mut term_cols, mut term_rows) = terminal::size()?;
    let mut guard = RawGuard::enter()?;

    let (content_a, viewport_a) = pane_extents(text.borrow().left.len(), term_rows);
    let (content_b, viewport_b) = pane_extents(text.borrow().right.len(), term_rows);

    let supplier_text = text.clone();
    let mut opts = ControllerOptions::new(Box::new(move || {
        let t = supplier_text.borrow();
        Ok(heading_anchors(&t.left, &t.right))
    }));
    let dropped = Rc::new(Cell::new(0usize));
    let dropped_sink = dropped.clone();
    opts.on_map = Some(Box::new(move |map| dropped_sink.set(map.dropped)));
    opts.wheel = config.wheel;
    opts.align_offset = config.align_offset;
    opts.echo_tolerance_px = config.echo_tolerance_px;
    opts.stop_threshold_px = config.stop_threshold_px;

    let mut ctrl = SyncController::new(
        MemPane::new(content_a, viewport_a),
        MemPane::new(content_b, viewport_b),
        QueuedScheduler::new(),
        opts,
    );

    let step_px = f64::from(config.demo.scroll_step_lines) * LINE_HEIGHT_PX;
    let wheel_lines = f64::from(config.demo.scroll_step_lines);
    let mut focus = PaneSide::A;
    let mut dirty = true;
    let mut last_render = Instant::now();
    info!("demo: viewing {} | {}", left_path.display(), right_path.display());

    loop {
        let animating = dirty || ctrl.scheduler().frame_pending();
        let timeout = if animating {
            config.demo.frame_budget.saturating_sub(last_render.elapsed())
        } else {
            IDLE_POLL
        };

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    match (key.code, key.modifiers) {
                        (KeyCode::Char('q'), _)
                        | (KeyCode::Char('c'), KeyModifiers::CONTROL) => break,

                        (KeyCode::Tab, _) => {
                            focus = focus.other();
                            dirty = true;
                        }

                        // キーボードは「ネイティブスクロール」経路:
                        // ペインを直接動かして handle_scroll で再同期させる
                        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => {
                            nudge(&mut ctrl, focus, step_px);
                            dirty = true;
                        }
                        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => {
                            nudge(&mut ctrl, focus, -step_px);
                            dirty = true;
                        }

                        (KeyCode::Char('g'), _) => {
                            ctrl.scroll_to(0.0);
                            dirty = true;
                        }
                        (KeyCode::Char('G'), _) => {
                            let v_total = ctrl.ensure_map().v_total;
                            ctrl.scroll_to(v_total);
                            dirty = true;
                        }

                        (KeyCode::Char('r'), _) => {
                            ctrl.invalidate();
                            dirty = true;
                        }

                        _ => {}
                    }
                }

                Event::Mouse(mouse) => {
                    let lines = match mouse.kind {
                        MouseEventKind::ScrollDown => wheel_lines,
                        MouseEventKind::ScrollUp => -wheel_lines,
                        _ => 0.0,
                    };
                    if lines != 0.0 {
                        // The wheeled pane is whichever is under the cursor.
                        let side = if mouse.column < term_cols / 2 {
                            PaneSide::A
                        } else {
                            PaneSide::B
                        };
                        let ev = WheelEvent::vertical(lines, WheelDeltaMode::Line);
                        if ctrl.handle_wheel(side, &ev) {
                            dirty = true;
                        }
                    }
                }

                Event::Resize(new_cols, new_rows) => {
                    debug!("resize: {term_cols}x{term_rows} → {new_cols}x{new_rows}");
                    (term_cols, term_rows) = (new_cols, new_rows);
                    let (ca, va) = pane_extents(text.borrow().left.len(), term_rows);
                    let (cb, vb) = pane_extents(text.borrow().right.len(), term_rows);
                    ctrl.pane_a_mut().resize(ca, va);
                    ctrl.pane_b_mut().resize(cb, vb);
                    ctrl.invalidate();
                    dirty = true;
                }

                _ => {}
            }
            continue;
        }

        // poll timeout — frame budget elapsed
        if let Some(w) = &watcher {
            for side in w.changed() {
                let (path, rows) = match side {
                    PaneSide::A => (&left_path, term_rows),
                    PaneSide::B => (&right_path, term_rows),
                };
                match read_lines(path) {
                    Ok(lines) => {
                        info!("watch: reloaded {} ({} lines)", path.display(), lines.len());
                        let (content, viewport) = pane_extents(lines.len(), rows);
                        match side {
                            PaneSide::A => {
                                text.borrow_mut().left = lines;
                                ctrl.pane_a_mut().resize(content, viewport);
                            }
                            PaneSide::B => {
                                text.borrow_mut().right = lines;
                                ctrl.pane_b_mut().resize(content, viewport);
                            }
                        }
                        ctrl.invalidate();
                        dirty = true;
                    }
                    Err(e) => error!("watch: reload failed: {e:#}"),
                }
            }
        }

        if ctrl.scheduler_mut().take_frame().is_some() {
            ctrl.on_frame();
            dirty = true;
        }

        if dirty {
            draw(&ctrl, &text.borrow(), term_cols, term_rows, focus, dropped.get())?;
            dirty = false;
        }
        last_render = Instant::now();
    }

    guard.cleanup();
    Ok(())
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

fn visible_slice(lines: &[String], offset_px: f64, rows: u16) -> &[String] {
    let first = (offset_px / LINE_HEIGHT_PX) as usize;
    let first = first.min(lines.len());
    let last = (first + rows as usize).min(lines.len());
    &lines[first..last]
}

fn clip_pad(line: &str, width: usize) -> String {
    let mut s: String = line.chars().take(width).collect();
    while s.chars().count() < width {
        s.push(' ');
    }
    s
}

fn draw(
    ctrl: &DemoController,
    text: &PaneText,
    term_cols: u16,
    term_rows: u16,
    focus: PaneSide,
    dropped: usize,
) -> io::Result<()> {
    let mut out = stdout();
    let rows = content_rows(term_rows);
    let split = term_cols / 2;
    let left_w = split.saturating_sub(1) as usize;
    let right_w = term_cols.saturating_sub(split + 1) as usize;

    let left = visible_slice(&text.left, ctrl.pane_a().scroll_offset(), rows);
    let right = visible_slice(&text.right, ctrl.pane_b().scroll_offset(), rows);

    for row in 0..rows {
        out.queue(cursor::MoveTo(0, row))?;
        let l = left.get(row as usize).map_or("", |s| s.as_str());
        let r = right.get(row as usize).map_or("", |s| s.as_str());
        out.queue(style::Print(clip_pad(l, left_w)))?;
        out.queue(style::Print(" │ "))?;
        out.queue(style::Print(clip_pad(r, right_w.saturating_sub(2))))?;
    }

    let focus_label = match focus {
        PaneSide::A => "left",
        PaneSide::B => "right",
    };
    let status = format!(
        " a:{:>5.0} b:{:>5.0} v:{:>6.0} dropped:{dropped}  focus:{focus_label}  \
         q:quit j/k:scroll tab:focus r:rebuild  duoscroll {}",
        ctrl.pane_a().scroll_offset(),
        ctrl.pane_b().scroll_offset(),
        ctrl.v_current(),
        env!("DUOSCROLL_BUILD_GIT_HASH"),
    );
    out.queue(cursor::MoveTo(0, term_rows.saturating_sub(1)))?;
    out.queue(style::PrintStyledContent(
        clip_pad(&status, term_cols as usize).reverse(),
    ))?;
    out.flush()
}
