//! # Frame Scheduler
//!
//! Commits queued edits at most once per display refresh, and redraws only the cells that changed.
//! The host calls [`FrameScheduler::tick`] from its per-frame callback, passing the current time
//! explicitly - nothing here reads a clock, so tests can drive it synchronously.
//!
//! If the display surface is unavailable for a tick, nothing is flushed and nothing is lost: the edits
//! stay pending and the next tick tries again.

use std::time::{Duration, Instant};

use crate::{
    color::Color,
    coord::Coordinate,
    raster::{ChangedSet, Raster},
};

/// Updates per second the scheduler is designed around.
pub const TARGET_UPS: u32 = 60;

#[derive(thiserror::Error, Debug)]
pub enum SurfaceError {
    /// The backing context went away. It may come back next frame.
    #[error("display context lost")]
    Lost,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Somewhere to show the raster, one cell at a time. Write-only as far as the scheduler is concerned.
pub trait DisplaySurface {
    /// Prepare to draw a frame. An error skips this tick entirely.
    fn begin_frame(&mut self) -> Result<(), SurfaceError>;
    /// Paint a single cell.
    fn draw_cell(&mut self, coord: Coordinate, color: Color) -> Result<(), SurfaceError>;
    /// Present whatever was drawn this frame.
    fn end_frame(&mut self) -> Result<(), SurfaceError> {
        Ok(())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SchedulerState {
    /// Nothing pending.
    Idle,
    /// Edits or redraws are waiting on the next tick.
    Flushing,
}

#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct FrameStats {
    /// Ticks counted since the last once-a-second reset.
    pub frames_this_second: u32,
    /// Ticks per second over the last completed window, or `None` before the first one completes.
    pub updates_per_second: Option<f64>,
    /// Ticks skipped because the surface was unavailable, over the scheduler's lifetime.
    pub skipped: u64,
}

/// Result of a single tick.
#[derive(Debug, Default)]
pub struct TickOutcome {
    /// Cells whose committed color changed this tick. Empty if skipped or idle.
    pub changed: ChangedSet,
    /// Whether the surface was unavailable and the tick did nothing.
    pub skipped: bool,
    /// Number of cells drawn to the surface.
    pub drawn: usize,
}

pub struct FrameScheduler {
    stats: FrameStats,
    /// Start of the current stats window.
    window_start: Option<Instant>,
    /// Cells committed but not yet successfully drawn.
    undrawn: hashbrown::HashSet<Coordinate>,
    /// Last raster revision painted in full. `None` until the first paint.
    painted_revision: Option<u64>,
}
impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}
impl FrameScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stats: FrameStats::default(),
            window_start: None,
            undrawn: hashbrown::HashSet::new(),
            painted_revision: None,
        }
    }
    /// Time between ticks at [`TARGET_UPS`].
    #[must_use]
    pub fn frame_interval() -> Duration {
        Duration::from_secs(1) / TARGET_UPS
    }
    #[must_use]
    pub fn stats(&self) -> FrameStats {
        self.stats
    }
    #[must_use]
    pub fn state(&self, raster: &Raster) -> SchedulerState {
        if raster.is_dirty() || !self.undrawn.is_empty() || self.needs_full_paint(raster) {
            SchedulerState::Flushing
        } else {
            SchedulerState::Idle
        }
    }
    fn needs_full_paint(&self, raster: &Raster) -> bool {
        self.painted_revision != Some(raster.revision())
    }
    /// Count every tick into a once-a-second window. A tick past the end of the window closes it
    /// before being counted into the next.
    fn count_frame(&mut self, now: Instant) {
        let start = *self.window_start.get_or_insert(now);
        let elapsed = now.saturating_duration_since(start);
        if elapsed >= Duration::from_secs(1) {
            let ups = f64::from(self.stats.frames_this_second) / elapsed.as_secs_f64();
            log::trace!("{ups:.1} updates per second");
            self.stats.updates_per_second = Some(ups);
            self.stats.frames_this_second = 0;
            self.window_start = Some(now);
        }
        self.stats.frames_this_second += 1;
    }
    /// Run one display refresh worth of work.
    pub fn tick(
        &mut self,
        now: Instant,
        raster: &mut Raster,
        surface: &mut impl DisplaySurface,
    ) -> TickOutcome {
        self.count_frame(now);
        let mut outcome = TickOutcome::default();
        if self.state(raster) == SchedulerState::Idle {
            return outcome;
        }

        if let Err(e) = surface.begin_frame() {
            log::warn!("display unavailable, skipping frame: {e}");
            self.stats.skipped += 1;
            outcome.skipped = true;
            return outcome;
        }

        let full_paint = self.needs_full_paint(raster);
        outcome.changed = raster.flush();

        let result = if full_paint {
            // Anything undrawn is covered by the full paint.
            self.undrawn.clear();
            let result = Self::draw_all(raster.iter(), surface, &mut outcome.drawn, &mut self.undrawn);
            if result.is_ok() {
                self.painted_revision = Some(raster.revision());
            }
            result
        } else {
            self.undrawn.extend(outcome.changed.iter().copied());
            let cells: Vec<_> = self.undrawn.drain().collect();
            Self::draw_all(
                cells
                    .into_iter()
                    .map(|coord| (coord, raster.get_or(coord, Color::BLACK))),
                surface,
                &mut outcome.drawn,
                &mut self.undrawn,
            )
        };
        let result = result.and_then(|()| surface.end_frame());
        if let Err(e) = result {
            log::warn!(
                "display failed mid-frame, {} cells deferred: {e}",
                self.undrawn.len()
            );
        }
        outcome
    }
    /// Draw each cell, stashing the rest into `undrawn` on the first failure.
    fn draw_all(
        mut cells: impl Iterator<Item = (Coordinate, Color)>,
        surface: &mut impl DisplaySurface,
        drawn: &mut usize,
        undrawn: &mut hashbrown::HashSet<Coordinate>,
    ) -> Result<(), SurfaceError> {
        while let Some((coord, color)) = cells.next() {
            if let Err(e) = surface.draw_cell(coord, color) {
                undrawn.insert(coord);
                undrawn.extend(cells.map(|(coord, _)| coord));
                return Err(e);
            }
            *drawn += 1;
        }
        Ok(())
    }
}
