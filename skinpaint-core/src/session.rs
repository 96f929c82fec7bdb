//! # Editor Session
//!
//! Ties the raster, frame scheduler, and model projector together behind a single owner. Hosts feed it
//! input events as they arrive and call [`Session::tick`] once per display refresh.

use std::time::Instant;

use crate::{
    color::Color,
    coord::Coordinate,
    projector::{ModelProjector, SceneHost, SyncOutcome},
    raster::{DecodeError, EncodeError, Raster},
    scheduler::{DisplaySurface, FrameScheduler, FrameStats, SchedulerState},
    stroke::{SampleEffect, SampleKind, StrokeState},
    tools::Tool,
};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Config {
    /// Color painted by [`Tool::Eraser`].
    pub eraser_color: Color,
    /// Color of every cell of a freshly created skin.
    pub new_skin_color: Color,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            eraser_color: Color::WHITE,
            new_skin_color: Color::WHITE,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum InputKind {
    /// Pointer went down.
    Press,
    /// Pointer moved. Ignored unless a gesture is in progress.
    Move,
    /// Pointer went up, ending the gesture.
    Release,
    /// A discrete keyboard step. Behaves like a press that stays held.
    Step,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct InputEvent {
    pub kind: InputKind,
    pub coord: Coordinate,
    pub tool: Tool,
    pub color: Color,
}

/// What a call to [`Session::tick`] did.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct TickSummary {
    /// Cells committed with a new color.
    pub changed: usize,
    /// Cells drawn to the display surface.
    pub drawn: usize,
    /// The display surface was unavailable.
    pub skipped: bool,
    pub sync: SyncOutcome,
}

pub struct Session {
    config: Config,
    raster: Raster,
    scheduler: FrameScheduler,
    projector: ModelProjector,
    /// Present between press and release.
    stroke: Option<StrokeState>,
    /// Most recent color taken with the picker.
    picked: Option<Color>,
}
impl Session {
    /// Start a session on a fresh skin.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            raster: Raster::new(config.new_skin_color),
            scheduler: FrameScheduler::new(),
            projector: ModelProjector::new(),
            stroke: None,
            picked: None,
        }
    }
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
    #[must_use]
    pub fn raster(&self) -> &Raster {
        &self.raster
    }
    #[must_use]
    pub fn frame_stats(&self) -> FrameStats {
        self.scheduler.stats()
    }
    #[must_use]
    pub fn projector(&self) -> &ModelProjector {
        &self.projector
    }
    #[must_use]
    pub fn picked_color(&self) -> Option<Color> {
        self.picked
    }
    #[must_use]
    pub fn is_stroking(&self) -> bool {
        self.stroke.is_some()
    }
    /// Nothing is left to commit, draw, or upload.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.scheduler.state(&self.raster) == SchedulerState::Idle
            && !self.projector.needs_sync(&self.raster)
    }
    /// Apply one input event. Edits are queued, and become visible on the next [`Self::tick`].
    pub fn handle(&mut self, event: InputEvent) -> SampleEffect {
        let kind = match event.kind {
            InputKind::Release => {
                self.stroke = None;
                return SampleEffect::default();
            }
            InputKind::Move => SampleKind::Motion,
            InputKind::Press | InputKind::Step => SampleKind::Discrete,
        };
        let stroke = match self.stroke.take() {
            Some(mut stroke) => {
                stroke.retool(event.tool, event.color);
                stroke
            }
            // Hovering.
            None if kind == SampleKind::Motion => return SampleEffect::default(),
            None => StrokeState::new(event.tool, event.color),
        };
        let stroke = self.stroke.insert(stroke);
        let effect = stroke.sample(
            &mut self.raster,
            event.coord,
            kind,
            self.config.eraser_color,
        );
        if let Some(color) = effect.picked {
            log::debug!("picked {color} at {}", event.coord);
            self.picked = Some(color);
        }
        effect
    }
    /// Commit pending edits, redraw what changed, and bring the preview up to date.
    pub fn tick(
        &mut self,
        now: Instant,
        surface: &mut impl DisplaySurface,
        host: &mut impl SceneHost,
    ) -> TickSummary {
        let outcome = self.scheduler.tick(now, &mut self.raster, surface);
        let sync = self.projector.sync(host, &self.raster, &outcome.changed);
        TickSummary {
            changed: outcome.changed.len(),
            drawn: outcome.drawn,
            skipped: outcome.skipped,
            sync,
        }
    }
    /// Replace the skin with an encoded PNG. On error the current skin is kept as-is.
    pub fn load(&mut self, encoded: &[u8]) -> Result<(), DecodeError> {
        self.raster.load(encoded)?;
        self.stroke = None;
        log::info!("loaded skin, {} bytes", encoded.len());
        Ok(())
    }
    /// Discard the skin and start over with a blank one.
    pub fn new_skin(&mut self) {
        self.raster.reset(self.config.new_skin_color);
        self.stroke = None;
        log::info!("new skin");
    }
    /// Encode the committed skin. Edits still pending until the next tick are not included.
    pub fn serialize(&self) -> Result<Vec<u8>, EncodeError> {
        self.raster.serialize()
    }
}
