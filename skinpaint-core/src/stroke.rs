//! # Strokes
//!
//! A stroke is the lifetime of a single drawing gesture, from press to release. The [`StrokeState`]
//! remembers where the previous sample landed so that sparse pointer samples can be joined with a
//! line instead of leaving gaps.

use crate::{
    color::Color,
    coord::Coordinate,
    raster::Raster,
    tools::{self, Tool},
};

/// Whether a sample starts a new action or continues the current one.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SampleKind {
    /// Pointer press or a discrete key step. Single-shot tools act on these.
    Discrete,
    /// Pointer motion while pressed.
    Motion,
}

/// What a single sample did.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct SampleEffect {
    /// Number of edits queued. May count cells that fell outside the raster.
    pub queued: usize,
    /// Color sampled by the picker, if it ran.
    pub picked: Option<Color>,
}

#[derive(Clone, Debug)]
pub struct StrokeState {
    /// Where the previous sample landed, if there has been one this stroke.
    last: Option<Coordinate>,
    tool: Tool,
    color: Color,
}
impl StrokeState {
    #[must_use]
    pub fn new(tool: Tool, color: Color) -> Self {
        Self {
            last: None,
            tool,
            color,
        }
    }
    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }
    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }
    #[must_use]
    pub fn last(&self) -> Option<Coordinate> {
        self.last
    }
    /// Change the active tool and color mid-gesture. Switching tools breaks the line, so the
    /// next sample starts fresh rather than joining back to the old tool's last point.
    pub fn retool(&mut self, tool: Tool, color: Color) {
        if tool != self.tool {
            self.last = None;
        }
        self.tool = tool;
        self.color = color;
    }
    /// Apply one input sample. `eraser` is the background color the eraser paints with.
    pub fn sample(
        &mut self,
        raster: &mut Raster,
        coord: Coordinate,
        kind: SampleKind,
        eraser: Color,
    ) -> SampleEffect {
        let mut effect = SampleEffect::default();
        match self.tool {
            Tool::Pencil | Tool::Eraser => {
                let color = if self.tool == Tool::Eraser {
                    eraser
                } else {
                    self.color
                };
                effect.queued = match self.last {
                    Some(last) => tools::stroke(raster, last, coord, color),
                    None => {
                        tools::point(raster, coord, color);
                        1
                    }
                };
            }
            Tool::Fill => {
                if kind == SampleKind::Discrete {
                    effect.queued = tools::flood_fill(raster, coord, self.color);
                }
            }
            Tool::Picker => {
                if kind == SampleKind::Discrete {
                    if let Ok(color) = raster.effective(coord) {
                        self.color = color;
                        effect.picked = Some(color);
                    }
                }
            }
        }
        // Kept even if out of range, so a stroke that leaves the canvas and comes back
        // joins up across the edge.
        self.last = Some(coord);
        effect
    }
}
