//! # Tools
//!
//! Edit operations on a [`Raster`]. Every tool only ever *queues* edits - nothing is visible in the
//! committed raster until the frame scheduler flushes.

mod fill;
mod line;

pub use fill::flood_fill;
pub use line::Line;

use crate::{color::Color, coord::Coordinate, raster::Raster};

#[derive(
    strum::AsRefStr,
    strum::EnumString,
    strum::EnumIter,
    strum::Display,
    PartialEq,
    Eq,
    Copy,
    Clone,
    Hash,
    Debug,
    Default,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Tool {
    /// Draw with the chosen color.
    #[default]
    Pencil,
    /// Draw with the background color.
    Eraser,
    /// Flood the region under the cursor.
    Fill,
    /// Sample a color without drawing.
    Picker,
}

/// Set a single cell. Out of range is a no-op.
pub fn point(raster: &mut Raster, coord: Coordinate, color: Color) {
    raster.queue_edit(coord, color);
}

/// Draw every cell on the line from `from` to `to`, inclusive. Returns the number of cells visited,
/// including any that fell outside the raster.
pub fn stroke(raster: &mut Raster, from: Coordinate, to: Coordinate, color: Color) -> usize {
    let line = Line::new(from, to);
    let len = line.len();
    for coord in line {
        point(raster, coord, color);
    }
    len
}
