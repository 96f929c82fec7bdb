//! # Coordinates
//!
//! Cell positions within the fixed-size skin raster. Coordinates are signed so that pointer samples
//! landing past an edge are still representable - every operation simply rejects them.

/// Width of a skin texture, in cells.
pub const WIDTH: u32 = 64;
/// Height of a skin texture, in cells.
pub const HEIGHT: u32 = 64;
/// Total number of cells in a skin texture.
pub const CELLS: usize = (WIDTH * HEIGHT) as usize;

/// A cell position. Valid within `[0, WIDTH) x [0, HEIGHT)`, with `y` growing downward.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}
impl Coordinate {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.x >= 0 && self.y >= 0 && (self.x as u32) < WIDTH && (self.y as u32) < HEIGHT
    }
    /// Row-major index of this cell, or `None` if out of range.
    #[must_use]
    pub fn index(self) -> Option<usize> {
        use az::CheckedAs;
        if !self.is_valid() {
            return None;
        }
        let x: usize = self.x.checked_as()?;
        let y: usize = self.y.checked_as()?;
        Some(y * WIDTH as usize + x)
    }
    /// Inverse of [`Self::index`].
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        use az::CheckedAs;
        if index >= CELLS {
            return None;
        }
        let width = WIDTH as usize;
        Some(Self {
            x: (index % width).checked_as()?,
            y: (index / width).checked_as()?,
        })
    }
    /// The four orthogonal neighbors, which may be out of range.
    #[must_use]
    pub fn neighbors4(self) -> [Self; 4] {
        let Self { x, y } = self;
        [
            Self::new(x.saturating_add(1), y),
            Self::new(x.saturating_sub(1), y),
            Self::new(x, y.saturating_add(1)),
            Self::new(x, y.saturating_sub(1)),
        ]
    }
    /// Every valid coordinate, in row-major order.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn all() -> impl ExactSizeIterator<Item = Self> {
        (0..CELLS).map(|index| {
            let width = WIDTH as usize;
            Self::new((index % width) as i32, (index / width) as i32)
        })
    }
}
impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
impl From<(i32, i32)> for Coordinate {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}
