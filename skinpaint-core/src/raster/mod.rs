//! # Raster
//!
//! The skin texture itself. A [`Raster`] owns a dense grid of committed [`Color`]s, plus a map of
//! pending edits which have been requested by tools but not yet committed.
//!
//! All mutation is two-phase: tools call [`Raster::queue_edit`], and the frame scheduler later calls
//! [`Raster::flush`] to commit everything in one go. Nothing outside of this module can reach the
//! committed cells mutably, so the committed state is never observed half-flushed.
//!
//! Alongside the colors, the raster keeps the alpha of each committed cell. Loaded skins keep their
//! transparency, which is what lets the overlay layer show the base through it. Anything painted
//! becomes fully opaque.

pub mod io;

use crate::{
    color::Color,
    coord::{Coordinate, CELLS},
};

pub use io::{DecodeError, EncodeError};

/// Alpha of every painted cell, and of new skins.
pub const OPAQUE: u8 = 0xFF;

/// Coordinates whose committed color changed during a flush.
pub type ChangedSet = hashbrown::HashSet<Coordinate>;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("coordinate {0} is outside the raster")]
pub struct OutOfRange(pub Coordinate);

pub struct Raster {
    /// Row-major, invariant: `cells.len() == CELLS`
    cells: Box<[Color]>,
    /// Alpha of each committed cell, same layout as `cells`.
    alpha: Box<[u8]>,
    /// Invariant: every key is a valid coordinate.
    pending: hashbrown::HashMap<Coordinate, Color>,
    /// Bumped whenever the cells are replaced wholesale, as opposed to flushed.
    revision: u64,
}
impl Default for Raster {
    /// A blank, white skin.
    fn default() -> Self {
        Self::new(Color::WHITE)
    }
}
impl Raster {
    /// Create a new skin with every cell set to `fill`.
    #[must_use]
    pub fn new(fill: Color) -> Self {
        Self {
            cells: vec![fill; CELLS].into_boxed_slice(),
            alpha: vec![OPAQUE; CELLS].into_boxed_slice(),
            pending: hashbrown::HashMap::new(),
            revision: 0,
        }
    }
    /// Get the committed color at `coord`.
    pub fn get(&self, coord: Coordinate) -> Result<Color, OutOfRange> {
        coord
            .index()
            .map(|idx| self.cells[idx])
            .ok_or(OutOfRange(coord))
    }
    /// Get the committed color at `coord`, or `sentinel` if out of range.
    #[must_use]
    pub fn get_or(&self, coord: Coordinate, sentinel: Color) -> Color {
        self.get(coord).unwrap_or(sentinel)
    }
    /// Get the committed alpha at `coord`.
    pub fn alpha(&self, coord: Coordinate) -> Result<u8, OutOfRange> {
        coord
            .index()
            .map(|idx| self.alpha[idx])
            .ok_or(OutOfRange(coord))
    }
    /// Get the color waiting to be committed at `coord`, if any.
    #[must_use]
    pub fn pending(&self, coord: Coordinate) -> Option<Color> {
        self.pending.get(&coord).copied()
    }
    /// Get the color `coord` will have after the next flush - the pending edit if any, otherwise the committed color.
    pub fn effective(&self, coord: Coordinate) -> Result<Color, OutOfRange> {
        match self.pending(coord) {
            Some(color) => Ok(color),
            None => self.get(coord),
        }
    }
    /// Request that `coord` become `color` at the next flush. A later request for the same
    /// coordinate replaces this one. Out-of-range coordinates are ignored.
    pub fn queue_edit(&mut self, coord: Coordinate, color: Color) {
        if coord.is_valid() {
            self.pending.insert(coord, color);
        }
    }
    /// Whether any edits are waiting for a flush.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.pending.is_empty()
    }
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
    /// Commit every pending edit, returning the coordinates whose color actually changed.
    /// Edited cells become opaque, so painting a transparent cell its own color is a change too.
    ///
    /// Calling this with nothing pending is a no-op returning an empty set.
    pub fn flush(&mut self) -> ChangedSet {
        let mut changed = ChangedSet::with_capacity(self.pending.len());
        let queued = self.pending.len();
        for (coord, color) in self.pending.drain() {
            // Validated in `queue_edit`.
            let Some(idx) = coord.index() else {
                continue;
            };
            let (cell, alpha) = (&mut self.cells[idx], &mut self.alpha[idx]);
            if *cell != color || *alpha != OPAQUE {
                *cell = color;
                *alpha = OPAQUE;
                changed.insert(coord);
            }
        }
        if queued != 0 {
            log::debug!("flushed {queued} edits, {} cells changed", changed.len());
        }
        changed
    }
    /// Replace every cell with opaque `fill`, discarding pending edits.
    pub fn reset(&mut self, fill: Color) {
        self.replace(
            vec![fill; CELLS].into_boxed_slice(),
            vec![OPAQUE; CELLS].into_boxed_slice(),
        );
    }
    /// Replace the whole raster from an encoded PNG. On error, `self` is left untouched.
    pub fn load(&mut self, encoded: &[u8]) -> Result<(), DecodeError> {
        let (cells, alpha) = io::decode(encoded)?;
        self.replace(cells, alpha);
        Ok(())
    }
    /// Encode the committed cells as a PNG, in the same format [`Self::load`] accepts.
    pub fn serialize(&self) -> Result<Vec<u8>, EncodeError> {
        io::encode(&self.cells, &self.alpha)
    }
    /// Counts wholesale replacements (loads and resets). Consumers can compare this against a
    /// previously seen value to know when everything needs to be redrawn.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }
    /// Iterate every committed cell in row-major order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (Coordinate, Color)> + '_ {
        Coordinate::all().zip(self.cells.iter().copied())
    }
    /// Copy out the committed cells and their alpha as RGBA8, row-major.
    #[must_use]
    pub fn to_rgba8(&self) -> Vec<u8> {
        io::interleave(&self.cells, &self.alpha)
    }
    fn replace(&mut self, cells: Box<[Color]>, alpha: Box<[u8]>) {
        debug_assert_eq!(cells.len(), CELLS);
        debug_assert_eq!(alpha.len(), CELLS);
        self.cells = cells;
        self.alpha = alpha;
        self.pending.clear();
        self.revision = self.revision.wrapping_add(1);
    }
}
impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("pending", &self.pending.len())
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}
