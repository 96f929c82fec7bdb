//! Flood fill.

use crate::{color::Color, coord::Coordinate, raster::Raster};

/// Replace the 4-connected region of same-colored cells around `seed` with `color`.
///
/// The region is read from the raster as it will look after the next flush, so a fill issued right
/// after a stroke in the same frame sees that stroke. Returns the number of cells queued, which is
/// exactly the area of the region, or zero if the seed is out of range or already `color`.
///
/// The traversal uses an explicit stack and runs to completion synchronously.
pub fn flood_fill(raster: &mut Raster, seed: Coordinate, color: Color) -> usize {
    let Ok(target) = raster.effective(seed) else {
        return 0;
    };
    if target == color {
        return 0;
    }

    let mut visited = hashbrown::HashSet::<Coordinate>::new();
    let mut stack = vec![seed];
    let mut written = 0;
    while let Some(coord) = stack.pop() {
        if visited.contains(&coord) {
            continue;
        }
        // Out of range reads fail, so this also rejects the edges.
        if raster.effective(coord) != Ok(target) {
            continue;
        }
        visited.insert(coord);
        raster.queue_edit(coord, color);
        written += 1;
        stack.extend(coord.neighbors4());
    }
    log::trace!("filled {written} cells from {seed}");
    written
}
