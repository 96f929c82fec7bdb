//! Integer line rasterization between two stroke samples.

use crate::coord::Coordinate;

/// Iterator over the cells of a straight line between two coordinates, inclusive of both ends.
///
/// This is Bresenham's algorithm: integer only, stepping the dominant axis every cell and the minor
/// axis whenever the accumulated error crosses over. Consecutive cells are always 8-adjacent, so a
/// stroke drawn through sparse pointer samples has no gaps.
///
/// Endpoints are not range checked - cells outside the raster are yielded all the same, and it is up
/// to the consumer to ignore them.
#[derive(Clone, Debug)]
pub struct Line {
    // i64 so that the doubled error can't overflow for any pair of i32 endpoints.
    x: i64,
    y: i64,
    end_x: i64,
    end_y: i64,
    /// `|dx|`
    dx: i64,
    /// `-|dy|`
    dy: i64,
    step_x: i64,
    step_y: i64,
    error: i64,
    remaining: usize,
}
impl Line {
    #[must_use]
    pub fn new(from: Coordinate, to: Coordinate) -> Self {
        let (x, y) = (i64::from(from.x), i64::from(from.y));
        let (end_x, end_y) = (i64::from(to.x), i64::from(to.y));
        let dx = (end_x - x).abs();
        let dy = -(end_y - y).abs();
        // Number of cells is the length along the dominant axis, plus the start.
        let remaining = usize::try_from(dx.max(-dy)).map_or(usize::MAX, |len| len.saturating_add(1));
        Self {
            x,
            y,
            end_x,
            end_y,
            dx,
            dy,
            step_x: if x < end_x { 1 } else { -1 },
            step_y: if y < end_y { 1 } else { -1 },
            error: dx + dy,
            remaining,
        }
    }
}
impl Iterator for Line {
    type Item = Coordinate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        // Every intermediate value lies between the two i32 endpoints.
        #[allow(clippy::cast_possible_truncation)]
        let here = Coordinate::new(self.x as i32, self.y as i32);

        if self.x == self.end_x && self.y == self.end_y {
            self.remaining = 0;
            return Some(here);
        }
        let doubled = 2 * self.error;
        if doubled >= self.dy {
            self.error += self.dy;
            self.x += self.step_x;
        }
        if doubled <= self.dx {
            self.error += self.dx;
            self.y += self.step_y;
        }
        Some(here)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
impl ExactSizeIterator for Line {}
impl std::iter::FusedIterator for Line {}

#[cfg(test)]
mod test {
    use super::Line;
    use crate::coord::Coordinate;

    /// Check endpoints, length, and that every step moves at most one cell on each axis.
    fn check_connected(from: Coordinate, to: Coordinate) -> Vec<Coordinate> {
        let points: Vec<_> = Line::new(from, to).collect();
        let expected_len = (to.x - from.x).abs().max((to.y - from.y).abs()) + 1;
        assert_eq!(points.len(), expected_len as usize);
        assert_eq!(points.first(), Some(&from));
        assert_eq!(points.last(), Some(&to));
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert!((a.x - b.x).abs() <= 1 && (a.y - b.y).abs() <= 1, "{a} -> {b} jumps");
            assert_ne!(a, b);
        }
        points
    }

    #[test]
    fn shallow() {
        let points = check_connected(Coordinate::new(0, 0), Coordinate::new(5, 3));
        // Dominant axis is x, so every x appears exactly once.
        let xs: Vec<_> = points.iter().map(|c| c.x).collect();
        assert_eq!(xs, [0, 1, 2, 3, 4, 5]);
    }
    #[test]
    fn all_octants() {
        let center = Coordinate::new(10, 10);
        for (dx, dy) in [
            (7, 2),
            (2, 7),
            (-2, 7),
            (-7, 2),
            (-7, -2),
            (-2, -7),
            (2, -7),
            (7, -2),
            (5, 5),
            (-5, 5),
            (0, 6),
            (6, 0),
            (0, -6),
            (-6, 0),
        ] {
            check_connected(center, Coordinate::new(10 + dx, 10 + dy));
        }
    }
    #[test]
    fn single_point() {
        let c = Coordinate::new(4, 4);
        assert_eq!(Line::new(c, c).collect::<Vec<_>>(), [c]);
    }
    #[test]
    fn exact_size() {
        let mut line = Line::new(Coordinate::new(-3, 1), Coordinate::new(9, 4));
        assert_eq!(line.len(), 13);
        line.next();
        assert_eq!(line.len(), 12);
        assert_eq!(line.by_ref().count(), 12);
        assert_eq!(line.next(), None);
    }
    #[test]
    fn extreme_endpoints() {
        // No overflow, and still terminates exactly at the end.
        let from = Coordinate::new(i32::MAX - 2, i32::MIN);
        let to = Coordinate::new(i32::MAX, i32::MIN + 1);
        check_connected(from, to);
    }
}
