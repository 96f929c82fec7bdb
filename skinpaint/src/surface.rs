//! Display surfaces for the headless host.

use std::io::Write;

use skinpaint_core::{
    coord::HEIGHT,
    scheduler::{DisplaySurface, SurfaceError},
    Color, Coordinate,
};

/// Draws cells as truecolor ANSI blocks, each `cell_width` columns wide.
pub struct TerminalSurface<W: Write> {
    out: W,
    cell_width: usize,
    cleared: bool,
}
impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, cell_width: usize) -> Self {
        Self {
            out,
            cell_width: cell_width.max(1),
            cleared: false,
        }
    }
    /// Move the cursor below the drawing and reset colors.
    pub fn finish(mut self) -> std::io::Result<W> {
        write!(self.out, "\x1b[{};1H\x1b[0m", HEIGHT + 1)?;
        self.out.flush()?;
        Ok(self.out)
    }
}
impl<W: Write> DisplaySurface for TerminalSurface<W> {
    fn begin_frame(&mut self) -> Result<(), SurfaceError> {
        if !self.cleared {
            self.out.write_all(b"\x1b[2J")?;
            self.cleared = true;
        }
        Ok(())
    }
    fn draw_cell(&mut self, coord: Coordinate, color: Color) -> Result<(), SurfaceError> {
        // Both 1-based.
        let row = coord.y + 1;
        let column = usize::try_from(coord.x).unwrap_or(0) * self.cell_width + 1;
        let [r, g, b] = color.as_array();
        write!(
            self.out,
            "\x1b[{row};{column}H\x1b[48;2;{r};{g};{b}m{:width$}\x1b[0m",
            "",
            width = self.cell_width
        )?;
        Ok(())
    }
    fn end_frame(&mut self) -> Result<(), SurfaceError> {
        self.out.flush()?;
        Ok(())
    }
}

/// Accepts and discards everything.
#[derive(Default)]
pub struct NullSurface;
impl DisplaySurface for NullSurface {
    fn begin_frame(&mut self) -> Result<(), SurfaceError> {
        Ok(())
    }
    fn draw_cell(&mut self, _: Coordinate, _: Color) -> Result<(), SurfaceError> {
        Ok(())
    }
}
