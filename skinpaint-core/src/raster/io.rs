//! PNG encoding and decoding of whole skins.
//!
//! Skins are stored as 8-bit RGBA PNGs of exactly [`WIDTH`]x[`HEIGHT`]. On decode any color type and
//! bit depth is accepted and normalized to 8-bit. Alpha is kept, images without it load opaque.
//! Encoding always writes RGBA8.

use crate::{
    color::Color,
    coord::{CELLS, HEIGHT, WIDTH},
};

use super::OPAQUE;

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("malformed png: {0}")]
    Png(#[from] png::DecodingError),
    #[error("expected a {WIDTH}x{HEIGHT} image, found {width}x{height}")]
    Dimensions { width: u32, height: u32 },
    #[error("unsupported pixel layout {0:?} at {1:?}")]
    Unsupported(png::ColorType, png::BitDepth),
}

#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
    #[error(transparent)]
    Png(#[from] png::EncodingError),
    #[error("expected {expected} bytes of rgba data, found {found}")]
    Length { expected: usize, found: usize },
}

/// Decode a PNG into row-major cells and their alpha.
pub(super) fn decode(encoded: &[u8]) -> Result<(Box<[Color]>, Box<[u8]>), DecodeError> {
    let mut decoder = png::Decoder::new(std::io::Cursor::new(encoded));
    // Palettes, low bit depths, and 16-bit are all brought into 8 bits per channel.
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;

    // Bail before decompressing anything if it's the wrong size.
    let (width, height) = {
        let info = reader.info();
        (info.width, info.height)
    };
    if width != WIDTH || height != HEIGHT {
        return Err(DecodeError::Dimensions { width, height });
    }

    let mut buffer = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buffer)?;
    if frame.bit_depth != png::BitDepth::Eight {
        return Err(DecodeError::Unsupported(frame.color_type, frame.bit_depth));
    }
    let channels = match frame.color_type {
        png::ColorType::Grayscale => 1,
        png::ColorType::GrayscaleAlpha => 2,
        png::ColorType::Rgb => 3,
        png::ColorType::Rgba => 4,
        // Should have been expanded away.
        png::ColorType::Indexed => {
            return Err(DecodeError::Unsupported(frame.color_type, frame.bit_depth))
        }
    };

    let data = &buffer[..frame.buffer_size()];
    let mut cells = Vec::with_capacity(CELLS);
    let mut alpha = Vec::with_capacity(CELLS);
    // Rows may carry padding past the pixel data, walk them by `line_size`.
    for row in data.chunks_exact(frame.line_size).take(HEIGHT as usize) {
        for pixel in row.chunks_exact(channels).take(WIDTH as usize) {
            let (color, a) = match *pixel {
                [luma] => (Color::new(luma, luma, luma), OPAQUE),
                [luma, a] => (Color::new(luma, luma, luma), a),
                [r, g, b] => (Color::new(r, g, b), OPAQUE),
                [r, g, b, a] => (Color::new(r, g, b), a),
                _ => unreachable!("chunks_exact yields {channels} bytes"),
            };
            cells.push(color);
            alpha.push(a);
        }
    }
    if cells.len() != CELLS {
        // Frame was short. Treat it as a size mismatch rather than partially loading.
        return Err(DecodeError::Dimensions { width, height });
    }
    Ok((cells.into_boxed_slice(), alpha.into_boxed_slice()))
}

/// Zip colors and alpha into RGBA8.
pub(super) fn interleave(cells: &[Color], alpha: &[u8]) -> Vec<u8> {
    cells
        .iter()
        .zip(alpha)
        .flat_map(|(color, &a)| color.with_alpha(a))
        .collect()
}

/// Encode row-major cells into an RGBA8 PNG.
pub(super) fn encode(cells: &[Color], alpha: &[u8]) -> Result<Vec<u8>, EncodeError> {
    encode_rgba8(WIDTH, HEIGHT, &interleave(cells, alpha))
}

/// Encode arbitrary RGBA8 data as a PNG.
pub fn encode_rgba8(width: u32, height: u32, rgba: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let expected = (width as usize) * (height as usize) * 4;
    if rgba.len() != expected {
        return Err(EncodeError::Length {
            expected,
            found: rgba.len(),
        });
    }
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgba)?;
        writer.finish()?;
    }
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::{encode_rgba8, DecodeError};
    use crate::{color::Color, coord::Coordinate, raster::Raster};

    /// Encode a test image with the given color type, filled with a single gray value.
    fn make_png(width: u32, height: u32, color: png::ColorType, value: u8) -> Vec<u8> {
        let channels = match color {
            png::ColorType::Grayscale => 1,
            png::ColorType::GrayscaleAlpha => 2,
            png::ColorType::Rgb => 3,
            png::ColorType::Rgba => 4,
            png::ColorType::Indexed => unimplemented!(),
        };
        let data = vec![value; (width * height) as usize * channels];
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(color);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&data).unwrap();
        }
        out
    }

    #[test]
    fn roundtrip() {
        let mut raster = Raster::default();
        // Scatter some distinct colors around.
        for (i, coord) in Coordinate::all().enumerate().step_by(7) {
            #[allow(clippy::cast_possible_truncation)]
            let byte = i as u8;
            raster.queue_edit(coord, Color::new(byte, byte.wrapping_mul(3), !byte));
        }
        raster.flush();

        let encoded = raster.serialize().unwrap();
        let mut loaded = Raster::new(Color::BLACK);
        loaded.load(&encoded).unwrap();
        assert!(Iterator::eq(raster.iter(), loaded.iter()));
        assert_eq!(raster.to_rgba8(), loaded.to_rgba8());
    }
    #[test]
    fn malformed_size_leaves_raster() {
        let mut raster = Raster::default();
        let coord = Coordinate::new(3, 4);
        raster.queue_edit(coord, Color::BLACK);
        raster.flush();
        let revision = raster.revision();

        let small = make_png(32, 32, png::ColorType::Rgba, 0x80);
        assert!(matches!(
            raster.load(&small),
            Err(DecodeError::Dimensions {
                width: 32,
                height: 32
            })
        ));
        assert_eq!(raster.get(coord), Ok(Color::BLACK));
        assert_eq!(raster.get(Coordinate::new(0, 0)), Ok(Color::WHITE));
        assert_eq!(raster.revision(), revision);
    }
    #[test]
    fn garbage_rejected() {
        let mut raster = Raster::default();
        assert!(matches!(
            raster.load(b"definitely not a png"),
            Err(DecodeError::Png(_))
        ));
        assert!(raster.iter().all(|(_, color)| color == Color::WHITE));
    }
    #[test]
    fn other_color_types() {
        let mut raster = Raster::default();
        raster
            .load(&make_png(64, 64, png::ColorType::Grayscale, 0x40))
            .unwrap();
        assert_eq!(raster.get(Coordinate::new(63, 63)), Ok(Color::new(0x40, 0x40, 0x40)));

        raster
            .load(&make_png(64, 64, png::ColorType::Rgb, 0x20))
            .unwrap();
        assert_eq!(raster.get(Coordinate::new(0, 0)), Ok(Color::new(0x20, 0x20, 0x20)));
        assert_eq!(raster.alpha(Coordinate::new(0, 0)), Ok(0xFF));

        raster
            .load(&make_png(64, 64, png::ColorType::GrayscaleAlpha, 0x00))
            .unwrap();
        assert_eq!(raster.get(Coordinate::new(0, 0)), Ok(Color::BLACK));
        assert_eq!(raster.alpha(Coordinate::new(0, 0)), Ok(0x00));
    }
    #[test]
    fn transparency_survives() {
        let mut raster = Raster::default();
        raster
            .load(&make_png(64, 64, png::ColorType::Rgba, 0x00))
            .unwrap();
        let untouched = Coordinate::new(40, 8);
        let painted = Coordinate::new(41, 8);
        // Same color as what's there, but painting still makes it opaque.
        raster.queue_edit(painted, Color::BLACK);
        assert_eq!(raster.flush().len(), 1);
        assert_eq!(raster.alpha(painted), Ok(0xFF));

        let encoded = raster.serialize().unwrap();
        let mut loaded = Raster::default();
        loaded.load(&encoded).unwrap();
        assert_eq!(loaded.alpha(untouched), Ok(0x00));
        assert_eq!(loaded.alpha(painted), Ok(0xFF));
        assert_eq!(loaded.to_rgba8(), raster.to_rgba8());
    }
    #[test]
    fn encode_checks_length() {
        assert!(encode_rgba8(2, 2, &[0; 15]).is_err());
        assert!(encode_rgba8(2, 2, &[0; 16]).is_ok());
    }
}
