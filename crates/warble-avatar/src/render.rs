use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};
use rand::Rng;
use thiserror::Error;

use crate::glyphs::{GLYPH_HEIGHT, GLYPH_WIDTH, glyph_for, is_set};

pub const DEFAULT_SIZE: u32 = 100;

/// Pixels per glyph cell; a 7-row glyph comes out 49px tall on any canvas.
pub const GLYPH_SCALE: u32 = 7;

/// Largest edge we are willing to allocate for.
pub const MAX_DIMENSION: u32 = 1024;

/// Red, blue, green, yellow, orange.
pub const PALETTE: [[u8; 3]; 5] = [
    [0xFF, 0x00, 0x00],
    [0x00, 0x00, 0xFF],
    [0x00, 0x80, 0x00],
    [0xFF, 0xFF, 0x00],
    [0xFF, 0xA5, 0x00],
];

const FOREGROUND: Rgb<u8> = Rgb([0xFF, 0xFF, 0xFF]);

#[derive(Error, Debug)]
pub enum AvatarError {
    #[error("invalid avatar dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// How the background colour is picked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaletteMode {
    /// Fresh random draw on every render; the same letter may change colour.
    #[default]
    Random,
    /// Palette index derived from the uppercased letter, stable across renders.
    ByLetter,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AvatarGenerator {
    mode: PaletteMode,
}

impl AvatarGenerator {
    pub fn new(mode: PaletteMode) -> Self {
        Self { mode }
    }

    /// Render a `DEFAULT_SIZE` square avatar.
    pub fn generate_default(&self, letter: char) -> Result<Vec<u8>, AvatarError> {
        self.generate(letter, DEFAULT_SIZE, DEFAULT_SIZE)
    }

    /// Render `letter` uppercased and centred on a palette background.
    /// Returns PNG bytes.
    pub fn generate(&self, letter: char, width: u32, height: u32) -> Result<Vec<u8>, AvatarError> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(AvatarError::InvalidDimensions { width, height });
        }

        let letter = letter.to_uppercase().next().unwrap_or(letter);
        let background = Rgb(PALETTE[self.palette_index(letter)]);
        let mut img = RgbImage::from_pixel(width, height, background);

        let scale = GLYPH_SCALE;
        let glyph_w = GLYPH_WIDTH * scale;
        let glyph_h = GLYPH_HEIGHT * scale;
        let origin_x = width.saturating_sub(glyph_w) / 2;
        let origin_y = height.saturating_sub(glyph_h) / 2;

        let glyph = glyph_for(letter);
        for y in origin_y..(origin_y + glyph_h).min(height) {
            for x in origin_x..(origin_x + glyph_w).min(width) {
                if is_set(glyph, (x - origin_x) / scale, (y - origin_y) / scale) {
                    img.put_pixel(x, y, FOREGROUND);
                }
            }
        }

        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }

    fn palette_index(&self, letter: char) -> usize {
        match self.mode {
            PaletteMode::Random => rand::rng().random_range(0..PALETTE.len()),
            PaletteMode::ByLetter => letter as usize % PALETTE.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(png: &[u8]) -> RgbImage {
        image::load_from_memory(png).unwrap().to_rgb8()
    }

    #[test]
    fn default_size_is_100_square() {
        let png = AvatarGenerator::default().generate('a', 100, 100).unwrap();
        assert!(!png.is_empty());

        let img = decode(&png);
        assert_eq!(img.dimensions(), (100, 100));
    }

    #[test]
    fn honours_non_square_dimensions() {
        let png = AvatarGenerator::default().generate('q', 64, 32).unwrap();
        assert_eq!(decode(&png).dimensions(), (64, 32));
    }

    #[test]
    fn letter_is_white_on_palette_background() {
        let png = AvatarGenerator::new(PaletteMode::ByLetter)
            .generate_default('a')
            .unwrap();
        let img = decode(&png);

        // 'A' is code point 65 -> index 0 (red)
        assert_eq!(img.get_pixel(0, 0), &Rgb(PALETTE[0]));
        // Crossbar of the A runs through the centre
        assert_eq!(img.get_pixel(50, 50), &FOREGROUND);
    }

    #[test]
    fn by_letter_is_stable() {
        let avatars = AvatarGenerator::new(PaletteMode::ByLetter);
        let first = avatars.generate_default('m').unwrap();
        let second = avatars.generate_default('M').unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn random_background_stays_in_palette() {
        let avatars = AvatarGenerator::new(PaletteMode::Random);
        for _ in 0..20 {
            let img = decode(&avatars.generate('z', 20, 20).unwrap());
            assert!(PALETTE.iter().any(|c| img.get_pixel(0, 0) == &Rgb(*c)));
        }
    }

    fn white_pixels(img: &RgbImage) -> usize {
        img.pixels().filter(|p| **p == FOREGROUND).count()
    }

    #[test]
    fn glyph_size_is_independent_of_canvas() {
        let avatars = AvatarGenerator::new(PaletteMode::ByLetter);
        let small = decode(&avatars.generate('H', 100, 100).unwrap());
        let large = decode(&avatars.generate('H', 400, 400).unwrap());

        // 'H' sets 17 of its 35 cells
        let expected = 17 * (GLYPH_SCALE * GLYPH_SCALE) as usize;
        assert_eq!(white_pixels(&small), expected);
        assert_eq!(white_pixels(&large), expected);
    }

    #[test]
    fn tiny_canvas_clips_glyph() {
        let png = AvatarGenerator::default().generate('W', 3, 3).unwrap();
        assert_eq!(decode(&png).dimensions(), (3, 3));
    }

    #[test]
    fn rejects_bad_dimensions() {
        let avatars = AvatarGenerator::default();
        assert!(matches!(
            avatars.generate('a', 0, 100),
            Err(AvatarError::InvalidDimensions { width: 0, height: 100 })
        ));
        assert!(avatars.generate('a', 100, MAX_DIMENSION + 1).is_err());
    }
}
