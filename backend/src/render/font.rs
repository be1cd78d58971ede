//! Font loading with graceful fallback.
//!
//! A field asks for a TrueType/OpenType file at a pixel size. When that file
//! cannot be read or parsed the configured default font is tried, and when that
//! fails too the built-in 8x8 bitmap font is scaled to the same size. Loading a
//! font therefore never fails; it only degrades.

use ab_glyph::{Font, FontVec, PxScale};
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use log::warn;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FontError {
    #[error("cannot read font file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not a usable font: {source}")]
    Invalid {
        path: String,
        #[source]
        source: ab_glyph::InvalidFont,
    },
}

/// A font ready to measure and draw text at one size.
pub enum LoadedFont {
    TrueType { font: FontVec, scale: PxScale },
    Bitmap(BitmapFont),
}

impl LoadedFont {
    /// Resolves the font for a field: `requested`, then `fallback`, then the bitmap font.
    pub fn resolve(requested: Option<&str>, size: f32, fallback: Option<&Path>) -> Self {
        if let Some(path) = requested {
            match Self::load_truetype(Path::new(path), size) {
                Ok(font) => return font,
                Err(e) => warn!("{e}; using the default font at size {size}"),
            }
        }
        if let Some(path) = fallback {
            match Self::load_truetype(path, size) {
                Ok(font) => return font,
                Err(e) => warn!("Default font unavailable ({e}); using the built-in bitmap font"),
            }
        }
        LoadedFont::Bitmap(BitmapFont::new(size))
    }

    /// Loads a TrueType/OpenType font so that `size` pixels correspond to one em.
    pub fn load_truetype(path: &Path, size: f32) -> Result<Self, FontError> {
        let display = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|source| FontError::Read {
            path: display.clone(),
            source,
        })?;
        let font = FontVec::try_from_vec(bytes).map_err(|source| FontError::Invalid {
            path: display,
            source,
        })?;
        let units_per_em = font.units_per_em().unwrap_or(1000.0);
        let scale = PxScale::from(size * font.height_unscaled() / units_per_em);
        Ok(LoadedFont::TrueType { font, scale })
    }

    /// Width in pixels of the bounding box of `text` when drawn with this font.
    pub fn text_width(&self, text: &str) -> u32 {
        match self {
            LoadedFont::TrueType { font, scale } => text_size(*scale, font, text).0,
            LoadedFont::Bitmap(bitmap) => bitmap.text_width(text),
        }
    }

    /// Draws `text` with its top-left corner at `(x, y)`. Pixels outside the canvas are clipped.
    pub fn draw(&self, canvas: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, text: &str) {
        match self {
            LoadedFont::TrueType { font, scale } => draw_text_mut(canvas, color, x, y, *scale, font, text),
            LoadedFont::Bitmap(bitmap) => bitmap.draw(canvas, x, y, color, text),
        }
    }

    pub fn is_bitmap(&self) -> bool {
        matches!(self, LoadedFont::Bitmap(_))
    }
}

/// The built-in fallback: font8x8 glyphs scaled to square cells of `cell` pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapFont {
    cell: u32,
}

impl BitmapFont {
    pub fn new(size: f32) -> Self {
        let cell = if size.is_finite() { size.round().max(1.0) as u32 } else { 1 };
        Self { cell }
    }

    pub fn cell_size(&self) -> u32 {
        self.cell
    }

    /// Saturates at `u32::MAX` instead of overflowing.
    pub fn text_width(&self, text: &str) -> u32 {
        let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
        chars.saturating_mul(self.cell_size())
    }

    fn glyph(c: char) -> [u8; 8] {
        BASIC_FONTS
            .get(c)
            .or_else(|| LATIN_FONTS.get(c))
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8])
    }

    /// Only the cells that intersect the canvas are visited.
    pub fn draw(&self, canvas: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, text: &str) {
        let (width, height) = (i64::from(canvas.width()), i64::from(canvas.height()));
        let cell = i64::from(self.cell);
        let top = i64::from(y);
        let rows = (-top).max(0)..(height - top).min(cell);
        if rows.is_empty() {
            return;
        }
        for (index, c) in text.chars().enumerate() {
            let left = i64::from(x).saturating_add((index as i64).saturating_mul(cell));
            if left >= width {
                break;
            }
            let cols = (-left).max(0)..(width - left).min(cell);
            if cols.is_empty() {
                continue;
            }
            let glyph = Self::glyph(c);
            for py in rows.clone() {
                // Row bytes are top to bottom; bit n of a row is column n from the left.
                let row = glyph[(py * 8 / cell) as usize];
                if row == 0 {
                    continue;
                }
                for px in cols.clone() {
                    if row & (1 << (px * 8 / cell)) != 0 {
                        canvas.put_pixel((left + px) as u32, (top + py) as u32, color);
                    }
                }
            }
        }
    }
}
