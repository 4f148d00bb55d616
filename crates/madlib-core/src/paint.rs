//! Drawing surfaces for the tile canvas
//!
//! The canvas never touches pixels or terminal cells directly. It measures
//! text through `TextMetrics` and draws through a `Painter`; the PNG export
//! uses `RasterPainter` and the terminal front end supplies its own.

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgba, RgbaImage};

use crate::canvas::FontFamily;
use crate::color::HexColor;

const SANS_ADVANCE: f32 = 0.55;
const SERIF_ADVANCE: f32 = 0.6;

pub trait TextMetrics {
    /// Width of `text` set at `size` in `family`, in canvas units
    fn text_width(&self, text: &str, size: f32, family: FontFamily) -> f32;
}

/// Fixed-advance metrics shared by every painter in the crate
#[derive(Debug, Clone, Copy, Default)]
pub struct GlyphMetrics;

impl GlyphMetrics {
    pub fn advance(size: f32, family: FontFamily) -> f32 {
        match family {
            FontFamily::SansSerif => size * SANS_ADVANCE,
            FontFamily::Serif => size * SERIF_ADVANCE,
        }
    }
}

impl TextMetrics for GlyphMetrics {
    fn text_width(&self, text: &str, size: f32, family: FontFamily) -> f32 {
        text.chars().count() as f32 * Self::advance(size, family)
    }
}

pub trait Painter: TextMetrics {
    fn clear(&mut self, color: &HexColor);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: &HexColor);
    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: &HexColor, weight: f32);
    /// Draw `text` centred on (`cx`, `cy`)
    fn draw_text(
        &mut self,
        text: &str,
        cx: f32,
        cy: f32,
        size: f32,
        family: FontFamily,
        color: &HexColor,
    );
}

/// Paints into an RGBA image using scaled 8x8 bitmap glyphs
pub struct RasterPainter {
    image: RgbaImage,
}

fn rgba(color: &HexColor) -> Rgba<u8> {
    let (r, g, b) = color.rgb();
    Rgba([r, g, b, 255])
}

impl RasterPainter {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width.max(1), height.max(1)),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    fn put(&mut self, x: i64, y: i64, pixel: Rgba<u8>) {
        if x >= 0 && y >= 0 && (x as u32) < self.image.width() && (y as u32) < self.image.height() {
            self.image.put_pixel(x as u32, y as u32, pixel);
        }
    }

    fn fill_px(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, pixel: Rgba<u8>) {
        for y in y0..y1 {
            for x in x0..x1 {
                self.put(x, y, pixel);
            }
        }
    }
}

impl TextMetrics for RasterPainter {
    fn text_width(&self, text: &str, size: f32, family: FontFamily) -> f32 {
        GlyphMetrics.text_width(text, size, family)
    }
}

impl Painter for RasterPainter {
    fn clear(&mut self, color: &HexColor) {
        let pixel = rgba(color);
        for p in self.image.pixels_mut() {
            *p = pixel;
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: &HexColor) {
        let pixel = rgba(color);
        self.fill_px(
            x.round() as i64,
            y.round() as i64,
            (x + width).round() as i64,
            (y + height).round() as i64,
            pixel,
        );
    }

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: &HexColor, weight: f32) {
        let pixel = rgba(color);
        let w = weight.max(1.0).round() as i64;
        let (x0, y0) = (x.round() as i64, y.round() as i64);
        let (x1, y1) = ((x + width).round() as i64, (y + height).round() as i64);
        self.fill_px(x0, y0, x1, y0 + w, pixel);
        self.fill_px(x0, y1 - w, x1, y1, pixel);
        self.fill_px(x0, y0, x0 + w, y1, pixel);
        self.fill_px(x1 - w, y0, x1, y1, pixel);
    }

    fn draw_text(
        &mut self,
        text: &str,
        cx: f32,
        cy: f32,
        size: f32,
        family: FontFamily,
        color: &HexColor,
    ) {
        let pixel = rgba(color);
        let advance = GlyphMetrics::advance(size, family);
        let total = self.text_width(text, size, family);
        let left = cx - total / 2.0;
        let top = cy - size / 2.0;
        let cell_w = advance / 8.0;
        let cell_h = size / 8.0;

        for (i, ch) in text.chars().enumerate() {
            // Glyphs outside the basic set render as blanks
            let Some(glyph) = BASIC_FONTS.get(ch) else {
                continue;
            };
            let gx = left + i as f32 * advance;
            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..8 {
                    if bits & (1 << col) == 0 {
                        continue;
                    }
                    let px = gx + col as f32 * cell_w;
                    let py = top + row as f32 * cell_h;
                    self.fill_px(
                        px.floor() as i64,
                        py.floor() as i64,
                        (px + cell_w).ceil() as i64,
                        (py + cell_h).ceil() as i64,
                        pixel,
                    );
                }
            }
        }
    }
}
