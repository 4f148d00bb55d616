//! Terminal rendition of the tile canvas
//!
//! The canvas lives in logical units (a square of `canvas_size`). A
//! `Viewport` maps those units onto a terminal rectangle and back, so mouse
//! cells become canvas points and tile boxes become cell ranges.

use std::time::{Duration, Instant};

use madlib_core::{FontFamily, GlyphMetrics, HexColor, Painter, TextMetrics};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
};

const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub area: Rect,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(area: Rect, width: f32, height: f32) -> Self {
        Self { area, width, height }
    }

    fn scale_x(&self) -> f32 {
        self.width / self.area.width.max(1) as f32
    }

    fn scale_y(&self) -> f32 {
        self.height / self.area.height.max(1) as f32
    }

    /// Centre of a terminal cell, in canvas units. Cells outside the area map
    /// outside the canvas.
    pub fn to_canvas(&self, column: u16, row: u16) -> (f32, f32) {
        let cx = (column as f32 - self.area.x as f32 + 0.5) * self.scale_x();
        let cy = (row as f32 - self.area.y as f32 + 0.5) * self.scale_y();
        (cx, cy)
    }

    /// Column and row (relative to the area) containing a canvas point
    fn to_cell(&self, x: f32, y: f32) -> (i32, i32) {
        ((x / self.scale_x()).floor() as i32, (y / self.scale_y()).floor() as i32)
    }

    /// Cells covered by a canvas rectangle, clipped to the area
    pub fn cell_rect(&self, x: f32, y: f32, width: f32, height: f32) -> Option<Rect> {
        let (x0, y0) = self.to_cell(x, y);
        let x1 = ((x + width) / self.scale_x()).ceil() as i32;
        let y1 = ((y + height) / self.scale_y()).ceil() as i32;

        let x0 = x0.clamp(0, self.area.width as i32);
        let y0 = y0.clamp(0, self.area.height as i32);
        let x1 = x1.clamp(0, self.area.width as i32);
        let y1 = y1.clamp(0, self.area.height as i32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        Some(Rect::new(
            self.area.x + x0 as u16,
            self.area.y + y0 as u16,
            (x1 - x0) as u16,
            (y1 - y0) as u16,
        ))
    }
}

/// Largest rectangle inside `area` that shows a square canvas, assuming
/// terminal cells are twice as tall as they are wide
pub fn fit_square(area: Rect) -> Rect {
    let width = area.width.min(area.height.saturating_mul(2));
    let height = (width / 2).min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

pub fn terminal_color(color: &HexColor) -> Color {
    let (r, g, b) = color.rgb();
    Color::Rgb(r, g, b)
}

/// Paints the canvas into a ratatui buffer
pub struct CellPainter<'a> {
    buf: &'a mut Buffer,
    viewport: Viewport,
}

impl<'a> CellPainter<'a> {
    pub fn new(buf: &'a mut Buffer, viewport: Viewport) -> Self {
        Self { buf, viewport }
    }
}

impl TextMetrics for CellPainter<'_> {
    fn text_width(&self, text: &str, size: f32, family: FontFamily) -> f32 {
        GlyphMetrics.text_width(text, size, family)
    }
}

impl Painter for CellPainter<'_> {
    fn clear(&mut self, color: &HexColor) {
        self.buf
            .set_style(self.viewport.area, Style::default().bg(terminal_color(color)));
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: &HexColor) {
        if let Some(rect) = self.viewport.cell_rect(x, y, width, height) {
            self.buf.set_style(rect, Style::default().bg(terminal_color(color)));
        }
    }

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: &HexColor, _weight: f32) {
        let Some(rect) = self.viewport.cell_rect(x, y, width, height) else {
            return;
        };
        let style = Style::default().fg(terminal_color(color));
        let right = rect.x + rect.width - 1;
        let bottom = rect.y + rect.height - 1;

        for col in rect.x..=right {
            self.buf.set_string(col, rect.y, "▔", style);
            self.buf.set_string(col, bottom, "▁", style);
        }
        for row in rect.y..=bottom {
            self.buf.set_string(rect.x, row, "▏", style);
            self.buf.set_string(right, row, "▕", style);
        }
    }

    fn draw_text(
        &mut self,
        text: &str,
        cx: f32,
        cy: f32,
        _size: f32,
        family: FontFamily,
        color: &HexColor,
    ) {
        let area = self.viewport.area;
        let (col, row) = self.viewport.to_cell(cx, cy);
        if row < 0 || row >= area.height as i32 {
            return;
        }

        let len = text.chars().count() as i32;
        let start = (col - len / 2).max(0);
        if start >= area.width as i32 {
            return;
        }
        let room = (area.width as i32 - start) as usize;

        let mut style = Style::default().fg(terminal_color(color));
        if family == FontFamily::Serif {
            style = style.add_modifier(Modifier::ITALIC);
        }
        self.buf.set_stringn(
            area.x + start as u16,
            area.y + row as u16,
            text,
            room,
            style,
        );
    }
}

/// Turns consecutive left clicks on the same cell into double clicks
#[derive(Debug, Default)]
pub struct ClickTracker {
    last: Option<(u16, u16, Instant)>,
}

impl ClickTracker {
    /// Record a click; true when it completes a double click
    pub fn register(&mut self, column: u16, row: u16, now: Instant) -> bool {
        let double = matches!(
            self.last,
            Some((c, r, at)) if c == column && r == row && now.duration_since(at) <= DOUBLE_CLICK_WINDOW
        );
        // A completed double click does not start another
        self.last = if double { None } else { Some((column, row, now)) };
        double
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        // 80x40 cells showing a 400x400 canvas: 5 units per column, 10 per row
        Viewport::new(Rect::new(10, 5, 80, 40), 400.0, 400.0)
    }

    #[test]
    fn test_cell_to_canvas() {
        let v = viewport();
        assert_eq!(v.to_canvas(10, 5), (2.5, 5.0));
        assert_eq!(v.to_canvas(89, 44), (397.5, 395.0));
        let (x, y) = v.to_canvas(2, 1);
        assert!(x < 0.0 && y < 0.0);
    }

    #[test]
    fn test_cell_rect_clips() {
        let v = viewport();
        assert_eq!(v.cell_rect(50.0, 100.0, 50.0, 40.0), Some(Rect::new(20, 15, 10, 4)));
        assert_eq!(v.cell_rect(390.0, 390.0, 100.0, 100.0), Some(Rect::new(88, 44, 2, 1)));
        assert_eq!(v.cell_rect(500.0, 0.0, 10.0, 10.0), None);
    }

    #[test]
    fn test_fit_square() {
        assert_eq!(fit_square(Rect::new(0, 0, 100, 30)), Rect::new(20, 0, 60, 30));
        assert_eq!(fit_square(Rect::new(0, 0, 40, 30)), Rect::new(0, 5, 40, 20));
    }

    #[test]
    fn test_double_click_detection() {
        let mut clicks = ClickTracker::default();
        let t0 = Instant::now();
        assert!(!clicks.register(3, 4, t0));
        assert!(clicks.register(3, 4, t0 + Duration::from_millis(200)));
        // Third click starts over
        assert!(!clicks.register(3, 4, t0 + Duration::from_millis(300)));
        // Too slow
        assert!(!clicks.register(3, 4, t0 + Duration::from_millis(900)));
        // Different cell
        assert!(!clicks.register(4, 4, t0 + Duration::from_millis(950)));
    }

    #[test]
    fn test_painter_fills_background() {
        let v = Viewport::new(Rect::new(0, 0, 4, 2), 40.0, 40.0);
        let mut buf = Buffer::empty(Rect::new(0, 0, 4, 2));
        let mut painter = CellPainter::new(&mut buf, v);
        painter.clear(&HexColor::parse("#102030").unwrap());
        assert_eq!(buf[(3, 1)].bg, Color::Rgb(0x10, 0x20, 0x30));
    }
}
