//! Tile canvas: positioned word tiles, pointer selection and dragging, and
//! per-tile style edits.
//!
//! Selection is held as an optional `TileId` rather than an index, so removing
//! tiles never leaves a stale selection pointing at the wrong tile.

use crate::color::HexColor;
use crate::paint::{Painter, TextMetrics};

const TILE_PADDING: f32 = 20.0;
const LINE_HEIGHT: f32 = 1.2;
const SELECTION_STROKE: &str = "#ff3b5b";
const SELECTION_WEIGHT: f32 = 2.0;
pub const DEFAULT_BACKGROUND: &str = "#e6e6e6";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontSize {
    XS,
    S,
    #[default]
    M,
    L,
    XL,
}

impl FontSize {
    pub fn points(&self) -> f32 {
        match self {
            FontSize::XS => 8.0,
            FontSize::S => 12.0,
            FontSize::M => 16.0,
            FontSize::L => 20.0,
            FontSize::XL => 24.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FontSize::XS => "XS",
            FontSize::S => "S",
            FontSize::M => "M",
            FontSize::L => "L",
            FontSize::XL => "XL",
        }
    }

    pub fn all() -> [FontSize; 5] {
        [FontSize::XS, FontSize::S, FontSize::M, FontSize::L, FontSize::XL]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontFamily {
    Serif,
    #[default]
    SansSerif,
}

impl FontFamily {
    pub fn toggle(self) -> Self {
        match self {
            FontFamily::Serif => FontFamily::SansSerif,
            FontFamily::SansSerif => FontFamily::Serif,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FontFamily::Serif => "Serif",
            FontFamily::SansSerif => "Sans-serif",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub id: TileId,
    pub text: String,
    pub x: f32,
    pub y: f32,
    /// Derived from text metrics on every layout pass
    pub width: f32,
    pub height: f32,
    pub foreground: HexColor,
    pub background: HexColor,
    pub size: FontSize,
    pub family: FontFamily,
}

impl Tile {
    /// Recompute width and height from the current text and font
    pub fn layout(&mut self, metrics: &impl TextMetrics) {
        let size = self.size.points();
        self.width = metrics.text_width(&self.text, size, self.family) + TILE_PADDING;
        self.height = size * LINE_HEIGHT + TILE_PADDING;
    }

    /// Strict interior containment, edges excluded
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x > self.x && x < self.x + self.width && y > self.y && y < self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasState {
    Idle,
    Selected(TileId),
    Dragging(TileId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasEvent {
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp,
    DoubleClick { x: f32, y: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum StyleEdit {
    Foreground(HexColor),
    Background(HexColor),
    Size(FontSize),
    ToggleFamily,
}

/// Snapshot of the active tile's style for the editor panel
#[derive(Debug, Clone, PartialEq)]
pub struct EditorView {
    pub foreground: HexColor,
    pub background: HexColor,
    pub size: FontSize,
    pub family: FontFamily,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragOffset {
    dx: f32,
    dy: f32,
}

pub struct Canvas {
    width: f32,
    height: f32,
    background: HexColor,
    tiles: Vec<Tile>,
    active: Option<TileId>,
    drag: Option<DragOffset>,
    next_id: u64,
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            background: HexColor::parse(DEFAULT_BACKGROUND).unwrap_or_else(HexColor::fallback),
            tiles: Vec::new(),
            active: None,
            drag: None,
            next_id: 1,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn background(&self) -> &HexColor {
        &self.background
    }

    pub fn set_background(&mut self, color: HexColor) {
        self.background = color;
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.id == id)
    }

    fn tile_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.tiles.iter_mut().find(|t| t.id == id)
    }

    pub fn active(&self) -> Option<TileId> {
        self.active
    }

    pub fn active_tile(&self) -> Option<&Tile> {
        self.active.and_then(|id| self.tile(id))
    }

    pub fn state(&self) -> CanvasState {
        match (self.active, self.drag) {
            (None, _) => CanvasState::Idle,
            (Some(id), Some(_)) => CanvasState::Dragging(id),
            (Some(id), None) => CanvasState::Selected(id),
        }
    }

    /// Place a new tile for `text` near the centre and return its handle
    pub fn add_tile(&mut self, text: &str) -> TileId {
        let id = TileId(self.next_id);
        self.next_id += 1;

        self.tiles.push(Tile {
            id,
            text: text.to_string(),
            x: self.width / 2.0 - 50.0,
            y: self.height / 2.0 - 10.0,
            width: 0.0,
            height: 0.0,
            background: HexColor::parse("#000").unwrap_or_else(HexColor::fallback),
            foreground: HexColor::parse("#fff").unwrap_or_else(HexColor::fallback),
            size: FontSize::default(),
            family: FontFamily::default(),
        });
        id
    }

    pub fn remove_tile(&mut self, id: TileId) -> Option<Tile> {
        let idx = self.tiles.iter().position(|t| t.id == id)?;
        if self.active == Some(id) {
            self.clear_selection();
        }
        Some(self.tiles.remove(idx))
    }

    pub fn clear_selection(&mut self) {
        self.active = None;
        self.drag = None;
    }

    /// Recompute every tile's box from its current text and font
    pub fn layout(&mut self, metrics: &impl TextMetrics) {
        for tile in &mut self.tiles {
            tile.layout(metrics);
        }
    }

    fn in_bounds(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && x <= self.width && y >= 0.0 && y <= self.height
    }

    /// Topmost tile under the point, scanning from last to first
    pub fn hit_test(&self, x: f32, y: f32) -> Option<TileId> {
        self.tiles.iter().rev().find(|t| t.contains(x, y)).map(|t| t.id)
    }

    pub fn dispatch(&mut self, event: CanvasEvent, metrics: &impl TextMetrics) -> CanvasState {
        match event {
            CanvasEvent::PointerDown { x, y } => self.pointer_down(x, y, metrics),
            CanvasEvent::PointerMove { x, y } => self.pointer_move(x, y),
            CanvasEvent::PointerUp => self.pointer_up(),
            CanvasEvent::DoubleClick { x, y } => self.double_click(x, y, metrics),
        }
        self.state()
    }

    fn pointer_down(&mut self, x: f32, y: f32, metrics: &impl TextMetrics) {
        if !self.in_bounds(x, y) {
            return;
        }

        self.layout(metrics);

        let hit = self.hit_test(x, y).and_then(|id| self.tile(id)).map(|tile| {
            let offset = DragOffset {
                dx: x - tile.x,
                dy: y - tile.y,
            };
            (tile.id, offset)
        });

        match hit {
            Some((id, offset)) => {
                self.active = Some(id);
                self.drag = Some(offset);
            }
            None => self.clear_selection(),
        }
    }

    fn pointer_move(&mut self, x: f32, y: f32) {
        let (Some(id), Some(offset)) = (self.active, self.drag) else {
            return;
        };
        let (canvas_w, canvas_h) = (self.width, self.height);
        if let Some(tile) = self.tile_mut(id) {
            // Keep the whole box on the canvas
            tile.x = (x - offset.dx).min(canvas_w - tile.width).max(0.0);
            tile.y = (y - offset.dy).min(canvas_h - tile.height).max(0.0);
        }
    }

    fn pointer_up(&mut self) {
        self.drag = None;
    }

    /// Clears selection when the double click lands on empty canvas
    fn double_click(&mut self, x: f32, y: f32, metrics: &impl TextMetrics) {
        if !self.in_bounds(x, y) {
            return;
        }
        self.layout(metrics);
        if self.hit_test(x, y).is_none() {
            self.clear_selection();
        }
    }

    /// Apply a style change to the active tile. Returns false when nothing is
    /// selected.
    pub fn apply_style(&mut self, edit: StyleEdit) -> bool {
        let Some(id) = self.active else {
            return false;
        };
        self.apply_style_to(id, edit)
    }

    /// Apply a style change to a specific tile, selected or not
    pub fn apply_style_to(&mut self, id: TileId, edit: StyleEdit) -> bool {
        let Some(tile) = self.tile_mut(id) else {
            return false;
        };
        match edit {
            StyleEdit::Foreground(color) => tile.foreground = color,
            StyleEdit::Background(color) => tile.background = color,
            StyleEdit::Size(size) => tile.size = size,
            StyleEdit::ToggleFamily => tile.family = tile.family.toggle(),
        }
        true
    }

    pub fn editor(&self) -> Option<EditorView> {
        self.active_tile().map(|tile| EditorView {
            foreground: tile.foreground.clone(),
            background: tile.background.clone(),
            size: tile.size,
            family: tile.family,
        })
    }

    /// One frame: background, then every tile back to front
    pub fn draw<P: Painter>(&mut self, painter: &mut P) {
        self.layout(&*painter);
        painter.clear(&self.background);

        let stroke = HexColor::parse(SELECTION_STROKE).unwrap_or_else(HexColor::fallback);
        for tile in &self.tiles {
            painter.fill_rect(tile.x, tile.y, tile.width, tile.height, &tile.background);
            if self.active == Some(tile.id) {
                painter.stroke_rect(tile.x, tile.y, tile.width, tile.height, &stroke, SELECTION_WEIGHT);
            }
            painter.draw_text(
                &tile.text,
                tile.x + tile.width / 2.0,
                tile.y + tile.height / 2.0,
                tile.size.points(),
                tile.family,
                &tile.foreground,
            );
        }
    }
}
