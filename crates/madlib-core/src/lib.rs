pub mod ai;
pub mod canvas;
pub mod color;
pub mod config;
pub mod conversation;
pub mod export;
pub mod paint;
pub mod palette;
pub mod role;
pub mod state;
pub mod suggest;
pub mod transcript;

// Re-export main types for convenience
pub use ai::{GenerateError, GenerateOptions, GenerateRequest, Generator, OllamaClient};
pub use canvas::{
    Canvas, CanvasEvent, CanvasState, EditorView, FontFamily, FontSize, StyleEdit, Tile, TileId,
};
pub use color::{sanitize_color_response, ColorInput, HexColor};
pub use config::Config;
pub use conversation::{Conversation, InputGate, SubmitError};
pub use export::ExportError;
pub use paint::{GlyphMetrics, Painter, RasterPainter, TextMetrics};
pub use palette::{parse_word_list, Palette, PaletteEntry};
pub use role::{ModelRole, ModelSet};
pub use state::{Speaker, Turn};
pub use transcript::{reconstruct_story, Entry, Transcript};
