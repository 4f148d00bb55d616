use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use madlib_core::export::export_canvas;
use madlib_core::suggest::{fetch_color, fetch_words};
use madlib_core::{
    Canvas, ColorInput, Config, Conversation, GenerateError, Generator, HexColor, ModelSet,
    Palette, StyleEdit, SubmitError, TileId,
};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::canvas_view::{ClickTracker, Viewport};
use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Story,
    Poetry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Which text box owns the keyboard while editing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Story,
    Keyword,
    CanvasBackground,
    TileForeground,
    TileBackground,
}

impl Field {
    pub fn title(&self) -> &'static str {
        match self {
            Field::Story => " Your turn ",
            Field::Keyword => " Keyword ",
            Field::CanvasBackground => " Canvas background ",
            Field::TileForeground => " Text color ",
            Field::TileBackground => " Text background ",
        }
    }
}

/// Where a color result lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTarget {
    CanvasBackground,
    Foreground(TileId),
    Background(TileId),
}

/// Result of a background generate task, applied on the event loop
#[derive(Debug)]
pub enum Completion {
    Story(Result<String, GenerateError>),
    Words(Result<Vec<String>, GenerateError>),
    Color { target: ColorTarget, color: HexColor },
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Single-line text box with a character cursor
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    pub text: String,
    pub cursor: usize,
}

impl TextInput {
    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    /// Empty the box and hand back what it held
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }
}

pub struct App {
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub field: Field,

    // Story activity
    pub conversation: Conversation,
    pub story_input: TextInput,
    pub story_scroll: u16,
    story_started: bool,

    // Poetry activity
    pub canvas: Canvas,
    pub palette: Palette,
    pub palette_state: ListState,
    pub keyword_input: TextInput,
    pub color_input: TextInput,
    pub words_pending: bool,
    pub colors_pending: usize,

    /// One-line notice in the footer (exports, refusals)
    pub status: Option<String>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub canvas_area: Option<Rect>,
    pub palette_area: Option<Rect>,
    pub clicks: ClickTracker,

    generator: Arc<dyn Generator>,
    models: ModelSet,
    export_dir: PathBuf,
    events: mpsc::UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(
        config: &Config,
        generator: Arc<dyn Generator>,
        events: mpsc::UnboundedSender<AppEvent>,
        screen: Screen,
    ) -> Self {
        let models = config.models();
        let size = config.canvas_size as f32;

        Self {
            should_quit: false,
            screen,
            input_mode: InputMode::Normal,
            field: Field::Story,
            conversation: Conversation::new(models.clone(), config.max_words),
            story_input: TextInput::default(),
            story_scroll: 0,
            story_started: false,
            canvas: Canvas::new(size, size),
            palette: Palette::new(),
            palette_state: ListState::default(),
            keyword_input: TextInput::default(),
            color_input: TextInput::default(),
            words_pending: false,
            colors_pending: 0,
            status: None,
            animation_frame: 0,
            canvas_area: None,
            palette_area: None,
            clicks: ClickTracker::default(),
            generator,
            models,
            export_dir: config.export_dir(),
            events,
        }
    }

    fn spawn_completion<F>(&self, task: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let tx = self.events.clone();
        tokio::spawn(async move {
            let completion = task.await;
            // Receiver gone means the app is shutting down
            let _ = tx.send(AppEvent::Generated(completion));
        });
    }

    /// Seed the story with the model's opening turn, once per session
    pub fn start_story(&mut self) {
        if self.story_started {
            return;
        }
        self.story_started = true;
        let request = self.conversation.initial_turn();
        let generator = self.generator.clone();
        self.spawn_completion(async move {
            Completion::Story(generator.generate(&request).await)
        });
    }

    pub fn submit_story(&mut self) {
        match self.conversation.submit_turn(&self.story_input.text) {
            Ok(request) => {
                self.story_input.take();
                self.input_mode = InputMode::Normal;
                self.status = None;
                let generator = self.generator.clone();
                self.spawn_completion(async move {
                    Completion::Story(generator.generate(&request).await)
                });
            }
            Err(SubmitError::Empty) => {}
            Err(e) => {
                debug!(error = %e, "story turn refused");
                self.status = Some(e.to_string());
            }
        }
    }

    /// Fetch words seeded by whatever is in the keyword box
    pub fn request_words(&mut self) {
        let keyword = self.keyword_input.take();
        self.input_mode = InputMode::Normal;
        self.words_pending = true;

        let generator = self.generator.clone();
        let models = self.models.clone();
        self.spawn_completion(async move {
            let keyword = Some(keyword.as_str());
            Completion::Words(fetch_words(generator.as_ref(), &models, keyword).await)
        });
    }

    /// Submit the color box for the field being edited
    pub fn submit_color(&mut self) {
        let text = self.color_input.take();
        self.input_mode = InputMode::Normal;

        let target = match self.field {
            Field::CanvasBackground => ColorTarget::CanvasBackground,
            Field::TileForeground | Field::TileBackground => {
                let Some(id) = self.canvas.active() else {
                    self.status = Some("Select a tile first".to_string());
                    return;
                };
                if self.field == Field::TileForeground {
                    ColorTarget::Foreground(id)
                } else {
                    ColorTarget::Background(id)
                }
            }
            Field::Story | Field::Keyword => return,
        };

        self.request_color(target, &text);
    }

    /// Hex literals apply at once; anything else goes to the color model
    pub fn request_color(&mut self, target: ColorTarget, text: &str) {
        match ColorInput::classify(text) {
            None => {}
            Some(ColorInput::Literal(color)) => self.apply_color(target, color),
            Some(ColorInput::Describe(description)) => {
                self.colors_pending += 1;
                let generator = self.generator.clone();
                let models = self.models.clone();
                self.spawn_completion(async move {
                    let color = fetch_color(generator.as_ref(), &models, &description).await;
                    Completion::Color { target, color }
                });
            }
        }
    }

    fn apply_color(&mut self, target: ColorTarget, color: HexColor) {
        let applied = match target {
            ColorTarget::CanvasBackground => {
                self.canvas.set_background(color);
                true
            }
            ColorTarget::Foreground(id) => {
                self.canvas.apply_style_to(id, StyleEdit::Foreground(color))
            }
            ColorTarget::Background(id) => {
                self.canvas.apply_style_to(id, StyleEdit::Background(color))
            }
        };
        if !applied {
            debug!(?target, "color target gone, dropping result");
        }
    }

    pub fn apply_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Story(result) => {
                self.conversation.resolve(result);
                self.scroll_story_to_bottom();
            }
            Completion::Words(result) => {
                self.words_pending = false;
                match result {
                    Ok(words) => {
                        let added = self.palette.extend(words);
                        debug!(added, total = self.palette.len(), "palette extended");
                        if self.palette_state.selected().is_none() && !self.palette.is_empty() {
                            self.palette_state.select(Some(0));
                        }
                    }
                    Err(e) => warn!(error = %e, "word request failed"),
                }
            }
            Completion::Color { target, color } => {
                self.colors_pending = self.colors_pending.saturating_sub(1);
                self.apply_color(target, color);
            }
        }
    }

    pub fn apply_style(&mut self, edit: StyleEdit) {
        if !self.canvas.apply_style(edit) {
            self.status = Some("Select a tile first".to_string());
        }
    }

    pub fn toggle_palette(&mut self, index: usize) {
        self.palette.toggle(index, &mut self.canvas);
    }

    pub fn toggle_selected_word(&mut self) {
        if let Some(index) = self.palette_state.selected() {
            self.toggle_palette(index);
        }
    }

    pub fn palette_nav_down(&mut self) {
        if self.palette.is_empty() {
            return;
        }
        let next = match self.palette_state.selected() {
            Some(i) => (i + 1).min(self.palette.len() - 1),
            None => 0,
        };
        self.palette_state.select(Some(next));
    }

    pub fn palette_nav_up(&mut self) {
        if let Some(i) = self.palette_state.selected() {
            self.palette_state.select(Some(i.saturating_sub(1)));
        }
    }

    /// Export whichever activity is on screen
    pub fn export(&mut self) {
        match self.screen {
            Screen::Story => self.export_story(),
            Screen::Poetry => self.export_canvas(),
        }
    }

    pub fn export_story(&mut self) {
        let result = self.conversation.export_transcript(&self.export_dir, Utc::now());
        self.status = Some(match result {
            Ok(path) => format!("Saved {}", path.display()),
            Err(e) => {
                warn!(error = %e, "story export failed");
                e.to_string()
            }
        });
    }

    pub fn export_canvas(&mut self) {
        let result = export_canvas(&mut self.canvas, &self.export_dir, Utc::now());
        self.status = Some(match result {
            Ok(path) => {
                info!(path = %path.display(), "canvas saved");
                format!("Saved {}", path.display())
            }
            Err(e) => {
                warn!(error = %e, "canvas export failed");
                e.to_string()
            }
        });
    }

    /// Open a text box for editing
    pub fn edit(&mut self, field: Field) {
        if field == Field::Story && self.conversation.gate().is_locked() {
            return;
        }
        if matches!(field, Field::TileForeground | Field::TileBackground)
            && self.canvas.active().is_none()
        {
            self.status = Some("Select a tile first".to_string());
            return;
        }
        self.field = field;
        self.input_mode = InputMode::Editing;
        self.color_input = TextInput::default();
    }

    /// The text box currently owning the keyboard
    pub fn active_input(&mut self) -> &mut TextInput {
        match self.field {
            Field::Story => &mut self.story_input,
            Field::Keyword => &mut self.keyword_input,
            Field::CanvasBackground | Field::TileForeground | Field::TileBackground => {
                &mut self.color_input
            }
        }
    }

    pub fn submit_field(&mut self) {
        match self.field {
            Field::Story => self.submit_story(),
            Field::Keyword => self.request_words(),
            Field::CanvasBackground | Field::TileForeground | Field::TileBackground => {
                self.submit_color()
            }
        }
    }

    pub fn switch_screen(&mut self) {
        self.screen = match self.screen {
            Screen::Story => Screen::Poetry,
            Screen::Poetry => Screen::Story,
        };
        self.input_mode = InputMode::Normal;
        self.status = None;
        if self.screen == Screen::Story {
            self.start_story();
        }
    }

    pub fn canvas_viewport(&self) -> Option<Viewport> {
        self.canvas_area
            .map(|area| Viewport::new(area, self.canvas.width(), self.canvas.height()))
    }

    pub fn is_busy(&self) -> bool {
        self.conversation.is_pending() || self.words_pending || self.colors_pending > 0
    }

    pub fn tick_animation(&mut self) {
        if self.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_story_to_bottom(&mut self) {
        // Rendering clamps the offset to the real content height
        self.story_scroll = u16::MAX;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use madlib_core::{CanvasEvent, GenerateRequest, GlyphMetrics};

    /// Replies with the same text to every request
    pub(crate) struct EchoGenerator(pub &'static str);

    #[async_trait]
    impl Generator for EchoGenerator {
        async fn generate(&self, _request: &GenerateRequest) -> Result<String, GenerateError> {
            Ok(self.0.to_string())
        }
    }

    pub(crate) fn app_with(reply: &'static str) -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut config = Config::new();
        config.export_dir = Some(std::env::temp_dir());
        let app = App::new(&config, Arc::new(EchoGenerator(reply)), tx, Screen::Story);
        (app, rx)
    }

    async fn next_completion(rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> Completion {
        match rx.recv().await {
            Some(AppEvent::Generated(completion)) => completion,
            other => panic!("expected a completion, got {:?}", other),
        }
    }

    fn select_first_tile(app: &mut App) -> TileId {
        let id = app.canvas.tiles()[0].id;
        app.canvas.dispatch(CanvasEvent::PointerDown { x: 160.0, y: 200.0 }, &GlyphMetrics);
        app.canvas.dispatch(CanvasEvent::PointerUp, &GlyphMetrics);
        assert_eq!(app.canvas.active(), Some(id));
        id
    }

    #[test]
    fn test_text_input_editing_is_utf8_safe() {
        let mut input = TextInput::default();
        for c in "añb".chars() {
            input.insert(c);
        }
        input.left();
        input.backspace();
        assert_eq!(input.text, "ab");
        input.home();
        input.delete();
        assert_eq!(input.text, "b");
        input.end();
        input.insert('!');
        assert_eq!(input.take(), "b!");
        assert_eq!(input.cursor, 0);
    }

    #[tokio::test]
    async fn test_story_round_trip_through_channel() {
        let (mut app, mut rx) = app_with("The lamp flickered.");
        app.story_input.text = "A door creaked.".to_string();
        app.submit_story();
        assert!(app.story_input.text.is_empty());
        assert!(app.conversation.is_pending());

        let completion = next_completion(&mut rx).await;
        app.apply_completion(completion);
        assert!(!app.conversation.is_pending());
        assert_eq!(app.conversation.story(), "A door creaked. The lamp flickered.");
    }

    #[tokio::test]
    async fn test_story_starts_once() {
        let (mut app, mut rx) = app_with("It began with a bell.");
        app.start_story();
        app.switch_screen();
        app.switch_screen();
        assert!(app.conversation.is_pending());

        let completion = next_completion(&mut rx).await;
        app.apply_completion(completion);
        assert_eq!(app.conversation.story(), "It began with a bell.");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_second_submit_while_pending_keeps_input() {
        let (mut app, _rx) = app_with("ok");
        app.story_input.text = "one".to_string();
        app.submit_story();
        app.story_input.text = "two".to_string();
        app.submit_story();
        assert_eq!(app.story_input.text, "two");
        assert!(app.status.is_some());
    }

    #[tokio::test]
    async fn test_words_fill_palette_and_select_first() {
        let (mut app, mut rx) = app_with("moon, tide, salt");
        app.keyword_input.text = "sea".to_string();
        app.request_words();
        assert!(app.words_pending);

        let completion = next_completion(&mut rx).await;
        app.apply_completion(completion);
        assert!(!app.words_pending);
        assert_eq!(app.palette.len(), 3);
        assert_eq!(app.palette_state.selected(), Some(0));
        assert!(app.keyword_input.text.is_empty());
    }

    #[test]
    fn test_literal_color_applies_without_request() {
        let (mut app, mut rx) = app_with("unused");
        app.field = Field::CanvasBackground;
        app.color_input.text = "#123".to_string();
        app.submit_color();
        assert_eq!(app.canvas.background().as_str(), "#123");
        assert_eq!(app.colors_pending, 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_described_color_lands_on_requesting_tile() {
        let (mut app, mut rx) = app_with("Try #aa0011 for that");
        app.palette.extend(["ember"]);
        app.toggle_palette(0);
        let id = select_first_tile(&mut app);

        app.field = Field::TileForeground;
        app.color_input.text = "deep red".to_string();
        app.submit_color();
        assert_eq!(app.colors_pending, 1);

        // Selection moves on before the reply arrives
        app.canvas.clear_selection();
        let completion = next_completion(&mut rx).await;
        app.apply_completion(completion);

        assert_eq!(app.colors_pending, 0);
        assert_eq!(app.canvas.tile(id).unwrap().foreground.as_str(), "#aa0011");
    }

    #[tokio::test]
    async fn test_color_for_removed_tile_is_dropped() {
        let (mut app, mut rx) = app_with("#00ff00");
        app.palette.extend(["leaf"]);
        app.toggle_palette(0);
        select_first_tile(&mut app);

        app.field = Field::TileBackground;
        app.color_input.text = "spring".to_string();
        app.submit_color();
        app.toggle_palette(0);

        let completion = next_completion(&mut rx).await;
        app.apply_completion(completion);
        assert!(app.canvas.tiles().is_empty());
    }

    #[test]
    fn test_tile_color_needs_selection() {
        let (mut app, _rx) = app_with("unused");
        app.edit(Field::TileForeground);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.status.as_deref(), Some("Select a tile first"));
    }

    #[test]
    fn test_empty_story_export_shows_notice() {
        let (mut app, _rx) = app_with("unused");
        app.export();
        assert_eq!(app.status.as_deref(), Some("No text to download!"));
    }

    #[test]
    fn test_palette_navigation_bounds() {
        let (mut app, _rx) = app_with("unused");
        app.palette_nav_down();
        assert_eq!(app.palette_state.selected(), None);

        app.palette.extend(["a", "b"]);
        app.palette_nav_down();
        app.palette_nav_down();
        app.palette_nav_down();
        assert_eq!(app.palette_state.selected(), Some(1));
        app.palette_nav_up();
        app.palette_nav_up();
        assert_eq!(app.palette_state.selected(), Some(0));
    }
}
