use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use madlib_core::{CanvasEvent, FontSize, GlyphMetrics, StyleEdit};
use ratatui::layout::Rect;

use crate::app::{App, Field, InputMode, Screen};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Generated(completion) => app.apply_completion(completion),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                app.should_quit = true;
                return;
            }
            KeyCode::Char('s') => {
                app.export();
                return;
            }
            _ => {}
        }
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Tab => app.switch_screen(),
        _ => match app.screen {
            Screen::Story => handle_story_normal(app, key),
            Screen::Poetry => handle_poetry_normal(app, key),
        },
    }
}

fn handle_story_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') | KeyCode::Enter => app.edit(Field::Story),
        KeyCode::Char('j') | KeyCode::Down => {
            app.story_scroll = app.story_scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.story_scroll = app.story_scroll.saturating_sub(1);
        }
        KeyCode::Char('g') => app.story_scroll = 0,
        KeyCode::Char('G') => app.scroll_story_to_bottom(),
        _ => {}
    }
}

fn handle_poetry_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        // Palette
        KeyCode::Char('j') | KeyCode::Down => app.palette_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.palette_nav_up(),
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected_word(),

        // Text boxes
        KeyCode::Char('/') => app.edit(Field::Keyword),
        KeyCode::Char('b') => app.edit(Field::CanvasBackground),
        KeyCode::Char('c') => app.edit(Field::TileForeground),
        KeyCode::Char('v') => app.edit(Field::TileBackground),

        // Editor panel
        KeyCode::Char(c @ '1'..='5') => {
            let index = c as usize - '1' as usize;
            app.apply_style(StyleEdit::Size(FontSize::all()[index]));
        }
        KeyCode::Char('f') => app.apply_style(StyleEdit::ToggleFamily),
        KeyCode::Esc => app.canvas.clear_selection(),
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => app.submit_field(),
        KeyCode::Backspace => app.active_input().backspace(),
        KeyCode::Delete => app.active_input().delete(),
        KeyCode::Left => app.active_input().left(),
        KeyCode::Right => app.active_input().right(),
        KeyCode::Home => app.active_input().home(),
        KeyCode::End => app.active_input().end(),
        KeyCode::Char(c) => app.active_input().insert(c),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match app.screen {
        Screen::Story => match mouse.kind {
            MouseEventKind::ScrollDown => {
                app.story_scroll = app.story_scroll.saturating_add(3);
            }
            MouseEventKind::ScrollUp => {
                app.story_scroll = app.story_scroll.saturating_sub(3);
            }
            _ => {}
        },
        Screen::Poetry => handle_poetry_mouse(app, mouse),
    }
}

fn handle_poetry_mouse(app: &mut App, mouse: MouseEvent) {
    let (x, y) = (mouse.column, mouse.row);

    if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
        if let Some(area) = app.palette_area.filter(|r| point_in_rect(x, y, *r)) {
            click_palette(app, area, y);
            return;
        }
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.palette_nav_down(),
        MouseEventKind::ScrollUp => app.palette_nav_up(),
        _ => {}
    }

    let Some(viewport) = app.canvas_viewport() else {
        return;
    };
    let (cx, cy) = viewport.to_canvas(x, y);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            app.canvas.dispatch(CanvasEvent::PointerDown { x: cx, y: cy }, &GlyphMetrics);
            if app.clicks.register(x, y, Instant::now()) {
                app.canvas.dispatch(CanvasEvent::DoubleClick { x: cx, y: cy }, &GlyphMetrics);
            }
        }
        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
            app.canvas.dispatch(CanvasEvent::PointerMove { x: cx, y: cy }, &GlyphMetrics);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.canvas.dispatch(CanvasEvent::PointerUp, &GlyphMetrics);
        }
        _ => {}
    }
}

/// Clicking a palette row selects and toggles that word
fn click_palette(app: &mut App, area: Rect, row: u16) {
    // Rows start inside the border and stop above the bottom one
    let Some(line) = row.checked_sub(area.y + 1) else {
        return;
    };
    if line >= area.height.saturating_sub(2) {
        return;
    }
    let index = app.palette_state.offset() + line as usize;
    if index < app.palette.len() {
        app.palette_state.select(Some(index));
        app.toggle_palette(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::app_with;
    use madlib_core::{CanvasState, FontFamily};

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> AppEvent {
        AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> AppEvent {
        AppEvent::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn poetry_app() -> App {
        let (mut app, _rx) = app_with("unused");
        app.screen = Screen::Poetry;
        // 80x40 cells over the 400x400 canvas
        app.canvas_area = Some(Rect::new(0, 0, 80, 40));
        app.palette.extend(["word"]);
        app.toggle_palette(0);
        app
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, _rx) = app_with("unused");
        handle_event(&mut app, ctrl('c'));
        assert!(app.should_quit);

        let (mut app, _rx) = app_with("unused");
        handle_event(&mut app, key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_typing_q_while_editing_does_not_quit() {
        let (mut app, _rx) = app_with("unused");
        handle_event(&mut app, key(KeyCode::Char('i')));
        assert_eq!(app.input_mode, InputMode::Editing);
        handle_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.should_quit);
        assert_eq!(app.story_input.text, "q");
        handle_event(&mut app, key(KeyCode::Esc));
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[tokio::test]
    async fn test_tab_switches_activity() {
        let (mut app, _rx) = app_with("unused");
        handle_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.screen, Screen::Poetry);
        handle_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.screen, Screen::Story);
    }

    #[test]
    fn test_mouse_drag_moves_tile() {
        let mut app = poetry_app();
        let id = app.canvas.tiles()[0].id;

        handle_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 31, 19));
        assert_eq!(app.canvas.state(), CanvasState::Dragging(id));

        handle_event(&mut app, mouse(MouseEventKind::Drag(MouseButton::Left), 41, 29));
        handle_event(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 41, 29));
        assert_eq!(app.canvas.state(), CanvasState::Selected(id));

        let tile = app.canvas.tile(id).unwrap();
        assert_eq!((tile.x, tile.y), (200.0, 290.0));
    }

    #[test]
    fn test_style_keys_edit_selected_tile() {
        let mut app = poetry_app();
        handle_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 31, 19));
        handle_event(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 31, 19));

        handle_event(&mut app, key(KeyCode::Char('5')));
        handle_event(&mut app, key(KeyCode::Char('f')));
        let editor = app.canvas.editor().unwrap();
        assert_eq!(editor.size, FontSize::XL);
        assert_eq!(editor.family, FontFamily::Serif);

        handle_event(&mut app, key(KeyCode::Esc));
        assert!(app.canvas.editor().is_none());
    }

    #[test]
    fn test_double_click_on_tile_keeps_selection() {
        let mut app = poetry_app();
        let id = app.canvas.tiles()[0].id;
        handle_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 31, 19));
        handle_event(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 31, 19));
        handle_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 31, 19));
        assert_eq!(app.canvas.active(), Some(id));

        handle_event(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 31, 19));
        handle_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 2, 2));
        assert_eq!(app.canvas.state(), CanvasState::Idle);
    }

    #[test]
    fn test_palette_click_toggles_word() {
        let mut app = poetry_app();
        app.canvas_area = Some(Rect::new(30, 0, 80, 40));
        app.palette_area = Some(Rect::new(0, 0, 20, 10));
        assert_eq!(app.canvas.tiles().len(), 1);

        // Border row is not an entry
        handle_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 3, 0));
        assert_eq!(app.canvas.tiles().len(), 1);

        handle_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 3, 1));
        assert!(app.canvas.tiles().is_empty());
        assert!(!app.palette.entries()[0].is_used());
    }

    #[test]
    fn test_palette_bottom_border_is_not_an_entry() {
        let (mut app, _rx) = app_with("unused");
        app.screen = Screen::Poetry;
        app.canvas_area = Some(Rect::new(30, 0, 80, 40));
        // Ten words in ten rows leaves eight visible, so the border row sits over "i"
        app.palette.extend(["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"]);
        app.palette_area = Some(Rect::new(0, 0, 20, 10));

        handle_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 3, 9));
        assert!(app.canvas.tiles().is_empty());
        assert!(app.palette.entries().iter().all(|e| !e.is_used()));

        // Last visible row still works
        handle_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 3, 8));
        assert_eq!(app.canvas.tiles().len(), 1);
        assert!(app.palette.entries()[7].is_used());
    }

    #[test]
    fn test_size_key_without_selection_shows_notice() {
        let (mut app, _rx) = app_with("unused");
        app.screen = Screen::Poetry;
        handle_event(&mut app, key(KeyCode::Char('3')));
        assert_eq!(app.status.as_deref(), Some("Select a tile first"));
    }
}
