use madlib_core::transcript::THINKING_TEXT;
use madlib_core::{Entry, FontSize, HexColor, Speaker};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::app::{App, Field, InputMode, Screen, TextInput};
use crate::canvas_view::{fit_square, terminal_color, CellPainter, Viewport};

const SIDE_PANEL_WIDTH: u16 = 30;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Story => render_story_screen(app, frame, body_area),
        Screen::Poetry => render_poetry_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let activity = match app.screen {
        Screen::Story => "Story",
        Screen::Poetry => "Visual Poetry",
    };

    let mut spans = vec![
        Span::styled(" Machine Madlib ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!("· {} ", activity), Style::default().fg(Color::White)),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if app.is_busy() {
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        spans.push(Span::styled(
            format!("  working{}", dots),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.screen {
        Screen::Story => " STORY ",
        Screen::Poetry => " POETRY ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let pairs: &[(&str, &str)] = match (app.screen, app.input_mode) {
        (_, InputMode::Editing) => &[(" Enter ", " submit "), (" Esc ", " stop typing ")],
        (Screen::Story, InputMode::Normal) => &[
            (" i ", " write "),
            (" j/k ", " scroll "),
            (" ^S ", " save .txt "),
            (" Tab ", " poetry "),
            (" q ", " quit "),
        ],
        (Screen::Poetry, InputMode::Normal) => &[
            (" / ", " words "),
            (" j/k ", " nav "),
            (" Space ", " toggle "),
            (" 1-5 ", " size "),
            (" f ", " font "),
            (" c/v ", " colors "),
            (" b ", " canvas "),
            (" ^S ", " save .png "),
            (" Tab ", " story "),
        ],
    };

    let mut spans = vec![
        Span::styled(mode_text, mode_style),
        Span::styled(" ", label_style),
    ];
    for (key, label) in pairs {
        spans.push(Span::styled(*key, key_style));
        spans.push(Span::styled(*label, label_style));
    }
    if let Some(status) = &app.status {
        spans.push(Span::styled(
            format!("  {}", status),
            Style::default().bg(Color::Black).fg(Color::Yellow),
        ));
    }

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn transcript_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = Vec::new();

    for entry in app.conversation.transcript().entries() {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        match entry {
            Entry::Turn(turn) => {
                let label_style = match turn.speaker {
                    Speaker::Human => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    Speaker::Ai => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                };
                lines.push(Line::from(vec![
                    Span::styled(turn.speaker.label(), label_style),
                    Span::raw(" "),
                    Span::raw(turn.text.clone()),
                ]));
            }
            Entry::Thinking => {
                // Animated ellipsis: cycles through ".", "..", "..."
                let base = THINKING_TEXT.trim_end_matches('.');
                let dots = ".".repeat((app.animation_frame as usize) + 1);
                lines.push(Line::from(Span::styled(
                    format!("{}{}", base, dots),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )));
            }
            Entry::Error(_) => {
                lines.push(Line::from(Span::styled(
                    entry.render(),
                    Style::default().fg(Color::Red),
                )));
            }
        }
    }

    lines
}

/// Rows a paragraph of `lines` takes when wrapped at `width`
fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    let width = width.max(1) as usize;
    lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum::<usize>()
        .min(u16::MAX as usize) as u16
}

fn render_story_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    let gate = app.conversation.gate();
    let count_style = if gate.is_locked() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Story ")
        .title(
            Line::from(Span::styled(
                format!(" {}/{} words ", app.conversation.word_count(), app.conversation.max_words()),
                count_style,
            ))
            .right_aligned(),
        );

    let lines = transcript_lines(app);
    let inner_height = chat_area.height.saturating_sub(2);
    let inner_width = chat_area.width.saturating_sub(2);
    let max_scroll = wrapped_height(&lines, inner_width).saturating_sub(inner_height);
    app.story_scroll = app.story_scroll.min(max_scroll);

    let chat_text = if lines.is_empty() {
        Text::from(Span::styled(
            "The machine is choosing an opening line...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: false })
        .scroll((app.story_scroll, 0));
    frame.render_widget(chat, chat_area);

    let editing = app.input_mode == InputMode::Editing && app.field == Field::Story;
    if gate.is_locked() {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Field::Story.title());
        let placeholder = Paragraph::new(Span::styled(
            gate.placeholder(),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))
        .block(block);
        frame.render_widget(placeholder, input_area);
    } else {
        render_input(frame, input_area, &app.story_input, Field::Story.title(), editing);
    }
}

fn render_poetry_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [left_area, canvas_area, right_area] = Layout::horizontal([
        Constraint::Length(SIDE_PANEL_WIDTH),
        Constraint::Min(0),
        Constraint::Length(SIDE_PANEL_WIDTH),
    ])
    .areas(area);

    let [keyword_area, palette_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(left_area);

    let [editor_area, color_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(right_area);

    let editing = |field: Field| app.input_mode == InputMode::Editing && app.field == field;

    render_input(
        frame,
        keyword_area,
        &app.keyword_input,
        Field::Keyword.title(),
        editing(Field::Keyword),
    );

    let color_field = match app.field {
        Field::CanvasBackground | Field::TileForeground | Field::TileBackground
            if app.input_mode == InputMode::Editing =>
        {
            Some(app.field)
        }
        _ => None,
    };
    match color_field {
        Some(field) => render_input(frame, color_area, &app.color_input, field.title(), true),
        None => {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Color ");
            let hint = Paragraph::new(Span::styled(
                "hex or a description",
                Style::default().fg(Color::DarkGray),
            ))
            .block(block);
            frame.render_widget(hint, color_area);
        }
    }

    render_palette(app, frame, palette_area);
    render_canvas(app, frame, canvas_area);
    render_editor(app, frame, editor_area);
}

fn render_palette(app: &mut App, frame: &mut Frame, area: Rect) {
    app.palette_area = Some(area);

    let title = if app.words_pending {
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        format!(" Words{} ", dots)
    } else {
        " Words ".to_string()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(title);

    if app.palette.is_empty() {
        let hint = Paragraph::new(Span::styled(
            "Press / then Enter to fetch words",
            Style::default().fg(Color::DarkGray),
        ))
        .wrap(Wrap { trim: true })
        .block(block);
        frame.render_widget(hint, area);
        return;
    }

    let items: Vec<ListItem> = app
        .palette
        .entries()
        .iter()
        .map(|entry| {
            if entry.is_used() {
                ListItem::new(Line::from(vec![
                    Span::styled("● ", Style::default().fg(Color::Green)),
                    Span::styled(entry.word.clone(), Style::default().fg(Color::Green)),
                ]))
            } else {
                ListItem::new(format!("  {}", entry.word))
            }
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Magenta)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_stateful_widget(list, area, &mut app.palette_state);
}

fn render_canvas(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Canvas ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let square = fit_square(inner);
    if square.width == 0 || square.height == 0 {
        app.canvas_area = None;
        return;
    }
    app.canvas_area = Some(square);

    let viewport = Viewport::new(square, app.canvas.width(), app.canvas.height());
    let mut painter = CellPainter::new(frame.buffer_mut(), viewport);
    app.canvas.draw(&mut painter);
}

fn swatch(color: &HexColor) -> Vec<Span<'static>> {
    vec![
        Span::styled("  ", Style::default().bg(terminal_color(color))),
        Span::raw(format!(" {}", color)),
    ]
}

fn render_editor(app: &App, frame: &mut Frame, area: Rect) {
    let label = Style::default().fg(Color::DarkGray);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Style ");

    let mut lines = Vec::new();
    let mut canvas_line = vec![Span::styled("Canvas  ", label)];
    canvas_line.extend(swatch(app.canvas.background()));
    lines.push(Line::from(canvas_line));
    lines.push(Line::default());

    match app.canvas.editor() {
        Some(editor) => {
            let mut text = vec![Span::styled("Text    ", label)];
            text.extend(swatch(&editor.foreground));
            lines.push(Line::from(text));

            let mut background = vec![Span::styled("Back    ", label)];
            background.extend(swatch(&editor.background));
            lines.push(Line::from(background));

            let mut sizes = vec![Span::styled("Size    ", label)];
            for size in FontSize::all() {
                let style = if size == editor.size {
                    Style::default().fg(Color::Black).bg(Color::Cyan).bold()
                } else {
                    Style::default().fg(Color::White)
                };
                sizes.push(Span::styled(format!(" {} ", size.label()), style));
            }
            lines.push(Line::from(sizes));

            lines.push(Line::from(vec![
                Span::styled("Font    ", label),
                Span::raw(editor.family.label()),
            ]));
        }
        None => lines.push(Line::from(Span::styled("Click a tile to edit it", label))),
    }

    let editor = Paragraph::new(lines).block(block);
    frame.render_widget(editor, area);
}

/// Bordered single-line input with horizontal scrolling and a cursor while editing
fn render_input(frame: &mut Frame, area: Rect, input: &TextInput, title: &str, editing: bool) {
    let border_color = if editing { Color::Yellow } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title.to_string());

    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width == 0 {
        0
    } else if input.cursor >= inner_width {
        input.cursor - inner_width + 1
    } else {
        0
    };

    let visible_text: String = input
        .text
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let paragraph = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);
    frame.render_widget(paragraph, area);

    if editing {
        let cursor_x = (input.cursor - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}
