use crate::state::{Speaker, Turn};

pub const THINKING_TEXT: &str = "AI is thinking...";
pub const ERROR_PREFIX: &str = "Error:";

const SECTION_BREAK: &str = "\n\n";

/// One rendered section of the transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Turn(Turn),
    /// Transient placeholder while a story request is in flight
    Thinking,
    /// Inline annotation for a failed request
    Error(String),
}

impl Entry {
    pub fn render(&self) -> String {
        match self {
            Entry::Turn(turn) => format!("{} {}", turn.speaker.label(), turn.text),
            Entry::Thinking => THINKING_TEXT.to_string(),
            Entry::Error(message) => format!("{} {}", ERROR_PREFIX, message),
        }
    }
}

/// Display-ordered transcript of the story activity.
///
/// Turns are only ever appended. The thinking placeholder is the one entry
/// that gets retracted.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push_turn(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.entries.push(Entry::Turn(Turn {
            speaker,
            text: text.into(),
        }));
    }

    pub fn push_thinking(&mut self) {
        self.entries.push(Entry::Thinking);
    }

    pub fn push_error(&mut self, message: impl Into<String>) {
        self.entries.push(Entry::Error(message.into()));
    }

    /// Remove the most recent thinking placeholder, if any
    pub fn retract_thinking(&mut self) -> bool {
        match self.entries.iter().rposition(|e| *e == Entry::Thinking) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Full display text, sections separated by a blank line
    pub fn rendered(&self) -> String {
        self.entries
            .iter()
            .map(Entry::render)
            .collect::<Vec<_>>()
            .join(SECTION_BREAK)
    }

    /// The story so far, rebuilt from the display text
    pub fn story(&self) -> String {
        reconstruct_story(&self.rendered())
    }

    pub fn word_count(&self) -> usize {
        count_words(&self.story())
    }
}

/// Rebuild the plain story from rendered transcript text.
///
/// Status sections are dropped, role labels stripped, and the surviving
/// sections joined with single spaces.
pub fn reconstruct_story(rendered: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for section in rendered.split(SECTION_BREAK) {
        let trimmed = section.trim();
        if trimmed.is_empty() {
            continue;
        }

        // Skip loading and error lines
        if trimmed.contains(THINKING_TEXT) || trimmed.starts_with(ERROR_PREFIX) {
            continue;
        }

        let cleaned = [Speaker::Human, Speaker::Ai]
            .iter()
            .find_map(|s| trimmed.strip_prefix(s.label()))
            .unwrap_or(trimmed)
            .trim();

        if !cleaned.is_empty() {
            parts.push(cleaned);
        }
    }

    parts.join(" ")
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
