//! UI-agnostic application state types
//!
//! Data structures shared by the conversation engine and whatever front end
//! renders it. Nothing here depends on a UI framework.

use serde::{Deserialize, Serialize};

/// One turn of the co-written story
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn human(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Human,
            text: text.into(),
        }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Ai,
            text: text.into(),
        }
    }
}

/// Who wrote a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    Human,
    Ai,
}

impl Speaker {
    /// Label rendered in front of the turn text
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::Human => "You:",
            Speaker::Ai => "AI:",
        }
    }
}
