//! Story activity: a capped-length story co-written with the writer model.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::ai::{GenerateError, GenerateRequest};
use crate::export::{self, ExportError};
use crate::role::{ModelRole, ModelSet, WRITER_BOOTSTRAP};
use crate::state::Speaker;
use crate::transcript::{count_words, Transcript};

pub const MAX_WORDS: usize = 200;
pub const LOCKED_PLACEHOLDER: &str = "Maximum word count reached";

/// Whether the story input accepts new turns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputGate {
    Open,
    Locked,
}

impl InputGate {
    pub fn is_locked(&self) -> bool {
        *self == InputGate::Locked
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            InputGate::Open => "",
            InputGate::Locked => LOCKED_PLACEHOLDER,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("nothing to submit")]
    Empty,
    #[error("Maximum word count reached")]
    Locked,
    #[error("still waiting for the previous response")]
    Pending,
}

pub struct Conversation {
    transcript: Transcript,
    models: ModelSet,
    max_words: usize,
    pending: bool,
    gate: InputGate,
}

impl Conversation {
    pub fn new(models: ModelSet, max_words: usize) -> Self {
        let mut conversation = Self {
            transcript: Transcript::new(),
            models,
            max_words,
            pending: false,
            gate: InputGate::Open,
        };
        conversation.check_word_count();
        conversation
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn gate(&self) -> InputGate {
        self.gate
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn max_words(&self) -> usize {
        self.max_words
    }

    pub fn story(&self) -> String {
        self.transcript.story()
    }

    pub fn word_count(&self) -> usize {
        self.transcript.word_count()
    }

    /// Request that seeds the first AI turn. No placeholder is shown for it.
    pub fn initial_turn(&mut self) -> GenerateRequest {
        self.pending = true;
        self.models.request(ModelRole::Writer, WRITER_BOOTSTRAP)
    }

    /// Append a human turn and build the request for the AI's reply.
    pub fn submit_turn(&mut self, text: &str) -> Result<GenerateRequest, SubmitError> {
        let input = text.trim();
        if input.is_empty() {
            return Err(SubmitError::Empty);
        }
        if self.gate.is_locked() {
            return Err(SubmitError::Locked);
        }
        if self.pending {
            return Err(SubmitError::Pending);
        }

        let story = self.transcript.story();
        let prompt = if story.is_empty() {
            input.to_string()
        } else {
            format!("{} {}", story, input)
        };

        self.transcript.push_turn(Speaker::Human, input);
        self.transcript.push_thinking();
        self.pending = true;

        debug!(words = count_words(&prompt), "story turn submitted");
        Ok(self.models.request(ModelRole::Writer, prompt))
    }

    /// Apply the outcome of the in-flight story request.
    pub fn resolve(&mut self, result: Result<String, GenerateError>) {
        self.transcript.retract_thinking();
        self.pending = false;

        match result {
            Ok(text) => {
                debug!(response = %text, "AI response");
                self.transcript.push_turn(Speaker::Ai, text.trim());
            }
            Err(e) => {
                warn!(error = %e, "story request failed");
                self.transcript.push_error(e.to_string());
            }
        }

        self.check_word_count();
    }

    /// Lock or unlock input against the word budget
    pub fn check_word_count(&mut self) -> InputGate {
        let count = self.transcript.word_count();
        self.gate = if count >= self.max_words {
            InputGate::Locked
        } else {
            InputGate::Open
        };
        debug!(count, max = self.max_words, gate = ?self.gate, "word count checked");
        self.gate
    }

    /// Write the story to `machine-madlib-<timestamp>.txt` in `dir`.
    pub fn export_transcript(&self, dir: &Path, now: DateTime<Utc>) -> Result<PathBuf, ExportError> {
        let story = self.transcript.story();
        if story.trim().is_empty() {
            return Err(ExportError::Empty);
        }

        let path = export::unique_path(dir, &export::transcript_filename(now));
        std::fs::write(&path, story)?;
        info!(path = %path.display(), "story exported");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    fn conversation(max: usize) -> Conversation {
        Conversation::new(ModelSet::default(), max)
    }

    #[test]
    fn test_initial_turn_uses_bootstrap_prompt() {
        let mut c = conversation(MAX_WORDS);
        let req = c.initial_turn();
        assert_eq!(req.prompt, WRITER_BOOTSTRAP);
        assert_eq!(req.model, "mm_writer");
        assert!(req.options.is_some());
        assert!(c.transcript().is_empty());
        assert!(c.is_pending());
    }

    #[test]
    fn test_submit_rejects_blank_input() {
        let mut c = conversation(MAX_WORDS);
        assert_eq!(c.submit_turn("   \t ").unwrap_err(), SubmitError::Empty);
        assert!(c.transcript().is_empty());
    }

    #[test]
    fn test_prompt_is_story_plus_input() {
        let mut c = conversation(MAX_WORDS);
        c.initial_turn();
        c.resolve(Ok("Once upon a time.".to_string()));

        let req = c.submit_turn("  A fox appeared. ").unwrap();
        assert_eq!(req.prompt, "Once upon a time. A fox appeared.");
        assert_eq!(
            c.transcript().rendered(),
            "AI: Once upon a time.\n\nYou: A fox appeared.\n\nAI is thinking..."
        );
    }

    #[test]
    fn test_first_submission_without_story() {
        let mut c = conversation(MAX_WORDS);
        let req = c.submit_turn("Hello").unwrap();
        assert_eq!(req.prompt, "Hello");
    }

    #[test]
    fn test_pending_blocks_second_submission() {
        let mut c = conversation(MAX_WORDS);
        c.submit_turn("one").unwrap();
        assert_eq!(c.submit_turn("two").unwrap_err(), SubmitError::Pending);
    }

    #[test]
    fn test_error_replaces_placeholder() {
        let mut c = conversation(MAX_WORDS);
        c.submit_turn("one").unwrap();
        c.resolve(Err(GenerateError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR)));
        assert_eq!(
            c.transcript().rendered(),
            "You: one\n\nError: HTTP error! status: 500"
        );
        assert_eq!(c.story(), "one");
        assert!(!c.is_pending());
        assert_eq!(c.gate(), InputGate::Open);
    }

    #[test]
    fn test_gate_locks_at_exactly_the_ceiling() {
        let mut c = conversation(10);
        c.submit_turn(&words(4)).unwrap();
        c.resolve(Ok(words(5)));
        assert_eq!(c.word_count(), 9);
        assert_eq!(c.gate(), InputGate::Open);

        c.submit_turn("last").unwrap();
        c.resolve(Err(GenerateError::Decode("bad".into())));
        assert_eq!(c.word_count(), 10);
        assert_eq!(c.gate(), InputGate::Locked);
        assert_eq!(c.gate().placeholder(), LOCKED_PLACEHOLDER);
        assert_eq!(c.submit_turn("more").unwrap_err(), SubmitError::Locked);
    }

    #[test]
    fn test_default_ceiling_is_two_hundred() {
        let mut c = conversation(MAX_WORDS);
        c.initial_turn();
        c.resolve(Ok(words(199)));
        assert_eq!(c.gate(), InputGate::Open);

        c.submit_turn("two-hundred").unwrap();
        c.resolve(Ok(String::new()));
        assert_eq!(c.word_count(), 200);
        assert!(c.gate().is_locked());
    }

    #[test]
    fn test_export_refuses_empty_story() {
        let dir = tempfile::tempdir().unwrap();
        let c = conversation(MAX_WORDS);
        let err = c.export_transcript(dir.path(), Utc::now()).unwrap_err();
        assert!(matches!(err, ExportError::Empty));
    }
}
