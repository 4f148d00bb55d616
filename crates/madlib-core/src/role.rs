use crate::ai::{GenerateOptions, GenerateRequest};

/// Prompt sent to the writer model to open a story with no user text.
pub const WRITER_BOOTSTRAP: &str = "mm_writer_start";
/// Prompt sent to the words model when no keyword was given.
pub const FILLER_WORDS: &str = "mm_filler_words";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelRole {
    Writer,
    Words,
    Color,
}

impl ModelRole {
    pub fn all() -> Vec<ModelRole> {
        vec![ModelRole::Writer, ModelRole::Words, ModelRole::Color]
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ModelRole::Writer => "mm_writer",
            ModelRole::Words => "mm_mistral",
            ModelRole::Color => "mm_color",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModelRole::Writer => "Story writer",
            ModelRole::Words => "Word suggestions",
            ModelRole::Color => "Color interpreter",
        }
    }
}

/// Model identifiers per role, plus the options used for story turns
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSet {
    pub writer: String,
    pub words: String,
    pub color: String,
    pub writer_options: GenerateOptions,
}

impl Default for ModelSet {
    fn default() -> Self {
        Self {
            writer: ModelRole::Writer.default_model().to_string(),
            words: ModelRole::Words.default_model().to_string(),
            color: ModelRole::Color.default_model().to_string(),
            writer_options: GenerateOptions::default(),
        }
    }
}

impl ModelSet {
    pub fn model(&self, role: ModelRole) -> &str {
        match role {
            ModelRole::Writer => &self.writer,
            ModelRole::Words => &self.words,
            ModelRole::Color => &self.color,
        }
    }

    /// Build a request for `role`. Only the writer carries sampling options.
    pub fn request(&self, role: ModelRole, prompt: impl Into<String>) -> GenerateRequest {
        let request = GenerateRequest::new(self.model(role), prompt);
        match role {
            ModelRole::Writer => request.with_options(self.writer_options),
            ModelRole::Words | ModelRole::Color => request,
        }
    }
}
