use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::ai::{ollama, GenerateOptions};
use crate::conversation::MAX_WORDS;
use crate::role::{ModelRole, ModelSet};

pub const ENDPOINT_ENV: &str = "MADLIB_ENDPOINT";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    pub writer_model: String,
    pub words_model: String,
    pub color_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub max_words: usize,
    pub canvas_size: u32,
    pub export_dir: Option<PathBuf>,
    /// Seconds before a generate request is abandoned
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        let options = GenerateOptions::default();
        Self {
            endpoint: "http://localhost:11434".to_string(),
            writer_model: ModelRole::Writer.default_model().to_string(),
            words_model: ModelRole::Words.default_model().to_string(),
            color_model: ModelRole::Color.default_model().to_string(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            max_words: MAX_WORDS,
            canvas_size: 400,
            export_dir: None,
            request_timeout_secs: ollama::DEFAULT_TIMEOUT.as_secs(),
        }
    }

    /// Load from disk, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::get_config_path()?)?;

        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            if !endpoint.trim().is_empty() {
                config.endpoint = endpoint;
            }
        }

        Ok(config)
    }

    /// Defaults when the file does not exist
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }
        let config_content = fs::read_to_string(config_path)?;
        Ok(serde_json::from_str(&config_content)?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    pub fn models(&self) -> ModelSet {
        ModelSet {
            writer: self.writer_model.clone(),
            words: self.words_model.clone(),
            color: self.color_model.clone(),
            writer_options: GenerateOptions {
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            },
        }
    }

    /// Where exports land: the configured directory or the working directory
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("machine-madlib").join("config.json"))
    }
}
