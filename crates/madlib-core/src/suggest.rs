//! Word and color suggestions from the generate service

use tracing::{debug, warn};

use crate::ai::{GenerateError, GenerateRequest, Generator};
use crate::color::{sanitize_color_response, HexColor};
use crate::palette::parse_word_list;
use crate::role::{ModelRole, ModelSet, FILLER_WORDS};

pub fn words_request(models: &ModelSet, keyword: Option<&str>) -> GenerateRequest {
    let prompt = keyword
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .unwrap_or(FILLER_WORDS);
    models.request(ModelRole::Words, prompt)
}

pub fn color_request(models: &ModelSet, description: &str) -> GenerateRequest {
    models.request(ModelRole::Color, description.trim())
}

/// Turn a color model result into a usable color, falling back to black
pub fn resolve_color(result: Result<String, GenerateError>) -> HexColor {
    match result {
        Ok(response) => match sanitize_color_response(&response) {
            Some(color) => color,
            None => {
                warn!(%response, "no hex color in response, using fallback");
                HexColor::fallback()
            }
        },
        Err(e) => {
            warn!(error = %e, "color request failed, using fallback");
            HexColor::fallback()
        }
    }
}

/// Ask for up to eight words, seeded by `keyword` when given
pub async fn fetch_words<G: Generator + ?Sized>(
    generator: &G,
    models: &ModelSet,
    keyword: Option<&str>,
) -> Result<Vec<String>, GenerateError> {
    let request = words_request(models, keyword);
    let response = generator.generate(&request).await?;
    let words = parse_word_list(&response);
    debug!(count = words.len(), "words fetched");
    Ok(words)
}

/// Interpret a color description. Never fails.
pub async fn fetch_color<G: Generator + ?Sized>(
    generator: &G,
    models: &ModelSet,
    description: &str,
) -> HexColor {
    let request = color_request(models, description);
    resolve_color(generator.generate(&request).await)
}
