use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;
use tracing::info;

use crate::canvas::Canvas;
use crate::paint::RasterPainter;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No text to download!")]
    Empty,
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
}

/// `2026-10-18T09:05:03.123Z` becomes `2026-10-18T09-05-03`
pub fn timestamp_slug(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
        .chars()
        .take(19)
        .collect()
}

pub fn transcript_filename(now: DateTime<Utc>) -> String {
    format!("machine-madlib-{}.txt", timestamp_slug(now))
}

pub fn image_filename(now: DateTime<Utc>) -> String {
    format!("visual-poetry-{}.png", timestamp_slug(now))
}

/// `dir/name`, or `dir/stem-N.ext` for the first N that is free
pub fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, format!(".{}", ext)),
        None => (name, String::new()),
    };

    (1..)
        .map(|n| dir.join(format!("{}-{}{}", stem, n, ext)))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// Rasterise the canvas to `visual-poetry-<timestamp>.png` in `dir`.
///
/// Selection is cleared first so the highlight never ends up in the image.
pub fn export_canvas(canvas: &mut Canvas, dir: &Path, now: DateTime<Utc>) -> Result<PathBuf, ExportError> {
    canvas.clear_selection();

    let mut painter = RasterPainter::new(
        canvas.width().round() as u32,
        canvas.height().round() as u32,
    );
    canvas.draw(&mut painter);

    let path = unique_path(dir, &image_filename(now));
    painter.into_image().save(&path)?;
    info!(path = %path.display(), tiles = canvas.tiles().len(), "canvas exported");
    Ok(path)
}
