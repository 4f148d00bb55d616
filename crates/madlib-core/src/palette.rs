use crate::canvas::{Canvas, TileId};

pub const MAX_WORDS_PER_FETCH: usize = 8;

/// Split a comma-separated model response into at most eight words
pub fn parse_word_list(response: &str) -> Vec<String> {
    response
        .split(',')
        .map(|word| word.trim().to_string())
        .take(MAX_WORDS_PER_FETCH)
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaletteEntry {
    pub word: String,
    /// Tile spawned from this entry while it is toggled on
    pub tile: Option<TileId>,
}

impl PaletteEntry {
    pub fn is_used(&self) -> bool {
        self.tile.is_some()
    }
}

/// Suggested words; each entry owns at most one tile on the canvas
#[derive(Debug, Clone, Default)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append words, skipping blanks. Returns how many were added.
    pub fn extend<I, S>(&mut self, words: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let before = self.entries.len();
        for word in words {
            let word = word.as_ref().trim();
            if !word.is_empty() {
                self.entries.push(PaletteEntry {
                    word: word.to_string(),
                    tile: None,
                });
            }
        }
        self.entries.len() - before
    }

    /// Toggle the entry at `index` onto or off the canvas.
    ///
    /// Returns the tile now on the canvas for this entry, if any.
    pub fn toggle(&mut self, index: usize, canvas: &mut Canvas) -> Option<TileId> {
        let entry = self.entries.get_mut(index)?;
        match entry.tile.take() {
            Some(id) => {
                canvas.remove_tile(id);
                None
            }
            None => {
                let id = canvas.add_tile(&entry.word);
                entry.tile = Some(id);
                Some(id)
            }
        }
    }
}
