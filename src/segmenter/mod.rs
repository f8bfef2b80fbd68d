//! Splits raw tender text into overlapping word windows tagged with page and
//! section.
//!
//! The segmenter tokenizes by whitespace and slides a fixed-size window across
//! the token sequence; consecutive windows share a fixed overlap so sentences
//! cut at a boundary remain retrievable from both sides. Each chunk is
//! attributed to the page where it starts and labeled with the section it
//! falls under (see [`sections`]).

pub mod sections;

use serde::{Deserialize, Serialize};

use crate::types::RagError;

pub use sections::{UNLABELED_SECTION, classify_section};

/// Overlapping word window extracted from a document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Sequence position of this chunk within its document.
    pub id: usize,
    /// Opaque key of the owning document.
    pub document_id: String,
    /// The window's text, words rejoined with single spaces.
    pub text: String,
    /// Word offset where the window starts (inclusive).
    pub start_word: usize,
    /// Word offset where the window ends (exclusive).
    pub end_word: usize,
    /// Number of words in the window.
    pub word_count: usize,
    /// 1-based page the window starts on; 1 when no page texts were supplied.
    pub page: u32,
    /// Section label, or [`UNLABELED_SECTION`] when no rule matched.
    pub section: String,
}

/// Window geometry for [`Segmenter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmenterConfig {
    /// Words per window.
    pub window_words: usize,
    /// Words shared between consecutive windows. Must be below `window_words`.
    pub overlap_words: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            window_words: 500,
            overlap_words: 50,
        }
    }
}

impl SegmenterConfig {
    fn validate(&self) -> Result<(), RagError> {
        if self.window_words == 0 {
            return Err(RagError::Config("window size must be positive".into()));
        }
        if self.overlap_words >= self.window_words {
            return Err(RagError::Config(format!(
                "overlap ({}) must be smaller than the window size ({})",
                self.overlap_words, self.window_words
            )));
        }
        Ok(())
    }
}

/// Splits document text into [`Chunk`]s.
#[derive(Clone, Debug, Default)]
pub struct Segmenter {
    config: SegmenterConfig,
}

impl Segmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    /// Segments `text` into overlapping windows.
    ///
    /// `pages` carries the per-page text of the source document in order; it
    /// drives page attribution and may be omitted, in which case every chunk
    /// is assigned page 1. Empty text yields an empty sequence. An overlap at
    /// or above the window size is rejected before any chunk is produced.
    pub fn segment(
        &self,
        document_id: &str,
        text: &str,
        pages: Option<&[String]>,
    ) -> Result<Vec<Chunk>, RagError> {
        self.config.validate()?;

        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return Ok(Vec::new());
        }

        let page_word_totals = cumulative_page_words(pages);

        let window = self.config.window_words;
        let overlap = self.config.overlap_words;
        let mut chunks = Vec::new();
        let mut start = 0usize;
        let mut id = 0usize;

        loop {
            let end = (start + window).min(words.len());
            let chunk_text = words[start..end].join(" ");
            let section = classify_section(&chunk_text);
            chunks.push(Chunk {
                id,
                document_id: document_id.to_string(),
                word_count: end - start,
                page: page_for_offset(&page_word_totals, start),
                section,
                text: chunk_text,
                start_word: start,
                end_word: end,
            });

            if start + window >= words.len() {
                break;
            }
            id += 1;
            start = start + window - overlap;
        }

        tracing::debug!(
            document_id,
            chunks = chunks.len(),
            total_words = words.len(),
            "segmented document"
        );
        Ok(chunks)
    }
}

/// Running totals of words per page: `totals[i]` counts pages `0..=i`.
fn cumulative_page_words(pages: Option<&[String]>) -> Vec<usize> {
    let Some(pages) = pages else {
        return Vec::new();
    };
    let mut totals = Vec::with_capacity(pages.len());
    let mut running = 0usize;
    for page in pages {
        running += page.split_whitespace().count();
        totals.push(running);
    }
    totals
}

/// First page whose cumulative word count exceeds the window's start offset.
fn page_for_offset(page_word_totals: &[usize], start: usize) -> u32 {
    if page_word_totals.is_empty() {
        return 1;
    }
    for (index, total) in page_word_totals.iter().enumerate() {
        if *total > start {
            return (index + 1) as u32;
        }
    }
    page_word_totals.len() as u32
}
