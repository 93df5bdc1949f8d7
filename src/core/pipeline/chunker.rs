//! UTF-8 safe text chunking.
//!
//! Splits text into fixed-size, overlapping chunks measured in
//! characters. Boundaries are taken from `char_indices()` so a chunk
//! never splits a multi-byte sequence.
//!
//! # Example
//!
//! ```
//! use codebrief::core::pipeline::Chunker;
//!
//! let chunker = Chunker::new(10, 2).unwrap();
//! let chunks: Vec<_> = chunker.split("0123456789ABCDEFGHIJ").collect();
//!
//! assert_eq!(chunks[0].text, "0123456789");
//! assert_eq!(chunks[1].text, "89ABCDEFGH");
//! assert_eq!(chunks[2].text, "GHIJ");
//! ```

use crate::core::error::{BriefError, Result};

/// A contiguous slice of a file's content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Sequential chunk number within the text
    pub index: usize,

    /// The chunk's text
    pub text: &'a str,

    /// Byte offset where the chunk starts
    pub start_offset: usize,

    /// Byte offset where the chunk ends
    pub end_offset: usize,
}

/// UTF-8 safe text chunker.
///
/// All sizes are measured in **characters**, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    /// Maximum characters per chunk
    max_size: usize,

    /// Characters shared by consecutive chunks
    overlap: usize,
}

impl Chunker {
    /// Create a new chunker.
    ///
    /// Fails with `InvalidConfiguration` unless `max_size > 0` and
    /// `overlap < max_size`.
    pub fn new(max_size: usize, overlap: usize) -> Result<Self> {
        if max_size == 0 {
            return Err(BriefError::InvalidConfiguration(
                "chunk size must be > 0".to_string(),
            ));
        }
        if overlap >= max_size {
            return Err(BriefError::InvalidConfiguration(format!(
                "overlap ({overlap}) must be < chunk size ({max_size})"
            )));
        }

        Ok(Self { max_size, overlap })
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Lazily split `text` into overlapping chunks.
    ///
    /// The iterator is cheap to clone; cloning it (or calling `split`
    /// again) restarts the sequence.
    pub fn split<'a>(&self, text: &'a str) -> Chunks<'a> {
        Chunks {
            text,
            max_size: self.max_size,
            step: self.max_size - self.overlap,
            next_start: Some(0),
            index: 0,
        }
    }
}

/// Validate parameters and split in one call
pub fn split(text: &str, max_size: usize, overlap: usize) -> Result<Chunks<'_>> {
    Ok(Chunker::new(max_size, overlap)?.split(text))
}

/// Iterator over the chunks of one text. See [`Chunker::split`].
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    text: &'a str,
    max_size: usize,
    step: usize,
    /// Byte offset of the next chunk's first character, `None` once
    /// a chunk has reached the end of the text
    next_start: Option<usize>,
    index: usize,
}

impl<'a> Chunks<'a> {
    /// Byte offset reached by advancing `chars` characters from `from`
    fn advance(&self, from: usize, chars: usize) -> usize {
        self.text[from..]
            .char_indices()
            .nth(chars)
            .map(|(offset, _)| from + offset)
            .unwrap_or(self.text.len())
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next_start?;
        if start >= self.text.len() {
            self.next_start = None;
            return None;
        }

        let end = self.advance(start, self.max_size);

        // Stop once the text is exhausted so no chunk is pure overlap
        self.next_start = if end >= self.text.len() {
            None
        } else {
            Some(self.advance(start, self.step))
        };

        let chunk = Chunk {
            index: self.index,
            text: &self.text[start..end],
            start_offset: start,
            end_offset: end,
        };
        self.index += 1;
        Some(chunk)
    }
}

impl std::iter::FusedIterator for Chunks<'_> {}
