use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::{DomainError, Embedding};

/// Identifies one analysis session's collection in the session index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionId(String);

impl CollectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw text of one uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub text: String,
}

impl Document {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: Uuid,
    pub ordinal: usize,
    pub text: String,
    #[serde(skip)]
    pub embedding: Option<Embedding>,
}

impl Chunk {
    pub fn new(ordinal: usize, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            ordinal,
            text: text.into(),
            embedding: None,
        }
    }

    pub fn with_embedding(mut self, embedding: Embedding) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn is_embedded(&self) -> bool {
        self.embedding.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk: Chunk,
    pub score: f32,
}

/// Splits text into fixed-size character windows.
///
/// Sizes count Unicode scalar values, not bytes. With `overlap == 0` the
/// windows are contiguous; otherwise each window after the first repeats the
/// last `overlap` characters of its predecessor. Boundaries ignore word and
/// sentence structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    size: usize,
    overlap: usize,
}

impl Chunker {
    pub fn new(size: usize, overlap: usize) -> Result<Self, DomainError> {
        if size == 0 {
            return Err(DomainError::validation("chunk size must be greater than zero"));
        }
        if overlap >= size {
            return Err(DomainError::validation(format!(
                "chunk overlap ({overlap}) must be less than chunk size ({size})"
            )));
        }
        Ok(Self { size, overlap })
    }

    pub fn contiguous(size: usize) -> Result<Self, DomainError> {
        Self::new(size, 0)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    pub fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        if text.is_empty() {
            return Vec::new();
        }

        // Byte offset of every char boundary, including the end of the text.
        let mut bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        bounds.push(text.len());
        let char_count = bounds.len() - 1;

        let step = self.size - self.overlap;
        let mut pieces = Vec::with_capacity(char_count.div_ceil(step));
        let mut start = 0;

        loop {
            let end = (start + self.size).min(char_count);
            pieces.push(&text[bounds[start]..bounds[end]]);
            if end == char_count {
                break;
            }
            start += step;
        }

        pieces
    }

    /// Splits `text` into unembedded chunks numbered from zero.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        self.split(text)
            .into_iter()
            .enumerate()
            .map(|(ordinal, piece)| Chunk::new(ordinal, piece))
            .collect()
    }

    /// Inverse of [`Chunker::split`]: drops the repeated prefix of every
    /// window after the first.
    pub fn reassemble<S: AsRef<str>>(&self, pieces: &[S]) -> String {
        let mut text = String::new();
        for (i, piece) in pieces.iter().enumerate() {
            let piece = piece.as_ref();
            if i == 0 {
                text.push_str(piece);
            } else {
                text.extend(piece.chars().skip(self.overlap));
            }
        }
        text
    }
}
