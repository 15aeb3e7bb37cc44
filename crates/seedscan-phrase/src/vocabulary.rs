//! Word list handling

use std::io::BufRead;
use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhraseError {
    #[error("Vocabulary is empty")]
    EmptyVocabulary,
    #[error("Phrase length must be at least 1 word")]
    ZeroLength,
    #[error("Failed to read word list: {0}")]
    Io(#[from] std::io::Error),
}

/// An immutable, non-empty list of words phrases are drawn from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    words: Arc<[String]>,
}

impl Vocabulary {
    /// Build a vocabulary from any list of words
    pub fn new<I, S>(words: I) -> Result<Self, PhraseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        if words.is_empty() {
            return Err(PhraseError::EmptyVocabulary);
        }
        Ok(Self {
            words: words.into(),
        })
    }

    /// The 2048-word BIP39 English list
    pub fn english() -> Self {
        let words: Vec<String> = bip39::Language::English
            .word_list()
            .iter()
            .map(|w| w.to_string())
            .collect();
        Self {
            words: words.into(),
        }
    }

    /// Load a newline-separated word list, skipping blank lines
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, PhraseError> {
        let mut words = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let word = line.trim();
            if !word.is_empty() {
                words.push(word.to_string());
            }
        }
        Self::new(words)
    }

    /// Number of words
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always false for a constructed vocabulary
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// All words, in list order
    pub fn words(&self) -> &[String] {
        &self.words
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::english()
    }
}
