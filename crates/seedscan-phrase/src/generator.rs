//! Phrase generator

use std::fmt;

use rand::Rng;
use serde::Serialize;

use crate::vocabulary::{PhraseError, Vocabulary};

/// Number of words in a generated phrase unless configured otherwise
pub const DEFAULT_PHRASE_LENGTH: usize = 12;

/// A fabricated recovery phrase
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct Phrase {
    words: Vec<String>,
}

impl Phrase {
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl fmt::Display for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.words.join(" "))
    }
}

impl From<Phrase> for String {
    fn from(phrase: Phrase) -> Self {
        phrase.to_string()
    }
}

/// Draws phrases of a fixed length from a vocabulary.
///
/// Holds no state between calls; every word is an independent uniform draw
/// from the supplied random source.
#[derive(Debug, Clone)]
pub struct PhraseGenerator {
    vocabulary: Vocabulary,
    length: usize,
}

impl PhraseGenerator {
    pub fn new(vocabulary: Vocabulary, length: usize) -> Result<Self, PhraseError> {
        if length == 0 {
            return Err(PhraseError::ZeroLength);
        }
        if vocabulary.is_empty() {
            return Err(PhraseError::EmptyVocabulary);
        }
        Ok(Self { vocabulary, length })
    }

    /// Generate one phrase
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Phrase {
        let words = self.vocabulary.words();
        let words = (0..self.length)
            .map(|_| words[rng.gen_range(0..words.len())].clone())
            .collect();
        Phrase { words }
    }
}

impl Default for PhraseGenerator {
    fn default() -> Self {
        Self {
            vocabulary: Vocabulary::english(),
            length: DEFAULT_PHRASE_LENGTH,
        }
    }
}
