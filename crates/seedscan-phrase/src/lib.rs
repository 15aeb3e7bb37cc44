//! SeedScan Phrase Generation
//!
//! Fabricates candidate recovery phrases by drawing words uniformly from a
//! fixed vocabulary. Phrases are cosmetic and carry no checksum.

mod generator;
mod vocabulary;

pub use generator::{Phrase, PhraseGenerator, DEFAULT_PHRASE_LENGTH};
pub use vocabulary::{PhraseError, Vocabulary};
