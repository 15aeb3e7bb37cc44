//! SeedScan Core Engine
//!
//! Simulated phrase scanning: a timed generate/evaluate/record loop behind a
//! small command-driven state machine. Every phrase, address and balance the
//! engine produces is synthetic.

mod config;
mod error;
mod evaluator;
mod hits;
mod log_buffer;
mod scanner;
mod session;
mod stats;

pub use config::ScanConfig;
pub use error::EngineError;
pub use evaluator::{Discovery, HitEvaluator, Outcome};
pub use hits::{HitsStore, WalletScanResult};
pub use log_buffer::{LogBuffer, LogKind, ScanLog};
pub use scanner::Scanner;
pub use session::{EngineState, ScanSession, ScanSnapshot, TickReport};
pub use stats::{format_count, format_duration, ScanStats};

// Re-exports for convenience
pub use seedscan_chains::{all_chains, get_chain, Chain};
pub use seedscan_phrase::{Phrase, PhraseError, PhraseGenerator, Vocabulary};
