//! Scan session state machine
//!
//! `ScanSession` owns every mutable collection of a scan and applies commands
//! and ticks to them. It has no timer of its own: the live [`Scanner`] drives
//! `tick` on a cadence, while headless callers may drive it directly.
//!
//! [`Scanner`]: crate::Scanner

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use seedscan_chains::Chain;
use seedscan_phrase::{Phrase, PhraseGenerator, Vocabulary};

use crate::config::ScanConfig;
use crate::error::EngineError;
use crate::evaluator::{HitEvaluator, Outcome};
use crate::hits::{HitsStore, WalletScanResult};
use crate::log_buffer::{LogBuffer, LogKind, ScanLog};
use crate::stats::ScanStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    #[default]
    Idle,
    Scanning,
    Paused,
}

impl EngineState {
    /// Ticks are being generated
    pub fn is_scanning(self) -> bool {
        self == EngineState::Scanning
    }

    /// Ticks are suspended until the next `pause` or `start`
    pub fn is_paused(self) -> bool {
        self == EngineState::Paused
    }

    /// A session has been started and not yet stopped
    pub fn is_active(self) -> bool {
        self != EngineState::Idle
    }
}

/// Immutable copy of everything a front end renders
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSnapshot {
    pub state: EngineState,
    pub stats: ScanStats,
    /// Oldest to newest
    pub logs: Vec<ScanLog>,
    /// Newest to oldest
    pub hits: Vec<WalletScanResult>,
    /// Sum of all simulated balances found this session
    pub total_balance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

/// What a single processed tick produced
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub id: u64,
    pub hit: Option<WalletScanResult>,
}

pub struct ScanSession {
    config: ScanConfig,
    generator: PhraseGenerator,
    evaluator: HitEvaluator,
    logs: LogBuffer,
    hits: HitsStore,
    stats: ScanStats,
    state: EngineState,
    rng: Box<dyn RngCore + Send>,
    last_id: u64,
    fault: Option<EngineError>,
}

impl ScanSession {
    /// Create a session seeded from OS entropy
    pub fn new(
        config: ScanConfig,
        vocabulary: Vocabulary,
        chains: Vec<Chain>,
    ) -> Result<Self, EngineError> {
        Self::with_rng(config, vocabulary, chains, StdRng::from_entropy())
    }

    /// Create a session drawing from the given random source
    pub fn with_rng<R>(
        config: ScanConfig,
        vocabulary: Vocabulary,
        chains: Vec<Chain>,
        rng: R,
    ) -> Result<Self, EngineError>
    where
        R: RngCore + Send + 'static,
    {
        config.validate()?;
        let generator = PhraseGenerator::new(vocabulary, config.phrase_length)?;
        let evaluator = HitEvaluator::new(chains, config.hit_probability, config.max_balance)?;
        let logs = LogBuffer::new(config.log_capacity)?;

        Ok(Self {
            config,
            generator,
            evaluator,
            logs,
            hits: HitsStore::new(),
            stats: ScanStats::new(),
            state: EngineState::Idle,
            rng: Box::new(rng),
            last_id: 0,
            fault: None,
        })
    }

    /// Configuration the session was built with
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Current engine state
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Current counters
    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Live feed, oldest first
    pub fn logs(&self) -> &LogBuffer {
        &self.logs
    }

    /// Discoveries, newest first
    pub fn hits(&self) -> &HitsStore {
        &self.hits
    }

    /// Chains a hit can be attributed to
    pub fn chains(&self) -> &[Chain] {
        self.evaluator.chains()
    }

    /// Invariant failure that halted the session, if any
    pub fn fault(&self) -> Option<&EngineError> {
        self.fault.as_ref()
    }

    /// Enter or resume scanning. Returns the resulting state.
    pub fn start(&mut self) -> EngineState {
        if self.refuse_while_faulted("start") {
            return self.state;
        }
        match self.state {
            EngineState::Idle => {
                self.stats.on_start();
                self.state = EngineState::Scanning;
                info!(
                    chains = self.evaluator.chains().len(),
                    probability = self.evaluator.probability(),
                    "Scan started"
                );
            }
            EngineState::Paused => {
                self.state = EngineState::Scanning;
                info!(checked = self.stats.checked, "Scan resumed");
            }
            EngineState::Scanning => {}
        }
        self.state
    }

    /// Toggle between scanning and paused; ignored while idle
    pub fn pause(&mut self) -> EngineState {
        if self.refuse_while_faulted("pause") {
            return self.state;
        }
        match self.state {
            EngineState::Scanning => {
                self.state = EngineState::Paused;
                info!(checked = self.stats.checked, "Scan paused");
            }
            EngineState::Paused => {
                self.state = EngineState::Scanning;
                info!(checked = self.stats.checked, "Scan resumed");
            }
            EngineState::Idle => {}
        }
        self.state
    }

    /// Return to idle and discard everything from the current session
    pub fn stop(&mut self) -> EngineState {
        if self.state.is_active() {
            info!(
                checked = self.stats.checked,
                found = self.stats.found,
                "Scan stopped"
            );
        }
        self.state = EngineState::Idle;
        self.stats.on_reset();
        self.logs.clear();
        self.hits.clear();
        self.last_id = 0;
        self.fault = None;
        self.state
    }

    /// Run one generate/evaluate/record cycle.
    ///
    /// Does nothing and returns `Ok(None)` unless the session is scanning.
    /// An `Err` means the bookkeeping check after the tick failed; the session
    /// has then moved to `Paused` and will refuse to resume until stopped.
    pub fn tick(&mut self) -> Result<Option<TickReport>, EngineError> {
        if !self.state.is_scanning() {
            return Ok(None);
        }

        self.last_id += 1;
        let id = self.last_id;

        let phrase = self.generator.generate(&mut self.rng);
        let outcome = self.evaluator.evaluate(&phrase, &mut self.rng);

        self.logs.append(describe(id, &phrase, &outcome));
        self.stats.on_tick(&outcome);

        let hit = match outcome {
            Outcome::Hit(discovery) => {
                let result = WalletScanResult {
                    id,
                    mnemonic: phrase.to_string(),
                    address: discovery.address,
                    balance: discovery.balance,
                    chain: discovery.chain,
                    timestamp: chrono::Utc::now().timestamp_millis(),
                };
                debug!(
                    id,
                    chain = result.chain.symbol,
                    balance = result.balance,
                    "Simulated hit"
                );
                self.hits.record(result.clone());
                Some(result)
            }
            Outcome::Miss => None,
        };

        if let Err(e) = self.check_invariants() {
            self.halt(e.clone());
            return Err(e);
        }

        Ok(Some(TickReport { id, hit }))
    }

    /// Verify the counters agree with the collections
    pub fn check_invariants(&self) -> Result<(), EngineError> {
        if self.stats.found != self.hits.len() as u64 {
            return Err(EngineError::InvariantViolation(format!(
                "found counter {} does not match {} recorded hits",
                self.stats.found,
                self.hits.len()
            )));
        }
        if self.stats.found > self.stats.checked {
            return Err(EngineError::InvariantViolation(format!(
                "found counter {} exceeds checked counter {}",
                self.stats.found, self.stats.checked
            )));
        }
        if self.logs.len() > self.logs.capacity() {
            return Err(EngineError::InvariantViolation(format!(
                "log buffer holds {} entries, capacity is {}",
                self.logs.len(),
                self.logs.capacity()
            )));
        }
        Ok(())
    }

    /// Copy everything a front end renders
    pub fn snapshot(&self) -> ScanSnapshot {
        ScanSnapshot {
            state: self.state,
            stats: self.stats,
            logs: self.logs.to_vec(),
            hits: self.hits.to_vec(),
            total_balance: self.hits.total_balance(),
            fault: self.fault.as_ref().map(ToString::to_string),
        }
    }

    fn halt(&mut self, fault: EngineError) {
        error!(error = %fault, "Halting scan");
        self.state = EngineState::Paused;
        self.last_id += 1;
        self.logs.append(ScanLog {
            id: self.last_id,
            text: format!("Scan halted: {}", fault),
            kind: LogKind::Warning,
        });
        self.fault = Some(fault);
    }

    fn refuse_while_faulted(&self, command: &str) -> bool {
        if let Some(fault) = &self.fault {
            warn!(command, error = %fault, "Ignoring command until the session is stopped");
            return true;
        }
        false
    }
}

fn describe(id: u64, phrase: &Phrase, outcome: &Outcome) -> ScanLog {
    ScanLog {
        id,
        text: format!("Wallet check: {}", phrase),
        kind: if outcome.is_hit() {
            LogKind::Success
        } else {
            LogKind::Info
        },
    }
}
