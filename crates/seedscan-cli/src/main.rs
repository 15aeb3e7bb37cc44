//! SeedScan CLI
//!
//! Terminal front end for the simulated phrase scanner. Every phrase, address
//! and balance shown is fabricated locally.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use seedscan_core::{
    all_chains, format_count, get_chain, Chain, EngineState, ScanConfig, ScanSession,
    ScanSnapshot, Scanner, Vocabulary, WalletScanResult,
};

#[derive(Parser)]
#[command(name = "seedscan")]
#[command(author = "SeedScan Team")]
#[command(version = "0.1.0")]
#[command(about = "Simulated recovery phrase scanning console", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a live scan controlled from stdin (start, pause, stop, quit)
    Scan {
        #[command(flatten)]
        engine: EngineArgs,

        /// Start immediately instead of waiting for a command
        #[arg(long)]
        autostart: bool,

        /// Scan for this many seconds, then exit (implies --autostart)
        #[arg(long)]
        duration: Option<u64>,

        /// Print the final snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a fixed number of ticks without a timer
    Simulate {
        #[command(flatten)]
        engine: EngineArgs,

        /// Number of ticks to run
        #[arg(short, long, default_value = "10000")]
        ticks: u64,

        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Print the final snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// List supported chains
    Chains,
}

#[derive(Args)]
struct EngineArgs {
    /// Comma-separated chain ids (default: all)
    #[arg(short, long, value_delimiter = ',')]
    chains: Vec<String>,

    /// Newline-separated word list (default: BIP39 English)
    #[arg(short, long)]
    wordlist: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Hit probability per tick
    #[arg(short, long)]
    probability: Option<f64>,

    /// Tick period in milliseconds
    #[arg(long)]
    period_ms: Option<u64>,

    /// Maximum lines kept in the live feed
    #[arg(long)]
    log_capacity: Option<usize>,
}

impl EngineArgs {
    fn scan_config(&self) -> Result<ScanConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ScanConfig::default(),
        };
        if let Some(p) = self.probability {
            config.hit_probability = p;
        }
        if let Some(ms) = self.period_ms {
            config.tick_period_ms = ms;
        }
        if let Some(cap) = self.log_capacity {
            config.log_capacity = cap;
        }
        config.validate()?;
        Ok(config)
    }

    fn vocabulary(&self) -> Result<Vocabulary> {
        match &self.wordlist {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Cannot open word list {}", path.display()))?;
                Ok(Vocabulary::from_reader(BufReader::new(file))?)
            }
            None => Ok(Vocabulary::english()),
        }
    }

    fn chains(&self) -> Result<Vec<Chain>> {
        if self.chains.is_empty() {
            return Ok(all_chains());
        }
        self.chains
            .iter()
            .map(|id| get_chain(id).ok_or_else(|| anyhow::anyhow!("Unknown chain: {}", id)))
            .collect()
    }

    fn session(&self, seed: Option<u64>) -> Result<ScanSession> {
        let config = self.scan_config()?;
        let vocabulary = self.vocabulary()?;
        let chains = self.chains()?;
        let session = match seed {
            Some(seed) => {
                ScanSession::with_rng(config, vocabulary, chains, StdRng::seed_from_u64(seed))?
            }
            None => ScanSession::new(config, vocabulary, chains)?,
        };
        Ok(session)
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            engine,
            autostart,
            duration,
            json,
        } => {
            cmd_scan(&engine, autostart, duration, json)?;
        }
        Commands::Simulate {
            engine,
            ticks,
            seed,
            json,
        } => {
            cmd_simulate(&engine, ticks, seed, json)?;
        }
        Commands::Chains => {
            cmd_chains();
        }
    }

    Ok(())
}

fn cmd_scan(
    engine: &EngineArgs,
    autostart: bool,
    duration: Option<u64>,
    json: bool,
) -> Result<()> {
    let session = engine.session(None)?;

    if !json {
        eprintln!("SeedScan v0.1.0 (simulation, no real wallets are checked)");
        eprintln!("Chains: {}", chain_list(session.chains()));
        eprintln!(
            "Hit probability: {}  Period: {}ms",
            session.config().hit_probability,
            session.config().tick_period_ms
        );
        eprintln!();
    }

    let scanner = Scanner::new(session);

    let last_shown = Arc::new(AtomicU64::new(0));
    scanner.on_change(move |snapshot| render(snapshot, &last_shown));

    match duration {
        Some(secs) => {
            scanner.start();
            thread::sleep(Duration::from_secs(secs));
            scanner.pause();
        }
        None => {
            if autostart {
                scanner.start();
            } else {
                eprintln!("Commands: start, pause, stop, quit");
            }
            run_console(&scanner)?;
        }
    }

    let snapshot = scanner.snapshot();
    eprintln!();
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_summary(&snapshot);
    }

    Ok(())
}

fn run_console(scanner: &Scanner) -> Result<()> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        match line?.trim().to_lowercase().as_str() {
            "start" => scanner.start(),
            "pause" | "resume" => scanner.pause(),
            "stop" => scanner.stop(),
            "quit" | "exit" => break,
            "" => {}
            other => eprintln!("\nUnknown command: {}", other),
        }
    }
    // Freeze the feed before the summary is printed
    if scanner.state().is_scanning() {
        scanner.pause();
    }
    Ok(())
}

fn cmd_simulate(engine: &EngineArgs, ticks: u64, seed: Option<u64>, json: bool) -> Result<()> {
    let mut session = engine.session(seed)?;
    session.start();
    for _ in 0..ticks {
        if let Some(hit) = session.tick()?.and_then(|report| report.hit) {
            if !json {
                print_hit(&hit);
            }
        }
    }

    let snapshot = session.snapshot();
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_summary(&snapshot);
    }
    Ok(())
}

fn cmd_chains() {
    println!("Supported Chains:");
    println!("{:-<48}", "");
    println!("{:<6} {:<18} {:<7} {:<5} {}", "Id", "Name", "Symbol", "Icon", "Color");
    println!("{:-<48}", "");

    for chain in all_chains() {
        println!(
            "{:<6} {:<18} {:<7} {:<5} {}",
            chain.id, chain.name, chain.symbol, chain.icon, chain.color
        );
    }
}

/// Hits in `snapshot` newer than any already shown, oldest first.
///
/// `last_shown` holds the id of the newest hit printed so far, so a
/// snapshot that arrives late never repeats lines.
fn unseen_hits<'a>(
    snapshot: &'a ScanSnapshot,
    last_shown: &AtomicU64,
) -> Vec<&'a WalletScanResult> {
    // tick ids restart with every session
    if snapshot.state == EngineState::Idle {
        last_shown.store(0, Ordering::Relaxed);
    }

    let newest = snapshot.hits.first().map_or(0, |h| h.id);
    let shown = last_shown.fetch_max(newest, Ordering::Relaxed);
    // hits are newest first
    snapshot.hits.iter().rev().filter(|h| h.id > shown).collect()
}

fn render(snapshot: &ScanSnapshot, last_shown: &AtomicU64) {
    let fresh = unseen_hits(snapshot, last_shown);
    if !fresh.is_empty() {
        eprintln!();
        for hit in fresh {
            print_hit(hit);
        }
    }

    let status = match snapshot.state {
        EngineState::Idle => "IDLE",
        EngineState::Scanning => "ACTIVE",
        EngineState::Paused => "PAUSED",
    };
    let latest = snapshot.logs.last().map(|l| l.text.as_str()).unwrap_or("");
    let now = chrono::Utc::now().timestamp_millis();
    eprint!(
        "\r\x1b[2K[{}]{} >>> {}",
        status,
        snapshot.stats.format(now),
        latest
    );
    let _ = io::stderr().flush();
}

fn print_hit(hit: &WalletScanResult) {
    let at = chrono::DateTime::from_timestamp_millis(hit.timestamp)
        .map(|t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
        .unwrap_or_default();
    println!(
        "[{}] SIMULATED {} - {:.2}$  {}  {}",
        at, hit.chain.symbol, hit.balance, hit.address, hit.mnemonic
    );
}

fn print_summary(snapshot: &ScanSnapshot) {
    println!("{:-<60}", "");
    println!("Checked:       {}", format_count(snapshot.stats.checked));
    println!("Found:         {}", snapshot.stats.found);
    println!("Total balance: {:.2}$ (simulated)", snapshot.total_balance);
    if let Some(fault) = &snapshot.fault {
        println!("Halted:        {}", fault);
    }
    println!("{:-<60}", "");
}

fn chain_list(chains: &[Chain]) -> String {
    chains
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn load_config(path: &Path) -> Result<ScanConfig> {
    let file =
        File::open(path).with_context(|| format!("Cannot open config {}", path.display()))?;
    let config = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Invalid config {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit_session() -> ScanSession {
        let config = ScanConfig {
            hit_probability: 1.0,
            ..Default::default()
        };
        let rng = StdRng::seed_from_u64(5);
        ScanSession::with_rng(config, Vocabulary::english(), all_chains(), rng).unwrap()
    }

    fn ids(hits: &[&WalletScanResult]) -> Vec<u64> {
        hits.iter().map(|h| h.id).collect()
    }

    #[test]
    fn test_unseen_hits_in_order() {
        let mut session = hit_session();
        session.start();
        for _ in 0..3 {
            session.tick().unwrap();
        }
        let last_shown = AtomicU64::new(0);

        let first = session.snapshot();
        assert_eq!(ids(&unseen_hits(&first, &last_shown)), vec![1, 2, 3]);

        session.tick().unwrap();
        let second = session.snapshot();
        assert_eq!(ids(&unseen_hits(&second, &last_shown)), vec![4]);
    }

    #[test]
    fn test_stale_snapshot_prints_nothing() {
        let mut session = hit_session();
        session.start();
        session.tick().unwrap();
        let stale = session.snapshot();
        session.tick().unwrap();
        session.tick().unwrap();
        let current = session.snapshot();

        let last_shown = AtomicU64::new(0);
        assert_eq!(ids(&unseen_hits(&current, &last_shown)), vec![1, 2, 3]);
        assert!(unseen_hits(&stale, &last_shown).is_empty());
        assert!(unseen_hits(&current, &last_shown).is_empty());
    }

    #[test]
    fn test_stop_resets_shown_hits() {
        let mut session = hit_session();
        session.start();
        session.tick().unwrap();
        let last_shown = AtomicU64::new(0);
        assert_eq!(unseen_hits(&session.snapshot(), &last_shown).len(), 1);

        session.stop();
        assert!(unseen_hits(&session.snapshot(), &last_shown).is_empty());

        session.start();
        session.tick().unwrap();
        assert_eq!(ids(&unseen_hits(&session.snapshot(), &last_shown)), vec![1]);
    }
}
