//! Discovery store

use std::collections::VecDeque;

use serde::{Serialize, Serializer};
use seedscan_chains::Chain;

/// One simulated discovery, kept for the whole session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletScanResult {
    pub id: u64,
    pub mnemonic: String,
    pub address: String,
    pub balance: f64,
    #[serde(serialize_with = "chain_symbol")]
    pub chain: Chain,
    /// Unix time in milliseconds
    pub timestamp: i64,
}

fn chain_symbol<S: Serializer>(chain: &Chain, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(chain.symbol)
}

/// Unbounded discovery list, newest first
#[derive(Debug, Clone, Default)]
pub struct HitsStore {
    results: VecDeque<WalletScanResult>,
}

impl HitsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the front so the newest result comes first
    pub fn record(&mut self, result: WalletScanResult) {
        self.results.push_front(result);
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Results newest to oldest
    pub fn iter(&self) -> impl Iterator<Item = &WalletScanResult> {
        self.results.iter()
    }

    pub fn latest(&self) -> Option<&WalletScanResult> {
        self.results.front()
    }

    /// Sum of every recorded balance
    pub fn total_balance(&self) -> f64 {
        self.results.iter().map(|r| r.balance).sum()
    }

    pub fn to_vec(&self) -> Vec<WalletScanResult> {
        self.results.iter().cloned().collect()
    }
}
