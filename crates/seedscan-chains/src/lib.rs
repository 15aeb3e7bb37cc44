//! SeedScan Chain Registry
//!
//! Static reference data for the networks a simulated discovery can be
//! attributed to.

mod chain;

pub use chain::Chain;

pub const BTC: Chain = Chain::new("btc", "Bitcoin", "BTC", "₿", "#f7931a");
pub const USDT: Chain = Chain::new("usdt", "Tether", "USDT", "₮", "#26a17b");
pub const ETH: Chain = Chain::new("eth", "Ethereum", "ETH", "Ξ", "#627eea");
pub const LTC: Chain = Chain::new("ltc", "Litecoin", "LTC", "Ł", "#bfbbbb");
pub const BNB: Chain = Chain::new("bnb", "BNB Smart Chain", "BNB", "◆", "#f3ba2f");
pub const SOL: Chain = Chain::new("sol", "Solana", "SOL", "◎", "#9945ff");
pub const TRX: Chain = Chain::new("trx", "TRON", "TRX", "♦", "#ff060a");

/// Get all supported chains, in display order
pub fn all_chains() -> Vec<Chain> {
    vec![BTC, USDT, ETH, LTC, BNB, SOL, TRX]
}

/// Get a chain by id or symbol (case insensitive)
pub fn get_chain(key: &str) -> Option<Chain> {
    match key.to_lowercase().as_str() {
        "btc" | "bitcoin" => Some(BTC),
        "usdt" | "tether" => Some(USDT),
        "eth" | "ethereum" => Some(ETH),
        "ltc" | "litecoin" => Some(LTC),
        "bnb" | "bsc" => Some(BNB),
        "sol" | "solana" => Some(SOL),
        "trx" | "tron" => Some(TRX),
        _ => None,
    }
}
