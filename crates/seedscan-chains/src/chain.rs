//! Chain reference type

use serde::Serialize;
use std::fmt;

/// A supported asset network, used for display and for attributing discoveries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Chain {
    /// Lowercase identifier (e.g., "btc")
    pub id: &'static str,
    /// Full network name
    pub name: &'static str,
    /// Ticker symbol shown next to balances (e.g., "BTC")
    pub symbol: &'static str,
    /// Single glyph used as the chain's icon
    pub icon: &'static str,
    /// Display color as `#rrggbb`
    pub color: &'static str,
}

impl Chain {
    pub const fn new(
        id: &'static str,
        name: &'static str,
        symbol: &'static str,
        icon: &'static str,
        color: &'static str,
    ) -> Self {
        Self {
            id,
            name,
            symbol,
            icon,
            color,
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.symbol)
    }
}
