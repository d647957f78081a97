//! Trade resolution engine for lotbasis.
//!
//! This crate provides:
//! - Trade resolution ([`process_trade`]): FIFO disposal of outgoing units,
//!   basis carry-forward into incoming units, and disguised-sale detection
//! - Ledger replay ([`Ledger`]): sequencing and resolving a dated stream of
//!   BUY / TRADE / SELL events against one inventory
//!
//! # Disguised sales
//!
//! A trade that hands over units and receives cash is treated as a sale when
//! the cash received is at least the basis of what was given up. Otherwise
//! the cash is folded into the basis carried by the incoming units.
//!
//! ```ignore
//! use lotbasis_booking::process_trade;
//!
//! // 2 units held at -5 each, traded away for 10 cash:
//! // cash (10) >= |realized basis| (10), so one SaleRecord is produced.
//! let resolution = process_trade(&trade, &mut inventory, &mut sales)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod ledger;
mod resolve;

pub use ledger::{Ledger, ReplayError};
pub use resolve::{process_trade, process_trade_with_options, Resolution, TradeError};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What to do when a trade receives cash on more than one date.
///
/// The realized basis map can only absorb cash under one date, so legs on
/// different dates are ambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CashDatePolicy {
    /// Fail the trade.
    #[default]
    Reject,
    /// Sum all cash and file it under the last date seen.
    LastWins,
}

impl FromStr for CashDatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "REJECT" => Ok(Self::Reject),
            "LAST_WINS" => Ok(Self::LastWins),
            _ => Err(format!("unknown cash date policy: {s}")),
        }
    }
}

impl fmt::Display for CashDatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => write!(f, "REJECT"),
            Self::LastWins => write!(f, "LAST_WINS"),
        }
    }
}

/// Trade resolution options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverOptions {
    /// Handling of cash received on several dates.
    pub cash_dates: CashDatePolicy,
}

impl ResolverOptions {
    /// Create options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cash date policy.
    #[must_use]
    pub const fn with_cash_dates(mut self, policy: CashDatePolicy) -> Self {
        self.cash_dates = policy;
        self
    }
}
