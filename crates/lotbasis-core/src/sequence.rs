//! Ordering of same-day ledger events.
//!
//! Within one date, purchases must land before the trades and sales that
//! draw on them. [`sequence_events`] moves buys to the front (most recently
//! listed first), then trades, then sells, each keeping its listed order.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::Trade;

/// Kind of ledger event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventKind {
    /// Units acquired, usually for cash.
    Buy,
    /// Units exchanged for other units and/or cash.
    Trade,
    /// Units disposed of for cash.
    Sell,
}

impl EventKind {
    /// Position of this kind within a day.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::Buy => 0,
            Self::Trade => 1,
            Self::Sell => 2,
        }
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BUY" => Ok(Self::Buy),
            "TRADE" => Ok(Self::Trade),
            "SELL" => Ok(Self::Sell),
            _ => Err(format!("unknown event type: {s}")),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Trade => write!(f, "TRADE"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// A trade tagged with the kind of event it records.
///
/// Serialized with the trade's `In`/`Out` legs alongside a `Type` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Kind of event
    #[serde(rename = "Type")]
    pub kind: EventKind,
    /// Legs of the event
    #[serde(flatten)]
    pub trade: Trade,
}

impl LedgerEvent {
    /// Create an event.
    #[must_use]
    pub const fn new(kind: EventKind, trade: Trade) -> Self {
        Self { kind, trade }
    }
}

/// Reorder one day's events: buys in reverse listed order, then trades, then
/// sells in listed order.
pub fn sequence_events(events: &mut [LedgerEvent]) {
    events.sort_by_key(|e| e.kind.priority());
    let buys = events
        .iter()
        .take_while(|e| e.kind == EventKind::Buy)
        .count();
    events[..buys].reverse();
}

/// Apply [`sequence_events`] to every date of a ledger.
pub fn sort_events(transactions: &mut BTreeMap<NaiveDate, Vec<LedgerEvent>>) {
    for events in transactions.values_mut() {
        sequence_events(events);
    }
}
