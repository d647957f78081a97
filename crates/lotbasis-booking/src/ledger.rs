//! Replay of a dated event stream against one inventory.

use chrono::NaiveDate;
use lotbasis_core::{
    profit_or_loss, sort_events, Decimal, EventKind, Inventory, LedgerEvent, SaleRecord,
};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::{process_trade_with_options, Resolution, ResolverOptions, TradeError};

/// An event that failed during replay.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} #{index} on {date}: {source}")]
pub struct ReplayError {
    /// Date of the failing event.
    pub date: NaiveDate,
    /// Position of the event within its date, after sequencing.
    pub index: usize,
    /// Kind of the failing event.
    pub kind: EventKind,
    /// The underlying failure.
    #[source]
    pub source: TradeError,
}

/// Inventory and sales built up by applying ledger events in order.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    inventory: Inventory,
    sales: Vec<SaleRecord>,
    options: ResolverOptions,
}

impl Ledger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing inventory.
    #[must_use]
    pub fn with_inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = inventory;
        self
    }

    /// Set resolution options.
    #[must_use]
    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Current inventory.
    #[must_use]
    pub const fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Sales recorded so far.
    #[must_use]
    pub fn sales(&self) -> &[SaleRecord] {
        &self.sales
    }

    /// Take the inventory and sales out of the ledger.
    #[must_use]
    pub fn into_parts(self) -> (Inventory, Vec<SaleRecord>) {
        (self.inventory, self.sales)
    }

    /// Resolve a single event.
    ///
    /// On failure the ledger is unchanged.
    pub fn apply(&mut self, event: &LedgerEvent) -> Result<Resolution, TradeError> {
        let resolution = process_trade_with_options(
            &event.trade,
            &mut self.inventory,
            &mut self.sales,
            &self.options,
        )?;
        debug!(kind = %event.kind, ?resolution, "event applied");
        Ok(resolution)
    }

    /// Sequence and apply every event, earliest date first.
    ///
    /// Within a date, buys go first (most recently listed first), then trades,
    /// then sells. Stops at the first failing event; events before it stay
    /// applied. Returns the number of events applied.
    pub fn replay(
        &mut self,
        mut transactions: BTreeMap<NaiveDate, Vec<LedgerEvent>>,
    ) -> Result<usize, ReplayError> {
        sort_events(&mut transactions);

        let mut applied = 0;
        for (date, events) in &transactions {
            info!(%date, events = events.len(), "replaying");
            for (index, event) in events.iter().enumerate() {
                self.apply(event).map_err(|source| ReplayError {
                    date: *date,
                    index,
                    kind: event.kind,
                    source,
                })?;
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Sum of realized profit or loss over every sale with units on both
    /// sides.
    #[must_use]
    pub fn total_profit_or_loss(&self) -> Decimal {
        self.sales.iter().filter_map(profit_or_loss).sum()
    }
}
