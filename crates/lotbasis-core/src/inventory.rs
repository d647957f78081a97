//! Inventory of cost lots keyed by SKU.
//!
//! An [`Inventory`] holds, for every SKU, a queue of [`CostLot`]s ordered
//! oldest first. Units leave the inventory through [`Inventory::deplete`],
//! which consumes lots in FIFO order and hands back owned copies of what it
//! took.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use thiserror::Error;

use crate::{array_price_dates, average_cost, CostLot, DateMap, Sku};

/// Error that can occur when removing units from inventory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DepletionError {
    /// Not enough units held to satisfy the request.
    #[error("insufficient units of SKU {sku}: requested {requested}, available {available}")]
    InsufficientUnits {
        /// The SKU being depleted.
        sku: Sku,
        /// Units requested.
        requested: u64,
        /// Units held.
        available: u64,
    },
}

/// Lot queues per SKU, oldest lot first.
///
/// A SKU is present if and only if it holds at least one lot; depleting the
/// last lot removes the SKU.
///
/// # Examples
///
/// ```
/// use lotbasis_core::{CostLot, Inventory, Sku};
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let jan = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
/// let mut inv = Inventory::new();
/// inv.add(Sku(7), CostLot::new(3).with_component(jan, dec!(10)));
/// inv.add(Sku(7), CostLot::new(5).with_component(jan, dec!(20)));
///
/// let consumed = inv.deplete(Sku(7), 4).unwrap();
/// assert_eq!(consumed.len(), 2);
/// assert_eq!(inv.units(Sku(7)), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<Sku, VecDeque<CostLot>>",
    into = "BTreeMap<Sku, VecDeque<CostLot>>"
)]
pub struct Inventory {
    lots: BTreeMap<Sku, VecDeque<CostLot>>,
}

impl From<BTreeMap<Sku, VecDeque<CostLot>>> for Inventory {
    fn from(mut lots: BTreeMap<Sku, VecDeque<CostLot>>) -> Self {
        for queue in lots.values_mut() {
            queue.retain(|lot| !lot.is_empty());
        }
        lots.retain(|_, queue| !queue.is_empty());
        Self { lots }
    }
}

impl From<Inventory> for BTreeMap<Sku, VecDeque<CostLot>> {
    fn from(inventory: Inventory) -> Self {
        inventory.lots
    }
}

impl Inventory {
    /// Create an empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if no SKU is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    /// Number of SKUs held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lots.len()
    }

    /// Check whether a SKU is held.
    #[must_use]
    pub fn contains(&self, sku: Sku) -> bool {
        self.lots.contains_key(&sku)
    }

    /// All held SKUs in ascending order.
    pub fn skus(&self) -> impl Iterator<Item = Sku> + '_ {
        self.lots.keys().copied()
    }

    /// Lot queue for a SKU, oldest first.
    #[must_use]
    pub fn lots(&self, sku: Sku) -> Option<&VecDeque<CostLot>> {
        self.lots.get(&sku)
    }

    /// Iterate over every SKU with its lots.
    pub fn iter(&self) -> impl Iterator<Item = (Sku, &VecDeque<CostLot>)> {
        self.lots.iter().map(|(sku, queue)| (*sku, queue))
    }

    /// Total units held for a SKU.
    #[must_use]
    pub fn units(&self, sku: Sku) -> u64 {
        self.lots
            .get(&sku)
            .map_or(0, |queue| queue.iter().map(|lot| lot.quantity).sum())
    }

    /// Extended cost per date across all lots of a SKU.
    #[must_use]
    pub fn book_value(&self, sku: Sku) -> DateMap {
        self.lots
            .get(&sku)
            .map_or_else(DateMap::new, |queue| array_price_dates(queue))
    }

    /// Quantity-weighted average unit cost of a SKU, if any units are held.
    #[must_use]
    pub fn average_cost(&self, sku: Sku) -> Option<Decimal> {
        self.lots.get(&sku).and_then(|queue| average_cost(queue))
    }

    /// Append a lot at the back of a SKU's queue.
    ///
    /// Lots holding no units are ignored.
    pub fn add(&mut self, sku: Sku, lot: CostLot) {
        if lot.is_empty() {
            return;
        }
        self.lots.entry(sku).or_default().push_back(lot);
    }

    /// Remove `needed` units of a SKU, oldest lots first.
    ///
    /// Whole lots are popped while they fit; the last lot touched is split,
    /// leaving its remainder at the head of the queue. The consumed lots are
    /// returned as owned values in consumption order.
    ///
    /// Fails without modifying the inventory if fewer than `needed` units are
    /// held. Removing zero units always succeeds and changes nothing.
    pub fn deplete(&mut self, sku: Sku, needed: u64) -> Result<Vec<CostLot>, DepletionError> {
        if needed == 0 {
            return Ok(Vec::new());
        }

        let available = self.units(sku);
        let shortfall = DepletionError::InsufficientUnits {
            sku,
            requested: needed,
            available,
        };
        if available < needed {
            return Err(shortfall);
        }
        let queue = self.lots.get_mut(&sku).ok_or(shortfall)?;

        let mut consumed = Vec::new();
        let mut remaining = needed;
        while remaining > 0 {
            let Some(head) = queue.front_mut() else {
                break;
            };
            if head.quantity <= remaining {
                remaining -= head.quantity;
                if let Some(lot) = queue.pop_front() {
                    consumed.push(lot);
                }
            } else {
                head.quantity -= remaining;
                consumed.push(head.with_quantity(remaining));
                remaining = 0;
            }
        }

        if queue.is_empty() {
            self.lots.remove(&sku);
        }

        Ok(consumed)
    }

    /// Copy out the queues of the given SKUs into a separate inventory.
    ///
    /// Paired with [`Inventory::commit`] to apply a group of changes only once
    /// all of them have succeeded.
    #[must_use]
    pub fn stage(&self, skus: &BTreeSet<Sku>) -> Self {
        let lots = skus
            .iter()
            .filter_map(|sku| self.lots.get(sku).map(|queue| (*sku, queue.clone())))
            .collect();
        Self { lots }
    }

    /// Replace the queues of the given SKUs with those held by `staged`.
    ///
    /// A SKU listed in `skus` but absent from `staged` is removed.
    pub fn commit(&mut self, mut staged: Self, skus: &BTreeSet<Sku>) {
        for sku in skus {
            match staged.lots.remove(sku) {
                Some(queue) => {
                    self.lots.insert(*sku, queue);
                }
                None => {
                    self.lots.remove(sku);
                }
            }
        }
    }
}

impl fmt::Display for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "(empty)");
        }
        for (i, (sku, queue)) in self.lots.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{sku}:")?;
            for lot in queue {
                write!(f, " [{lot}]")?;
            }
        }
        Ok(())
    }
}
