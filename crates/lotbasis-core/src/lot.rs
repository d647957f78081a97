//! Cost lots and basis aggregation.
//!
//! A [`CostLot`] is a slice of inventory acquired at one or more dated cost
//! components. Each component is a per-unit contribution to the lot's basis;
//! a lot that has been carried through several exchanges accumulates one
//! component per acquisition date.
//!
//! The free functions in this module fold lots into [`DateMap`]s of
//! *extended* (quantity-scaled) cost, keyed by date.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Cost amounts keyed by the date they were incurred.
///
/// Sorted keys keep summation order reproducible.
pub type DateMap = BTreeMap<NaiveDate, Decimal>;

/// A quantity of units held at a per-unit cost made of dated components.
///
/// Serialized as a flat object: every date key maps to a per-unit cost and
/// the reserved `Quantity` key holds the unit count.
///
/// # Examples
///
/// ```
/// use lotbasis_core::CostLot;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let jan = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
/// let feb = NaiveDate::from_ymd_opt(2020, 2, 1).unwrap();
///
/// let lot = CostLot::new(10)
///     .with_component(jan, dec!(5))
///     .with_component(feb, dec!(2));
///
/// assert_eq!(lot.unit_basis(), dec!(7));
/// assert_eq!(lot.product_basis(), dec!(70));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostLot {
    /// Per-unit cost components by date
    #[serde(flatten)]
    pub components: DateMap,
    /// Number of units in the lot
    #[serde(rename = "Quantity")]
    pub quantity: u64,
}

impl CostLot {
    /// Create a lot with no cost components.
    #[must_use]
    pub fn new(quantity: u64) -> Self {
        Self {
            components: DateMap::new(),
            quantity,
        }
    }

    /// Create a lot from an existing set of components.
    #[must_use]
    pub const fn from_components(components: DateMap, quantity: u64) -> Self {
        Self {
            components,
            quantity,
        }
    }

    /// Add a per-unit cost component, accumulating onto an existing date.
    #[must_use]
    pub fn with_component(mut self, date: NaiveDate, per_unit: Decimal) -> Self {
        *self.components.entry(date).or_default() += per_unit;
        self
    }

    /// The synthetic lot standing in for a cash leg: one unit at `amount`.
    #[must_use]
    pub fn cash(date: NaiveDate, amount: Decimal) -> Self {
        Self::new(1).with_component(date, amount)
    }

    /// A lot carrying no basis, dated so its acquisition is still recorded.
    #[must_use]
    pub fn zero_cost(date: NaiveDate, quantity: u64) -> Self {
        Self::new(quantity).with_component(date, Decimal::ZERO)
    }

    /// Copy of this lot with the quantity replaced.
    #[must_use]
    pub fn with_quantity(&self, quantity: u64) -> Self {
        Self {
            components: self.components.clone(),
            quantity,
        }
    }

    /// Check whether the lot holds no units.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.quantity == 0
    }

    /// Total per-unit basis (sum of all components).
    #[must_use]
    pub fn unit_basis(&self) -> Decimal {
        total_unit_basis(&self.components)
    }

    /// Basis of the whole lot: per-unit basis times quantity.
    #[must_use]
    pub fn product_basis(&self) -> Decimal {
        self.unit_basis() * Decimal::from(self.quantity)
    }

    /// Components scaled by quantity, giving the lot's extended cost per date.
    #[must_use]
    pub fn extended_components(&self) -> DateMap {
        let quantity = Decimal::from(self.quantity);
        self.components
            .iter()
            .map(|(date, per_unit)| (*date, *per_unit * quantity))
            .collect()
    }
}

impl fmt::Display for CostLot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {{", self.quantity)?;
        for (i, (date, per_unit)) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{date}: {per_unit}")?;
        }
        write!(f, "}}")
    }
}

/// Sum of every component in a date map.
///
/// Applied to a lot's components this is the per-unit basis; applied to an
/// aggregated map it collapses extended cost to one scalar.
#[must_use]
pub fn total_unit_basis(components: &DateMap) -> Decimal {
    components.values().copied().sum()
}

/// Additive union of two date maps.
///
/// A date present on only one side keeps that side's value.
#[must_use]
pub fn join_price(mut first: DateMap, second: &DateMap) -> DateMap {
    for (date, amount) in second {
        *first.entry(*date).or_default() += *amount;
    }
    first
}

/// Extended cost per date across a list of lots.
#[must_use]
pub fn array_price_dates<'a, I>(lots: I) -> DateMap
where
    I: IntoIterator<Item = &'a CostLot>,
{
    lots.into_iter().fold(DateMap::new(), |total, lot| {
        join_price(total, &lot.extended_components())
    })
}
