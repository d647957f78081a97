//! Trade requests and sale records.
//!
//! A [`Trade`] lists the legs moving into and out of inventory. Each [`Leg`]
//! names either a SKU or cash. A [`SaleRecord`] is what a trade leaves behind
//! when it resolves as a sale instead of an exchange.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::CostLot;

/// Reserved marker identifying a cash leg in serialized trades.
pub const CASH_MARKER: &str = "$CASH";

/// Identifier of a fungible inventory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sku(pub u64);

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Sku {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// What a leg moves: units of a SKU, or cash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawAsset", into = "RawAsset")]
pub enum Asset {
    /// Units of an inventory item.
    Sku(Sku),
    /// A signed cash amount.
    Cash,
}

impl Asset {
    /// The SKU, if this is not cash.
    #[must_use]
    pub const fn sku(&self) -> Option<Sku> {
        match self {
            Self::Sku(sku) => Some(*sku),
            Self::Cash => None,
        }
    }
}

impl FromStr for Asset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == CASH_MARKER {
            return Ok(Self::Cash);
        }
        s.parse::<u64>()
            .map(|n| Self::Sku(Sku(n)))
            .map_err(|_| format!("unknown asset: {s} (expected a SKU number or {CASH_MARKER})"))
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sku(sku) => write!(f, "{sku}"),
            Self::Cash => write!(f, "{CASH_MARKER}"),
        }
    }
}

/// Wire form of [`Asset`]: an integer SKU or the cash marker string.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawAsset {
    Sku(u64),
    Marker(String),
}

impl TryFrom<RawAsset> for Asset {
    type Error = String;

    fn try_from(raw: RawAsset) -> Result<Self, Self::Error> {
        match raw {
            RawAsset::Sku(n) => Ok(Self::Sku(Sku(n))),
            RawAsset::Marker(s) => s.parse(),
        }
    }
}

impl From<Asset> for RawAsset {
    fn from(asset: Asset) -> Self {
        match asset {
            Asset::Sku(sku) => Self::Sku(sku.0),
            Asset::Cash => Self::Marker(CASH_MARKER.to_string()),
        }
    }
}

/// One side of a trade: units of an asset at a face price on a date.
///
/// For cash legs the quantity is conventionally 1 and the price is the signed
/// cash amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    /// The asset moved
    #[serde(rename = "SKU")]
    pub asset: Asset,
    /// Units moved
    #[serde(rename = "Quantity")]
    pub quantity: u64,
    /// Face price per unit (or the cash amount)
    #[serde(rename = "Price")]
    pub price: Decimal,
    /// Date of the leg
    #[serde(rename = "Date")]
    pub date: NaiveDate,
}

impl Leg {
    /// A leg moving units of a SKU.
    #[must_use]
    pub const fn units(sku: Sku, quantity: u64, price: Decimal, date: NaiveDate) -> Self {
        Self {
            asset: Asset::Sku(sku),
            quantity,
            price,
            date,
        }
    }

    /// A cash leg.
    #[must_use]
    pub const fn cash(amount: Decimal, date: NaiveDate) -> Self {
        Self {
            asset: Asset::Cash,
            quantity: 1,
            price: amount,
            date,
        }
    }

    /// Check if this leg moves cash.
    #[must_use]
    pub const fn is_cash(&self) -> bool {
        matches!(self.asset, Asset::Cash)
    }

    /// Face value of the leg: price times quantity.
    #[must_use]
    pub fn face_value(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x{} @ {} on {}",
            self.asset, self.quantity, self.price, self.date
        )
    }
}

/// A trade: legs received and legs given up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Legs entering inventory
    #[serde(rename = "In", default)]
    pub incoming: Vec<Leg>,
    /// Legs leaving inventory
    #[serde(rename = "Out", default)]
    pub outgoing: Vec<Leg>,
}

impl Trade {
    /// Create an empty trade.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an incoming leg.
    #[must_use]
    pub fn with_incoming(mut self, leg: Leg) -> Self {
        self.incoming.push(leg);
        self
    }

    /// Add an outgoing leg.
    #[must_use]
    pub fn with_outgoing(mut self, leg: Leg) -> Self {
        self.outgoing.push(leg);
        self
    }

    /// Every SKU named by any leg of the trade.
    #[must_use]
    pub fn skus(&self) -> BTreeSet<Sku> {
        self.incoming
            .iter()
            .chain(&self.outgoing)
            .filter_map(|leg| leg.asset.sku())
            .collect()
    }
}

/// Units of one SKU disposed of for cash, with the cost they carried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    /// The SKU sold
    #[serde(rename = "SKU")]
    pub sku: Sku,
    /// Lots consumed by the sale
    #[serde(rename = "Cost")]
    pub cost: Vec<CostLot>,
    /// Proceeds, as a single synthetic lot
    #[serde(rename = "Sale")]
    pub sale: Vec<CostLot>,
}

impl SaleRecord {
    /// Total proceeds allocated to the sale.
    ///
    /// The proceeds lot holds the whole allocated amount as its component,
    /// not a per-unit figure.
    #[must_use]
    pub fn proceeds(&self) -> Decimal {
        self.sale.iter().map(CostLot::unit_basis).sum()
    }

    /// Total basis of the consumed lots.
    #[must_use]
    pub fn basis(&self) -> Decimal {
        self.cost.iter().map(CostLot::product_basis).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_asset_from_str() {
        assert_eq!("$CASH".parse::<Asset>().unwrap(), Asset::Cash);
        assert_eq!("42".parse::<Asset>().unwrap(), Asset::Sku(Sku(42)));
        assert!("CASH".parse::<Asset>().is_err());
    }

    #[test]
    fn test_leg_json() {
        let leg: Leg = serde_json::from_str(
            r#"{"SKU": 7, "Quantity": 10, "Price": 5, "Date": "2020-02-01"}"#,
        )
        .unwrap();
        assert_eq!(leg, Leg::units(Sku(7), 10, dec!(5), date(2020, 2, 1)));

        let cash: Leg = serde_json::from_str(
            r#"{"SKU": "$CASH", "Quantity": 1, "Price": -12.5, "Date": "2020-02-01"}"#,
        )
        .unwrap();
        assert!(cash.is_cash());
        assert_eq!(cash.price, dec!(-12.5));
    }

    #[test]
    fn test_leg_json_rejects_unknown_marker() {
        let result: Result<Leg, _> = serde_json::from_str(
            r#"{"SKU": "USD", "Quantity": 1, "Price": 1, "Date": "2020-02-01"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_cash_serializes_as_marker() {
        let json = serde_json::to_value(Leg::cash(dec!(3), date(2020, 1, 1))).unwrap();
        assert_eq!(json["SKU"], "$CASH");
    }

    #[test]
    fn test_trade_skus() {
        let trade = Trade::new()
            .with_outgoing(Leg::units(Sku(3), 1, dec!(1), date(2020, 1, 1)))
            .with_outgoing(Leg::cash(dec!(-5), date(2020, 1, 1)))
            .with_incoming(Leg::units(Sku(9), 2, dec!(4), date(2020, 1, 1)))
            .with_incoming(Leg::units(Sku(3), 1, dec!(4), date(2020, 1, 1)));

        let skus: Vec<Sku> = trade.skus().into_iter().collect();
        assert_eq!(skus, vec![Sku(3), Sku(9)]);
    }

    #[test]
    fn test_sale_record_totals() {
        let record = SaleRecord {
            sku: Sku(1),
            cost: vec![
                CostLot::new(2).with_component(date(2020, 1, 1), dec!(-3)),
                CostLot::new(1).with_component(date(2020, 1, 2), dec!(-4)),
            ],
            sale: vec![CostLot::new(3).with_component(date(2020, 3, 1), dec!(15))],
        };
        assert_eq!(record.basis(), dec!(-10));
        assert_eq!(record.proceeds(), dec!(15));
    }
}
