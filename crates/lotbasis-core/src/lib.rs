//! Core types for lotbasis
//!
//! This crate provides the building blocks for tracking the acquisition cost
//! (basis) of SKU-identified units:
//!
//! - [`CostLot`] - Units held at a per-unit cost made of dated components
//! - [`Inventory`] - FIFO lot queues per [`Sku`], with depletion
//! - [`Trade`], [`Leg`] - Units and cash moving in and out of inventory
//! - [`SaleRecord`] - Units disposed of for cash, with their cost
//! - [`LedgerEvent`] - A trade tagged BUY, TRADE or SELL
//!
//! and the arithmetic over them: basis aggregation ([`total_unit_basis`],
//! [`join_price`], [`array_price_dates`]), averaging ([`total_quantity`],
//! [`average_cost`]) and realized profit ([`profit_or_loss`]).
//!
//! # Example
//!
//! ```
//! use lotbasis_core::{average_cost, CostLot, Inventory, Sku};
//! use rust_decimal_macros::dec;
//! use chrono::NaiveDate;
//!
//! let jan = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
//! let mut inv = Inventory::new();
//! inv.add(Sku(7), CostLot::new(3).with_component(jan, dec!(10)));
//! inv.add(Sku(7), CostLot::new(5).with_component(jan, dec!(20)));
//!
//! // Oldest lot goes first
//! let consumed = inv.deplete(Sku(7), 4).unwrap();
//! assert_eq!(consumed[0].quantity, 3);
//! assert_eq!(consumed[1].quantity, 1);
//! assert_eq!(average_cost(&consumed), Some(dec!(12.5)));
//! assert_eq!(inv.units(Sku(7)), 4);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod average;
pub mod inventory;
pub mod lot;
pub mod sequence;
pub mod trade;

pub use average::{average_cost, profit_or_loss, total_quantity};
pub use inventory::{DepletionError, Inventory};
pub use lot::{array_price_dates, join_price, total_unit_basis, CostLot, DateMap};
pub use sequence::{sequence_events, sort_events, EventKind, LedgerEvent};
pub use trade::{Asset, Leg, SaleRecord, Sku, Trade, CASH_MARKER};

// Re-export common external types
pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;
