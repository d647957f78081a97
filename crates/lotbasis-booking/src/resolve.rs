//! Trade resolution.
//!
//! Resolves one [`Trade`] against an [`Inventory`]: outgoing units are
//! removed FIFO, their realized basis is aggregated by date, and the trade is
//! settled either as a sale for cash or as an exchange that carries the
//! realized basis into the incoming units.

use chrono::NaiveDate;
use lotbasis_core::{
    array_price_dates, average_cost, total_quantity, total_unit_basis, Asset, CostLot, DateMap,
    DepletionError, Inventory, Leg, SaleRecord, Sku, Trade,
};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{CashDatePolicy, ResolverOptions};

/// Errors that can occur while resolving a trade.
///
/// A trade that fails leaves the inventory and sales untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TradeError {
    /// An outgoing leg asks for more units than are held.
    #[error(transparent)]
    Depletion(#[from] DepletionError),

    /// Incoming units have no face value to weight the basis allocation by.
    #[error("cannot allocate basis: incoming legs for SKU {} have zero total face value", join_skus(.skus))]
    ZeroNominalBasis {
        /// SKUs of the incoming legs.
        skus: Vec<Sku>,
    },

    /// Cash was received on more than one date.
    #[error("cash received on more than one date ({first} and {second})")]
    ConflictingCashDates {
        /// First cash date seen.
        first: NaiveDate,
        /// Conflicting cash date.
        second: NaiveDate,
    },

    /// A pro-rata share does not fit in a `Decimal`.
    #[error("pro-rata allocation of {amount} by {weight}/{total} overflows")]
    Overflow {
        /// Amount being split.
        amount: Decimal,
        /// Share weight.
        weight: Decimal,
        /// Sum of all weights.
        total: Decimal,
    },
}

fn join_skus(skus: &[Sku]) -> String {
    skus.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `amount * weight / total`, multiplying first for exactness and taking the
/// share first when the product overflows.
fn pro_rata(amount: Decimal, weight: Decimal, total: Decimal) -> Result<Decimal, TradeError> {
    amount
        .checked_mul(weight)
        .and_then(|product| product.checked_div(total))
        .or_else(|| {
            weight
                .checked_div(total)
                .and_then(|share| amount.checked_mul(share))
        })
        .map(|value| value.normalize())
        .ok_or(TradeError::Overflow {
            amount,
            weight,
            total,
        })
}

/// How a trade was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Cash received covered the realized basis; outgoing units were sold.
    DisguisedSale {
        /// Number of sale records produced.
        records: usize,
    },
    /// Basis was carried into the incoming units.
    LikeKind {
        /// Number of lots posted to inventory.
        lots: usize,
    },
}

/// Lots consumed for one SKU across a trade's outgoing legs.
struct SaleGroup {
    sku: Sku,
    date: NaiveDate,
    lots: Vec<CostLot>,
}

/// Cash and face value received by a trade.
struct IncomingSummary {
    cash: Decimal,
    cash_date: Option<NaiveDate>,
    nominal_basis: Decimal,
}

/// Resolve a trade with default options.
///
/// See [`process_trade_with_options`].
pub fn process_trade(
    trade: &Trade,
    inventory: &mut Inventory,
    sales: &mut Vec<SaleRecord>,
) -> Result<Resolution, TradeError> {
    process_trade_with_options(trade, inventory, sales, &ResolverOptions::default())
}

/// Resolve a trade against an inventory.
///
/// This function:
/// 1. Removes every outgoing SKU leg from inventory, oldest lots first
///    (outgoing cash joins as a one-unit lot)
/// 2. Sums the extended cost of everything given up, by date
/// 3. Totals incoming cash and the face value of incoming units
/// 4. If cash received is at least the realized basis, records a sale per
///    outgoing SKU and posts incoming units at zero cost
/// 5. Otherwise folds the cash into the realized basis and spreads it over
///    the incoming units in proportion to their face value
///
/// All changes are made on a staged copy of the touched SKUs and committed
/// only when the whole trade succeeds.
///
/// # Example
///
/// ```
/// use lotbasis_booking::{process_trade, Resolution};
/// use lotbasis_core::{CostLot, Inventory, Leg, Sku, Trade};
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let jan = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
/// let feb = NaiveDate::from_ymd_opt(2020, 2, 1).unwrap();
///
/// let mut inv = Inventory::new();
/// inv.add(Sku(7), CostLot::new(10).with_component(jan, dec!(5)));
/// let mut sales = Vec::new();
///
/// let trade = Trade::new()
///     .with_outgoing(Leg::units(Sku(7), 10, dec!(5), feb))
///     .with_incoming(Leg::units(Sku(8), 5, dec!(10), feb));
///
/// let resolution = process_trade(&trade, &mut inv, &mut sales).unwrap();
/// assert_eq!(resolution, Resolution::LikeKind { lots: 1 });
/// assert_eq!(inv.lots(Sku(8)).unwrap()[0].unit_basis(), dec!(10));
/// assert!(sales.is_empty());
/// ```
pub fn process_trade_with_options(
    trade: &Trade,
    inventory: &mut Inventory,
    sales: &mut Vec<SaleRecord>,
    options: &ResolverOptions,
) -> Result<Resolution, TradeError> {
    let touched = trade.skus();
    let mut staged = inventory.stage(&touched);

    let (realized, groups) = deplete_outgoing(&trade.outgoing, &mut staged)?;
    let realized_basis = array_price_dates(&realized);
    let incoming = summarize_incoming(&trade.incoming, options.cash_dates)?;

    let threshold = total_unit_basis(&realized_basis).abs();
    let mut records = Vec::new();
    let resolution = if incoming.cash >= threshold {
        debug!(
            cash = %incoming.cash,
            realized = %threshold,
            "cash covers realized basis; resolving as sale"
        );
        post_zero_cost(&trade.incoming, &incoming, &mut staged);
        records = allocate_proceeds(groups, &incoming)?;
        Resolution::DisguisedSale {
            records: records.len(),
        }
    } else {
        debug!(
            cash = %incoming.cash,
            realized = %threshold,
            "carrying realized basis into incoming units"
        );
        let lots = carry_basis(&trade.incoming, realized_basis, &incoming, &mut staged)?;
        Resolution::LikeKind { lots }
    };

    inventory.commit(staged, &touched);
    sales.extend(records);
    Ok(resolution)
}

/// Remove outgoing legs from inventory.
///
/// Returns every consumed lot (cash included) and the SKU lots grouped per
/// SKU in first-seen order.
fn deplete_outgoing(
    legs: &[Leg],
    inventory: &mut Inventory,
) -> Result<(Vec<CostLot>, Vec<SaleGroup>), TradeError> {
    let mut realized = Vec::new();
    let mut groups: Vec<SaleGroup> = Vec::new();

    for leg in legs {
        match leg.asset {
            Asset::Cash => realized.push(CostLot::cash(leg.date, leg.price)),
            Asset::Sku(sku) => {
                let consumed = inventory.deplete(sku, leg.quantity)?;
                for lot in &consumed {
                    trace!(%sku, %lot, "consumed");
                }
                realized.extend(consumed.iter().cloned());
                match groups.iter_mut().find(|g| g.sku == sku) {
                    Some(group) => group.lots.extend(consumed),
                    None => groups.push(SaleGroup {
                        sku,
                        date: leg.date,
                        lots: consumed,
                    }),
                }
            }
        }
    }

    Ok((realized, groups))
}

fn summarize_incoming(legs: &[Leg], policy: CashDatePolicy) -> Result<IncomingSummary, TradeError> {
    let mut summary = IncomingSummary {
        cash: Decimal::ZERO,
        cash_date: None,
        nominal_basis: Decimal::ZERO,
    };

    for leg in legs {
        if !leg.is_cash() {
            summary.nominal_basis += leg.face_value();
            continue;
        }
        summary.cash += leg.price;
        summary.cash_date = match (summary.cash_date, policy) {
            (Some(first), CashDatePolicy::Reject) if first != leg.date => {
                return Err(TradeError::ConflictingCashDates {
                    first,
                    second: leg.date,
                });
            }
            _ => Some(leg.date),
        };
    }

    Ok(summary)
}

/// Post incoming units at zero cost, dated on the cash leg.
fn post_zero_cost(legs: &[Leg], incoming: &IncomingSummary, inventory: &mut Inventory) {
    for leg in legs {
        if let Asset::Sku(sku) = leg.asset {
            let date = incoming.cash_date.unwrap_or(leg.date);
            inventory.add(sku, CostLot::zero_cost(date, leg.quantity));
        }
    }
}

/// Split incoming cash across the outgoing SKUs by their share of basis.
///
/// Falls back to each SKU's share of units when the groups carry no basis.
fn allocate_proceeds(
    groups: Vec<SaleGroup>,
    incoming: &IncomingSummary,
) -> Result<Vec<SaleRecord>, TradeError> {
    let weighed: Vec<(SaleGroup, u64, Decimal)> = groups
        .into_iter()
        .filter_map(|group| {
            let quantity = total_quantity(&group.lots);
            let average = average_cost(&group.lots)?;
            Some((group, quantity, average * Decimal::from(quantity)))
        })
        .collect();

    let total_basis: Decimal = weighed.iter().map(|(_, _, basis)| *basis).sum();
    let by_quantity = total_basis.is_zero();
    let total_weight = if by_quantity {
        Decimal::from(weighed.iter().map(|(_, quantity, _)| *quantity).sum::<u64>())
    } else {
        total_basis
    };

    weighed
        .into_iter()
        .map(|(group, quantity, basis)| {
            let weight = if by_quantity {
                Decimal::from(quantity)
            } else {
                basis
            };
            let proceeds = pro_rata(incoming.cash, weight, total_weight)?;
            let date = incoming.cash_date.unwrap_or(group.date);
            debug!(sku = %group.sku, units = quantity, %proceeds, "sale recorded");
            Ok(SaleRecord {
                sku: group.sku,
                cost: group.lots,
                sale: vec![CostLot::new(quantity).with_component(date, proceeds)],
            })
        })
        .collect()
}

/// Spread the realized basis (plus any cash received) over incoming units.
///
/// Returns the number of lots posted.
fn carry_basis(
    legs: &[Leg],
    mut basis: DateMap,
    incoming: &IncomingSummary,
    inventory: &mut Inventory,
) -> Result<usize, TradeError> {
    if let Some(date) = incoming.cash_date.filter(|_| !incoming.cash.is_zero()) {
        *basis.entry(date).or_default() += incoming.cash;
    }

    let units: Vec<(Sku, &Leg)> = legs
        .iter()
        .filter_map(|leg| leg.asset.sku().map(|sku| (sku, leg)))
        .collect();
    if units.is_empty() {
        return Ok(0);
    }
    if incoming.nominal_basis.is_zero() {
        return Err(TradeError::ZeroNominalBasis {
            skus: units.iter().map(|(sku, _)| *sku).collect(),
        });
    }

    let mut posted = 0;
    for (sku, leg) in &units {
        let components = basis
            .iter()
            .map(|(date, amount)| {
                let per_unit = pro_rata(*amount, leg.price, incoming.nominal_basis)?;
                Ok((*date, per_unit))
            })
            .collect::<Result<_, TradeError>>()?;
        if leg.quantity > 0 {
            posted += 1;
        }
        inventory.add(*sku, CostLot::from_components(components, leg.quantity));
    }

    Ok(posted)
}
