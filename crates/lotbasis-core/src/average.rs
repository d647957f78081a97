//! Quantity and average cost across lots.

use rust_decimal::Decimal;

use crate::{CostLot, SaleRecord};

/// Total units across a list of lots.
#[must_use]
pub fn total_quantity<'a, I>(lots: I) -> u64
where
    I: IntoIterator<Item = &'a CostLot>,
{
    lots.into_iter().map(|lot| lot.quantity).sum()
}

/// Quantity-weighted average unit cost across a list of lots.
///
/// Returns `None` when the lots hold no units, since there is no meaningful
/// average. Callers must not treat that as a zero cost.
///
/// # Examples
///
/// ```
/// use lotbasis_core::{average_cost, CostLot};
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let jan = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
/// let lots = vec![
///     CostLot::new(2).with_component(jan, dec!(10)),
///     CostLot::new(3).with_component(jan, dec!(20)),
/// ];
/// assert_eq!(average_cost(&lots), Some(dec!(16)));
/// assert_eq!(average_cost(&Vec::<CostLot>::new()), None);
/// ```
#[must_use]
pub fn average_cost<'a, I>(lots: I) -> Option<Decimal>
where
    I: IntoIterator<Item = &'a CostLot>,
{
    let (total_cost, quantity) = lots
        .into_iter()
        .fold((Decimal::ZERO, 0u64), |(cost, quantity), lot| {
            (cost + lot.product_basis(), quantity + lot.quantity)
        });

    if quantity == 0 {
        None
    } else {
        Some(total_cost / Decimal::from(quantity))
    }
}

/// Realized profit or loss of a sale record.
///
/// The proceeds lot carries the total allocated proceeds as its component,
/// so its average is the whole amount received. Cost lots carry negative
/// basis, so profit is that amount plus the average cost scaled back up to
/// the units sold. Returns `None` when either side has no units.
#[must_use]
pub fn profit_or_loss(record: &SaleRecord) -> Option<Decimal> {
    let proceeds = average_cost(&record.sale)?;
    let cost = average_cost(&record.cost)?;
    Some(proceeds + cost * Decimal::from(total_quantity(&record.cost)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sku;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn lot(quantity: u64, cost: Decimal) -> CostLot {
        CostLot::new(quantity).with_component(date(2020, 1, 1), cost)
    }

    #[test]
    fn test_total_quantity() {
        let lots = vec![lot(2, dec!(1)), lot(0, dec!(1)), lot(5, dec!(1))];
        assert_eq!(total_quantity(&lots), 7);
        assert_eq!(total_quantity(&Vec::<CostLot>::new()), 0);
    }

    #[test]
    fn test_average_cost_weighted() {
        let lots = vec![lot(2, dec!(10)), lot(3, dec!(20))];
        assert_eq!(average_cost(&lots), Some(dec!(16)));
    }

    #[test]
    fn test_average_cost_multi_component() {
        let lots = vec![
            CostLot::new(1)
                .with_component(date(2020, 1, 1), dec!(4))
                .with_component(date(2020, 2, 1), dec!(2)),
            lot(1, dec!(2)),
        ];
        assert_eq!(average_cost(&lots), Some(dec!(4)));
    }

    #[test]
    fn test_average_cost_zero_quantity_is_none() {
        assert_eq!(average_cost(&Vec::<CostLot>::new()), None);
        assert_eq!(average_cost(&vec![lot(0, dec!(10))]), None);
    }

    #[test]
    fn test_profit_or_loss() {
        let record = SaleRecord {
            sku: Sku(1),
            cost: vec![lot(1, dec!(-5)), lot(1, dec!(-7))],
            sale: vec![CostLot::new(2).with_component(date(2020, 6, 1), dec!(20))],
        };
        // 20 + 2 * -6
        assert_eq!(profit_or_loss(&record), Some(dec!(8)));
    }

    #[test]
    fn test_profit_or_loss_undefined() {
        let record = SaleRecord {
            sku: Sku(1),
            cost: vec![],
            sale: vec![CostLot::new(2).with_component(date(2020, 6, 1), dec!(10))],
        };
        assert_eq!(profit_or_loss(&record), None);

        let no_sale = SaleRecord {
            sku: Sku(1),
            cost: vec![lot(1, dec!(-5))],
            sale: vec![],
        };
        assert_eq!(profit_or_loss(&no_sale), None);
    }
}
