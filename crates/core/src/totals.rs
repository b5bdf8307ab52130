//! Derived-view helpers over snapshots.
//!
//! Pure functions with no side effects, used identically by the cart-summary
//! and checkout surfaces so the two cannot diverge. Tax rate and flat
//! shipping are always caller-supplied (from configuration), never
//! hardcoded here.

use rust_decimal::Decimal;

use crate::collection::{Snapshot, sum_lines, sum_quantities};
use crate::types::Price;

/// Sum of quantities across all lines, saturating at `u32::MAX`.
#[must_use]
pub fn item_count(snapshot: &Snapshot) -> u32 {
    sum_quantities(snapshot.lines())
}

/// Sum of `unit_price * quantity` across all lines.
#[must_use]
pub fn subtotal(snapshot: &Snapshot) -> Price {
    sum_lines(snapshot.lines())
}

/// Tax charged on the subtotal at the given rate.
#[must_use]
pub fn tax(snapshot: &Snapshot, tax_rate: Decimal) -> Price {
    let subtotal = subtotal(snapshot);
    Price::new(subtotal.amount * tax_rate, subtotal.currency_code)
}

/// Grand total: `subtotal + shipping_flat + subtotal * tax_rate`.
#[must_use]
pub fn grand_total(snapshot: &Snapshot, shipping_flat: Decimal, tax_rate: Decimal) -> Price {
    let subtotal = subtotal(snapshot);
    Price::new(
        subtotal.amount + shipping_flat + subtotal.amount * tax_rate,
        subtotal.currency_code,
    )
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::collection::{Collection, MergePolicy};
    use crate::types::{CurrencyCode, Item, ItemId};

    fn snapshot_of(pairs: &[(i32, i64, u32)]) -> Snapshot {
        let collection = pairs.iter().fold(Collection::new(), |c, &(id, cents, qty)| {
            c.add(
                Item::new(
                    ItemId::new(id),
                    format!("Item {id}"),
                    Price::new(Decimal::new(cents, 2), CurrencyCode::USD),
                ),
                qty,
                MergePolicy::Sum,
            )
        });
        Snapshot::of(&collection)
    }

    #[test]
    fn count_and_subtotal_match_snapshot_aggregates() {
        let snapshot = snapshot_of(&[(1, 1000, 1), (2, 250, 4)]);
        assert_eq!(item_count(&snapshot), snapshot.item_count());
        assert_eq!(subtotal(&snapshot), snapshot.subtotal());
        assert_eq!(subtotal(&snapshot).amount, Decimal::new(2000, 2));
    }

    #[test]
    fn grand_total_is_decimal_exact() {
        // $29.99 * 3 = $89.97; 8% tax = $7.1976; + $10 shipping = $107.1676.
        // None of these survive binary floats intact.
        let snapshot = snapshot_of(&[(1, 2999, 3)]);
        let total = grand_total(&snapshot, Decimal::new(10, 0), Decimal::new(8, 2));
        assert_eq!(total.amount, Decimal::new(1_071_676, 4));
    }

    #[test]
    fn tax_and_shipping_come_from_the_caller() {
        let snapshot = snapshot_of(&[(1, 1000, 1)]);
        let free = grand_total(&snapshot, Decimal::ZERO, Decimal::ZERO);
        assert_eq!(free.amount, Decimal::new(1000, 2));

        let taxed = grand_total(&snapshot, Decimal::new(5, 0), Decimal::new(1, 1));
        assert_eq!(taxed.amount, Decimal::new(1600, 2));
    }

    #[test]
    fn empty_snapshot_totals_are_zero() {
        let snapshot = snapshot_of(&[]);
        assert_eq!(item_count(&snapshot), 0);
        assert_eq!(subtotal(&snapshot).amount, Decimal::ZERO);
        assert_eq!(tax(&snapshot, Decimal::new(8, 2)).amount, Decimal::ZERO);
    }
}
