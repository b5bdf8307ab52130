//! The line-item collection engine.
//!
//! A [`Collection`] is an ordered sequence of line items keyed by item id.
//! Insertion order is preserved for display but carries no semantic weight.
//! Every operation is pure: it takes `&self` and returns a new collection,
//! so callers only ever observe fully-applied states.
//!
//! Invariants, enforced by construction:
//! - At most one line item per distinct item id
//! - `quantity >= 1` for every present line; an operation that would drop a
//!   quantity to zero removes the line instead
//! - `quantity <= stock_limit` whenever the line's item defines a limit;
//!   exceeding the limit saturates rather than erroring, since stock can
//!   change between catalog fetch and collection mutation

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::{CurrencyCode, Item, ItemId, LineItem, Price};

/// How a second insertion of an already-present item id merges with the
/// existing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Sum quantities into the existing line (cart behavior).
    #[default]
    Sum,
    /// Presence only (wishlist behavior): quantities are fixed at 1 and
    /// re-adding an item is a no-op.
    Presence,
}

/// A single mutation accepted by [`Collection::apply`] and the store's
/// dispatch path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Insert an item, merging with an existing line per the policy.
    /// A zero quantity is normalized to 1.
    Add { item: Item, quantity: u32 },
    /// Drop the line for an id. No-op if the id is absent.
    Remove(ItemId),
    /// Replace a line's quantity. Zero removes the line; no-op if absent.
    SetQuantity { id: ItemId, quantity: u32 },
    /// Remove the item if present, insert it otherwise.
    Toggle(Item),
    /// Empty the collection.
    Clear,
}

/// Clamp a quantity into `[1, stock_limit]`.
///
/// A zero stock limit still admits one unit; gating sold-out items is the
/// catalog surface's concern, not the engine's.
const fn clamp_quantity(quantity: u32, stock_limit: Option<u32>) -> u32 {
    let quantity = if quantity == 0 { 1 } else { quantity };
    match stock_limit {
        Some(limit) => {
            let limit = if limit == 0 { 1 } else { limit };
            if quantity > limit { limit } else { quantity }
        }
        None => quantity,
    }
}

/// An ordered sequence of line items, at most one per item id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection {
    lines: Vec<LineItem>,
}

impl Collection {
    /// The empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a collection from existing lines.
    ///
    /// Lines are folded through [`Collection::add`] with the summing policy,
    /// so duplicate ids merge and quantities are normalized. Used when
    /// hydrating from a durable slot.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = LineItem>) -> Self {
        lines.into_iter().fold(Self::new(), |collection, line| {
            collection.add(line.item, line.quantity, MergePolicy::Sum)
        })
    }

    /// The lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Number of distinct lines (not the summed quantity).
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the collection has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether a line for `id` is present.
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.lines.iter().any(|line| line.item.id == id)
    }

    /// The line for `id`, if present.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&LineItem> {
        self.lines.iter().find(|line| line.item.id == id)
    }

    /// Insert `item`, merging with an existing line per `policy`.
    ///
    /// On a merge the existing line's item snapshot is kept: the price and
    /// stock limit recorded at first insertion win over whatever the caller
    /// fetched since. A zero `quantity` is normalized to 1.
    #[must_use]
    pub fn add(&self, item: Item, quantity: u32, policy: MergePolicy) -> Self {
        let mut lines = self.lines.clone();
        if let Some(line) = lines.iter_mut().find(|line| line.item.id == item.id) {
            if policy == MergePolicy::Sum {
                line.quantity = clamp_quantity(
                    line.quantity.saturating_add(quantity.max(1)),
                    line.item.stock_limit,
                );
            }
        } else {
            let quantity = match policy {
                MergePolicy::Sum => clamp_quantity(quantity, item.stock_limit),
                MergePolicy::Presence => 1,
            };
            lines.push(LineItem { item, quantity });
        }
        Self { lines }
    }

    /// Drop the line for `id`. Returns an equal collection if absent.
    #[must_use]
    pub fn remove(&self, id: ItemId) -> Self {
        Self {
            lines: self
                .lines
                .iter()
                .filter(|line| line.item.id != id)
                .cloned()
                .collect(),
        }
    }

    /// Replace the quantity of the line for `id`.
    ///
    /// Zero removes the line; otherwise the quantity is clamped to the
    /// line's stock limit. No-op if `id` is absent.
    #[must_use]
    pub fn set_quantity(&self, id: ItemId, quantity: u32) -> Self {
        if quantity == 0 {
            return self.remove(id);
        }
        let mut lines = self.lines.clone();
        if let Some(line) = lines.iter_mut().find(|line| line.item.id == id) {
            line.quantity = clamp_quantity(quantity, line.item.stock_limit);
        }
        Self { lines }
    }

    /// Remove `item` if present, insert it otherwise.
    #[must_use]
    pub fn toggle(&self, item: Item, policy: MergePolicy) -> Self {
        if self.contains(item.id) {
            self.remove(item.id)
        } else {
            self.add(item, 1, policy)
        }
    }

    /// The empty collection.
    #[must_use]
    pub fn clear(&self) -> Self {
        Self::new()
    }

    /// Apply one [`Operation`].
    #[must_use]
    pub fn apply(&self, operation: &Operation, policy: MergePolicy) -> Self {
        match operation {
            Operation::Add { item, quantity } => self.add(item.clone(), *quantity, policy),
            Operation::Remove(id) => self.remove(*id),
            Operation::SetQuantity { id, quantity } => self.set_quantity(*id, *quantity),
            Operation::Toggle(item) => self.toggle(item.clone(), policy),
            Operation::Clear => self.clear(),
        }
    }
}

/// Sum of all line quantities. Per-line quantities already saturate, so the
/// cross-line sum saturates too instead of overflowing.
pub(crate) fn sum_quantities(lines: &[LineItem]) -> u32 {
    lines
        .iter()
        .fold(0u32, |total, line| total.saturating_add(line.quantity))
}

/// Sum of all line totals. Currency is taken from the first line; an empty
/// slice yields zero in the default currency.
pub(crate) fn sum_lines(lines: &[LineItem]) -> Price {
    let currency = lines
        .first()
        .map_or_else(CurrencyCode::default, |line| {
            line.item.unit_price.currency_code
        });
    let amount = lines
        .iter()
        .map(|line| line.line_total().amount)
        .sum();
    Price::new(amount, currency)
}

/// An immutable point-in-time view of a collection plus its derived totals.
///
/// Snapshots are what observers and persistence see. They are never mutated
/// in place, only replaced; the line slice is shared, so cloning a snapshot
/// is cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    lines: Arc<[LineItem]>,
    item_count: u32,
    subtotal: Price,
}

impl Snapshot {
    /// Take a snapshot of a collection, computing its aggregates.
    #[must_use]
    pub fn of(collection: &Collection) -> Self {
        let lines = collection.lines();
        Self {
            item_count: sum_quantities(lines),
            subtotal: sum_lines(lines),
            lines: lines.into(),
        }
    }

    /// The lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub const fn item_count(&self) -> u32 {
        self.item_count
    }

    /// Sum of `unit_price * quantity` across all lines.
    #[must_use]
    pub const fn subtotal(&self) -> Price {
        self.subtotal
    }

    /// Whether the snapshot has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether a line for `id` is present.
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.lines.iter().any(|line| line.item.id == id)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    use super::*;

    fn item(id: i32, price_cents: i64) -> Item {
        Item::new(
            ItemId::new(id),
            format!("Item {id}"),
            Price::new(Decimal::new(price_cents, 2), CurrencyCode::USD),
        )
    }

    #[test]
    fn add_merges_duplicate_ids_by_summing() {
        let collection = Collection::new()
            .add(item(1, 1000), 1, MergePolicy::Sum)
            .add(item(1, 1000), 2, MergePolicy::Sum);

        assert_eq!(collection.len(), 1);
        assert_eq!(collection.get(ItemId::new(1)).map(|l| l.quantity), Some(3));

        let snapshot = Snapshot::of(&collection);
        assert_eq!(snapshot.subtotal().amount, Decimal::new(3000, 2));
    }

    #[test]
    fn merge_is_equivalent_to_a_single_add() {
        let split = Collection::new()
            .add(item(1, 500), 2, MergePolicy::Sum)
            .add(item(1, 500), 3, MergePolicy::Sum);
        let single = Collection::new().add(item(1, 500), 5, MergePolicy::Sum);
        assert_eq!(split, single);
    }

    #[test]
    fn merge_keeps_the_original_item_snapshot() {
        // The price recorded at first insertion wins over a later fetch.
        let collection = Collection::new()
            .add(item(1, 1000), 1, MergePolicy::Sum)
            .add(item(1, 9999), 1, MergePolicy::Sum);

        let line = collection.get(ItemId::new(1)).unwrap();
        assert_eq!(line.item.unit_price.amount, Decimal::new(1000, 2));
        assert_eq!(line.quantity, 2);
    }

    #[test]
    fn add_saturates_at_the_stock_limit() {
        let limited = item(1, 1000).with_stock_limit(3);
        let collection = Collection::new()
            .add(limited.clone(), 2, MergePolicy::Sum)
            .add(limited, 5, MergePolicy::Sum);
        assert_eq!(collection.get(ItemId::new(1)).map(|l| l.quantity), Some(3));
    }

    #[test]
    fn add_normalizes_zero_quantity_to_one() {
        let collection = Collection::new().add(item(1, 1000), 0, MergePolicy::Sum);
        assert_eq!(collection.get(ItemId::new(1)).map(|l| l.quantity), Some(1));
    }

    #[test]
    fn presence_policy_makes_add_idempotent() {
        let collection = Collection::new()
            .add(item(1, 1000), 4, MergePolicy::Presence)
            .add(item(1, 1000), 4, MergePolicy::Presence);

        assert_eq!(collection.len(), 1);
        assert_eq!(collection.get(ItemId::new(1)).map(|l| l.quantity), Some(1));
    }

    #[test]
    fn remove_leaves_other_lines_alone() {
        let collection = Collection::new()
            .add(item(1, 1000), 1, MergePolicy::Sum)
            .add(item(2, 2000), 1, MergePolicy::Sum)
            .remove(ItemId::new(1));

        assert_eq!(collection.len(), 1);
        assert!(!collection.contains(ItemId::new(1)));
        assert!(collection.contains(ItemId::new(2)));
    }

    #[test]
    fn remove_of_an_absent_id_is_a_no_op() {
        let collection = Collection::new().add(item(1, 1000), 1, MergePolicy::Sum);
        assert_eq!(collection.remove(ItemId::new(99)), collection);
    }

    #[test]
    fn set_quantity_zero_removes_the_line() {
        let collection = Collection::new()
            .add(item(1, 1000), 3, MergePolicy::Sum)
            .set_quantity(ItemId::new(1), 0);
        assert!(!collection.contains(ItemId::new(1)));
    }

    #[test]
    fn set_quantity_on_an_absent_id_is_a_no_op() {
        let collection = Collection::new().add(item(1, 1000), 1, MergePolicy::Sum);
        assert_eq!(collection.set_quantity(ItemId::new(99), 5), collection);
    }

    #[test]
    fn set_quantity_clamps_to_the_stock_limit() {
        let collection = Collection::new()
            .add(item(1, 1000).with_stock_limit(4), 1, MergePolicy::Sum)
            .set_quantity(ItemId::new(1), 10);
        assert_eq!(collection.get(ItemId::new(1)).map(|l| l.quantity), Some(4));
    }

    #[test]
    fn toggle_flips_membership() {
        let collection = Collection::new().toggle(item(1, 1000), MergePolicy::Presence);
        assert!(collection.contains(ItemId::new(1)));

        let collection = collection.toggle(item(1, 1000), MergePolicy::Presence);
        assert!(!collection.contains(ItemId::new(1)));
    }

    #[test]
    fn clear_empties_the_collection() {
        let collection = Collection::new()
            .add(item(1, 1000), 1, MergePolicy::Sum)
            .add(item(2, 2000), 1, MergePolicy::Sum)
            .clear();
        assert!(collection.is_empty());
    }

    #[test]
    fn from_lines_merges_duplicates_defensively() {
        let a = LineItem {
            item: item(1, 1000),
            quantity: 2,
        };
        let b = LineItem {
            item: item(1, 1000),
            quantity: 3,
        };
        let collection = Collection::from_lines([a, b]);
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.get(ItemId::new(1)).map(|l| l.quantity), Some(5));
    }

    #[test]
    fn snapshot_aggregates_match_the_lines() {
        let collection = Collection::new()
            .add(item(1, 1000), 1, MergePolicy::Sum)
            .add(item(1, 1000), 2, MergePolicy::Sum);

        let snapshot = Snapshot::of(&collection);
        assert_eq!(snapshot.item_count(), 3);
        assert_eq!(snapshot.subtotal().amount, Decimal::new(3000, 2));
        assert_eq!(snapshot.lines().len(), 1);
    }

    #[test]
    fn item_count_saturates_instead_of_overflowing() {
        // Unbounded lines can each carry quantities up to u32::MAX; their
        // sum must clamp, not wrap or panic.
        let collection = Collection::new()
            .add(item(1, 100), u32::MAX, MergePolicy::Sum)
            .add(item(2, 100), 2, MergePolicy::Sum);

        let snapshot = Snapshot::of(&collection);
        assert_eq!(snapshot.item_count(), u32::MAX);
        assert_eq!(crate::totals::item_count(&snapshot), u32::MAX);
    }

    #[test]
    fn empty_snapshot_has_zero_aggregates() {
        let snapshot = Snapshot::of(&Collection::new());
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.item_count(), 0);
        assert_eq!(snapshot.subtotal().amount, Decimal::ZERO);
    }

    // ------------------------------------------------------------------
    // Property tests: the invariants hold for every reachable collection.
    // ------------------------------------------------------------------

    fn arb_item() -> impl Strategy<Value = Item> {
        (1i32..6, 0i64..10_000, 0u32..5).prop_map(|(id, cents, limit)| {
            let item = item(id, cents);
            if limit == 0 {
                item
            } else {
                item.with_stock_limit(limit)
            }
        })
    }

    fn arb_operation() -> impl Strategy<Value = Operation> {
        prop_oneof![
            (arb_item(), 0u32..6).prop_map(|(item, quantity)| Operation::Add { item, quantity }),
            (1i32..6).prop_map(|id| Operation::Remove(ItemId::new(id))),
            (1i32..6, 0u32..8).prop_map(|(id, quantity)| Operation::SetQuantity {
                id: ItemId::new(id),
                quantity,
            }),
            arb_item().prop_map(Operation::Toggle),
            Just(Operation::Clear),
        ]
    }

    proptest! {
        #[test]
        fn every_reachable_collection_upholds_the_invariants(
            operations in proptest::collection::vec(arb_operation(), 0..40),
            sum_policy in proptest::bool::ANY,
        ) {
            let policy = if sum_policy { MergePolicy::Sum } else { MergePolicy::Presence };
            let mut collection = Collection::new();
            for operation in &operations {
                collection = collection.apply(operation, policy);

                let mut seen = std::collections::HashSet::new();
                for line in collection.lines() {
                    prop_assert!(seen.insert(line.item.id), "duplicate id {:?}", line.item.id);
                    prop_assert!(line.quantity >= 1);
                    if let Some(limit) = line.item.stock_limit {
                        prop_assert!(line.quantity <= limit.max(1));
                    }
                }

                let snapshot = Snapshot::of(&collection);
                let quantity_sum: u32 = collection.lines().iter().map(|l| l.quantity).sum();
                prop_assert_eq!(snapshot.item_count(), quantity_sum);
                let expected_subtotal: Decimal = collection
                    .lines()
                    .iter()
                    .map(|l| l.line_total().amount)
                    .sum();
                prop_assert_eq!(snapshot.subtotal().amount, expected_subtotal);
            }
        }
    }
}
