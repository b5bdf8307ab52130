//! End-to-end durability tests: a store's state survives process restarts
//! via its file slot, and a poisoned slot resets instead of failing.

use basket_core::{CurrencyCode, Item, ItemId, Operation, Price, totals};
use basket_store::{CollectionStore, JsonFileSlot};
use rust_decimal::Decimal;
use tempfile::TempDir;

fn item(id: i32, cents: i64) -> Item {
    Item::new(
        ItemId::new(id),
        format!("Item {id}"),
        Price::new(Decimal::new(cents, 2), CurrencyCode::USD),
    )
}

#[test]
fn cart_state_survives_a_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cart.json");

    {
        let store = CollectionStore::cart(Box::new(JsonFileSlot::new(path.clone())));
        store.initialize();
        store.dispatch(Operation::Add {
            item: item(1, 2999),
            quantity: 2,
        });
        store.dispatch(Operation::Add {
            item: item(2, 500),
            quantity: 1,
        });
    }

    // "Restart": a fresh store over the same slot.
    let store = CollectionStore::cart(Box::new(JsonFileSlot::new(path)));
    store.initialize();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.item_count(), 3);
    assert_eq!(
        totals::subtotal(&snapshot).amount,
        Decimal::new(6498, 2)
    );
}

#[test]
fn a_poisoned_slot_resets_to_empty_on_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cart.json");
    std::fs::write(&path, "not json").unwrap();

    let store = CollectionStore::cart(Box::new(JsonFileSlot::new(path)));
    store.initialize();
    assert!(store.snapshot().is_empty());

    // The reset store is fully usable.
    let snapshot = store.dispatch(Operation::Add {
        item: item(1, 100),
        quantity: 1,
    });
    assert_eq!(snapshot.item_count(), 1);
}

#[test]
fn wishlist_membership_survives_a_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wishlist.json");

    {
        let store = CollectionStore::wishlist(Box::new(JsonFileSlot::new(path.clone())));
        store.initialize();
        store.dispatch(Operation::Toggle(item(7, 1500)));
    }

    let store = CollectionStore::wishlist(Box::new(JsonFileSlot::new(path)));
    store.initialize();
    assert!(store.snapshot().contains(ItemId::new(7)));

    store.dispatch(Operation::Toggle(item(7, 1500)));
    assert!(store.snapshot().is_empty());
}

#[test]
fn clearing_the_cart_deletes_the_slot_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cart.json");

    let store = CollectionStore::cart(Box::new(JsonFileSlot::new(path.clone())));
    store.initialize();
    store.dispatch(Operation::Add {
        item: item(1, 100),
        quantity: 1,
    });
    assert!(path.exists());

    store.dispatch(Operation::Clear);
    assert!(!path.exists());
}
