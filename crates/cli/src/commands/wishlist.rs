//! Wishlist commands.

use basket_core::{ItemId, Operation, Snapshot};
use basket_store::{BasketConfig, CollectionStore, JsonFileSlot, ShopClient};

use super::CommandError;
use crate::WishlistAction;

pub async fn run(config: &BasketConfig, action: WishlistAction) -> Result<(), CommandError> {
    let store = CollectionStore::wishlist(Box::new(JsonFileSlot::new(config.wishlist_slot_path())));
    store.initialize();

    match action {
        WishlistAction::Show => print_wishlist(&store.snapshot()),
        WishlistAction::Toggle { id } => {
            let id = ItemId::new(id);
            let snapshot = if store.snapshot().contains(id) {
                // Removal needs no catalog round trip.
                store.dispatch(Operation::Remove(id))
            } else {
                let client = ShopClient::new(config.api_url.clone());
                let item = client.fetch_item(id).await?;
                store.dispatch(Operation::Toggle(item))
            };
            print_wishlist(&snapshot);
        }
        WishlistAction::Clear => {
            store.dispatch(Operation::Clear);
            print_cleared();
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_cleared() {
    println!("Wishlist cleared");
}

#[allow(clippy::print_stdout)]
fn print_wishlist(snapshot: &Snapshot) {
    if snapshot.is_empty() {
        println!("Your wishlist is empty");
        return;
    }
    for line in snapshot.lines() {
        println!(
            "{:>4}  {:<32} {:>10}",
            line.item.id,
            line.item.name,
            line.item.unit_price.display(),
        );
    }
    println!("      {} items", snapshot.lines().len());
}
