//! Cart commands.

use basket_core::{ItemId, Operation, Snapshot, totals};
use basket_store::{BasketConfig, CollectionStore, JsonFileSlot, ShippingAddress, ShopClient};

use super::CommandError;
use crate::CartAction;

pub async fn run(config: &BasketConfig, action: CartAction) -> Result<(), CommandError> {
    let store = CollectionStore::cart(Box::new(JsonFileSlot::new(config.cart_slot_path())));
    store.initialize();

    match action {
        CartAction::Show => print_cart(&store.snapshot(), config),
        CartAction::Add { id, quantity } => {
            let client = ShopClient::new(config.api_url.clone());
            let item = client.fetch_item(ItemId::new(id)).await?;
            let snapshot = store.dispatch(Operation::Add { item, quantity });
            print_cart(&snapshot, config);
        }
        CartAction::Remove { id } => {
            let snapshot = store.dispatch(Operation::Remove(ItemId::new(id)));
            print_cart(&snapshot, config);
        }
        CartAction::Set { id, quantity } => {
            let snapshot = store.dispatch(Operation::SetQuantity {
                id: ItemId::new(id),
                quantity,
            });
            print_cart(&snapshot, config);
        }
        CartAction::Clear => {
            store.dispatch(Operation::Clear);
            print_line("Cart cleared");
        }
        CartAction::Checkout {
            street,
            city,
            state,
            zip,
            country,
        } => {
            let snapshot = store.snapshot();
            if snapshot.is_empty() {
                return Err(CommandError::EmptyCart);
            }

            let client = ShopClient::new(config.api_url.clone());
            let shipping = ShippingAddress {
                street,
                city,
                state,
                zip_code: zip,
                country,
            };
            let order = client
                .submit_order(
                    &snapshot,
                    shipping,
                    "Credit Card",
                    config.tax_rate,
                    config.shipping_flat,
                    None,
                )
                .await?;

            // Order placement never clears the cart by itself; that is this
            // caller's explicit step.
            store.dispatch(Operation::Clear);
            print_line(&format!(
                "Order {} placed ({}), status {}",
                order.id,
                totals::grand_total(&snapshot, config.shipping_flat, config.tax_rate).display(),
                order.status,
            ));
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_line(line: &str) {
    println!("{line}");
}

#[allow(clippy::print_stdout)]
fn print_cart(snapshot: &Snapshot, config: &BasketConfig) {
    if snapshot.is_empty() {
        println!("Your cart is empty");
        return;
    }
    for line in snapshot.lines() {
        println!(
            "{:>4}  {:<32} {:>3} x {:>10} = {:>10}",
            line.item.id,
            line.item.name,
            line.quantity,
            line.item.unit_price.display(),
            line.line_total().display(),
        );
    }
    println!("      {} items", snapshot.item_count());
    println!("      Subtotal: {}", totals::subtotal(snapshot).display());
    println!(
        "      Tax:      {}",
        totals::tax(snapshot, config.tax_rate).display()
    );
    println!(
        "      Total:    {} (incl. {} flat shipping)",
        totals::grand_total(snapshot, config.shipping_flat, config.tax_rate).display(),
        config.shipping_flat,
    );
}
