//! Catalog browsing commands.

use basket_core::{Item, ItemId};
use basket_store::{BasketConfig, ShopClient};

use super::CommandError;
use crate::CatalogAction;

pub async fn run(config: &BasketConfig, action: CatalogAction) -> Result<(), CommandError> {
    let client = ShopClient::new(config.api_url.clone());
    match action {
        CatalogAction::List { category, search } => {
            let items = if let Some(category) = category {
                client.fetch_by_category(&category).await?
            } else if let Some(query) = search {
                client.search(&query).await?
            } else {
                client.fetch_catalog().await?
            };
            print_items(&items);
        }
        CatalogAction::Show { id } => {
            let item = client.fetch_item(ItemId::new(id)).await?;
            print_item(&item);
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_items(items: &[Item]) {
    if items.is_empty() {
        println!("No products found");
        return;
    }
    for item in items {
        println!(
            "{:>4}  {:<32} {:>10}  {}",
            item.id,
            item.name,
            item.unit_price.display(),
            item.category.as_deref().unwrap_or("-"),
        );
    }
}

#[allow(clippy::print_stdout)]
fn print_item(item: &Item) {
    println!("{} (#{})", item.name, item.id);
    println!("  Price:    {}", item.unit_price.display());
    if let Some(category) = &item.category {
        println!("  Category: {category}");
    }
    match item.stock_limit {
        Some(0) => println!("  Stock:    out of stock"),
        Some(limit) => println!("  Stock:    {limit}"),
        None => {}
    }
}
