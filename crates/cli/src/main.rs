//! Basket CLI - manage a durable cart and wishlist from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! basket catalog list
//! basket catalog list --category electronics
//! basket catalog show 3
//!
//! # Cart operations
//! basket cart add 3 --quantity 2
//! basket cart set 3 5
//! basket cart show
//! basket cart checkout --street "1 Main St" --city Springfield --state IL --zip 62704
//!
//! # Wishlist operations
//! basket wishlist toggle 3
//! basket wishlist show
//! ```
//!
//! # Configuration
//!
//! Reads `BASKET_*` environment variables (see `basket-store`'s config
//! module); a `.env` file in the working directory is honored.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "basket")]
#[command(author, version, about = "Basket storefront tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Manage the durable cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List products, optionally filtered
    List {
        /// Only show products in this category
        #[arg(long)]
        category: Option<String>,
        /// Full-text search query
        #[arg(long, conflicts_with = "category")]
        search: Option<String>,
    },
    /// Show one product
    Show { id: i32 },
}

#[derive(Subcommand)]
enum CartAction {
    /// Print the cart with totals
    Show,
    /// Add a catalog item to the cart
    Add {
        id: i32,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a line from the cart
    Remove { id: i32 },
    /// Set the quantity of a line (0 removes it)
    Set { id: i32, quantity: u32 },
    /// Empty the cart and delete its durable slot
    Clear,
    /// Place an order from the cart, then clear it
    Checkout {
        #[arg(long)]
        street: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        state: String,
        #[arg(long)]
        zip: String,
        #[arg(long, default_value = "USA")]
        country: String,
    },
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Print the wishlist
    Show,
    /// Add an item to the wishlist, or remove it if already present
    Toggle { id: i32 },
    /// Empty the wishlist and delete its durable slot
    Clear,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "basket=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    if let Err(e) = commands::run(cli.command).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
