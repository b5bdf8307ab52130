//! Command implementations.

mod cart;
mod catalog;
mod wishlist;

use basket_store::{BasketConfig, ClientError, ConfigError, SlotError};
use thiserror::Error;

use crate::Commands;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The shop backend failed or rejected the request.
    #[error("Shop error: {0}")]
    Client(#[from] ClientError),

    /// Durable slot operation failed.
    #[error("Storage error: {0}")]
    Slot(#[from] SlotError),

    /// Checkout was attempted on an empty cart.
    #[error("Cannot check out an empty cart")]
    EmptyCart,
}

pub async fn run(command: Commands) -> Result<(), CommandError> {
    let config = BasketConfig::from_env()?;
    match command {
        Commands::Catalog { action } => catalog::run(&config, action).await,
        Commands::Cart { action } => cart::run(&config, action).await,
        Commands::Wishlist { action } => wishlist::run(&config, action).await,
    }
}
