//! Basket configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional and default to host-local development values.
//!
//! - `BASKET_DATA_DIR` - Directory holding the durable slots (default: `.basket`)
//! - `BASKET_API_URL` - Base URL of the catalog/orders backend (default: `http://localhost:3001`)
//! - `BASKET_TAX_RATE` - Tax rate applied at checkout (default: `0.08`)
//! - `BASKET_SHIPPING_FLAT` - Flat shipping charge (default: `10`)
//!
//! The tax rate and shipping flat live here, and only here, so every surface
//! that renders a grand total works from the same numbers.

use std::env;
use std::path::PathBuf;

use rust_decimal::Decimal;
use thiserror::Error;

const DEFAULT_DATA_DIR: &str = ".basket";
const DEFAULT_API_URL: &str = "http://localhost:3001";
const DEFAULT_TAX_RATE: &str = "0.08";
const DEFAULT_SHIPPING_FLAT: &str = "10";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Basket application configuration.
#[derive(Debug, Clone)]
pub struct BasketConfig {
    /// Directory holding the durable slots.
    pub data_dir: PathBuf,
    /// Base URL of the catalog/orders backend.
    pub api_url: String,
    /// Tax rate applied at checkout (e.g., `0.08` for 8%).
    pub tax_rate: Decimal,
    /// Flat shipping charge added to every order.
    pub shipping_flat: Decimal,
}

impl BasketConfig {
    /// Load configuration from the environment, with defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            data_dir: PathBuf::from(env_or("BASKET_DATA_DIR", DEFAULT_DATA_DIR)),
            api_url: env_or("BASKET_API_URL", DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            tax_rate: non_negative_decimal("BASKET_TAX_RATE", DEFAULT_TAX_RATE)?,
            shipping_flat: non_negative_decimal("BASKET_SHIPPING_FLAT", DEFAULT_SHIPPING_FLAT)?,
        })
    }

    /// Path of the cart's durable slot.
    #[must_use]
    pub fn cart_slot_path(&self) -> PathBuf {
        self.data_dir.join("cart.json")
    }

    /// Path of the wishlist's durable slot.
    #[must_use]
    pub fn wishlist_slot_path(&self) -> PathBuf {
        self.data_dir.join("wishlist.json")
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn non_negative_decimal(name: &str, default: &str) -> Result<Decimal, ConfigError> {
    let raw = env_or(name, default);
    let value: Decimal = raw
        .parse()
        .map_err(|_| ConfigError::InvalidEnvVar(name.to_string(), raw.clone()))?;
    if value < Decimal::ZERO {
        return Err(ConfigError::InvalidEnvVar(
            name.to_string(),
            format!("{raw} (must be non-negative)"),
        ));
    }
    Ok(value)
}
