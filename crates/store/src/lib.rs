//! Basket Store - durable state for line-item collections.
//!
//! The engine in `basket-core` is pure; this crate owns everything stateful
//! around it:
//! - [`slot`] - Durable slots: load/save/clear a serialized collection,
//!   fail-open on corrupt payloads
//! - [`store`] - The collection store: the single mutation path, the
//!   hydration lifecycle, and subscriber notification
//! - [`shop`] - REST client for the external catalog and order-placement
//!   collaborators
//! - [`config`] - Environment-driven configuration
//!
//! # Control flow
//!
//! Caller action -> [`store::CollectionStore::dispatch`] -> engine mutation
//! (pure, returns a new collection) -> store replaces its in-memory state ->
//! store persists via the slot -> store notifies subscribers with the new
//! snapshot. Persistence failures are logged and swallowed; the in-memory
//! mutation stands either way.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod shop;
pub mod slot;
pub mod store;

pub use config::{BasketConfig, ConfigError};
pub use shop::{ClientError, Order, ShippingAddress, ShopClient};
pub use slot::{CollectionSlot, JsonFileSlot, MemorySlot, SlotError};
pub use store::{CollectionStore, SubscriptionHandle, SubscriptionId};
