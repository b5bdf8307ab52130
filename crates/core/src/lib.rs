//! Basket Core - the pure line-item collection engine.
//!
//! This crate holds everything the stateful side (`basket-store`) and the CLI
//! build on:
//! - [`types`] - Newtype IDs, decimal-safe prices, and the item/line-item model
//! - [`collection`] - The collection engine: pure operations over an ordered
//!   set of line items, parameterized by a merge policy
//! - [`totals`] - Derived-view helpers shared by every surface that renders a
//!   cart summary
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no durable storage. Every mutation operation takes a collection by
//! reference and returns a new one; state and persistence live entirely in
//! `basket-store`.
//!
//! One engine serves both the cart and the wishlist. The two differ only in
//! their [`MergePolicy`](collection::MergePolicy): a cart sums duplicate
//! additions into quantity increments, a wishlist treats membership as a
//! boolean and re-adding as a no-op.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod collection;
pub mod totals;
pub mod types;

pub use collection::{Collection, MergePolicy, Operation, Snapshot};
pub use types::*;
