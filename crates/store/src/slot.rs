//! Durable slots for persisted collections.
//!
//! A slot is a single named durable key holding a JSON array of line
//! records: `{id, quantity, name, unitPrice, imageRef?, category?,
//! stockLimit?}`. Only the lines are persisted; derived aggregates are
//! recomputed on load.
//!
//! Loads are fail-open by design: an absent slot, unparseable JSON, a
//! duplicate id, or a non-positive quantity all hydrate to an empty
//! collection with a logged warning. A corrupt basket must never take the
//! application down with it - it just resets.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::PathBuf;

use basket_core::{Collection, CurrencyCode, Item, ItemId, LineItem, Price};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Errors from slot reads and writes.
#[derive(Debug, Error)]
pub enum SlotError {
    /// Filesystem operation failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Payload was not well-formed JSON of the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload parsed but violated a structural invariant.
    #[error("Invalid payload: {0}")]
    Invalid(String),

    /// Saves are disabled on this slot (see [`MemorySlot::fail_saves`]).
    #[error("Slot rejected the write")]
    WriteRejected,
}

/// Durable storage for one collection.
pub trait CollectionSlot: Send + Sync {
    /// Read the slot. Absent or malformed payloads yield an empty
    /// collection, never an error.
    fn load(&self) -> Collection;

    /// Serialize the collection into the slot. Best effort; the caller logs
    /// and swallows failures.
    fn save(&self, collection: &Collection) -> Result<(), SlotError>;

    /// Remove the durable payload entirely. Clearing an absent slot is not
    /// an error.
    fn clear(&self) -> Result<(), SlotError>;
}

// =============================================================================
// Stored record format
// =============================================================================

/// One persisted line record, the on-disk shape of the slot payload.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredLine {
    id: ItemId,
    quantity: u32,
    name: String,
    unit_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    currency: Option<CurrencyCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stock_limit: Option<u32>,
}

impl From<&LineItem> for StoredLine {
    fn from(line: &LineItem) -> Self {
        Self {
            id: line.item.id,
            quantity: line.quantity,
            name: line.item.name.clone(),
            unit_price: line.item.unit_price.amount,
            currency: Some(line.item.unit_price.currency_code),
            image_ref: line.item.image_ref.clone(),
            category: line.item.category.clone(),
            stock_limit: line.item.stock_limit,
        }
    }
}

impl From<StoredLine> for LineItem {
    fn from(record: StoredLine) -> Self {
        Self {
            item: Item {
                id: record.id,
                name: record.name,
                unit_price: Price::new(record.unit_price, record.currency.unwrap_or_default()),
                image_ref: record.image_ref,
                category: record.category,
                stock_limit: record.stock_limit,
            },
            quantity: record.quantity,
        }
    }
}

/// Parse and structurally validate a slot payload.
fn decode(payload: &str) -> Result<Collection, SlotError> {
    let records: Vec<StoredLine> = serde_json::from_str(payload)?;
    let mut seen = HashSet::new();
    for record in &records {
        if record.quantity == 0 {
            return Err(SlotError::Invalid(format!(
                "zero quantity for item {}",
                record.id
            )));
        }
        if !seen.insert(record.id) {
            return Err(SlotError::Invalid(format!(
                "duplicate item id {}",
                record.id
            )));
        }
    }
    Ok(Collection::from_lines(
        records.into_iter().map(LineItem::from),
    ))
}

fn encode(collection: &Collection) -> Result<String, SlotError> {
    let records: Vec<StoredLine> = collection.lines().iter().map(StoredLine::from).collect();
    Ok(serde_json::to_string(&records)?)
}

// =============================================================================
// File-backed slot
// =============================================================================

/// A slot stored as a JSON file on disk.
#[derive(Debug)]
pub struct JsonFileSlot {
    path: PathBuf,
}

impl JsonFileSlot {
    /// Create a slot at the given path. Parent directories are created on
    /// first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CollectionSlot for JsonFileSlot {
    fn load(&self) -> Collection {
        let payload = match fs::read_to_string(&self.path) {
            Ok(payload) => payload,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Collection::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read slot, starting empty");
                return Collection::new();
            }
        };
        match decode(&payload) {
            Ok(collection) => collection,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "malformed slot payload, starting empty");
                Collection::new()
            }
        }
    }

    fn save(&self, collection: &Collection) -> Result<(), SlotError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, encode(collection)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SlotError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// In-memory slot
// =============================================================================

/// An in-memory slot for tests and ephemeral sessions.
///
/// Stores the raw payload string, so corrupt data and write failures can be
/// exercised the same way a real backend would produce them.
#[derive(Debug, Default)]
pub struct MemorySlot {
    payload: Mutex<Option<String>>,
    reject_saves: Mutex<bool>,
}

impl MemorySlot {
    /// An empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot pre-seeded with a raw payload, valid or not.
    #[must_use]
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            payload: Mutex::new(Some(payload.into())),
            reject_saves: Mutex::new(false),
        }
    }

    /// Make subsequent saves fail, simulating an exhausted backend.
    pub fn fail_saves(&self, fail: bool) {
        *self.reject_saves.lock() = fail;
    }

    /// The current raw payload, if any.
    #[must_use]
    pub fn payload(&self) -> Option<String> {
        self.payload.lock().clone()
    }
}

impl CollectionSlot for MemorySlot {
    fn load(&self) -> Collection {
        let Some(payload) = self.payload.lock().clone() else {
            return Collection::new();
        };
        match decode(&payload) {
            Ok(collection) => collection,
            Err(e) => {
                warn!(error = %e, "malformed slot payload, starting empty");
                Collection::new()
            }
        }
    }

    fn save(&self, collection: &Collection) -> Result<(), SlotError> {
        if *self.reject_saves.lock() {
            return Err(SlotError::WriteRejected);
        }
        *self.payload.lock() = Some(encode(collection)?);
        Ok(())
    }

    fn clear(&self) -> Result<(), SlotError> {
        *self.payload.lock() = None;
        Ok(())
    }
}
