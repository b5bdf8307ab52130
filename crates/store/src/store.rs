//! The collection store: the single stateful owner of a collection.
//!
//! Lifecycle: `Uninitialized -> Hydrating -> Ready`. The store is
//! constructed empty, hydrated at most once from its slot, and mutated only
//! through [`CollectionStore::dispatch`]. A dispatch issued before hydration
//! completes is queued and replayed in order once it does, so an early
//! mutation can never be silently overwritten by the hydrated payload.
//!
//! Each committed mutation is persisted before the next one is accepted, and
//! subscribers are handed the resulting snapshot over a bounded channel.
//! Because events arrive over channels, a subscriber can never re-enter the
//! store from inside a notification; it queues a follow-up dispatch instead.

use std::sync::atomic::{AtomicU64, Ordering};

use basket_core::{Collection, MergePolicy, Operation, Snapshot};
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::slot::CollectionSlot;

/// Default event buffer per subscriber.
const DEFAULT_SUBSCRIBER_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Hydrating,
    Ready,
}

struct Inner {
    phase: Phase,
    collection: Collection,
    /// Dispatches that arrived before hydration, in arrival order.
    pending: Vec<Operation>,
}

/// Identifier for an active subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Receiving side of a subscription.
///
/// Snapshots arrive after every committed mutation (and once when hydration
/// completes). If the buffer fills up, newer events are dropped for this
/// subscriber; a disconnected receiver removes the subscription on the next
/// notification pass.
pub struct SubscriptionHandle {
    pub id: SubscriptionId,
    pub receiver: Receiver<Snapshot>,
}

struct Subscriber {
    id: SubscriptionId,
    sender: Sender<Snapshot>,
}

/// Stateful wrapper around one collection.
pub struct CollectionStore {
    policy: MergePolicy,
    slot: Box<dyn CollectionSlot>,
    inner: Mutex<Inner>,
    subscribers: RwLock<Vec<Subscriber>>,
    next_subscription_id: AtomicU64,
}

impl CollectionStore {
    /// Create a store over a slot. The store starts uninitialized; call
    /// [`CollectionStore::initialize`] to hydrate it.
    #[must_use]
    pub fn new(policy: MergePolicy, slot: Box<dyn CollectionSlot>) -> Self {
        Self {
            policy,
            slot,
            inner: Mutex::new(Inner {
                phase: Phase::Uninitialized,
                collection: Collection::new(),
                pending: Vec::new(),
            }),
            subscribers: RwLock::new(Vec::new()),
            next_subscription_id: AtomicU64::new(1),
        }
    }

    /// A cart-flavored store: duplicate additions sum quantities.
    #[must_use]
    pub fn cart(slot: Box<dyn CollectionSlot>) -> Self {
        Self::new(MergePolicy::Sum, slot)
    }

    /// A wishlist-flavored store: presence only.
    #[must_use]
    pub fn wishlist(slot: Box<dyn CollectionSlot>) -> Self {
        Self::new(MergePolicy::Presence, slot)
    }

    /// The merge policy this store applies.
    #[must_use]
    pub const fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Hydrate from the slot. At most once per store lifetime; later calls
    /// are no-ops.
    ///
    /// Dispatches queued before hydration are replayed, in order, on top of
    /// the hydrated collection, then persisted. Subscribers receive one
    /// snapshot of the final state.
    pub fn initialize(&self) {
        let mut inner = self.inner.lock();
        if inner.phase != Phase::Uninitialized {
            return;
        }
        inner.phase = Phase::Hydrating;

        // Re-add each stored line under this store's policy. A hand-edited
        // slot can hold quantities a presence collection would never produce.
        let hydrated = self.slot.load();
        inner.collection = hydrated
            .lines()
            .iter()
            .fold(Collection::new(), |collection, line| {
                collection.add(line.item.clone(), line.quantity, self.policy)
            });
        let queued = std::mem::take(&mut inner.pending);
        if !queued.is_empty() {
            debug!(count = queued.len(), "replaying dispatches queued before hydration");
        }
        for operation in &queued {
            inner.collection = inner.collection.apply(operation, self.policy);
        }
        if let Some(last) = queued.last() {
            self.persist(&inner.collection, last);
        }
        inner.phase = Phase::Ready;

        let snapshot = Snapshot::of(&inner.collection);
        drop(inner);
        self.notify(&snapshot);
    }

    /// Apply one operation. This is the only path by which state changes.
    ///
    /// When the store is ready, the mutation is applied, persisted, and
    /// announced before this call returns; the new snapshot is the return
    /// value. Before hydration the operation is queued and the current
    /// (pre-mutation) snapshot is returned.
    pub fn dispatch(&self, operation: Operation) -> Snapshot {
        let mut inner = self.inner.lock();
        if inner.phase != Phase::Ready {
            debug!(?operation, "store not hydrated yet; queueing dispatch");
            inner.pending.push(operation);
            return Snapshot::of(&inner.collection);
        }

        inner.collection = inner.collection.apply(&operation, self.policy);
        self.persist(&inner.collection, &operation);
        let snapshot = Snapshot::of(&inner.collection);
        drop(inner);

        self.notify(&snapshot);
        snapshot
    }

    /// Read-only view of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::of(&self.inner.lock().collection)
    }

    /// Subscribe with the default event buffer.
    #[must_use]
    pub fn subscribe(&self) -> SubscriptionHandle {
        self.subscribe_with_buffer(DEFAULT_SUBSCRIBER_BUFFER)
    }

    /// Subscribe with a custom event buffer size (minimum 1).
    #[must_use]
    pub fn subscribe_with_buffer(&self, buffer: usize) -> SubscriptionHandle {
        let id = SubscriptionId(self.next_subscription_id.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = bounded(buffer.max(1));
        self.subscribers.write().push(Subscriber { id, sender });
        SubscriptionHandle { id, receiver }
    }

    /// Remove a subscription.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.write().retain(|s| s.id != id);
    }

    /// Persist a committed mutation, best effort. A `Clear` removes the
    /// durable slot entirely; everything else overwrites it.
    fn persist(&self, collection: &Collection, operation: &Operation) {
        let result = match operation {
            Operation::Clear => self.slot.clear(),
            _ => self.slot.save(collection),
        };
        if let Err(e) = result {
            warn!(error = %e, "failed to persist collection; keeping in-memory state");
        }
    }

    fn notify(&self, snapshot: &Snapshot) {
        let mut disconnected = Vec::new();
        {
            let subscribers = self.subscribers.read();
            for subscriber in subscribers.iter() {
                match subscriber.sender.try_send(snapshot.clone()) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        warn!(id = ?subscriber.id, "subscriber buffer full, dropping event");
                    }
                    Err(TrySendError::Disconnected(_)) => disconnected.push(subscriber.id),
                }
            }
        }
        if !disconnected.is_empty() {
            self.subscribers
                .write()
                .retain(|s| !disconnected.contains(&s.id));
        }
    }
}
