//! The cart store.
//!
//! `CartStore` is a cheaply cloneable handle; every clone shares the same cart.
//! Mutations apply to memory and publish to subscribers before returning.
//! Persistence runs on a background task fed through a single-slot queue:
//! each mutation replaces the pending snapshot, so the writer always persists
//! the newest state and stored order follows mutation order even when a
//! write is still in flight.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use go_market_core::{CartState, LineItem, NewLineItem, ProductId};
use tokio::sync::{OnceCell, watch};
use tracing::{debug, info, instrument, warn};

use crate::config::CartConfig;
use crate::error::{CartError, Result};
use crate::storage::{KeyValueStore, StorageError};

/// Shared handle to the cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    key: String,
    storage: Arc<dyn KeyValueStore>,
    // Authoritative state. Held while publishing and enqueueing so both follow
    // mutation order.
    cart: Mutex<CartState>,
    published: watch::Sender<CartState>,
    pending: watch::Sender<PendingWrite>,
    settled: Arc<watch::Sender<u64>>,
    activation: OnceCell<()>,
}

/// The single queued write. `revision` counts every enqueued write.
#[derive(Debug, Default)]
struct PendingWrite {
    revision: u64,
    write: Option<Write>,
}

#[derive(Debug, Clone)]
enum Write {
    Save(CartState),
    Remove,
}

/// What a mutation did to the cart.
enum Change {
    Unchanged,
    Save,
    Remove,
}

impl CartStore {
    /// Create an inactive store over `storage`.
    ///
    /// Nothing is read until [`activate`](Self::activate) runs; until then the
    /// cart operations return [`CartError::NotActivated`].
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>, config: &CartConfig) -> Self {
        let (published, _) = watch::channel(CartState::new());
        let (pending, _) = watch::channel(PendingWrite::default());
        let (settled, _) = watch::channel(0);

        Self {
            inner: Arc::new(CartStoreInner {
                key: config.storage_key.clone(),
                storage,
                cart: Mutex::new(CartState::new()),
                published,
                pending,
                settled: Arc::new(settled),
                activation: OnceCell::new(),
            }),
        }
    }

    /// Hydrate the cart from storage and start the background writer.
    ///
    /// Runs once per store; later calls return immediately. A missing record
    /// leaves the cart empty. A record that cannot be decoded is logged,
    /// deleted, and replaced by an empty cart.
    #[instrument(skip(self), fields(key = %self.inner.key))]
    pub async fn activate(&self) {
        self.inner
            .activation
            .get_or_init(|| async {
                let state = hydrate(self.inner.storage.as_ref(), &self.inner.key).await;
                {
                    let mut cart = self.lock_cart();
                    *cart = state.clone();
                    self.inner.published.send_replace(state);
                }

                tokio::spawn(run_writer(
                    Arc::clone(&self.inner.storage),
                    self.inner.key.clone(),
                    self.inner.pending.subscribe(),
                    Arc::clone(&self.inner.settled),
                ));
                info!("Cart store activated");
            })
            .await;
    }

    /// Whether [`activate`](Self::activate) has completed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner.activation.initialized()
    }

    /// Current lines in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotActivated` before activation.
    pub fn products(&self) -> Result<Vec<LineItem>> {
        Ok(self.snapshot()?.items().to_vec())
    }

    /// Current cart state.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotActivated` before activation.
    pub fn snapshot(&self) -> Result<CartState> {
        self.ensure_active()?;
        Ok(self.inner.published.borrow().clone())
    }

    /// Observe every published cart state.
    ///
    /// Available before activation so observers can see the hydrated cart
    /// arrive. A slow receiver only sees the newest state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.inner.published.subscribe()
    }

    /// Add one unit of `item`.
    ///
    /// A product already in the cart gets its quantity bumped and keeps the
    /// title, image and price from its first add.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotActivated` before activation.
    pub fn add_to_cart(&self, item: NewLineItem) -> Result<LineItem> {
        let product_id = item.id.clone();
        let line = self.mutate(|cart| Ok((cart.add(item).clone(), Change::Save)))?;
        debug!(product_id = %product_id, quantity = line.quantity.get(), "Added to cart");
        Ok(line)
    }

    /// Add one unit to the line for `id`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotInCart` if the product is not in the cart, or
    /// `CartError::NotActivated` before activation.
    pub fn increment(&self, id: &ProductId) -> Result<LineItem> {
        let line = self.mutate(|cart| {
            cart.increment(id)
                .cloned()
                .map(|line| (line, Change::Save))
                .ok_or_else(|| CartError::ItemNotInCart(id.clone()))
        })?;
        debug!(product_id = %id, quantity = line.quantity.get(), "Incremented cart line");
        Ok(line)
    }

    /// Remove one unit from the line for `id`.
    ///
    /// A line at one unit is left as is: nothing is published or written.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotInCart` if the product is not in the cart, or
    /// `CartError::NotActivated` before activation.
    pub fn decrement(&self, id: &ProductId) -> Result<LineItem> {
        let line = self.mutate(|cart| {
            let change = match cart.decrement(id) {
                Some(true) => Change::Save,
                Some(false) => Change::Unchanged,
                None => return Err(CartError::ItemNotInCart(id.clone())),
            };
            cart.get(id)
                .cloned()
                .map(|line| (line, change))
                .ok_or_else(|| CartError::ItemNotInCart(id.clone()))
        })?;
        debug!(product_id = %id, quantity = line.quantity.get(), "Decremented cart line");
        Ok(line)
    }

    /// Empty the cart and delete its persisted record.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotActivated` before activation.
    pub fn clear(&self) -> Result<()> {
        self.mutate(|cart| {
            cart.clear();
            Ok(((), Change::Remove))
        })?;
        info!("Cart cleared");
        Ok(())
    }

    /// Wait until every mutation made so far has been written (or has failed
    /// to write) by the background writer.
    pub async fn flush(&self) {
        let target = self.inner.pending.borrow().revision;
        let mut settled = self.inner.settled.subscribe();
        // Err means the writer is gone; nothing left to wait for.
        let _ = settled.wait_for(|revision| *revision >= target).await;
    }

    fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(CartError::NotActivated)
        }
    }

    fn lock_cart(&self) -> MutexGuard<'_, CartState> {
        // No code path panics while holding the lock, and the state is valid
        // between statements even if one did.
        self.inner.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate<T>(&self, op: impl FnOnce(&mut CartState) -> Result<(T, Change)>) -> Result<T> {
        self.ensure_active()?;

        let mut cart = self.lock_cart();
        let (value, change) = op(&mut *cart)?;
        let write = match change {
            Change::Unchanged => return Ok(value),
            Change::Save => Write::Save(cart.clone()),
            Change::Remove => Write::Remove,
        };

        self.inner.published.send_replace(cart.clone());
        self.inner.pending.send_modify(|pending| {
            pending.revision += 1;
            pending.write = Some(write);
        });
        Ok(value)
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.inner.key)
            .field("active", &self.is_active())
            .field("lines", &self.inner.published.borrow().len())
            .finish_non_exhaustive()
    }
}

/// Read the persisted cart, falling back to an empty one.
async fn hydrate(storage: &dyn KeyValueStore, key: &str) -> CartState {
    let raw = match storage.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("No persisted cart, starting empty");
            return CartState::new();
        }
        Err(e) => {
            warn!(error = %e, "Failed to read persisted cart, starting empty");
            return CartState::new();
        }
    };

    match serde_json::from_str::<CartState>(&raw) {
        Ok(state) => {
            info!(lines = state.len(), items = state.item_count(), "Cart hydrated");
            state
        }
        Err(e) => {
            warn!(error = %e, "Discarding corrupted persisted cart");
            if let Err(e) = storage.remove(key).await {
                warn!(error = %e, "Failed to remove corrupted cart record");
            }
            CartState::new()
        }
    }
}

/// Persist queued writes until every store handle is dropped.
async fn run_writer(
    storage: Arc<dyn KeyValueStore>,
    key: String,
    mut pending: watch::Receiver<PendingWrite>,
    settled: Arc<watch::Sender<u64>>,
) {
    while pending.changed().await.is_ok() {
        let (revision, write) = {
            let pending = pending.borrow_and_update();
            (pending.revision, pending.write.clone())
        };

        if let Some(write) = write {
            if let Err(e) = persist(storage.as_ref(), &key, write).await {
                warn!(error = %e, revision, "Failed to persist cart");
            } else {
                debug!(revision, "Cart persisted");
            }
        }
        settled.send_replace(revision);
    }
    debug!("Cart writer stopped");
}

async fn persist(
    storage: &dyn KeyValueStore,
    key: &str,
    write: Write,
) -> std::result::Result<(), StorageError> {
    match write {
        Write::Save(state) => storage.set(key, serde_json::to_string(&state)?).await,
        Write::Remove => storage.remove(key).await,
    }
}
