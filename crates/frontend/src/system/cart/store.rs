//! Client-side shopping cart persisted in localStorage.
//!
//! The whole cart lives under a single storage key as a JSON array of
//! [`CartItem`]. Every mutation is one read-modify-write of that array
//! followed by a synchronous notification of all subscribers, so the header
//! badge, cart drawer, checkout page and product cards stay in step without
//! passing the cart around.
//!
//! # Example
//! ```rust,ignore
//! let store = CartStore::new(default_storage(), &config().storage.cart);
//! let _sub = store.subscribe(|| log::debug!("cart changed"));
//! store.add_item(NewCartItem::new("p1", "Son", 100000.0), 1)?;
//! ```

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use contracts::system::cart::{cart_count, cart_total, CartItem, NewCartItem};
use serde_json::Value;
use thiserror::Error;

use crate::shared::storage::{KeyValueStorage, StorageError};

#[derive(Debug, Error)]
pub enum CartError {
    #[error("invalid cart item: {0}")]
    InvalidItem(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

type Listener = Rc<dyn Fn()>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Handle returned by [`CartStore::subscribe`].
///
/// The listener stays registered until `unsubscribe` is called or the handle
/// is dropped.
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    listeners: Weak<RefCell<Listeners>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(listeners) = self.listeners.upgrade() else {
            return;
        };
        let removed = {
            let mut listeners = listeners.borrow_mut();
            listeners
                .entries
                .iter()
                .position(|(id, _)| *id == self.id)
                .map(|idx| listeners.entries.remove(idx))
        };
        // dropped after the borrow ends: the closure may own other subscriptions
        drop(removed);
    }
}

/// Cart bound to one storage slot. Clones share storage and subscribers.
#[derive(Clone)]
pub struct CartStore {
    storage: Rc<dyn KeyValueStorage>,
    key: String,
    listeners: Rc<RefCell<Listeners>>,
}

fn clamp_qty(qty: i64) -> u32 {
    u32::try_from(qty.max(1)).unwrap_or(u32::MAX)
}

/// Stored quantities may come back as floats or out of range; keep them
/// within `1..=u32::MAX` instead of losing the line.
fn normalize_qty(entry: &mut Value) {
    if let Some(qty) = entry.get_mut("qty") {
        if let Some(n) = qty.as_f64() {
            *qty = Value::from((n as u32).max(1));
        }
    }
}

/// Decodes the persisted array. Anything unusable becomes an empty cart;
/// bad lines are dropped and duplicate ids merged so the result always
/// satisfies the one-line-per-id, `qty >= 1` rules.
fn parse_cart(raw: &str) -> Vec<CartItem> {
    let entries = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(entries)) => entries,
        Ok(_) => {
            log::warn!("cart storage does not hold an array, treating as empty");
            return Vec::new();
        }
        Err(e) => {
            log::warn!("cart storage is not valid JSON ({}), treating as empty", e);
            return Vec::new();
        }
    };

    let mut items: Vec<CartItem> = Vec::with_capacity(entries.len());
    for mut entry in entries {
        normalize_qty(&mut entry);
        let item = match serde_json::from_value::<CartItem>(entry) {
            Ok(item) => item,
            Err(e) => {
                log::warn!("skipping malformed cart line: {}", e);
                continue;
            }
        };
        match items.iter().position(|i| i.id == item.id) {
            Some(idx) => items[idx].qty = items[idx].qty.saturating_add(item.qty),
            None => items.push(item),
        }
    }
    items
}

impl CartStore {
    pub fn new(storage: Rc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            listeners: Rc::new(RefCell::new(Listeners::default())),
        }
    }

    /// Current cart, newest lines first. Never fails: an absent or broken
    /// slot reads as an empty cart.
    pub fn get_cart(&self) -> Vec<CartItem> {
        match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => parse_cart(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("failed to read cart: {}", e);
                Vec::new()
            }
        }
    }

    pub fn find_item(&self, id: &str) -> Option<CartItem> {
        self.get_cart().into_iter().find(|i| i.id == id)
    }

    pub fn cart_count(&self) -> u64 {
        cart_count(&self.get_cart())
    }

    pub fn cart_total(&self) -> f64 {
        cart_total(&self.get_cart())
    }

    /// Adds `qty` units (values below 1 count as 1). An existing line with the
    /// same id only gets its quantity raised; its name and price stay as they
    /// were. New lines go to the front.
    pub fn add_item(&self, item: NewCartItem, qty: i64) -> Result<(), CartError> {
        item.validate().map_err(CartError::InvalidItem)?;
        let qty = clamp_qty(qty);

        let mut items = self.get_cart();
        match items.iter().position(|i| i.id == item.id) {
            Some(idx) => {
                let line = &mut items[idx];
                line.qty = line.qty.saturating_add(qty);
                log::debug!("cart: {} qty -> {}", line.id, line.qty);
            }
            None => {
                log::debug!("cart: add {} x{}", item.id, qty);
                items.insert(0, item.into_line(qty));
            }
        }
        self.commit(&items)
    }

    /// Sets the quantity to `max(1, qty)`. `Ok(false)` if the id is not in the cart.
    pub fn set_qty(&self, id: &str, qty: i64) -> Result<bool, CartError> {
        let qty = clamp_qty(qty);
        self.update_line(id, |line| line.qty = qty)
    }

    pub fn inc_qty(&self, id: &str) -> Result<bool, CartError> {
        self.update_line(id, |line| line.qty = line.qty.saturating_add(1))
    }

    /// Never goes below 1; removing a line is `remove_item`.
    pub fn dec_qty(&self, id: &str) -> Result<bool, CartError> {
        self.update_line(id, |line| line.qty = line.qty.saturating_sub(1).max(1))
    }

    pub fn remove_item(&self, id: &str) -> Result<bool, CartError> {
        let mut items = self.get_cart();
        let Some(idx) = items.iter().position(|i| i.id == id) else {
            return Ok(false);
        };
        items.remove(idx);
        log::debug!("cart: removed {}", id);
        self.commit(&items)?;
        Ok(true)
    }

    /// Empties the cart. Always writes and notifies, even if already empty.
    pub fn clear_cart(&self) -> Result<(), CartError> {
        log::debug!("cart: cleared");
        self.commit(&[])
    }

    /// Registers `listener` to run after every successful mutation, in
    /// subscription order, before the mutating call returns.
    pub fn subscribe(&self, listener: impl Fn() + 'static) -> Subscription {
        let mut listeners = self.listeners.borrow_mut();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Rc::new(listener)));
        Subscription {
            id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    /// Notifies subscribers without writing. For hosts that forward
    /// storage events from other tabs.
    pub fn reload(&self) {
        self.notify();
    }

    fn update_line(&self, id: &str, apply: impl FnOnce(&mut CartItem)) -> Result<bool, CartError> {
        let mut items = self.get_cart();
        let Some(line) = items.iter_mut().find(|i| i.id == id) else {
            return Ok(false);
        };
        apply(line);
        log::debug!("cart: {} qty -> {}", line.id, line.qty);
        self.commit(&items)?;
        Ok(true)
    }

    fn commit(&self, items: &[CartItem]) -> Result<(), CartError> {
        let raw = serde_json::to_string(items).map_err(StorageError::from)?;
        self.storage.set_item(&self.key, &raw)?;
        self.notify();
        Ok(())
    }

    fn notify(&self) {
        // snapshot so listeners can (un)subscribe or mutate the cart themselves
        let snapshot: Vec<Listener> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        for listener in snapshot {
            if panic::catch_unwind(AssertUnwindSafe(|| listener())).is_err() {
                log::error!("cart listener panicked, continuing with the rest");
            }
        }
    }
}
