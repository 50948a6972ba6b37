//! Key/value storage behind the client-side stores.
//!
//! Stores take a `KeyValueStorage` instead of reaching for
//! `window.localStorage` directly, so they can run against
//! [`MemoryStorage`] in tests or when the browser refuses storage.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;
use thiserror::Error;
use web_sys::window;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage error: {0}")]
    Js(String),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("write rejected for key '{key}'")]
    WriteRejected { key: String },
}

pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// `window.localStorage`.
#[derive(Clone, Debug)]
pub struct BrowserStorage {
    inner: web_sys::Storage,
}

impl BrowserStorage {
    /// `None` outside a browser or when storage is disabled.
    pub fn local() -> Option<Self> {
        let inner = window()?.local_storage().ok()??;
        Some(Self { inner })
    }
}

fn js_error(err: wasm_bindgen::JsValue) -> StorageError {
    StorageError::Js(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

impl KeyValueStorage for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_item(key).map_err(js_error)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set_item(key, value).map_err(js_error)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove_item(key).map_err(js_error)
    }
}

#[derive(Default, Debug)]
struct MemoryState {
    items: HashMap<String, String>,
    fail_writes: bool,
}

/// In-memory storage. Clones share the same data.
#[derive(Clone, Default, Debug)]
pub struct MemoryStorage {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following write fail like a full or disabled localStorage.
    pub fn fail_writes(&self, fail: bool) {
        self.state.borrow_mut().fail_writes = fail;
    }

    pub fn len(&self) -> usize {
        self.state.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.state.borrow().items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut state = self.state.borrow_mut();
        if state.fail_writes {
            return Err(StorageError::WriteRejected {
                key: key.to_string(),
            });
        }
        state.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut state = self.state.borrow_mut();
        if state.fail_writes {
            return Err(StorageError::WriteRejected {
                key: key.to_string(),
            });
        }
        state.items.remove(key);
        Ok(())
    }
}

/// Browser localStorage if available, otherwise a fresh in-memory store
/// (state is then lost on reload).
pub fn default_storage() -> Rc<dyn KeyValueStorage> {
    match BrowserStorage::local() {
        Some(storage) => Rc::new(storage),
        None => {
            log::warn!("localStorage unavailable, falling back to in-memory storage");
            Rc::new(MemoryStorage::new())
        }
    }
}

/// One storage handle for the whole app, so every store sees the same data
/// even when it is the in-memory fallback.
#[derive(Clone, Copy)]
pub struct StorageHandle(StoredValue<Rc<dyn KeyValueStorage>, LocalStorage>);

impl StorageHandle {
    pub fn new(storage: Rc<dyn KeyValueStorage>) -> Self {
        Self(StoredValue::new_local(storage))
    }

    pub fn get(&self) -> Rc<dyn KeyValueStorage> {
        self.0.get_value()
    }
}

pub fn provide_storage(storage: Rc<dyn KeyValueStorage>) {
    provide_context(StorageHandle::new(storage));
}

/// Hook to access the shared storage
pub fn use_storage() -> Rc<dyn KeyValueStorage> {
    use_context::<StorageHandle>()
        .expect("storage not provided in component tree")
        .get()
}
