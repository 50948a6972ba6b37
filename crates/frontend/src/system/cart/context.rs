use contracts::system::cart::{cart_count, cart_total, CartItem, NewCartItem};
use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;

use super::store::{CartError, CartStore, Subscription};
use crate::shared::config::config;
use crate::shared::storage::use_storage;

/// Reactive view of the cart for components.
///
/// `items` is refreshed by a store subscription, so anything that mutates the
/// store (this context, another component holding a clone, `reload`) is
/// reflected in the signal.
#[derive(Clone, Copy)]
pub struct CartContext {
    store: StoredValue<CartStore, LocalStorage>,
    items: RwSignal<Vec<CartItem>>,
    _subscription: StoredValue<Subscription, LocalStorage>,
}

impl CartContext {
    pub fn new(store: CartStore) -> Self {
        let items = RwSignal::new(store.get_cart());
        let reader = store.clone();
        let subscription = store.subscribe(move || items.set(reader.get_cart()));
        Self {
            store: StoredValue::new_local(store),
            items,
            _subscription: StoredValue::new_local(subscription),
        }
    }

    pub fn items(&self) -> ReadSignal<Vec<CartItem>> {
        self.items.read_only()
    }

    pub fn count(&self) -> Signal<u64> {
        let items = self.items;
        Signal::derive(move || items.with(|i| cart_count(i)))
    }

    pub fn total(&self) -> Signal<f64> {
        let items = self.items;
        Signal::derive(move || items.with(|i| cart_total(i)))
    }

    pub fn add_item(&self, item: NewCartItem, qty: i64) -> Result<(), CartError> {
        self.store.with_value(|s| s.add_item(item, qty))
    }

    pub fn set_qty(&self, id: &str, qty: i64) -> Result<bool, CartError> {
        self.store.with_value(|s| s.set_qty(id, qty))
    }

    pub fn inc_qty(&self, id: &str) -> Result<bool, CartError> {
        self.store.with_value(|s| s.inc_qty(id))
    }

    pub fn dec_qty(&self, id: &str) -> Result<bool, CartError> {
        self.store.with_value(|s| s.dec_qty(id))
    }

    pub fn remove_item(&self, id: &str) -> Result<bool, CartError> {
        self.store.with_value(|s| s.remove_item(id))
    }

    pub fn clear(&self) -> Result<(), CartError> {
        self.store.with_value(|s| s.clear_cart())
    }
}

/// Cart context provider component
#[component]
pub fn CartProvider(children: Children) -> impl IntoView {
    let store = CartStore::new(use_storage(), config().storage.cart.clone());
    provide_context(CartContext::new(store));

    children()
}

/// Hook to access the cart
pub fn use_cart() -> CartContext {
    use_context::<CartContext>().expect("CartProvider not found in component tree")
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::shared::storage::MemoryStorage;

    fn store() -> CartStore {
        CartStore::new(Rc::new(MemoryStorage::new()), "cart".to_string())
    }

    #[test]
    fn test_signals_follow_store_mutations() {
        let owner = Owner::new();
        owner.set();

        let store = store();
        let cart = CartContext::new(store.clone());
        assert!(cart.items().get_untracked().is_empty());

        store
            .add_item(NewCartItem::new("p1", "Son", 100000.0), 2)
            .unwrap();
        assert_eq!(cart.items().get_untracked().len(), 1);
        assert_eq!(cart.count().get_untracked(), 2);
        assert_eq!(cart.total().get_untracked(), 200000.0);

        store.clear_cart().unwrap();
        assert_eq!(cart.count().get_untracked(), 0);
    }

    #[test]
    fn test_context_mutators_update_signals() {
        let owner = Owner::new();
        owner.set();

        let cart = CartContext::new(store());
        cart.add_item(NewCartItem::new("p1", "Son", 50000.0), 1).unwrap();
        cart.add_item(NewCartItem::new("p2", "Serum", 20000.0), 1).unwrap();
        assert!(cart.inc_qty("p1").unwrap());
        assert!(cart.set_qty("p2", 3).unwrap());
        assert_eq!(cart.count().get_untracked(), 5);
        assert_eq!(cart.total().get_untracked(), 160000.0);

        assert!(cart.dec_qty("p2").unwrap());
        assert!(cart.remove_item("p1").unwrap());
        assert!(!cart.remove_item("p1").unwrap());
        assert_eq!(cart.count().get_untracked(), 2);

        cart.clear().unwrap();
        assert!(cart.items().get_untracked().is_empty());
    }

    #[test]
    fn test_signals_see_mutation_made_inside_a_listener() {
        let owner = Owner::new();
        owner.set();

        let store = store();
        let cart = CartContext::new(store.clone());
        let bumper = store.clone();
        let _sub = store.subscribe(move || {
            if bumper.cart_count() == 3 {
                bumper.inc_qty("p1").unwrap();
            }
        });

        cart.add_item(NewCartItem::new("p1", "Son", 10.0), 3).unwrap();
        assert_eq!(store.cart_count(), 4);
        assert_eq!(cart.count().get_untracked(), 4);
    }

    #[test]
    fn test_failed_write_leaves_signals_untouched() {
        let owner = Owner::new();
        owner.set();

        let storage = MemoryStorage::new();
        let cart = CartContext::new(CartStore::new(
            Rc::new(storage.clone()),
            "cart".to_string(),
        ));
        cart.add_item(NewCartItem::new("p1", "Son", 10.0), 1).unwrap();

        storage.fail_writes(true);
        assert!(cart.inc_qty("p1").is_err());
        assert_eq!(cart.count().get_untracked(), 1);
    }
}
