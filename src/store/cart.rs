//! Cart store: the cart aggregate bound to its storage slot.
//!
//! Each mutation that changes the cart is flushed before the call returns.
//! Unknown product ids are ignored.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::domain::aggregates::{Cart, CartEntry, CartTotals, Product};
use crate::domain::events::DomainEvent;
use crate::domain::value_objects::Quantity;
use crate::storage::slot::{self, Decoded};
use crate::storage::SharedStorage;

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry { id: String, product: Product, qty: Quantity }

pub struct CartStore {
    cart: Cart,
    catalog: Arc<Catalog>,
    storage: SharedStorage,
    key: String,
}

impl CartStore {
    /// Opens the store and hydrates it from `key`; unreadable data yields an empty cart.
    pub fn open(storage: SharedStorage, key: impl Into<String>, catalog: Arc<Catalog>, currency: &str) -> Self {
        let key = key.into();
        let cart = Cart::from_entries(currency, load_entries(storage.as_ref(), &key));
        debug!(key = %key, entries = cart.len(), "cart hydrated");
        Self { cart, catalog, storage, key }
    }

    pub fn add(&mut self, product_id: &str, quantity: Quantity) -> bool {
        let Some(product) = self.catalog.find(product_id) else {
            debug!(product_id, "ignoring add for unknown product");
            return false;
        };
        self.cart.add_item(product, quantity);
        self.flush();
        true
    }

    pub fn increment(&mut self, product_id: &str) -> bool {
        let changed = self.cart.increment(product_id);
        self.flush_if(changed)
    }

    pub fn decrement(&mut self, product_id: &str) -> bool {
        let changed = self.cart.decrement(product_id);
        self.flush_if(changed)
    }

    pub fn remove(&mut self, product_id: &str) -> bool {
        let changed = self.cart.remove_item(product_id);
        self.flush_if(changed)
    }

    pub fn clear(&mut self) -> bool {
        let changed = self.cart.clear();
        self.flush_if(changed)
    }

    /// Owned copy; later mutations do not reach it.
    pub fn snapshot(&self) -> Vec<CartEntry> { self.cart.entries().to_vec() }
    pub fn entries(&self) -> &[CartEntry] { self.cart.entries() }
    pub fn get(&self, product_id: &str) -> Option<&CartEntry> { self.cart.get(product_id) }
    pub fn totals(&self) -> CartTotals { self.cart.totals() }
    pub fn is_empty(&self) -> bool { self.cart.is_empty() }
    pub fn currency(&self) -> &str { self.cart.currency() }
    pub fn take_events(&mut self) -> Vec<DomainEvent> { self.cart.take_events() }

    fn flush_if(&self, changed: bool) -> bool {
        if changed { self.flush(); } else { debug!(key = %self.key, "cart unchanged"); }
        changed
    }

    fn flush(&self) {
        let stored: Vec<StoredEntry> = self.cart.entries().iter()
            .map(|e| StoredEntry { id: e.product_id().to_string(), product: e.product.clone(), qty: e.quantity })
            .collect();
        let result = slot::encode(&stored)
            .map_err(|source| crate::storage::StorageError::Encode { key: self.key.clone(), source })
            .and_then(|raw| self.storage.write(&self.key, &raw));
        if let Err(e) = result { warn!(error = %e, "failed to persist cart"); }
    }
}

fn load_entries(storage: &dyn crate::storage::Storage, key: &str) -> Vec<CartEntry> {
    let raw = match storage.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return vec![],
        Err(e) => { warn!(error = %e, "cart slot unreadable, starting empty"); return vec![]; }
    };
    let stored: Result<Vec<StoredEntry>, String> = match slot::decode::<Vec<StoredEntry>>(&raw) {
        Ok(Decoded::Current(entries)) => Ok(entries),
        Ok(Decoded::Legacy(value)) => serde_json::from_value(value).map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    match stored {
        Ok(entries) => entries.into_iter()
            .filter(|s| s.id == s.product.id())
            .map(|s| CartEntry { product: s.product, quantity: s.qty })
            .collect(),
        Err(reason) => { warn!(key, %reason, "discarding corrupt cart slot"); vec![] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, Storage};
    use rust_decimal::Decimal;

    fn catalog() -> Arc<Catalog> {
        Arc::new(Catalog::new(vec![
            Product::new("P1", "Pipe", Decimal::new(100, 0), "pipes"),
            Product::new("P2", "Valve", Decimal::new(35, 0), "valves"),
        ]).unwrap())
    }

    fn open(storage: &Arc<MemoryStorage>) -> CartStore {
        CartStore::open(storage.clone(), "shop_cart", catalog(), "EGP")
    }

    #[test]
    fn test_add_accumulates_and_persists() {
        let storage = MemoryStorage::shared();
        let mut store = open(&storage);
        assert!(store.add("P1", Quantity::new(2)));
        assert!(store.add("P1", Quantity::new(3)));
        assert_eq!(store.entries().len(), 1);
        assert_eq!(store.totals().subtotal.amount(), Decimal::new(500, 0));
        let reopened = open(&storage);
        assert_eq!(reopened.snapshot(), store.snapshot());
    }

    #[test]
    fn test_add_clamps_quantity() {
        let storage = MemoryStorage::shared();
        let mut store = open(&storage);
        assert!(store.add("P2", Quantity::new(0)));
        assert_eq!(store.get("P2").unwrap().quantity, Quantity::ONE);
        assert!(store.add("P1", Quantity::parse_lenient("-7")));
        assert_eq!(store.get("P1").unwrap().quantity, Quantity::ONE);
        assert_eq!(open(&storage).totals().item_count, 2);
    }

    #[test]
    fn test_huge_price_and_quantity_do_not_panic() {
        let catalog = Arc::new(Catalog::from_json(r#"{"products":[{"id":"X","name":"Rare","price":30000000000000000000,"category":"x"}]}"#).unwrap());
        let mut store = CartStore::open(MemoryStorage::shared(), "shop_cart", catalog, "EGP");
        assert!(store.add("X", Quantity::parse_lenient("99999999999")));
        let totals = store.totals();
        assert_eq!(totals.item_count, u64::from(Quantity::MAX.value()));
        assert!(totals.subtotal.amount() > Decimal::ZERO);
    }

    #[test]
    fn test_unknown_product_is_ignored() {
        let storage = MemoryStorage::shared();
        let mut store = open(&storage);
        assert!(!store.add("nope", Quantity::ONE));
        assert!(store.is_empty());
        assert_eq!(storage.read("shop_cart").unwrap(), None);
    }

    #[test]
    fn test_floor_then_remove() {
        let storage = MemoryStorage::shared();
        let mut store = open(&storage);
        store.add("P1", Quantity::ONE);
        for _ in 0..3 { store.decrement("P1"); }
        assert_eq!(store.get("P1").unwrap().quantity, Quantity::ONE);
        assert!(store.remove("P1"));
        assert!(store.snapshot().iter().all(|e| e.product_id() != "P1"));
        assert!(open(&storage).is_empty());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let storage = MemoryStorage::shared();
        let mut store = open(&storage);
        store.add("P1", Quantity::ONE);
        let snapshot = store.snapshot();
        store.increment("P1");
        store.add("P2", Quantity::ONE);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].quantity, Quantity::ONE);
    }

    #[test]
    fn test_corrupt_slot_loads_empty() {
        let storage = MemoryStorage::shared();
        storage.write("shop_cart", "}{ definitely not json").unwrap();
        assert!(open(&storage).is_empty());
        storage.write("shop_cart", r#"{"version":1,"data":[{"id":"P1","product":{"id":"P1"},"qty":2}]}"#).unwrap();
        assert!(open(&storage).is_empty());
        storage.write("shop_cart", r#"{"version":1,"data":[{"id":"P1","product":{"id":"P1","name":"Pipe","price":"100","category":"pipes"},"qty":0}]}"#).unwrap();
        assert!(open(&storage).is_empty());
    }

    #[test]
    fn test_legacy_array_migrates() {
        let storage = MemoryStorage::shared();
        storage.write("shop_cart", r#"[{"id":"P1","product":{"id":"P1","name":"Pipe","price":100,"category":"pipes","img":"p.jpg","description":"d"},"qty":4}]"#).unwrap();
        let store = open(&storage);
        assert_eq!(store.get("P1").unwrap().quantity.value(), 4);
        assert_eq!(store.totals().item_count, 4);
    }

    #[test]
    fn test_clear_persists_empty_cart() {
        let storage = MemoryStorage::shared();
        let mut store = open(&storage);
        store.add("P2", Quantity::new(2));
        assert!(store.clear());
        assert!(!store.clear());
        assert!(open(&storage).is_empty());
        assert_eq!(storage.read("shop_cart").unwrap().as_deref(), Some(r#"{"version":1,"data":[]}"#));
    }
}
