//! Cart Aggregate
//!
//! One entry per product id, kept in insertion order. Quantities never drop
//! below one; only `remove_item` and `clear` take entries out.

use rust_decimal::Decimal;
use crate::domain::aggregates::Product;
use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::value_objects::{line_amount, sum_amounts, Money, Quantity};

#[derive(Clone, Debug)]
pub struct Cart {
    currency: String,
    entries: Vec<CartEntry>,
    events: Vec<DomainEvent>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CartEntry {
    pub product: Product,
    pub quantity: Quantity,
}

impl CartEntry {
    pub fn product_id(&self) -> &str { self.product.id() }
    pub fn line_total(&self) -> Decimal { line_amount(self.product.price(), self.quantity) }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartTotals {
    pub item_count: u64,
    pub subtotal: Money,
}

impl Cart {
    pub fn new(currency: &str) -> Self {
        Self { currency: currency.to_string(), entries: vec![], events: vec![] }
    }

    /// Rebuilds a cart from stored entries, merging repeated ids.
    pub fn from_entries(currency: &str, entries: impl IntoIterator<Item = CartEntry>) -> Self {
        let mut cart = Self::new(currency);
        for entry in entries { cart.merge(entry.product, entry.quantity); }
        cart
    }

    pub fn currency(&self) -> &str { &self.currency }
    pub fn entries(&self) -> &[CartEntry] { &self.entries }
    pub fn get(&self, product_id: &str) -> Option<&CartEntry> { self.entries.iter().find(|e| e.product_id() == product_id) }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn add_item(&mut self, product: &Product, quantity: Quantity) {
        let quantity = self.merge(product.clone(), quantity);
        self.raise_event(DomainEvent::Cart(CartEvent::ItemAdded { product_id: product.id().to_string(), quantity }));
    }

    pub fn increment(&mut self, product_id: &str) -> bool {
        self.adjust(product_id, |q| q.increment())
    }

    /// Floors at one; returns false when nothing changed.
    pub fn decrement(&mut self, product_id: &str) -> bool {
        self.adjust(product_id, |q| q.decrement())
    }

    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.product_id() != product_id);
        if self.entries.len() == before { return false; }
        self.raise_event(DomainEvent::Cart(CartEvent::ItemRemoved { product_id: product_id.to_string() }));
        true
    }

    pub fn clear(&mut self) -> bool {
        if self.entries.is_empty() { return false; }
        self.entries.clear();
        self.raise_event(DomainEvent::Cart(CartEvent::Cleared));
        true
    }

    pub fn totals(&self) -> CartTotals {
        let item_count = self.entries.iter().map(|e| u64::from(e.quantity.value())).sum();
        let subtotal = sum_amounts(self.entries.iter().map(CartEntry::line_total));
        CartTotals { item_count, subtotal: Money::new(subtotal, &self.currency) }
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }

    fn merge(&mut self, product: Product, quantity: Quantity) -> Quantity {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.product_id() == product.id()) {
            existing.quantity = existing.quantity.add(quantity);
            existing.quantity
        } else {
            self.entries.push(CartEntry { product, quantity });
            quantity
        }
    }

    fn adjust(&mut self, product_id: &str, step: impl Fn(Quantity) -> Quantity) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.product_id() == product_id) else { return false };
        let next = step(entry.quantity);
        if next == entry.quantity { return false; }
        entry.quantity = next;
        self.raise_event(DomainEvent::Cart(CartEvent::QuantityChanged { product_id: product_id.to_string(), quantity: next }));
        true
    }

    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}
