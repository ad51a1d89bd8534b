//! Domain events
use crate::checkout::CheckoutState;
use crate::domain::value_objects::Quantity;
use chrono::{DateTime, Utc};

#[derive(Clone, Debug, PartialEq)]
pub enum DomainEvent {
    Cart(CartEvent),
    Checkout(CheckoutEvent),
}

#[derive(Clone, Debug, PartialEq)]
pub enum CartEvent {
    ItemAdded { product_id: String, quantity: Quantity },
    QuantityChanged { product_id: String, quantity: Quantity },
    ItemRemoved { product_id: String },
    Cleared,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CheckoutEvent {
    StateChanged { from: CheckoutState, to: CheckoutState },
    Rejected { errors: Vec<String> },
    DispatchFailed { reason: String },
    Completed { at: DateTime<Utc>, item_count: u64 },
}
