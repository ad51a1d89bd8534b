//! Cart Relay
//!
//! Catalog, cart and order-message core for a single-vendor storefront that
//! checks out by opening a pre-filled chat message to the store.
//!
//! ## Features
//! - Catalog search and category filtering
//! - Cart with durable, versioned local storage
//! - Remembered customer contact details
//! - Checkout form validation
//! - Deterministic order transcripts handed to a chat deep link
//!
//! No payments, taxes, discounts, stock or multi-currency support.

pub mod app;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod storage;
pub mod store;

use thiserror::Error;

pub use app::{CatalogView, Storefront};
pub use catalog::{Catalog, CatalogError};
pub use checkout::{CheckoutError, CheckoutState, Clock, OrderCompletionController, OrderReceipt, OrderValidator, SendOutcome, SystemClock};
pub use config::{AppConfig, ConfigError};
pub use dispatch::{CommandOpener, DeepLinkDispatcher, DispatchError, Dispatcher, HostOpener, LinkOpener, PrintOpener};
pub use domain::aggregates::{Cart, CartEntry, CartTotals, CustomerForm, CustomerProfile, CustomerRecord, FieldError, Order, OrderComposer, Product, ProfileField, ValidationReport};
pub use domain::events::{CartEvent, CheckoutEvent, DomainEvent};
pub use domain::value_objects::{Money, PhoneNumber, Quantity};
pub use storage::{FileStorage, MemoryStorage, SharedStorage, SlotKeys, Storage, StorageError};
pub use store::{CartStore, CompletionMarkerStore, CustomerProfileStore};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Catalog could not be loaded: {0}")]
    Catalog(#[from] CatalogError),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
