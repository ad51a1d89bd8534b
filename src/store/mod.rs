//! Stores that bind domain state to durable storage slots.
pub mod cart;
pub mod marker;
pub mod profile;

pub use cart::CartStore;
pub use marker::{CompletionMarkerStore, DEFAULT_ACK_WINDOW_MINS};
pub use profile::CustomerProfileStore;
