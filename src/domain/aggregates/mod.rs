//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;
pub mod customer;

/// Category filter value that matches every product.
pub const ALL_CATEGORIES: &str = "all";

pub use product::{Product, ProductError};
pub use order::{Order, OrderComposer, OrderError, LineItem};
pub use cart::{Cart, CartEntry, CartTotals};
pub use customer::{CustomerForm, CustomerProfile, CustomerRecord, CustomerSubmission, FieldError, ProfileField, ValidationReport};
