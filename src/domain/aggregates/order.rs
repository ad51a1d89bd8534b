//! Order Aggregate
//!
//! An order is a frozen copy of the cart taken at checkout plus the validated
//! customer. Its transcript is the chat message sent to the store.

use crate::domain::aggregates::{CartEntry, CustomerRecord};
use crate::domain::value_objects::{plain_amount, sum_amounts, Money, Quantity};

#[derive(Clone, Debug, PartialEq)]
pub struct Order {
    customer: CustomerRecord,
    items: Vec<LineItem>,
    total: Money,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LineItem { pub product_id: String, pub name: String, pub image: String, pub quantity: Quantity, pub unit_price: Money, pub total: Money }

impl Order {
    pub fn from_cart(customer: CustomerRecord, entries: &[CartEntry], currency: &str) -> Result<Self, OrderError> {
        if entries.is_empty() { return Err(OrderError::NoItems); }
        let items: Vec<LineItem> = entries.iter().map(|e| {
            let unit_price = Money::new(e.product.price(), currency);
            LineItem {
                product_id: e.product_id().to_string(),
                name: e.product.name().to_string(),
                image: e.product.image().to_string(),
                quantity: e.quantity,
                total: unit_price.multiply(e.quantity),
                unit_price,
            }
        }).collect();
        let total = Money::new(sum_amounts(items.iter().map(|i| i.total.amount())), currency);
        Ok(Self { customer, items, total })
    }

    pub fn customer(&self) -> &CustomerRecord { &self.customer }
    pub fn items(&self) -> &[LineItem] { &self.items }
    pub fn total(&self) -> &Money { &self.total }
    pub fn item_count(&self) -> u64 { self.items.iter().map(|i| u64::from(i.quantity.value())).sum() }

    /// Renders the chat message. Same order in, same bytes out.
    pub fn transcript(&self, store_name: &str) -> String {
        let c = &self.customer;
        let mut lines = vec![format!("📦 *New order from {store_name}*"), String::new()];
        lines.push(format!("👤 *Customer*: {}", c.name));
        lines.push(format!("📞 *Phone*: {}", c.phone));
        if let Some(email) = &c.email { lines.push(format!("✉️ *Email*: {email}")); }
        lines.push(format!("📍 *Location*: {}", c.location));
        lines.push(String::new());
        lines.push("🛠️ *Requested items:*".to_string());
        for item in &self.items {
            lines.push(format!(
                "• {} — {} × {} = {}",
                item.name, item.quantity, item.unit_price.plain(), item.total.plain()
            ));
            lines.push(format!("   Image: {}", item.image));
        }
        lines.push(String::new());
        lines.push(format!("💰 *Order total*: {} {}", plain_amount(self.total.amount()), self.total.currency()));
        lines.push(String::new());
        lines.push("🚚 *Please confirm availability and delivery times*".to_string());
        lines.push("🏠 *Installation service available on request*".to_string());
        lines.join("\n")
    }
}

/// Builds transcripts for one store and currency.
#[derive(Clone, Debug)]
pub struct OrderComposer { store_name: String, currency: String }

impl OrderComposer {
    pub fn new(store_name: impl Into<String>, currency: impl Into<String>) -> Self {
        Self { store_name: store_name.into(), currency: currency.into() }
    }

    pub fn store_name(&self) -> &str { &self.store_name }
    pub fn currency(&self) -> &str { &self.currency }

    pub fn compose(&self, customer: &CustomerRecord, entries: &[CartEntry]) -> Result<String, OrderError> {
        Ok(Order::from_cart(customer.clone(), entries, &self.currency)?.transcript(&self.store_name))
    }

    /// Fixed message for checking that the chat link reaches the store.
    pub fn test_message(&self) -> String {
        format!("🔧 Hello! This is a test message from {}. ✅\n\nWe are ready to serve you!", self.store_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum OrderError { NoItems }
impl std::error::Error for OrderError {}
impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "No items") }
}
