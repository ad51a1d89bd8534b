//! Order validator: checks the checkout form and, when it passes, remembers
//! the contact fields for next time. Never touches the cart.

use tracing::debug;

use crate::domain::aggregates::{CustomerForm, ValidationReport};
use crate::store::CustomerProfileStore;

#[derive(Clone)]
pub struct OrderValidator { profiles: CustomerProfileStore }

impl OrderValidator {
    pub fn new(profiles: CustomerProfileStore) -> Self { Self { profiles } }

    pub fn validate(&self, form: &CustomerForm) -> ValidationReport {
        let report = form.validate();
        match report.record() {
            Some(record) => self.profiles.save_record(&record),
            None => debug!(errors = report.errors.len(), "checkout form rejected"),
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, Storage};

    fn form() -> CustomerForm {
        CustomerForm {
            name: "  Mona Adel ".into(),
            phone: "+20 100 123 4567".into(),
            email: "mona@example.com".into(),
            location: "Cairo, Maadi, Street 9".into(),
            terms_accepted: true,
        }
    }

    #[test]
    fn test_success_saves_normalized_profile() {
        let profiles = CustomerProfileStore::new(MemoryStorage::shared(), "shop_customer");
        let report = OrderValidator::new(profiles.clone()).validate(&form());
        assert!(report.is_valid());
        let saved = profiles.load();
        assert_eq!(saved.name.as_deref(), Some("Mona Adel"));
        assert_eq!(saved.phone.as_deref(), Some("201001234567"));
    }

    #[test]
    fn test_saved_profile_has_no_terms_flag() {
        let storage = MemoryStorage::shared();
        let profiles = CustomerProfileStore::new(storage.clone(), "shop_customer");
        assert!(OrderValidator::new(profiles).validate(&form()).is_valid());
        let raw = storage.read("shop_customer").unwrap().unwrap();
        assert!(!raw.contains("terms"), "{raw}");
        let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let fields: Vec<&String> = stored["data"].as_object().unwrap().keys().collect();
        assert_eq!(fields, vec!["email", "location", "name", "phone"]);
    }

    #[test]
    fn test_failure_leaves_profile_untouched() {
        let profiles = CustomerProfileStore::new(MemoryStorage::shared(), "shop_customer");
        let report = OrderValidator::new(profiles.clone()).validate(&CustomerForm { terms_accepted: false, ..form() });
        assert!(!report.is_valid());
        assert!(profiles.load().is_empty());
    }
}
