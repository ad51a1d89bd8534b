//! Customer Aggregate
//!
//! Raw checkout form input, its normalized and validated form, and the
//! persisted contact profile used to prefill later checkouts.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::{Validate, ValidationError, ValidationErrors};
use crate::domain::value_objects::PhoneNumber;

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Checkout form as typed by the customer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CustomerForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub location: String,
    pub terms_accepted: bool,
}

impl CustomerForm {
    /// Starts a form from saved contact fields. Terms always start unaccepted.
    pub fn prefilled(profile: &CustomerProfile) -> Self {
        Self {
            name: profile.name.clone().unwrap_or_default(),
            phone: profile.phone.clone().unwrap_or_default(),
            email: profile.email.clone().unwrap_or_default(),
            location: profile.location.clone().unwrap_or_default(),
            terms_accepted: false,
        }
    }

    pub fn normalize(&self) -> CustomerSubmission {
        let email = self.email.trim();
        CustomerSubmission {
            name: self.name.trim().to_string(),
            phone: PhoneNumber::digits_of(&self.phone),
            email: (!email.is_empty()).then(|| email.to_string()),
            location: self.location.trim().to_string(),
            terms_accepted: self.terms_accepted,
        }
    }

    /// Runs every rule and collects all violations in field order.
    pub fn validate(&self) -> ValidationReport {
        let fields = self.normalize();
        let mut errors = fields.validate().err().unwrap_or_else(ValidationErrors::new);
        if fields.email.as_deref().is_some_and(|e| !EMAIL_SHAPE.is_match(e)) {
            errors.add("email", ValidationError::new("email_shape"));
        }
        if !fields.terms_accepted {
            errors.add("terms_accepted", ValidationError::new("terms"));
        }
        let failed = errors.field_errors();
        let errors = FieldError::ALL.iter().copied().filter(|f| failed.contains_key(f.field())).collect();
        ValidationReport { errors, fields }
    }
}

/// Trimmed, digits-normalized form fields.
#[derive(Clone, Debug, PartialEq, Eq, Validate)]
pub struct CustomerSubmission {
    #[validate(length(min = 2))]
    pub name: String,
    #[validate(length(min = 8, max = 15))]
    pub phone: String,
    pub email: Option<String>,
    #[validate(length(min = 5))]
    pub location: String,
    pub terms_accepted: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("Please enter your full name.")]
    Name,
    #[error("Phone number must be 8-15 digits in international format (e.g. 201001234567).")]
    Phone,
    #[error("Please enter a valid email address or leave it empty.")]
    Email,
    #[error("Please enter your location in detail (city, district, street).")]
    Location,
    #[error("You must accept the terms and conditions before placing the order.")]
    TermsNotAccepted,
}

impl FieldError {
    pub const ALL: [FieldError; 5] = [Self::Name, Self::Phone, Self::Email, Self::Location, Self::TermsNotAccepted];

    pub fn field(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Location => "location",
            Self::TermsNotAccepted => "terms_accepted",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<FieldError>,
    pub fields: CustomerSubmission,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool { self.errors.is_empty() }

    pub fn messages(&self) -> Vec<String> { self.errors.iter().map(ToString::to_string).collect() }

    /// The validated customer, present only when every rule passed.
    pub fn record(&self) -> Option<CustomerRecord> {
        if !self.is_valid() { return None; }
        let phone = PhoneNumber::parse(&self.fields.phone).ok()?;
        Some(CustomerRecord {
            name: self.fields.name.clone(),
            phone,
            email: self.fields.email.clone(),
            location: self.fields.location.clone(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomerRecord {
    pub name: String,
    pub phone: PhoneNumber,
    pub email: Option<String>,
    pub location: String,
}

/// Contact fields kept between sessions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfileField { Name, Phone, Email, Location }

impl CustomerProfile {
    pub fn is_empty(&self) -> bool { self == &Self::default() }

    pub fn set(&mut self, field: ProfileField, value: &str) {
        let value = value.trim();
        let value = (!value.is_empty()).then(|| value.to_string());
        match field {
            ProfileField::Name => self.name = value,
            ProfileField::Phone => self.phone = value,
            ProfileField::Email => self.email = value,
            ProfileField::Location => self.location = value,
        }
    }
}

impl From<&CustomerRecord> for CustomerProfile {
    fn from(record: &CustomerRecord) -> Self {
        Self {
            name: Some(record.name.clone()),
            phone: Some(record.phone.to_string()),
            email: record.email.clone(),
            location: Some(record.location.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> CustomerForm {
        CustomerForm {
            name: "Ab".into(),
            phone: "12345678".into(),
            email: String::new(),
            location: "Cairo, Nasr City".into(),
            terms_accepted: true,
        }
    }

    #[test]
    fn test_valid_form() {
        let report = form().validate();
        assert!(report.is_valid(), "{:?}", report.errors);
        let record = report.record().unwrap();
        assert_eq!(record.phone.as_str(), "12345678");
        assert_eq!(record.email, None);
    }

    #[test]
    fn test_boundaries() {
        let report = CustomerForm { phone: "1234567".into(), ..form() }.validate();
        assert_eq!(report.errors, vec![FieldError::Phone]);
        let report = CustomerForm { name: " A ".into(), ..form() }.validate();
        assert_eq!(report.errors, vec![FieldError::Name]);
        let report = CustomerForm { phone: "+20 (100) 123-4567".into(), ..form() }.validate();
        assert!(report.is_valid());
        assert_eq!(report.fields.phone, "201001234567");
        let report = CustomerForm { location: "Giza".into(), ..form() }.validate();
        assert_eq!(report.errors, vec![FieldError::Location]);
    }

    #[test]
    fn test_all_errors_collected_in_order() {
        let report = CustomerForm {
            name: "A".into(),
            phone: "12".into(),
            email: "not-an-email".into(),
            location: "x".into(),
            terms_accepted: false,
        }.validate();
        assert_eq!(report.errors, FieldError::ALL.to_vec());
        assert_eq!(report.messages().len(), 5);
        assert!(report.record().is_none());
    }

    #[test]
    fn test_email_shape() {
        assert!(CustomerForm { email: "user@example.com".into(), ..form() }.validate().is_valid());
        assert_eq!(CustomerForm { email: "user@example".into(), ..form() }.validate().errors, vec![FieldError::Email]);
        assert_eq!(CustomerForm { email: "us er@example.com".into(), ..form() }.validate().errors, vec![FieldError::Email]);
        assert!(CustomerForm { email: "   ".into(), ..form() }.validate().is_valid());
    }

    #[test]
    fn test_terms_required() {
        let report = CustomerForm { terms_accepted: false, ..form() }.validate();
        assert_eq!(report.errors, vec![FieldError::TermsNotAccepted]);
    }

    #[test]
    fn test_profile_prefill() {
        let record = form().validate().record().unwrap();
        let profile = CustomerProfile::from(&record);
        let prefilled = CustomerForm::prefilled(&profile);
        assert_eq!(prefilled.name, "Ab");
        assert!(!prefilled.terms_accepted);
        let mut profile = CustomerProfile::default();
        profile.set(ProfileField::Email, "  ");
        assert!(profile.is_empty());
    }
}
