//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_WHATSAPP_NUMBER` - store chat contact, any formatting, 8-15 digits
//!
//! ## Optional
//! - `STOREFRONT_NAME` - store name in order messages (default: AquaTech Pro)
//! - `STOREFRONT_CURRENCY` - currency code (default: EGP)
//! - `STOREFRONT_CATALOG_PATH` - product catalog JSON (default: ./products-data.json)
//! - `STOREFRONT_DATA_DIR` - durable storage directory (default: ./.storefront)
//! - `STOREFRONT_STORAGE_NAMESPACE` - storage slot prefix (default: aquatech)
//! - `STOREFRONT_DEEP_LINK_PREFIX` - chat link prefix (default: https://wa.me)
//! - `STOREFRONT_OPEN_COMMAND` - program that opens links; unset prints them
//! - `STOREFRONT_DISPATCH_DELAY_MS` - pause before opening the link (default: 500)
//! - `STOREFRONT_ACK_WINDOW_MINS` - thank-you notice window (default: 30)
//! - `STOREFRONT_LOG_LEVEL` - fallback log filter when `RUST_LOG` is unset (default: info)

use std::env::VarError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::dispatch::DEFAULT_LINK_PREFIX;
use crate::domain::value_objects::PhoneNumber;
use crate::store::DEFAULT_ACK_WINDOW_MINS;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_name: String,
    pub whatsapp_number: PhoneNumber,
    pub currency: String,
    pub catalog_path: PathBuf,
    pub data_dir: PathBuf,
    pub storage_namespace: String,
    pub deep_link_prefix: String,
    pub open_command: Option<String>,
    pub dispatch_delay: Duration,
    pub ack_window_mins: i64,
    pub log_level: String,
}

/// Loads `.env` first, then reads the process environment.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_app_config(|key| std::env::var(key))
}

/// Parsing and validation, decoupled from the real environment for tests.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).ok().filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar { var: var.to_string(), reason };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default).trim().parse::<u64>().map_err(|e| invalid(var, e.to_string()))
    };

    let whatsapp_number = PhoneNumber::parse(&require("STOREFRONT_WHATSAPP_NUMBER")?)
        .map_err(|e| invalid("STOREFRONT_WHATSAPP_NUMBER", e.to_string()))?;

    let currency = or_default("STOREFRONT_CURRENCY", "EGP").trim().to_uppercase();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid("STOREFRONT_CURRENCY", format!("{currency:?} is not a three-letter code")));
    }

    let storage_namespace = or_default("STOREFRONT_STORAGE_NAMESPACE", "aquatech");
    if !storage_namespace.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(invalid("STOREFRONT_STORAGE_NAMESPACE", "only letters, digits, '_' and '-' are allowed".into()));
    }

    let ack_window_mins = parse_u64("STOREFRONT_ACK_WINDOW_MINS", &DEFAULT_ACK_WINDOW_MINS.to_string())?;
    let ack_window_mins = i64::try_from(ack_window_mins).map_err(|e| invalid("STOREFRONT_ACK_WINDOW_MINS", e.to_string()))?;

    Ok(AppConfig {
        store_name: or_default("STOREFRONT_NAME", "AquaTech Pro"),
        whatsapp_number,
        currency,
        catalog_path: PathBuf::from(or_default("STOREFRONT_CATALOG_PATH", "./products-data.json")),
        data_dir: PathBuf::from(or_default("STOREFRONT_DATA_DIR", "./.storefront")),
        storage_namespace,
        deep_link_prefix: or_default("STOREFRONT_DEEP_LINK_PREFIX", DEFAULT_LINK_PREFIX),
        open_command: lookup("STOREFRONT_OPEN_COMMAND").ok().filter(|v| !v.trim().is_empty()),
        dispatch_delay: Duration::from_millis(parse_u64("STOREFRONT_DISPATCH_DELAY_MS", "500")?),
        ack_window_mins,
        log_level: or_default("STOREFRONT_LOG_LEVEL", "info"),
    })
}
