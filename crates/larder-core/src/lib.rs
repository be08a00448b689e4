// Core logic for the larder food tracker - the brain of the operation
pub mod classifier;
pub mod config;
pub mod error;
pub mod expiry;
pub mod export;
pub mod theme;

pub use classifier::{classify, classify_raw, days_until, Freshness};
pub use config::Config;
pub use error::Error;
pub use expiry::{check_expiry, ExpiryReport, ExpiringItem, Notifier};
pub use export::{ExportFormat, Exporter};
pub use theme::Theme;

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
