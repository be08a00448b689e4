// SQLite persistence for food items and the usage log
// Owns schema migration so the rest of the app can assume every column exists

pub mod error;
pub mod models;
pub mod query;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use models::{
    Category, FoodItem, ItemDraft, Statistics, UsageAction, UsageLogEntry, DATE_FORMAT,
    SOON_WINDOW_DAYS,
};
pub use query::{CategoryFilter, ItemQuery, SortKey};
pub use store::Store;
