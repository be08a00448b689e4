use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Expiry dates are stored as ISO calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Items expiring within this many days of today count as "soon".
/// Shared by the freshness classifier, statistics, and the reminder check.
pub const SOON_WINDOW_DAYS: i64 = 3;

/// A tracked food item - the star of the show
///
/// `expiry_date` keeps the raw stored text. Rows written through the
/// create/update paths always hold a normalized `YYYY-MM-DD` value, but
/// legacy rows may carry anything, and the listing must still show them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: i64,
    pub name: String,
    pub category: Category,
    pub expiry_date: String,
    pub notes: String,
}

/// The closed set of item categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Dairy,
    Vegetables,
    Meat,
    Grains,
    Fruits,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Dairy,
        Category::Vegetables,
        Category::Meat,
        Category::Grains,
        Category::Fruits,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Dairy => "Dairy",
            Category::Vegetables => "Vegetables",
            Category::Meat => "Meat",
            Category::Grains => "Grains",
            Category::Fruits => "Fruits",
            Category::Other => "Other",
        }
    }

    /// Exact label lookup, case-insensitive.
    pub fn from_label(label: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label))
    }

    /// Read-time mapping for stored text. Rows that predate the category
    /// column, or that hold text outside the closed set, land in `Other`.
    pub fn parse_lossy(label: &str) -> Category {
        Category::from_label(label).unwrap_or(Category::Other)
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Other
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Validated input for the create and update paths.
#[derive(Debug, Clone, Default)]
pub struct ItemDraft {
    pub name: String,
    pub category: Category,
    pub expiry_date: String,
    pub notes: String,
}

impl ItemDraft {
    /// Checks the write invariants and returns the parsed expiry date.
    /// Nothing is written when this fails.
    pub fn validate(&self) -> StoreResult<NaiveDate> {
        if self.name.is_empty() {
            return Err(StoreError::Validation(
                "food name must not be empty".into(),
            ));
        }
        if self.expiry_date.is_empty() {
            return Err(StoreError::Validation(
                "expiry date must not be empty".into(),
            ));
        }
        NaiveDate::parse_from_str(&self.expiry_date, DATE_FORMAT).map_err(|_| {
            StoreError::Validation(format!(
                "expiry date {:?} is not a YYYY-MM-DD calendar date",
                self.expiry_date
            ))
        })
    }
}

/// What happened to an item, as recorded in the usage log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageAction {
    Add,
    Edit,
    Delete,
}

impl UsageAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageAction::Add => "add",
            UsageAction::Edit => "edit",
            UsageAction::Delete => "delete",
        }
    }
}

impl std::fmt::Display for UsageAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One append-only audit row. `item_name` is a snapshot, not a foreign
/// key, so the entry survives deletion of the item it describes. `action`
/// is kept as raw text on the way out - a legacy log must never fail to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageLogEntry {
    pub id: i64,
    pub item_name: String,
    pub action: String,
    pub timestamp: String,
}

/// Inventory counts for the statistics view
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub total: u32,
    pub expired: u32,
    pub expiring_soon: u32,
    pub by_category: Vec<(Category, u32)>,
    /// Top usage-log actions, most frequent first, ties broken by name.
    pub top_actions: Vec<(String, u32)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_label(category.label()), Some(category));
        }
        assert_eq!(Category::from_label("dairy"), Some(Category::Dairy));
        assert_eq!(Category::from_label("Cheese"), None);
    }

    #[test]
    fn unknown_category_text_maps_to_other() {
        assert_eq!(Category::parse_lossy("Cheese"), Category::Other);
        assert_eq!(Category::parse_lossy(""), Category::Other);
        assert_eq!(Category::parse_lossy("meat"), Category::Meat);
    }

    #[test]
    fn draft_validation() {
        let mut draft = ItemDraft {
            name: "Milk".into(),
            category: Category::Dairy,
            expiry_date: "2026-08-10".into(),
            notes: String::new(),
        };
        assert!(draft.validate().is_ok());

        draft.name.clear();
        assert!(matches!(draft.validate(), Err(StoreError::Validation(_))));

        draft.name = "Milk".into();
        draft.expiry_date = "10/08/2026".into();
        assert!(matches!(draft.validate(), Err(StoreError::Validation(_))));

        draft.expiry_date = String::new();
        assert!(matches!(draft.validate(), Err(StoreError::Validation(_))));
    }
}
