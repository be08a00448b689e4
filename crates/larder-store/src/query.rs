//! Typed filter/sort specification for the item listing.
//!
//! Replaces ad hoc string-built SQL with one fixed query path: migration
//! guarantees every column exists, so assembly only varies by which
//! filters the user actually set.

use crate::models::Category;

/// Which categories a listing should include
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Steps through All and each category in turn, for the UI filter key.
    pub fn cycle(&self) -> CategoryFilter {
        match self {
            CategoryFilter::All => CategoryFilter::Only(Category::ALL[0]),
            CategoryFilter::Only(current) => {
                let next = Category::ALL
                    .iter()
                    .position(|c| c == current)
                    .map(|i| i + 1)
                    .unwrap_or(Category::ALL.len());
                match Category::ALL.get(next) {
                    Some(category) => CategoryFilter::Only(*category),
                    None => CategoryFilter::All,
                }
            }
        }
    }
}

impl std::fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("All"),
            CategoryFilter::Only(category) => f.write_str(category.label()),
        }
    }
}

/// Listing order. Name sorting is case-insensitive (`COLLATE NOCASE`),
/// matching the case-insensitive search contract; ties always break by id,
/// i.e. insertion order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    ExpiryDate,
    Name,
    Category,
}

impl SortKey {
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::ExpiryDate => "expiry-date",
            SortKey::Name => "name",
            SortKey::Category => "category",
        }
    }

    pub fn from_label(label: &str) -> Option<SortKey> {
        match label {
            "expiry-date" | "expiry_date" => Some(SortKey::ExpiryDate),
            "name" => Some(SortKey::Name),
            "category" => Some(SortKey::Category),
            _ => None,
        }
    }

    pub fn cycle(&self) -> SortKey {
        match self {
            SortKey::ExpiryDate => SortKey::Name,
            SortKey::Name => SortKey::Category,
            SortKey::Category => SortKey::ExpiryDate,
        }
    }

    fn order_by(&self) -> &'static str {
        match self {
            SortKey::ExpiryDate => "expiry_date",
            SortKey::Name => "name COLLATE NOCASE",
            SortKey::Category => "category",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A filtered, sorted read of the item table
///
/// `search` is a case-insensitive substring match against the name
/// (SQLite `LIKE` semantics, as the original listing always had); empty
/// means no filter.
#[derive(Debug, Clone, Default)]
pub struct ItemQuery {
    pub search: String,
    pub category: CategoryFilter,
    pub sort: SortKey,
}

impl ItemQuery {
    pub(crate) fn to_sql(&self) -> (String, Vec<String>) {
        let mut sql =
            String::from("SELECT id, name, category, expiry_date, notes FROM food_items");
        let mut clauses: Vec<&str> = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let CategoryFilter::Only(category) = self.category {
            clauses.push("category = ?");
            params.push(category.label().to_string());
        }
        if !self.search.is_empty() {
            clauses.push("name LIKE ?");
            params.push(format!("%{}%", self.search));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        sql.push_str(" ORDER BY ");
        sql.push_str(self.sort.order_by());
        sql.push_str(", id");

        (sql, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfiltered_query_has_no_where_clause() {
        let (sql, params) = ItemQuery::default().to_sql();
        assert_eq!(
            sql,
            "SELECT id, name, category, expiry_date, notes FROM food_items \
             ORDER BY expiry_date, id"
        );
        assert!(params.is_empty());
    }

    #[test]
    fn category_and_search_filters_combine() {
        let query = ItemQuery {
            search: "milk".into(),
            category: CategoryFilter::Only(Category::Dairy),
            sort: SortKey::Name,
        };
        let (sql, params) = query.to_sql();
        assert_eq!(
            sql,
            "SELECT id, name, category, expiry_date, notes FROM food_items \
             WHERE category = ? AND name LIKE ? \
             ORDER BY name COLLATE NOCASE, id"
        );
        assert_eq!(params, vec!["Dairy".to_string(), "%milk%".to_string()]);
    }

    #[test]
    fn search_alone_filters_by_name() {
        let query = ItemQuery {
            search: "bread".into(),
            ..ItemQuery::default()
        };
        let (sql, params) = query.to_sql();
        assert!(sql.contains("WHERE name LIKE ?"));
        assert_eq!(params, vec!["%bread%".to_string()]);
    }

    #[test]
    fn category_filter_cycles_through_all() {
        let mut filter = CategoryFilter::All;
        for expected in Category::ALL {
            filter = filter.cycle();
            assert_eq!(filter, CategoryFilter::Only(expected));
        }
        assert_eq!(filter.cycle(), CategoryFilter::All);
    }

    #[test]
    fn sort_key_labels_round_trip() {
        for key in [SortKey::ExpiryDate, SortKey::Name, SortKey::Category] {
            assert_eq!(SortKey::from_label(key.label()), Some(key));
        }
        assert_eq!(SortKey::from_label("expiry_date"), Some(SortKey::ExpiryDate));
        assert_eq!(SortKey::from_label("stars"), None);
    }
}
