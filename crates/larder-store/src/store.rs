use chrono::{Duration, Local, NaiveDate};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::models::{
    Category, FoodItem, ItemDraft, Statistics, UsageAction, UsageLogEntry, DATE_FORMAT,
    SOON_WINDOW_DAYS,
};
use crate::query::ItemQuery;

/// Usage-log timestamps, second precision, local time.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The food item store, backed by SQLite
///
/// SQLite was chosen because:
/// - Zero-config embedded database
/// - Battle-tested and reliable
/// - Doesn't require a separate process
///
/// A single interaction thread owns the store, so the only concurrency
/// guarantee needed is SQLite's own write atomicity. Every mutating
/// operation commits before returning and is visible to the next query.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Opens (creating if needed) a store at `path` and migrates its schema.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// In-memory store. Used by tests; also handy for throwaway sessions.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        migrate(&conn)?;
        Ok(Self { conn })
    }

    /// Inserts a validated item and records an `add` usage-log row in the
    /// same transaction. Returns the stored row, id assigned.
    pub fn add_item(&mut self, draft: &ItemDraft) -> StoreResult<FoodItem> {
        let expiry = draft.validate()?;
        let expiry_text = expiry.format(DATE_FORMAT).to_string();

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO food_items (name, category, expiry_date, notes)
             VALUES (?1, ?2, ?3, ?4)",
            params![draft.name, draft.category.label(), expiry_text, draft.notes],
        )?;
        let id = tx.last_insert_rowid();
        log_usage(&tx, &draft.name, UsageAction::Add)?;
        tx.commit()?;

        debug!(id, name = %draft.name, "added food item");
        Ok(FoodItem {
            id,
            name: draft.name.clone(),
            category: draft.category,
            expiry_date: expiry_text,
            notes: draft.notes.clone(),
        })
    }

    /// Replaces every field of an existing item and records an `edit` row.
    pub fn update_item(&mut self, id: i64, draft: &ItemDraft) -> StoreResult<FoodItem> {
        let expiry = draft.validate()?;
        let expiry_text = expiry.format(DATE_FORMAT).to_string();

        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "UPDATE food_items SET name = ?1, category = ?2, expiry_date = ?3, notes = ?4
             WHERE id = ?5",
            params![draft.name, draft.category.label(), expiry_text, draft.notes, id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        log_usage(&tx, &draft.name, UsageAction::Edit)?;
        tx.commit()?;

        debug!(id, name = %draft.name, "updated food item");
        Ok(FoodItem {
            id,
            name: draft.name.clone(),
            category: draft.category,
            expiry_date: expiry_text,
            notes: draft.notes.clone(),
        })
    }

    /// Deletes an item, recording a `delete` row that snapshots its name.
    /// Returns the removed row so callers can echo what went away.
    pub fn delete_item(&mut self, id: i64) -> StoreResult<FoodItem> {
        let tx = self.conn.transaction()?;
        let item = tx
            .query_row(
                "SELECT id, name, category, expiry_date, notes FROM food_items WHERE id = ?1",
                params![id],
                row_to_item,
            )
            .optional()?
            .ok_or(StoreError::NotFound(id))?;
        tx.execute("DELETE FROM food_items WHERE id = ?1", params![id])?;
        log_usage(&tx, &item.name, UsageAction::Delete)?;
        tx.commit()?;

        debug!(id, name = %item.name, "deleted food item");
        Ok(item)
    }

    /// Single item lookup.
    pub fn get_item(&self, id: i64) -> StoreResult<FoodItem> {
        self.conn
            .query_row(
                "SELECT id, name, category, expiry_date, notes FROM food_items WHERE id = ?1",
                params![id],
                row_to_item,
            )
            .optional()?
            .ok_or(StoreError::NotFound(id))
    }

    /// The filtered, sorted listing. Rows with malformed expiry text are
    /// retained - the classifier shows them as expired - but logged so
    /// data corruption doesn't stay invisible.
    pub fn query_items(&self, query: &ItemQuery) -> StoreResult<Vec<FoodItem>> {
        let (sql, params) = query.to_sql();
        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(params.iter()), row_to_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for item in &items {
            if NaiveDate::parse_from_str(&item.expiry_date, DATE_FORMAT).is_err() {
                warn!(
                    id = item.id,
                    value = %item.expiry_date,
                    "item has a malformed expiry date; it will display as expired"
                );
            }
        }
        Ok(items)
    }

    /// Every item in store order. This is the export path: no filtering,
    /// whatever the screen currently shows.
    pub fn all_items(&self) -> StoreResult<Vec<FoodItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, category, expiry_date, notes FROM food_items ORDER BY id",
        )?;
        let items = stmt
            .query_map([], row_to_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    /// Items whose stored expiry date is on or before `cutoff`, earliest
    /// first. ISO text comparison, like every date comparison in here.
    pub fn items_expiring_by(&self, cutoff: NaiveDate) -> StoreResult<Vec<FoodItem>> {
        let cutoff_text = cutoff.format(DATE_FORMAT).to_string();
        let mut stmt = self.conn.prepare(
            "SELECT id, name, category, expiry_date, notes FROM food_items
             WHERE expiry_date <= ?1 ORDER BY expiry_date, id",
        )?;
        let items = stmt
            .query_map(params![cutoff_text], row_to_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    /// Inventory counts relative to `today`.
    pub fn statistics(&self, today: NaiveDate) -> StoreResult<Statistics> {
        let today_text = today.format(DATE_FORMAT).to_string();
        let soon_text = (today + Duration::days(SOON_WINDOW_DAYS))
            .format(DATE_FORMAT)
            .to_string();

        let total = self
            .conn
            .query_row("SELECT COUNT(*) FROM food_items", [], |row| row.get(0))?;
        let expired = self.conn.query_row(
            "SELECT COUNT(*) FROM food_items WHERE expiry_date < ?1",
            params![today_text],
            |row| row.get(0),
        )?;
        let expiring_soon = self.conn.query_row(
            "SELECT COUNT(*) FROM food_items WHERE expiry_date BETWEEN ?1 AND ?2",
            params![today_text, soon_text],
            |row| row.get(0),
        )?;

        let mut stmt = self.conn.prepare(
            "SELECT category, COUNT(*) FROM food_items GROUP BY category ORDER BY category",
        )?;
        let by_category = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
            .into_iter()
            .map(|(label, count)| (Category::parse_lossy(&label), count))
            .collect();

        // Ties break by action name so the ordering is deterministic.
        let mut stmt = self.conn.prepare(
            "SELECT action, COUNT(*) AS uses FROM usage_log
             GROUP BY action ORDER BY uses DESC, action LIMIT 5",
        )?;
        let top_actions = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Statistics {
            total,
            expired,
            expiring_soon,
            by_category,
            top_actions,
        })
    }

    /// The full audit trail in insertion order.
    pub fn usage_log(&self) -> StoreResult<Vec<UsageLogEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, item_name, action, timestamp FROM usage_log ORDER BY id")?;
        let entries = stmt
            .query_map([], |row| {
                Ok(UsageLogEntry {
                    id: row.get(0)?,
                    item_name: row.get(1)?,
                    action: row.get(2)?,
                    timestamp: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }
}

/// Brings the schema up to date. Additive only - columns and tables are
/// created, never dropped or renamed - and safe to run on every startup
/// regardless of prior schema version.
fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS food_items (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            expiry_date TEXT NOT NULL
        )",
        [],
    )?;

    // Stores written before these columns existed get them backfilled
    // with defaults; ids, names and dates are untouched.
    let columns = table_columns(conn, "food_items")?;
    if !columns.iter().any(|c| c == "category") {
        info!("adding category column to food_items");
        conn.execute(
            "ALTER TABLE food_items ADD COLUMN category TEXT NOT NULL DEFAULT 'Other'",
            [],
        )?;
    }
    if !columns.iter().any(|c| c == "notes") {
        info!("adding notes column to food_items");
        conn.execute(
            "ALTER TABLE food_items ADD COLUMN notes TEXT NOT NULL DEFAULT ''",
            [],
        )?;
    }

    conn.execute(
        "CREATE TABLE IF NOT EXISTS usage_log (
            id INTEGER PRIMARY KEY,
            item_name TEXT NOT NULL,
            action TEXT NOT NULL,
            timestamp TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<FoodItem> {
    let category: Option<String> = row.get(2)?;
    let notes: Option<String> = row.get(4)?;
    Ok(FoodItem {
        id: row.get(0)?,
        name: row.get(1)?,
        category: Category::parse_lossy(category.as_deref().unwrap_or_default()),
        expiry_date: row.get(3)?,
        notes: notes.unwrap_or_default(),
    })
}

fn log_usage(conn: &Connection, item_name: &str, action: UsageAction) -> rusqlite::Result<()> {
    let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
    conn.execute(
        "INSERT INTO usage_log (item_name, action, timestamp) VALUES (?1, ?2, ?3)",
        params![item_name, action.as_str(), timestamp],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{CategoryFilter, SortKey};

    fn store() -> Store {
        Store::open_in_memory().unwrap()
    }

    fn draft(name: &str, category: Category, expiry: &str) -> ItemDraft {
        ItemDraft {
            name: name.into(),
            category,
            expiry_date: expiry.into(),
            notes: String::new(),
        }
    }

    fn days_from_today(offset: i64) -> String {
        (Local::now().date_naive() + Duration::days(offset))
            .format(DATE_FORMAT)
            .to_string()
    }

    #[test]
    fn create_then_query_returns_item_exactly_once() {
        let mut store = store();
        let added = store
            .add_item(&draft("Milk", Category::Dairy, "2026-08-10"))
            .unwrap();

        let items = store.query_items(&ItemQuery::default()).unwrap();
        assert_eq!(items, vec![added]);
    }

    #[test]
    fn validation_failure_writes_nothing() {
        let mut store = store();

        let err = store
            .add_item(&draft("", Category::Dairy, "2026-08-10"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let err = store
            .add_item(&draft("Milk", Category::Dairy, "tomorrow"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        assert!(store.all_items().unwrap().is_empty());
        assert!(store.usage_log().unwrap().is_empty());
    }

    #[test]
    fn update_missing_id_is_not_found() {
        let mut store = store();
        let err = store
            .update_item(42, &draft("Milk", Category::Dairy, "2026-08-10"))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(42)));
        assert!(store.usage_log().unwrap().is_empty());
    }

    #[test]
    fn delete_missing_id_leaves_store_unchanged() {
        let mut store = store();
        store
            .add_item(&draft("Milk", Category::Dairy, "2026-08-10"))
            .unwrap();

        let err = store.delete_item(999).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(999)));
        assert_eq!(store.all_items().unwrap().len(), 1);
        assert_eq!(store.usage_log().unwrap().len(), 1);
    }

    #[test]
    fn every_mutation_appends_one_matching_log_row() {
        let mut store = store();
        let start = Local::now().format(TIMESTAMP_FORMAT).to_string();

        let item = store
            .add_item(&draft("Milk", Category::Dairy, "2026-08-10"))
            .unwrap();
        store
            .update_item(item.id, &draft("Oat Milk", Category::Dairy, "2026-08-12"))
            .unwrap();
        store.delete_item(item.id).unwrap();

        let log = store.usage_log().unwrap();
        assert_eq!(log.len(), 3);
        assert_eq!(log[0].action, "add");
        assert_eq!(log[0].item_name, "Milk");
        assert_eq!(log[1].action, "edit");
        assert_eq!(log[1].item_name, "Oat Milk");
        assert_eq!(log[2].action, "delete");
        assert_eq!(log[2].item_name, "Oat Milk");
        // Same second-precision layout, so lexicographic compare is enough.
        for entry in &log {
            assert!(entry.timestamp >= start);
        }
    }

    #[test]
    fn expiry_date_is_normalized_on_write() {
        let mut store = store();
        let item = store
            .add_item(&draft("Eggs", Category::Other, "2026-8-9"))
            .unwrap();
        assert_eq!(item.expiry_date, "2026-08-09");
    }

    #[test]
    fn query_filters_by_category_and_search() {
        let mut store = store();
        store
            .add_item(&draft("Whole Milk", Category::Dairy, "2026-08-10"))
            .unwrap();
        store
            .add_item(&draft("Cheddar", Category::Dairy, "2026-08-20"))
            .unwrap();
        store
            .add_item(&draft("Chicken", Category::Meat, "2026-08-07"))
            .unwrap();

        let dairy = store
            .query_items(&ItemQuery {
                category: CategoryFilter::Only(Category::Dairy),
                ..ItemQuery::default()
            })
            .unwrap();
        assert_eq!(dairy.len(), 2);
        assert!(dairy.iter().all(|i| i.category == Category::Dairy));

        // Substring match is case-insensitive.
        let milk = store
            .query_items(&ItemQuery {
                search: "MILK".into(),
                ..ItemQuery::default()
            })
            .unwrap();
        assert_eq!(milk.len(), 1);
        assert_eq!(milk[0].name, "Whole Milk");
    }

    #[test]
    fn unfiltered_query_returns_everything_in_sort_order() {
        let mut store = store();
        store
            .add_item(&draft("Chicken", Category::Meat, "2026-08-20"))
            .unwrap();
        store
            .add_item(&draft("Milk", Category::Dairy, "2026-08-07"))
            .unwrap();
        store
            .add_item(&draft("Rice", Category::Grains, "2026-08-10"))
            .unwrap();

        let items = store.query_items(&ItemQuery::default()).unwrap();
        let dates: Vec<&str> = items.iter().map(|i| i.expiry_date.as_str()).collect();
        assert_eq!(dates, vec!["2026-08-07", "2026-08-10", "2026-08-20"]);
    }

    #[test]
    fn name_sort_is_case_insensitive() {
        let mut store = store();
        store
            .add_item(&draft("banana", Category::Fruits, "2026-08-10"))
            .unwrap();
        store
            .add_item(&draft("Apple", Category::Fruits, "2026-08-10"))
            .unwrap();
        store
            .add_item(&draft("cherry", Category::Fruits, "2026-08-10"))
            .unwrap();

        let items = store
            .query_items(&ItemQuery {
                sort: SortKey::Name,
                ..ItemQuery::default()
            })
            .unwrap();
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Apple", "banana", "cherry"]);
    }

    #[test]
    fn sort_ties_break_by_insertion_order() {
        let mut store = store();
        let first = store
            .add_item(&draft("Yogurt", Category::Dairy, "2026-08-10"))
            .unwrap();
        let second = store
            .add_item(&draft("Butter", Category::Dairy, "2026-08-10"))
            .unwrap();

        let items = store.query_items(&ItemQuery::default()).unwrap();
        assert_eq!(items[0].id, first.id);
        assert_eq!(items[1].id, second.id);
    }

    #[test]
    fn malformed_expiry_rows_are_retained() {
        let mut store = store();
        store
            .add_item(&draft("Milk", Category::Dairy, "2026-08-10"))
            .unwrap();
        // Corruption can only arrive from outside the write paths.
        store
            .conn
            .execute(
                "INSERT INTO food_items (name, category, expiry_date, notes)
                 VALUES ('Mystery Jar', 'Other', 'not-a-date', '')",
                [],
            )
            .unwrap();

        let items = store.query_items(&ItemQuery::default()).unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().any(|i| i.expiry_date == "not-a-date"));
    }

    #[test]
    fn migration_backfills_category_and_notes() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE food_items (id INTEGER PRIMARY KEY, name TEXT, expiry_date DATE)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO food_items (name, expiry_date) VALUES ('Milk', '2020-01-02')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO food_items (name, expiry_date) VALUES ('Bread', '2020-02-03')",
            [],
        )
        .unwrap();

        let store = Store::from_connection(conn).unwrap();
        let items = store.all_items().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Milk");
        assert_eq!(items[0].expiry_date, "2020-01-02");
        assert_eq!(items[0].category, Category::Other);
        assert_eq!(items[0].notes, "");
        assert_eq!(items[1].name, "Bread");
        assert_eq!(items[1].expiry_date, "2020-02-03");
    }

    #[test]
    fn migration_is_idempotent() {
        let store = store();
        migrate(&store.conn).unwrap();
        migrate(&store.conn).unwrap();

        let columns = table_columns(&store.conn, "food_items").unwrap();
        assert_eq!(
            columns,
            vec!["id", "name", "expiry_date", "category", "notes"]
        );
    }

    #[test]
    fn statistics_counts_by_window_and_category() {
        let mut store = store();
        store
            .add_item(&draft("Old Yogurt", Category::Dairy, &days_from_today(-1)))
            .unwrap();
        store
            .add_item(&draft("Milk", Category::Dairy, &days_from_today(1)))
            .unwrap();
        store
            .add_item(&draft("Spinach", Category::Vegetables, &days_from_today(3)))
            .unwrap();
        store
            .add_item(&draft("Rice", Category::Grains, &days_from_today(30)))
            .unwrap();

        let stats = store.statistics(Local::now().date_naive()).unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.expiring_soon, 2);
        assert_eq!(
            stats.by_category,
            vec![
                (Category::Dairy, 2),
                (Category::Grains, 1),
                (Category::Vegetables, 1),
            ]
        );
    }

    #[test]
    fn top_actions_order_by_count_then_name() {
        let mut store = store();
        let a = store
            .add_item(&draft("Milk", Category::Dairy, "2026-08-10"))
            .unwrap();
        let b = store
            .add_item(&draft("Eggs", Category::Other, "2026-08-11"))
            .unwrap();
        store.delete_item(a.id).unwrap();
        store.delete_item(b.id).unwrap();
        store
            .add_item(&draft("Bread", Category::Grains, "2026-08-12"))
            .unwrap();

        // 3 adds, 2 deletes; the add/delete tie never happens here, but
        // equal counts would come back in action-name order.
        let stats = store.statistics(Local::now().date_naive()).unwrap();
        assert_eq!(
            stats.top_actions,
            vec![("add".to_string(), 3), ("delete".to_string(), 2)]
        );
    }

    #[test]
    fn expiring_cutoff_is_inclusive() {
        let mut store = store();
        store
            .add_item(&draft("Expired", Category::Other, &days_from_today(-2)))
            .unwrap();
        store
            .add_item(&draft("Edge", Category::Other, &days_from_today(3)))
            .unwrap();
        store
            .add_item(&draft("Fresh", Category::Other, &days_from_today(4)))
            .unwrap();

        let cutoff = Local::now().date_naive() + Duration::days(SOON_WINDOW_DAYS);
        let expiring = store.items_expiring_by(cutoff).unwrap();
        let names: Vec<&str> = expiring.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Expired", "Edge"]);
    }
}
