use larder_store::FoodItem;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::{Error, Result};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Exporter for the item table
///
/// Callers hand over `Store::all_items()` output: the export always covers
/// the full table in store order, whatever filter the screen has active.
pub struct Exporter;

impl Exporter {
    /// Export items to a file with automatic format detection
    pub fn export_to_file<P: AsRef<Path>>(items: &[FoodItem], path: P) -> Result<()> {
        let path = path.as_ref();

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ExportFormat::from_extension)
            .ok_or_else(|| {
                Error::Export(
                    "could not determine export format from extension; use .csv or .json"
                        .to_string(),
                )
            })?;

        Self::export_to_file_with_format(items, path, format)
    }

    /// Export items to a file with explicit format
    pub fn export_to_file_with_format<P: AsRef<Path>>(
        items: &[FoodItem],
        path: P,
        format: ExportFormat,
    ) -> Result<()> {
        let content = match format {
            ExportFormat::Csv => Self::to_csv(items),
            ExportFormat::Json => Self::to_json(items)?,
        };

        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Render items as CSV: a fixed header plus one row per item.
    pub fn to_csv(items: &[FoodItem]) -> String {
        let mut output = String::new();
        output.push_str("ID,Name,Category,Expiry Date,Notes\n");

        for item in items {
            output.push_str(&format!(
                "{},{},{},{},{}\n",
                item.id,
                Self::escape_csv(&item.name),
                item.category,
                Self::escape_csv(&item.expiry_date),
                Self::escape_csv(&item.notes),
            ));
        }

        output
    }

    /// Render items as pretty-printed JSON.
    pub fn to_json(items: &[FoodItem]) -> Result<String> {
        serde_json::to_string_pretty(items)
            .map_err(|e| Error::Export(format!("failed to serialize JSON: {e}")))
    }

    /// Escape CSV special characters
    fn escape_csv(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_store::{Category, CategoryFilter, ItemDraft, ItemQuery, Store};

    fn item(id: i64, name: &str, notes: &str) -> FoodItem {
        FoodItem {
            id,
            name: name.to_string(),
            category: Category::Dairy,
            expiry_date: "2026-08-10".to_string(),
            notes: notes.to_string(),
        }
    }

    #[test]
    fn format_detection() {
        assert_eq!(ExportFormat::from_extension("csv"), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::from_extension("CSV"), Some(ExportFormat::Csv));
        assert_eq!(
            ExportFormat::from_extension("json"),
            Some(ExportFormat::Json)
        );
        assert_eq!(ExportFormat::from_extension("txt"), None);
    }

    #[test]
    fn csv_has_header_plus_one_line_per_item() {
        let items = vec![item(1, "Milk", ""), item(2, "Eggs", "a dozen")];
        let csv = Exporter::to_csv(&items);

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "ID,Name,Category,Expiry Date,Notes");
        assert_eq!(lines[1], "1,Milk,Dairy,2026-08-10,");
        assert_eq!(lines[2], "2,Eggs,Dairy,2026-08-10,a dozen");
    }

    #[test]
    fn csv_escaping() {
        assert_eq!(Exporter::escape_csv("simple"), "simple");
        assert_eq!(Exporter::escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(Exporter::escape_csv("with\"quote"), "\"with\"\"quote\"");

        let items = vec![item(1, "Salt, coarse", "")];
        let csv = Exporter::to_csv(&items);
        assert!(csv.contains("\"Salt, coarse\""));
    }

    #[test]
    fn json_export_round_trips_names() {
        let items = vec![item(7, "Milk", "")];
        let json = Exporter::to_json(&items).unwrap();
        assert!(json.contains("\"Milk\""));
        assert!(json.contains("\"Dairy\""));
    }

    #[test]
    fn export_covers_full_table_regardless_of_filter() {
        let mut store = Store::open_in_memory().unwrap();
        for (name, category) in [
            ("Milk", Category::Dairy),
            ("Chicken", Category::Meat),
            ("Rice", Category::Grains),
        ] {
            store
                .add_item(&ItemDraft {
                    name: name.into(),
                    category,
                    expiry_date: "2026-08-10".into(),
                    notes: String::new(),
                })
                .unwrap();
        }

        // An active on-screen filter narrows the listing to one row...
        let filtered = store
            .query_items(&ItemQuery {
                category: CategoryFilter::Only(Category::Meat),
                ..ItemQuery::default()
            })
            .unwrap();
        assert_eq!(filtered.len(), 1);

        // ...but the export path reads the whole table.
        let csv = Exporter::to_csv(&store.all_items().unwrap());
        assert_eq!(csv.lines().count(), 4);
    }
}
