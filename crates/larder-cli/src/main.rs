use anyhow::Context;
use chrono::Local;
use clap::Parser;
use larder_core::{check_expiry, classify_raw, Config, Exporter, Theme};
use larder_notify::DesktopNotifier;
use larder_store::{Category, CategoryFilter, ItemDraft, ItemQuery, SortKey, Store};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "larder")]
#[command(version, about = "Terminal-based food expiry tracker", long_about = None)]
struct Cli {
    /// Override the database file location
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Add a food item
    Add {
        /// Item name
        name: String,
        /// Expiry date, YYYY-MM-DD
        expiry: String,
        /// Category: Dairy, Vegetables, Meat, Grains, Fruits, or Other
        #[arg(long, default_value = "Other")]
        category: String,
        /// Free-text notes
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// List items with their freshness status
    List {
        /// Substring to match against item names (case-insensitive)
        #[arg(long, default_value = "")]
        search: String,
        /// Category name, or "All"
        #[arg(long, default_value = "All")]
        category: String,
        /// Sort order: expiry-date, name, or category
        #[arg(long, default_value = "expiry-date")]
        sort: String,
    },
    /// Edit an item; omitted flags keep their current values
    Edit {
        /// Item id (see `larder list`)
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Expiry date, YYYY-MM-DD
        #[arg(long)]
        expiry: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete an item
    Delete {
        /// Item id (see `larder list`)
        id: i64,
    },
    /// Export every item to a CSV or JSON file
    Export {
        /// Target path; format follows the extension
        path: PathBuf,
    },
    /// Show inventory statistics
    Stats,
    /// Check for items expiring soon and send desktop alerts
    Check,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "larder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("Failed to load configuration")?;

    let db_path = match cli.database {
        Some(path) => path,
        None => config.database_path()?,
    };
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut store = Store::open(&db_path)
        .with_context(|| format!("Failed to open store at {}", db_path.display()))?;
    tracing::debug!("store open at {}", db_path.display());

    match cli.command {
        Some(Commands::Add {
            name,
            expiry,
            category,
            notes,
        }) => {
            let draft = ItemDraft {
                name,
                category: parse_category(&category)?,
                expiry_date: expiry,
                notes,
            };
            let item = store.add_item(&draft)?;
            println!("Added '{}' (id {}), expires {}", item.name, item.id, item.expiry_date);
        }
        Some(Commands::List {
            search,
            category,
            sort,
        }) => {
            let query = ItemQuery {
                search,
                category: parse_filter(&category)?,
                sort: parse_sort(&sort)?,
            };
            list_items(&store, &query)?;
        }
        Some(Commands::Edit {
            id,
            name,
            category,
            expiry,
            notes,
        }) => {
            let current = store.get_item(id)?;
            let draft = ItemDraft {
                name: name.unwrap_or(current.name),
                category: match category {
                    Some(label) => parse_category(&label)?,
                    None => current.category,
                },
                expiry_date: expiry.unwrap_or(current.expiry_date),
                notes: notes.unwrap_or(current.notes),
            };
            let item = store.update_item(id, &draft)?;
            println!("Updated '{}' (id {})", item.name, item.id);
        }
        Some(Commands::Delete { id }) => {
            let removed = store.delete_item(id)?;
            println!("Deleted '{}'", removed.name);
        }
        Some(Commands::Export { path }) => {
            let items = store.all_items()?;
            Exporter::export_to_file(&items, &path)?;
            println!("Exported {} items to {}", items.len(), path.display());
        }
        Some(Commands::Stats) => {
            show_statistics(&store)?;
        }
        Some(Commands::Check) => {
            run_expiry_check(&store)?;
        }
        None => {
            let theme = Theme::by_name(&config.ui.theme).unwrap_or_default();
            let startup_delay = config
                .reminders
                .startup_check
                .then(|| Duration::from_millis(config.reminders.startup_delay_ms));
            let app = larder_tui::App::new(theme);
            larder_tui::run_tui(app, store, startup_delay)?;
        }
    }

    Ok(())
}

fn parse_category(label: &str) -> anyhow::Result<Category> {
    Category::from_label(label).ok_or_else(|| {
        anyhow::anyhow!(
            "unknown category {label:?}; expected one of: Dairy, Vegetables, Meat, Grains, Fruits, Other"
        )
    })
}

fn parse_filter(label: &str) -> anyhow::Result<CategoryFilter> {
    if label.eq_ignore_ascii_case("all") {
        Ok(CategoryFilter::All)
    } else {
        Ok(CategoryFilter::Only(parse_category(label)?))
    }
}

fn parse_sort(label: &str) -> anyhow::Result<SortKey> {
    SortKey::from_label(label).ok_or_else(|| {
        anyhow::anyhow!("unknown sort key {label:?}; expected expiry-date, name, or category")
    })
}

fn list_items(store: &Store, query: &ItemQuery) -> anyhow::Result<()> {
    let items = store.query_items(query)?;
    let today = Local::now().date_naive();

    println!(
        "{:>4}  {:<24} {:<11} {:<12} {:<8} NOTES",
        "ID", "NAME", "CATEGORY", "EXPIRY", "STATUS"
    );
    for item in &items {
        let tag = classify_raw(&item.expiry_date, today);
        println!(
            "{:>4}  {:<24} {:<11} {:<12} {:<8} {}",
            item.id,
            item.name,
            item.category.label(),
            item.expiry_date,
            tag.label(),
            item.notes
        );
    }
    println!();
    println!("{} item(s)", items.len());
    Ok(())
}

fn show_statistics(store: &Store) -> anyhow::Result<()> {
    let stats = store.statistics(Local::now().date_naive())?;

    println!("Food Inventory Statistics");
    println!("=========================");
    println!();
    println!("Total items:         {}", stats.total);
    println!("Expired items:       {}", stats.expired);
    println!("Expiring soon:       {}", stats.expiring_soon);
    println!();
    println!("Category breakdown:");
    for (category, count) in &stats.by_category {
        println!("  {category}: {count} items");
    }
    println!();
    println!("Recent activity:");
    for (action, count) in &stats.top_actions {
        println!("  {action}: {count} times");
    }
    Ok(())
}

fn run_expiry_check(store: &Store) -> anyhow::Result<()> {
    let notifier = DesktopNotifier::new();
    let report = check_expiry(store, &notifier, Local::now().date_naive())?;

    if report.is_empty() {
        println!("No items are expiring soon.");
        return Ok(());
    }

    println!("Items expiring:");
    for item in &report.items {
        println!("  • {} - {}", item.name, item.expiry_date);
    }
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    Ok(())
}
