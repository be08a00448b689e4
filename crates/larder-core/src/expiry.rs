//! The reminder pass: find items nearing expiry and alert the user.

use chrono::{Duration, NaiveDate};
use larder_store::{Store, SOON_WINDOW_DAYS};
use tracing::{info, warn};

use crate::classifier::days_until;
use crate::Result;

pub const ALERT_TITLE: &str = "Food Expiry Alert";

/// Seconds an alert stays on screen before the OS dismisses it.
const ALERT_TIMEOUT_SECS: u32 = 5;

/// Delivers OS-level alerts - makes testing easier and keeps the check
/// independent of any particular notification backend.
///
/// Implementations must return quickly; delivery failure is surfaced as a
/// warning by the caller, never escalated.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier {
    fn notify(&self, title: &str, message: &str, timeout_secs: u32) -> Result<()>;
}

/// One item due for a reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiringItem {
    pub name: String,
    pub expiry_date: String,
    /// Negative when already expired.
    pub days_left: i64,
}

impl ExpiringItem {
    pub fn status_line(&self) -> String {
        if self.days_left < 0 {
            format!("{} EXPIRED!", self.name)
        } else {
            format!("{} expires in {} days!", self.name, self.days_left)
        }
    }
}

/// Outcome of a reminder pass. `warnings` holds per-item delivery
/// failures; an empty `items` list means nothing is expiring soon and the
/// caller should say so instead of showing an empty alert set.
#[derive(Debug, Default)]
pub struct ExpiryReport {
    pub items: Vec<ExpiringItem>,
    pub warnings: Vec<String>,
}

impl ExpiryReport {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Selects items with `expiry_date <= today + 3 days`, sends one alert per
/// item, and returns the list for the summary view. A failed notification
/// becomes a warning in the report; it never aborts the check and never
/// touches the underlying data.
pub fn check_expiry(store: &Store, notifier: &dyn Notifier, today: NaiveDate) -> Result<ExpiryReport> {
    let cutoff = today + Duration::days(SOON_WINDOW_DAYS);
    let rows = store.items_expiring_by(cutoff)?;

    let items: Vec<ExpiringItem> = rows
        .into_iter()
        .map(|item| {
            let days_left = days_until(&item.expiry_date, today);
            ExpiringItem {
                name: item.name,
                expiry_date: item.expiry_date,
                days_left,
            }
        })
        .collect();

    if items.is_empty() {
        info!("expiry check: nothing due within {SOON_WINDOW_DAYS} days");
        return Ok(ExpiryReport::default());
    }

    let mut warnings = Vec::new();
    for item in &items {
        if let Err(e) = notifier.notify(ALERT_TITLE, &item.status_line(), ALERT_TIMEOUT_SECS) {
            warn!(item = %item.name, "notification delivery failed: {e}");
            warnings.push(format!("could not notify for {}: {e}", item.name));
        }
    }

    info!(
        count = items.len(),
        failed = warnings.len(),
        "expiry check complete"
    );
    Ok(ExpiryReport { items, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use chrono::Local;
    use larder_store::{Category, ItemDraft, DATE_FORMAT};

    fn seeded_store(offsets: &[(&str, i64)]) -> Store {
        let today = Local::now().date_naive();
        let mut store = Store::open_in_memory().unwrap();
        for (name, offset) in offsets {
            store
                .add_item(&ItemDraft {
                    name: (*name).into(),
                    category: Category::Other,
                    expiry_date: (today + Duration::days(*offset))
                        .format(DATE_FORMAT)
                        .to_string(),
                    notes: String::new(),
                })
                .unwrap();
        }
        store
    }

    #[test]
    fn notifies_once_per_expiring_item() {
        let store = seeded_store(&[("Old Milk", -1), ("Spinach", 1), ("Rice", 10)]);
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .times(2)
            .returning(|_, _, _| Ok(()));

        let today = Local::now().date_naive();
        let report = check_expiry(&store, &notifier, today).unwrap();

        assert_eq!(report.items.len(), 2);
        assert!(report.warnings.is_empty());
        assert_eq!(report.items[0].name, "Old Milk");
        assert_eq!(report.items[0].days_left, -1);
        assert!(report.items[0].status_line().contains("EXPIRED"));
        assert_eq!(report.items[1].name, "Spinach");
        assert_eq!(report.items[1].days_left, 1);
        assert_eq!(report.items[1].status_line(), "Spinach expires in 1 days!");
    }

    #[test]
    fn delivery_failure_becomes_warning_not_error() {
        let store = seeded_store(&[("Old Milk", -1), ("Spinach", 1)]);
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .times(2)
            .returning(|_, _, _| Err(Error::Notification("bus unreachable".into())));

        let report = check_expiry(&store, &notifier, Local::now().date_naive()).unwrap();

        assert_eq!(report.items.len(), 2);
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings[0].contains("Old Milk"));
        assert!(report.warnings[0].contains("bus unreachable"));
    }

    #[test]
    fn empty_selection_yields_empty_report() {
        let store = seeded_store(&[("Rice", 30)]);
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();

        let report = check_expiry(&store, &notifier, Local::now().date_naive()).unwrap();
        assert!(report.is_empty());
        assert!(report.warnings.is_empty());
    }
}
