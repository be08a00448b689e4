//! Freshness classification - the one piece of genuinely pure logic here.

use chrono::{Duration, NaiveDate};
use larder_store::{DATE_FORMAT, SOON_WINDOW_DAYS};

/// Derived freshness of an item relative to a reference date. Never
/// stored; recomputed wherever items are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Expired,
    Soon,
    Fresh,
}

impl Freshness {
    pub fn label(&self) -> &'static str {
        match self {
            Freshness::Expired => "expired",
            Freshness::Soon => "soon",
            Freshness::Fresh => "fresh",
        }
    }
}

impl std::fmt::Display for Freshness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// `Expired` strictly before `today`; `Soon` from `today` through
/// `today + 3` inclusive; `Fresh` beyond that.
pub fn classify(expiry: NaiveDate, today: NaiveDate) -> Freshness {
    if expiry < today {
        Freshness::Expired
    } else if expiry - today <= Duration::days(SOON_WINDOW_DAYS) {
        Freshness::Soon
    } else {
        Freshness::Fresh
    }
}

/// Classifies stored expiry text. Legacy rows may hold anything; text
/// that does not parse counts as expired so the listing never fails to
/// render, and the raw value stays the display text.
pub fn classify_raw(raw: &str, today: NaiveDate) -> Freshness {
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(expiry) => classify(expiry, today),
        Err(_) => Freshness::Expired,
    }
}

/// Signed days until expiry; negative means already expired. Malformed
/// text counts as one day past, consistent with [`classify_raw`].
pub fn days_until(raw: &str, today: NaiveDate) -> i64 {
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(expiry) => (expiry - today).num_days(),
        Err(_) => -1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_store::{Category, ItemDraft, ItemQuery, Store};

    fn day(text: &str) -> NaiveDate {
        NaiveDate::parse_from_str(text, DATE_FORMAT).unwrap()
    }

    #[test]
    fn window_boundaries() {
        let today = day("2026-08-05");
        assert_eq!(classify(day("2026-08-04"), today), Freshness::Expired);
        assert_eq!(classify(day("2026-08-05"), today), Freshness::Soon);
        assert_eq!(classify(day("2026-08-08"), today), Freshness::Soon);
        assert_eq!(classify(day("2026-08-09"), today), Freshness::Fresh);
    }

    #[test]
    fn far_dates() {
        let today = day("2026-08-05");
        assert_eq!(classify(day("2020-01-01"), today), Freshness::Expired);
        assert_eq!(classify(day("2030-01-01"), today), Freshness::Fresh);
    }

    #[test]
    fn malformed_text_counts_as_expired() {
        let today = day("2026-08-05");
        assert_eq!(classify_raw("not-a-date", today), Freshness::Expired);
        assert_eq!(classify_raw("", today), Freshness::Expired);
        assert_eq!(classify_raw("2026-08-06", today), Freshness::Soon);
        assert_eq!(days_until("not-a-date", today), -1);
        assert_eq!(days_until("2026-08-01", today), -4);
        assert_eq!(days_until("2026-08-15", today), 10);
    }

    #[test]
    fn milk_example_end_to_end() {
        let today = chrono::Local::now().date_naive();
        let mut store = Store::open_in_memory().unwrap();
        for (name, offset) in [("Milk", 1), ("Yogurt", -1), ("Cheddar", 10)] {
            store
                .add_item(&ItemDraft {
                    name: name.into(),
                    category: Category::Dairy,
                    expiry_date: (today + Duration::days(offset))
                        .format(DATE_FORMAT)
                        .to_string(),
                    notes: String::new(),
                })
                .unwrap();
        }

        let items = store.query_items(&ItemQuery::default()).unwrap();
        let tags: Vec<(&str, Freshness)> = items
            .iter()
            .map(|i| (i.name.as_str(), classify_raw(&i.expiry_date, today)))
            .collect();
        assert!(tags.contains(&("Milk", Freshness::Soon)));
        assert!(tags.contains(&("Yogurt", Freshness::Expired)));
        assert!(tags.contains(&("Cheddar", Freshness::Fresh)));
    }
}
