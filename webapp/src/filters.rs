use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::events::Category;

/// Everything the filter form lets the user pick. Dates are kept as typed
/// into the inputs and only interpreted when building the query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub start: String,
    pub end: String,
    categories: Vec<Category>,
    pub query: String,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected categories in the order they were picked.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn is_selected(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    /// Select `category` if it isn't, deselect it if it is. Returns whether
    /// it is selected afterwards.
    pub fn toggle_category(&mut self, category: Category) -> bool {
        if self.is_selected(category) {
            self.categories.retain(|&c| c != category);
            false
        } else {
            self.categories.push(category);
            true
        }
    }

    /// Query string for `/api/events`, without the leading `?`. Unset
    /// filters are left out entirely. A start date after the end date is
    /// passed through as is.
    pub fn to_query_string(&self) -> String {
        let mut params = QueryParams::default();
        if let Some(start) = date_param("start", &self.start) {
            params.push("start", &start);
        }
        if let Some(end) = date_param("end", &self.end) {
            params.push("end", &end);
        }
        if !self.categories.is_empty() {
            let keys: Vec<&str> = self.categories.iter().map(|c| c.key()).collect();
            params.push("types", &keys.join(","));
        }
        if !self.query.is_empty() {
            params.push("q", &self.query);
        }
        params.finish()
    }
}

fn date_param(name: &str, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let instant = iso_instant(raw);
    if instant.is_none() {
        log::warn!("ignoring {name} filter, {raw:?} is not a date");
    }
    instant
}

/// Interpret a date input value as an ISO-8601 UTC instant with millisecond
/// precision. A bare `YYYY-MM-DD` is midnight UTC of that day.
pub fn iso_instant(raw: &str) -> Option<String> {
    let utc = if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?)
    } else if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        dt.with_timezone(&Utc)
    } else if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        Utc.from_utc_datetime(&naive)
    } else {
        return None;
    };
    Some(utc.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}

/// Escaped in query keys and values: everything except RFC 3986 unreserved
/// characters, `:` and `,`, so instants and category lists stay readable.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b':')
    .remove(b',');

#[derive(Default)]
struct QueryParams {
    out: String,
}

impl QueryParams {
    fn push(&mut self, key: &str, value: &str) {
        if !self.out.is_empty() {
            self.out.push('&');
        }
        self.out.extend(utf8_percent_encode(key, QUERY_VALUE));
        self.out.push('=');
        self.out.extend(utf8_percent_encode(value, QUERY_VALUE));
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filters_give_empty_query() {
        assert_eq!(FilterState::new().to_query_string(), "");
    }

    #[test]
    fn unset_fields_are_omitted() {
        let mut filters = FilterState::new();
        filters.start = "2024-01-01".into();
        filters.toggle_category(Category::Worship);

        let query = filters.to_query_string();
        assert_eq!(query, "start=2024-01-01T00:00:00.000Z&types=worship");
        assert!(!query.contains("end="));
        assert!(!query.contains("q="));
    }

    #[test]
    fn all_fields_in_order() {
        let mut filters = FilterState::new();
        filters.start = "2024-05-01".into();
        filters.end = "2024-05-31".into();
        filters.toggle_category(Category::Retreat);
        filters.toggle_category(Category::Concert);
        filters.query = "lake house".into();

        assert_eq!(
            filters.to_query_string(),
            "start=2024-05-01T00:00:00.000Z&end=2024-05-31T00:00:00.000Z\
             &types=retreat,concert&q=lake%20house"
        );
    }

    #[test]
    fn inverted_range_is_passed_through() {
        let mut filters = FilterState::new();
        filters.start = "2025-01-01".into();
        filters.end = "2024-01-01".into();
        assert_eq!(
            filters.to_query_string(),
            "start=2025-01-01T00:00:00.000Z&end=2024-01-01T00:00:00.000Z"
        );
    }

    #[test]
    fn free_text_is_percent_encoded() {
        let mut filters = FilterState::new();
        filters.query = "rock & roll=fun?/é".into();
        assert_eq!(
            filters.to_query_string(),
            "q=rock%20%26%20roll%3Dfun%3F%2F%C3%A9"
        );

        // A literal plus must not read back as a space.
        filters.query = "c++ 1+1".into();
        assert_eq!(filters.to_query_string(), "q=c%2B%2B%201%2B1");
    }

    #[test]
    fn unparseable_dates_are_dropped() {
        let mut filters = FilterState::new();
        filters.start = "next tuesday".into();
        filters.end = "2024-02-30".into();
        assert_eq!(filters.to_query_string(), "");
    }

    #[test]
    fn iso_instant_normalizes_to_utc() {
        assert_eq!(
            iso_instant("2024-06-01T12:30:00+02:00").as_deref(),
            Some("2024-06-01T10:30:00.000Z")
        );
        assert_eq!(
            iso_instant("2024-06-01T08:15").as_deref(),
            Some("2024-06-01T08:15:00.000Z")
        );
    }

    #[test]
    fn toggling_twice_restores_selection() {
        let mut filters = FilterState::new();
        filters.toggle_category(Category::Youth);
        filters.toggle_category(Category::Prayer);
        let before = filters.clone();

        assert!(filters.toggle_category(Category::Worship));
        assert!(!filters.toggle_category(Category::Worship));
        assert_eq!(filters, before);

        assert!(!filters.toggle_category(Category::Youth));
        assert!(filters.toggle_category(Category::Youth));
        assert!(filters.is_selected(Category::Youth));
        assert!(filters.is_selected(Category::Prayer));
        assert_eq!(filters.categories().len(), 2);
    }
}
