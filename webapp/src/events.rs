use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

use crate::error::Result;
use crate::geometry::CoordGeo;

/// Closed set of event classifications. The wire form is the key the events
/// endpoint understands (`"worship"`, ...); tags this client does not know
/// about are read as [`Category::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Worship,
    Conference,
    Retreat,
    Concert,
    Service,
    Youth,
    Prayer,
    #[default]
    #[serde(other)]
    Other,
}

impl Category {
    /// Every category, in the order the filter form shows them.
    pub const ALL: [Category; 8] = [
        Category::Worship,
        Category::Conference,
        Category::Retreat,
        Category::Concert,
        Category::Service,
        Category::Youth,
        Category::Prayer,
        Category::Other,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::Worship => "worship",
            Category::Conference => "conference",
            Category::Retreat => "retreat",
            Category::Concert => "concert",
            Category::Service => "service",
            Category::Youth => "youth",
            Category::Prayer => "prayer",
            Category::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Worship => "Worship",
            Category::Conference => "Conference",
            Category::Retreat => "Retreat",
            Category::Concert => "Concert",
            Category::Service => "Service",
            Category::Youth => "Youth",
            Category::Prayer => "Prayer",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The endpoint hands out both numeric and string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Number(i64),
    Text(String),
}

impl Default for EventId {
    fn default() -> Self {
        EventId::Text(String::new())
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventId::Number(n) => write!(f, "{n}"),
            EventId::Text(s) => f.write_str(s),
        }
    }
}

// `#[serde(default)]` only covers a missing key; the endpoint also sends
// explicit nulls.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Event {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: EventId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub category: Category,
    pub city: Option<String>,
    pub country: Option<String>,
    pub start_date: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

impl Event {
    /// Location of the event, if it carries both coordinates and both are finite.
    pub fn coordinates(&self) -> Option<CoordGeo> {
        let point = CoordGeo::new(self.longitude?, self.latitude?);
        point.is_finite().then_some(point)
    }

    /// Start date as `M/D/YYYY`, or `None` if missing or unparseable.
    pub fn start_date_label(&self) -> Option<String> {
        let raw = self.start_date.as_deref()?.trim();
        let date = DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.date_naive())
            .or_else(|_| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date())
            })
            .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
            .ok()?;
        Some(date.format("%-m/%-d/%Y").to_string())
    }
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Option<Vec<Event>>,
}

/// Decode an `/api/events` body. A missing or null `items` is an empty list;
/// anything that is not an object with an event array is an error.
pub fn parse_events(body: &str) -> Result<Vec<Event>> {
    let response: EventsResponse = serde_json::from_str(body)?;
    Ok(response.items.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "items": [
            {
                "id": 1,
                "title": "Night of Worship",
                "description": "An evening of songs.",
                "type": "worship",
                "city": "Nashville",
                "country": "USA",
                "start_date": "2024-03-09T19:00:00Z",
                "longitude": -86.78,
                "latitude": 36.16
            },
            {
                "id": "evt-2",
                "title": "Youth Camp",
                "description": "",
                "type": "campfire",
                "start_date": null,
                "longitude": null,
                "latitude": 10.0
            }
        ]
    }"#;

    #[test]
    fn parses_items() {
        let events = parse_events(SAMPLE).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, EventId::Number(1));
        assert_eq!(events[0].category, Category::Worship);
        assert_eq!(events[0].city.as_deref(), Some("Nashville"));
        assert_eq!(events[1].id.to_string(), "evt-2");
        assert_eq!(events[1].country, None);
    }

    #[test]
    fn unknown_category_reads_as_other() {
        let events = parse_events(SAMPLE).unwrap();
        assert_eq!(events[1].category, Category::Other);
    }

    #[test]
    fn missing_or_null_items_is_empty() {
        assert!(parse_events("{}").unwrap().is_empty());
        assert!(parse_events(r#"{"items": null}"#).unwrap().is_empty());
        assert!(parse_events(r#"{"total": 0, "items": []}"#).unwrap().is_empty());
    }

    #[test]
    fn wrong_shape_is_an_error() {
        assert!(parse_events(r#"{"items": 5}"#).is_err());
        assert!(parse_events(r#""hello""#).is_err());
        assert!(parse_events("<html>502 Bad Gateway</html>").is_err());
    }

    #[test]
    fn coordinates_need_both_axes() {
        let events = parse_events(SAMPLE).unwrap();
        let p = events[0].coordinates().unwrap();
        assert_eq!(p.longitude, -86.78);
        assert_eq!(p.latitude, 36.16);
        assert!(events[1].coordinates().is_none());
    }

    #[test]
    fn start_date_label_accepts_common_formats() {
        let mut event = parse_events(SAMPLE).unwrap().remove(0);
        assert_eq!(event.start_date_label().as_deref(), Some("3/9/2024"));

        event.start_date = Some("2024-12-25".into());
        assert_eq!(event.start_date_label().as_deref(), Some("12/25/2024"));

        event.start_date = Some("2024-07-04T10:30:00".into());
        assert_eq!(event.start_date_label().as_deref(), Some("7/4/2024"));

        event.start_date = Some("sometime soon".into());
        assert_eq!(event.start_date_label(), None);
    }

    #[test]
    fn null_fields_do_not_drop_the_item() {
        let events = parse_events(
            r#"{"items": [
                {"id": 1, "title": "Retreat weekend", "type": "retreat"},
                {"id": null, "title": null, "description": null, "type": null,
                 "city": null, "longitude": 12.5, "latitude": 41.9}
            ]}"#,
        )
        .unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].category, Category::Retreat);

        let sparse = &events[1];
        assert_eq!(sparse.id, EventId::default());
        assert_eq!(sparse.title, "");
        assert_eq!(sparse.description, "");
        assert_eq!(sparse.category, Category::Other);
        assert_eq!(sparse.city, None);
        assert!(sparse.coordinates().is_some());
    }
}
