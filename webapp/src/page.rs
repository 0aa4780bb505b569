use web_sys::{Document, Element};

use crate::config::ElementIds;
use crate::error::{Error, Result};
use crate::events::Event;
use crate::map_view::count_label;

/// How many events get a card below the map.
pub const CARD_LIMIT: usize = 6;

/// What one card shows, independent of the DOM.
#[derive(Debug, Clone, PartialEq)]
pub struct CardContent {
    pub title: String,
    pub description: String,
    pub badge: &'static str,
    pub details: Vec<String>,
}

impl CardContent {
    pub fn from_event(event: &Event) -> Self {
        let details = [
            event.city.clone(),
            event.country.clone(),
            event.start_date_label(),
        ]
        .into_iter()
        .flatten()
        .filter(|d| !d.is_empty())
        .collect();
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            badge: event.category.label(),
            details,
        }
    }
}

pub fn cards_for(events: &[Event]) -> Vec<CardContent> {
    events
        .iter()
        .take(CARD_LIMIT)
        .map(CardContent::from_event)
        .collect()
}

pub(crate) fn element_by_id(document: &Document, id: &str) -> Result<Element> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| Error::MissingElement(id.to_string()))
}

fn set_hidden(element: &Element, hidden: bool) -> Result<()> {
    if hidden {
        element.set_attribute("hidden", "")?;
    } else {
        element.remove_attribute("hidden")?;
    }
    Ok(())
}

/// Everything on the page around the canvas: the count legend, the loading
/// placeholder and the card list.
pub struct PageView {
    document: Document,
    map_container: Element,
    legend: Element,
    loading: Element,
    cards: Element,
}

impl PageView {
    pub fn new(document: &Document, ids: &ElementIds) -> Result<Self> {
        Ok(Self {
            document: document.clone(),
            map_container: element_by_id(document, ids.map_container)?,
            legend: element_by_id(document, ids.map_legend)?,
            loading: element_by_id(document, ids.map_loading)?,
            cards: element_by_id(document, ids.event_cards)?,
        })
    }

    /// While loading, the placeholder stands in for the map.
    pub fn set_loading(&self, loading: bool) -> Result<()> {
        set_hidden(&self.loading, !loading)?;
        set_hidden(&self.map_container, loading)
    }

    pub fn show_events(&self, events: &[Event]) -> Result<()> {
        let label = count_label(events.len());
        self.legend.set_text_content(Some(label.as_str()));
        self.render_cards(events)
    }

    fn render_cards(&self, events: &[Event]) -> Result<()> {
        self.cards.set_text_content(None);
        for card in cards_for(events) {
            let article = self.element("article", "event-card", None)?;
            let title = self.element("h3", "event-title", Some(card.title.as_str()))?;
            article.append_child(&title)?;
            let description =
                self.element("p", "event-description", Some(card.description.as_str()))?;
            article.append_child(&description)?;

            let meta = self.element("div", "event-meta", None)?;
            let badge = self.element("span", "event-badge", Some(card.badge))?;
            meta.append_child(&badge)?;
            for detail in &card.details {
                let span = self.element("span", "event-detail", Some(detail.as_str()))?;
                meta.append_child(&span)?;
            }
            article.append_child(&meta)?;
            self.cards.append_child(&article)?;
        }
        Ok(())
    }

    // Text goes in through text_content so event data is never parsed as HTML.
    fn element(&self, tag: &str, class: &str, text: Option<&str>) -> Result<Element> {
        let el = self.document.create_element(tag)?;
        el.set_class_name(class);
        if let Some(text) = text {
            el.set_text_content(Some(text));
        }
        Ok(el)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::parse_events;

    #[test]
    fn card_shows_location_and_date_when_present() {
        let events = parse_events(
            r#"{"items": [{
                "id": 3, "title": "Summit", "description": "Two days of talks",
                "type": "conference", "city": "Lagos", "country": "Nigeria",
                "start_date": "2024-11-02T09:00:00Z"
            }]}"#,
        )
        .unwrap();
        let card = CardContent::from_event(&events[0]);
        assert_eq!(card.title, "Summit");
        assert_eq!(card.badge, "Conference");
        assert_eq!(card.details, vec!["Lagos", "Nigeria", "11/2/2024"]);
    }

    #[test]
    fn card_skips_missing_details() {
        let events =
            parse_events(r#"{"items": [{"id": 1, "title": "Quiet day", "city": ""}]}"#).unwrap();
        let card = CardContent::from_event(&events[0]);
        assert_eq!(card.badge, "Other");
        assert!(card.details.is_empty());
    }

    #[test]
    fn at_most_six_cards() {
        let items: Vec<String> = (0..9)
            .map(|i| format!(r#"{{"id": {i}, "title": "Event {i}"}}"#))
            .collect();
        let body = format!(r#"{{"items": [{}]}}"#, items.join(","));
        let events = parse_events(&body).unwrap();

        let cards = cards_for(&events);
        assert_eq!(cards.len(), CARD_LIMIT);
        assert_eq!(cards[0].title, "Event 0");
        assert_eq!(cards[5].title, "Event 5");
        assert!(cards_for(&[]).is_empty());
    }
}
