use futures::future::LocalBoxFuture;
use futures::lock::{Mutex, MutexGuard};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::error::{describe_js, Error, Result};
use crate::events::{parse_events, Event};

/// Anything that can answer an events query. The browser implementation is
/// [`EventsClient`]; tests substitute their own.
pub trait EventSource {
    fn fetch_events<'a>(&'a self, query: &'a str) -> LocalBoxFuture<'a, Result<Vec<Event>>>;
}

/// Talks to `{base_url}/api/events` through the window's `fetch`.
#[derive(Debug, Clone)]
pub struct EventsClient {
    base_url: String,
}

impl EventsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn events_url(&self, query: &str) -> String {
        if query.is_empty() {
            format!("{}/api/events", self.base_url)
        } else {
            format!("{}/api/events?{}", self.base_url, query)
        }
    }
}

impl EventSource for EventsClient {
    fn fetch_events<'a>(&'a self, query: &'a str) -> LocalBoxFuture<'a, Result<Vec<Event>>> {
        Box::pin(async move {
            let url = self.events_url(query);
            log::debug!("GET {url}");
            let body = fetch_text(&url).await?;
            parse_events(&body)
        })
    }
}

async fn fetch_text(url: &str) -> Result<String> {
    let window = web_sys::window().ok_or_else(|| Error::Network("no window".into()))?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| Error::Network(describe_js(&e)))?;
    let response: web_sys::Response = response
        .dyn_into()
        .map_err(|_| Error::Network("fetch did not resolve to a Response".into()))?;
    if !response.ok() {
        return Err(Error::HttpStatus(response.status()));
    }
    let text = response.text().map_err(|e| Error::Network(describe_js(&e)))?;
    let text = JsFuture::from(text)
        .await
        .map_err(|e| Error::Network(describe_js(&e)))?;
    text.as_string()
        .ok_or_else(|| Error::Network("response body is not text".into()))
}

/// Run one query against `source`. Failures never escape: they are logged
/// and the result is an empty list, which the page shows as "0 events".
pub async fn load_events(source: &impl EventSource, query: &str) -> Vec<Event> {
    match source.fetch_events(query).await {
        Ok(events) => {
            log::info!("loaded {} events", events.len());
            events
        }
        Err(err) => {
            log::error!("failed to load events: {err}");
            Vec::new()
        }
    }
}

/// Ticket handed out for each request; only the most recent one may update
/// the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Monotonic request counter. Overlapping fetches can resolve in any order,
/// so a response is applied only if its ticket is still the latest issued.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: u64,
}

impl RequestSequence {
    pub fn begin(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    pub fn is_latest(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }
}

/// Which query the page last asked for and which request may still update it.
#[derive(Debug, Default)]
pub struct EventFeed {
    requests: RequestSequence,
    // `None` until the first request.
    last_query: Option<String>,
}

impl EventFeed {
    /// Ticket for a request with `query`, or `None` if the last issued
    /// request already asked exactly that.
    pub fn issue(&mut self, query: &str) -> Option<Ticket> {
        if self.last_query.as_deref() == Some(query) {
            return None;
        }
        self.last_query = Some(query.to_string());
        Some(self.requests.begin())
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.requests.is_latest(ticket)
    }
}

/// State that owns an [`EventFeed`] and knows its current query.
pub trait FeedState {
    fn feed(&mut self) -> &mut EventFeed;

    fn query(&self) -> String;

    /// Called under the lock once a request has been issued.
    fn on_issue(&mut self) {}
}

/// Fetch from `source` if the state's query changed since the last request.
/// Returns the locked state together with the events when the response is
/// still the latest one, `None` if nothing was fetched or a newer request
/// superseded this one.
///
/// The lock is released while the request is in flight.
pub async fn refresh_feed<'s, T, S>(
    state: &'s Mutex<T>,
    source: &S,
) -> Option<(MutexGuard<'s, T>, Vec<Event>)>
where
    T: FeedState,
    S: EventSource,
{
    let (ticket, query) = {
        let mut guard = state.lock().await;
        let query = guard.query();
        let ticket = guard.feed().issue(&query)?;
        guard.on_issue();
        (ticket, query)
    };
    let events = load_events(source, &query).await;

    let mut guard = state.lock().await;
    if !guard.feed().is_current(ticket) {
        log::debug!("dropping stale response for {query:?}");
        return None;
    }
    Some((guard, events))
}
