pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Ids of the elements in `index.html` the app binds to.
#[derive(Debug, Clone)]
pub struct ElementIds {
    pub app: &'static str,
    pub map_container: &'static str,
    pub map_canvas: &'static str,
    pub map_legend: &'static str,
    pub map_loading: &'static str,
    pub filter_start: &'static str,
    pub filter_end: &'static str,
    pub filter_query: &'static str,
    pub filter_types: &'static str,
    pub event_cards: &'static str,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            app: "app",
            map_container: "map-container",
            map_canvas: "map-canvas",
            map_legend: "map-legend",
            map_loading: "map-loading",
            filter_start: "filter-start",
            filter_end: "filter-end",
            filter_query: "filter-query",
            filter_types: "filter-types",
            event_cards: "event-cards",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub ids: ElementIds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            ids: ElementIds::default(),
        }
    }
}

impl Config {
    /// Defaults, with the backend taken from `BACKEND_URL` at build time if
    /// it was set.
    pub fn from_build_env() -> Self {
        Self::default().with_backend_url(option_env!("BACKEND_URL"))
    }

    /// Override the backend base URL. Blank values are ignored and a
    /// trailing `/` is dropped so paths can be appended directly.
    pub fn with_backend_url(mut self, url: Option<&str>) -> Self {
        if let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) {
            self.backend_url = url.trim_end_matches('/').to_string();
        }
        self
    }
}
