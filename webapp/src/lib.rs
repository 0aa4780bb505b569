pub mod api;
pub mod config;
pub mod drawing;
pub mod error;
pub mod events;
pub mod filters;
pub mod form;
pub mod geometry;
pub mod map_view;
pub mod page;
mod utils;

use futures::lock::Mutex;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use api::{EventFeed, EventsClient, FeedState};
use config::Config;
use drawing::CanvasSurface;
use error::{Error, Result};
use events::Event;
use filters::FilterState;
use form::FilterForm;
use map_view::{MarkerScene, MarkerStyle};
use page::PageView;

/// Page state shared by every DOM callback.
struct App {
    filters: FilterState,
    form: FilterForm,
    client: EventsClient,
    feed: EventFeed,
    surface: CanvasSurface<MarkerScene>,
    page: PageView,
}

impl App {
    fn show_events(&mut self, events: Vec<Event>) -> Result<()> {
        // The container has to be visible again before the surface measures it.
        self.page.set_loading(false)?;
        self.page.show_events(&events)?;
        self.surface.scene_mut().set_events(events);
        log::debug!(
            "{} of {} events placed on the map",
            self.surface.scene().marker_count(),
            self.surface.scene().events().len()
        );
        self.surface.render()
    }
}

impl FeedState for App {
    fn feed(&mut self) -> &mut EventFeed {
        &mut self.feed
    }

    fn query(&self) -> String {
        self.filters.to_query_string()
    }

    fn on_issue(&mut self) {
        if let Err(err) = self.page.set_loading(true) {
            log::warn!("could not show loading state: {err}");
        }
    }
}

/// Issue a fetch if the filters produce a different query than the last
/// request, then apply the response if no newer request has been issued in
/// the meantime.
async fn refresh(state: Rc<Mutex<App>>) {
    let client = state.lock().await.client.clone();
    // Filter changes keep coming through while the request is in flight.
    if let Some((mut app, events)) = api::refresh_feed(&*state, &client).await {
        if let Err(err) = app.show_events(events) {
            log::error!("failed to render events: {err}");
        }
    }
}

/// Register `cb` for `event` on `target`. The callback mutates the shared
/// state, after which the page is refreshed. The closure is leaked; it has
/// to live as long as the page does.
fn add_leaky_event_listener_with_state(
    state: &Rc<Mutex<App>>,
    target: &web_sys::EventTarget,
    event: &str,
    cb: impl Fn(&mut App, web_sys::Event) + Clone + 'static,
) -> Result<()> {
    let wrapped_state = Rc::clone(state);
    let wrapped_cb = Box::new(Closure::<dyn Fn(web_sys::Event)>::new(
        move |e: web_sys::Event| {
            let my_state = Rc::clone(&wrapped_state);
            let cb = cb.clone();
            spawn_local(async move {
                {
                    let mut app = my_state.lock().await;
                    cb(&mut *app, e);
                }
                refresh(my_state).await;
            })
        },
    ));
    target.add_event_listener_with_callback(
        event,
        Box::leak(wrapped_cb).as_ref().unchecked_ref(),
    )?;
    Ok(())
}

/// Redraw the map whenever `element` changes size.
fn observe_leaky_resize(state: &Rc<Mutex<App>>, element: &web_sys::Element) -> Result<()> {
    let wrapped_state = Rc::clone(state);
    let cb = Box::new(Closure::<dyn Fn(JsValue)>::new(move |_entries: JsValue| {
        let my_state = Rc::clone(&wrapped_state);
        spawn_local(async move {
            let app = my_state.lock().await;
            if let Err(err) = app.surface.render() {
                log::warn!("redraw after resize failed: {err}");
            }
        })
    }));
    let observer = web_sys::ResizeObserver::new(Box::leak(cb).as_ref().unchecked_ref())?;
    observer.observe(element);
    // Never disconnected; the map lives as long as the page.
    std::mem::forget(observer);
    Ok(())
}

fn run() -> Result<()> {
    let window = web_sys::window().ok_or_else(|| Error::Dom("no window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| Error::Dom("no document".into()))?;

    let config = Config::from_build_env();
    let backend_override = document
        .get_element_by_id(config.ids.app)
        .and_then(|el| el.get_attribute("data-backend-url"));
    let config = config.with_backend_url(backend_override.as_deref());
    log::info!("events backend at {}", config.backend_url);

    let ids = &config.ids;
    let form = FilterForm::new(&document, ids)?;
    let surface = CanvasSurface::new(
        &document,
        ids.map_container,
        ids.map_canvas,
        MarkerScene::new(MarkerStyle::default()),
    )?;
    let page = PageView::new(&document, ids)?;

    let text_inputs = form.text_inputs();
    let buttons = form.category_buttons().to_vec();
    let map_container = surface.container().clone();

    let state = Rc::new(Mutex::new(App {
        filters: FilterState::new(),
        form,
        client: EventsClient::new(config.backend_url.clone()),
        feed: EventFeed::default(),
        surface,
        page,
    }));

    for input in &text_inputs {
        add_leaky_event_listener_with_state(&state, input, "input", |app: &mut App, _e| {
            app.form.read_text_inputs(&mut app.filters);
        })?;
    }
    for (category, button) in &buttons {
        let category = *category;
        add_leaky_event_listener_with_state(&state, button, "click", move |app: &mut App, _e| {
            let selected = app.filters.toggle_category(category);
            if let Err(err) = app.form.mark_selected(category, selected) {
                log::warn!("could not update {category} button: {err}");
            }
        })?;
    }
    observe_leaky_resize(&state, &map_container)?;

    spawn_local(refresh(state));
    Ok(())
}

#[wasm_bindgen(start)]
pub fn main() -> std::result::Result<(), JsValue> {
    utils::set_panic_hook();
    utils::init_logging(utils::default_level());

    run().map_err(|err| {
        log::error!("event map failed to start: {err}");
        JsValue::from(err)
    })
}
