use crate::drawing::{CanvasScene, DrawOp};
use crate::events::Event;
use crate::geometry::{Coord2D, MarkerLayout};

#[derive(Debug, Clone, Copy)]
pub struct MarkerStyle {
    pub radius: f64,
    pub fill: &'static str,
    pub stroke: &'static str,
    pub line_width: f64,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            radius: 6.0,
            fill: "#10b981",
            stroke: "#064e3b",
            line_width: 2.0,
        }
    }
}

/// Legend text for the map corner.
pub fn count_label(count: usize) -> String {
    format!("{count} events")
}

/// The event markers over the fixed world view.
#[derive(Debug, Default)]
pub struct MarkerScene {
    events: Vec<Event>,
    style: MarkerStyle,
}

impl MarkerScene {
    pub fn new(style: MarkerStyle) -> Self {
        Self {
            events: Vec::new(),
            style,
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn set_events(&mut self, events: Vec<Event>) {
        self.events = events;
    }

    /// Events that will actually get a marker.
    pub fn marker_count(&self) -> usize {
        self.events
            .iter()
            .filter(|ev| ev.coordinates().is_some())
            .count()
    }
}

fn marker_ops(center: Coord2D, style: &MarkerStyle) -> impl Iterator<Item = DrawOp<'_, Coord2D>> {
    [
        DrawOp::BeginPath,
        DrawOp::Circle {
            center,
            radius: style.radius,
        },
        DrawOp::Fill(style.fill),
        DrawOp::Stroke {
            style: style.stroke,
            line_width: style.line_width,
        },
    ]
    .into_iter()
}

impl CanvasScene for MarkerScene {
    /// Clear, then one marker per placeable event in list order. Later
    /// markers paint over earlier ones; overlapping events are not merged.
    fn frame<'a>(
        &'a self,
        canvas_width: f64,
        canvas_height: f64,
    ) -> Box<dyn Iterator<Item = DrawOp<'a, Coord2D>> + 'a> {
        let layout = MarkerLayout::new(canvas_width, canvas_height);
        let style = &self.style;
        let markers = self
            .events
            .iter()
            .filter_map(move |ev| layout.place(&ev.coordinates()?))
            .flat_map(move |center| marker_ops(center, style));

        Box::new(
            std::iter::once(DrawOp::ClearRect {
                width: canvas_width,
                height: canvas_height,
            })
            .chain(markers),
        )
    }
}
