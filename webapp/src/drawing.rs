use std::f64::consts::PI;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement};

use crate::error::{Error, Result};
use crate::geometry::Coord2D;

/// Drawing operation; produced lazily by a scene and consumed straight away
/// by the surface, never stored.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp<'a, CoordT> {
    ClearRect { width: f64, height: f64 },
    BeginPath,
    Circle { center: CoordT, radius: f64 },
    Fill(&'a str),
    Stroke { style: &'a str, line_width: f64 },
}

impl<CoordT> DrawOp<'_, CoordT> {
    pub fn get_coord(&self) -> Option<&CoordT> {
        match self {
            DrawOp::Circle { center, .. } => Some(center),
            _ => None,
        }
    }
}

impl DrawOp<'_, Coord2D> {
    pub fn draw(&self, context: &CanvasRenderingContext2d) -> Result<()> {
        match self {
            DrawOp::ClearRect { width, height } => context.clear_rect(0.0, 0.0, *width, *height),
            DrawOp::BeginPath => context.begin_path(),
            DrawOp::Circle {
                center: Coord2D { x, y },
                radius,
            } => context.arc(*x, *y, *radius, 0.0, 2.0 * PI)?,
            DrawOp::Fill(style) => {
                context.set_fill_style_str(style);
                context.fill();
            }
            DrawOp::Stroke { style, line_width } => {
                context.set_stroke_style_str(style);
                context.set_line_width(*line_width);
                context.stroke();
            }
        }
        Ok(())
    }
}

/// Something that knows what to paint for a given surface size. Every frame
/// is a full redraw, so a frame is expected to start by clearing.
pub trait CanvasScene {
    fn frame<'a>(
        &'a self,
        canvas_width: f64,
        canvas_height: f64,
    ) -> Box<dyn Iterator<Item = DrawOp<'a, Coord2D>> + 'a>;
}

/// A `<canvas>` that tracks the size of its container and paints a scene
/// onto it on demand.
pub struct CanvasSurface<SceneT: CanvasScene> {
    container: Element,
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    scene: SceneT,
}

impl<SceneT: CanvasScene> CanvasSurface<SceneT> {
    pub fn new(
        document: &Document,
        container_id: &str,
        canvas_id: &str,
        scene: SceneT,
    ) -> Result<Self> {
        let container = document
            .get_element_by_id(container_id)
            .ok_or_else(|| Error::MissingElement(container_id.to_string()))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| Error::MissingElement(canvas_id.to_string()))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| Error::Dom(format!("#{canvas_id} is not a <canvas>")))?;
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| Error::Dom("browser did not provide a 2d context".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| Error::Dom("2d context is not a CanvasRenderingContext2D".into()))?;

        Ok(Self {
            container,
            canvas,
            context,
            scene,
        })
    }

    pub fn container(&self) -> &Element {
        &self.container
    }

    pub fn scene(&self) -> &SceneT {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneT {
        &mut self.scene
    }

    /// Resize the backing store to the container's current client size and
    /// repaint the whole scene.
    pub fn render(&self) -> Result<()> {
        let width = u32::try_from(self.container.client_width()).unwrap_or(0);
        let height = u32::try_from(self.container.client_height()).unwrap_or(0);
        self.canvas.set_width(width);
        self.canvas.set_height(height);

        for op in self.scene.frame(f64::from(width), f64::from(height)) {
            op.draw(&self.context)?;
        }
        Ok(())
    }
}
