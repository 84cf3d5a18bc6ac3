//! HTML canvas surface (WASM only).
//!
//! This is the only place that touches [`web_sys::CanvasRenderingContext2d`].

use kurbo::{BezPath, PathEl, Point, Size};
use scribble_core::surface::{PixelBuffer, StrokeStyle, Surface, SurfaceError};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

fn js_error(value: JsValue) -> SurfaceError {
    SurfaceError::Backend(format!("{:?}", value))
}

/// A surface backed by a `<canvas>` element's 2D context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Bind to a canvas element.
    ///
    /// Fails with [`SurfaceError::ContextUnavailable`] when the element has no
    /// 2D context (for example because another context type was requested).
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, SurfaceError> {
        let context = canvas
            .get_context("2d")
            .map_err(js_error)?
            .ok_or(SurfaceError::ContextUnavailable)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| SurfaceError::ContextUnavailable)?;

        Ok(Self { canvas, context })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Encode the current contents as a PNG data URL.
    pub fn to_data_url(&self) -> Result<String, SurfaceError> {
        self.canvas.to_data_url_with_type("image/png").map_err(js_error)
    }

    fn trace_path(&self, path: &BezPath) {
        self.context.begin_path();
        for el in path.iter() {
            match el {
                PathEl::MoveTo(p) => self.context.move_to(p.x, p.y),
                PathEl::LineTo(p) => self.context.line_to(p.x, p.y),
                PathEl::QuadTo(c, p) => self.context.quadratic_curve_to(c.x, c.y, p.x, p.y),
                PathEl::CurveTo(c1, c2, p) => {
                    self.context.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y)
                }
                PathEl::ClosePath => self.context.close_path(),
            }
        }
    }

    fn image_data(&self) -> Result<ImageData, SurfaceError> {
        let size = self.size();
        self.context
            .get_image_data(0.0, 0.0, size.width, size.height)
            .map_err(js_error)
    }
}

impl Surface for CanvasSurface {
    type Snapshot = ImageData;

    fn size(&self) -> Size {
        Size::new(f64::from(self.canvas.width()), f64::from(self.canvas.height()))
    }

    fn origin(&self) -> Point {
        let rect = self.canvas.get_bounding_client_rect();
        Point::new(rect.left(), rect.top())
    }

    fn is_attached(&self) -> bool {
        self.canvas.parent_element().is_some()
    }

    fn clear(&mut self) {
        let size = self.size();
        self.context.clear_rect(0.0, 0.0, size.width, size.height);
    }

    fn snapshot(&mut self) -> Result<Self::Snapshot, SurfaceError> {
        self.image_data()
    }

    fn restore(&mut self, snapshot: &Self::Snapshot) -> Result<(), SurfaceError> {
        self.context.put_image_data(snapshot, 0.0, 0.0).map_err(js_error)
    }

    fn stroke(&mut self, path: &BezPath, style: &StrokeStyle) -> Result<(), SurfaceError> {
        self.context.save();
        self.context.set_stroke_style_str(&style.css_color());
        self.context.set_line_width(style.width);
        self.context.set_line_join(style.join.css_name());
        self.context.set_line_cap(style.cap.css_name());
        let result = self
            .context
            .set_global_composite_operation(style.composite.css_name())
            .map_err(js_error);

        if result.is_ok() {
            self.trace_path(path);
            self.context.stroke();
        }
        self.context.restore();
        result
    }

    fn read_pixels(&mut self) -> Result<PixelBuffer, SurfaceError> {
        let image = self.image_data()?;
        Ok(PixelBuffer {
            rgba_data: image.data().0,
            width: image.width(),
            height: image.height(),
        })
    }
}
