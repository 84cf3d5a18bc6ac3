//! Software RGBA surface backed by `vello_cpu`.
//!
//! Strokes are recorded into a [`vello_cpu::RenderContext`] on top of the
//! current contents and only rasterised when the pixels are needed: on
//! snapshot, read-back, or before the contents are replaced.

use kurbo::{BezPath, PathEl, Point, Size};
use scribble_core::surface::{
    Composite, LineCap, LineJoin, PixelBuffer, StrokeStyle, Surface, SurfaceError,
};
use scribble_core::Rgb;
use std::sync::Arc;
use vello_cpu::peniko::{BlendMode, Compose, ImageSampler, Mix};
use vello_cpu::{Image, ImageSource, Pixmap, RenderContext};

/// What lies under the strokes recorded since the last rasterisation.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Base {
    /// A uniform fill: transparent, or the background color.
    Fill(Option<Rgb>),
    /// Whatever is in the pixmap.
    Pixels,
}

/// A CPU-backed surface with premultiplied RGBA8 pixels.
pub struct PixmapSurface {
    ctx: RenderContext,
    pixmap: Pixmap,
    base: Base,
    pending: bool,
    origin: Point,
    background: Option<Rgb>,
}

impl PixmapSurface {
    /// Create a transparent surface.
    ///
    /// Fails with [`SurfaceError::InvalidSize`] for empty surfaces or sides
    /// longer than `u16::MAX`.
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        let invalid = || SurfaceError::InvalidSize { width, height };
        let w = u16::try_from(width).map_err(|_| invalid())?;
        let h = u16::try_from(height).map_err(|_| invalid())?;
        if w == 0 || h == 0 {
            return Err(invalid());
        }

        Ok(Self {
            ctx: RenderContext::new(w, h),
            pixmap: Pixmap::new(w, h),
            base: Base::Fill(None),
            pending: false,
            origin: Point::ZERO,
            background: None,
        })
    }

    /// Fill with `background` instead of transparency when cleared.
    pub fn with_background(mut self, background: Option<Rgb>) -> Self {
        self.background = background;
        self.clear();
        self
    }

    /// Place the surface at a client-space origin.
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        u32::from(self.pixmap.width())
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        u32::from(self.pixmap.height())
    }

    /// Start recording on top of the current contents.
    fn begin(&mut self) {
        if self.pending {
            return;
        }
        self.ctx.reset();

        let bounds = vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(self.width()), f64::from(self.height()));
        match self.base {
            Base::Fill(None) => {}
            Base::Fill(Some(Rgb { r, g, b })) => {
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, 255));
                self.ctx.fill_rect(&bounds);
            }
            Base::Pixels => {
                self.ctx.set_paint(Image {
                    image: ImageSource::Pixmap(Arc::new(self.pixmap.clone())),
                    sampler: ImageSampler::default(),
                });
                self.ctx.fill_rect(&bounds);
            }
        }
        self.pending = true;
    }

    /// Rasterise everything recorded since [`PixmapSurface::begin`].
    fn commit(&mut self) {
        if !self.pending {
            return;
        }
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        self.pending = false;
        self.base = Base::Pixels;
    }

    /// Drop recorded strokes that are about to be overwritten.
    fn discard(&mut self) {
        self.ctx.reset();
        self.pending = false;
    }
}

impl Surface for PixmapSurface {
    type Snapshot = Pixmap;

    fn size(&self) -> Size {
        Size::new(f64::from(self.width()), f64::from(self.height()))
    }

    fn origin(&self) -> Point {
        self.origin
    }

    fn clear(&mut self) {
        self.discard();
        let fill = match self.background {
            Some(Rgb { r, g, b }) => [r, g, b, 255],
            None => [0, 0, 0, 0],
        };
        for px in self.pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&fill);
        }
        self.base = Base::Fill(self.background);
    }

    fn snapshot(&mut self) -> Result<Self::Snapshot, SurfaceError> {
        self.commit();
        Ok(self.pixmap.clone())
    }

    fn restore(&mut self, snapshot: &Self::Snapshot) -> Result<(), SurfaceError> {
        let expected = (self.width(), self.height());
        let actual = (u32::from(snapshot.width()), u32::from(snapshot.height()));
        if expected != actual {
            return Err(SurfaceError::SizeMismatch { expected, actual });
        }
        self.discard();
        self.pixmap
            .data_as_u8_slice_mut()
            .copy_from_slice(snapshot.data_as_u8_slice());
        self.base = Base::Pixels;
        Ok(())
    }

    fn stroke(&mut self, path: &BezPath, style: &StrokeStyle) -> Result<(), SurfaceError> {
        self.begin();

        let stroke = vello_cpu::kurbo::Stroke::new(style.width.max(0.0))
            .with_join(join(style.join))
            .with_caps(cap(style.cap));
        self.ctx.set_stroke(stroke);
        self.ctx.set_paint(vello_cpu::peniko::Color::new(style.color.components));

        let path = to_cpu_path(path);
        match style.composite {
            Composite::SourceOver => self.ctx.stroke_path(&path),
            Composite::Xor => {
                self.ctx.push_blend_layer(BlendMode::new(Mix::Normal, Compose::Xor));
                self.ctx.stroke_path(&path);
                self.ctx.pop_layer();
            }
        }
        Ok(())
    }

    fn read_pixels(&mut self) -> Result<PixelBuffer, SurfaceError> {
        self.commit();
        let mut pixels = PixelBuffer::new(self.width(), self.height())?;
        for (dst, src) in pixels
            .rgba_data
            .chunks_exact_mut(4)
            .zip(self.pixmap.data_as_u8_slice().chunks_exact(4))
        {
            dst.copy_from_slice(&unpremultiply([src[0], src[1], src[2], src[3]]));
        }
        Ok(pixels)
    }
}

fn join(join: LineJoin) -> vello_cpu::kurbo::Join {
    match join {
        LineJoin::Miter => vello_cpu::kurbo::Join::Miter,
        LineJoin::Round => vello_cpu::kurbo::Join::Round,
        LineJoin::Bevel => vello_cpu::kurbo::Join::Bevel,
    }
}

fn cap(cap: LineCap) -> vello_cpu::kurbo::Cap {
    match cap {
        LineCap::Butt => vello_cpu::kurbo::Cap::Butt,
        LineCap::Round => vello_cpu::kurbo::Cap::Round,
        LineCap::Square => vello_cpu::kurbo::Cap::Square,
    }
}

fn to_cpu_path(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    let point = |p: Point| vello_cpu::kurbo::Point::new(p.x, p.y);

    let mut out = vello_cpu::kurbo::BezPath::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => out.move_to(point(p)),
            PathEl::LineTo(p) => out.line_to(point(p)),
            PathEl::QuadTo(c, p) => out.quad_to(point(c), point(p)),
            PathEl::CurveTo(c1, c2, p) => out.curve_to(point(c1), point(c2), point(p)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn unpremultiply([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    if a == 0 || a == 255 {
        return [r, g, b, a];
    }
    let a16 = u16::from(a);
    let channel = |c: u8| ((u16::from(c) * 255 + a16 / 2) / a16).min(255) as u8;
    [channel(r), channel(g), channel(b), a]
}
