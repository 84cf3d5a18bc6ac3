//! Drawing surface abstraction.
//!
//! The stage owns exactly one [`Surface`] and is the only thing that paints to
//! it outside the two layer callbacks. Backends decide what a snapshot is: a
//! pixel copy for the software rasteriser, `ImageData` for an HTML canvas.

use kurbo::{BezPath, Point, Size};
use peniko::Color;
use thiserror::Error;

/// Surface errors.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("2D drawing context is unavailable")]
    ContextUnavailable,
    #[error("Snapshot is {actual:?}, surface is {expected:?}")]
    SizeMismatch { expected: (u32, u32), actual: (u32, u32) },
    #[error("Unsupported surface size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("Backend error: {0}")]
    Backend(String),
}

/// How stroke segments meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// How open stroke ends are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

/// Compositing mode for a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Composite {
    /// Paint over existing pixels.
    #[default]
    SourceOver,
    /// Keep source where the destination is empty and destination where the
    /// source is empty; overlapping coverage cancels out.
    Xor,
}

impl Composite {
    /// Name used by the HTML canvas `globalCompositeOperation`.
    pub fn css_name(self) -> &'static str {
        match self {
            Composite::SourceOver => "source-over",
            Composite::Xor => "xor",
        }
    }
}

impl LineJoin {
    /// Name used by the HTML canvas `lineJoin`.
    pub fn css_name(self) -> &'static str {
        match self {
            LineJoin::Miter => "miter",
            LineJoin::Round => "round",
            LineJoin::Bevel => "bevel",
        }
    }
}

impl LineCap {
    /// Name used by the HTML canvas `lineCap`.
    pub fn css_name(self) -> &'static str {
        match self {
            LineCap::Butt => "butt",
            LineCap::Round => "round",
            LineCap::Square => "square",
        }
    }
}

/// Style for a single stroke call.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
    pub join: LineJoin,
    pub cap: LineCap,
    pub composite: Composite,
}

impl StrokeStyle {
    /// A plain source-over stroke with butt caps and miter joins.
    pub fn new(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            join: LineJoin::default(),
            cap: LineCap::default(),
            composite: Composite::default(),
        }
    }

    /// Use round joins and caps.
    pub fn with_round_ends(mut self) -> Self {
        self.join = LineJoin::Round;
        self.cap = LineCap::Round;
        self
    }

    /// Set the compositing mode.
    pub fn with_composite(mut self, composite: Composite) -> Self {
        self.composite = composite;
        self
    }

    /// Format the color as CSS `rgba(r, g, b, a)`.
    pub fn css_color(&self) -> String {
        let rgba = self.color.to_rgba8();
        format!("rgba({}, {}, {}, {})", rgba.r, rgba.g, rgba.b, self.color.components[3])
    }
}

/// Straight-alpha RGBA8 pixels read back from a surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// RGBA pixel data (4 bytes per pixel, row-major).
    pub rgba_data: Vec<u8>,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl PixelBuffer {
    /// A fully transparent buffer.
    ///
    /// Fails with [`SurfaceError::InvalidSize`] when the byte length does not
    /// fit in `usize`.
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or(SurfaceError::InvalidSize { width, height })?;
        Ok(Self {
            rgba_data: vec![0; len],
            width,
            height,
        })
    }

    /// The RGBA value at `(x, y)`, if inside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.rgba_data[i],
            self.rgba_data[i + 1],
            self.rgba_data[i + 2],
            self.rgba_data[i + 3],
        ])
    }

    /// Whether any pixel has non-zero alpha.
    pub fn has_ink(&self) -> bool {
        self.rgba_data.chunks_exact(4).any(|px| px[3] != 0)
    }
}

/// A 2D drawing context owned by the stage.
pub trait Surface {
    /// Saved copy of the surface contents.
    type Snapshot;

    /// Surface size in pixels.
    fn size(&self) -> Size;

    /// Top-left corner of the surface in client (screen) coordinates.
    fn origin(&self) -> Point;

    /// Whether the surface is still attached to its host.
    ///
    /// The frame loop stops once this returns false.
    fn is_attached(&self) -> bool {
        true
    }

    /// Erase the whole surface to transparent.
    fn clear(&mut self);

    /// Copy the current contents.
    fn snapshot(&mut self) -> Result<Self::Snapshot, SurfaceError>;

    /// Replace the contents with a snapshot.
    fn restore(&mut self, snapshot: &Self::Snapshot) -> Result<(), SurfaceError>;

    /// Stroke a path.
    fn stroke(&mut self, path: &BezPath, style: &StrokeStyle) -> Result<(), SurfaceError>;

    /// Read back the current contents.
    fn read_pixels(&mut self) -> Result<PixelBuffer, SurfaceError>;
}

/// A command issued to a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCommand {
    Clear,
    Snapshot,
    Restore,
    Stroke { path: BezPath, style: StrokeStyle },
}

/// A surface that records commands instead of producing pixels.
///
/// Useful for tests and for inspecting what a frame paints. Its "contents"
/// are the strokes issued since the last clear or restore.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    size: Size,
    origin: Point,
    attached: bool,
    fail_snapshot: bool,
    fail_restore: bool,
    commands: Vec<SurfaceCommand>,
    contents: Vec<(BezPath, StrokeStyle)>,
}

impl RecordingSurface {
    /// Create a recording surface of the given size at the client origin.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width, height),
            origin: Point::ZERO,
            attached: true,
            fail_snapshot: false,
            fail_restore: false,
            commands: Vec::new(),
            contents: Vec::new(),
        }
    }

    /// Place the surface at a client-space origin.
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    /// Attach or detach the surface from its host.
    pub fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
    }

    /// Make every following snapshot fail with [`SurfaceError::Backend`].
    pub fn set_fail_snapshot(&mut self, fail: bool) {
        self.fail_snapshot = fail;
    }

    /// Make every following restore fail with [`SurfaceError::Backend`].
    pub fn set_fail_restore(&mut self, fail: bool) {
        self.fail_restore = fail;
    }

    /// All commands issued so far.
    pub fn commands(&self) -> &[SurfaceCommand] {
        &self.commands
    }

    /// Forget recorded commands (contents are kept).
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Strokes currently on the surface.
    pub fn contents(&self) -> &[(BezPath, StrokeStyle)] {
        &self.contents
    }
}

impl Surface for RecordingSurface {
    type Snapshot = Vec<(BezPath, StrokeStyle)>;

    fn size(&self) -> Size {
        self.size
    }

    fn origin(&self) -> Point {
        self.origin
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn clear(&mut self) {
        self.commands.push(SurfaceCommand::Clear);
        self.contents.clear();
    }

    fn snapshot(&mut self) -> Result<Self::Snapshot, SurfaceError> {
        self.commands.push(SurfaceCommand::Snapshot);
        if self.fail_snapshot {
            return Err(SurfaceError::Backend("snapshot failed".to_string()));
        }
        Ok(self.contents.clone())
    }

    fn restore(&mut self, snapshot: &Self::Snapshot) -> Result<(), SurfaceError> {
        self.commands.push(SurfaceCommand::Restore);
        if self.fail_restore {
            return Err(SurfaceError::Backend("restore failed".to_string()));
        }
        self.contents = snapshot.clone();
        Ok(())
    }

    fn stroke(&mut self, path: &BezPath, style: &StrokeStyle) -> Result<(), SurfaceError> {
        self.commands.push(SurfaceCommand::Stroke {
            path: path.clone(),
            style: style.clone(),
        });
        self.contents.push((path.clone(), style.clone()));
        Ok(())
    }

    fn read_pixels(&mut self) -> Result<PixelBuffer, SurfaceError> {
        PixelBuffer::new(
            self.size.width.max(0.0) as u32,
            self.size.height.max(0.0) as u32,
        )
    }
}
