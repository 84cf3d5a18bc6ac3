//! Stage: frame scheduling and the bitmap cache.
//!
//! Every frame is painted in two layers. The structural layer draws content
//! that may be captured into the cache; the overlay layer draws content that
//! is repainted every frame and never cached (the brush cursor). A pass runs
//! in a fixed order:
//!
//! 1. restore the cached bitmap, or clear the surface if there is none;
//! 2. paint the structural layer;
//! 3. capture the surface into the cache if a cache update was requested;
//! 4. paint the overlay layer.
//!
//! A pass that fails leaves its flags set, so the next tick retries it. A
//! cache update only counts once the snapshot has succeeded.

use crate::surface::{Surface, SurfaceError};
use kurbo::Point;

/// The two paint callbacks a stage invokes each pass.
pub trait Layers<S: Surface> {
    /// Paint content that may be baked into the cache.
    fn paint_structural(&mut self, frame: &mut Frame<'_, S>) -> Result<(), SurfaceError>;

    /// Paint content that is never cached.
    fn paint_overlay(&mut self, frame: &mut Frame<'_, S>) -> Result<(), SurfaceError>;
}

/// Access to the surface during a single render pass.
pub struct Frame<'a, S: Surface> {
    surface: &'a mut S,
    capturing: bool,
    cache_updated: bool,
}

impl<S: Surface> Frame<'_, S> {
    /// The surface being painted.
    pub fn surface(&mut self) -> &mut S {
        self.surface
    }

    /// Whether this pass will try to capture the structural layer.
    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    /// Whether the cache now holds this pass's structural layer.
    ///
    /// Only ever true in the overlay, after the snapshot succeeded. Layers
    /// use it to drop per-stroke state without losing pixels.
    pub fn is_cache_updated(&self) -> bool {
        self.cache_updated
    }
}

/// Result of a scheduling tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A render pass ran.
    Rendered,
    /// Nothing was dirty.
    Idle,
    /// The surface is gone; the loop should stop.
    Detached,
}

/// Owns a surface and decides when it is repainted.
pub struct Stage<S: Surface> {
    surface: S,
    needs_redraw: bool,
    needs_cache_update: bool,
    cache_updated: bool,
    image_cache: Option<S::Snapshot>,
    frame_count: u64,
}

impl<S: Surface> Stage<S> {
    /// Create a stage that will paint on its first tick.
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            needs_redraw: true,
            needs_cache_update: false,
            cache_updated: false,
            image_cache: None,
            frame_count: 0,
        }
    }

    /// The owned surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the owned surface.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Request a repaint on the next tick.
    pub fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    /// Request that the next pass captures its structural layer into the cache.
    pub fn mark_cache_dirty(&mut self) {
        self.needs_cache_update = true;
    }

    /// Whether the most recent render pass captured the cache.
    pub fn is_cache_updated(&self) -> bool {
        self.cache_updated
    }

    /// Whether a repaint or cache capture is pending.
    pub fn is_dirty(&self) -> bool {
        self.needs_redraw || self.needs_cache_update
    }

    /// Whether a bitmap cache exists yet.
    pub fn has_cache(&self) -> bool {
        self.image_cache.is_some()
    }

    /// Number of render passes run so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Map client coordinates into surface-local coordinates.
    pub fn to_local(&self, screen: Point) -> Point {
        screen - self.surface.origin().to_vec2()
    }

    /// Run one scheduling tick.
    ///
    /// Renders only when something is dirty. A detached surface is reported
    /// as [`TickOutcome::Detached`] and nothing is drawn.
    pub fn tick<L: Layers<S>>(&mut self, layers: &mut L) -> Result<TickOutcome, SurfaceError> {
        if !self.surface.is_attached() {
            log::debug!("Surface detached, stopping frame loop");
            return Ok(TickOutcome::Detached);
        }

        if !self.is_dirty() {
            return Ok(TickOutcome::Idle);
        }

        self.render_frame(layers)?;
        Ok(TickOutcome::Rendered)
    }

    /// Force a render pass right now (used before reading pixels back).
    pub fn update<L: Layers<S>>(&mut self, layers: &mut L) -> Result<(), SurfaceError> {
        self.render_frame(layers)
    }

    fn render_frame<L: Layers<S>>(&mut self, layers: &mut L) -> Result<(), SurfaceError> {
        self.frame_count += 1;
        self.cache_updated = false;

        match &self.image_cache {
            Some(cache) => self.surface.restore(cache)?,
            None => self.surface.clear(),
        }

        let capture = self.needs_cache_update;
        let mut frame = Frame {
            surface: &mut self.surface,
            capturing: capture,
            cache_updated: false,
        };
        layers.paint_structural(&mut frame)?;

        if capture {
            self.image_cache = Some(self.surface.snapshot()?);
            self.needs_cache_update = false;
            self.cache_updated = true;
            log::trace!("Captured bitmap cache on frame {}", self.frame_count);
        }

        let mut frame = Frame {
            surface: &mut self.surface,
            capturing: capture,
            cache_updated: self.cache_updated,
        };
        layers.paint_overlay(&mut frame)?;
        self.needs_redraw = false;
        Ok(())
    }
}
