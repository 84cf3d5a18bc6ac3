//! The sketchpad: a stage, a stroke renderer and their listener lifetime.

use crate::brush::{Brush, BrushSource};
use crate::events::{AbortController, AbortSignal, Listeners};
use crate::scheduler::FrameScheduler;
use crate::stage::{Stage, TickOutcome};
use crate::stroke::{PointerEvent, StrokeRenderer};
use crate::surface::{PixelBuffer, Surface, SurfaceError};
use std::cell::RefCell;
use std::rc::Rc;

/// A drawing surface wired to pointer input.
pub struct Sketchpad<S: Surface, B = Brush> {
    stage: Stage<S>,
    renderer: StrokeRenderer<B>,
    lifetime: AbortController,
}

impl<S: Surface, B: BrushSource> Sketchpad<S, B> {
    /// Create a sketchpad painting on `surface` with `brush`.
    pub fn new(surface: S, brush: B) -> Self {
        Self {
            stage: Stage::new(surface),
            renderer: StrokeRenderer::new(brush),
            lifetime: AbortController::new(),
        }
    }

    /// The stage that owns the surface.
    pub fn stage(&self) -> &Stage<S> {
        &self.stage
    }

    /// Mutable stage access.
    pub fn stage_mut(&mut self) -> &mut Stage<S> {
        &mut self.stage
    }

    /// The stroke renderer and its buffered samples.
    pub fn renderer(&self) -> &StrokeRenderer<B> {
        &self.renderer
    }

    /// The current brush.
    pub fn brush(&self) -> &B {
        self.renderer.brush()
    }

    /// Mutable brush access. Schedules a repaint so the cursor ring follows.
    pub fn brush_mut(&mut self) -> &mut B {
        self.stage.mark_dirty();
        self.renderer.brush_mut()
    }

    /// Signal that is aborted when the sketchpad is disposed.
    pub fn signal(&self) -> AbortSignal {
        self.lifetime.signal()
    }

    /// Feed one pointer event. Returns false once disposed.
    pub fn handle_pointer_event(&mut self, event: &PointerEvent) -> bool {
        if self.is_disposed() {
            return false;
        }
        self.renderer.handle_event(&mut self.stage, event);
        true
    }

    /// Register this sketchpad as a pointer listener.
    ///
    /// The registration holds a weak reference and is pruned once the
    /// sketchpad is disposed or dropped.
    pub fn attach(this: &Rc<RefCell<Self>>, listeners: &mut Listeners<PointerEvent>)
    where
        Self: 'static,
    {
        let signal = this.borrow().signal();
        let pad = Rc::downgrade(this);
        listeners.add_listener(&signal, move |event| {
            if let Some(pad) = pad.upgrade() {
                pad.borrow_mut().handle_pointer_event(event);
            }
        });
    }

    /// Run one frame tick. A disposed sketchpad reports [`TickOutcome::Detached`].
    pub fn tick(&mut self) -> Result<TickOutcome, SurfaceError> {
        if self.is_disposed() {
            return Ok(TickOutcome::Detached);
        }
        self.stage.tick(&mut self.renderer)
    }

    /// Run one tick for an external frame loop, logging render errors.
    ///
    /// Returns false once the loop should stop and release its callback.
    pub fn frame(&mut self) -> bool {
        match self.tick() {
            Ok(TickOutcome::Detached) => {
                log::debug!("Frame loop stopped");
                false
            }
            Ok(_) => true,
            Err(e) => {
                log::error!("Frame failed: {}", e);
                true
            }
        }
    }

    /// Drive frames until the scheduler stops or the surface detaches.
    ///
    /// Render errors are logged and the loop keeps going. Returns the number
    /// of frames that rendered.
    pub fn run(&mut self, scheduler: &mut impl FrameScheduler) -> u64 {
        let mut rendered = 0;
        while scheduler.next_frame() {
            match self.tick() {
                Ok(TickOutcome::Rendered) => rendered += 1,
                Ok(TickOutcome::Idle) => {}
                Ok(TickOutcome::Detached) => break,
                Err(e) => log::error!("Frame failed: {}", e),
            }
        }
        rendered
    }

    /// Render pending strokes right now.
    pub fn flush(&mut self) -> Result<(), SurfaceError> {
        self.stage.update(&mut self.renderer)
    }

    /// Flush pending strokes with the cursor ring hidden, then hand the
    /// surface to `read` (to pull pixels, a data URL, ...).
    pub fn export_with<T>(
        &mut self,
        read: impl FnOnce(&mut S) -> Result<T, SurfaceError>,
    ) -> Result<T, SurfaceError> {
        self.renderer.set_saving(true);
        let result = self
            .stage
            .update(&mut self.renderer)
            .and_then(|()| read(self.stage.surface_mut()));
        self.renderer.set_saving(false);

        // Bring the cursor back on the next frame.
        self.stage.mark_dirty();
        result
    }

    /// Flush and read back the pixels without the cursor ring.
    pub fn export_pixels(&mut self) -> Result<PixelBuffer, SurfaceError> {
        self.export_with(|surface| surface.read_pixels())
    }

    /// Detach every listener registered through [`Sketchpad::attach`].
    pub fn dispose(&self) {
        self.lifetime.abort();
    }

    /// Whether [`Sketchpad::dispose`] has run.
    pub fn is_disposed(&self) -> bool {
        self.lifetime.is_aborted()
    }
}

impl<S: Surface, B> Drop for Sketchpad<S, B> {
    fn drop(&mut self) {
        self.lifetime.abort();
    }
}
