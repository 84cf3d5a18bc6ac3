//! Scribble Core Library
//!
//! Platform-agnostic freehand drawing: pointer capture, stroke smoothing,
//! and the two-layer frame scheduler with its bitmap cache.

pub mod brush;
pub mod color;
pub mod config;
pub mod events;
pub mod geometry;
pub mod scheduler;
pub mod sketchpad;
pub mod stage;
pub mod stroke;
pub mod surface;

pub use brush::{Brush, BrushSource};
pub use color::{ColorError, Rgb};
pub use config::{BrushConfig, ConfigError, SketchpadConfig, MAX_DIMENSION};
pub use events::{AbortController, AbortSignal, Listeners};
pub use geometry::{calc_middle_point, Point};
pub use scheduler::{FrameScheduler, ManualScheduler};
#[cfg(not(target_arch = "wasm32"))]
pub use scheduler::IntervalScheduler;
pub use sketchpad::Sketchpad;
pub use stage::{Frame, Layers, Stage, TickOutcome};
pub use stroke::{smoothed_path, PointerEvent, StrokeRenderer, StrokeState};
pub use surface::{
    Composite, LineCap, LineJoin, PixelBuffer, RecordingSurface, StrokeStyle, Surface,
    SurfaceCommand, SurfaceError,
};
