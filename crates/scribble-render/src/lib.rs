//! Scribble Render Library
//!
//! Surface backends for the Scribble stage: a software RGBA pixmap used by
//! native hosts and tests, and an HTML canvas surface for the browser.

mod export;
mod pixmap;

#[cfg(target_arch = "wasm32")]
mod web;

pub use export::{encode_png, ExportError};
pub use pixmap::PixmapSurface;

#[cfg(target_arch = "wasm32")]
pub use web::CanvasSurface;
