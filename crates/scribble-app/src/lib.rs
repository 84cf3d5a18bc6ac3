//! Scribble Application
//!
//! Hosts for the sketchpad: a headless replay driver for native builds and a
//! canvas binding for the browser.

mod script;

pub use script::{PointerScript, ScriptError};

#[cfg(not(target_arch = "wasm32"))]
mod headless;

#[cfg(not(target_arch = "wasm32"))]
pub use headless::{render_script, render_script_to_file, AppError};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{run_wasm, WebSketchpad};
