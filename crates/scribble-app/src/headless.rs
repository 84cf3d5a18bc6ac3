//! Headless replay: drive a sketchpad from a pointer script and export PNG.

use crate::script::{PointerScript, ScriptError};
use scribble_core::{
    Brush, ConfigError, FrameScheduler, IntervalScheduler, Listeners, ManualScheduler,
    PointerEvent, Sketchpad, SketchpadConfig, SurfaceError, TickOutcome,
};
use scribble_render::{encode_png, ExportError, PixmapSurface};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the application shell.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error("Render failed: {0}")]
    Surface(#[from] SurfaceError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn scheduler_for(config: &SketchpadConfig) -> Box<dyn FrameScheduler> {
    if config.frame_interval_ms == 0 {
        Box::new(ManualScheduler::new(u64::MAX))
    } else {
        Box::new(IntervalScheduler::new(Duration::from_millis(config.frame_interval_ms)))
    }
}

/// Replay `script` on a fresh software surface and return PNG bytes.
///
/// Every event is dispatched through a listener registry, followed by a
/// frame when the scheduler allows one, the same way a browser interleaves
/// input with animation frames.
pub fn render_script(config: &SketchpadConfig, script: &PointerScript) -> Result<Vec<u8>, AppError> {
    config.validate()?;
    let background = config.background_color().map_err(ConfigError::from)?;
    let brush = Brush::from_config(&config.brush).map_err(ConfigError::from)?;
    let surface = PixmapSurface::new(config.width, config.height)?.with_background(background);

    let pad = Rc::new(RefCell::new(Sketchpad::new(surface, brush)));
    let mut listeners: Listeners<PointerEvent> = Listeners::new();
    Sketchpad::attach(&pad, &mut listeners);

    let mut scheduler = scheduler_for(config);
    let mut frames = 0_u64;
    for event in &script.events {
        listeners.dispatch(event);
        if !scheduler.next_frame() {
            continue;
        }
        match pad.borrow_mut().tick()? {
            TickOutcome::Rendered => frames += 1,
            TickOutcome::Idle | TickOutcome::Detached => {}
        }
    }

    let pixels = pad.borrow_mut().export_pixels()?;
    pad.borrow().dispose();
    log::info!(
        "Replayed {} events over {} frames ({}x{})",
        script.len(),
        frames,
        pixels.width,
        pixels.height
    );

    Ok(encode_png(&pixels)?)
}

/// Load a script and optional config from disk, render, and write the PNG.
pub fn render_script_to_file(
    script_path: &Path,
    output_path: &Path,
    config_path: Option<&Path>,
) -> Result<(), AppError> {
    let config = match config_path {
        Some(path) => SketchpadConfig::load(path)?,
        None => SketchpadConfig::default(),
    };
    let script = PointerScript::load(script_path)?;
    let png = render_script(&config, &script)?;
    std::fs::write(output_path, &png)?;
    log::info!("Wrote {} ({} bytes)", output_path.display(), png.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SketchpadConfig {
        SketchpadConfig {
            width: 40,
            height: 30,
            frame_interval_ms: 0,
            background: Some("#fff".to_string()),
            ..Default::default()
        }
    }

    fn decode(bytes: &[u8]) -> (u32, u32, Vec<u8>) {
        let decoder = png::Decoder::new(bytes);
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        buf.truncate(info.buffer_size());
        (info.width, info.height, buf)
    }

    fn pixel(data: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * width + x) * 4) as usize;
        [data[i], data[i + 1], data[i + 2], data[i + 3]]
    }

    #[test]
    fn test_stroke_is_rendered() {
        let script = PointerScript::from_json(
            r#"[{"type":"down","x":5,"y":15},{"type":"move","x":20,"y":15},{"type":"move","x":35,"y":15},{"type":"up","x":35,"y":15}]"#,
        )
        .unwrap();

        let (width, height, data) = decode(&render_script(&config(), &script).unwrap());
        assert_eq!((width, height), (40, 30));
        assert_eq!(pixel(&data, width, 20, 15), [0, 0, 0, 255]);
        assert_eq!(pixel(&data, width, 20, 2), [255, 255, 255, 255]);
    }

    #[test]
    fn test_cursor_is_not_exported() {
        let script = PointerScript::from_json(r#"[{"type":"move","x":20,"y":15}]"#).unwrap();

        let (_, _, data) = decode(&render_script(&config(), &script).unwrap());
        assert!(data.chunks_exact(4).all(|px| px == [255, 255, 255, 255]));
    }

    #[test]
    fn test_invalid_brush_color_fails() {
        let mut config = config();
        config.brush.color = "red".to_string();
        let err = render_script(&config, &PointerScript::default()).unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::Color(_))));
    }

    #[test]
    fn test_oversized_surface_fails() {
        let mut config = config();
        config.width = u32::MAX;
        let err = render_script(&config, &PointerScript::default()).unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::SurfaceTooLarge { .. })));
    }

    #[test]
    fn test_render_script_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let script_path = dir.path().join("script.json");
        let config_path = dir.path().join("config.json");
        let output_path = dir.path().join("out.png");

        std::fs::write(&script_path, r#"[{"type":"down","x":3,"y":3},{"type":"up","x":3,"y":3}]"#).unwrap();
        std::fs::write(&config_path, config().to_json().unwrap()).unwrap();

        render_script_to_file(&script_path, &output_path, Some(&config_path)).unwrap();

        let (width, height, data) = decode(&std::fs::read(&output_path).unwrap());
        assert_eq!((width, height), (40, 30));
        // A click without movement still leaves a dot.
        assert_eq!(pixel(&data, width, 3, 3)[0], 0);
    }

    #[test]
    fn test_missing_script_reports_io() {
        let dir = tempfile::tempdir().unwrap();
        let err = render_script_to_file(&dir.path().join("none.json"), &dir.path().join("out.png"), None)
            .unwrap_err();
        assert!(matches!(err, AppError::Script(ScriptError::Io(_))));
    }
}
