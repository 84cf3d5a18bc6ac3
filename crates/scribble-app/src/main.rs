//! Headless entry point (native).
//!
//! ```text
//! scribble <script.json> <out.png> [config.json]
//! ```

#[cfg(feature = "native")]
fn main() {
    use std::path::PathBuf;

    env_logger::init();
    log::info!("Starting Scribble");

    let args: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    let (script, output, config) = match args.as_slice() {
        [script, output] => (script, output, None),
        [script, output, config] => (script, output, Some(config.as_path())),
        _ => {
            eprintln!("usage: scribble <script.json> <out.png> [config.json]");
            std::process::exit(2);
        }
    };

    if let Err(e) = scribble_app::render_script_to_file(script, output, config) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
