//! Shows one line of subpixel rendered text in a window.
//!
//! Usage: `subpix-shell [config.toml]`. Verbosity is controlled with `RUST_LOG`.

mod text_window;

use std::env;

use anyhow::Result;
use log::info;
use winit::event_loop::EventLoop;

use subpix_text::{config::TextConfig, font::SwashFont};

use crate::text_window::TextWindowApplication;

fn main() -> Result<()> {
    env_logger::init();

    let config = config_from_args(env::args().skip(1))?;
    // A font that can't be loaded ends the program before any window opens.
    let font = SwashFont::load(&config.font_path)?;

    let event_loop = EventLoop::new()?;
    let mut application = TextWindowApplication::new(config, font);

    info!("Entering event loop");
    event_loop.run_app(&mut application)?;
    info!("Exiting event loop");

    application.into_result()
}

/// The configuration at the path of the first argument, defaults if there is none.
fn config_from_args(mut args: impl Iterator<Item = String>) -> Result<TextConfig> {
    match args.next() {
        Some(path) => TextConfig::load(path),
        None => Ok(TextConfig::default()),
    }
}
