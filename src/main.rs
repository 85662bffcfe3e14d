mod app;
mod assets;
mod audio;
mod config;
mod constants;
mod entities;
mod errors;
mod game;
mod menu;
mod registry;
mod rendering;
mod spawner;
mod terminal_io;
mod types;

use std::path::Path;

use log::{error, info};

use crate::config::GameConfig;
use crate::constants::{CONFIG_PATH, LOG_PATH};
use crate::errors::GameResult;

fn main() -> GameResult<()> {
    // The terminal belongs to the game, so logs go to a file.
    simple_logging::log_to_file(LOG_PATH, log::LevelFilter::Info)?;
    info!("Starting Astro Assault.");

    let config = GameConfig::load(Path::new(CONFIG_PATH)).map_err(|e| {
        error!("{}", e);
        e
    })?;
    app::run(config).map_err(|e| {
        error!("{}", e);
        e
    })?;

    info!("Exiting application.");
    Ok(())
}
