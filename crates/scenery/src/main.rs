mod control;
mod engine;
mod loader;
mod tool;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::tool::{AppConfig, WindowRunner};

fn main() -> Result<()> {
    // Set up tracing
    let fmt_layer = fmt::layer().with_target(false);
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(if cfg!(debug_assertions) { "debug" } else { "info" }))?;
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
    info!("Starting Scenery");

    let config = AppConfig::load()?;
    WindowRunner::run(config)
}
