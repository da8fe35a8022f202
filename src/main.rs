mod app;
mod client;
mod config;
mod controller;
mod models;
mod render;
mod ui;

use std::fs::File;

use anyhow::Context;
use env_logger::{Env, Target};

use crate::config::Config;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error running application: {e:#}");
    }
}

fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_logging(&config)?;
    app::run(&config)
}

/// The terminal owns stdout and stderr, so records only go to a file.
fn init_logging(config: &Config) -> anyhow::Result<()> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };

    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();

    Ok(())
}
