use court::GameDirector;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{self, ConfigError};
use super::loop_runner;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to spawn console reader thread: {0}")]
    SpawnConsoleReader(#[source] std::io::Error),
}

pub(crate) fn run() -> Result<(), AppError> {
    init_tracing();
    info!("=== Mercy Court Startup ===");

    let config = config::load_loop_config()?;
    let director = GameDirector::new();
    loop_runner::run_loop(config, director)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
