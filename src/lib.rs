pub mod backend;
pub mod config;
pub mod dashboard;
pub mod history;
pub mod log;
pub mod market;
pub mod views;

use anyhow::Result;
use tracing::{debug, info};

use crate::backend::HttpBackend;
use crate::history::PriceKind;
use crate::market::{Country, Period};

#[derive(Debug, Clone, Copy)]
pub enum AppCommand {
    Dashboard,
    Quotes,
    Average,
    Slippage,
    History { side: PriceKind },
    News,
}

/// CLI-level overrides; anything left unset falls back to the config file.
#[derive(Debug, Default, Clone)]
pub struct RunOptions {
    pub config_path: Option<String>,
    pub country: Option<Country>,
    pub period: Option<Period>,
}

pub async fn run_command(command: AppCommand, options: &RunOptions) -> Result<()> {
    info!("cambial starting...");

    let config = match options.config_path.as_deref() {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let country = options.country.unwrap_or(config.country);
    let period = options.period.unwrap_or(config.period);
    let backend = HttpBackend::new(&config.backend.base_url)?;

    match command {
        AppCommand::Dashboard => {
            dashboard::run(std::sync::Arc::new(backend), country, period, &config).await
        }
        AppCommand::Quotes => views::quotes::run(&backend, country).await,
        AppCommand::Average => views::average::run(&backend, country).await,
        AppCommand::Slippage => views::slippage::run(&backend, country).await,
        AppCommand::History { side } => {
            views::chart::run(&backend, country, period, side, config.sparse_threshold).await
        }
        AppCommand::News => views::news::run(&backend, country).await,
    }
}
