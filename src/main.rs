use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use cambial::history::PriceKind;
use cambial::log::init_logging;
use cambial::market::{Country, Period};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Country to fetch quotes for (overrides config)
    #[arg(long, global = true, value_enum)]
    country: Option<Country>,

    /// Historical lookback period (overrides config)
    #[arg(long, global = true, value_enum)]
    period: Option<Period>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Run the auto-refreshing dashboard
    Dashboard,
    /// Display current quotes per source
    Quotes,
    /// Display cross-source averages
    Average,
    /// Display per-source slippage
    Slippage,
    /// Display the reconstructed historical series
    History {
        /// Which price side to chart
        #[arg(long, value_enum, default_value = "buy")]
        side: PriceKind,
    },
    /// Display economic news
    News,
}

impl From<Commands> for cambial::AppCommand {
    fn from(cmd: Commands) -> cambial::AppCommand {
        match cmd {
            Commands::Dashboard => cambial::AppCommand::Dashboard,
            Commands::Quotes => cambial::AppCommand::Quotes,
            Commands::Average => cambial::AppCommand::Average,
            Commands::Slippage => cambial::AppCommand::Slippage,
            Commands::History { side } => cambial::AppCommand::History { side },
            Commands::News => cambial::AppCommand::News,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let options = cambial::RunOptions {
        config_path: cli.config_path,
        country: cli.country,
        period: cli.period,
    };

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => cambial::run_command(cmd.into(), &options).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = cambial::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
backend:
  base_url: "https://pluggy.onrender.com"

country: "brazil"
period: "24h"
refresh_secs: 15
sparse_threshold: 2
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
