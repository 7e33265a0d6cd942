use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use quotewatch::core::log::init_logging;
use quotewatch::core::quotation::AssetKind;
use quotewatch::{AlertsCommand, AppCommand, FavoritesCommand};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show trending quotes, or search for QUERY
    Explore {
        query: Option<String>,
        /// Read queries from stdin and refresh results as you type
        #[arg(short, long)]
        interactive: bool,
    },
    /// Show recent price history for a quotation
    History {
        id: String,
        /// Asset kind: crypto, stock or forex
        #[arg(short, long, default_value_t = AssetKind::Crypto)]
        kind: AssetKind,
    },
    /// Manage favorite quotations
    #[command(subcommand)]
    Favorites(FavoritesCommands),
    /// Manage price alerts
    #[command(subcommand)]
    Alerts(AlertsCommands),
}

#[derive(Subcommand)]
enum FavoritesCommands {
    /// List favorites
    List,
    /// Add a quotation to favorites
    Add { id: String },
    /// Remove a quotation from favorites
    Remove { id: String },
}

#[derive(Subcommand)]
enum AlertsCommands {
    /// List alerts
    List,
    /// Create an alert that fires when the price crosses TARGET
    Add {
        quotation_id: String,
        target: f64,
        /// Fire when the price falls to or below the target
        #[arg(long)]
        below: bool,
        /// Symbol shown in notifications, defaults to the id
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Remove an alert
    Remove { id: u64 },
    /// Check active alerts once
    Check,
    /// Check active alerts periodically until interrupted
    Watch,
}

impl From<Commands> for AppCommand {
    fn from(cmd: Commands) -> AppCommand {
        match cmd {
            Commands::Explore { query, interactive } => AppCommand::Explore { query, interactive },
            Commands::History { id, kind } => AppCommand::History { id, kind },
            Commands::Favorites(sub) => AppCommand::Favorites(match sub {
                FavoritesCommands::List => FavoritesCommand::List,
                FavoritesCommands::Add { id } => FavoritesCommand::Add { id },
                FavoritesCommands::Remove { id } => FavoritesCommand::Remove { id },
            }),
            Commands::Alerts(sub) => AppCommand::Alerts(match sub {
                AlertsCommands::List => AlertsCommand::List,
                AlertsCommands::Add {
                    quotation_id,
                    target,
                    below,
                    symbol,
                } => AlertsCommand::Add {
                    quotation_id,
                    target_price: target,
                    below,
                    symbol,
                },
                AlertsCommands::Remove { id } => AlertsCommand::Remove { id },
                AlertsCommands::Check => AlertsCommand::Check,
                AlertsCommands::Watch => AlertsCommand::Watch,
            }),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => quotewatch::cli::setup::setup_at_path(path),
            None => quotewatch::cli::setup::setup(),
        },
        Some(cmd) => quotewatch::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
