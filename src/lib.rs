pub mod app;
pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::app::App;
use crate::core::config::AppConfig;
use crate::core::quotation::AssetKind;
use anyhow::Result;
use tracing::{debug, info};

pub enum FavoritesCommand {
    List,
    Add { id: String },
    Remove { id: String },
}

pub enum AlertsCommand {
    List,
    Add {
        quotation_id: String,
        target_price: f64,
        below: bool,
        symbol: Option<String>,
    },
    Remove { id: u64 },
    Check,
    Watch,
}

pub enum AppCommand {
    Explore {
        query: Option<String>,
        interactive: bool,
    },
    History {
        id: String,
        kind: AssetKind,
    },
    Favorites(FavoritesCommand),
    Alerts(AlertsCommand),
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("quotewatch starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let app = App::from_config(config)?;
    run_with_app(&app, command).await
}

pub async fn run_with_app(app: &App, command: AppCommand) -> Result<()> {
    match command {
        AppCommand::Explore { interactive: true, .. } => cli::explore::interactive(app).await,
        AppCommand::Explore { query, .. } => cli::explore::run(app, query.as_deref()).await,
        AppCommand::History { id, kind } => cli::history::run(app, &id, kind).await,
        AppCommand::Favorites(cmd) => match cmd {
            FavoritesCommand::List => cli::favorites::list(app),
            FavoritesCommand::Add { id } => cli::favorites::add(app, &id).await,
            FavoritesCommand::Remove { id } => cli::favorites::remove(app, &id),
        },
        AppCommand::Alerts(cmd) => match cmd {
            AlertsCommand::List => cli::alerts::list(app),
            AlertsCommand::Add {
                quotation_id,
                target_price,
                below,
                symbol,
            } => {
                cli::alerts::add(app, &quotation_id, target_price, below, symbol.as_deref()).await
            }
            AlertsCommand::Remove { id } => cli::alerts::remove(app, id),
            AlertsCommand::Check => cli::alerts::check(app).await,
            AlertsCommand::Watch => cli::alerts::watch(app).await,
        },
    }
}
