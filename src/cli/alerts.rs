use super::ui;
use crate::app::App;
use crate::core::alerts::{Alert, AlertDirection, AlertNotification, NewAlert, Notifier};
use crate::core::quotation::AssetKind;
use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use comfy_table::{Cell, CellAlignment, Color};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Prints fired alerts to the terminal.
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, notification: &AlertNotification) -> Result<()> {
        println!(
            "{} {}",
            ui::style_text(notification.title(), ui::StyleType::Title),
            notification.message()
        );
        Ok(())
    }
}

fn alerts_table(alerts: &[Alert]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Quotation"),
        ui::header_cell("Symbol"),
        ui::header_cell("Condition"),
        ui::header_cell("Status"),
    ]);
    for alert in alerts {
        let status = if alert.active {
            Cell::new("active").fg(Color::Green)
        } else {
            Cell::new("triggered").fg(Color::DarkGrey)
        };
        table.add_row(vec![
            Cell::new(alert.id).set_alignment(CellAlignment::Right),
            Cell::new(&alert.quotation_id),
            Cell::new(&alert.symbol),
            Cell::new(format!("{} {}", alert.direction, alert.target_price)),
            status,
        ]);
    }
    table.to_string()
}

pub fn list(app: &App) -> Result<()> {
    let alerts = app.alerts.all()?;
    if alerts.is_empty() {
        println!("No alerts configured.");
        return Ok(());
    }
    println!("{}", alerts_table(&alerts));
    Ok(())
}

/// Creates an alert on a crypto quotation. Prices come from the market provider only,
/// so stock and forex ids are refused.
pub async fn add(
    app: &App,
    quotation_id: &str,
    target_price: f64,
    below: bool,
    symbol: Option<&str>,
) -> Result<()> {
    if !target_price.is_finite() || target_price < 0.0 {
        bail!("Target price must be a non-negative number, got {target_price}");
    }
    let quotation = app
        .aggregator
        .find(quotation_id)
        .await?
        .ok_or_else(|| anyhow!("No quotation found with id: {quotation_id}"))?;
    if quotation.kind != AssetKind::Crypto {
        bail!(
            "Alerts are only checked for crypto quotations, {} is a {} quotation",
            quotation.id,
            quotation.kind
        );
    }

    let alert = app.alerts.insert(NewAlert {
        quotation_id: quotation.id.clone(),
        symbol: symbol
            .map(str::to_uppercase)
            .unwrap_or_else(|| quotation.symbol.clone()),
        target_price,
        direction: if below {
            AlertDirection::Below
        } else {
            AlertDirection::Above
        },
    })?;
    println!(
        "Created alert #{}: {} {} {}",
        alert.id, alert.symbol, alert.direction, alert.target_price
    );
    Ok(())
}

pub fn remove(app: &App, id: u64) -> Result<()> {
    app.alerts.delete(id)?;
    println!("Removed alert #{id}.");
    Ok(())
}

pub async fn check(app: &App) -> Result<()> {
    let evaluator = app.evaluator(Arc::new(ConsoleNotifier));
    let report = evaluator.run_once().await?;
    println!(
        "Checked {} active alert(s), {} triggered.",
        report.checked,
        report.triggered.len()
    );
    Ok(())
}

/// Checks alerts on the configured interval until Ctrl-C.
pub async fn watch(app: &App) -> Result<()> {
    let evaluator = app.evaluator(Arc::new(ConsoleNotifier));
    let interval = app.config.alerts.check_interval();
    let (tx, rx) = watch::channel(false);

    println!(
        "{}",
        ui::style_text(
            &format!(
                "Watching alerts every {}s, Ctrl-C to stop.",
                interval.as_secs()
            ),
            ui::StyleType::Subtle
        )
    );
    info!("Alert watcher started");

    let stop = async {
        let _ = tokio::signal::ctrl_c().await;
        let _ = tx.send(true);
    };
    tokio::join!(evaluator.run_periodic(interval, rx), stop);
    Ok(())
}
