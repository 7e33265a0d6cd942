use super::ui;
use crate::app::App;
use crate::core::quotation::{AssetKind, HistorySummary};
use crate::core::resource::Resource;
use anyhow::{Result, bail};
use chrono::{TimeZone, Utc};
use comfy_table::{Cell, CellAlignment};

pub async fn run(app: &App, id: &str, kind: AssetKind) -> Result<()> {
    let spinner = ui::new_spinner(&format!("Loading history for {id}"));
    let result = app.aggregator.history(id, kind).await;
    spinner.finish_and_clear();

    let summary = match result {
        Resource::Success(summary) => summary,
        Resource::Error { message, .. } => bail!(message),
        Resource::Loading { .. } => return Ok(()),
    };

    let favorite = app.aggregator.is_favorite(id)?;
    println!(
        "\n{}{}",
        ui::style_text(&format!("{id} ({kind})"), ui::StyleType::Title),
        if favorite { " ★" } else { "" }
    );
    println!("{}", render(&summary));
    Ok(())
}

fn render(summary: &HistorySummary) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Date"), ui::header_cell("Price")]);
    for point in &summary.points {
        let date = Utc
            .timestamp_millis_opt(point.timestamp_ms)
            .single()
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| point.timestamp_ms.to_string());
        table.add_row(vec![Cell::new(date), ui::price_cell(point.price)]);
    }
    table.add_row(vec![
        Cell::new("Change").set_alignment(CellAlignment::Right),
        ui::change_cell(summary.change_pct),
    ]);
    table.to_string()
}
