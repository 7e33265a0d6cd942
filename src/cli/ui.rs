use crate::core::quotation::Quotation;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Error,
    Warning,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Error => style(text).red(),
        StyleType::Warning => style(text).yellow(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Formats a price, showing "N/A" when it is not known yet.
pub fn price_cell(price: f64) -> Cell {
    if price == 0.0 {
        return Cell::new("N/A")
            .fg(Color::DarkGrey)
            .set_alignment(CellAlignment::Right);
    }
    let text = if price >= 1.0 {
        format!("{price:.2}")
    } else {
        format!("{price:.6}")
    };
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Creates a cell for displaying percentage change with color coding.
pub fn change_cell(change: f64) -> Cell {
    let text = format!("{change:.2}%");
    if change >= 0.0 {
        Cell::new(text)
            .fg(Color::Green)
            .set_alignment(CellAlignment::Right)
    } else {
        Cell::new(text)
            .fg(Color::Red)
            .set_alignment(CellAlignment::Right)
    }
}

/// Renders quotations as a table. Favorites get a star.
pub fn quotation_table(quotations: &[Quotation], is_favorite: impl Fn(&str) -> bool) -> Table {
    let mut table = new_styled_table();
    table.set_header(vec![
        header_cell(""),
        header_cell("ID"),
        header_cell("Name"),
        header_cell("Symbol"),
        header_cell("Kind"),
        header_cell("Price"),
        header_cell("24h"),
    ]);
    for q in quotations {
        table.add_row(vec![
            Cell::new(if is_favorite(&q.id) { "★" } else { "" }).fg(Color::Yellow),
            Cell::new(&q.id),
            Cell::new(&q.name),
            Cell::new(&q.symbol).add_attribute(Attribute::Bold),
            Cell::new(q.kind.to_string()).fg(Color::DarkGrey),
            price_cell(q.current_price),
            change_cell(q.change_24h),
        ]);
    }
    table
}

/// Creates a new `indicatif::ProgressBar` spinner with standard styling.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
