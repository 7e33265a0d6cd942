use super::ui;
use crate::app::App;
use anyhow::{Result, anyhow};

pub fn list(app: &App) -> Result<()> {
    let favorites = app.aggregator.favorites()?;
    if favorites.is_empty() {
        println!("No favorites yet. Add one with `quotewatch favorites add <ID>`.");
        return Ok(());
    }
    println!("{}", ui::style_text("Favorites", ui::StyleType::Title));
    println!("{}", ui::quotation_table(&favorites, |_| true));
    Ok(())
}

pub async fn add(app: &App, id: &str) -> Result<()> {
    let quotation = app
        .aggregator
        .find(id)
        .await?
        .ok_or_else(|| anyhow!("No quotation found with id: {id}"))?;
    app.aggregator.add_favorite(&quotation)?;
    println!("Added {} ({}) to favorites.", quotation.name, quotation.symbol);
    Ok(())
}

pub fn remove(app: &App, id: &str) -> Result<()> {
    app.aggregator.remove_favorite(id)?;
    println!("Removed {id} from favorites.");
    Ok(())
}
