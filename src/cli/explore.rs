use super::ui;
use crate::app::App;
use crate::core::aggregator::QuoteList;
use crate::core::resource::Resource;
use crate::core::session::SearchSession;
use anyhow::{Result, bail};
use futures::StreamExt;
use std::collections::HashSet;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Prints trending quotes, or search results when `query` is given.
pub async fn run(app: &App, query: Option<&str>) -> Result<()> {
    let term = query.unwrap_or_default();
    let label = if term.trim().is_empty() {
        "Fetching trending quotes".to_string()
    } else {
        format!("Searching for '{term}'")
    };

    let mut states = app.aggregator.quotations(term);
    let mut spinner = None;
    while let Some(state) = states.next().await {
        match state {
            Resource::Loading { .. } => spinner = Some(ui::new_spinner(&label)),
            Resource::Success(list) => {
                if let Some(pb) = spinner.take() {
                    pb.finish_and_clear();
                }
                print_list(app, &list)?;
            }
            Resource::Error { message, .. } => {
                if let Some(pb) = spinner.take() {
                    pb.finish_and_clear();
                }
                bail!(message);
            }
        }
    }
    Ok(())
}

fn print_list(app: &App, list: &QuoteList) -> Result<()> {
    for failure in &list.failures {
        eprintln!(
            "{}",
            ui::style_text(
                &format!("{} unavailable: {}", failure.provider, failure.message),
                ui::StyleType::Warning
            )
        );
    }
    if list.quotations.is_empty() {
        println!("No quotations found.");
        return Ok(());
    }

    let favorite_ids: HashSet<String> = app.favorites.all()?.into_iter().map(|q| q.id).collect();
    println!(
        "{}",
        ui::quotation_table(&list.quotations, |id| favorite_ids.contains(id))
    );
    Ok(())
}

/// Reads queries from stdin, one per line, and shows results as they settle.
pub async fn interactive(app: &App) -> Result<()> {
    let mut session = SearchSession::new(app.aggregator.clone(), app.debounce());
    let mut rx = session.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!(
        "{}",
        ui::style_text(
            "Type to search, an empty line for trending, Ctrl-D to quit.",
            ui::StyleType::Subtle
        )
    );
    session.set_query("");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(query) => session.set_query(&query),
                    None => break,
                }
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                match state {
                    Resource::Loading { .. } => {}
                    Resource::Success(list) => {
                        println!(
                            "\n{}",
                            ui::style_text(&format!("Results for '{}'", session.query()), ui::StyleType::Title)
                        );
                        print_list(app, &list)?;
                    }
                    Resource::Error { message, .. } => {
                        eprintln!("{}", ui::style_text(&message, ui::StyleType::Error));
                    }
                }
            }
        }
    }
    Ok(())
}
