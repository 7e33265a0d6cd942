//! Terminal front end: one module per command

pub mod alerts;
pub mod explore;
pub mod favorites;
pub mod history;
pub mod setup;
pub mod ui;
