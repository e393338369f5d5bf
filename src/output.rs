//! Report rendering: colored text, tables, trees and JSON.

mod table;
mod text;
mod tree;

pub use table::render_breakdown;
pub use text::{parse_summary, summary_line};

use thiserror::Error;

use crate::drift::DriftReport;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Table,
    Tree,
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to format report: {0}")]
    Format(#[from] std::fmt::Error),
}

pub fn render(report: &DriftReport, format: OutputFormat, color: bool) -> Result<String, OutputError> {
    Ok(match format {
        OutputFormat::Text => text::render(report, color)?,
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
        OutputFormat::Table => table::render(report),
        OutputFormat::Tree => tree::render(report),
    })
}
