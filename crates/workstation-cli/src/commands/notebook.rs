use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use workstation_core::notebook::{CellType, NotebookDocument};

/// Parses a notebook and prints a one-line summary per cell.
pub async fn check(file: &Path) -> Result<()> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let document = NotebookDocument::parse(&text)?;

    println!(
        "{} ({} cells, nbformat {})",
        file.display().to_string().bold(),
        document.cells.len(),
        document
            .nbformat
            .map(|v| v.to_string())
            .unwrap_or_else(|| "?".to_string())
    );

    for (index, cell) in document.cells.iter().enumerate() {
        let kind = match cell.cell_type {
            CellType::Code => "code".cyan(),
            CellType::Markdown => "markdown".green(),
            CellType::Raw => "raw".dimmed(),
        };
        let first_line = cell.source.lines().next().unwrap_or("");
        let count = cell
            .execution_count
            .map(|n| format!("[{}]", n))
            .unwrap_or_default();
        println!("{:>3} {:<8} {:<5} {}", index + 1, kind, count, first_line);
    }
    Ok(())
}
