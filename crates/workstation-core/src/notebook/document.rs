//! Notebook document parsing.
//!
//! Only the parts the editor needs are read: cell kind, source text, stored
//! outputs and execution count. Outputs stay raw JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, WorkstationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    Code,
    Markdown,
    Raw,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotebookCell {
    pub cell_type: CellType,
    pub source: String,
    pub outputs: Vec<Value>,
    pub execution_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotebookDocument {
    pub cells: Vec<NotebookCell>,
    pub nbformat: Option<u32>,
    pub metadata: Value,
}

/// `source` is either one string or a list of line strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum SourceText {
    Text(String),
    Lines(Vec<String>),
}

impl SourceText {
    fn into_string(self) -> String {
        match self {
            SourceText::Text(text) => text,
            SourceText::Lines(lines) => lines.concat(),
        }
    }
}

#[derive(Deserialize)]
struct RawCell {
    cell_type: CellType,
    #[serde(default)]
    source: Option<SourceText>,
    #[serde(default)]
    outputs: Vec<Value>,
    #[serde(default)]
    execution_count: Option<u32>,
}

#[derive(Deserialize)]
struct RawNotebook {
    cells: Vec<RawCell>,
    #[serde(default)]
    nbformat: Option<u32>,
    #[serde(default)]
    metadata: Value,
}

impl NotebookDocument {
    /// Parses notebook JSON.
    ///
    /// Fails with `InvalidNotebook` when the text is not JSON or lacks the
    /// notebook structure, so the editor can show a placeholder instead.
    pub fn parse(text: &str) -> Result<Self> {
        let raw: RawNotebook = serde_json::from_str(text)
            .map_err(|e| WorkstationError::InvalidNotebook(e.to_string()))?;

        let cells = raw
            .cells
            .into_iter()
            .map(|cell| NotebookCell {
                cell_type: cell.cell_type,
                source: cell.source.map(SourceText::into_string).unwrap_or_default(),
                outputs: cell.outputs,
                execution_count: cell.execution_count,
            })
            .collect();

        Ok(Self {
            cells,
            nbformat: raw.nbformat,
            metadata: raw.metadata,
        })
    }

    pub fn code_cells(&self) -> impl Iterator<Item = &NotebookCell> {
        self.cells.iter().filter(|c| c.cell_type == CellType::Code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cells() {
        let text = r##"{
            "nbformat": 4,
            "metadata": {"kernelspec": {"name": "python3"}},
            "cells": [
                {"cell_type": "markdown", "source": ["# Title\n", "text"]},
                {"cell_type": "code", "source": "x = 1\nx", "execution_count": 3,
                 "outputs": [{"output_type": "execute_result", "data": {"text/plain": "1"}}]}
            ]
        }"##;
        let doc = NotebookDocument::parse(text).unwrap();
        assert_eq!(doc.cells.len(), 2);
        assert_eq!(doc.cells[0].source, "# Title\ntext");
        assert_eq!(doc.nbformat, Some(4));

        let code: Vec<_> = doc.code_cells().collect();
        assert_eq!(code.len(), 1);
        assert_eq!(code[0].execution_count, Some(3));
        assert_eq!(code[0].outputs[0]["output_type"], "execute_result");
    }

    #[test]
    fn test_invalid_json() {
        let err = NotebookDocument::parse("{ nope").unwrap_err();
        assert!(matches!(err, WorkstationError::InvalidNotebook(_)));
        assert!(err.to_string().starts_with("Invalid notebook format"));
    }

    #[test]
    fn test_missing_cells() {
        assert!(NotebookDocument::parse(r#"{"metadata": {}}"#).is_err());
    }

    #[test]
    fn test_unknown_cell_type() {
        assert!(NotebookDocument::parse(r#"{"cells": [{"cell_type": "widget"}]}"#).is_err());
    }
}
