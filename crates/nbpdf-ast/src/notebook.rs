//! Notebook document model
//!
//! Mirrors the nbformat v4 JSON schema closely enough to deserialize real
//! `.ipynb` files with serde. Only the fields the renderer consults are
//! modelled; unknown fields are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A notebook: an ordered sequence of cells plus document metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Notebook {
    /// Cells in document order
    pub cells: Vec<Cell>,
    /// Notebook-level metadata (kernelspec, language_info, ...)
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Major format version
    #[serde(default = "default_nbformat")]
    pub nbformat: u32,
    /// Minor format version
    #[serde(default)]
    pub nbformat_minor: u32,
}

fn default_nbformat() -> u32 {
    4
}

impl Notebook {
    /// Create an empty notebook
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a notebook from a list of cells
    pub fn with_cells(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            ..Self::default()
        }
    }

    /// Parse a notebook from nbformat v4 JSON
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Append a cell
    pub fn push(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    /// The kernel language, if the metadata declares one
    ///
    /// `language_info.name` wins over `kernelspec.language`.
    pub fn language(&self) -> Option<&str> {
        let from = |section: &str, key: &str| {
            self.metadata
                .get(section)
                .and_then(|v| v.get(key))
                .and_then(Value::as_str)
        };
        from("language_info", "name").or_else(|| from("kernelspec", "language"))
    }
}

/// A notebook cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
pub enum Cell {
    /// Markdown prose
    Markdown(MarkdownCell),
    /// Source code with captured outputs
    Code(CodeCell),
    /// Raw content passed through untouched by notebook front-ends
    Raw(RawCell),
}

impl Cell {
    /// Shorthand for a markdown cell
    pub fn markdown(source: impl Into<String>) -> Self {
        Cell::Markdown(MarkdownCell {
            source: MultilineString(source.into()),
            metadata: Map::new(),
        })
    }

    /// Shorthand for a code cell
    pub fn code(source: impl Into<String>, execution_count: Option<u32>, outputs: Vec<Output>) -> Self {
        Cell::Code(CodeCell {
            source: MultilineString(source.into()),
            execution_count,
            outputs,
            metadata: Map::new(),
        })
    }

    /// The cell's source text
    pub fn source(&self) -> &str {
        match self {
            Cell::Markdown(c) => c.source.as_str(),
            Cell::Code(c) => c.source.as_str(),
            Cell::Raw(c) => c.source.as_str(),
        }
    }
}

/// A markdown cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkdownCell {
    /// Markdown source
    pub source: MultilineString,
    /// Cell metadata
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// A code cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeCell {
    /// Source code
    pub source: MultilineString,
    /// Execution index; `None` when the cell has not been run
    #[serde(default)]
    pub execution_count: Option<u32>,
    /// Captured outputs in the order they were produced
    #[serde(default)]
    pub outputs: Vec<Output>,
    /// Cell metadata
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// A raw cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCell {
    /// Raw source
    pub source: MultilineString,
    /// Cell metadata
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// A captured code cell output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "output_type", rename_all = "snake_case")]
pub enum Output {
    /// Text written to stdout/stderr
    Stream(StreamOutput),
    /// Rich output from an explicit display call
    DisplayData(RichOutput),
    /// Rich output for the cell's result value
    ExecuteResult(RichOutput),
    /// An exception raised while executing the cell
    Error(ErrorOutput),
}

impl Output {
    /// Shorthand for a stdout stream output
    pub fn stream(text: impl Into<String>) -> Self {
        Output::Stream(StreamOutput {
            name: "stdout".to_string(),
            text: MultilineString(text.into()),
        })
    }

    /// Shorthand for a display_data output with the given MIME payloads
    pub fn display_data<I, K, V>(data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Output::DisplayData(RichOutput {
            data: data
                .into_iter()
                .map(|(k, v)| (k.into(), MimePayload::Text(v.into())))
                .collect(),
            metadata: Map::new(),
            execution_count: None,
        })
    }

    /// The MIME bundle of a rich output
    pub fn rich(&self) -> Option<&RichOutput> {
        match self {
            Output::DisplayData(r) | Output::ExecuteResult(r) => Some(r),
            Output::Stream(_) | Output::Error(_) => None,
        }
    }
}

/// A stream output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamOutput {
    /// Stream name (`stdout` or `stderr`)
    #[serde(default)]
    pub name: String,
    /// Text chunks, already concatenated
    pub text: MultilineString,
}

/// A rich output carrying alternative representations keyed by MIME type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichOutput {
    /// MIME type to payload
    #[serde(default)]
    pub data: MimeBundle,
    /// Per-MIME metadata (sizes, etc.)
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Execution index, present on execute_result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_count: Option<u32>,
}

impl RichOutput {
    /// Text form of the payload for a MIME type, if present and textual
    pub fn text(&self, mime: &str) -> Option<String> {
        self.data.get(mime).and_then(MimePayload::as_text)
    }
}

/// An error output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorOutput {
    /// Exception class name
    #[serde(default)]
    pub ename: String,
    /// Exception value
    #[serde(default)]
    pub evalue: String,
    /// Formatted traceback lines
    #[serde(default)]
    pub traceback: Vec<String>,
}

/// MIME type to payload mapping
pub type MimeBundle = BTreeMap<String, MimePayload>;

/// One MIME payload
///
/// Text payloads may be stored either as a single string or as a list of
/// lines; JSON payloads (`application/json`, widget state) stay as values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MimePayload {
    /// Single string
    Text(String),
    /// List of lines, concatenated on read
    Lines(Vec<String>),
    /// Any other JSON value
    Json(Value),
}

impl MimePayload {
    /// The payload as text, or `None` for structured JSON
    pub fn as_text(&self) -> Option<String> {
        match self {
            MimePayload::Text(s) => Some(s.clone()),
            MimePayload::Lines(lines) => Some(lines.concat()),
            MimePayload::Json(_) => None,
        }
    }
}

/// nbformat "multiline string": a string or a list of line strings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "MultilineRepr", into = "String")]
pub struct MultilineString(pub String);

#[derive(Deserialize)]
#[serde(untagged)]
enum MultilineRepr {
    One(String),
    Many(Vec<String>),
}

impl From<MultilineRepr> for MultilineString {
    fn from(repr: MultilineRepr) -> Self {
        match repr {
            MultilineRepr::One(s) => MultilineString(s),
            MultilineRepr::Many(lines) => MultilineString(lines.concat()),
        }
    }
}

impl From<MultilineString> for String {
    fn from(s: MultilineString) -> Self {
        s.0
    }
}

impl MultilineString {
    /// Borrow the text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTEBOOK: &str = r##"{
        "cells": [
            {"cell_type": "markdown", "metadata": {}, "source": ["# Title\n", "\n", "Hello"]},
            {
                "cell_type": "code",
                "execution_count": 3,
                "metadata": {},
                "source": "print(1)",
                "outputs": [
                    {"output_type": "stream", "name": "stdout", "text": ["1\n"]},
                    {
                        "output_type": "execute_result",
                        "execution_count": 3,
                        "data": {"text/plain": ["a\n", "b"], "application/json": {"k": 1}},
                        "metadata": {}
                    },
                    {"output_type": "error", "ename": "ValueError", "evalue": "bad", "traceback": []}
                ]
            },
            {"cell_type": "code", "execution_count": null, "metadata": {}, "source": "", "outputs": []},
            {"cell_type": "raw", "metadata": {}, "source": "raw text"}
        ],
        "metadata": {"kernelspec": {"language": "python", "name": "python3"}},
        "nbformat": 4,
        "nbformat_minor": 5
    }"##;

    #[test]
    fn test_parse_notebook() {
        let nb = Notebook::from_json_str(NOTEBOOK).unwrap();
        assert_eq!(nb.cells.len(), 4);
        assert_eq!(nb.nbformat_minor, 5);
        assert_eq!(nb.cells[0].source(), "# Title\n\nHello");
        assert!(matches!(nb.cells[3], Cell::Raw(_)));
    }

    #[test]
    fn test_code_cell_outputs() {
        let nb = Notebook::from_json_str(NOTEBOOK).unwrap();
        let Cell::Code(cell) = &nb.cells[1] else {
            panic!("Expected code cell");
        };
        assert_eq!(cell.execution_count, Some(3));
        assert_eq!(cell.outputs.len(), 3);

        if let Output::Stream(s) = &cell.outputs[0] {
            assert_eq!(s.text.as_str(), "1\n");
        } else {
            panic!("Expected stream output");
        }

        let rich = cell.outputs[1].rich().unwrap();
        assert_eq!(rich.text("text/plain").as_deref(), Some("a\nb"));
        assert_eq!(rich.text("application/json"), None);
        assert!(matches!(cell.outputs[2], Output::Error(_)));
    }

    #[test]
    fn test_null_execution_count() {
        let nb = Notebook::from_json_str(NOTEBOOK).unwrap();
        if let Cell::Code(cell) = &nb.cells[2] {
            assert_eq!(cell.execution_count, None);
        } else {
            panic!("Expected code cell");
        }
    }

    #[test]
    fn test_language_lookup() {
        let nb = Notebook::from_json_str(NOTEBOOK).unwrap();
        assert_eq!(nb.language(), Some("python"));
        assert_eq!(Notebook::new().language(), None);
    }

    #[test]
    fn test_multiline_serializes_as_string() {
        let cell = Cell::markdown("a\nb");
        let json = serde_json::to_value(&cell).unwrap();
        assert_eq!(json["cell_type"], "markdown");
        assert_eq!(json["source"], "a\nb");
    }
}
