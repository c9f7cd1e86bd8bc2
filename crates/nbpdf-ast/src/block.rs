//! Block-level markdown elements
//!
//! The set of variants is closed. Constructs the renderer does not lay out
//! (tables, quotes, lists, raw HTML, footnote definitions) are folded into
//! [`Block::Unsupported`] so they stay visible to callers and tests.

use serde::{Deserialize, Serialize};

use crate::inline::Inline;

/// Block-level content element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    /// A section heading
    Heading(Heading),
    /// A paragraph of text
    Paragraph(Paragraph),
    /// A horizontal rule
    Rule,
    /// A fenced or indented code block
    Code(CodeBlock),
    /// A display math expression (`$$ ... $$`)
    Math(String),
    /// A construct that is recognised but intentionally not rendered
    Unsupported(UnsupportedBlock),
}

/// A section heading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading level (1-6, where 1 is the highest)
    pub level: u8,
    /// Heading text content
    pub inlines: Vec<Inline>,
}

/// A paragraph block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    /// Inline content within the paragraph
    pub inlines: Vec<Inline>,
}

/// A code block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Language tag from the fence info string, if any
    pub language: Option<String>,
    /// Raw code text, including the trailing newline
    pub text: String,
}

/// Block constructs that render to nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnsupportedBlock {
    /// A table
    Table,
    /// A block quote
    BlockQuote,
    /// An ordered or unordered list
    List,
    /// A single list item
    ListItem,
    /// Raw HTML
    Html,
    /// A footnote definition
    Footnote,
}

impl UnsupportedBlock {
    /// Every unsupported kind
    pub const ALL: [UnsupportedBlock; 6] = [
        UnsupportedBlock::Table,
        UnsupportedBlock::BlockQuote,
        UnsupportedBlock::List,
        UnsupportedBlock::ListItem,
        UnsupportedBlock::Html,
        UnsupportedBlock::Footnote,
    ];

    /// Short name used in log messages
    pub fn name(self) -> &'static str {
        match self {
            UnsupportedBlock::Table => "table",
            UnsupportedBlock::BlockQuote => "block quote",
            UnsupportedBlock::List => "list",
            UnsupportedBlock::ListItem => "list item",
            UnsupportedBlock::Html => "html block",
            UnsupportedBlock::Footnote => "footnote definition",
        }
    }
}

impl Block {
    /// Shorthand for a paragraph of plain text
    pub fn text_paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph(Paragraph {
            inlines: vec![Inline::Text(text.into())],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading() {
        let h = Heading {
            level: 2,
            inlines: vec![Inline::Text("Section".to_string())],
        };
        assert_eq!(h.level, 2);
    }

    #[test]
    fn test_unsupported_names_are_distinct() {
        let mut names: Vec<_> = UnsupportedBlock::ALL.iter().map(|k| k.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), UnsupportedBlock::ALL.len());
    }

    #[test]
    fn test_block_serde() {
        let block = Block::Code(CodeBlock {
            language: Some("rust".to_string()),
            text: "fn main() {}\n".to_string(),
        });
        let json = serde_json::to_string(&block).unwrap();
        let back: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(block, back);
    }
}
