//! Inline markdown elements
//!
//! Inline spans appear inside headings and paragraphs. Containers hold their
//! children directly; there is no separate "span" wrapper.

use serde::{Deserialize, Serialize};

/// Inline-level content element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Inline {
    /// Literal text, not yet escaped
    Text(String),
    /// Emphasis (italic)
    Emphasis(Vec<Inline>),
    /// Strong emphasis (bold)
    Strong(Vec<Inline>),
    /// Strikethrough
    Strikethrough(Vec<Inline>),
    /// A hyperlink
    Link(Link),
    /// An inline image
    Image(Image),
    /// Inline math, without the `$` delimiters
    Math(String),
    /// A code span
    Code(String),
    /// A hard line break
    LineBreak,
    /// A construct that is recognised but intentionally not rendered
    Unsupported(UnsupportedInline),
}

/// A hyperlink element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// The URL target
    pub url: String,
    /// Link title, if given
    pub title: Option<String>,
    /// The link text (can contain nested inline elements)
    pub text: Vec<Inline>,
}

/// An image element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Image source path or URL
    pub src: String,
    /// Alternative text
    pub alt: String,
}

/// Inline constructs that render to nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnsupportedInline {
    /// Inline raw HTML
    Html,
    /// A footnote reference
    FootnoteReference,
}

impl Inline {
    /// Shorthand for a text node
    pub fn text(s: impl Into<String>) -> Self {
        Inline::Text(s.into())
    }
}
