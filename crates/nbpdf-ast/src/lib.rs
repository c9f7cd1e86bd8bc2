//! nbpdf-ast - Notebook and markdown tree definitions
//!
//! This crate provides the data types nbpdf converts from:
//!
//! - [`Notebook`], [`Cell`] and [`Output`]: the nbformat v4 document model
//! - [`Block`] and [`Inline`]: the markdown tree produced for markdown cells
//!
//! Every markdown construct the renderer deliberately skips has an explicit
//! `Unsupported` variant, so a match over these types is always total.

pub mod block;
pub mod inline;
pub mod notebook;

pub use block::{Block, CodeBlock, Heading, Paragraph, UnsupportedBlock};
pub use inline::{Image, Inline, Link, UnsupportedInline};
pub use notebook::{
    Cell, CodeCell, ErrorOutput, MarkdownCell, MimeBundle, MimePayload, MultilineString,
    Notebook, Output, RawCell, RichOutput, StreamOutput,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, "0.1.0");
    }
}
