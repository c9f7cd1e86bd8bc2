//! nbpdf-core - Jupyter notebooks to PDF
//!
//! Core library for nbpdf: translates notebook cells into layout primitives
//! and hands them to [`nbpdf_pdf`] for pagination.
//!
//! - [`parser`]: markdown source to [`nbpdf_ast::Block`] trees
//! - [`inline`] and [`block`]: markdown trees to paragraph markup and flowables
//! - [`highlight`]: syntax highlighting and execution prompts
//! - [`exporter`]: the per-notebook converter and the [`PdfExporter`] entry point
//!
//! # Example
//!
//! ```ignore
//! use nbpdf_ast::{Cell, Notebook, Output};
//! use nbpdf_core::PdfExporter;
//!
//! let notebook = Notebook::with_cells(vec![
//!     Cell::markdown("# Title\n\nHello **world**"),
//!     Cell::code("print(1)", Some(1), vec![Output::stream("1\n")]),
//! ]);
//! let (pdf, _resources) = PdfExporter::new()?.from_notebook(&notebook, None)?;
//! assert!(pdf.starts_with(b"%PDF"));
//! ```

pub mod block;
pub mod config;
pub mod error;
pub mod exporter;
pub mod highlight;
pub mod inline;
pub mod parser;
pub mod sources;

// Re-export main types and functions
pub use block::BlockRenderer;
pub use config::{
    ConvertOptions, HighlightSettings, ImageSettings, InlineCodePolicy, LineBreakPolicy,
    MarkdownOptions, MathSettings, SpacingSettings, CONFIG_FILE_NAME,
};
pub use error::{ConvertError, Result};
pub use exporter::{NotebookConverter, PdfExporter, Resources};
pub use highlight::{prompt, with_prompt, Highlighter, PlainHighlighter, SyntectHighlighter};
pub use inline::{escape, render_inline, render_inlines};
pub use parser::parse_markdown;
pub use sources::source_flowables;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
