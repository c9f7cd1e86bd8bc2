//! Error types for layout and PDF generation

use thiserror::Error;

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Errors that can occur during layout and PDF generation
#[derive(Error, Debug)]
pub enum PdfError {
    /// Typst compilation error
    #[error("Typst compilation failed: {0}")]
    Compilation(String),

    /// LaTeX math that could not be converted
    #[error("Math conversion failed: {0}")]
    Math(String),

    /// Font loading error
    #[error("Font error: {0}")]
    Font(String),

    /// Markup the layout engine cannot interpret
    #[error("Invalid markup: {0}")]
    Markup(String),

    /// A required or referenced style is not in the stylesheet
    #[error("Style not found: {0}")]
    MissingStyle(String),

    /// The embedded page document could not be read
    #[error("Invalid page document: {0}")]
    PageDocument(#[from] lopdf::Error),

    /// The embedded page document is structurally unusable
    #[error("Invalid vector page: {0}")]
    VectorPage(String),

    /// Raster image could not be decoded
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
