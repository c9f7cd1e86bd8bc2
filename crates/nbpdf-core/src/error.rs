//! Error types for notebook conversion

use thiserror::Error;

use nbpdf_pdf::PdfError;

/// Errors that can occur while converting a notebook
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The notebook JSON does not match the nbformat schema
    #[error("Invalid notebook: {0}")]
    Notebook(#[from] serde_json::Error),

    /// An output payload could not be decoded
    #[error("Malformed {mime} payload: {message}")]
    MalformedPayload {
        /// MIME type of the payload
        mime: String,
        /// Decoder message
        message: String,
    },

    /// Layout, rendering or PDF generation failed
    #[error(transparent)]
    Pdf(#[from] PdfError),

    /// Configuration could not be read or is invalid
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for ConvertError {
    fn from(err: toml::de::Error) -> Self {
        ConvertError::Config(err.to_string())
    }
}

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;
