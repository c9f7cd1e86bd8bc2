//! nbpdf CLI - Command-line interface library
//!
//! This library provides the CLI functionality for nbpdf:
//! - Convert: render a notebook to PDF
//! - Sources: render source files as highlighted listings
//!
//! # Library Usage
//!
//! ```ignore
//! use nbpdf_cli::{convert_command, sources_command};
//!
//! convert_command(&input, None, None, false)?;
//! sources_command(&files, &output)?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Notebook to PDF, next to the input
//! nbpdf convert analysis.ipynb
//!
//! # Explicit output and settings
//! nbpdf convert analysis.ipynb --output report.pdf --config nbpdf.toml
//!
//! # Source listings
//! nbpdf sources src/main.py src/util.py --output listing.pdf
//! ```

pub mod app;

// Re-export main entry point and commands
pub use app::{convert_command, load_options, run_cli, sources_command};
