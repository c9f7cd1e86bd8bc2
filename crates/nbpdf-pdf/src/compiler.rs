//! Typst to PDF compiler
//!
//! Compiles Typst markup to PDF bytes using typst-as-lib. Embedded fonts are
//! always available; extra font files and in-memory resources (images,
//! embedded pages) are passed per call.

use std::path::Path;

use typst_as_lib::typst_kit_options::TypstKitFontOptions;
use typst_as_lib::TypstEngine;

use crate::error::{PdfError, Result};

/// Compiler for converting Typst markup to PDF
pub struct Compiler;

impl Compiler {
    /// Compile Typst markup to PDF bytes
    ///
    /// # Arguments
    /// * `markup` - Typst markup string
    ///
    /// # Returns
    /// PDF bytes on success
    pub fn compile(markup: &str) -> Result<Vec<u8>> {
        Self::compile_with_resources(markup, &[], &[])
    }

    /// Compile with custom font files
    ///
    /// # Arguments
    /// * `markup` - Typst markup string
    /// * `font_paths` - Paths to font files to include
    pub fn compile_with_fonts(markup: &str, font_paths: &[&str]) -> Result<Vec<u8>> {
        let fonts = load_fonts(font_paths)?;
        Self::compile_with_resources(markup, &[], &fonts)
    }

    /// Compile with in-memory files and font data
    ///
    /// # Arguments
    /// * `markup` - Typst markup string
    /// * `files` - `(path, bytes)` pairs the markup can reference, e.g. `image("img-0.png")`
    /// * `fonts` - Raw font file contents
    pub fn compile_with_resources(
        markup: &str,
        files: &[(String, Vec<u8>)],
        fonts: &[Vec<u8>],
    ) -> Result<Vec<u8>> {
        let font_options = TypstKitFontOptions::new()
            .include_embedded_fonts(true)
            .include_system_fonts(false);

        let mut builder = TypstEngine::builder()
            .main_file(markup.to_string())
            .search_fonts_with(font_options);

        for font in fonts {
            builder = builder.fonts([font.clone()]);
        }

        let engine = builder
            .with_static_file_resolver(
                files
                    .iter()
                    .map(|(path, data)| (path.as_str(), data.clone())),
            )
            .build();

        // compiled is Warned<Result<Document, Error>>
        let compiled = engine.compile();
        for warning in compiled.warnings.iter() {
            log::debug!("Typst warning: {}", warning.message);
        }

        let document = compiled
            .output
            .map_err(|e| PdfError::Compilation(format!("{:?}", e)))?;

        let options = typst_pdf::PdfOptions::default();
        let pdf_bytes = typst_pdf::pdf(&document, &options)
            .map_err(|e| PdfError::Compilation(format!("PDF generation failed: {:?}", e)))?;

        Ok(pdf_bytes.into())
    }
}

/// Read font files from disk
pub fn load_fonts<P: AsRef<Path>>(font_paths: &[P]) -> Result<Vec<Vec<u8>>> {
    font_paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            std::fs::read(path).map_err(|e| {
                PdfError::Font(format!("Failed to read font {}: {}", path.display(), e))
            })
        })
        .collect()
}
