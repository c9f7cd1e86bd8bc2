//! Notebook to PDF export
//!
//! [`PdfExporter`] is the entry point: it owns the stylesheet, highlighter
//! and math renderer, and drives a [`NotebookConverter`] per notebook. The
//! converter walks cells in order and appends flowables; outputs of a code
//! cell follow its source, and every cell ends with a spacer.

use std::collections::BTreeMap;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use nbpdf_ast::{Cell, CodeCell, Notebook, Output, RichOutput};
use nbpdf_pdf::{
    load_fonts, DocumentBuilder, Flowable, MathRenderer, PreText, RasterImage, StyleSheet,
    TypstMathRenderer,
};

use crate::block::{BlockRenderer, CODE_STYLE};
use crate::config::ConvertOptions;
use crate::error::{ConvertError, Result};
use crate::highlight::{with_prompt, Highlighter, PlainHighlighter, SyntectHighlighter};
use crate::sources::source_flowables;

/// MIME type of PNG payloads
pub const PNG_MIME: &str = "image/png";
/// MIME type of plain text payloads
pub const TEXT_MIME: &str = "text/plain";

/// Language assumed for code cells when the notebook does not say
const DEFAULT_LANGUAGE: &str = "python";

/// Exporter resources, passed through conversion unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resources(pub BTreeMap<String, serde_json::Value>);

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.0.insert(key.into(), value);
    }
}

/// Per-notebook conversion state
pub struct NotebookConverter<'a> {
    blocks: BlockRenderer<'a>,
    highlighter: &'a dyn Highlighter,
    options: &'a ConvertOptions,
    language: String,
    flowables: Vec<Flowable>,
}

impl<'a> NotebookConverter<'a> {
    pub fn new(
        highlighter: &'a dyn Highlighter,
        math: &'a dyn MathRenderer,
        options: &'a ConvertOptions,
    ) -> Self {
        Self {
            blocks: BlockRenderer::new(highlighter, math, options),
            highlighter,
            options,
            language: DEFAULT_LANGUAGE.to_string(),
            flowables: Vec::new(),
        }
    }

    /// Convert every cell of a notebook
    pub fn convert_notebook(&mut self, notebook: &Notebook) -> Result<()> {
        self.language = notebook
            .language()
            .unwrap_or(DEFAULT_LANGUAGE)
            .to_string();
        log::debug!(
            "Converting {} cells (language: {})",
            notebook.cells.len(),
            self.language
        );
        for cell in &notebook.cells {
            self.convert_cell(cell)?;
        }
        Ok(())
    }

    /// Convert one cell, followed by the cell spacer
    pub fn convert_cell(&mut self, cell: &Cell) -> Result<()> {
        match cell {
            Cell::Markdown(markdown) => {
                let flowables = self.blocks.render_markdown(markdown.source.as_str())?;
                self.flowables.extend(flowables);
            }
            Cell::Code(code) => self.convert_code_cell(code)?,
            Cell::Raw(_) => log::debug!("Skipping raw cell"),
        }
        self.flowables
            .push(Flowable::spacer(self.options.spacing.cell));
        Ok(())
    }

    fn convert_code_cell(&mut self, cell: &CodeCell) -> Result<()> {
        let source = cell.source.as_str().trim_end();
        let code = if self.options.highlight.enabled {
            self.highlighter.highlight(source, Some(&self.language))
        } else {
            PreText::Plain(source.to_string())
        };
        self.flowables.push(Flowable::preformatted(
            with_prompt(code, cell.execution_count),
            CODE_STYLE,
        ));

        if !cell.outputs.is_empty() {
            if let Some(height) = self.options.spacing.output {
                self.flowables.push(Flowable::spacer(height));
            }
        }
        for output in &cell.outputs {
            self.convert_output(output)?;
        }
        Ok(())
    }

    /// Convert one code cell output
    pub fn convert_output(&mut self, output: &Output) -> Result<()> {
        match output {
            Output::Stream(stream) => {
                self.flowables.push(Flowable::preformatted(
                    PreText::Plain(stream.text.as_str().to_string()),
                    CODE_STYLE,
                ));
            }
            Output::DisplayData(rich) | Output::ExecuteResult(rich) => {
                self.convert_mime_bundle(rich)?
            }
            Output::Error(error) => {
                log::debug!("Not rendering error output {}: {}", error.ename, error.evalue);
            }
        }
        Ok(())
    }

    /// `image/png` wins over `text/plain`; anything else is dropped
    fn convert_mime_bundle(&mut self, rich: &RichOutput) -> Result<()> {
        if let Some(encoded) = rich.text(PNG_MIME) {
            let data = decode_base64(&encoded).map_err(|e| ConvertError::MalformedPayload {
                mime: PNG_MIME.to_string(),
                message: e.to_string(),
            })?;
            let image = RasterImage::new(data, self.options.images.raster)?;
            self.flowables.push(image.into());
        } else if let Some(text) = rich.text(TEXT_MIME) {
            self.flowables
                .push(Flowable::preformatted(PreText::Plain(text), CODE_STYLE));
        } else {
            log::debug!(
                "No renderable representation among {:?}",
                rich.data.keys().collect::<Vec<_>>()
            );
        }
        Ok(())
    }

    /// Flowables produced so far
    pub fn flowables(&self) -> &[Flowable] {
        &self.flowables
    }

    pub fn into_flowables(self) -> Vec<Flowable> {
        self.flowables
    }
}

/// Base64 with embedded whitespace, as notebooks store it
fn decode_base64(encoded: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(compact)
}

/// Exports notebooks to PDF
pub struct PdfExporter {
    options: ConvertOptions,
    styles: StyleSheet,
    highlighter: Box<dyn Highlighter>,
    math: Box<dyn MathRenderer>,
    fonts: Vec<Vec<u8>>,
}

impl PdfExporter {
    /// Exporter with default settings
    pub fn new() -> Result<Self> {
        Self::with_options(ConvertOptions::default())
    }

    /// Exporter configured from settings
    pub fn with_options(options: ConvertOptions) -> Result<Self> {
        let highlighter: Box<dyn Highlighter> = if options.highlight.enabled {
            Box::new(SyntectHighlighter::with_theme(&options.highlight.theme)?)
        } else {
            Box::new(PlainHighlighter)
        };
        let fonts = load_fonts(&options.fonts)?;
        Ok(Self {
            styles: options.stylesheet(),
            math: Box::new(TypstMathRenderer::new(options.math.font_size)),
            highlighter,
            fonts,
            options,
        })
    }

    /// Replace the stylesheet
    pub fn with_styles(mut self, styles: StyleSheet) -> Self {
        self.styles = styles;
        self
    }

    /// Replace the highlighter
    pub fn with_highlighter(mut self, highlighter: Box<dyn Highlighter>) -> Self {
        self.highlighter = highlighter;
        self
    }

    /// Replace the math renderer
    pub fn with_math_renderer(mut self, math: Box<dyn MathRenderer>) -> Self {
        self.math = math;
        self
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    pub fn file_extension(&self) -> &'static str {
        ".pdf"
    }

    pub fn output_mimetype(&self) -> &'static str {
        "application/pdf"
    }

    /// Convert a notebook to flowables without laying them out
    pub fn flowables(&self, notebook: &Notebook) -> Result<Vec<Flowable>> {
        let mut converter =
            NotebookConverter::new(self.highlighter.as_ref(), self.math.as_ref(), &self.options);
        converter.convert_notebook(notebook)?;
        Ok(converter.into_flowables())
    }

    /// Convert a notebook to PDF bytes
    pub fn from_notebook(
        &self,
        notebook: &Notebook,
        resources: Option<Resources>,
    ) -> Result<(Vec<u8>, Resources)> {
        let flowables = self.flowables(notebook)?;
        let pdf = self.build(&flowables)?;
        Ok((pdf, resources.unwrap_or_default()))
    }

    /// Convert notebook JSON to PDF bytes
    pub fn from_json_str(
        &self,
        json: &str,
        resources: Option<Resources>,
    ) -> Result<(Vec<u8>, Resources)> {
        let notebook = Notebook::from_json_str(json)?;
        self.from_notebook(&notebook, resources)
    }

    /// Convert a notebook file to PDF bytes
    pub fn from_filename(
        &self,
        path: &Path,
        resources: Option<Resources>,
    ) -> Result<(Vec<u8>, Resources)> {
        log::info!("Converting {}", path.display());
        let json = std::fs::read_to_string(path)?;
        self.from_json_str(&json, resources)
    }

    /// Lay out and compile flowables with this exporter's page and fonts
    pub fn build(&self, flowables: &[Flowable]) -> Result<Vec<u8>> {
        let pdf = DocumentBuilder::new(&self.styles)
            .with_page(self.options.page)
            .with_fonts(self.fonts.clone())
            .build(flowables)?;
        Ok(pdf)
    }

    /// Render source listings to PDF bytes
    pub fn render_sources(&self, files: &[(String, String)]) -> Result<Vec<u8>> {
        let flowables = source_flowables(files, self.highlighter.as_ref());
        self.build(&flowables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbpdf_ast::{ErrorOutput, MimePayload};

    fn exporter() -> PdfExporter {
        PdfExporter::new()
            .unwrap()
            .with_highlighter(Box::new(PlainHighlighter))
    }

    fn convert(cells: Vec<Cell>) -> Vec<Flowable> {
        exporter().flowables(&Notebook::with_cells(cells)).unwrap()
    }

    #[test]
    fn test_exporter_identity() {
        let exporter = exporter();
        assert_eq!(exporter.file_extension(), ".pdf");
        assert_eq!(exporter.output_mimetype(), "application/pdf");
    }

    #[test]
    fn test_markdown_cell() {
        let flowables = convert(vec![Cell::markdown("# Title\n\nHello **world**")]);
        assert_eq!(
            flowables,
            vec![
                Flowable::paragraph("Title", "Heading1"),
                Flowable::paragraph("Hello <b>world</b>", "Normal"),
                Flowable::spacer(12.0),
            ]
        );
    }

    #[test]
    fn test_code_cell_with_stream() {
        let flowables = convert(vec![Cell::code(
            "print(1)",
            Some(1),
            vec![Output::stream("1\n")],
        )]);
        assert_eq!(flowables.len(), 3);
        let Flowable::Preformatted { text, style } = &flowables[0] else {
            panic!("Expected preformatted, got {:?}", flowables[0]);
        };
        assert_eq!(style, "Code");
        assert!(text.as_str().contains("In [1]: "));
        assert!(text.as_str().contains("print(1)"));
        assert_eq!(
            flowables[1],
            Flowable::preformatted(PreText::Plain("1\n".to_string()), "Code")
        );
        assert_eq!(flowables[2], Flowable::spacer(12.0));
    }

    #[test]
    fn test_code_source_trailing_whitespace_trimmed() {
        let flowables = convert(vec![Cell::code("x = 1\n\n  ", None, vec![])]);
        assert!(flowables[0].style() == Some("Code"));
        let Flowable::Preformatted { text, .. } = &flowables[0] else {
            panic!("Expected preformatted");
        };
        assert!(text.as_str().ends_with("x = 1"));
        assert!(text.as_str().contains("In [ ]: "));
    }

    #[test]
    fn test_output_spacer_when_configured() {
        let mut options = ConvertOptions::default();
        options.highlight.enabled = false;
        options.spacing.output = Some(6.0);
        let exporter = PdfExporter::with_options(options).unwrap();

        let notebook = Notebook::with_cells(vec![
            Cell::code("a", Some(1), vec![Output::stream("x")]),
            Cell::code("b", Some(2), vec![]),
        ]);
        let kinds: Vec<_> = exporter
            .flowables(&notebook)
            .unwrap()
            .iter()
            .map(Flowable::kind)
            .collect();
        assert_eq!(
            kinds,
            ["preformatted", "spacer", "preformatted", "spacer", "preformatted", "spacer"]
        );
    }

    #[test]
    fn test_text_plain_when_no_png() {
        let output = Output::display_data([("text/plain", "42"), ("text/html", "<b>42</b>")]);
        let flowables = convert(vec![Cell::code("x", Some(1), vec![output])]);
        assert_eq!(
            flowables[1],
            Flowable::preformatted(PreText::Plain("42".to_string()), "Code")
        );
    }

    #[test]
    fn test_unrenderable_bundle_is_skipped() {
        let output = Output::display_data([("text/html", "<table/>")]);
        let flowables = convert(vec![Cell::code("x", Some(1), vec![output])]);
        assert_eq!(flowables.len(), 2);
    }

    #[test]
    fn test_error_output_is_skipped() {
        let error = Output::Error(ErrorOutput {
            ename: "ValueError".to_string(),
            evalue: "bad".to_string(),
            traceback: vec![],
        });
        let flowables = convert(vec![Cell::code("raise", Some(1), vec![error])]);
        assert_eq!(flowables.len(), 2);
    }

    #[test]
    fn test_json_payload_is_not_text() {
        let mut rich = RichOutput {
            data: Default::default(),
            metadata: Default::default(),
            execution_count: Some(1),
        };
        rich.data.insert(
            "text/plain".to_string(),
            MimePayload::Json(serde_json::json!({"a": 1})),
        );
        let flowables = convert(vec![Cell::code("x", Some(1), vec![Output::ExecuteResult(rich)])]);
        assert_eq!(flowables.len(), 2);
    }

    #[test]
    fn test_malformed_png_payload() {
        let output = Output::display_data([("image/png", "not*base64!")]);
        let result = exporter().flowables(&Notebook::with_cells(vec![Cell::code(
            "x",
            Some(1),
            vec![output],
        )]));
        assert!(matches!(
            result,
            Err(ConvertError::MalformedPayload { ref mime, .. }) if mime == "image/png"
        ));
    }

    #[test]
    fn test_decode_base64_ignores_whitespace() {
        assert_eq!(decode_base64("aGVs\nbG8=\n").unwrap(), b"hello");
    }

    #[test]
    fn test_raw_cell_only_spacer() {
        let notebook: Notebook = serde_json::from_value(serde_json::json!({
            "cells": [{"cell_type": "raw", "source": "raw text", "metadata": {}}],
            "metadata": {},
            "nbformat": 4,
            "nbformat_minor": 5
        }))
        .unwrap();
        let flowables = exporter().flowables(&notebook).unwrap();
        assert_eq!(flowables, vec![Flowable::spacer(12.0)]);
    }

    #[test]
    fn test_resources_pass_through() {
        let mut resources = Resources::new();
        resources.insert("output_extension", serde_json::json!(".pdf"));
        let (pdf, out) = exporter()
            .from_notebook(&Notebook::new(), Some(resources.clone()))
            .unwrap();
        assert!(pdf.starts_with(b"%PDF"));
        assert_eq!(out, resources);
    }

    #[test]
    fn test_invalid_notebook_json() {
        let result = exporter().from_json_str("{\"cells\": 3}", None);
        assert!(matches!(result, Err(ConvertError::Notebook(_))));
    }
}
