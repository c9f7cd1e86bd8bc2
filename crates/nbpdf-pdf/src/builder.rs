//! Flowables to a paginated document
//!
//! [`DocumentBuilder`] lays out a flowable sequence as a Typst document and
//! compiles it. Each text primitive becomes a block carrying its style's
//! font and spacing; images and embedded pages are handed to Typst as
//! in-memory files.

use serde::{Deserialize, Serialize};

use crate::compiler::Compiler;
use crate::error::Result;
use crate::flowable::{Flowable, PreText};
use crate::markup::{self, Whitespace};
use crate::style::{Alignment, ParagraphStyle, StyleSheet};

/// Page size and margins, in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSetup {
    /// Page width
    pub width: f32,
    /// Page height
    pub height: f32,
    /// Margin on all four sides
    pub margin: f32,
}

impl Default for PageSetup {
    /// A4 with one-inch margins
    fn default() -> Self {
        Self {
            width: 595.28,
            height: 841.89,
            margin: 72.0,
        }
    }
}

/// A laid-out document ready for compilation
#[derive(Debug, Clone, PartialEq)]
pub struct TypstDocument {
    /// Main Typst source
    pub source: String,
    /// In-memory files referenced by the source
    pub files: Vec<(String, Vec<u8>)>,
}

/// Builds a PDF from a sequence of flowables
pub struct DocumentBuilder<'a> {
    styles: &'a StyleSheet,
    page: PageSetup,
    fonts: Vec<Vec<u8>>,
}

impl<'a> DocumentBuilder<'a> {
    /// Create a builder using the given stylesheet
    pub fn new(styles: &'a StyleSheet) -> Self {
        Self {
            styles,
            page: PageSetup::default(),
            fonts: Vec::new(),
        }
    }

    /// Set the page geometry
    pub fn with_page(mut self, page: PageSetup) -> Self {
        self.page = page;
        self
    }

    /// Add font file contents to the font search set
    pub fn with_fonts(mut self, fonts: Vec<Vec<u8>>) -> Self {
        self.fonts.extend(fonts);
        self
    }

    /// Lay out flowables and compile them to PDF bytes
    pub fn build(&self, flowables: &[Flowable]) -> Result<Vec<u8>> {
        let document = self.layout(flowables)?;
        log::debug!(
            "Compiling {} flowables ({} bytes of Typst, {} files)",
            flowables.len(),
            document.source.len(),
            document.files.len()
        );
        let pdf = Compiler::compile_with_resources(&document.source, &document.files, &self.fonts)?;
        log::info!("Built PDF document ({} bytes)", pdf.len());
        Ok(pdf)
    }

    /// Lay out flowables as a Typst document without compiling it
    pub fn layout(&self, flowables: &[Flowable]) -> Result<TypstDocument> {
        let mut source = self.preamble();
        let mut files = Vec::new();

        for flowable in flowables {
            let typst = match flowable {
                Flowable::Paragraph { markup, style } => {
                    let content = markup::markup_to_typst(markup, Whitespace::Collapse)?;
                    self.styled_block(self.styles.get(style)?, &content, false)
                }
                Flowable::Preformatted { text, style } => {
                    let content = match text {
                        PreText::Plain(text) => markup::plain_to_typst(text, Whitespace::Preserve),
                        PreText::Markup(markup) => {
                            markup::markup_to_typst(markup, Whitespace::Preserve)?
                        }
                    };
                    self.styled_block(self.styles.get(style)?, &content, true)
                }
                Flowable::Image(image) => {
                    let name = format!("img-{}.{}", files.len(), image.extension());
                    let typst = Self::image_block(&name, image.draw_size());
                    files.push((name, image.data().to_vec()));
                    typst
                }
                Flowable::VectorPage(page) => {
                    let name = format!("page-{}.pdf", files.len());
                    let typst = Self::image_block(&name, page.draw_size());
                    files.push((name, page.data().to_vec()));
                    typst
                }
                Flowable::Rule => {
                    "#block(above: 1pt, below: 1pt, width: 100%)[#align(center)[#line(length: 80%, stroke: 1pt)]]\n"
                        .to_string()
                }
                Flowable::Spacer { height } => format!("#v({}pt)\n", height),
            };
            source.push_str(&typst);
        }

        Ok(TypstDocument { source, files })
    }

    fn preamble(&self) -> String {
        format!(
            "#set page(width: {}pt, height: {}pt, margin: {}pt)\n#set block(spacing: 0pt)\n#set par(spacing: 0pt)\n\n",
            self.page.width, self.page.height, self.page.margin
        )
    }

    /// A block carrying one paragraph style
    fn styled_block(&self, style: &ParagraphStyle, content: &str, preformatted: bool) -> String {
        let fill = markup::color(&style.text_color).unwrap_or_else(|| "black".to_string());
        let weight = if style.bold { "bold" } else { "regular" };
        let font_style = if style.italic { "italic" } else { "normal" };
        let align = match style.alignment {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "left",
        };
        let justify = style.alignment == Alignment::Justify && !preformatted;
        // Typst leading is the gap below one line's baseline and above the
        // next line's cap height.
        let gap = (style.leading - 0.7 * style.font_size).max(0.0);

        format!(
            "#block(above: {}pt, below: {}pt, inset: (left: {}pt), width: 100%)[\n\
             #set text(font: {}, size: {}pt, fill: {}, weight: \"{}\", style: \"{}\")\n\
             #set par(leading: {}pt, justify: {})\n\
             #set align({})\n\
             {}\n]\n",
            style.space_before,
            style.space_after,
            style.left_indent,
            markup::typst_str(&style.font_family),
            style.font_size,
            fill,
            weight,
            font_style,
            gap,
            justify,
            align,
            content
        )
    }

    fn image_block(name: &str, (width, height): (f32, f32)) -> String {
        format!(
            "#align(center)[#image({}, width: {}pt, height: {}pt, fit: \"stretch\")]\n",
            markup::typst_str(name),
            width,
            height
        )
    }
}

/// Convenience: build with the default page setup and no extra fonts
pub fn build_pdf(flowables: &[Flowable], styles: &StyleSheet) -> Result<Vec<u8>> {
    DocumentBuilder::new(styles).build(flowables)
}
