//! Markdown blocks to flowables
//!
//! Each [`Block`] becomes zero or more [`Flowable`]s. Text blocks carry a
//! style name only; the stylesheet that resolves it is checked before
//! conversion starts.

use nbpdf_ast::Block;
use nbpdf_pdf::{Flowable, MathRenderer, PreText, StyleSheet, VectorPage};

use crate::config::ConvertOptions;
use crate::error::Result;
use crate::highlight::Highlighter;
use crate::inline::render_inlines;
use crate::parser::parse_markdown;

/// Style for body paragraphs
pub const NORMAL_STYLE: &str = "Normal";
/// Style for code blocks and code cells
pub const CODE_STYLE: &str = "Code";

/// Renders markdown blocks with a highlighter and math renderer
pub struct BlockRenderer<'a> {
    highlighter: &'a dyn Highlighter,
    math: &'a dyn MathRenderer,
    options: &'a ConvertOptions,
}

impl<'a> BlockRenderer<'a> {
    pub fn new(
        highlighter: &'a dyn Highlighter,
        math: &'a dyn MathRenderer,
        options: &'a ConvertOptions,
    ) -> Self {
        Self {
            highlighter,
            math,
            options,
        }
    }

    /// Parse markdown and render every block, in order
    pub fn render_markdown(&self, source: &str) -> Result<Vec<Flowable>> {
        self.render_all(&parse_markdown(source))
    }

    /// Render a sequence of blocks, in order
    pub fn render_all(&self, blocks: &[Block]) -> Result<Vec<Flowable>> {
        let mut flowables = Vec::new();
        for block in blocks {
            flowables.extend(self.render(block)?);
        }
        Ok(flowables)
    }

    /// Render one block
    pub fn render(&self, block: &Block) -> Result<Vec<Flowable>> {
        let markdown = &self.options.markdown;
        let flowables = match block {
            Block::Heading(heading) => vec![Flowable::paragraph(
                render_inlines(&heading.inlines, markdown),
                StyleSheet::heading_name(heading.level),
            )],
            Block::Paragraph(paragraph) => vec![Flowable::paragraph(
                render_inlines(&paragraph.inlines, markdown),
                NORMAL_STYLE,
            )],
            Block::Rule => vec![Flowable::Rule],
            Block::Code(code) => {
                let text = match code.language.as_deref() {
                    Some(language) => self.highlighter.highlight(&code.text, Some(language)),
                    None => PreText::Plain(code.text.clone()),
                };
                vec![Flowable::preformatted(text, CODE_STYLE)]
            }
            Block::Math(math) => self.render_math(math)?,
            Block::Unsupported(kind) => {
                log::debug!("Not rendering {}", kind.name());
                Vec::new()
            }
        };
        Ok(flowables)
    }

    fn render_math(&self, math: &str) -> Result<Vec<Flowable>> {
        let settings = &self.options.math;
        let expression = format!("${}$", math.trim());
        let pdf = self.math.render(&expression)?;
        let page = VectorPage::with_size(pdf, settings.size)?;
        log::debug!(
            "Rendered math with {} at {:?}",
            self.math.name(),
            page.draw_size()
        );
        Ok(vec![
            Flowable::spacer(settings.spacer),
            page.into(),
            Flowable::spacer(settings.spacer),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use lopdf::{dictionary, Document, Object, Stream};
    use nbpdf_ast::{CodeBlock, Heading, Inline, Paragraph, UnsupportedBlock};
    use nbpdf_pdf::{ImageSize, PdfError};

    use crate::error::ConvertError;
    use crate::highlight::PlainHighlighter;

    /// Records expressions and returns a fixed 40x20 page
    #[derive(Default)]
    struct RecordingMath {
        seen: RefCell<Vec<String>>,
    }

    impl MathRenderer for RecordingMath {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn render(&self, expression: &str) -> nbpdf_pdf::Result<Vec<u8>> {
            self.seen.borrow_mut().push(expression.to_string());
            Ok(one_page_pdf(40, 20))
        }
    }

    struct FailingMath;

    impl MathRenderer for FailingMath {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn render(&self, _expression: &str) -> nbpdf_pdf::Result<Vec<u8>> {
            Err(PdfError::Compilation("unknown variable: frac".to_string()))
        }
    }

    fn one_page_pdf(width: i64, height: i64) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(width),
                Object::Integer(height),
            ],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    fn render(block: &Block) -> Vec<Flowable> {
        let options = ConvertOptions::default();
        let math = RecordingMath::default();
        BlockRenderer::new(&PlainHighlighter, &math, &options)
            .render(block)
            .unwrap()
    }

    #[test]
    fn test_heading_uses_level_style() {
        let block = Block::Heading(Heading {
            level: 2,
            inlines: vec![Inline::text("A & B")],
        });
        assert_eq!(render(&block), vec![Flowable::paragraph("A &amp; B", "Heading2")]);
    }

    #[test]
    fn test_paragraph_uses_normal_style() {
        let block = Block::Paragraph(Paragraph {
            inlines: vec![
                Inline::text("Hello "),
                Inline::Strong(vec![Inline::text("world")]),
            ],
        });
        assert_eq!(
            render(&block),
            vec![Flowable::paragraph("Hello <b>world</b>", "Normal")]
        );
    }

    #[test]
    fn test_rule() {
        assert_eq!(render(&Block::Rule), vec![Flowable::Rule]);
    }

    #[test]
    fn test_code_without_language_is_raw() {
        let block = Block::Code(CodeBlock {
            language: None,
            text: "a < b\n".to_string(),
        });
        assert_eq!(
            render(&block),
            vec![Flowable::preformatted(
                PreText::Plain("a < b\n".to_string()),
                "Code"
            )]
        );
    }

    #[test]
    fn test_code_with_language_is_highlighted() {
        let options = ConvertOptions::default();
        let math = RecordingMath::default();
        let highlighter = crate::highlight::SyntectHighlighter::new().unwrap();
        let renderer = BlockRenderer::new(&highlighter, &math, &options);
        let block = Block::Code(CodeBlock {
            language: Some("python".to_string()),
            text: "x = 1\n".to_string(),
        });
        let flowables = renderer.render(&block).unwrap();
        assert!(matches!(
            &flowables[0],
            Flowable::Preformatted { text: PreText::Markup(m), style } if m.contains("<font") && style == "Code"
        ));
    }

    #[test]
    fn test_math_is_wrapped_and_spaced() {
        let options = ConvertOptions::default();
        let math = RecordingMath::default();
        let renderer = BlockRenderer::new(&PlainHighlighter, &math, &options);

        let flowables = renderer.render(&Block::Math("  x^2 \n".to_string())).unwrap();

        assert_eq!(math.seen.borrow().as_slice(), ["$x^2$".to_string()]);
        assert_eq!(flowables.len(), 3);
        assert_eq!(flowables[0], Flowable::spacer(6.0));
        assert_eq!(flowables[2], Flowable::spacer(6.0));
        let Flowable::VectorPage(page) = &flowables[1] else {
            panic!("Expected vector page, got {:?}", flowables[1]);
        };
        assert_eq!(page.draw_size(), (20.0, 10.0));
    }

    #[test]
    fn test_math_size_is_configurable() {
        let mut options = ConvertOptions::default();
        options.math.size = ImageSize::Points {
            width: 80.0,
            height: 30.0,
        };
        let math = RecordingMath::default();
        let flowables = BlockRenderer::new(&PlainHighlighter, &math, &options)
            .render(&Block::Math("y".to_string()))
            .unwrap();
        let Flowable::VectorPage(page) = &flowables[1] else {
            panic!("Expected vector page");
        };
        assert_eq!(page.draw_size(), (80.0, 30.0));
    }

    #[test]
    fn test_math_failure_propagates() {
        let options = ConvertOptions::default();
        let result = BlockRenderer::new(&PlainHighlighter, &FailingMath, &options)
            .render(&Block::Math("\\frac".to_string()));
        assert!(matches!(
            result,
            Err(ConvertError::Pdf(PdfError::Compilation(_)))
        ));
    }

    #[test]
    fn test_every_unsupported_block_renders_nothing() {
        for kind in UnsupportedBlock::ALL {
            assert!(render(&Block::Unsupported(kind)).is_empty(), "{:?}", kind);
        }
    }

    #[test]
    fn test_render_markdown_keeps_order() {
        let options = ConvertOptions::default();
        let math = RecordingMath::default();
        let flowables = BlockRenderer::new(&PlainHighlighter, &math, &options)
            .render_markdown("# A\n\nb\n\n---\n\n- skipped\n\n```\ncode\n```\n")
            .unwrap();
        let kinds: Vec<&str> = flowables.iter().map(Flowable::kind).collect();
        assert_eq!(kinds, ["paragraph", "paragraph", "rule", "preformatted"]);
        assert_eq!(flowables[0].style(), Some("Heading1"));
        assert_eq!(flowables[1].style(), Some("Normal"));
    }
}
