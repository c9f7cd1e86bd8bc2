//! Math rendering
//!
//! Display math is rendered to a standalone single-page PDF and embedded as a
//! [`VectorPage`](crate::VectorPage), so formulas stay vector graphics.
//! Expressions are LaTeX, as written in notebook markdown; they are converted
//! to Typst math with `mitex` before compiling.

use crate::compiler::Compiler;
use crate::error::{PdfError, Result};

/// Definitions for the helper functions `mitex` emits for some commands
const MITEX_PRELUDE: &str = "\
#let mitexsqrt(..args) = {
  let pos = args.pos()
  if pos.len() == 1 { math.sqrt(pos.at(0)) } else { math.root(pos.at(0), pos.at(1)) }
}
#let mathbf(it) = math.bold(math.upright(it))
#let mathrm(it) = math.upright(it)
#let mathit(it) = math.italic(it)
#let mathsf(it) = math.sans(it)
#let mathtt(it) = math.mono(it)
#let mathcal(it) = math.cal(it)
#let mathbb(it) = math.bb(it)
#let operatorname(it) = math.op(math.upright(it))
";

/// Renders a math expression to a single-page PDF document
pub trait MathRenderer {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Render an expression given with its `$...$` delimiters
    fn render(&self, expression: &str) -> Result<Vec<u8>>;
}

/// Math renderer backed by Typst's math layout
///
/// The expression body is LaTeX math.
#[derive(Debug, Clone, Copy)]
pub struct TypstMathRenderer {
    /// Font size in points
    pub font_size: f32,
}

impl Default for TypstMathRenderer {
    fn default() -> Self {
        Self { font_size: 16.0 }
    }
}

impl TypstMathRenderer {
    /// Create a renderer with the given font size
    pub fn new(font_size: f32) -> Self {
        Self { font_size }
    }

    /// The standalone Typst document for an expression
    pub fn source(&self, expression: &str) -> Result<String> {
        let body = expression.trim();
        let body = body
            .strip_prefix('$')
            .and_then(|b| b.strip_suffix('$'))
            .unwrap_or(body)
            .trim();
        let math = mitex::convert_math(body, None).map_err(PdfError::Math)?;
        Ok(format!(
            "#set page(width: auto, height: auto, margin: 2pt)\n#set text(size: {}pt)\n{}$ {} $\n",
            self.font_size, MITEX_PRELUDE, math
        ))
    }
}

impl MathRenderer for TypstMathRenderer {
    fn name(&self) -> &'static str {
        "typst"
    }

    fn render(&self, expression: &str) -> Result<Vec<u8>> {
        log::debug!("Rendering math {:?}", expression);
        Compiler::compile(&self.source(expression)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::{SizeMode, VectorPage};

    #[test]
    fn test_source_strips_delimiters() {
        let renderer = TypstMathRenderer::new(12.0);
        let source = renderer.source("$ x^2 + 1 $").unwrap();
        assert!(!source.contains("$$"));
        assert!(source.contains("size: 12pt"));
        assert!(source.contains("width: auto"));
        assert!(source.trim_end().ends_with('$'));
    }

    #[test]
    fn test_source_converts_latex_commands() {
        let source = TypstMathRenderer::default()
            .source(r"$\frac{a}{b} + \alpha$")
            .unwrap();
        let body = source.lines().last().unwrap();
        assert!(body.contains("frac("));
        assert!(body.contains("alpha"));
        assert!(!body.contains('\\'));
    }

    #[test]
    fn test_render_latex_fraction() {
        let pdf = TypstMathRenderer::default()
            .render(r"$\frac{a}{b}$")
            .unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_greek_and_sums() {
        let renderer = TypstMathRenderer::default();
        for expression in [r"$\alpha^2$", r"$\sum_{i=1}^n i$"] {
            let pdf = renderer.render(expression).unwrap();
            assert!(pdf.starts_with(b"%PDF"), "{}", expression);
        }
    }

    #[test]
    fn test_render_produces_single_page_pdf() {
        let pdf = TypstMathRenderer::default().render("$x^2$").unwrap();
        assert!(pdf.starts_with(b"%PDF"));

        let page = VectorPage::new(pdf, None, None, SizeMode::Direct).unwrap();
        let (w, h) = page.intrinsic_size();
        assert!(w > 0.0 && h > 0.0);
    }

    #[test]
    fn test_render_error_propagates() {
        let result = TypstMathRenderer::new(f32::NAN).render("$x$");
        assert!(matches!(result, Err(PdfError::Compilation(_))));
    }
}
