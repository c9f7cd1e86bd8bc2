//! nbpdf-pdf - Layout primitives and PDF generation via Typst
//!
//! This crate owns everything on the page side of nbpdf:
//!
//! 1. **Flowables** - the layout primitives a conversion produces
//! 2. **StyleSheet** - named paragraph styles, validated on construction
//! 3. **VectorPage** - a PDF page embedded as a vector image
//! 4. **MathRenderer** - renders display math to a single-page PDF
//! 5. **DocumentBuilder** - lays flowables out as Typst and compiles to PDF
//!
//! # Example
//!
//! ```ignore
//! use nbpdf_pdf::{DocumentBuilder, Flowable, StyleSheet};
//!
//! let styles = StyleSheet::sample();
//! let pdf = DocumentBuilder::new(&styles).build(&[
//!     Flowable::paragraph("Title", "Heading1"),
//!     Flowable::paragraph("Hello <b>world</b>", "Normal"),
//! ])?;
//! ```

mod builder;
mod compiler;
mod error;
mod flowable;
pub mod markup;
mod math;
mod style;
mod vector;

pub use builder::{build_pdf, DocumentBuilder, PageSetup, TypstDocument};
pub use compiler::{load_fonts, Compiler};
pub use error::{PdfError, Result};
pub use flowable::{Flowable, ImageSize, PreText, RasterImage};
pub use math::{MathRenderer, TypstMathRenderer};
pub use style::{
    Alignment, ParagraphStyle, StyleOverride, StyleSheet, MAX_HEADING_LEVEL, REQUIRED_STYLES,
};
pub use vector::{BoundingBox, PageTransform, SizeMode, VectorPage};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_keeps_flowable_order() {
        let styles = StyleSheet::sample();
        let doc = DocumentBuilder::new(&styles)
            .layout(&[
                Flowable::paragraph("First", StyleSheet::heading_name(1)),
                Flowable::Rule,
                Flowable::preformatted(PreText::Plain("Second".to_string()), "Code"),
            ])
            .unwrap();
        let first = doc.source.find("\"First\"").unwrap();
        let rule = doc.source.find("#line(").unwrap();
        let second = doc.source.find("\"Second\"").unwrap();
        assert!(first < rule && rule < second);
        assert!(doc.files.is_empty());
    }
}
