//! Source listings
//!
//! Renders plain source files as a PDF: each file gets a title paragraph
//! with its name, then its highlighted contents.

use std::path::Path;

use nbpdf_pdf::Flowable;

use crate::block::CODE_STYLE;
use crate::highlight::Highlighter;
use crate::inline::escape;

/// Style for the file name above each listing
pub const TITLE_STYLE: &str = "Title";

/// Flowables for a set of `(name, source)` listings
///
/// The language is guessed from each name's extension.
pub fn source_flowables(files: &[(String, String)], highlighter: &dyn Highlighter) -> Vec<Flowable> {
    let mut flowables = Vec::with_capacity(files.len() * 2);
    for (name, source) in files {
        let language = Path::new(name).extension().and_then(|e| e.to_str());
        log::debug!("Listing {} as {:?}", name, language);
        flowables.push(Flowable::paragraph(escape(name), TITLE_STYLE));
        flowables.push(Flowable::preformatted(
            highlighter.highlight(source, language),
            CODE_STYLE,
        ));
    }
    flowables
}
