//! Inline markdown to paragraph markup
//!
//! Each inline node becomes a markup string built from its children's
//! output. All text is escaped exactly once, when it enters the markup.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use nbpdf_ast::Inline;

use crate::config::{InlineCodePolicy, LineBreakPolicy, MarkdownOptions};

/// Characters percent-encoded in image sources
const SRC_ENCODE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// URL schemes that never become link targets
const BLOCKED_SCHEMES: [&str; 2] = ["javascript:", "vbscript:"];

/// Escape text for paragraph markup
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a URL for an attribute value, blanking script URLs
pub fn escape_link(url: &str) -> String {
    let normalized: String = url
        .trim_matches(|c: char| c.is_whitespace() || c == '\0' || c == '\x1a')
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '/' || *c == ':')
        .collect::<String>()
        .to_ascii_lowercase();
    if BLOCKED_SCHEMES.iter().any(|s| normalized.starts_with(s)) {
        log::warn!("Dropping link target {:?}", url);
        return String::new();
    }
    escape(url)
}

/// Render a sequence of inline nodes
pub fn render_inlines(inlines: &[Inline], options: &MarkdownOptions) -> String {
    inlines
        .iter()
        .map(|inline| render_inline(inline, options))
        .collect()
}

/// Render one inline node
pub fn render_inline(inline: &Inline, options: &MarkdownOptions) -> String {
    match inline {
        Inline::Text(text) => escape(text),
        Inline::Emphasis(children) => format!("<i>{}</i>", render_inlines(children, options)),
        Inline::Strong(children) => format!("<b>{}</b>", render_inlines(children, options)),
        Inline::Strikethrough(children) => {
            format!("<strike>{}</strike>", render_inlines(children, options))
        }
        Inline::Link(link) => format!(
            "<a href=\"{}\">{}</a>",
            escape_link(&link.url),
            render_inlines(&link.text, options)
        ),
        Inline::Image(image) => {
            let src = utf8_percent_encode(&image.src, SRC_ENCODE).to_string();
            format!("<img src=\"{}\" />", escape_link(&src))
        }
        Inline::Math(math) => format!("${}$", escape(math)),
        Inline::Code(code) => match options.inline_code {
            InlineCodePolicy::Literal => code.clone(),
            InlineCodePolicy::Escaped => escape(code),
            InlineCodePolicy::Empty => String::new(),
        },
        Inline::LineBreak => match options.line_break {
            LineBreakPolicy::Empty => String::new(),
            LineBreakPolicy::Break => "<br/>".to_string(),
        },
        Inline::Unsupported(kind) => {
            log::debug!("Skipping inline {:?}", kind);
            String::new()
        }
    }
}
