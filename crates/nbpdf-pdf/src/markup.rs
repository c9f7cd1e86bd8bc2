//! Paragraph markup to Typst content
//!
//! Text primitives carry a small XML-like markup vocabulary:
//!
//! | Tag                     | Typst            |
//! |-------------------------|------------------|
//! | `<b>`                   | `#strong[..]`    |
//! | `<i>`                   | `#emph[..]`      |
//! | `<strike>`              | `#strike[..]`    |
//! | `<a href="..">`         | `#link("..")[..]`|
//! | `<font color="#rrggbb">`| `#text(fill: ..)[..]` |
//! | `<br/>`                 | `#linebreak()`   |
//! | `<img src=".."/>`       | link to the source |
//!
//! Text runs are emitted as Typst string literals, so no character in the
//! source can be mistaken for Typst markup.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{PdfError, Result};

/// How whitespace in text runs is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whitespace {
    /// Runs of whitespace collapse to one space, newlines included
    Collapse,
    /// Spaces and newlines are kept as written
    Preserve,
}

/// Lower paragraph markup to Typst content markup
pub fn markup_to_typst(markup: &str, whitespace: Whitespace) -> Result<String> {
    let wrapped = format!("<para>{}</para>", markup);
    let mut reader = Reader::from_str(&wrapped);
    reader.config_mut().trim_text(false);

    let mut out = String::new();
    let mut open: Vec<Vec<u8>> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = e.local_name().as_ref().to_vec();
                if name != b"para" || !open.is_empty() {
                    out.push_str(&open_tag(e)?);
                }
                open.push(name);
            }
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"br" => out.push_str("#linebreak()"),
                b"img" => match attr(e, b"src")?.filter(|src| !src.is_empty()) {
                    Some(src) => {
                        log::warn!("Inline image {} is shown as a link", src);
                        out.push_str(&format!(
                            "#link({})[{}]",
                            typst_str(&src),
                            plain_to_typst(&src, whitespace)
                        ));
                    }
                    None => log::debug!("Dropping inline image without a source"),
                },
                other => out.push_str(&format!("{}]", open_tag_named(other, e)?)),
            },
            Ok(Event::End(_)) => {
                open.pop();
                if !open.is_empty() {
                    out.push(']');
                }
            }
            Ok(Event::Text(ref t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| PdfError::Markup(format!("{} in {:?}", e, markup)))?;
                out.push_str(&plain_to_typst(&text, whitespace));
            }
            Ok(Event::CData(ref t)) => {
                let text = String::from_utf8_lossy(t.as_ref());
                out.push_str(&plain_to_typst(&text, whitespace));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(PdfError::Markup(format!(
                    "{} at position {} in {:?}",
                    e,
                    reader.buffer_position(),
                    markup
                )))
            }
        }
    }

    Ok(out)
}

fn open_tag(e: &BytesStart) -> Result<String> {
    open_tag_named(e.local_name().as_ref(), e)
}

/// Typst call that opens a content block for a tag; the caller closes it with `]`
fn open_tag_named(name: &[u8], e: &BytesStart) -> Result<String> {
    let open = match name {
        b"b" | b"strong" => "#strong[".to_string(),
        b"i" | b"em" => "#emph[".to_string(),
        b"strike" | b"s" => "#strike[".to_string(),
        b"u" => "#underline[".to_string(),
        // Typst rejects empty link targets
        b"a" => match attr(e, b"href")?.filter(|href| !href.is_empty()) {
            Some(href) => format!("#link({})[", typst_str(&href)),
            None => "#[".to_string(),
        },
        b"font" => match attr(e, b"color")?.as_deref().and_then(color) {
            Some(fill) => format!("#text(fill: {})[", fill),
            None => "#[".to_string(),
        },
        other => {
            return Err(PdfError::Markup(format!(
                "unsupported tag <{}>",
                String::from_utf8_lossy(other)
            )))
        }
    };
    Ok(open)
}

fn attr(e: &BytesStart, name: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| PdfError::Markup(err.to_string()))?;
        if attr.key.as_ref() == name {
            let value = attr
                .unescape_value()
                .map_err(|err| PdfError::Markup(err.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Typst color expression for `#rgb`/`#rrggbb`
pub(crate) fn color(value: &str) -> Option<String> {
    let hex = value.strip_prefix('#')?;
    let valid = matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Some(format!("rgb(\"#{}\")", hex))
    } else {
        log::debug!("Ignoring unsupported color {:?}", value);
        None
    }
}

/// Emit literal text as one or more Typst string literals
pub fn plain_to_typst(text: &str, whitespace: Whitespace) -> String {
    match whitespace {
        Whitespace::Collapse => {
            let collapsed = collapse(text);
            if collapsed.is_empty() {
                String::new()
            } else {
                format!("#{}", typst_str(&collapsed))
            }
        }
        Whitespace::Preserve => {
            let mut out = String::new();
            for (i, line) in text.split('\n').enumerate() {
                if i > 0 {
                    out.push_str("#linebreak()");
                }
                if !line.is_empty() {
                    out.push('#');
                    out.push_str(&typst_str(&preserve(line)));
                }
            }
            out
        }
    }
}

fn collapse(text: &str) -> Cow<'_, str> {
    if !text.contains(|c: char| c.is_whitespace() && c != ' ') && !text.contains("  ") {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    Cow::Owned(out)
}

/// Spaces become no-break spaces so the layout keeps indentation
fn preserve(line: &str) -> String {
    line.trim_end_matches('\r')
        .replace('\t', "    ")
        .replace(' ', "\u{a0}")
}

/// Quote a string as a Typst string literal
pub(crate) fn typst_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
