//! Syntax highlighting for code blocks and code cells
//!
//! A [`Highlighter`] turns source text into preformatted content. The
//! syntect-backed implementation colors tokens with `<font color>` spans;
//! [`PlainHighlighter`] passes the text through untouched.

use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use nbpdf_pdf::PreText;

use crate::error::{ConvertError, Result};
use crate::inline::escape;

/// Theme used when none is configured
pub const DEFAULT_THEME: &str = "InspiredGitHub";

/// Color of the `In [n]:` prompt
pub const PROMPT_COLOR: &str = "#303f9f";

/// Turns source code into preformatted content
pub trait Highlighter {
    /// Highlighter name, for logging
    fn name(&self) -> &'static str;

    /// Render source code; `language` is a name or file extension
    fn highlight(&self, source: &str, language: Option<&str>) -> PreText;
}

/// Passes source through as plain preformatted text
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn highlight(&self, source: &str, _language: Option<&str>) -> PreText {
        PreText::Plain(source.to_string())
    }
}

/// Highlights with syntect's bundled syntaxes and themes
pub struct SyntectHighlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl std::fmt::Debug for SyntectHighlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntectHighlighter")
            .field("theme", &self.theme.name)
            .finish()
    }
}

impl SyntectHighlighter {
    /// Highlighter with the default theme
    pub fn new() -> Result<Self> {
        Self::with_theme(DEFAULT_THEME)
    }

    /// Highlighter with a bundled theme
    pub fn with_theme(name: &str) -> Result<Self> {
        let mut themes = ThemeSet::load_defaults().themes;
        let theme = themes.remove(name).ok_or_else(|| {
            ConvertError::Config(format!("unknown highlight theme {:?}", name))
        })?;
        Ok(Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme,
        })
    }

    fn syntax(&self, language: Option<&str>) -> &SyntaxReference {
        let found = language.and_then(|lang| {
            let token = if lang.starts_with("ipython") {
                "python"
            } else {
                lang
            };
            self.syntaxes.find_syntax_by_token(token)
        });
        if found.is_none() {
            if let Some(lang) = language {
                log::debug!("No syntax for {:?}, highlighting as plain text", lang);
            }
        }
        found.unwrap_or_else(|| self.syntaxes.find_syntax_plain_text())
    }
}

impl Highlighter for SyntectHighlighter {
    fn name(&self) -> &'static str {
        "syntect"
    }

    fn highlight(&self, source: &str, language: Option<&str>) -> PreText {
        let mut lines = HighlightLines::new(self.syntax(language), &self.theme);
        let mut markup = String::with_capacity(source.len() * 2);

        for line in LinesWithEndings::from(source) {
            match lines.highlight_line(line, &self.syntaxes) {
                Ok(regions) => {
                    for (style, text) in regions {
                        push_region(&mut markup, style, text);
                    }
                }
                Err(e) => {
                    log::warn!("Highlighting failed, using plain text: {}", e);
                    return PreText::Plain(source.to_string());
                }
            }
        }

        PreText::Markup(markup)
    }
}

fn push_region(markup: &mut String, style: Style, text: &str) {
    if text.is_empty() {
        return;
    }
    let escaped = escape(text);
    if text.trim().is_empty() {
        markup.push_str(&escaped);
        return;
    }

    let color = style.foreground;
    let mut span = format!(
        "<font color=\"#{:02x}{:02x}{:02x}\">{}</font>",
        color.r, color.g, color.b, escaped
    );
    if style.font_style.contains(FontStyle::ITALIC) {
        span = format!("<i>{}</i>", span);
    }
    if style.font_style.contains(FontStyle::BOLD) {
        span = format!("<b>{}</b>", span);
    }
    markup.push_str(&span);
}

/// Execution prompt for a code cell
pub fn prompt(execution_count: Option<u32>) -> String {
    match execution_count {
        Some(n) => format!("In [{}]: ", n),
        None => "In [ ]: ".to_string(),
    }
}

/// Prefix code with its execution prompt
///
/// Continuation lines are indented by the prompt's width so the code stays
/// aligned under the first line.
pub fn with_prompt(code: PreText, execution_count: Option<u32>) -> PreText {
    let prompt = prompt(execution_count);
    let indent = " ".repeat(prompt.chars().count());
    let body = match code {
        PreText::Plain(text) => escape(&text),
        PreText::Markup(markup) => markup,
    };
    PreText::Markup(format!(
        "<font color=\"{}\">{}</font>{}",
        PROMPT_COLOR,
        escape(&prompt),
        body.replace('\n', &format!("\n{}", indent))
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_highlighter() {
        let text = PlainHighlighter.highlight("a < b", Some("python"));
        assert_eq!(text, PreText::Plain("a < b".to_string()));
    }

    #[test]
    fn test_syntect_colors_tokens() {
        let highlighter = SyntectHighlighter::new().unwrap();
        let PreText::Markup(markup) = highlighter.highlight("def f():\n    return 1\n", Some("python"))
        else {
            panic!("Expected markup");
        };
        assert!(markup.contains("<font color=\"#"));
        assert!(markup.contains(">def</font>"));
        assert!(markup.contains("return"));
        assert_eq!(markup.lines().count(), 2);
    }

    #[test]
    fn test_syntect_escapes_text() {
        let highlighter = SyntectHighlighter::new().unwrap();
        let text = highlighter.highlight("x = a < b & c", Some("py"));
        assert!(text.as_str().contains("&lt;"));
        assert!(text.as_str().contains("&amp;"));
        assert!(!text.as_str().contains(" < "));
    }

    #[test]
    fn test_ipython_maps_to_python() {
        let highlighter = SyntectHighlighter::new().unwrap();
        let ipython = highlighter.highlight("import os", Some("ipython3"));
        let python = highlighter.highlight("import os", Some("python"));
        assert_eq!(ipython, python);
    }

    #[test]
    fn test_unknown_language_falls_back() {
        let highlighter = SyntectHighlighter::new().unwrap();
        let text = highlighter.highlight("hello", Some("no-such-language"));
        assert!(text.as_str().contains("hello"));
    }

    #[test]
    fn test_unknown_theme() {
        let result = SyntectHighlighter::with_theme("Nope");
        assert!(matches!(result, Err(ConvertError::Config(_))));
    }

    #[test]
    fn test_prompt() {
        assert_eq!(prompt(Some(3)), "In [3]: ");
        assert_eq!(prompt(None), "In [ ]: ");
    }

    #[test]
    fn test_with_prompt_indents_continuation_lines() {
        let text = with_prompt(PreText::Plain("a = 1\nb = 2".to_string()), Some(3));
        assert_eq!(
            text,
            PreText::Markup(format!(
                "<font color=\"{}\">In [3]: </font>a = 1\n        b = 2",
                PROMPT_COLOR
            ))
        );
    }

    #[test]
    fn test_null_prompt_has_same_width() {
        assert_eq!(prompt(None).len(), prompt(Some(7)).len());
        let text = with_prompt(PreText::Plain("x".to_string()), None);
        assert!(text.as_str().contains("In [ ]: "));
    }
}
