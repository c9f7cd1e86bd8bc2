//! Paragraph styles
//!
//! The [`StyleSheet`] maps logical style names (`Normal`, `Code`,
//! `Heading1`, ...) to [`ParagraphStyle`] descriptors. It is validated when it
//! is built, so lookups of the required names cannot fail afterwards. The
//! sheet is read-only and is shared by reference for a whole conversion.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{PdfError, Result};

/// Deepest heading level that has a required style
pub const MAX_HEADING_LEVEL: u8 = 6;

/// Style names every stylesheet must define
pub const REQUIRED_STYLES: [&str; 8] = [
    "Normal", "Code", "Heading1", "Heading2", "Heading3", "Heading4", "Heading5", "Heading6",
];

/// Horizontal alignment of a paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Flush left
    #[default]
    Left,
    /// Centered
    Center,
    /// Flush right
    Right,
    /// Justified
    Justify,
}

/// Font and spacing descriptor for a paragraph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphStyle {
    /// Font family name
    pub font_family: String,
    /// Font size in points
    pub font_size: f32,
    /// Baseline-to-baseline distance in points
    pub leading: f32,
    /// Text color as `#rrggbb`
    pub text_color: String,
    /// Bold weight
    pub bold: bool,
    /// Italic style
    pub italic: bool,
    /// Space above the paragraph in points
    pub space_before: f32,
    /// Space below the paragraph in points
    pub space_after: f32,
    /// Left indent in points
    pub left_indent: f32,
    /// Horizontal alignment
    pub alignment: Alignment,
}

impl Default for ParagraphStyle {
    fn default() -> Self {
        Self {
            font_family: BODY_FONT.to_string(),
            font_size: 10.0,
            leading: 12.0,
            text_color: "#000000".to_string(),
            bold: false,
            italic: false,
            space_before: 0.0,
            space_after: 0.0,
            left_indent: 0.0,
            alignment: Alignment::Left,
        }
    }
}

const BODY_FONT: &str = "Libertinus Serif";
const MONO_FONT: &str = "DejaVu Sans Mono";

impl ParagraphStyle {
    fn sized(font_size: f32, leading: f32) -> Self {
        Self {
            font_size,
            leading,
            ..Self::default()
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    fn spaced(mut self, before: f32, after: f32) -> Self {
        self.space_before = before;
        self.space_after = after;
        self
    }
}

/// Partial style, as read from configuration
///
/// Unset fields keep the value of the style being overridden.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOverride {
    pub font_family: Option<String>,
    pub font_size: Option<f32>,
    pub leading: Option<f32>,
    pub text_color: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub space_before: Option<f32>,
    pub space_after: Option<f32>,
    pub left_indent: Option<f32>,
    pub alignment: Option<Alignment>,
}

impl StyleOverride {
    /// Apply the set fields on top of `base`
    pub fn apply(&self, base: &ParagraphStyle) -> ParagraphStyle {
        let mut style = base.clone();
        if let Some(ref v) = self.font_family {
            style.font_family = v.clone();
        }
        if let Some(v) = self.font_size {
            style.font_size = v;
        }
        if let Some(v) = self.leading {
            style.leading = v;
        }
        if let Some(ref v) = self.text_color {
            style.text_color = v.clone();
        }
        if let Some(v) = self.bold {
            style.bold = v;
        }
        if let Some(v) = self.italic {
            style.italic = v;
        }
        if let Some(v) = self.space_before {
            style.space_before = v;
        }
        if let Some(v) = self.space_after {
            style.space_after = v;
        }
        if let Some(v) = self.left_indent {
            style.left_indent = v;
        }
        if let Some(v) = self.alignment {
            style.alignment = v;
        }
        style
    }
}

/// Validated collection of named paragraph styles
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    styles: BTreeMap<String, ParagraphStyle>,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self::sample()
    }
}

impl StyleSheet {
    /// Build a stylesheet, checking that every required style is present
    pub fn new<I, K>(styles: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, ParagraphStyle)>,
        K: Into<String>,
    {
        let styles: BTreeMap<String, ParagraphStyle> =
            styles.into_iter().map(|(k, v)| (k.into(), v)).collect();

        if let Some(missing) = REQUIRED_STYLES.iter().find(|name| !styles.contains_key(**name)) {
            return Err(PdfError::MissingStyle((*missing).to_string()));
        }

        Ok(Self { styles })
    }

    /// The default stylesheet
    ///
    /// Sizes follow the classic report layout: 10pt body, 18pt first-level
    /// headings, 8pt indented monospace code.
    pub fn sample() -> Self {
        let mut code = ParagraphStyle::sized(8.0, 8.8);
        code.font_family = MONO_FONT.to_string();
        code.left_indent = 36.0;

        let mut title = ParagraphStyle::sized(18.0, 22.0).bold().spaced(0.0, 6.0);
        title.alignment = Alignment::Center;

        let styles = [
            ("Normal", ParagraphStyle::default()),
            ("Code", code),
            ("Title", title),
            ("Heading1", ParagraphStyle::sized(18.0, 22.0).bold().spaced(0.0, 6.0)),
            ("Heading2", ParagraphStyle::sized(14.0, 18.0).bold().spaced(12.0, 6.0)),
            ("Heading3", ParagraphStyle::sized(12.0, 14.0).bold().italic().spaced(12.0, 6.0)),
            ("Heading4", ParagraphStyle::sized(10.0, 12.0).bold().italic().spaced(10.0, 4.0)),
            ("Heading5", ParagraphStyle::sized(9.0, 10.8).bold().spaced(8.0, 4.0)),
            ("Heading6", ParagraphStyle::sized(7.0, 8.4).bold().spaced(6.0, 2.0)),
        ];

        Self {
            styles: styles
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    /// Return a copy with the given overrides applied
    ///
    /// Overrides for names not yet in the sheet create new styles based on
    /// the overridden `Normal`.
    pub fn with_overrides<'a, I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a StyleOverride)>,
    {
        let (existing, new): (Vec<_>, Vec<_>) = overrides
            .into_iter()
            .partition(|(name, _)| self.styles.contains_key(name.as_str()));

        for (name, ov) in existing.into_iter().chain(new) {
            let base = self
                .styles
                .get(name)
                .or_else(|| self.styles.get("Normal"))
                .cloned()
                .unwrap_or_default();
            self.styles.insert(name.clone(), ov.apply(&base));
        }
        self
    }

    /// Look up a style by name
    pub fn get(&self, name: &str) -> Result<&ParagraphStyle> {
        self.styles
            .get(name)
            .ok_or_else(|| PdfError::MissingStyle(name.to_string()))
    }

    /// Whether a style is defined
    pub fn contains(&self, name: &str) -> bool {
        self.styles.contains_key(name)
    }

    /// Names of all defined styles
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(String::as_str)
    }

    /// Style name for a heading level
    ///
    /// Levels outside `1..=6` are clamped, so the name is always a required
    /// style.
    pub fn heading_name(level: u8) -> String {
        format!("Heading{}", level.clamp(1, MAX_HEADING_LEVEL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_has_required_styles() {
        let sheet = StyleSheet::sample();
        for name in REQUIRED_STYLES {
            assert!(sheet.get(name).is_ok(), "missing {}", name);
        }
        assert!(sheet.contains("Title"));
    }

    #[test]
    fn test_new_rejects_missing_required() {
        let styles = [("Normal", ParagraphStyle::default())];
        match StyleSheet::new(styles) {
            Err(PdfError::MissingStyle(name)) => assert_eq!(name, "Code"),
            other => panic!("Expected MissingStyle, got {:?}", other),
        }
    }

    #[test]
    fn test_new_accepts_complete_sheet() {
        let styles = REQUIRED_STYLES
            .iter()
            .map(|name| (*name, ParagraphStyle::default()));
        let sheet = StyleSheet::new(styles).unwrap();
        assert_eq!(sheet.names().count(), REQUIRED_STYLES.len());
    }

    #[test]
    fn test_unknown_style_lookup() {
        let sheet = StyleSheet::sample();
        assert!(matches!(
            sheet.get("Caption"),
            Err(PdfError::MissingStyle(ref n)) if n == "Caption"
        ));
    }

    #[test]
    fn test_heading_name_clamps() {
        assert_eq!(StyleSheet::heading_name(1), "Heading1");
        assert_eq!(StyleSheet::heading_name(6), "Heading6");
        assert_eq!(StyleSheet::heading_name(0), "Heading1");
        assert_eq!(StyleSheet::heading_name(9), "Heading6");
    }

    #[test]
    fn test_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            "Normal".to_string(),
            StyleOverride {
                font_size: Some(11.0),
                ..Default::default()
            },
        );
        overrides.insert(
            "Caption".to_string(),
            StyleOverride {
                italic: Some(true),
                ..Default::default()
            },
        );

        let sheet = StyleSheet::sample().with_overrides(&overrides);
        assert_eq!(sheet.get("Normal").unwrap().font_size, 11.0);
        assert_eq!(sheet.get("Normal").unwrap().leading, 12.0);
        let caption = sheet.get("Caption").unwrap();
        assert!(caption.italic);
        assert_eq!(caption.font_size, 11.0);
    }

    #[test]
    fn test_override_from_toml() {
        let ov: StyleOverride = toml::from_str("font_size = 12.5\nalignment = \"center\"").unwrap();
        assert_eq!(ov.font_size, Some(12.5));
        assert_eq!(ov.alignment, Some(Alignment::Center));
        assert_eq!(ov.bold, None);
    }
}
