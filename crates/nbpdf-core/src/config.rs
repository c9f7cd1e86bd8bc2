//! Conversion settings
//!
//! Settings are read from an `nbpdf.toml` file. Every section and field is
//! optional; anything missing falls back to the defaults below.
//!
//! ```toml
//! [page]
//! width = 595.28
//! height = 841.89
//! margin = 72
//!
//! [images]
//! raster = { percent = 25.0 }
//!
//! [math]
//! size = { percent = 50.0 }
//! font_size = 16
//!
//! [markdown]
//! inline_code = "literal"
//! line_break = "empty"
//!
//! [highlight]
//! enabled = true
//! theme = "InspiredGitHub"
//!
//! [styles.Normal]
//! font_size = 11
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use nbpdf_pdf::{ImageSize, PageSetup, StyleOverride, StyleSheet};

use crate::error::Result;

/// Name of the configuration file looked up next to a notebook
pub const CONFIG_FILE_NAME: &str = "nbpdf.toml";

/// Top-level conversion settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Page geometry
    pub page: PageSetup,
    /// Raster image output settings
    pub images: ImageSettings,
    /// Display math settings
    pub math: MathSettings,
    /// Markdown rendering policies
    pub markdown: MarkdownOptions,
    /// Syntax highlighting
    pub highlight: HighlightSettings,
    /// Vertical spacing between cells and outputs
    pub spacing: SpacingSettings,
    /// Extra font files for the layout engine
    pub fonts: Vec<PathBuf>,
    /// Style overrides keyed by style name
    pub styles: BTreeMap<String, StyleOverride>,
}

impl ConvertOptions {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let options = Self::from_toml_str(&content)?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(options)
    }

    /// The sample stylesheet with the configured overrides applied
    pub fn stylesheet(&self) -> StyleSheet {
        StyleSheet::sample().with_overrides(&self.styles)
    }
}

/// Raster image output settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    /// Drawn size of `image/png` outputs
    pub raster: ImageSize,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            raster: ImageSize::Percent(25.0),
        }
    }
}

/// Display math settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MathSettings {
    /// Drawn size of the rendered math page
    pub size: ImageSize,
    /// Font size used when rendering math, in points
    pub font_size: f32,
    /// Space above and below a math block, in points
    pub spacer: f32,
}

impl Default for MathSettings {
    fn default() -> Self {
        Self {
            size: ImageSize::Percent(50.0),
            font_size: 16.0,
            spacer: 6.0,
        }
    }
}

/// What an inline code span renders as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InlineCodePolicy {
    /// The code text as-is, not escaped
    #[default]
    Literal,
    /// The code text, escaped like any other text
    Escaped,
    /// Nothing
    Empty,
}

/// What a hard line break renders as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineBreakPolicy {
    /// Nothing
    #[default]
    Empty,
    /// A `<br/>` break tag
    Break,
}

/// Markdown rendering policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownOptions {
    pub inline_code: InlineCodePolicy,
    pub line_break: LineBreakPolicy,
}

/// Syntax highlighting settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightSettings {
    /// Highlight code blocks and code cells
    pub enabled: bool,
    /// Name of a bundled syntect theme
    pub theme: String,
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            theme: crate::highlight::DEFAULT_THEME.to_string(),
        }
    }
}

/// Vertical spacing between cells and outputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpacingSettings {
    /// Space after every cell, in points
    pub cell: f32,
    /// Space between a code cell's source and its outputs; none when unset
    pub output: Option<f32>,
}

impl Default for SpacingSettings {
    fn default() -> Self {
        Self {
            cell: 12.0,
            output: None,
        }
    }
}
