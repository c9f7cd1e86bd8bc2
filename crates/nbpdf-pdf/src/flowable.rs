//! Layout primitives
//!
//! A [`Flowable`] is one unit of page content. The converter produces them in
//! document order; the [`DocumentBuilder`](crate::DocumentBuilder) consumes
//! them exactly once and paginates them.

use std::io::Cursor;

use image::{ImageFormat, ImageReader};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::vector::VectorPage;

/// A unit of page content
#[derive(Debug, Clone, PartialEq)]
pub enum Flowable {
    /// Rich text laid out as a wrapped paragraph
    Paragraph {
        /// Paragraph markup (`<b>`, `<i>`, `<strike>`, `<a>`, `<font>`, ...)
        markup: String,
        /// Style name in the stylesheet
        style: String,
    },
    /// Preformatted text: whitespace and line breaks are kept
    Preformatted {
        /// Block content
        text: PreText,
        /// Style name in the stylesheet
        style: String,
    },
    /// An embedded raster image
    Image(RasterImage),
    /// An embedded single-page vector document
    VectorPage(VectorPage),
    /// A horizontal rule across the frame
    Rule,
    /// Vertical whitespace, in points
    Spacer {
        /// Height in points
        height: f32,
    },
}

impl Flowable {
    /// Create a paragraph
    pub fn paragraph(markup: impl Into<String>, style: impl Into<String>) -> Self {
        Flowable::Paragraph {
            markup: markup.into(),
            style: style.into(),
        }
    }

    /// Create a preformatted block
    pub fn preformatted(text: PreText, style: impl Into<String>) -> Self {
        Flowable::Preformatted {
            text,
            style: style.into(),
        }
    }

    /// Create a spacer
    pub fn spacer(height: f32) -> Self {
        Flowable::Spacer { height }
    }

    /// The style name, for text primitives
    pub fn style(&self) -> Option<&str> {
        match self {
            Flowable::Paragraph { style, .. } | Flowable::Preformatted { style, .. } => {
                Some(style)
            }
            _ => None,
        }
    }

    /// Short kind name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Flowable::Paragraph { .. } => "paragraph",
            Flowable::Preformatted { .. } => "preformatted",
            Flowable::Image(_) => "image",
            Flowable::VectorPage(_) => "vector page",
            Flowable::Rule => "rule",
            Flowable::Spacer { .. } => "spacer",
        }
    }
}

impl From<RasterImage> for Flowable {
    fn from(image: RasterImage) -> Self {
        Flowable::Image(image)
    }
}

impl From<VectorPage> for Flowable {
    fn from(page: VectorPage) -> Self {
        Flowable::VectorPage(page)
    }
}

/// Content of a preformatted block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreText {
    /// Literal text, shown exactly as given
    Plain(String),
    /// Markup using the paragraph tag vocabulary (usually `<font color>` runs)
    Markup(String),
}

impl PreText {
    /// The raw string, whichever form it is in
    pub fn as_str(&self) -> &str {
        match self {
            PreText::Plain(s) | PreText::Markup(s) => s,
        }
    }
}

/// Nominal display size of an embedded image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    /// Percentage of the intrinsic size on both axes
    Percent(f32),
    /// Absolute size in points
    Points {
        /// Width in points
        width: f32,
        /// Height in points
        height: f32,
    },
}

impl ImageSize {
    /// Resolve against an intrinsic size
    pub fn resolve(self, intrinsic_width: f32, intrinsic_height: f32) -> (f32, f32) {
        match self {
            ImageSize::Percent(p) => (intrinsic_width * p / 100.0, intrinsic_height * p / 100.0),
            ImageSize::Points { width, height } => (width, height),
        }
    }
}

/// A decoded raster image with its display size
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    data: Vec<u8>,
    format: ImageFormat,
    pixel_width: u32,
    pixel_height: u32,
    draw_width: f32,
    draw_height: f32,
}

impl RasterImage {
    /// Wrap encoded image bytes, sized relative to the pixel dimensions
    ///
    /// One pixel counts as one point.
    pub fn new(data: Vec<u8>, size: ImageSize) -> Result<Self> {
        let format = image::guess_format(&data)?;
        let (pixel_width, pixel_height) =
            ImageReader::with_format(Cursor::new(&data), format).into_dimensions()?;
        let (draw_width, draw_height) = size.resolve(pixel_width as f32, pixel_height as f32);

        Ok(Self {
            data,
            format,
            pixel_width,
            pixel_height,
            draw_width,
            draw_height,
        })
    }

    /// Encoded bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// File extension matching the encoding
    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("png")
    }

    /// Pixel dimensions
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.pixel_width, self.pixel_height)
    }

    /// Display size in points
    pub fn draw_size(&self) -> (f32, f32) {
        (self.draw_width, self.draw_height)
    }
}
