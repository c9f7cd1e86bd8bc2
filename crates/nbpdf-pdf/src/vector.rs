//! Embedding a PDF page as a vector image
//!
//! [`VectorPage`] wraps the first page of an existing PDF so it can be placed
//! in the document like an image, without rasterizing it. Rendered math uses
//! this path.

use lopdf::{Document, Object, ObjectId};
use serde::{Deserialize, Serialize};

use crate::error::{PdfError, Result};
use crate::flowable::ImageSize;

/// How a requested box is applied to the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeMode {
    /// Stretch each axis independently to the requested size
    #[default]
    Direct,
    /// Scale uniformly to fit inside the requested box
    Bound,
}

/// Page bounding box in PDF user space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    fn from_rect(values: &[f32]) -> Option<Self> {
        match values {
            [a, b, c, d] => Some(Self {
                x1: a.min(*c),
                y1: b.min(*d),
                x2: a.max(*c),
                y2: b.max(*d),
            }),
            _ => None,
        }
    }

    /// Width of the box
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    /// Height of the box
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }
}

/// Translation and scale that map the page onto its target position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageTransform {
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

/// The first page of a PDF document, sized for placement
#[derive(Debug, Clone, PartialEq)]
pub struct VectorPage {
    data: Vec<u8>,
    bbox: BoundingBox,
    draw_width: f32,
    draw_height: f32,
}

impl VectorPage {
    /// Wrap a PDF document
    ///
    /// With neither dimension given the page keeps its intrinsic size. With
    /// one dimension, the other follows the page's aspect ratio. With both,
    /// `mode` decides between stretching and uniform fitting.
    pub fn new(
        data: Vec<u8>,
        width: Option<f32>,
        height: Option<f32>,
        mode: SizeMode,
    ) -> Result<Self> {
        let bbox = read_bounding_box(&data)?;
        let (w, h) = (bbox.width(), bbox.height());
        if w <= 0.0 || h <= 0.0 {
            return Err(PdfError::VectorPage(format!(
                "empty bounding box {}x{}",
                w, h
            )));
        }

        let (draw_width, draw_height) = match (width, height, mode) {
            (None, None, _) => (w, h),
            (Some(width), None, _) => (width, width * h / w),
            (None, Some(height), _) => (height * w / h, height),
            (Some(width), Some(height), SizeMode::Direct) => (width, height),
            (Some(width), Some(height), SizeMode::Bound) => {
                let factor = (width / w).min(height / h);
                (w * factor, h * factor)
            }
        };

        Ok(Self {
            data,
            bbox,
            draw_width,
            draw_height,
        })
    }

    /// Wrap a PDF document at a nominal size, stretched directly
    pub fn with_size(data: Vec<u8>, size: ImageSize) -> Result<Self> {
        let bbox = read_bounding_box(&data)?;
        let (width, height) = size.resolve(bbox.width(), bbox.height());
        Self::new(data, Some(width), Some(height), SizeMode::Direct)
    }

    /// The PDF bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The page's bounding box
    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    /// Size of the page's bounding box
    pub fn intrinsic_size(&self) -> (f32, f32) {
        (self.bbox.width(), self.bbox.height())
    }

    /// Size the page occupies in the layout
    pub fn draw_size(&self) -> (f32, f32) {
        (self.draw_width, self.draw_height)
    }

    /// Transform placing the bounding box origin at `(x, y)`
    pub fn transform(&self, x: f32, y: f32) -> PageTransform {
        let scale_x = self.draw_width / self.bbox.width();
        let scale_y = self.draw_height / self.bbox.height();
        PageTransform {
            translate_x: x - self.bbox.x1 * scale_x,
            translate_y: y - self.bbox.y1 * scale_y,
            scale_x,
            scale_y,
        }
    }
}

/// Read the visible box of the first page: CropBox if set, else MediaBox
fn read_bounding_box(data: &[u8]) -> Result<BoundingBox> {
    let doc = Document::load_mem(data)?;
    let page_id = doc
        .get_pages()
        .into_values()
        .next()
        .ok_or_else(|| PdfError::VectorPage("document has no pages".to_string()))?;

    for key in [b"CropBox".as_slice(), b"MediaBox".as_slice()] {
        if let Some(rect) = inherited_rect(&doc, page_id, key)? {
            return BoundingBox::from_rect(&rect).ok_or_else(|| {
                PdfError::VectorPage(format!("malformed {}", String::from_utf8_lossy(key)))
            });
        }
    }

    Err(PdfError::VectorPage("page has no MediaBox".to_string()))
}

/// Look up a rectangle on the page, walking up the page tree
fn inherited_rect(doc: &Document, page_id: ObjectId, key: &[u8]) -> Result<Option<Vec<f32>>> {
    let mut node = doc.get_dictionary(page_id)?;
    loop {
        if let Ok(value) = node.get(key) {
            let (_, value) = doc.dereference(value)?;
            let rect = value
                .as_array()?
                .iter()
                .map(|item| doc.dereference(item).and_then(|(_, v)| v.as_float()))
                .collect::<std::result::Result<Vec<f32>, _>>()?;
            return Ok(Some(rect));
        }
        match node.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => node = doc.get_dictionary(parent)?,
            Err(_) => return Ok(None),
        }
    }
}
