//! Synthetic page rendering.
//!
//! Booklet padding needs pages that print as visibly empty but still carry
//! their page number, so a stray sheet can be put back in order. Appending a
//! single blank page (the upload endpoint) needs no label at all.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

use crate::error::Result;

/// Resource name of the label font inside a blank page.
const FONT_NAME: &str = "F1";

/// Label font size in points.
const FONT_SIZE: i64 = 12;

/// Position of the label baseline, in points from the lower-left corner.
const LABEL_ORIGIN: (i64, i64) = (200, 400);

/// Page dimensions in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    /// Width in points.
    pub width: f32,
    /// Height in points.
    pub height: f32,
}

impl PageSize {
    /// ISO A4 portrait.
    pub const A4: Self = Self {
        width: 595.28,
        height: 841.89,
    };

    /// Create a page size.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// `MediaBox` array anchored at the origin.
    pub fn media_box(&self) -> Object {
        Object::Array(vec![
            0.into(),
            0.into(),
            Object::Real(self.width),
            Object::Real(self.height),
        ])
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// Text drawn on a padding page.
pub fn page_label(number: usize) -> String {
    format!("Blank page - Page {number}")
}

/// Renders blank pages into a document.
///
/// The label font is added to the target document on first use and shared
/// by every labelled page drawn afterwards, so a renderer must only ever be
/// used with one document.
#[derive(Debug, Clone, Default)]
pub struct BlankPageRenderer {
    size: PageSize,
    font: Option<ObjectId>,
}

impl BlankPageRenderer {
    /// Create a renderer producing A4 pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a renderer producing pages of `size`.
    pub fn with_size(size: PageSize) -> Self {
        Self { size, font: None }
    }

    /// Size of the pages this renderer produces.
    pub fn size(&self) -> PageSize {
        self.size
    }

    /// Add a labelled blank page to `doc` and return its object id.
    ///
    /// The page points at `parent` but is not yet listed in its `Kids`;
    /// linking it into the page tree is up to the caller.
    pub fn render(
        &mut self,
        doc: &mut Document,
        parent: ObjectId,
        number: usize,
    ) -> Result<ObjectId> {
        let font_id = self.font_id(doc);
        let (x, y) = LABEL_ORIGIN;

        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![FONT_NAME.into(), FONT_SIZE.into()]),
                Operation::new("Td", vec![x.into(), y.into()]),
                Operation::new("Tj", vec![Object::string_literal(page_label(number))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => parent,
            "MediaBox" => self.size.media_box(),
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! {
                    FONT_NAME => font_id,
                },
            },
        });

        log::debug!("Rendered blank page {number} as object {page_id:?}");
        Ok(page_id)
    }

    /// Add an empty page of `size` to `doc` and return its object id.
    ///
    /// Like [`render`](Self::render), the page is not linked into `Kids`.
    pub fn render_unlabelled(doc: &mut Document, parent: ObjectId, size: PageSize) -> ObjectId {
        doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => parent,
            "MediaBox" => size.media_box(),
            "Resources" => dictionary! {},
        })
    }

    fn font_id(&mut self, doc: &mut Document) -> ObjectId {
        *self.font.get_or_insert_with(|| {
            doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
            })
        })
    }
}
