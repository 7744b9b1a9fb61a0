//! Page selection and page tree manipulation.
//!
//! This module handles page-level operations including:
//! - Building a new document from an ordered list of pages
//! - Appending a blank page
//! - Resolving inherited page attributes

use lopdf::{Document, Object, ObjectId};

use crate::error::{PdfBookError, Result};
use crate::pages::blank::{BlankPageRenderer, PageSize};
use crate::pages::navigation::prune_navigation;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic `Parent` chains in malformed files.
const MAX_TREE_DEPTH: usize = 64;

/// Page extractor for building documents out of existing pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageExtractor;

impl PageExtractor {
    /// Create a new page extractor.
    pub fn new() -> Self {
        Self
    }

    /// Get the number of pages in a document.
    pub fn page_count(&self, doc: &Document) -> usize {
        doc.get_pages().len()
    }

    /// Page object ids in reading order.
    pub fn page_ids(&self, doc: &Document) -> Vec<ObjectId> {
        doc.get_pages().into_values().collect()
    }

    /// Object id of the root `Pages` node.
    pub fn pages_root(&self, doc: &Document) -> Result<ObjectId> {
        let catalog = doc
            .catalog()
            .map_err(|e| PdfBookError::page_tree(format!("Failed to get catalog: {e}")))?;

        catalog
            .get(b"Pages")
            .and_then(Object::as_reference)
            .map_err(|e| PdfBookError::page_tree(format!("Failed to get pages reference: {e}")))
    }

    /// Build a new document whose page tree lists exactly `page_ids`, in
    /// that order.
    ///
    /// `doc` is left untouched. Every listed page is re-parented directly
    /// under the root `Pages` node after its inherited attributes have been
    /// copied onto it. Outlines, destinations and form fields leading to
    /// other pages are removed (see [`prune_navigation`]), and objects no
    /// longer reachable are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog or the root `Pages` node is missing,
    /// or if an id does not name a page object.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfbook::pages::PageExtractor;
    /// # use lopdf::Document;
    /// # fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
    /// let extractor = PageExtractor::new();
    /// let mut ids = extractor.page_ids(&doc);
    /// ids.reverse();
    /// let reversed = extractor.select(&doc, &ids)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn select(&self, doc: &Document, page_ids: &[ObjectId]) -> Result<Document> {
        let mut new_doc = doc.clone();
        let root = self.pages_root(&new_doc)?;

        for &page_id in page_ids {
            self.flatten_inherited(&mut new_doc, page_id)?;
        }

        for &page_id in page_ids {
            new_doc
                .get_dictionary_mut(page_id)
                .map_err(|e| PdfBookError::page_tree(format!("Failed to get page: {e}")))?
                .set("Parent", root);
        }

        prune_navigation(&mut new_doc, page_ids)?;
        self.update_page_tree(&mut new_doc, root, page_ids)?;

        let pruned = new_doc.prune_objects();
        log::debug!(
            "Selected {} pages, pruned {} unreachable objects",
            page_ids.len(),
            pruned.len()
        );

        Ok(new_doc)
    }

    /// Copy of `doc` with one empty page appended.
    ///
    /// The new page has the size of the last page, or A4 for an empty
    /// document. The result goes through [`select`](Self::select), so nested
    /// page trees come out flattened.
    pub fn append_blank_page(&self, doc: &Document) -> Result<Document> {
        let mut extended = doc.clone();
        let root = self.pages_root(&extended)?;

        let mut page_ids = self.page_ids(&extended);
        let size = page_ids
            .last()
            .and_then(|&last| self.page_size(&extended, last))
            .unwrap_or_default();

        page_ids.push(BlankPageRenderer::render_unlabelled(&mut extended, root, size));
        self.select(&extended, &page_ids)
    }

    /// Size of a page from its (possibly inherited) `MediaBox`.
    pub fn page_size(&self, doc: &Document, page_id: ObjectId) -> Option<PageSize> {
        let [x0, y0, x1, y1] = self.media_box(doc, page_id)?;
        Some(PageSize::new((x1 - x0).abs(), (y1 - y0).abs()))
    }

    /// The page's `MediaBox` as `[llx, lly, urx, ury]`.
    pub fn media_box(&self, doc: &Document, page_id: ObjectId) -> Option<[f32; 4]> {
        let value = inherited_attribute(doc, page_id, b"MediaBox")?;
        let array = resolve(doc, &value)?.as_array().ok()?;
        if array.len() != 4 {
            return None;
        }

        let mut rect = [0.0; 4];
        for (slot, item) in rect.iter_mut().zip(array) {
            *slot = number(resolve(doc, item)?)?;
        }
        Some(rect)
    }

    /// The page's `Resources` dictionary, following inheritance and
    /// indirect references.
    pub fn resources(&self, doc: &Document, page_id: ObjectId) -> Option<lopdf::Dictionary> {
        let value = inherited_attribute(doc, page_id, b"Resources")?;
        resolve(doc, &value)?.as_dict().ok().cloned()
    }

    /// Copy inherited attributes onto the page itself.
    fn flatten_inherited(&self, doc: &mut Document, page_id: ObjectId) -> Result<()> {
        let page = doc
            .get_dictionary(page_id)
            .map_err(|e| PdfBookError::page_tree(format!("Failed to get page {page_id:?}: {e}")))?;

        if !page
            .get(b"Type")
            .and_then(Object::as_name)
            .is_ok_and(|name| name == b"Page")
        {
            return Err(PdfBookError::page_tree(format!(
                "Object {page_id:?} is not a page"
            )));
        }

        let inherited: Vec<(&[u8], Object)> = INHERITABLE
            .iter()
            .filter(|key| !page.has(key))
            .filter_map(|&key| inherited_attribute(doc, page_id, key).map(|value| (key, value)))
            .collect();

        if inherited.is_empty() {
            return Ok(());
        }

        let page = doc
            .get_dictionary_mut(page_id)
            .map_err(|e| PdfBookError::page_tree(format!("Failed to get page {page_id:?}: {e}")))?;
        for (key, value) in inherited {
            page.set(key, value);
        }

        Ok(())
    }

    /// Update the page tree to contain only specified pages.
    fn update_page_tree(
        &self,
        doc: &mut Document,
        root: ObjectId,
        page_ids: &[ObjectId],
    ) -> Result<()> {
        let pages_obj = doc
            .get_object_mut(root)
            .map_err(|e| PdfBookError::page_tree(format!("Failed to get pages object: {e}")))?;

        if let Object::Dictionary(dict) = pages_obj {
            let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();

            dict.set("Kids", Object::Array(kids));
            dict.set("Count", Object::Integer(page_ids.len() as i64));
        } else {
            return Err(PdfBookError::page_tree("Pages object is not a dictionary"));
        }

        Ok(())
    }
}

/// Look `key` up on the page, then on each ancestor.
fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Follow one level of indirection.
pub(crate) fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
