//! Document-level references to pages.
//!
//! Outlines, named destinations, link annotations, form fields, article
//! threads and the structure tree all point at page objects. When a document
//! is cut down to some of its pages, every entry aimed at a removed page has
//! to go as well, otherwise the removed page stays reachable and is written
//! out with everything it draws.

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat, dictionary};
use std::collections::BTreeSet;

use crate::error::Result;
use crate::pages::extractor::resolve;

/// Guard against cyclic references in malformed files.
const MAX_DEPTH: usize = 64;

/// Remove navigation entries of `doc` that lead to pages not in `kept`.
///
/// Outline items aimed at removed pages are unlinked (or lose their target
/// when they still have surviving children). Named destinations, link
/// annotations and form fields on removed pages are dropped. The structure
/// tree, article threads and page labels no longer describe the remaining
/// pages and are removed outright.
///
/// Does nothing when every page of `doc` is kept.
pub fn prune_navigation(doc: &mut Document, kept: &[ObjectId]) -> Result<()> {
    let kept_set: BTreeSet<ObjectId> = kept.iter().copied().collect();
    let dropped: BTreeSet<ObjectId> = doc
        .get_pages()
        .into_values()
        .filter(|id| !kept_set.contains(id))
        .collect();

    if dropped.is_empty() {
        return Ok(());
    }

    let plan = Pruner::new(doc, &dropped).plan(kept);
    log::debug!(
        "Pruning navigation for {} removed pages: {} outline items kept",
        dropped.len(),
        plan.outline.as_ref().map_or(0, |outline| outline.items.len())
    );
    plan.apply(doc)
}

/// Read-only pass that works out which entries survive.
struct Pruner<'a> {
    doc: &'a Document,
    dropped: &'a BTreeSet<ObjectId>,
    dropped_annotations: BTreeSet<ObjectId>,
}

impl<'a> Pruner<'a> {
    fn new(doc: &'a Document, dropped: &'a BTreeSet<ObjectId>) -> Self {
        let dropped_annotations = dropped
            .iter()
            .flat_map(|&page| annotations(doc, page))
            .filter_map(|annotation| annotation.as_reference().ok())
            .collect();

        Self {
            doc,
            dropped,
            dropped_annotations,
        }
    }

    fn plan(&self, kept: &[ObjectId]) -> Plan {
        let catalog = self.doc.catalog().ok();
        let has = |key: &[u8]| catalog.is_some_and(|catalog| catalog.has(key));

        let mut field_kids = Vec::new();
        let acro_form = self.acro_form(&mut field_kids);

        Plan {
            outline: self.outline(),
            drop_outline: has(b"Outlines"),
            dests: self.dests(),
            names: self.names(),
            drop_open_action: catalog
                .and_then(|catalog| catalog.get(b"OpenAction").ok())
                .is_some_and(|action| self.leads_out(action)),
            acro_form,
            field_kids,
            annotations: kept
                .iter()
                .filter_map(|&page| self.page_annotations(page).map(|annots| (page, annots)))
                .collect(),
            drop_threads: has(b"Threads"),
            kept: kept.to_vec(),
        }
    }

    /// Page a destination or `GoTo` action lands on.
    fn target(&self, object: &Object, depth: usize) -> Option<ObjectId> {
        if depth > MAX_DEPTH {
            return None;
        }

        match object {
            Object::Array(items) => items.first()?.as_reference().ok(),
            Object::Reference(id) => self.target(self.doc.get_object(*id).ok()?, depth + 1),
            Object::Dictionary(dict) => self.dict_target(dict, depth + 1),
            Object::Name(name) => {
                let dests = catalog_dict(self.doc, b"Dests")?;
                self.target(dests.get(name).ok()?, depth + 1)
            }
            Object::String(key, _) => {
                let (_, dest) = named_dests(self.doc)
                    .into_iter()
                    .find(|(name, _)| name == key)?;
                self.target(&dest, depth + 1)
            }
            _ => None,
        }
    }

    /// Target of an outline item, annotation or destination dictionary,
    /// through its `Dest`, `D` or `GoTo` action entry.
    fn dict_target(&self, dict: &Dictionary, depth: usize) -> Option<ObjectId> {
        if let Ok(dest) = dict.get(b"Dest").or_else(|_| dict.get(b"D")) {
            return self.target(dest, depth + 1);
        }
        let action = resolve(self.doc, dict.get(b"A").ok()?)?.as_dict().ok()?;
        if action.get(b"S").and_then(Object::as_name).ok()? != b"GoTo" {
            return None;
        }
        self.target(action.get(b"D").ok()?, depth + 1)
    }

    fn leads_out(&self, object: &Object) -> bool {
        self.target(object, 0)
            .is_some_and(|page| self.dropped.contains(&page))
    }

    fn outline(&self) -> Option<OutlinePlan> {
        let root = self
            .doc
            .catalog()
            .ok()?
            .get(b"Outlines")
            .ok()?
            .as_reference()
            .ok()?;
        let first = first_child(self.doc, root);

        let mut seen = BTreeSet::new();
        let items = self.outline_items(first, &mut seen, 0);
        Some(OutlinePlan { root, items })
    }

    fn outline_items(
        &self,
        first: Option<ObjectId>,
        seen: &mut BTreeSet<ObjectId>,
        depth: usize,
    ) -> Vec<OutlineItem> {
        let mut items = Vec::new();
        if depth > MAX_DEPTH {
            return items;
        }

        let mut next = first;
        while let Some(id) = next {
            if !seen.insert(id) {
                break;
            }
            let Ok(dict) = self.doc.get_dictionary(id) else {
                break;
            };

            let children = self.outline_items(first_child(self.doc, id), seen, depth + 1);
            let leads_out = self
                .dict_target(dict, 0)
                .is_some_and(|page| self.dropped.contains(&page));
            if !leads_out || !children.is_empty() {
                items.push(OutlineItem {
                    id,
                    children,
                    clear_target: leads_out,
                });
            }

            next = dict.get(b"Next").and_then(Object::as_reference).ok();
        }

        items
    }

    fn dests(&self) -> Option<Dictionary> {
        let dests = catalog_dict(self.doc, b"Dests")?;
        let mut kept = Dictionary::new();
        for (name, dest) in dests.iter() {
            if !self.leads_out(dest) {
                kept.set(name.clone(), dest.clone());
            }
        }
        Some(kept)
    }

    /// The `Names` dictionary with its `Dests` tree flattened into a single
    /// leaf holding the surviving entries. Entries stay in tree order, which
    /// keeps the keys sorted.
    fn names(&self) -> Option<Dictionary> {
        let mut names = catalog_dict(self.doc, b"Names")?.clone();
        if !names.has(b"Dests") {
            return None;
        }

        let entries: Vec<Object> = named_dests(self.doc)
            .into_iter()
            .filter(|(_, dest)| !self.leads_out(dest))
            .flat_map(|(name, dest)| [Object::String(name, StringFormat::Literal), dest])
            .collect();
        names.set("Dests", dictionary! { "Names" => entries });
        Some(names)
    }

    /// Annotations of a kept page, if any of them lead to a removed page.
    fn page_annotations(&self, page: ObjectId) -> Option<Vec<Object>> {
        let all = annotations(self.doc, page);
        let kept: Vec<Object> = all
            .iter()
            .filter(|annotation| {
                resolve(self.doc, annotation)
                    .is_none_or(|object| !self.leads_out(object))
            })
            .cloned()
            .collect();

        (kept.len() != all.len()).then_some(kept)
    }

    fn acro_form(&self, field_kids: &mut Vec<(ObjectId, Vec<Object>)>) -> Option<Dictionary> {
        let mut acro_form = catalog_dict(self.doc, b"AcroForm")?.clone();

        for key in [b"Fields".as_slice(), b"CO".as_slice()] {
            let Some(entries) = acro_form
                .get(key)
                .ok()
                .and_then(|entries| resolve(self.doc, entries))
                .and_then(|entries| entries.as_array().ok())
            else {
                continue;
            };

            let kept: Vec<Object> = entries
                .iter()
                .filter(|field| self.keep_field(field, 0, field_kids))
                .cloned()
                .collect();
            acro_form.set(key, kept);
        }

        Some(acro_form)
    }

    /// Whether a form field survives. Fields with children are trimmed to
    /// their surviving kids, and dropped when none survive.
    fn keep_field(
        &self,
        field: &Object,
        depth: usize,
        field_kids: &mut Vec<(ObjectId, Vec<Object>)>,
    ) -> bool {
        let id = field.as_reference().ok();
        if id.is_some_and(|id| self.dropped_annotations.contains(&id)) {
            return false;
        }

        let Some(dict) = resolve(self.doc, field).and_then(|field| field.as_dict().ok()) else {
            return true;
        };
        if dict
            .get(b"P")
            .and_then(Object::as_reference)
            .is_ok_and(|page| self.dropped.contains(&page))
        {
            return false;
        }

        let Ok(kids) = dict.get(b"Kids").and_then(Object::as_array) else {
            return true;
        };
        if depth >= MAX_DEPTH {
            return true;
        }

        let kept: Vec<Object> = kids
            .iter()
            .filter(|kid| self.keep_field(kid, depth + 1, field_kids))
            .cloned()
            .collect();
        if kept.is_empty() {
            return false;
        }
        if let Some(id) = id.filter(|_| kept.len() != kids.len()) {
            field_kids.push((id, kept));
        }
        true
    }
}

#[derive(Debug)]
struct OutlineItem {
    id: ObjectId,
    children: Vec<OutlineItem>,
    clear_target: bool,
}

#[derive(Debug)]
struct OutlinePlan {
    root: ObjectId,
    items: Vec<OutlineItem>,
}

/// Edits worked out by [`Pruner`], applied in one go.
#[derive(Debug)]
struct Plan {
    outline: Option<OutlinePlan>,
    drop_outline: bool,
    dests: Option<Dictionary>,
    names: Option<Dictionary>,
    drop_open_action: bool,
    acro_form: Option<Dictionary>,
    field_kids: Vec<(ObjectId, Vec<Object>)>,
    annotations: Vec<(ObjectId, Vec<Object>)>,
    drop_threads: bool,
    kept: Vec<ObjectId>,
}

impl Plan {
    fn apply(self, doc: &mut Document) -> Result<()> {
        let outline_survives = match &self.outline {
            Some(outline) if !outline.items.is_empty() => {
                let count = link_items(doc, outline.root, &outline.items)?;
                let root = doc.get_dictionary_mut(outline.root)?;
                set_children(root, &outline.items, count);
                true
            }
            _ => false,
        };

        for (field, kids) in self.field_kids {
            doc.get_dictionary_mut(field)?.set("Kids", kids);
        }

        for (page, annotations) in self.annotations {
            doc.get_dictionary_mut(page)?.set("Annots", annotations);
        }

        if self.drop_threads {
            for &page in &self.kept {
                doc.get_dictionary_mut(page)?.remove(b"B");
            }
        }

        let catalog = doc.catalog_mut()?;
        if self.drop_outline && !outline_survives {
            catalog.remove(b"Outlines");
        }
        if let Some(dests) = self.dests {
            catalog.set("Dests", dests);
        }
        if let Some(names) = self.names {
            catalog.set("Names", names);
        }
        if let Some(acro_form) = self.acro_form {
            catalog.set("AcroForm", acro_form);
        }
        if self.drop_open_action {
            catalog.remove(b"OpenAction");
        }
        if self.drop_threads {
            catalog.remove(b"Threads");
        }
        catalog.remove(b"StructTreeRoot");
        catalog.remove(b"PageLabels");

        Ok(())
    }
}

/// Relink `items` as the children of `parent` and return how many items the
/// subtree holds.
fn link_items(doc: &mut Document, parent: ObjectId, items: &[OutlineItem]) -> Result<i64> {
    let mut total = 0;

    for (index, item) in items.iter().enumerate() {
        let descendants = link_items(doc, item.id, &item.children)?;
        let dict = doc.get_dictionary_mut(item.id)?;

        dict.set("Parent", parent);
        match index.checked_sub(1).map(|prev| items[prev].id) {
            Some(prev) => dict.set("Prev", prev),
            None => {
                dict.remove(b"Prev");
            }
        }
        match items.get(index + 1) {
            Some(next) => dict.set("Next", next.id),
            None => {
                dict.remove(b"Next");
            }
        }
        if item.clear_target {
            dict.remove(b"Dest");
            dict.remove(b"A");
        }
        set_children(dict, &item.children, descendants);

        total += 1 + descendants;
    }

    Ok(total)
}

/// Point `First`/`Last`/`Count` of an outline node at its new children.
/// Closed items keep a negative count.
fn set_children(dict: &mut Dictionary, children: &[OutlineItem], count: i64) {
    let (Some(first), Some(last)) = (children.first(), children.last()) else {
        dict.remove(b"First");
        dict.remove(b"Last");
        dict.remove(b"Count");
        return;
    };

    let closed = dict
        .get(b"Count")
        .and_then(Object::as_i64)
        .is_ok_and(|count| count < 0);
    dict.set("First", first.id);
    dict.set("Last", last.id);
    dict.set("Count", if closed { -count } else { count });
}

fn first_child(doc: &Document, id: ObjectId) -> Option<ObjectId> {
    doc.get_dictionary(id)
        .ok()?
        .get(b"First")
        .and_then(Object::as_reference)
        .ok()
}

fn catalog_dict<'a>(doc: &'a Document, key: &[u8]) -> Option<&'a Dictionary> {
    let entry = doc.catalog().ok()?.get(key).ok()?;
    resolve(doc, entry)?.as_dict().ok()
}

/// Entries of an annotation array, which may itself be indirect.
fn annotations(doc: &Document, page: ObjectId) -> Vec<Object> {
    doc.get_dictionary(page)
        .ok()
        .and_then(|page| page.get(b"Annots").ok())
        .and_then(|annots| resolve(doc, annots))
        .and_then(|annots| annots.as_array().ok())
        .cloned()
        .unwrap_or_default()
}

/// Every `(name, destination)` pair of the `Dests` name tree, in order.
fn named_dests(doc: &Document) -> Vec<(Vec<u8>, Object)> {
    let mut entries = Vec::new();
    if let Some(tree) = catalog_dict(doc, b"Names").and_then(|names| names.get(b"Dests").ok()) {
        collect_name_tree(doc, tree, 0, &mut entries);
    }
    entries
}

fn collect_name_tree(
    doc: &Document,
    node: &Object,
    depth: usize,
    entries: &mut Vec<(Vec<u8>, Object)>,
) {
    if depth > MAX_DEPTH {
        return;
    }
    let Some(node) = resolve(doc, node).and_then(|node| node.as_dict().ok()) else {
        return;
    };

    if let Ok(names) = node.get(b"Names").and_then(Object::as_array) {
        for pair in names.chunks_exact(2) {
            if let Object::String(name, _) = &pair[0] {
                entries.push((name.clone(), pair[1].clone()));
            }
        }
    }
    if let Ok(kids) = node.get(b"Kids").and_then(Object::as_array) {
        for kid in kids {
            collect_name_tree(doc, kid, depth + 1, entries);
        }
    }
}
