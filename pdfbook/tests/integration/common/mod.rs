//! Shared helpers for the integration tests.
//!
//! Test PDFs are generated on the fly: page `n` of a labelled document
//! draws the text `Pn`, so tests can read page order back from the output.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use pdfbook::config::{OutputOptions, OverwriteMode};
use std::path::{Path, PathBuf};

/// Letter-sized labelled document with an inherited font resource.
pub fn labelled_pdf(pages: usize) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let kids: Vec<Object> = (1..=pages)
        .map(|n| {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(format!("P{n}"))]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().unwrap(),
            ));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        }
        .into(),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Labelled document with one bookmark per page, titled like the page.
pub fn bookmarked_pdf(pages: usize) -> Document {
    let mut doc = labelled_pdf(pages);
    let page_ids: Vec<_> = doc.get_pages().into_values().collect();
    let outlines_id = doc.new_object_id();
    let items: Vec<_> = page_ids.iter().map(|_| doc.new_object_id()).collect();

    for (index, (&item, &page)) in items.iter().zip(&page_ids).enumerate() {
        let mut entry = dictionary! {
            "Title" => Object::string_literal(format!("P{}", index + 1)),
            "Parent" => outlines_id,
            "Dest" => vec![page.into(), "Fit".into()],
        };
        if index > 0 {
            entry.set("Prev", items[index - 1]);
        }
        if let Some(&next) = items.get(index + 1) {
            entry.set("Next", next);
        }
        doc.objects.insert(item, entry.into());
    }

    let mut outlines = dictionary! {
        "Type" => "Outlines",
        "Count" => items.len() as i64,
    };
    if let (Some(&first), Some(&last)) = (items.first(), items.last()) {
        outlines.set("First", first);
        outlines.set("Last", last);
    }
    doc.objects.insert(outlines_id, outlines.into());
    doc.catalog_mut().unwrap().set("Outlines", outlines_id);
    doc
}

/// Number of `/Type /Page` objects stored in the PDF at `path`, whether or
/// not the page tree lists them.
pub fn page_object_count(path: &Path) -> usize {
    Document::load(path)
        .unwrap()
        .objects
        .values()
        .filter_map(|object| object.as_dict().ok())
        .filter(|dict| {
            dict.get(b"Type")
                .and_then(Object::as_name)
                .is_ok_and(|name| name == b"Page")
        })
        .count()
}

/// Write a labelled document of `pages` pages to `dir/name`.
pub fn write_labelled_pdf(dir: &Path, name: &str, pages: usize) -> PathBuf {
    let path = dir.join(name);
    labelled_pdf(pages).save(&path).unwrap();
    path
}

/// Text shown on each page of the PDF at `path`, in page order.
///
/// Padding pages read as `Pn-blank`, pages without text as an empty string.
pub fn page_labels(path: &Path) -> Vec<String> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let operations = Content::decode(&doc.get_page_content(page_id).unwrap())
                .map(|content| content.operations)
                .unwrap_or_default();
            let text = operations
                .iter()
                .filter(|op| op.operator == "Tj")
                .filter_map(|op| match op.operands.first() {
                    Some(Object::String(bytes, _)) => {
                        Some(String::from_utf8_lossy(bytes).into_owned())
                    }
                    _ => None,
                })
                .collect::<String>();

            match text.strip_prefix("Blank page - Page ") {
                Some(number) => format!("P{number}-blank"),
                None => text,
            }
        })
        .collect()
}

/// Number of pages in the PDF at `path`.
pub fn page_count(path: &Path) -> usize {
    Document::load(path).unwrap().get_pages().len()
}

/// Output options that never prompt and print nothing.
pub fn quiet_options(overwrite_mode: OverwriteMode) -> OutputOptions {
    OutputOptions {
        quiet: true,
        overwrite_mode,
        ..OutputOptions::default()
    }
}
