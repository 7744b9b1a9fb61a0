//! Four-up imposition.
//!
//! Each output sheet is an A4 page split into quadrants, filled in the
//! order top-left, top-right, bottom-left, bottom-right. When imposing the
//! two halves of a split booklet, two consecutive
//! pages of the first half fill the top row and the same two positions of
//! the second half fill the bottom row:
//!
//! ```text
//! +-----------+-------------+
//! | first[i]  | first[i+1]  |
//! +-----------+-------------+
//! | second[i] | second[i+1] |
//! +-----------+-------------+
//! ```
//!
//! Source pages are wrapped as Form XObjects and scaled to fill their
//! quadrant.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};
use tokio::task;

use crate::config::ImposeConfig;
use crate::error::{PdfBookError, Result};
use crate::io::{PdfReader, PdfWriter, WriteStatistics};
use crate::pages::{MetadataManager, PageExtractor, PageSize};
use crate::validation::Validator;

/// Statistics about an imposition.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImposeStatistics {
    /// Pages in each half.
    pub pages_per_half: usize,

    /// Sheets in the imposed document.
    pub sheets: usize,

    /// Time taken to build the sheets.
    pub impose_time: Duration,

    /// Written file. `None` on a dry run.
    pub output: Option<WriteStatistics>,
}

/// Places pages four to a sheet.
#[derive(Debug, Clone)]
pub struct Imposer {
    sheet: PageSize,
    page_extractor: PageExtractor,
}

impl Imposer {
    /// Create an imposer producing A4 sheets.
    pub fn new() -> Self {
        Self::with_sheet_size(PageSize::A4)
    }

    /// Create an imposer producing sheets of `sheet` size.
    pub fn with_sheet_size(sheet: PageSize) -> Self {
        Self {
            sheet,
            page_extractor: PageExtractor::new(),
        }
    }

    /// Number of sheets needed for halves of `pages` pages each.
    pub fn sheet_count(pages: usize) -> usize {
        pages.div_ceil(2)
    }

    /// Build the imposed document.
    ///
    /// Neither input is modified.
    ///
    /// # Errors
    ///
    /// Returns [`PdfBookError::PageCountMismatch`] if the halves differ in
    /// length, or a page tree error if either page tree is unreadable.
    pub fn impose(&self, first: &Document, second: &Document) -> Result<Document> {
        let first_count = self.page_extractor.page_count(first);
        let second_count = self.page_extractor.page_count(second);
        if first_count != second_count {
            return Err(PdfBookError::PageCountMismatch {
                first: first_count,
                second: second_count,
            });
        }

        let mut doc = first.clone();
        let top = self.page_extractor.page_ids(&doc);

        let mut other = second.clone();
        other.renumber_objects_with(doc.max_id + 1);
        let bottom = self.page_extractor.page_ids(&other);
        doc.max_id = doc.max_id.max(other.max_id);
        doc.objects.extend(other.objects);

        let top_forms = self.wrap_pages(&mut doc, &top)?;
        let bottom_forms = self.wrap_pages(&mut doc, &bottom)?;

        let slots: Vec<Option<Form>> = (0..first_count)
            .step_by(2)
            .flat_map(|i| {
                [
                    top_forms.get(i).copied(),
                    top_forms.get(i + 1).copied(),
                    bottom_forms.get(i).copied(),
                    bottom_forms.get(i + 1).copied(),
                ]
            })
            .collect();
        let sheet_count = self.lay_out(&mut doc, &slots)?;

        log::debug!("Imposed {first_count} + {second_count} pages on {sheet_count} sheets");
        Ok(doc)
    }

    /// Build sheets from pages of `source` given in quadrant order.
    ///
    /// Every four consecutive slots fill one sheet (top-left, top-right,
    /// bottom-left, bottom-right); `None` leaves its quadrant empty. A page
    /// may appear in several slots. `source` is not modified.
    ///
    /// # Errors
    ///
    /// Returns an error if a slot names an object that is not a readable
    /// page.
    pub fn impose_sequence(
        &self,
        source: &Document,
        slots: &[Option<ObjectId>],
    ) -> Result<Document> {
        let mut doc = source.clone();

        let pages: Vec<ObjectId> = slots
            .iter()
            .flatten()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let forms: BTreeMap<ObjectId, Form> = pages
            .iter()
            .copied()
            .zip(self.wrap_pages(&mut doc, &pages)?)
            .collect();

        let slots: Vec<Option<Form>> = slots
            .iter()
            .map(|slot| slot.and_then(|page| forms.get(&page).copied()))
            .collect();
        let sheet_count = self.lay_out(&mut doc, &slots)?;

        log::debug!("Imposed {} pages on {sheet_count} sheets", pages.len());
        Ok(doc)
    }

    /// Replace the page tree of `doc` with sheets built from `slots`, four
    /// per sheet, and return the number of sheets.
    fn lay_out(&self, doc: &mut Document, slots: &[Option<Form>]) -> Result<usize> {
        let pages_id = doc.new_object_id();
        let mut sheets = Vec::with_capacity(slots.len().div_ceil(4));
        for quadrants in slots.chunks(4) {
            let mut sheet = [None; 4];
            for (slot, form) in sheet.iter_mut().zip(quadrants) {
                *slot = *form;
            }
            let sheet_id = self.add_sheet(doc, pages_id, sheet)?;
            sheets.push(Object::Reference(sheet_id));
        }

        let sheet_count = sheets.len();
        doc.objects.insert(
            pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => sheets,
                "Count" => sheet_count as i64,
            }
            .into(),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        doc.prune_objects();
        doc.renumber_objects();

        Ok(sheet_count)
    }

    /// Wrap every page in a Form XObject and return the form ids with
    /// their bounding boxes.
    fn wrap_pages(&self, doc: &mut Document, pages: &[ObjectId]) -> Result<Vec<Form>> {
        pages
            .iter()
            .map(|&page_id| -> Result<Form> {
                let bbox = self
                    .page_extractor
                    .media_box(doc, page_id)
                    .filter(|[x0, y0, x1, y1]| x1 > x0 && y1 > y0)
                    .unwrap_or([0.0, 0.0, PageSize::A4.width, PageSize::A4.height]);
                let resources = self
                    .page_extractor
                    .resources(doc, page_id)
                    .unwrap_or_default();
                let content = doc.get_page_content(page_id)?;

                let form = Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Form",
                        "FormType" => 1,
                        "BBox" => bbox.iter().map(|&v| Object::Real(v)).collect::<Vec<_>>(),
                        "Resources" => resources,
                    },
                    content,
                );

                Ok(Form {
                    id: doc.add_object(form),
                    bbox,
                })
            })
            .collect()
    }

    /// Add one sheet drawing up to four forms, in quadrant order.
    fn add_sheet(
        &self,
        doc: &mut Document,
        parent: ObjectId,
        slots: [Option<Form>; 4],
    ) -> Result<ObjectId> {
        let half_width = self.sheet.width / 2.0;
        let half_height = self.sheet.height / 2.0;
        let origins = [
            (0.0, half_height),
            (half_width, half_height),
            (0.0, 0.0),
            (half_width, 0.0),
        ];

        let mut operations = Vec::new();
        let mut xobjects = Dictionary::new();
        for (index, (slot, (qx, qy))) in slots.into_iter().zip(origins).enumerate() {
            let Some(form) = slot else {
                continue;
            };

            let name = format!("Pg{index}");
            let [x0, y0, x1, y1] = form.bbox;
            let sx = half_width / (x1 - x0);
            let sy = half_height / (y1 - y0);

            operations.push(Operation::new("q", vec![]));
            operations.push(Operation::new(
                "cm",
                vec![
                    Object::Real(sx),
                    0.into(),
                    0.into(),
                    Object::Real(sy),
                    Object::Real(qx - x0 * sx),
                    Object::Real(qy - y0 * sy),
                ],
            ));
            operations.push(Operation::new("Do", vec![Object::Name(name.clone().into_bytes())]));
            operations.push(Operation::new("Q", vec![]));

            xobjects.set(name, form.id);
        }

        let content = Content { operations }.encode()?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));

        Ok(doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => parent,
            "MediaBox" => self.sheet.media_box(),
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => xobjects,
            },
        }))
    }
}

impl Default for Imposer {
    fn default() -> Self {
        Self::new()
    }
}

/// A page wrapped as a Form XObject.
#[derive(Debug, Clone, Copy)]
struct Form {
    id: ObjectId,
    bbox: [f32; 4],
}

/// Impose the two halves named by `config` and write the result.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, either half cannot be
/// loaded, the halves differ in length or the output cannot be written.
pub async fn impose_pdfs(config: &ImposeConfig) -> Result<ImposeStatistics> {
    config
        .validate()
        .map_err(|e| PdfBookError::invalid_config(e.to_string()))?;

    Validator::new()
        .validate_outputs(
            &[config.first.as_path(), config.second.as_path()],
            &[config.destination.as_path()],
            config.output.overwrite_mode,
        )
        .await?;

    let (first, second) = PdfReader::new()
        .load_pair(&config.first, &config.second)
        .await?;

    let (document, mut statistics) = task::spawn_blocking(move || {
        let start = Instant::now();
        let mut document = Imposer::new().impose(&first.document, &second.document)?;
        MetadataManager::new().stamp(&mut document, None)?;

        let statistics = ImposeStatistics {
            pages_per_half: first.page_count,
            sheets: Imposer::sheet_count(first.page_count),
            impose_time: start.elapsed(),
            output: None,
        };
        Ok::<_, PdfBookError>((document, statistics))
    })
    .await
    .map_err(|e| PdfBookError::other(format!("Impose task failed: {e}")))??;

    if !config.output.dry_run {
        let writer = PdfWriter::with_compression(config.output.compression);
        statistics.output = Some(writer.save_with_stats(&document, &config.destination).await?);
    }

    Ok(statistics)
}
