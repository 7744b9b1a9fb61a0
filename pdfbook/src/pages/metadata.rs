//! PDF metadata management.
//!
//! Every document pdfbook writes is stamped in its Info dictionary:
//! - Creator, Producer
//! - Creation and modification dates
//! - An optional Title

use chrono::{DateTime, Utc};
use lopdf::{Dictionary, Document, Object, StringFormat};

use crate::error::{PdfBookError, Result};

/// Value written to `Creator` and `Producer`.
pub const PRODUCER: &str = "pdfbook";

/// Byte order mark of a UTF-16BE text string.
const UTF16_BOM: [u8; 2] = [0xFE, 0xFF];

/// Byte order mark of a UTF-8 text string (PDF 2.0).
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Manager for PDF metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataManager;

impl MetadataManager {
    /// Create a new metadata manager.
    pub fn new() -> Self {
        Self
    }

    /// Stamp `doc` as produced by pdfbook.
    ///
    /// Sets `Creator`, `Producer` and `ModDate`, adds `CreationDate` when the
    /// source had none, and replaces `Title` when one is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the Info dictionary cannot be created.
    pub fn stamp(&self, doc: &mut Document, title: Option<&str>) -> Result<()> {
        let info_dict = Self::info_dict_mut(doc)?;

        if let Some(title) = title {
            info_dict.set("Title", text_string(title));
        }

        info_dict.set("Creator", text_string(PRODUCER));
        info_dict.set("Producer", text_string(PRODUCER));

        let date_str = format_pdf_date(Utc::now());
        if !info_dict.has(b"CreationDate") {
            info_dict.set("CreationDate", text_string(&date_str));
        }
        info_dict.set("ModDate", text_string(&date_str));

        Ok(())
    }

    /// Read the document title, if any.
    pub fn title(&self, doc: &Document) -> Option<String> {
        self.field(doc, b"Title")
    }

    /// Read a text string field of the Info dictionary.
    pub fn field(&self, doc: &Document, key: &[u8]) -> Option<String> {
        let info_ref = doc.trailer.get(b"Info").and_then(Object::as_reference).ok()?;
        let info_dict = doc.get_dictionary(info_ref).ok()?;

        match info_dict.get(key).ok()? {
            Object::String(bytes, _) => Some(decode_text_string(bytes)),
            _ => None,
        }
    }

    /// Get or create the Info dictionary.
    fn info_dict_mut(doc: &mut Document) -> Result<&mut Dictionary> {
        let info_id = match doc.trailer.get(b"Info").and_then(Object::as_reference) {
            Ok(id) => id,
            Err(_) => {
                let id = doc.new_object_id();
                doc.trailer.set("Info", Object::Reference(id));
                id
            }
        };

        if doc.get_dictionary(info_id).is_err() {
            doc.objects
                .insert(info_id, Object::Dictionary(Dictionary::new()));
        }

        doc.get_dictionary_mut(info_id)
            .map_err(|e| PdfBookError::other(format!("Failed to create Info dictionary: {e}")))
    }
}

/// Encode `text` as a PDF text string.
///
/// ASCII is stored as is; anything else as UTF-16BE behind a byte order mark.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }

    let bytes = UTF16_BOM
        .into_iter()
        .chain(text.encode_utf16().flat_map(u16::to_be_bytes))
        .collect();
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Decode a PDF text string: UTF-16BE or UTF-8 behind their byte order
/// marks, PDFDocEncoding otherwise.
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&UTF16_BOM) {
        let units = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
        return char::decode_utf16(units)
            .map(|unit| unit.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
    }

    if let Some(utf8) = bytes.strip_prefix(&UTF8_BOM) {
        return String::from_utf8_lossy(utf8).into_owned();
    }

    bytes.iter().map(|&byte| pdf_doc_char(byte)).collect()
}

/// PDFDocEncoding agrees with Latin-1 outside these ranges.
fn pdf_doc_char(byte: u8) -> char {
    const LOW: [char; 8] = [
        '\u{02D8}', '\u{02C7}', '\u{02C6}', '\u{02D9}', '\u{02DD}', '\u{02DB}', '\u{02DA}',
        '\u{02DC}',
    ];
    const HIGH: [char; 33] = [
        '\u{2022}', '\u{2020}', '\u{2021}', '\u{2026}', '\u{2014}', '\u{2013}', '\u{0192}',
        '\u{2044}', '\u{2039}', '\u{203A}', '\u{2212}', '\u{2030}', '\u{201E}', '\u{201C}',
        '\u{201D}', '\u{2018}', '\u{2019}', '\u{201A}', '\u{2122}', '\u{FB01}', '\u{FB02}',
        '\u{0141}', '\u{0152}', '\u{0160}', '\u{0178}', '\u{017D}', '\u{0131}', '\u{0142}',
        '\u{0153}', '\u{0161}', '\u{017E}', '\u{FFFD}', '\u{20AC}',
    ];

    match byte {
        0x18..=0x1F => LOW[usize::from(byte - 0x18)],
        0x80..=0xA0 => HIGH[usize::from(byte - 0x80)],
        _ => char::from(byte),
    }
}

/// Format a timestamp as a PDF date string (UTC).
fn format_pdf_date(time: DateTime<Utc>) -> String {
    time.format("D:%Y%m%d%H%M%SZ").to_string()
}
