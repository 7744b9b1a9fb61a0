#![no_main]

use libfuzzer_sys::fuzz_target;
use lopdf::Document;
use pdfbook::append::append_blank_bytes;

// Uploads reach this path unfiltered: it must reject bad input with an
// error, never a panic, and anything it returns must parse again.
fuzz_target!(|data: &[u8]| {
    let Ok(processed) = append_blank_bytes(data) else {
        return;
    };

    let before = Document::load_mem(data).map(|doc| doc.get_pages().len());
    let after = Document::load_mem(&processed)
        .expect("processed upload must be a loadable PDF")
        .get_pages()
        .len();

    if let Ok(before) = before {
        assert_eq!(after, before + 1);
    }
});
