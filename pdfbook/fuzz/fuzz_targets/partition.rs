#![no_main]

use libfuzzer_sys::fuzz_target;
use pdfbook::split::layout::{padded_len, split};

fuzz_target!(|data: &[u8]| {
    let pages: Vec<u16> = data.iter().map(|&b| u16::from(b)).collect();

    let Ok(partition) = split(&pages, |label| Ok::<_, ()>(1000 + label as u16)) else {
        unreachable!("renderer never fails");
    };

    let padded = padded_len(pages.len());
    assert_eq!(partition.first.len(), padded / 2);
    assert_eq!(partition.second.len(), padded / 2);
    assert_eq!(partition.padding, padded - pages.len());
});
