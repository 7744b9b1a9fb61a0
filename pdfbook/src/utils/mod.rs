//! Small helpers shared across modules.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Format file size as human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}

/// Sibling path used while `path` is being written.
///
/// The suffix is appended to the full file name, so distinct targets never
/// share a temp file.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Version string from the `%PDF-` header of `bytes`, if there is one.
///
/// Readers tolerate a little junk before the header, so the first kilobyte
/// is searched.
pub fn pdf_header_version(bytes: &[u8]) -> Option<String> {
    const MARKER: &[u8] = b"%PDF-";
    let window = &bytes[..bytes.len().min(1024)];
    let start = window.windows(MARKER.len()).position(|w| w == MARKER)? + MARKER.len();

    let version: String = window[start..]
        .iter()
        .take_while(|b| b.is_ascii_digit() || **b == b'.')
        .map(|&b| b as char)
        .collect();

    (!version.is_empty()).then_some(version)
}
