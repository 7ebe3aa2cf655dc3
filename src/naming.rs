//! Centralized naming for everything the pipeline emits.
//!
//! Every name derives from the scan's source name plus a 1-based sequence
//! number assigned in acceptance order, so names are deterministic and
//! distinct within one archive:
//!
//! - `sheet.tif` artwork 3 → `sheet.tif_artwork_3.jpg` (archive entry)
//! - `sheet.tif` → `sheet.tif_cropped_artworks.zip` (archive file)
//! - artwork 3 → `"Artwork 3"` (preview label)
//!
//! The source name is used verbatim, extension included, so two scans that
//! differ only by extension never collide.

use std::path::Path;

/// Archive entry name for the `sequence`-th accepted artwork (1-based).
pub fn artwork_entry_name(source_name: &str, sequence: usize) -> String {
    format!("{source_name}_artwork_{sequence}.jpg")
}

/// File name of the archive written for one scan.
pub fn archive_file_name(source_name: &str) -> String {
    format!("{source_name}_cropped_artworks.zip")
}

/// Caption shown next to the `sequence`-th preview. Matches the entry number.
pub fn preview_label(sequence: usize) -> String {
    format!("Artwork {sequence}")
}

/// The name a scan is known by: its final path component.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
