//! Archive packaging: encode each crop and bundle them into one ZIP.
//!
//! Crops are encoded as JPEG at the configured quality and stored
//! (deflated) under [`artwork_entry_name`](crate::naming::artwork_entry_name),
//! numbered from 1 in acceptance order. A scan with no accepted regions gets
//! no archive at all rather than an empty one.

use crate::extract::{AcceptedRegion, CroppedArtwork};
use crate::imaging::{BackendError, ImageBackend, Quality};
use crate::naming::{artwork_entry_name, preview_label};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Duplicate archive entry: {0}")]
    DuplicateEntry(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// One artwork, encoded and named, ready for the archive or a preview.
#[derive(Debug, Clone)]
pub struct EncodedArtwork {
    /// 1-based position in acceptance order.
    pub sequence: usize,
    pub entry_name: String,
    pub label: String,
    pub region: AcceptedRegion,
    pub jpeg: Vec<u8>,
}

/// Encode crops in order, assigning sequence numbers from 1.
pub fn encode_artworks(
    backend: &impl ImageBackend,
    crops: Vec<CroppedArtwork>,
    source_name: &str,
    quality: Quality,
) -> Result<Vec<EncodedArtwork>, ArchiveError> {
    crops
        .into_iter()
        .enumerate()
        .map(|(i, crop)| {
            let sequence = i + 1;
            Ok(EncodedArtwork {
                sequence,
                entry_name: artwork_entry_name(source_name, sequence),
                label: preview_label(sequence),
                region: crop.region,
                jpeg: backend.encode_jpeg(&crop.image, quality)?,
            })
        })
        .collect()
}

/// Write `artworks` into an in-memory ZIP.
///
/// Returns `Ok(None)` for an empty slice. Entry names must be distinct.
pub fn build_archive(artworks: &[EncodedArtwork]) -> Result<Option<Vec<u8>>, ArchiveError> {
    if artworks.is_empty() {
        return Ok(None);
    }

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let mut seen = HashSet::with_capacity(artworks.len());

    for artwork in artworks {
        if !seen.insert(artwork.entry_name.as_str()) {
            return Err(ArchiveError::DuplicateEntry(artwork.entry_name.clone()));
        }
        zip.start_file(artwork.entry_name.as_str(), options)?;
        zip.write_all(&artwork.jpeg)?;
    }

    Ok(Some(zip.finish()?.into_inner()))
}
