//! The per-scan pipeline: guard → detect → classify → extract → package.
//!
//! [`process_image`] is a plain function of its inputs. It owns every buffer
//! it creates, shares nothing with other invocations, and either returns a
//! [`PipelineOutput`] or a typed [`PipelineError`]. Finding zero artworks is
//! a successful outcome (`accepted_count() == 0`, no archive), not an error.
//!
//! ```text
//! bytes ──probe──▶ guard ──decode/shrink──▶ RgbImage
//!                                              │
//!                         detect (threshold + external contours)
//!                                              │
//!                         classify (area, aspect, size floor)
//!                                              │
//!                         extract (label-extended, clamped crops)
//!                                              │
//!                         encode JPEG + ZIP ──▶ PipelineOutput
//! ```

use crate::archive::{ArchiveError, EncodedArtwork, build_archive, encode_artworks};
use crate::classify::accepted_regions;
use crate::config::PipelineConfig;
use crate::detect::detect_regions;
use crate::extract::{ExtractError, extract_all};
use crate::guard::{GuardError, admit};
use crate::imaging::{BackendError, Dimensions, ImageBackend, RustBackend};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("image is {width}x{height} ({pixel_count} pixels), above the {max_pixels} pixel ceiling")]
    ResourceExceeded {
        width: u32,
        height: u32,
        pixel_count: u64,
        max_pixels: u64,
    },
    #[error("could not decode image: {reason}")]
    DecodeFailure { reason: String },
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractError),
    #[error("packaging failed: {0}")]
    Archive(#[from] ArchiveError),
}

impl From<GuardError> for PipelineError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::ResourceExceeded {
                width,
                height,
                pixel_count,
                max_pixels,
            } => PipelineError::ResourceExceeded {
                width,
                height,
                pixel_count,
                max_pixels,
            },
            GuardError::Backend(e) => e.into(),
        }
    }
}

impl From<BackendError> for PipelineError {
    fn from(err: BackendError) -> Self {
        PipelineError::DecodeFailure {
            reason: err.to_string(),
        }
    }
}

/// Everything one scan produced.
#[derive(Debug)]
pub struct PipelineOutput {
    /// ZIP of all crops; `None` when nothing was accepted.
    pub archive: Option<Vec<u8>>,
    /// Encoded crops in acceptance order.
    pub artworks: Vec<EncodedArtwork>,
    /// Header dimensions of the scan as received.
    pub source_dimensions: Dimensions,
    /// True when the guard shrank the scan under the oversize policy.
    pub downsampled: bool,
    /// Regions traced before classification.
    pub candidate_count: usize,
}

/// A borrowed preview: encoded crop plus its `"Artwork {n}"` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preview<'a> {
    pub label: &'a str,
    pub jpeg: &'a [u8],
}

impl PipelineOutput {
    pub fn accepted_count(&self) -> usize {
        self.artworks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artworks.is_empty()
    }

    /// The first `limit` previews (all when `None`), without copying.
    pub fn previews(&self, limit: Option<usize>) -> impl Iterator<Item = Preview<'_>> {
        self.artworks
            .iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|a| Preview {
                label: &a.label,
                jpeg: &a.jpeg,
            })
    }
}

/// Run the pipeline on one encoded scan with the production backend.
pub fn process_image(
    bytes: &[u8],
    source_name: &str,
    config: &PipelineConfig,
) -> Result<PipelineOutput, PipelineError> {
    process_with_backend(&RustBackend::new(), bytes, source_name, config)
}

/// Run the pipeline using a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    bytes: &[u8],
    source_name: &str,
    config: &PipelineConfig,
) -> Result<PipelineOutput, PipelineError> {
    let admitted = admit(backend, bytes, &config.guard)?;

    let candidates = detect_regions(&admitted.image, &config.detection);
    let candidate_count = candidates.len();
    let accepted = accepted_regions(candidates, &config.classifier);
    tracing::debug!(
        source = source_name,
        candidates = candidate_count,
        accepted = accepted.len(),
        "classified regions"
    );

    let crops = extract_all(
        &admitted.image,
        &accepted,
        config.extraction.label_extension,
    )?;
    drop(admitted.image);

    let quality = config.output.quality_for(admitted.downsampled);
    let artworks = encode_artworks(backend, crops, source_name, quality)?;
    let archive = build_archive(&artworks)?;

    Ok(PipelineOutput {
        archive,
        artworks,
        source_dimensions: admitted.original,
        downsampled: admitted.downsampled,
        candidate_count,
    })
}
