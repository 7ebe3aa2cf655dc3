//! # art-crop
//!
//! Extracts individual artwork photographs from scanned contact sheets.
//! A contact sheet is a scan of several artworks laid out on a light
//! background, each with a printed label underneath. art-crop finds each
//! artwork, cuts it out together with its label strip, and packages the
//! crops into one ZIP per scan.
//!
//! # Architecture: One Pure Pipeline Per Scan
//!
//! ```text
//! 1. Guard     bytes     →  RgbImage          (probe header, refuse or shrink oversized scans)
//! 2. Detect    RgbImage  →  CandidateRegion[] (threshold + external contours)
//! 3. Classify  regions   →  accepted regions  (area, aspect ratio, size floor)
//! 4. Extract   regions   →  CroppedArtwork[]  (label-extended, clamped windows)
//! 5. Package   crops     →  ZIP + previews    (JPEG entries, deterministic names)
//! ```
//!
//! [`pipeline::process_image`] runs all five stages as a plain function of
//! `(bytes, source name, config)` and returns a typed result. No state is
//! shared between calls, so [`batch`] can run one scan per rayon worker with
//! nothing more than a result collection.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`guard`] | Input guard: pixel ceiling, reject/downsample policy, fit-to-bound |
//! | [`detect`] | Binary mask and external-contour region detection |
//! | [`classify`] | Pure accept/reject predicate over candidate regions |
//! | [`extract`] | Label-extended crop windows and owned pixel copies |
//! | [`archive`] | JPEG encoding and ZIP packaging |
//! | [`naming`] | Archive entry, archive file, and preview label names |
//! | [`pipeline`] | The per-scan pipeline and its error taxonomy |
//! | [`batch`] | Many scans: directory walking, bounded parallelism, progress events |
//! | [`captions`] | Slide-deck picture/caption pairing and deck layout |
//! | [`config`] | `art-crop.toml` loading, layering over stock defaults, validation |
//! | [`imaging`] | Codec backend trait, `image`-crate backend, pure dimension math |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Probe Before Decode
//!
//! A 144 MP scan decodes to over 400 MB of RGB. The guard reads dimensions
//! from the encoded header first, so a scan that is going to be refused never
//! allocates its pixel buffer.
//!
//! ## Empty Is Not an Error
//!
//! A scan where nothing passes the classifier returns successfully with zero
//! artworks and no archive. Callers show "no artworks found", not a failure.
//!
//! ## Configuration Points, Not Constants
//!
//! The pixel ceiling, the oversize policy, the classifier thresholds, and the
//! JPEG qualities all live in [`config::PipelineConfig`] with documented
//! defaults, so deployments that need a 100 MP ceiling or downsampling
//! instead of rejection change a TOML key rather than the code.

pub mod archive;
pub mod batch;
pub mod captions;
pub mod classify;
pub mod config;
pub mod detect;
pub mod extract;
pub mod guard;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod pipeline;

pub use pipeline::{PipelineError, PipelineOutput, Preview, process_image};

#[cfg(test)]
pub(crate) mod test_helpers;
