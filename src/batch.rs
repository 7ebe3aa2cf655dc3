//! Batch extraction over many scans.
//!
//! Inputs may be scan files or directories; directories are walked
//! recursively and filtered to supported raster extensions. Each scan runs
//! through [`process_with_backend`] on the rayon pool, so the pool size is
//! the bound on how many decoded scans are in memory at once.
//!
//! Every scan is isolated: a decode failure or an oversized scan becomes a
//! [`FileOutcome::Failed`] for that file and the rest of the batch carries on.
//! Only a failure to create the output directory aborts the run.
//!
//! ## Output
//!
//! ```text
//! out/
//! ├── sheet-01.tif_cropped_artworks.zip
//! └── sheet-02.png_cropped_artworks.zip
//! ```
//!
//! Scans with no artworks produce no file.
//!
//! ## Progress
//!
//! When a [`Sender`] is supplied, a [`BatchEvent`] is sent as each scan
//! finishes (completion order). The returned [`BatchReport`] lists outcomes
//! in input order.

use crate::config::PipelineConfig;
use crate::imaging::{ImageBackend, RustBackend, is_supported_input};
use crate::naming::{archive_file_name, source_name};
use crate::pipeline::{PipelineError, process_with_backend};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("could not create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Per-file failure, flattened to a reason string in [`FileOutcome::Failed`].
#[derive(Error, Debug)]
enum FileError {
    #[error("could not read file: {0}")]
    Read(std::io::Error),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("another input is also named {0}; its archive would be overwritten")]
    DuplicateName(String),
}

/// What happened to one scan.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Extracted {
        name: String,
        artworks: usize,
        candidates: usize,
        downsampled: bool,
        archive: PathBuf,
        /// Preview labels, capped by `output.preview_limit`.
        previews: Vec<String>,
    },
    /// Decoded and searched, but nothing passed the classifier.
    Empty { name: String, candidates: usize },
    Failed { name: String, reason: String },
}

impl FileOutcome {
    pub fn name(&self) -> &str {
        match self {
            FileOutcome::Extracted { name, .. }
            | FileOutcome::Empty { name, .. }
            | FileOutcome::Failed { name, .. } => name,
        }
    }

    pub fn artworks(&self) -> usize {
        match self {
            FileOutcome::Extracted { artworks, .. } => *artworks,
            _ => 0,
        }
    }
}

/// Progress events emitted during a batch run.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started { total: usize, output_dir: PathBuf },
    FileFinished {
        /// 1-based position in input order.
        index: usize,
        total: usize,
        outcome: FileOutcome,
    },
}

/// All outcomes of a batch, in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn total_artworks(&self) -> usize {
        self.outcomes.iter().map(FileOutcome::artworks).sum()
    }

    pub fn extracted(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Extracted { .. }))
    }

    pub fn empty(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Empty { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

// =============================================================================
// Input collection
// =============================================================================

/// Expand `inputs` into the list of scans to process.
///
/// Files are taken as given (their decoder decides whether they are images).
/// Directories contribute every supported file beneath them, sorted by name.
/// Exact duplicate paths are dropped.
pub fn collect_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(
                WalkDir::new(input)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_map(|entry| match entry {
                        Ok(e) => Some(e),
                        Err(err) => {
                            tracing::warn!(error = %err, "skipping unreadable entry");
                            None
                        }
                    })
                    .filter(|e| e.file_type().is_file() && is_supported_input(e.path()))
                    .map(|e| e.into_path()),
            );
        } else {
            files.push(input.clone());
        }
    }

    let mut seen = std::collections::HashSet::new();
    files.retain(|p| seen.insert(p.clone()));
    files
}

// =============================================================================
// Running
// =============================================================================

/// Run the batch with the production backend.
pub fn run_batch(
    inputs: &[PathBuf],
    output_dir: &Path,
    config: &PipelineConfig,
    progress: Option<Sender<BatchEvent>>,
) -> Result<BatchReport, BatchError> {
    run_batch_with_backend(&RustBackend::new(), inputs, output_dir, config, progress)
}

/// Run the batch using a specific backend (allows testing with mock).
pub fn run_batch_with_backend(
    backend: &impl ImageBackend,
    inputs: &[PathBuf],
    output_dir: &Path,
    config: &PipelineConfig,
    progress: Option<Sender<BatchEvent>>,
) -> Result<BatchReport, BatchError> {
    std::fs::create_dir_all(output_dir).map_err(|source| BatchError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let files = collect_inputs(inputs);
    let total = files.len();
    let names = unique_names(&files);

    if let Some(tx) = &progress {
        tx.send(BatchEvent::Started {
            total,
            output_dir: output_dir.to_path_buf(),
        })
        .ok();
    }

    let outcomes: Vec<FileOutcome> = files
        .par_iter()
        .zip(names.par_iter())
        .enumerate()
        .map(|(i, (path, name))| {
            let outcome = match name {
                Ok(name) => process_file(backend, path, name, output_dir, config),
                Err(e) => failed(source_name(path), e),
            };
            if let Some(tx) = &progress {
                tx.send(BatchEvent::FileFinished {
                    index: i + 1,
                    total,
                    outcome: outcome.clone(),
                })
                .ok();
            }
            outcome
        })
        .collect();

    Ok(BatchReport { outcomes })
}

/// Source names for `files`; every input after the first sharing a name is
/// refused so archives never overwrite each other.
fn unique_names(files: &[PathBuf]) -> Vec<Result<String, FileError>> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    files
        .iter()
        .map(|path| {
            let name = source_name(path);
            let seen = counts.entry(name.clone()).or_insert(0);
            *seen += 1;
            if *seen > 1 {
                Err(FileError::DuplicateName(name))
            } else {
                Ok(name)
            }
        })
        .collect()
}

fn process_file(
    backend: &impl ImageBackend,
    path: &Path,
    name: &str,
    output_dir: &Path,
    config: &PipelineConfig,
) -> FileOutcome {
    match extract_file(backend, path, name, output_dir, config) {
        Ok(outcome) => outcome,
        Err(e) => failed(name.to_string(), &e),
    }
}

fn failed(name: String, err: &FileError) -> FileOutcome {
    tracing::warn!(file = %name, error = %err, "scan failed");
    FileOutcome::Failed {
        name,
        reason: err.to_string(),
    }
}

fn extract_file(
    backend: &impl ImageBackend,
    path: &Path,
    name: &str,
    output_dir: &Path,
    config: &PipelineConfig,
) -> Result<FileOutcome, FileError> {
    let bytes = std::fs::read(path).map_err(FileError::Read)?;
    let output = process_with_backend(backend, &bytes, name, config)?;

    let Some(archive) = output.archive.as_deref() else {
        return Ok(FileOutcome::Empty {
            name: name.to_string(),
            candidates: output.candidate_count,
        });
    };

    let archive_path = output_dir.join(archive_file_name(name));
    std::fs::write(&archive_path, archive).map_err(|source| FileError::Write {
        path: archive_path.clone(),
        source,
    })?;

    Ok(FileOutcome::Extracted {
        name: name.to_string(),
        artworks: output.accepted_count(),
        candidates: output.candidate_count,
        downsampled: output.downsampled,
        archive: archive_path,
        previews: output
            .previews(config.output.preview_cap())
            .map(|p| p.label.to_string())
            .collect(),
    })
}
