//! CLI output formatting.
//!
//! Every function here is pure: it takes pipeline data and returns display
//! lines. `main` decides where they go (stdout for results, the printer
//! thread for progress). This keeps the wording under unit test.
//!
//! # Output Format
//!
//! ## Extract
//!
//! ```text
//! Extracting 3 scans → out
//! [1/3] sheet-01.tif: 4 artworks of 6 candidates
//!     Archive: out/sheet-01.tif_cropped_artworks.zip
//!     Previews: Artwork 1, Artwork 2, Artwork 3, Artwork 4
//! [2/3] blank.png: no artworks found (2 candidates rejected)
//! [3/3] huge.tif: failed: image is 12000x12000 (144000000 pixels), above the 70000000 pixel ceiling
//!
//! 3 scans: 4 artworks from 1 scan, 1 empty, 1 failed
//! ```
//!
//! ## Pair captions
//!
//! ```text
//! slide 1  img1.png → "Still Life, 1954"
//! slide 2  (picture) → Untitled
//! ```

use crate::batch::{BatchEvent, BatchReport, FileOutcome};
use crate::captions::{SlidePlan, UNTITLED};

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

// ============================================================================
// Extract
// ============================================================================

/// Format one outcome: a header line plus indented context.
pub fn format_outcome(index: usize, total: usize, outcome: &FileOutcome) -> Vec<String> {
    let prefix = format!("[{}/{}] {}:", index, total, outcome.name());
    match outcome {
        FileOutcome::Extracted {
            artworks,
            candidates,
            downsampled,
            archive,
            previews,
            ..
        } => {
            let mut header = format!("{} {}", prefix, plural(*artworks, "artwork", "artworks"));
            if candidates > artworks {
                header.push_str(&format!(" of {} candidates", candidates));
            }
            let mut lines = vec![
                header,
                format!("    Archive: {}", archive.display()),
            ];
            if !previews.is_empty() {
                let hidden = artworks.saturating_sub(previews.len());
                let more = if hidden > 0 {
                    format!(" (+{} more)", hidden)
                } else {
                    String::new()
                };
                lines.push(format!("    Previews: {}{}", previews.join(", "), more));
            }
            if *downsampled {
                lines.push("    Downsampled before detection".to_string());
            }
            lines
        }
        FileOutcome::Empty { candidates, .. } => {
            if *candidates == 0 {
                vec![format!("{} no artworks found", prefix)]
            } else {
                vec![format!(
                    "{} no artworks found ({} rejected)",
                    prefix,
                    plural(*candidates, "candidate", "candidates")
                )]
            }
        }
        FileOutcome::Failed { reason, .. } => vec![format!("{} failed: {}", prefix, reason)],
    }
}

/// Format a single batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { total, output_dir } => vec![format!(
            "Extracting {} \u{2192} {}",
            plural(*total, "scan", "scans"),
            output_dir.display()
        )],
        BatchEvent::FileFinished {
            index,
            total,
            outcome,
        } => format_outcome(*index, *total, outcome),
    }
}

/// One-line totals for the end of a run.
pub fn format_summary(report: &BatchReport) -> Vec<String> {
    let total = report.outcomes.len();
    if total == 0 {
        return vec!["No scans found".to_string()];
    }

    let mut line = format!(
        "{}: {} from {}",
        plural(total, "scan", "scans"),
        plural(report.total_artworks(), "artwork", "artworks"),
        plural(report.extracted(), "scan", "scans"),
    );
    if report.empty() > 0 {
        line.push_str(&format!(", {} empty", report.empty()));
    }
    if report.failed() > 0 {
        line.push_str(&format!(", {} failed", report.failed()));
    }
    vec![String::new(), line]
}

/// Print the end-of-run summary to stdout.
pub fn print_summary(report: &BatchReport) {
    for line in format_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Pair captions
// ============================================================================

/// Human-readable pairing table, one line per planned slide.
pub fn format_deck_plan(plans: &[SlidePlan]) -> Vec<String> {
    plans
        .iter()
        .map(|plan| {
            let picture = plan.picture_name.as_deref().unwrap_or("(picture)");
            let label = if plan.label == UNTITLED {
                UNTITLED.to_string()
            } else {
                format!("\"{}\"", plan.label)
            };
            format!("slide {}  {} \u{2192} {}", plan.source_slide, picture, label)
        })
        .collect()
}

/// Print the pairing table to stderr, leaving stdout for the JSON plan.
pub fn print_deck_plan(plans: &[SlidePlan]) {
    for line in format_deck_plan(plans) {
        eprintln!("{}", line);
    }
}
