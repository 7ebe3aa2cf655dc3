use art_crop::{batch, captions, config, output};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "art-crop")]
#[command(about = "Extract individual artworks from scanned contact sheets")]
#[command(long_about = "\
Extract individual artworks from scanned contact sheets

Each scan is searched for dark regions on the light background. Regions that
look like artworks (large enough, not too thin) are cropped together with the
label strip printed under them and written to one ZIP per scan:

  out/
  ├── sheet-01.tif_cropped_artworks.zip
  │   ├── sheet-01.tif_artwork_1.jpg
  │   └── sheet-01.tif_artwork_2.jpg
  └── sheet-02.png_cropped_artworks.zip

Scans where nothing is found produce no archive. A scan that fails (unreadable,
or above the pixel ceiling) is reported and the rest of the batch continues.

Settings are read from ./art-crop.toml when present, or from --config.
Run 'art-crop gen-config' to generate a documented config file.

Set RUST_LOG=art_crop=debug for per-stage diagnostics.")]
#[command(version = version_string())]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract artworks from scans (files or directories)
    Extract {
        /// Scan files, or directories to search for scans
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Directory the archives are written to
        #[arg(long, default_value = "cropped")]
        output: PathBuf,

        /// Config file (defaults to ./art-crop.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Pair slide-deck pictures with their captions and print the layout plan
    PairCaptions {
        /// Deck shape model as JSON
        deck: PathBuf,
    },
    /// Print a stock art-crop.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Extract {
            inputs,
            output: output_dir,
            config: config_path,
        } => {
            let pipeline_config = resolve_config(config_path.as_deref())?;
            init_thread_pool(&pipeline_config.processing);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let report = batch::run_batch(&inputs, &output_dir, &pipeline_config, Some(tx))?;
            printer.join().ok();
            output::print_summary(&report);
        }
        Command::PairCaptions { deck } => {
            let content = std::fs::read_to_string(&deck)?;
            let deck: captions::Deck = serde_json::from_str(&content)?;
            let plans = captions::plan_deck(&deck, &captions::DeckLayout::default());
            output::print_deck_plan(&plans);
            println!("{}", serde_json::to_string_pretty(&plans)?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Diagnostics go to stderr, filtered by `RUST_LOG` (warnings by default).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Explicit `--config` wins; otherwise `art-crop.toml` in the working directory.
fn resolve_config(path: Option<&Path>) -> Result<config::PipelineConfig, config::ConfigError> {
    match path {
        Some(p) => config::load_config_file(p),
        None => config::load_config(Path::new(".")),
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
