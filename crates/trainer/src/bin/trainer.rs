use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use trainer::{grid, logging, run, PartialConfig};

/// Train an autoencoder on sliding windows of a numeric grid and print its receptive fields.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Grid file: whitespace-separated values, one row per line
    #[arg(value_name = "PATH")]
    grid: PathBuf,
    /// JSON config file; flags below override it
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Write the JSON report here instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
    #[arg(long)]
    window_width: Option<usize>,
    #[arg(long)]
    window_height: Option<usize>,
    #[arg(long)]
    stride: Option<usize>,
    #[arg(long)]
    hidden: Option<usize>,
    #[arg(long)]
    learning_rate: Option<f32>,
    #[arg(short, long, value_name = "INT")]
    epochs: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    /// Multiplier applied to grid values (default 1/255)
    #[arg(long)]
    scale: Option<f32>,
}

impl Cli {
    fn overrides(&self) -> PartialConfig {
        PartialConfig {
            window_width: self.window_width,
            window_height: self.window_height,
            stride: self.stride,
            hidden_count: self.hidden,
            learning_rate: self.learning_rate,
            epochs: self.epochs,
            seed: self.seed,
            scale: self.scale,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::install_logger()?;
    let args = Cli::parse();

    let file_cfg = match &args.config {
        Some(path) => PartialConfig::from_file(path)?,
        None => PartialConfig::default(),
    };
    let cfg = file_cfg.merge(args.overrides()).resolve()?;
    tracing::info!(?cfg, "resolved config");

    let grid = grid::read_grid(&args.grid)?;
    let report = run(&cfg, &grid)?;

    let json = serde_json::to_string_pretty(&report)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!(path = %path.display(), "report written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
