#![forbid(unsafe_code)]
#![deny(missing_docs, unused_must_use)]

//! Trainer: grid file -> sliding windows -> autoencoder -> receptive fields.
//!
//! The trainer only handles plain numeric grids (whitespace-separated text).
//! Turning images into grids, or receptive fields back into images, is left
//! to other tools.
//!
//! Layout (important files):
//! - `config.rs` — `TrainConfig` defaults, JSON file + CLI merge
//! - `grid.rs` — text grid parsing
//! - `logging.rs` — tracing subscriber setup
//! - `bin/trainer.rs` — CLI entry point

use autoencoder::{Autoencoder, AutoencoderError};
use matrix::{Matrix, MatrixError};
use sampler::{SamplerError, WindowSampler};
use serde::Serialize;
use tracing::info;

/// Training settings and their sources.
pub mod config;
/// Numeric grid loading.
pub mod grid;
/// Logging setup.
pub mod logging;

pub use config::{PartialConfig, TrainConfig};

/// Error type for trainer runs
#[derive(Debug, thiserror::Error)]
pub enum TrainerError {
    /// Reading an input or config file failed
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    /// Config file is not valid JSON for `PartialConfig`
    #[error("config file: {0}")]
    Json(#[from] serde_json::Error),
    /// Resolved settings are unusable
    #[error("invalid config: {0}")]
    Config(String),
    /// A grid token is not a number
    #[error("line {line}: cannot parse {token:?} as a number")]
    Parse {
        /// 1-based line number
        line: usize,
        /// offending token
        token: String,
    },
    /// Grid input had no rows
    #[error("grid is empty")]
    EmptyGrid,
    /// Grid shape problem
    #[error(transparent)]
    Matrix(#[from] MatrixError),
    /// Window does not fit the grid
    #[error(transparent)]
    Sampler(#[from] SamplerError),
    /// Network shape problem
    #[error(transparent)]
    Autoencoder(#[from] AutoencoderError),
}

/// Outcome of a training run.
#[derive(Clone, Debug, Serialize)]
pub struct Report {
    /// settings the run used
    pub config: TrainConfig,
    /// number of sampled windows
    pub instances: usize,
    /// mean per-instance squared reconstruction error after each epoch
    pub epoch_errors: Vec<f32>,
    /// one receptive field per hidden unit, rescaled to [0, 1]
    pub receptive_fields: Vec<Vec<f32>>,
}

/// Min-max rescale into [0, 1]. A constant vector maps to 0.5 everywhere.
pub fn rescale_unit(values: &[f32]) -> Vec<f32> {
    let (lo, hi) = values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let span = hi - lo;
    if !(span.is_finite() && span > 0.0) {
        return vec![0.5; values.len()];
    }
    values.iter().map(|v| (v - lo) / span).collect()
}

/// Sample `grid`, train for `cfg.epochs` passes and collect receptive fields.
pub fn run(cfg: &TrainConfig, grid: &Matrix) -> Result<Report, TrainerError> {
    cfg.validate()?;
    let mut scaled = grid.clone();
    scaled.scale(cfg.scale);

    let sampler = WindowSampler::new(cfg.window_width, cfg.window_height).with_stride(cfg.stride);
    let dataset = sampler.sample(&scaled)?;
    info!(
        instances = dataset.instance_count(),
        features = dataset.feature_count(),
        hidden = cfg.hidden_count,
        "dataset ready"
    );

    let mut net = Autoencoder::with_seed(dataset.feature_count(), cfg.hidden_count, cfg.seed)?
        .with_learning_rate(cfg.learning_rate);

    let mut epoch_errors = Vec::with_capacity(cfg.epochs);
    for epoch in 0..cfg.epochs {
        net.train_on_dataset(&dataset)?;
        let err = net.mean_dataset_error(&dataset)?;
        info!(epoch = epoch + 1, mean_error = err, "epoch done");
        epoch_errors.push(err);
    }

    let receptive_fields = net.receptive_fields().iter().map(|f| rescale_unit(f)).collect();
    Ok(Report {
        config: cfg.clone(),
        instances: dataset.instance_count(),
        epoch_errors,
        receptive_fields,
    })
}
