use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::TrainerError;

/// Fully resolved training settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    /// window width in grid columns
    pub window_width: usize,
    /// window height in grid rows
    pub window_height: usize,
    /// step between window positions
    pub stride: usize,
    /// hidden units in the autoencoder
    pub hidden_count: usize,
    /// gradient step size
    pub learning_rate: f32,
    /// passes over the sampled dataset
    pub epochs: usize,
    /// seed for weight initialization
    pub seed: u64,
    /// factor applied to every grid value before sampling
    pub scale: f32,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            window_width: 8,
            window_height: 8,
            stride: 1,
            hidden_count: 16,
            learning_rate: 1.0,
            epochs: 10,
            seed: 42,
            scale: 1.0 / 255.0,
        }
    }
}

impl TrainConfig {
    /// Reject settings no run could use.
    pub fn validate(&self) -> Result<(), TrainerError> {
        if self.window_width == 0 || self.window_height == 0 || self.stride == 0 {
            return Err(TrainerError::Config("window sizes and stride must be positive".into()));
        }
        if self.hidden_count == 0 {
            return Err(TrainerError::Config("hidden_count must be positive".into()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(TrainerError::Config(format!(
                "learning_rate must be finite and positive, got {}",
                self.learning_rate
            )));
        }
        if !self.scale.is_finite() {
            return Err(TrainerError::Config("scale must be finite".into()));
        }
        Ok(())
    }
}

/// Settings from one source; omitted fields fall through to the next source.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    /// window width in grid columns
    pub window_width: Option<usize>,
    /// window height in grid rows
    pub window_height: Option<usize>,
    /// step between window positions
    pub stride: Option<usize>,
    /// hidden units in the autoencoder
    pub hidden_count: Option<usize>,
    /// gradient step size
    pub learning_rate: Option<f32>,
    /// passes over the sampled dataset
    pub epochs: Option<usize>,
    /// seed for weight initialization
    pub seed: Option<u64>,
    /// factor applied to every grid value before sampling
    pub scale: Option<f32>,
}

impl PartialConfig {
    /// Parse a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, TrainerError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Combine two sources, `other` taking precedence.
    pub fn merge(self, other: Self) -> Self {
        Self {
            window_width: other.window_width.or(self.window_width),
            window_height: other.window_height.or(self.window_height),
            stride: other.stride.or(self.stride),
            hidden_count: other.hidden_count.or(self.hidden_count),
            learning_rate: other.learning_rate.or(self.learning_rate),
            epochs: other.epochs.or(self.epochs),
            seed: other.seed.or(self.seed),
            scale: other.scale.or(self.scale),
        }
    }

    /// Fill gaps from [`TrainConfig::default`] and validate.
    pub fn resolve(self) -> Result<TrainConfig, TrainerError> {
        let d = TrainConfig::default();
        let cfg = TrainConfig {
            window_width: self.window_width.unwrap_or(d.window_width),
            window_height: self.window_height.unwrap_or(d.window_height),
            stride: self.stride.unwrap_or(d.stride),
            hidden_count: self.hidden_count.unwrap_or(d.hidden_count),
            learning_rate: self.learning_rate.unwrap_or(d.learning_rate),
            epochs: self.epochs.unwrap_or(d.epochs),
            seed: self.seed.unwrap_or(d.seed),
            scale: self.scale.unwrap_or(d.scale),
        };
        cfg.validate()?;
        Ok(cfg)
    }
}
