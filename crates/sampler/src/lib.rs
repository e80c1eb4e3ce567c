#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
#![deny(missing_docs, unused_must_use)]

//! Sliding-window dataset construction over a 2D numeric grid.
//!
//! Contract: identical grid and window -> identical `Dataset`, one instance per
//! window position in row-major order of the window's top-left corner.

use matrix::{Dataset, Matrix};
use tracing::debug;

/// Error type for window sampling
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SamplerError {
    /// Window width, height or stride is zero
    #[error("window width, height and stride must be non-zero")]
    ZeroSize,
    /// Window does not fit inside the grid
    #[error("window {width}x{height} does not fit in grid {cols}x{rows}")]
    WindowTooLarge {
        /// window width in columns
        width: usize,
        /// window height in rows
        height: usize,
        /// grid column count
        cols: usize,
        /// grid row count
        rows: usize,
    },
}

/// Fixed-size window slid across a grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSampler {
    width: usize,
    height: usize,
    stride: usize,
}

impl WindowSampler {
    /// Window of `width` columns by `height` rows, stride 1.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, stride: 1 }
    }

    /// Step between neighbouring window positions, in both directions.
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    /// Values per window (`width * height`).
    pub fn feature_count(&self) -> usize {
        self.width * self.height
    }

    /// Number of (row, col) window positions over `grid`.
    pub fn positions(&self, grid: &Matrix) -> Result<(usize, usize), SamplerError> {
        if self.width == 0 || self.height == 0 || self.stride == 0 {
            return Err(SamplerError::ZeroSize);
        }
        let (rows, cols) = (grid.row_count(), grid.col_count());
        if self.width > cols || self.height > rows {
            return Err(SamplerError::WindowTooLarge {
                width: self.width,
                height: self.height,
                cols,
                rows,
            });
        }
        Ok((
            (rows - self.height) / self.stride + 1,
            (cols - self.width) / self.stride + 1,
        ))
    }

    /// Extract every window as one autoencoding instance (targets equal features).
    pub fn sample(&self, grid: &Matrix) -> Result<Dataset, SamplerError> {
        let (down, across) = self.positions(grid)?;
        let mut features = Matrix::new(down * across, self.feature_count());
        let tops = (0..down).map(|p| p * self.stride);
        for (pr, top) in tops.enumerate() {
            for pc in 0..across {
                let left = pc * self.stride;
                let instance = pr * across + pc;
                for dy in 0..self.height {
                    for dx in 0..self.width {
                        features.set(instance, dy * self.width + dx, grid.get(top + dy, left + dx));
                    }
                }
            }
        }
        debug!(
            instances = features.row_count(),
            features = self.feature_count(),
            "sampled windows"
        );
        Ok(Dataset::autoencoding(features))
    }
}
