#![forbid(unsafe_code)]
#![deny(missing_docs, unused_must_use)]

//! Dense numeric storage for the autoencoder workspace.
//!
//! Layout:
//! - `dense.rs` — row-major `Matrix` of `f32` with (row, col) addressing
//! - `dataset.rs` — `Dataset` of (feature, target) rows backed by two matrices
//!
//! Contract: indices passed to `Matrix::get`/`set`/`row` must be in range.
//! Out-of-range access panics; shape mismatches at construction return `MatrixError`.

/// Row-major dense matrix.
pub mod dense;
/// Training instances backed by a feature and a target matrix.
pub mod dataset;

pub use dataset::Dataset;
pub use dense::Matrix;

/// Error type for matrix and dataset construction
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatrixError {
    /// Backing buffer length does not match `rows * cols`
    #[error("buffer holds {actual} values, expected {rows}x{cols}")]
    BufferLength {
        /// requested row count
        rows: usize,
        /// requested column count
        cols: usize,
        /// length of the supplied buffer
        actual: usize,
    },
    /// Feature and target matrices disagree on instance count
    #[error("feature matrix has {features} rows but target matrix has {targets}")]
    RowMismatch {
        /// rows in the feature matrix
        features: usize,
        /// rows in the target matrix
        targets: usize,
    },
    /// A row written into a matrix has the wrong width
    #[error("row has {actual} values, expected {expected}")]
    RowWidth {
        /// column count of the destination
        expected: usize,
        /// length of the supplied row
        actual: usize,
    },
}
