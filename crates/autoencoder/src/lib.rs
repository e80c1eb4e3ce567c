#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
#![deny(missing_docs, unused_must_use)]

//! Single-hidden-layer autoencoder trained by online backpropagation.
//!
//! The engine consumes plain `f32` feature vectors and learns to reproduce
//! them through a narrower sigmoid hidden layer. It keeps no state between
//! calls apart from its two weight matrices.
//!
//! Layout (important files):
//! - `activation.rs` — logistic sigmoid and its derivative in activation form
//! - `init.rs` — seeded RNG helper and small symmetric weight draws
//! - `network.rs` — `Autoencoder`: feedforward, deltas, weight update, receptive fields
//!
//! Contract: given identical initial weights and identical inputs, every
//! operation produces identical results.

/// Logistic activation helpers.
pub mod activation;
/// Weight initialization helpers.
pub mod init;
/// The autoencoder engine.
pub mod network;

pub use activation::{sigmoid, sigmoid_derivative};
pub use init::{make_rng, small_random_number};
pub use network::{Autoencoder, Layer};

/// Error type for autoencoder construction and call-boundary shape checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AutoencoderError {
    /// `feature_count` was zero
    #[error("feature count must be positive")]
    ZeroFeatures,
    /// `hidden_count` was zero
    #[error("hidden count must be positive")]
    ZeroHidden,
    /// Feature vector length differs from the input layer width
    #[error("feature vector has {actual} values, expected {expected}")]
    FeatureLength {
        /// input layer width
        expected: usize,
        /// supplied length
        actual: usize,
    },
    /// Target vector length differs from the output layer width
    #[error("target vector has {actual} values, expected {expected}")]
    TargetLength {
        /// output layer width
        expected: usize,
        /// supplied length
        actual: usize,
    },
    /// Hidden unit index is not below `hidden_count`
    #[error("hidden node {index} out of range for {hidden_count} hidden units")]
    HiddenIndex {
        /// requested index
        index: usize,
        /// number of hidden units
        hidden_count: usize,
    },
    /// Dataset feature or target width differs from the network width
    #[error("dataset is {features}->{outputs} wide, network expects {expected}")]
    DatasetWidth {
        /// network input/output width
        expected: usize,
        /// dataset feature width
        features: usize,
        /// dataset target width
        outputs: usize,
    },
}
