use crate::{Matrix, MatrixError};

/// Fixed set of training instances.
///
/// Row `i` of `features` is instance `i`'s input vector and row `i` of
/// `targets` is its expected output. Both matrices always share a row count.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    features: Matrix,
    targets: Matrix,
}

impl Dataset {
    /// Zero-filled dataset of `instances` rows.
    pub fn new(instances: usize, feature_count: usize, output_count: usize) -> Self {
        Self {
            features: Matrix::new(instances, feature_count),
            targets: Matrix::new(instances, output_count),
        }
    }

    /// Pair an existing feature and target matrix.
    pub fn from_matrices(features: Matrix, targets: Matrix) -> Result<Self, MatrixError> {
        if features.row_count() != targets.row_count() {
            return Err(MatrixError::RowMismatch {
                features: features.row_count(),
                targets: targets.row_count(),
            });
        }
        Ok(Self { features, targets })
    }

    /// Autoencoding dataset: every target row equals its feature row.
    pub fn autoencoding(features: Matrix) -> Self {
        let targets = features.clone();
        Self { features, targets }
    }

    /// Number of instances.
    pub fn instance_count(&self) -> usize {
        self.features.row_count()
    }

    /// Width of a feature vector.
    pub fn feature_count(&self) -> usize {
        self.features.col_count()
    }

    /// Width of a target vector.
    pub fn output_count(&self) -> usize {
        self.targets.col_count()
    }

    /// True when the dataset holds no instances.
    pub fn is_empty(&self) -> bool {
        self.instance_count() == 0
    }

    /// Feature vector of instance `index`. Panics if out of range.
    pub fn features(&self, index: usize) -> &[f32] {
        self.features.row(index)
    }

    /// Target vector of instance `index`. Panics if out of range.
    pub fn targets(&self, index: usize) -> &[f32] {
        self.targets.row(index)
    }

    /// Owned copy of a feature row.
    pub fn feature_row(&self, index: usize) -> Vec<f32> {
        self.features.get_row(index)
    }

    /// Owned copy of a target row.
    pub fn target_row(&self, index: usize) -> Vec<f32> {
        self.targets.get_row(index)
    }

    /// Single feature value.
    pub fn feature(&self, instance: usize, index: usize) -> f32 {
        self.features.get(instance, index)
    }

    /// Single target value.
    pub fn target(&self, instance: usize, index: usize) -> f32 {
        self.targets.get(instance, index)
    }

    /// Overwrite a single feature value.
    pub fn set_feature(&mut self, instance: usize, index: usize, value: f32) {
        self.features.set(instance, index, value);
    }

    /// Overwrite a single target value.
    pub fn set_target(&mut self, instance: usize, index: usize, value: f32) {
        self.targets.set(instance, index, value);
    }

    /// Backing feature matrix.
    pub fn feature_matrix(&self) -> &Matrix {
        &self.features
    }

    /// Backing target matrix.
    pub fn target_matrix(&self) -> &Matrix {
        &self.targets
    }

    /// Iterate `(features, targets)` pairs in row order.
    pub fn iter(&self) -> impl Iterator<Item = (&[f32], &[f32])> + '_ {
        (0..self.instance_count()).map(move |i| (self.features(i), self.targets(i)))
    }
}
