use matrix::{Dataset, Matrix};
use rand::Rng;
use tracing::{debug, trace};

use crate::activation::{sigmoid, sigmoid_derivative};
use crate::init::{make_rng, small_random_number};
use crate::AutoencoderError;

/// Layer selector for reading activation buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    /// `feature_count` inputs followed by the pinned bias unit
    Input,
    /// `hidden_count` hidden units followed by the pinned bias unit
    Hidden,
    /// `feature_count` reconstructed outputs
    Output,
}

/// Autoencoder with `f` inputs, `h` sigmoid hidden units and `f` sigmoid outputs.
///
/// `first_weights` is `(f+1) x h`: row `i` holds the weights leaving input `i`,
/// with row `f` belonging to the input bias. `second_weights` is `(h+1) x f`
/// with row `h` belonging to the hidden bias.
///
/// The activation and delta buffers are scratch space. Each training or
/// inference call overwrites them; their contents carry no meaning from one
/// call to the next.
#[derive(Clone, Debug)]
pub struct Autoencoder {
    feature_count: usize,
    hidden_count: usize,
    learning_rate: f32,
    first_weights: Matrix,
    second_weights: Matrix,
    input_activations: Vec<f32>,
    hidden_activations: Vec<f32>,
    output_activations: Vec<f32>,
    output_deltas: Vec<f32>,
    hidden_deltas: Vec<f32>,
}

/// Net input into column `col` of `weights` given the sending layer's activations.
fn column_net(weights: &Matrix, activations: &[f32], col: usize) -> f32 {
    activations
        .iter()
        .enumerate()
        .map(|(row, a)| weights.get(row, col) * a)
        .sum()
}

impl Autoencoder {
    /// Build an autoencoder with every weight drawn from `[-0.01, 0.01)` using `rng`.
    pub fn new<R: Rng + ?Sized>(
        feature_count: usize,
        hidden_count: usize,
        rng: &mut R,
    ) -> Result<Self, AutoencoderError> {
        if feature_count == 0 {
            return Err(AutoencoderError::ZeroFeatures);
        }
        if hidden_count == 0 {
            return Err(AutoencoderError::ZeroHidden);
        }

        let mut first_weights = Matrix::new(feature_count + 1, hidden_count);
        let mut second_weights = Matrix::new(hidden_count + 1, feature_count);
        first_weights.fill_with(|| small_random_number(rng));
        second_weights.fill_with(|| small_random_number(rng));

        debug!(feature_count, hidden_count, "autoencoder initialized");
        Ok(Self {
            feature_count,
            hidden_count,
            learning_rate: 1.0,
            first_weights,
            second_weights,
            input_activations: vec![0.0; feature_count + 1],
            hidden_activations: vec![0.0; hidden_count + 1],
            output_activations: vec![0.0; feature_count],
            output_deltas: vec![0.0; feature_count],
            hidden_deltas: vec![0.0; hidden_count],
        })
    }

    /// Same as [`Autoencoder::new`] with a ChaCha8 generator seeded from `seed`.
    pub fn with_seed(
        feature_count: usize,
        hidden_count: usize,
        seed: u64,
    ) -> Result<Self, AutoencoderError> {
        let mut rng = make_rng(seed);
        Self::new(feature_count, hidden_count, &mut rng)
    }

    /// Builder-style learning rate override.
    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Step size applied by every weight update. Defaults to 1.
    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    /// Change the step size for subsequent updates.
    pub fn set_learning_rate(&mut self, learning_rate: f32) {
        self.learning_rate = learning_rate;
    }

    /// Input and output layer width.
    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    /// Hidden layer width, bias excluded.
    pub fn hidden_count(&self) -> usize {
        self.hidden_count
    }

    /// Input-to-hidden weights, `(f+1) x h`.
    pub fn first_weights(&self) -> &Matrix {
        &self.first_weights
    }

    /// Hidden-to-output weights, `(h+1) x f`.
    pub fn second_weights(&self) -> &Matrix {
        &self.second_weights
    }

    /// Weight from input `from` (or the bias at `f`) to hidden unit `to`. Panics if out of range.
    pub fn first_weight(&self, from: usize, to: usize) -> f32 {
        self.first_weights.get(from, to)
    }

    /// Overwrite one input-to-hidden weight. Panics if out of range.
    pub fn set_first_weight(&mut self, from: usize, to: usize, value: f32) {
        self.first_weights.set(from, to, value);
    }

    /// Weight from hidden unit `from` (or the bias at `h`) to output `to`. Panics if out of range.
    pub fn second_weight(&self, from: usize, to: usize) -> f32 {
        self.second_weights.get(from, to)
    }

    /// Overwrite one hidden-to-output weight. Panics if out of range.
    pub fn set_second_weight(&mut self, from: usize, to: usize, value: f32) {
        self.second_weights.set(from, to, value);
    }

    /// Activations left behind by the most recent feedforward pass.
    pub fn activations(&self, layer: Layer) -> &[f32] {
        match layer {
            Layer::Input => &self.input_activations,
            Layer::Hidden => &self.hidden_activations,
            Layer::Output => &self.output_activations,
        }
    }

    /// Output deltas from the most recent backward pass.
    pub fn output_deltas(&self) -> &[f32] {
        &self.output_deltas
    }

    /// Hidden deltas from the most recent backward pass (no bias slot).
    pub fn hidden_deltas(&self) -> &[f32] {
        &self.hidden_deltas
    }

    /// Sum of every weight in both matrices.
    pub fn weight_sum(&self) -> f32 {
        self.first_weights.as_slice().iter().sum::<f32>()
            + self.second_weights.as_slice().iter().sum::<f32>()
    }

    fn check_features(&self, features: &[f32]) -> Result<(), AutoencoderError> {
        if features.len() != self.feature_count {
            return Err(AutoencoderError::FeatureLength {
                expected: self.feature_count,
                actual: features.len(),
            });
        }
        Ok(())
    }

    fn check_targets(&self, targets: &[f32]) -> Result<(), AutoencoderError> {
        if targets.len() != self.feature_count {
            return Err(AutoencoderError::TargetLength {
                expected: self.feature_count,
                actual: targets.len(),
            });
        }
        Ok(())
    }

    /// Feedforward pass. Pins both bias units to 1 before any net is computed.
    pub fn calculate_activations(&mut self, features: &[f32]) -> Result<(), AutoencoderError> {
        self.check_features(features)?;

        for (slot, &value) in self.input_activations.iter_mut().zip(features) {
            *slot = value;
        }
        if let Some(bias) = self.input_activations.last_mut() {
            *bias = 1.0;
        }
        if let Some(bias) = self.hidden_activations.last_mut() {
            *bias = 1.0;
        }

        // nets include the bias row of each weight matrix
        for (j, slot) in self.hidden_activations.iter_mut().take(self.hidden_count).enumerate() {
            *slot = sigmoid(column_net(&self.first_weights, &self.input_activations, j));
        }
        for (k, slot) in self.output_activations.iter_mut().enumerate() {
            *slot = sigmoid(column_net(&self.second_weights, &self.hidden_activations, k));
        }
        Ok(())
    }

    /// Backward pass against `targets`, using the activations of the last feedforward.
    ///
    /// Output delta: `-(target - actual) * a(1-a)`. Hidden delta: the
    /// outgoing-weight-weighted sum of output deltas times `a(1-a)`. The hidden
    /// bias gets no delta.
    pub fn calculate_deltas(&mut self, targets: &[f32]) -> Result<(), AutoencoderError> {
        self.check_targets(targets)?;

        let outputs = self.output_deltas.iter_mut().zip(targets).zip(&self.output_activations);
        for ((delta, &target), &actual) in outputs {
            *delta = -(target - actual) * sigmoid_derivative(actual);
        }

        let hidden = self.hidden_deltas.iter_mut().zip(&self.hidden_activations);
        for (j, (delta, &activation)) in hidden.enumerate() {
            let weighted: f32 = self
                .second_weights
                .row(j)
                .iter()
                .zip(&self.output_deltas)
                .map(|(w, d)| w * d)
                .sum();
            *delta = weighted * sigmoid_derivative(activation);
        }
        Ok(())
    }

    /// Move every weight against its error gradient, `w -= rate * activation * delta`.
    pub fn apply_weight_deltas(&mut self) {
        let rate = self.learning_rate;

        for (i, &activation) in self.input_activations.iter().enumerate() {
            let row = self.first_weights.row_mut(i);
            for (w, &delta) in row.iter_mut().zip(&self.hidden_deltas) {
                *w -= rate * activation * delta;
            }
        }
        for (j, &activation) in self.hidden_activations.iter().enumerate() {
            let row = self.second_weights.row_mut(j);
            for (w, &delta) in row.iter_mut().zip(&self.output_deltas) {
                *w -= rate * activation * delta;
            }
        }
    }

    fn squared_error(&self, targets: &[f32]) -> f32 {
        targets
            .iter()
            .zip(&self.output_activations)
            .map(|(t, o)| (t - o) * (t - o))
            .sum()
    }

    /// One online SGD step: feedforward, deltas, update.
    pub fn train_on_instance(
        &mut self,
        features: &[f32],
        targets: &[f32],
    ) -> Result<(), AutoencoderError> {
        self.check_features(features)?;
        self.check_targets(targets)?;

        self.calculate_activations(features)?;
        self.calculate_deltas(targets)?;
        trace!(error = self.squared_error(targets), "instance error before update");
        self.apply_weight_deltas();
        Ok(())
    }

    /// One pass over `dataset` in row order, each row serving as its own target.
    ///
    /// Returns the number of training steps taken.
    #[tracing::instrument(level = "debug", skip_all, fields(instances = dataset.instance_count()))]
    pub fn train_on_dataset(&mut self, dataset: &Dataset) -> Result<usize, AutoencoderError> {
        if dataset.feature_count() != self.feature_count {
            return Err(self.width_error(dataset));
        }
        let mut steps = 0;
        for (features, _) in dataset.iter() {
            self.train_on_instance(features, features)?;
            steps += 1;
        }
        debug!(steps, weight_sum = self.weight_sum(), "dataset pass done");
        Ok(steps)
    }

    /// One pass over `dataset` using its own target rows, e.g. clean targets for noisy features.
    #[tracing::instrument(level = "debug", skip_all, fields(instances = dataset.instance_count()))]
    pub fn train_on_dataset_targets(&mut self, dataset: &Dataset) -> Result<usize, AutoencoderError> {
        if dataset.feature_count() != self.feature_count
            || dataset.output_count() != self.feature_count
        {
            return Err(self.width_error(dataset));
        }
        let mut steps = 0;
        for (features, targets) in dataset.iter() {
            self.train_on_instance(features, targets)?;
            steps += 1;
        }
        debug!(steps, weight_sum = self.weight_sum(), "dataset pass done");
        Ok(steps)
    }

    fn width_error(&self, dataset: &Dataset) -> AutoencoderError {
        AutoencoderError::DatasetWidth {
            expected: self.feature_count,
            features: dataset.feature_count(),
            outputs: dataset.output_count(),
        }
    }

    /// Feedforward only; returns the reconstruction.
    pub fn reconstruct(&mut self, features: &[f32]) -> Result<&[f32], AutoencoderError> {
        self.calculate_activations(features)?;
        Ok(&self.output_activations)
    }

    /// Feedforward and return `sum((target - output)^2)`. Weights are untouched.
    pub fn reconstruction_error(
        &mut self,
        features: &[f32],
        targets: &[f32],
    ) -> Result<f32, AutoencoderError> {
        self.check_targets(targets)?;
        self.calculate_activations(features)?;
        Ok(self.squared_error(targets))
    }

    /// Mean of [`Autoencoder::reconstruction_error`] over every row of `dataset`,
    /// each row serving as its own target.
    pub fn mean_dataset_error(&mut self, dataset: &Dataset) -> Result<f32, AutoencoderError> {
        if dataset.feature_count() != self.feature_count {
            return Err(self.width_error(dataset));
        }
        if dataset.is_empty() {
            return Ok(0.0);
        }
        let mut total = 0.0_f32;
        for (features, _) in dataset.iter() {
            total += self.reconstruction_error(features, features)?;
        }
        Ok(total / dataset.instance_count() as f32)
    }

    fn receptive_field(&self, node: usize) -> Vec<f32> {
        let column: Vec<f32> = (0..self.feature_count)
            .map(|i| self.first_weights.get(i, node))
            .collect();
        let norm = column.iter().map(|w| w * w).sum::<f32>().sqrt();
        // an all-zero column yields NaN
        column.into_iter().map(|w| w / norm).collect()
    }

    /// Unit-norm input vector that maximally drives hidden unit `node`.
    ///
    /// This is the unit's incoming weight vector without its bias weight,
    /// divided by its L2 norm. Reads weights only.
    pub fn maximal_input_vector_for_hidden_node(
        &self,
        node: usize,
    ) -> Result<Vec<f32>, AutoencoderError> {
        if node >= self.hidden_count {
            return Err(AutoencoderError::HiddenIndex {
                index: node,
                hidden_count: self.hidden_count,
            });
        }
        Ok(self.receptive_field(node))
    }

    /// Receptive field of every hidden unit, in unit order.
    pub fn receptive_fields(&self) -> Vec<Vec<f32>> {
        (0..self.hidden_count).map(|j| self.receptive_field(j)).collect()
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    const PATTERN: [f32; 4] = [0.1, 0.9, 0.1, 0.9];

    fn mse(outputs: &[f32], targets: &[f32]) -> f32 {
        let sum: f32 = outputs.iter().zip(targets).map(|(o, t)| (o - t) * (o - t)).sum();
        sum / targets.len() as f32
    }

    #[test]
    fn weight_shapes_include_bias_rows() -> Result<(), AutoencoderError> {
        let ae = Autoencoder::with_seed(5, 3, 1)?;
        assert_eq!(ae.first_weights().row_count(), 6);
        assert_eq!(ae.first_weights().col_count(), 3);
        assert_eq!(ae.second_weights().row_count(), 4);
        assert_eq!(ae.second_weights().col_count(), 5);
        assert_eq!(ae.activations(Layer::Input).len(), 6);
        assert_eq!(ae.activations(Layer::Hidden).len(), 4);
        assert_eq!(ae.activations(Layer::Output).len(), 5);
        assert_eq!(ae.hidden_deltas().len(), 3);
        assert_eq!(ae.output_deltas().len(), 5);
        assert_eq!(ae.learning_rate(), 1.0);
        Ok(())
    }

    #[test]
    fn rejects_empty_layers() {
        assert_eq!(Autoencoder::with_seed(0, 2, 1).err(), Some(AutoencoderError::ZeroFeatures));
        assert_eq!(Autoencoder::with_seed(2, 0, 1).err(), Some(AutoencoderError::ZeroHidden));
    }

    #[test]
    fn initial_weights_are_small() -> Result<(), AutoencoderError> {
        let ae = Autoencoder::with_seed(16, 8, 99)?;
        let all = ae.first_weights().as_slice().iter().chain(ae.second_weights().as_slice());
        for &w in all {
            assert!((-0.01..0.01).contains(&w));
        }
        Ok(())
    }

    #[test]
    fn same_seed_same_weights() -> Result<(), AutoencoderError> {
        let a = Autoencoder::with_seed(4, 2, 5)?;
        let b = Autoencoder::with_seed(4, 2, 5)?;
        let c = Autoencoder::with_seed(4, 2, 6)?;
        assert_eq!(a.first_weights(), b.first_weights());
        assert_eq!(a.second_weights(), b.second_weights());
        assert_ne!(a.first_weights(), c.first_weights());
        Ok(())
    }

    #[test]
    fn feedforward_matches_hand_computation() -> Result<(), AutoencoderError> {
        let mut ae = Autoencoder::with_seed(2, 1, 0)?;
        // hidden net = 0.5*1 + (-0.5)*0 + 0.25 (bias)
        ae.set_first_weight(0, 0, 0.5);
        ae.set_first_weight(1, 0, -0.5);
        ae.set_first_weight(2, 0, 0.25);
        ae.set_second_weight(0, 0, 2.0);
        ae.set_second_weight(1, 0, -1.0);
        ae.set_second_weight(0, 1, 0.0);
        ae.set_second_weight(1, 1, 0.0);
        ae.calculate_activations(&[1.0, 0.0])?;

        let hidden = sigmoid(0.75);
        assert_eq!(ae.activations(Layer::Hidden), &[hidden, 1.0]);
        let out = ae.activations(Layer::Output);
        assert!((out[0] - sigmoid(2.0 * hidden - 1.0)).abs() < 1e-6);
        assert_eq!(out[1], 0.5);
        Ok(())
    }

    #[test]
    fn bias_units_are_pinned() -> Result<(), AutoencoderError> {
        let mut ae = Autoencoder::with_seed(3, 2, 11)?;
        ae.calculate_activations(&[-4.0, 100.0, 0.0])?;
        assert_eq!(ae.activations(Layer::Input)[3], 1.0);
        assert_eq!(ae.activations(Layer::Hidden)[2], 1.0);
        Ok(())
    }

    #[test]
    fn deltas_follow_the_delta_rule() -> Result<(), AutoencoderError> {
        let mut ae = Autoencoder::with_seed(2, 1, 3)?;
        ae.calculate_activations(&[0.2, 0.8])?;
        ae.calculate_deltas(&[0.2, 0.8])?;
        let out = ae.activations(Layer::Output).to_vec();
        let targets = [0.2_f32, 0.8];
        for k in 0..2 {
            let expected = -(targets[k] - out[k]) * out[k] * (1.0 - out[k]);
            assert!((ae.output_deltas()[k] - expected).abs() < 1e-7);
        }
        let h = ae.activations(Layer::Hidden)[0];
        let weighted = ae.second_weight(0, 0) * ae.output_deltas()[0]
            + ae.second_weight(0, 1) * ae.output_deltas()[1];
        assert!((ae.hidden_deltas()[0] - weighted * h * (1.0 - h)).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn update_scales_with_learning_rate() -> Result<(), AutoencoderError> {
        let base = Autoencoder::with_seed(3, 2, 8)?;
        let mut slow = base.clone().with_learning_rate(0.5);
        let mut fast = base.clone();
        let x = [0.3, 0.6, 0.9];
        slow.train_on_instance(&x, &x)?;
        fast.train_on_instance(&x, &x)?;
        let bias_row = 2;
        for k in 0..3 {
            let d_slow = slow.second_weight(bias_row, k) - base.second_weight(bias_row, k);
            let d_fast = fast.second_weight(bias_row, k) - base.second_weight(bias_row, k);
            assert!((d_fast - 2.0 * d_slow).abs() < 1e-6);
        }
        Ok(())
    }

    #[test]
    fn shape_mismatch_is_rejected_before_mutation() -> Result<(), AutoencoderError> {
        let mut ae = Autoencoder::with_seed(3, 2, 2)?;
        let before = ae.first_weights().clone();
        assert_eq!(
            ae.train_on_instance(&[0.0; 2], &[0.0; 3]),
            Err(AutoencoderError::FeatureLength { expected: 3, actual: 2 })
        );
        assert_eq!(
            ae.train_on_instance(&[0.0; 3], &[0.0; 4]),
            Err(AutoencoderError::TargetLength { expected: 3, actual: 4 })
        );
        assert_eq!(ae.first_weights(), &before);
        Ok(())
    }

    #[test]
    fn memorizes_single_pattern() -> Result<(), AutoencoderError> {
        let mut ae = Autoencoder::with_seed(4, 2, 2015)?;
        for _ in 0..500 {
            ae.train_on_instance(&PATTERN, &PATTERN)?;
        }
        let out = ae.reconstruct(&PATTERN)?;
        let err = mse(out, &PATTERN);
        assert!(err < 0.01, "mse {err} after 500 steps");
        Ok(())
    }

    #[test]
    fn dataset_pass_trains_each_row_once_in_order() -> Result<(), AutoencoderError> {
        let mut ds = Dataset::new(3, 4, 4);
        let rows = [[0.1, 0.2, 0.3, 0.4], [0.9, 0.8, 0.7, 0.6], [0.5, 0.0, 1.0, 0.5]];
        for (i, row) in rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                ds.set_feature(i, j, v);
                // targets are ignored by the plain autoencoding pass
                ds.set_target(i, j, 0.0);
            }
        }

        let mut by_dataset = Autoencoder::with_seed(4, 2, 77)?;
        let mut by_hand = by_dataset.clone();

        assert_eq!(by_dataset.train_on_dataset(&ds)?, 3);
        for row in &rows {
            by_hand.train_on_instance(row, row)?;
        }
        assert_eq!(by_dataset.first_weights(), by_hand.first_weights());
        assert_eq!(by_dataset.second_weights(), by_hand.second_weights());
        Ok(())
    }

    #[test]
    fn target_pass_uses_target_rows() -> Result<(), AutoencoderError> {
        let mut ds = Dataset::new(1, 2, 2);
        ds.set_feature(0, 0, 1.0);
        ds.set_target(0, 1, 1.0);
        let mut a = Autoencoder::with_seed(2, 2, 4)?;
        let mut b = a.clone();
        assert_eq!(a.train_on_dataset_targets(&ds)?, 1);
        b.train_on_instance(&[1.0, 0.0], &[0.0, 1.0])?;
        assert_eq!(a.second_weights(), b.second_weights());
        Ok(())
    }

    #[test]
    fn dataset_width_is_checked() -> Result<(), AutoencoderError> {
        let mut ae = Autoencoder::with_seed(4, 2, 1)?;
        let ds = Dataset::new(2, 3, 3);
        assert_eq!(
            ae.train_on_dataset(&ds),
            Err(AutoencoderError::DatasetWidth { expected: 4, features: 3, outputs: 3 })
        );
        Ok(())
    }

    #[test]
    fn receptive_field_is_unit_norm_and_ignores_bias() -> Result<(), AutoencoderError> {
        let mut ae = Autoencoder::with_seed(2, 2, 9)?;
        ae.set_first_weight(0, 1, 3.0);
        ae.set_first_weight(1, 1, 4.0);
        ae.set_first_weight(2, 1, 100.0);
        assert_eq!(ae.maximal_input_vector_for_hidden_node(1)?, vec![0.6, 0.8]);
        Ok(())
    }

    #[test]
    fn receptive_field_of_dead_unit_is_nan() -> Result<(), AutoencoderError> {
        let mut ae = Autoencoder::with_seed(3, 1, 9)?;
        for i in 0..3 {
            ae.set_first_weight(i, 0, 0.0);
        }
        let field = ae.maximal_input_vector_for_hidden_node(0)?;
        assert!(field.iter().all(|v| v.is_nan()));
        Ok(())
    }

    #[test]
    fn receptive_field_index_is_checked() -> Result<(), AutoencoderError> {
        let ae = Autoencoder::with_seed(3, 2, 9)?;
        assert_eq!(
            ae.maximal_input_vector_for_hidden_node(2),
            Err(AutoencoderError::HiddenIndex { index: 2, hidden_count: 2 })
        );
        assert_eq!(ae.receptive_fields().len(), 2);
        Ok(())
    }

    #[test]
    fn reconstruction_error_leaves_weights_alone() -> Result<(), AutoencoderError> {
        let mut ae = Autoencoder::with_seed(4, 2, 3)?;
        let sum = ae.weight_sum();
        let err = ae.reconstruction_error(&PATTERN, &PATTERN)?;
        assert!(err > 0.0);
        assert_eq!(ae.weight_sum(), sum);
        Ok(())
    }
}
