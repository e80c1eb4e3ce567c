/// Logistic sigmoid `1 / (1 + e^-x)`.
///
/// Evaluated in `f64` and narrowed, so large negative or positive nets lose
/// less precision before saturating.
#[inline]
pub fn sigmoid(net: f32) -> f32 {
    (1.0 / (1.0 + (-f64::from(net)).exp())) as f32
}

/// Sigmoid derivative expressed through the activation `a = sigmoid(net)`.
#[inline]
pub fn sigmoid_derivative(activation: f32) -> f32 {
    activation * (1.0 - activation)
}
