use crate::util::Float;

pub fn sigmoid(val: Float) -> Float {
    return 1.0 / (1.0 + (-val).exp());
}

/// Derivative of the sigmoid taken at the raw argument, not at a
/// pre-activated output.
pub fn sigmoid_prime(val: Float) -> Float {
    return sigmoid(val) * (1.0 - sigmoid(val));
}
