use log::debug;
use ndarray::Array;
use ndarray_rand::rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::cost::Cost;
use crate::err::NetError;
use crate::neuron::Neuron;
use crate::util::{DataVec, Float};

/// Ordered sequence of neurons at one depth. Layer 0 is the input layer;
/// every later layer is fully connected to the one before it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NeuronLayer {
    pub index: usize,
    pub neurons: Vec<Neuron>,
    cost: Cost,
}

impl NeuronLayer {
    pub fn new(
        index: usize,
        neuron_count: usize,
        parent_count: usize,
        cost: Cost,
        rng: &mut SmallRng,
    ) -> Self {
        let letter = (b'A' + index as u8) as char;

        let neurons = (0..neuron_count)
            .map(|i| {
                if index == 0 {
                    Neuron::new_input(i, letter)
                } else {
                    Neuron::new(i, letter, parent_count, rng)
                }
            })
            .collect();

        Self {
            index,
            neurons,
            cost,
        }
    }

    pub fn is_input(&self) -> bool {
        self.index == 0
    }

    pub fn len(&self) -> usize {
        self.neurons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }

    /// Current activation of every neuron, in index order.
    pub fn values(&self) -> DataVec {
        Array::from_iter(self.neurons.iter().map(|n| n.value))
    }

    /// Valid only on the input layer; the vector length must match the
    /// layer size exactly, short or long inputs are rejected.
    pub fn set_input(&mut self, input: &DataVec) -> Result<(), NetError> {
        if !self.is_input() {
            return Err(NetError::NotInputLayer);
        }

        if input.len() != self.neurons.len() {
            return Err(NetError::SizeMismatch {
                expected: self.neurons.len(),
                got: input.len(),
            });
        }

        for (neuron, value) in self.neurons.iter_mut().zip(input.iter()) {
            neuron.value = *value;
        }

        Ok(())
    }

    /// Recomputes every neuron's activation from the parent layer's values,
    /// in neuron-index order.
    pub fn activate_all(&mut self, parent_values: &DataVec) {
        for neuron in self.neurons.iter_mut() {
            neuron.activate(parent_values);
        }
    }

    /// Scalar cost of the layer's current values against an expected vector.
    /// Meaningful on the output layer.
    pub fn cost(&self, expected: &DataVec) -> Result<Float, NetError> {
        let per_neuron = self.cost.calc(&self.values(), expected)?;
        Ok(per_neuron.sum())
    }

    /// Accumulates pre-scaled deltas element-wise into the layer's weights
    /// and biases. Shapes are checked up front, a bad delta matrix must not
    /// partially apply.
    pub fn apply_updates(
        &mut self,
        weight_deltas: &[DataVec],
        bias_deltas: &[Float],
    ) -> Result<(), NetError> {
        if weight_deltas.len() != self.neurons.len() {
            return Err(NetError::SizeMismatch {
                expected: self.neurons.len(),
                got: weight_deltas.len(),
            });
        }

        if bias_deltas.len() != self.neurons.len() {
            return Err(NetError::SizeMismatch {
                expected: self.neurons.len(),
                got: bias_deltas.len(),
            });
        }

        for (neuron, delta) in self.neurons.iter().zip(weight_deltas.iter()) {
            if delta.len() != neuron.weights.len() {
                return Err(NetError::SizeMismatch {
                    expected: neuron.weights.len(),
                    got: delta.len(),
                });
            }
        }

        for ((neuron, w_delta), b_delta) in self
            .neurons
            .iter_mut()
            .zip(weight_deltas.iter())
            .zip(bias_deltas.iter())
        {
            neuron.weights += w_delta;
            neuron.bias += *b_delta;
            debug!("{} updated", neuron.label());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use ndarray_rand::rand::SeedableRng;

    fn computed_layer(size: usize, parent_count: usize) -> NeuronLayer {
        let mut rng = SmallRng::seed_from_u64(3);
        NeuronLayer::new(1, size, parent_count, Cost::Quadratic, &mut rng)
    }

    #[test]
    fn input_layer_accepts_matching_vector() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut l = NeuronLayer::new(0, 3, 0, Cost::Quadratic, &mut rng);

        l.set_input(&array![0.1, 0.2, 0.3]).unwrap();
        assert_eq!(l.values(), array![0.1, 0.2, 0.3]);
    }

    #[test]
    fn set_input_rejects_non_input_layer() {
        let mut l = computed_layer(2, 2);
        let res = l.set_input(&array![0.0, 0.0]);
        assert!(matches!(res, Err(NetError::NotInputLayer)));
    }

    #[test]
    fn set_input_rejects_length_mismatch() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut l = NeuronLayer::new(0, 3, 0, Cost::Quadratic, &mut rng);

        let res = l.set_input(&array![1.0, 2.0]);
        assert!(matches!(
            res,
            Err(NetError::SizeMismatch {
                expected: 3,
                got: 2
            })
        ));
    }

    #[test]
    fn cost_sums_per_neuron_errors() {
        let mut l = computed_layer(2, 1);
        l.neurons[0].value = 1.0;
        l.neurons[1].value = 0.0;

        let c = l.cost(&array![0.0, 0.0]).unwrap();
        assert!((c - 1.0).abs() < 1e-12);
    }

    #[test]
    fn apply_updates_accumulates() {
        let mut l = computed_layer(1, 2);
        l.neurons[0].weights = array![0.5, 0.5];
        l.neurons[0].bias = 0.25;

        l.apply_updates(&[array![0.1, -0.2]], &[0.0]).unwrap();

        assert!((l.neurons[0].weights[0] - 0.6).abs() < 1e-12);
        assert!((l.neurons[0].weights[1] - 0.3).abs() < 1e-12);
        assert!((l.neurons[0].bias - 0.25).abs() < 1e-12);
    }

    #[test]
    fn apply_updates_rejects_bad_shapes_without_mutating() {
        let mut l = computed_layer(2, 2);
        let before: Vec<DataVec> = l.neurons.iter().map(|n| n.weights.clone()).collect();

        // wrong neuron count
        let res = l.apply_updates(&[array![0.1, 0.1]], &[0.0]);
        assert!(matches!(res, Err(NetError::SizeMismatch { .. })));

        // wrong per-neuron width
        let res = l.apply_updates(&[array![0.1], array![0.1, 0.1]], &[0.0, 0.0]);
        assert!(matches!(res, Err(NetError::SizeMismatch { .. })));

        for (neuron, w) in l.neurons.iter().zip(before.iter()) {
            assert_eq!(&neuron.weights, w);
        }
    }
}
