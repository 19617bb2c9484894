use ndarray_rand::rand::rngs::SmallRng;
use ndarray_rand::rand_distr::{Distribution, Uniform};
use ndarray_rand::RandomExt;
use serde::{Deserialize, Serialize};

use crate::activation::sigmoid;
use crate::util::{DataVec, Float};

/// A single scalar unit of the network.
///
/// Input neurons carry only a value; computed neurons additionally own one
/// weight per parent-layer neuron (index-aligned) and a bias. Parent values
/// are passed in at activation time, the neuron stores no references.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Neuron {
    pub index: usize,
    pub is_input: bool,
    pub value: Float,
    letter: char,
    pub weights: DataVec,
    pub bias: Float,
}

impl Neuron {
    pub fn new_input(index: usize, letter: char) -> Self {
        Self {
            index,
            is_input: true,
            value: 0.0,
            letter,
            weights: DataVec::zeros(0),
            bias: 0.0,
        }
    }

    /// Weights and bias are drawn from Uniform[0, 1).
    pub fn new(index: usize, letter: char, parent_count: usize, rng: &mut SmallRng) -> Self {
        Self {
            index,
            is_input: false,
            value: 0.0,
            letter,
            weights: DataVec::random_using(parent_count, Uniform::new(0.0, 1.0), rng),
            bias: Uniform::new(0.0, 1.0).sample(rng),
        }
    }

    /// Sum of parent activations times connection weights, plus bias.
    /// Parent values must already be current.
    pub fn weighted_input(&self, parent_values: &DataVec) -> Float {
        self.weights.dot(parent_values) + self.bias
    }

    pub fn activate(&mut self, parent_values: &DataVec) {
        debug_assert!(!self.is_input, "input neurons receive values directly");
        self.value = sigmoid(self.weighted_input(parent_values));
    }

    /// Display label, layer letter plus index ("A0", "B3", ...).
    pub fn label(&self) -> String {
        format!("{}{}", self.letter, self.index)
    }
}
