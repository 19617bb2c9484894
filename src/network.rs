use std::error::Error;
use std::fmt;
use std::fs;
use std::fs::File;
use std::io::Write;

use log::{debug, info};
use ndarray_rand::rand::rngs::SmallRng;
use ndarray_rand::rand::SeedableRng;
use ndarray_stats::QuantileExt;
use serde::{Deserialize, Serialize};

use crate::activation::sigmoid_prime;
use crate::cost::Cost;
use crate::err::NetError;
use crate::layer::NeuronLayer;
use crate::util::{DataVec, Float};

pub const DEFAULT_LEARN_RATE: Float = 1e-6;

/// Per-layer weight deltas, outermost index runs output layer -> first
/// hidden layer (the order they are computed in).
pub type WeightUpdates = Vec<Vec<DataVec>>;
pub type BiasUpdates = Vec<Vec<Float>>;

/// Shape of a network on disk: layer sizes plus cost variant.
#[derive(Serialize, Deserialize)]
pub struct NetworkCfg {
    pub size: Vec<usize>,
    pub cost: Cost,
}

/// Fully-connected feed-forward network of scalar neurons.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LayerNetwork {
    pub size: Vec<usize>,
    pub layers: Vec<NeuronLayer>,
    pub cost: Cost,
}

impl LayerNetwork {
    pub fn new(size: Vec<usize>, cost: Cost) -> Result<Self, NetError> {
        Self::with_rng(size, cost, &mut SmallRng::from_entropy())
    }

    /// Reproducible construction: the seed fully determines every weight
    /// and bias (neurons are initialized in layer, then index order).
    pub fn new_seeded(size: Vec<usize>, cost: Cost, seed: u64) -> Result<Self, NetError> {
        Self::with_rng(size, cost, &mut SmallRng::seed_from_u64(seed))
    }

    pub fn with_rng(size: Vec<usize>, cost: Cost, rng: &mut SmallRng) -> Result<Self, NetError> {
        if size.is_empty() {
            return Err(NetError::InvalidCfg(
                "network needs at least one layer".to_owned(),
            ));
        }

        if size.iter().any(|s| *s == 0) {
            return Err(NetError::InvalidCfg(
                "layer sizes must be positive".to_owned(),
            ));
        }

        let mut layers = Vec::with_capacity(size.len());

        for (index, layer_size) in size.iter().enumerate() {
            let parent_count = if index == 0 { 0 } else { size[index - 1] };
            layers.push(NeuronLayer::new(index, *layer_size, parent_count, cost, rng));
        }

        Ok(Self { size, layers, cost })
    }

    /// Sets the input layer and activates every subsequent layer strictly
    /// in depth order; layer k reads layer k-1's already-updated values.
    pub fn feed_input(&mut self, input: &DataVec) -> Result<(), NetError> {
        self.layers[0].set_input(input)?;

        for k in 1..self.layers.len() {
            debug!("layer {} is updating values", k);
            let parent_values = self.layers[k - 1].values();
            self.layers[k].activate_all(&parent_values);
        }

        Ok(())
    }

    /// Current values of the output layer.
    pub fn output(&self) -> DataVec {
        self.layers[self.layers.len() - 1].values()
    }

    pub fn evaluate_cost(&self, expected: &DataVec) -> Result<Float, NetError> {
        self.layers[self.layers.len() - 1].cost(expected)
    }

    /// Runs a forward pass and returns the predicted class index with its
    /// confidence (the maximal output value).
    pub fn classify(&mut self, input: &DataVec) -> Result<(usize, Float), NetError> {
        self.feed_input(input)?;
        let out = self.output();

        let pos = out
            .argmax()
            .map_err(|_| NetError::InvalidCfg("empty output layer".to_owned()))?;

        Ok((pos, out[pos]))
    }

    /// Computes per-layer weight and bias deltas, already scaled by the
    /// learning rate, processed from the output layer back to the first
    /// hidden layer.
    ///
    /// For the output layer each error term is
    /// `sigmoid_prime(parent.value) * cost'(neuron.value, expected[neuron])`
    /// and is retained per neuron, keyed by parent index. For a hidden layer
    /// the successor layer's retained terms are summed at this neuron's
    /// index position and the weight delta is `-a * sum * neuron.value`,
    /// independent of which parent the connection comes from. Bias deltas
    /// are always zero: bias training is disabled, so biases never drift
    /// from their initial values.
    pub fn gradient(
        &self,
        expected: &DataVec,
        learn_rate: Float,
    ) -> Result<(WeightUpdates, BiasUpdates), NetError> {
        let depth = self.layers.len();
        let last = depth - 1;

        if expected.len() != self.size[last] {
            return Err(NetError::SizeMismatch {
                expected: self.size[last],
                got: expected.len(),
            });
        }

        let mut weight_updates: WeightUpdates = Vec::with_capacity(depth - 1);
        let mut errors: Vec<Vec<DataVec>> = Vec::with_capacity(depth - 1);

        for layer_idx in (1..depth).rev() {
            let layer = &self.layers[layer_idx];
            let parent = &self.layers[layer_idx - 1];

            let mut layer_errors = Vec::with_capacity(layer.len());
            let mut layer_weights = Vec::with_capacity(layer.len());

            for neuron in &layer.neurons {
                let mut errs = DataVec::zeros(parent.len());
                let mut deltas = DataVec::zeros(parent.len());

                for prev_neuron in &parent.neurons {
                    if layer_idx == last {
                        let d_n = sigmoid_prime(prev_neuron.value)
                            * self.cost.derivative(neuron.value, expected[neuron.index])?;

                        errs[prev_neuron.index] = d_n;
                        deltas[prev_neuron.index] = -learn_rate * d_n;
                    } else {
                        // retained terms of the layer processed just before
                        // this one, i.e. the successor layer
                        let next_layer = &errors[depth - layer_idx - 2];
                        let next_sum: Float = next_layer
                            .iter()
                            .map(|next_neuron| next_neuron[neuron.index])
                            .sum();

                        let d_n = sigmoid_prime(prev_neuron.value)
                            * next_sum
                            * neuron.weights[prev_neuron.index];

                        errs[prev_neuron.index] = d_n;
                        deltas[prev_neuron.index] = -learn_rate * next_sum * neuron.value;
                    }
                }

                layer_errors.push(errs);
                layer_weights.push(deltas);
            }

            errors.push(layer_errors);
            weight_updates.push(layer_weights);
        }

        let mut bias_updates: BiasUpdates = Vec::with_capacity(depth - 1);
        for layer in self.layers[1..].iter().rev() {
            bias_updates.push(vec![0.0; layer.len()]);
        }

        Ok((weight_updates, bias_updates))
    }

    pub fn backprop(&mut self, expected: &DataVec) -> Result<(), NetError> {
        self.backprop_with_rate(expected, DEFAULT_LEARN_RATE)
    }

    /// Reports the current cost, computes the delta matrices and applies
    /// them layer by layer, first hidden layer to output layer (the reverse
    /// of the computation order).
    pub fn backprop_with_rate(
        &mut self,
        expected: &DataVec,
        learn_rate: Float,
    ) -> Result<(), NetError> {
        info!("cost : {}", self.evaluate_cost(expected)?);

        let (weight_updates, bias_updates) = self.gradient(expected, learn_rate)?;

        for ((w_deltas, b_deltas), layer) in weight_updates
            .iter()
            .rev()
            .zip(bias_updates.iter().rev())
            .zip(self.layers[1..].iter_mut())
        {
            layer.apply_updates(w_deltas, b_deltas)?;
        }

        Ok(())
    }

    /// One training example: forward pass, then (when an expected vector is
    /// supplied) a backprop update. Returns the output observed before the
    /// update.
    pub fn train_step(
        &mut self,
        input: &DataVec,
        expected: Option<&DataVec>,
    ) -> Result<DataVec, NetError> {
        self.train_step_with_rate(input, expected, DEFAULT_LEARN_RATE)
    }

    pub fn train_step_with_rate(
        &mut self,
        input: &DataVec,
        expected: Option<&DataVec>,
        learn_rate: Float,
    ) -> Result<DataVec, NetError> {
        self.feed_input(input)?;
        let out = self.output();

        if let Some(expected) = expected {
            self.backprop_with_rate(expected, learn_rate)?;
        }

        Ok(out)
    }

    /// Whole-object state snapshot: layer sizes and every neuron's
    /// weights, bias and value go to disk and come back unchanged.
    pub fn save_state(&self, filepath: &str) -> Result<(), Box<dyn Error>> {
        let file = File::create(filepath)?;
        serde_json::to_writer(file, self)?;
        Ok(())
    }

    pub fn from_state_file(filepath: &str) -> Result<Self, Box<dyn Error>> {
        let buf = fs::read(filepath)?;
        let net: LayerNetwork = serde_json::from_slice(&buf)?;
        Ok(net)
    }

    pub fn save_cfg(&self, filepath: &str) -> Result<(), Box<dyn Error>> {
        let cfg = NetworkCfg {
            size: self.size.clone(),
            cost: self.cost,
        };

        let yaml_str = serde_yaml::to_string(&cfg)?;

        let mut output = File::create(filepath)?;
        output.write_all(yaml_str.as_bytes())?;

        Ok(())
    }

    /// Builds a freshly initialized network of the configured shape.
    pub fn from_cfg_file(filepath: &str) -> Result<Self, Box<dyn Error>> {
        let cfg_file = File::open(filepath)?;
        let cfg: NetworkCfg = serde_yaml::from_reader(cfg_file)?;
        Ok(LayerNetwork::new(cfg.size, cfg.cost)?)
    }
}

impl fmt::Display for LayerNetwork {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut out = String::new();

        for s in &self.size {
            out += s.to_string().as_str();
            out += "-";
        }

        write!(f, "{}", &out.as_str()[0..out.len() - 1])
    }
}
