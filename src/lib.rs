pub mod activation;
pub mod cost;
pub mod dataloader;
pub mod err;
pub mod layer;
pub mod network;
pub mod neuron;
pub mod render;
pub mod util;

pub mod prelude {
    pub use crate::cost::Cost;
    pub use crate::dataloader::{load_json_dataset, DataLoader, LabeledEntry, SimpleDataLoader};
    pub use crate::err::NetError;
    pub use crate::layer::NeuronLayer;
    pub use crate::network::{LayerNetwork, DEFAULT_LEARN_RATE};
    pub use crate::neuron::Neuron;
    pub use crate::render::GraphSpec;
    pub use crate::util::{DataVec, Float};
}
