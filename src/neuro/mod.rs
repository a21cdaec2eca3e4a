pub mod circuit;
pub mod loader;
pub mod neuron;
pub mod stimuli;
