pub mod context;
pub mod network;
pub mod params;
pub mod recorder;
pub mod spike_train;
pub mod state_snapshot;
pub mod sweep;
pub mod synapse;

mod neuron;
mod spike_generator;
mod transmission_buffer;
mod types;
mod util;
