use serde::{Deserialize, Serialize};

use crate::{spike_train::Spike, types::Tick};

/// Complete mutable state of a [`Network`](crate::network::Network) at one tick.
///
/// Plain value record: it shares nothing with the live network, so restoring it
/// any number of times yields the same state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub t: Tick,
    pub neuron_states: Vec<NeuronState>,
    pub neuron_indexes_to_check: Vec<usize>,
    pub synapse_states: Vec<SynapseState>,
    pub pending_transmissions: Vec<PendingTransmission>,
    pub stimulus_cursor: usize,
    pub recorded_spikes: Vec<Spike>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuronState {
    pub voltage: f32,
    /// Last update tick. Lies in the future while the neuron is refractory.
    pub last_t: Tick,
    pub tau_membrane: f32,
    pub threshold: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynapseState {
    pub pre_syn_idx: usize,
    pub post_syn_nid: usize,
    pub conduction_delay: usize,
    pub weight: f32,
}

/// A transmission scheduled `offset` ticks after the snapshot tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingTransmission {
    pub offset: usize,
    pub post_syn_nid: usize,
    pub psp: f32,
}
