use rand::{distributions::Bernoulli, prelude::Distribution};
use simple_error::{try_with, SimpleResult};

use crate::{
    context::SimulationContext,
    params::{self, ConnectionParams},
    state_snapshot::SynapseState,
};

#[derive(Debug, Clone)]
pub struct Synapse {
    pub neuron_idx: usize,
    pub conduction_delay: usize,
    pub weight: f32,
}

impl Synapse {
    pub fn new(neuron_idx: usize, conduction_delay: usize, weight: f32) -> Self {
        Self {
            neuron_idx,
            conduction_delay,
            weight,
        }
    }

    pub fn from_state(state: &SynapseState) -> Self {
        Self::new(state.post_syn_nid, state.conduction_delay, state.weight)
    }

    pub fn to_state(&self, pre_syn_idx: usize) -> SynapseState {
        SynapseState {
            pre_syn_idx,
            post_syn_nid: self.neuron_idx,
            conduction_delay: self.conduction_delay,
            weight: self.weight,
        }
    }

    pub fn process_pre_syn_spike_get_psp(&self) -> f32 {
        self.weight
    }
}

/// Applies the connection rule between `num_pre` sources and `num_post`
/// targets. For a recurrent projection source and target index refer to the
/// same neuron, which is skipped unless self-innervation is allowed.
pub fn connect(
    ctx: &mut SimulationContext,
    num_pre: usize,
    num_post: usize,
    recurrent: bool,
    connection_params: &ConnectionParams,
) -> SimpleResult<Vec<SynapseState>> {
    try_with!(
        params::validate_connection_params(connection_params),
        "invalid connection parameters"
    );

    let connect_dist = try_with!(
        Bernoulli::new(connection_params.connect_density),
        "invalid connect density"
    );

    let mut synapse_states = Vec::new();

    for pre_syn_idx in 0..num_pre {
        for post_syn_nid in 0..num_post {
            if recurrent && pre_syn_idx == post_syn_nid && !connection_params.allow_self_innervation
            {
                continue;
            }

            if connect_dist.sample(ctx.rng()) {
                synapse_states.push(SynapseState {
                    pre_syn_idx,
                    post_syn_nid,
                    conduction_delay: connection_params.conduction_delay,
                    weight: connection_params.weight,
                });
            }
        }
    }

    Ok(synapse_states)
}
