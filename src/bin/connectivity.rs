use std::error::Error;

use log::info;
use neurosweep::{
    context::SimulationContext,
    params::{ConnectionParams, SimulationParams},
    synapse,
};
use serde_json::json;

const NUM_NEURONS: usize = 10;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let mut ctx = SimulationContext::new(&SimulationParams::default())?;

    let connection_params = ConnectionParams {
        connect_density: 0.2,
        allow_self_innervation: false,
        ..ConnectionParams::default()
    };

    let synapse_states =
        synapse::connect(&mut ctx, NUM_NEURONS, NUM_NEURONS, true, &connection_params)?;

    info!(
        "{} of {} possible connections drawn",
        synapse_states.len(),
        NUM_NEURONS * (NUM_NEURONS - 1)
    );

    let edges: Vec<[usize; 2]> = synapse_states
        .iter()
        .map(|state| [state.pre_syn_idx, state.post_syn_nid])
        .collect();

    let output = json!({
        "num_neurons": NUM_NEURONS,
        "connect_density": connection_params.connect_density,
        "edges": edges,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
