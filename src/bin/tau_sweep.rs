use std::{env, error::Error, fs};

use log::{info, warn};
use neurosweep::{
    context::SimulationContext,
    params::{self, ScenarioParams},
    spike_train,
    sweep::{self, SweepInput, SweepSetup, SweepStrategy},
};
use serde_json::json;

#[path = "../scenario_params.rs"]
mod scenario_params;

fn load_scenario_params() -> Result<ScenarioParams, Box<dyn Error>> {
    match env::args().nth(1) {
        Some(path) => {
            info!("loading scenario from {}", path);
            let yaml_str = fs::read_to_string(&path)?;
            Ok(params::scenario_params_from_yaml(&yaml_str)?)
        }
        None => Ok(scenario_params::get_scenario_params()?),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let scenario_params = load_scenario_params()?;
    let setup = SweepSetup::from_scenario_params(&scenario_params);

    let mut ctx = SimulationContext::new(&scenario_params.simulation_params)?;
    let stimulus = spike_train::generate_poisson(&mut ctx, &scenario_params.stimulus_params)?;

    info!(
        "stimulus: {} spikes on {} channels, mean rate {:.2} Hz",
        stimulus.num_spikes(),
        stimulus.num_channels(),
        stimulus.mean_rate()
    );

    let input = SweepInput::draw(&mut ctx, stimulus, &scenario_params.connection_params)?;

    let snapshot_result =
        sweep::run_sweep(&ctx, SweepStrategy::SnapshotRestore, &input, &setup)?;
    let ensemble_result = sweep::run_sweep(&ctx, SweepStrategy::Ensemble, &input, &setup)?;

    let strategies_agree = snapshot_result.spike_counts() == ensemble_result.spike_counts();
    if !strategies_agree {
        warn!("snapshot and ensemble sweeps disagree on spike counts");
    }

    let output = json!({
        "stimulus": {
            "num_channels": input.stimulus.num_channels(),
            "num_spikes": input.stimulus.num_spikes(),
            "mean_rate": input.stimulus.mean_rate(),
            "num_connected_channels": input.input_synapses.len(),
        },
        "strategies_agree": strategies_agree,
        "results": [snapshot_result, ensemble_result],
    });

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
