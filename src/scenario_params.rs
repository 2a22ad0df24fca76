use neurosweep::params::{self, ScenarioParams};
use simple_error::SimpleResult;

/// 100 Poisson inputs at 10 Hz onto LIF neurons, membrane time constant swept
/// over 30 values from 1 to 10 ms for 1 s each.
pub fn get_scenario_params() -> SimpleResult<ScenarioParams> {
    let params_yaml_str = r#"
simulation_params:
  dt: 0.1
  seed: 0
stimulus_params:
  num_channels: 100
  rate: 10.0
  duration: 1000.0
neuron_params:
  tau_membrane: 10.0
  threshold: 1.0
  reset_voltage: 0.0
  refractory_period: 0
connection_params:
  weight: 0.1
  connect_density: 1.0
  allow_self_innervation: true
  conduction_delay: 0
sweep_params:
  parameter: TauMembrane
  start: 1.0
  stop: 10.0
  num_values: 30
  duration: 1000.0
"#;

    params::scenario_params_from_yaml(params_yaml_str)
}
