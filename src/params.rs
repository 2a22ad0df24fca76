use serde::{Deserialize, Serialize};
use simple_error::{try_with, SimpleError, SimpleResult};

use crate::util;

/// Upper bound for refractory periods and conduction delays, in clock steps.
pub const MAX_TICK_SPAN: usize = 1_000_000;

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioParams {
    pub simulation_params: SimulationParams,
    pub stimulus_params: StimulusParams,
    pub neuron_params: NeuronParams,
    pub connection_params: ConnectionParams,
    pub sweep_params: SweepParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Clock step in ms.
    pub dt: f64,
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StimulusParams {
    pub num_channels: usize,
    /// Firing rate per channel in Hz.
    pub rate: f64,
    /// Length of the frozen stimulus in ms.
    pub duration: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeuronParams {
    /// Membrane time constant in ms.
    pub tau_membrane: f32,
    pub threshold: f32,
    pub reset_voltage: f32,
    /// In clock steps. Zero disables refractoriness.
    pub refractory_period: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionParams {
    pub weight: f32,
    pub connect_density: f64,
    pub allow_self_innervation: bool,
    /// In clock steps.
    pub conduction_delay: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweptParameter {
    TauMembrane,
    Threshold,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepParams {
    pub parameter: SweptParameter,
    pub start: f32,
    pub stop: f32,
    pub num_values: usize,
    /// Simulated time per trial in ms.
    pub duration: f64,
}

impl SweepParams {
    pub fn values(&self) -> Vec<f32> {
        util::linspace(self.start, self.stop, self.num_values)
    }
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self { dt: 0.1, seed: 0 }
    }
}

impl Default for StimulusParams {
    fn default() -> Self {
        Self {
            num_channels: 100,
            rate: 10.0,
            duration: 1000.0,
        }
    }
}

impl Default for NeuronParams {
    fn default() -> Self {
        Self {
            tau_membrane: 10.0,
            threshold: 1.0,
            reset_voltage: 0.0,
            refractory_period: 0,
        }
    }
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            weight: 0.1,
            connect_density: 1.0,
            allow_self_innervation: true,
            conduction_delay: 0,
        }
    }
}

impl Default for SweepParams {
    fn default() -> Self {
        Self {
            parameter: SweptParameter::TauMembrane,
            start: 1.0,
            stop: 10.0,
            num_values: 30,
            duration: 1000.0,
        }
    }
}

pub fn scenario_params_from_yaml(yaml_str: &str) -> SimpleResult<ScenarioParams> {
    let params: ScenarioParams = try_with!(
        serde_yaml::from_str(yaml_str),
        "unable to parse scenario parameters"
    );

    validate_scenario_params(&params)?;

    Ok(params)
}

pub fn validate_scenario_params(params: &ScenarioParams) -> Result<(), SimpleError> {
    validate_simulation_params(&params.simulation_params)?;
    validate_stimulus_params(&params.stimulus_params, params.simulation_params.dt)?;
    validate_neuron_params(&params.neuron_params)?;
    validate_connection_params(&params.connection_params)?;
    validate_sweep_params(&params.sweep_params, &params.neuron_params)?;

    Ok(())
}

pub fn validate_simulation_params(simulation_params: &SimulationParams) -> Result<(), SimpleError> {
    if !simulation_params.dt.is_finite() || simulation_params.dt <= 0.0 {
        return Err(SimpleError::new("dt must be strictly positive"));
    }

    Ok(())
}

pub fn validate_stimulus_params(
    stimulus_params: &StimulusParams,
    dt: f64,
) -> Result<(), SimpleError> {
    if stimulus_params.num_channels == 0 {
        return Err(SimpleError::new("num_channels must be strictly positive"));
    }

    if !stimulus_params.rate.is_finite() || stimulus_params.rate < 0.0 {
        return Err(SimpleError::new("rate must not be negative"));
    }

    if stimulus_params.rate * dt / 1000.0 > 1.0 {
        return Err(SimpleError::new(
            "rate must not exceed one spike per clock step",
        ));
    }

    if !stimulus_params.duration.is_finite() || stimulus_params.duration <= 0.0 {
        return Err(SimpleError::new(
            "stimulus duration must be strictly positive",
        ));
    }

    Ok(())
}

pub fn validate_neuron_params(neuron_params: &NeuronParams) -> Result<(), SimpleError> {
    validate_tau_membrane(neuron_params.tau_membrane)?;

    if !neuron_params.threshold.is_finite() || neuron_params.threshold <= 0.0 {
        return Err(SimpleError::new("threshold must be strictly positive"));
    }

    if !neuron_params.reset_voltage.is_finite()
        || neuron_params.reset_voltage >= neuron_params.threshold
    {
        return Err(SimpleError::new("reset_voltage must be less than threshold"));
    }

    validate_tick_span("refractory_period", neuron_params.refractory_period)?;

    Ok(())
}

pub fn validate_connection_params(
    connection_params: &ConnectionParams,
) -> Result<(), SimpleError> {
    if !connection_params.weight.is_finite() {
        return Err(SimpleError::new("weight must be finite"));
    }

    if !connection_params.connect_density.is_finite()
        || connection_params.connect_density <= 0.0
        || connection_params.connect_density > 1.0
    {
        return Err(SimpleError::new("connect_density must be in (0, 1]"));
    }

    validate_tick_span("conduction_delay", connection_params.conduction_delay)?;

    Ok(())
}

pub fn validate_tick_span(name: &str, ticks: usize) -> Result<(), SimpleError> {
    if ticks > MAX_TICK_SPAN {
        return Err(SimpleError::new(format!(
            "{} must not exceed {} clock steps",
            name, MAX_TICK_SPAN
        )));
    }

    Ok(())
}

pub fn validate_sweep_params(
    sweep_params: &SweepParams,
    neuron_params: &NeuronParams,
) -> Result<(), SimpleError> {
    if sweep_params.num_values == 0 {
        return Err(SimpleError::new("sweep range must not be empty"));
    }

    if !sweep_params.duration.is_finite() || sweep_params.duration <= 0.0 {
        return Err(SimpleError::new("sweep duration must be strictly positive"));
    }

    for value in sweep_params.values() {
        validate_parameter_value(sweep_params.parameter, value, neuron_params)?;
    }

    Ok(())
}

pub fn validate_parameter_value(
    parameter: SweptParameter,
    value: f32,
    neuron_params: &NeuronParams,
) -> Result<(), SimpleError> {
    match parameter {
        SweptParameter::TauMembrane => validate_tau_membrane(value),
        SweptParameter::Threshold => {
            if !value.is_finite() || value <= 0.0 || value <= neuron_params.reset_voltage {
                Err(SimpleError::new(format!(
                    "threshold {} must be strictly positive and greater than reset_voltage",
                    value
                )))
            } else {
                Ok(())
            }
        }
    }
}

fn validate_tau_membrane(tau_membrane: f32) -> Result<(), SimpleError> {
    if !tau_membrane.is_finite() || tau_membrane <= 0.0 {
        return Err(SimpleError::new("tau_membrane must be strictly positive"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::util::test_util;

    #[test]
    fn valid_params() {
        let params = test_util::get_template_scenario_params();
        assert!(validate_scenario_params(&params).is_ok());
    }

    #[test]
    fn zero_dt() {
        let mut params = test_util::get_template_scenario_params();
        params.simulation_params.dt = 0.0;
        let result = validate_scenario_params(&params);

        assert!(result.is_err());

        assert_eq!(result.unwrap_err().as_str(), "dt must be strictly positive");
    }

    #[test]
    fn zero_num_channels() {
        let mut params = test_util::get_template_scenario_params();
        params.stimulus_params.num_channels = 0;
        let result = validate_scenario_params(&params);

        assert!(result.is_err());

        assert_eq!(
            result.unwrap_err().as_str(),
            "num_channels must be strictly positive"
        );
    }

    #[test]
    fn negative_rate() {
        let mut params = test_util::get_template_scenario_params();
        params.stimulus_params.rate = -1.0;
        let result = validate_scenario_params(&params);

        assert!(result.is_err());

        assert_eq!(result.unwrap_err().as_str(), "rate must not be negative");
    }

    #[test]
    fn too_high_rate() {
        let mut params = test_util::get_template_scenario_params();
        params.stimulus_params.rate = 20000.0;
        let result = validate_scenario_params(&params);

        assert!(result.is_err());

        assert_eq!(
            result.unwrap_err().as_str(),
            "rate must not exceed one spike per clock step"
        );
    }

    #[test]
    fn zero_stimulus_duration() {
        let mut params = test_util::get_template_scenario_params();
        params.stimulus_params.duration = 0.0;
        let result = validate_scenario_params(&params);

        assert!(result.is_err());

        assert_eq!(
            result.unwrap_err().as_str(),
            "stimulus duration must be strictly positive"
        );
    }

    #[test]
    fn zero_tau_membrane() {
        let mut params = test_util::get_template_scenario_params();
        params.neuron_params.tau_membrane = 0.0;
        let result = validate_scenario_params(&params);

        assert!(result.is_err());

        assert_eq!(
            result.unwrap_err().as_str(),
            "tau_membrane must be strictly positive"
        );
    }

    #[test]
    fn negative_threshold() {
        let mut params = test_util::get_template_scenario_params();
        params.neuron_params.threshold = -0.5;
        params.neuron_params.reset_voltage = -1.0;
        let result = validate_scenario_params(&params);

        assert!(result.is_err());

        assert_eq!(
            result.unwrap_err().as_str(),
            "threshold must be strictly positive"
        );
    }

    #[test]
    fn reset_voltage_not_below_threshold() {
        let mut params = test_util::get_template_scenario_params();
        params.neuron_params.reset_voltage = 1.0;
        let result = validate_scenario_params(&params);

        assert!(result.is_err());

        assert_eq!(
            result.unwrap_err().as_str(),
            "reset_voltage must be less than threshold"
        );
    }

    #[test]
    fn infinite_weight() {
        let mut params = test_util::get_template_scenario_params();
        params.connection_params.weight = f32::INFINITY;
        let result = validate_scenario_params(&params);

        assert!(result.is_err());

        assert_eq!(result.unwrap_err().as_str(), "weight must be finite");
    }

    #[test]
    fn zero_connect_density() {
        let mut params = test_util::get_template_scenario_params();
        params.connection_params.connect_density = 0.0;
        let result = validate_scenario_params(&params);

        assert!(result.is_err());

        assert_eq!(
            result.unwrap_err().as_str(),
            "connect_density must be in (0, 1]"
        );
    }

    #[test]
    fn too_high_connect_density() {
        let mut params = test_util::get_template_scenario_params();
        params.connection_params.connect_density = 1.1;
        let result = validate_scenario_params(&params);

        assert!(result.is_err());

        assert_eq!(
            result.unwrap_err().as_str(),
            "connect_density must be in (0, 1]"
        );
    }

    #[test]
    fn nan_connect_density() {
        let mut params = test_util::get_template_scenario_params();
        params.connection_params.connect_density = f64::NAN;
        let result = validate_scenario_params(&params);

        assert_eq!(
            result.unwrap_err().as_str(),
            "connect_density must be in (0, 1]"
        );
    }

    #[test]
    fn huge_refractory_period() {
        let mut params = test_util::get_template_scenario_params();
        params.neuron_params.refractory_period = usize::MAX;
        let result = validate_scenario_params(&params);

        assert_eq!(
            result.unwrap_err().as_str(),
            "refractory_period must not exceed 1000000 clock steps"
        );

        params.neuron_params.refractory_period = MAX_TICK_SPAN;
        assert!(validate_scenario_params(&params).is_ok());
    }

    #[test]
    fn huge_conduction_delay() {
        let mut params = test_util::get_template_scenario_params();
        params.connection_params.conduction_delay = MAX_TICK_SPAN + 1;
        let result = validate_scenario_params(&params);

        assert_eq!(
            result.unwrap_err().as_str(),
            "conduction_delay must not exceed 1000000 clock steps"
        );
    }

    #[test]
    fn huge_refractory_period_from_yaml() {
        let yaml = serde_yaml::to_string(&test_util::get_template_scenario_params())
            .unwrap()
            .replace("refractory_period: 0", "refractory_period: 18446744073709551615");

        let result = scenario_params_from_yaml(&yaml);
        assert_eq!(
            result.unwrap_err().as_str(),
            "refractory_period must not exceed 1000000 clock steps"
        );
    }

    #[test]
    fn empty_sweep_range() {
        let mut params = test_util::get_template_scenario_params();
        params.sweep_params.num_values = 0;
        let result = validate_scenario_params(&params);

        assert!(result.is_err());

        assert_eq!(
            result.unwrap_err().as_str(),
            "sweep range must not be empty"
        );
    }

    #[test]
    fn negative_sweep_duration() {
        let mut params = test_util::get_template_scenario_params();
        params.sweep_params.duration = -1.0;
        let result = validate_scenario_params(&params);

        assert!(result.is_err());

        assert_eq!(
            result.unwrap_err().as_str(),
            "sweep duration must be strictly positive"
        );
    }

    #[test]
    fn sweep_range_crossing_zero_tau() {
        let mut params = test_util::get_template_scenario_params();
        params.sweep_params.start = -1.0;
        let result = validate_scenario_params(&params);

        assert!(result.is_err());

        assert_eq!(
            result.unwrap_err().as_str(),
            "tau_membrane must be strictly positive"
        );
    }

    #[test]
    fn threshold_sweep_below_reset() {
        let mut params = test_util::get_template_scenario_params();
        params.sweep_params.parameter = SweptParameter::Threshold;
        params.sweep_params.start = 0.0;
        params.sweep_params.stop = 2.0;
        let result = validate_scenario_params(&params);

        assert!(result.is_err());

        assert_eq!(
            result.unwrap_err().as_str(),
            "threshold 0 must be strictly positive and greater than reset_voltage"
        );
    }

    #[test]
    fn default_sweep_values() {
        let values = SweepParams::default().values();
        assert_eq!(values.len(), 30);
        assert_eq!(values[0], 1.0);
        assert_eq!(values[29], 10.0);
    }

    #[test]
    fn yaml_round_trip() {
        let yaml = r#"
simulation_params:
  dt: 0.5
  seed: 7
stimulus_params:
  num_channels: 20
  rate: 5.0
  duration: 200.0
neuron_params:
  tau_membrane: 4.0
  threshold: 1.0
  reset_voltage: 0.0
  refractory_period: 2
connection_params:
  weight: 0.2
  connect_density: 0.5
  allow_self_innervation: false
  conduction_delay: 1
sweep_params:
  parameter: Threshold
  start: 0.5
  stop: 1.5
  num_values: 3
  duration: 200.0
"#;
        let params = scenario_params_from_yaml(yaml).unwrap();
        assert_eq!(params.simulation_params.seed, 7);
        assert_eq!(params.stimulus_params.num_channels, 20);
        assert_eq!(params.neuron_params.refractory_period, 2);
        assert!(!params.connection_params.allow_self_innervation);
        assert_eq!(params.sweep_params.parameter, SweptParameter::Threshold);
        assert_eq!(params.sweep_params.values(), vec![0.5, 1.0, 1.5]);
    }

    #[test]
    fn malformed_yaml() {
        let result = scenario_params_from_yaml("simulation_params: [");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .as_str()
            .starts_with("unable to parse scenario parameters"));
    }
}
