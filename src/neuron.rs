use crate::{
    params::{NeuronParams, SweptParameter},
    state_snapshot::NeuronState,
    types::Tick,
    util::get_decay_factor,
};

/// Leaky integrate-and-fire neuron following `dv/dt = -v / tau_membrane`.
///
/// The voltage is only materialized when the neuron is touched; in between it
/// decays in closed form from `last_voltage` at `last_t`.
#[derive(Debug, Clone)]
pub struct Neuron {
    last_t: Tick,
    last_voltage: f32,
    tau_membrane: f32,
    threshold: f32,
}

impl Neuron {
    pub fn new(neuron_params: &NeuronParams) -> Self {
        Self {
            last_t: 0,
            last_voltage: 0.0,
            tau_membrane: neuron_params.tau_membrane,
            threshold: neuron_params.threshold,
        }
    }

    pub fn from_state(state: &NeuronState) -> Self {
        Self {
            last_t: state.last_t,
            last_voltage: state.voltage,
            tau_membrane: state.tau_membrane,
            threshold: state.threshold,
        }
    }

    pub fn to_state(&self) -> NeuronState {
        NeuronState {
            voltage: self.last_voltage,
            last_t: self.last_t,
            tau_membrane: self.tau_membrane,
            threshold: self.threshold,
        }
    }

    pub fn get_parameter(&self, parameter: SweptParameter) -> f32 {
        match parameter {
            SweptParameter::TauMembrane => self.tau_membrane,
            SweptParameter::Threshold => self.threshold,
        }
    }

    /// Changes a parameter slot at `t`. The voltage decays with the old time
    /// constant up to `t` and with the new one afterwards.
    pub fn set_parameter(&mut self, t: Tick, dt: f64, parameter: SweptParameter, value: f32) {
        if !self.is_refractory(t) {
            self.last_voltage = self.get_voltage(t, dt);
            self.last_t = t;
        }

        match parameter {
            SweptParameter::TauMembrane => self.tau_membrane = value,
            SweptParameter::Threshold => self.threshold = value,
        }
    }

    /// Adds `psp` to the voltage. Returns whether the psp was applied, in which
    /// case the neuron has to be checked for a spike on the next tick.
    pub fn apply_psp(&mut self, t: Tick, dt: f64, psp: f32) -> bool {
        if self.is_refractory(t) {
            return false;
        }

        self.last_voltage = self.get_voltage(t, dt) + psp;
        self.last_t = t;

        true
    }

    pub fn check_spike(&self, t: Tick, dt: f64) -> bool {
        !self.is_refractory(t) && self.get_voltage(t, dt) > self.threshold
    }

    pub fn spike(&mut self, t: Tick, neuron_params: &NeuronParams) {
        self.last_t = t + neuron_params.refractory_period;
        self.last_voltage = neuron_params.reset_voltage;
    }

    fn is_refractory(&self, t: Tick) -> bool {
        self.last_t > t
    }

    pub fn get_voltage(&self, t: Tick, dt: f64) -> f32 {
        if self.last_t >= t {
            self.last_voltage
        } else {
            self.last_voltage * get_decay_factor(t, self.last_t, self.tau_membrane, dt)
        }
    }
}
