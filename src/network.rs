use itertools::Itertools;
use log::debug;
use simple_error::{bail, try_with, SimpleError, SimpleResult};

use crate::{
    context::SimulationContext,
    neuron::Neuron,
    params::{self, ConnectionParams, NeuronParams, SweptParameter},
    recorder::SpikeMonitor,
    spike_generator::SpikeGenerator,
    spike_train::SpikeTrain,
    state_snapshot::{PendingTransmission, StateSnapshot, SynapseState},
    synapse::{self, Synapse},
    transmission_buffer::TransmissionBuffer,
    types::{HashMap, Tick},
    util,
};

pub const DEFAULT_SNAPSHOT_NAME: &str = "default";

/// A frozen stimulus driving a population of uncoupled LIF neurons, plus a
/// spike monitor on that population.
pub struct Network {
    dt: f64,
    t: Tick,
    neuron_params: NeuronParams,
    neurons: Vec<Neuron>,
    neuron_indexes_to_check: Vec<usize>,
    channel_to_synapses: Vec<Vec<Synapse>>,
    transmission_buffer: TransmissionBuffer<Transmission>,
    spike_generator: SpikeGenerator,
    spike_monitor: SpikeMonitor,
    stored_snapshots: HashMap<String, StateSnapshot>,
}

#[derive(Debug, Clone)]
struct Transmission {
    neuron_idx: usize,
    psp: f32,
}

/// Draws the input connections of a single output neuron: which stimulus
/// channels reach it, with which weight and delay. Targets are all 0.
pub fn draw_input_synapses(
    ctx: &mut SimulationContext,
    num_channels: usize,
    connection_params: &ConnectionParams,
) -> SimpleResult<Vec<SynapseState>> {
    synapse::connect(ctx, num_channels, 1, false, connection_params)
}

/// Builds `num_neurons` uncoupled neurons driven by `stimulus`. One input
/// pattern is drawn and shared by all of them.
pub fn create_network(
    ctx: &mut SimulationContext,
    stimulus: &SpikeTrain,
    num_neurons: usize,
    neuron_params: &NeuronParams,
    connection_params: &ConnectionParams,
) -> SimpleResult<Network> {
    let input_synapses = draw_input_synapses(ctx, stimulus.num_channels(), connection_params)?;
    create_network_with_input(ctx, stimulus, &input_synapses, num_neurons, neuron_params)
}

/// Builds `num_neurons` uncoupled neurons, each receiving a copy of
/// `input_synapses`. The targets stored in `input_synapses` are ignored.
pub fn create_network_with_input(
    ctx: &SimulationContext,
    stimulus: &SpikeTrain,
    input_synapses: &[SynapseState],
    num_neurons: usize,
    neuron_params: &NeuronParams,
) -> SimpleResult<Network> {
    try_with!(
        params::validate_neuron_params(neuron_params),
        "invalid neuron parameters"
    );

    if num_neurons == 0 {
        bail!("network must contain at least one neuron");
    }

    let num_channels = stimulus.num_channels();
    try_with!(
        validate_input_synapses(input_synapses, num_channels),
        "invalid input synapses"
    );

    let mut channel_to_synapses = vec![Vec::new(); num_channels];
    for synapse_state in input_synapses {
        for nid in 0..num_neurons {
            channel_to_synapses[synapse_state.pre_syn_idx].push(Synapse::new(
                nid,
                synapse_state.conduction_delay,
                synapse_state.weight,
            ));
        }
    }

    let max_conduction_delay = input_synapses
        .iter()
        .map(|state| state.conduction_delay)
        .max()
        .unwrap_or(0);

    let dt = ctx.dt();

    debug!(
        "created network with {} neurons, {} input channels each, {} stimulus spikes",
        num_neurons,
        input_synapses.len(),
        stimulus.num_spikes()
    );

    Ok(Network {
        dt,
        t: 0,
        neuron_params: neuron_params.clone(),
        neurons: (0..num_neurons).map(|_| Neuron::new(neuron_params)).collect(),
        neuron_indexes_to_check: Vec::new(),
        channel_to_synapses,
        transmission_buffer: TransmissionBuffer::new(max_conduction_delay + 1),
        spike_generator: SpikeGenerator::new(stimulus, dt),
        spike_monitor: SpikeMonitor::new(num_neurons),
        stored_snapshots: HashMap::default(),
    })
}

fn validate_input_synapses(
    input_synapses: &[SynapseState],
    num_channels: usize,
) -> Result<(), SimpleError> {
    for synapse_state in input_synapses {
        if synapse_state.pre_syn_idx >= num_channels {
            return Err(SimpleError::new(format!(
                "invalid stimulus channel id: {}",
                synapse_state.pre_syn_idx
            )));
        }

        if !synapse_state.weight.is_finite() {
            return Err(SimpleError::new("weight must be finite"));
        }

        params::validate_tick_span("conduction_delay", synapse_state.conduction_delay)?;
    }

    Ok(())
}

impl Network {
    pub fn get_num_neurons(&self) -> usize {
        self.neurons.len()
    }

    pub fn get_num_synapses(&self) -> usize {
        self.channel_to_synapses.iter().map(Vec::len).sum()
    }

    pub fn get_tick_period(&self) -> Tick {
        self.t
    }

    /// Current simulated time in ms.
    pub fn get_time(&self) -> f64 {
        util::tick_to_time(self.t, self.dt)
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn spike_monitor(&self) -> &SpikeMonitor {
        &self.spike_monitor
    }

    pub fn get_voltages(&self) -> Vec<f32> {
        self.neurons
            .iter()
            .map(|neuron| neuron.get_voltage(self.t, self.dt))
            .collect()
    }

    pub fn get_parameter_values(&self, parameter: SweptParameter) -> Vec<f32> {
        self.neurons
            .iter()
            .map(|neuron| neuron.get_parameter(parameter))
            .collect()
    }

    /// Sets the same parameter value on every neuron.
    pub fn set_parameter(&mut self, parameter: SweptParameter, value: f32) -> SimpleResult<()> {
        params::validate_parameter_value(parameter, value, &self.neuron_params)?;

        for neuron in &mut self.neurons {
            neuron.set_parameter(self.t, self.dt, parameter, value);
        }

        self.schedule_threshold_check(parameter);

        Ok(())
    }

    /// Sets one parameter value per neuron, in neuron order.
    pub fn set_parameter_values(
        &mut self,
        parameter: SweptParameter,
        values: &[f32],
    ) -> SimpleResult<()> {
        if values.len() != self.neurons.len() {
            return Err(SimpleError::new(format!(
                "expected {} parameter values, got {}",
                self.neurons.len(),
                values.len()
            )));
        }

        for value in values {
            params::validate_parameter_value(parameter, *value, &self.neuron_params)?;
        }

        for (neuron, value) in self.neurons.iter_mut().zip(values) {
            neuron.set_parameter(self.t, self.dt, parameter, *value);
        }

        self.schedule_threshold_check(parameter);

        Ok(())
    }

    // a lowered threshold may already lie below the current voltage
    fn schedule_threshold_check(&mut self, parameter: SweptParameter) {
        if parameter == SweptParameter::Threshold {
            self.neuron_indexes_to_check.extend(0..self.neurons.len());
        }
    }

    /// Advances simulated time by `duration` ms. Returns the number of spikes
    /// emitted during this run.
    pub fn run(&mut self, duration: f64) -> SimpleResult<usize> {
        let num_ticks = util::duration_to_ticks(duration, self.dt)?;
        let num_spikes_before = self.spike_monitor.num_spikes();

        for _ in 0..num_ticks {
            self.tick();
        }

        Ok(self.spike_monitor.num_spikes() - num_spikes_before)
    }

    /// One clock step: threshold check, synaptic delivery, reset.
    fn tick(&mut self) {
        let t = self.t;
        let dt = self.dt;

        self.neuron_indexes_to_check.sort_unstable();
        self.neuron_indexes_to_check.dedup();

        let neurons = &self.neurons;
        let spiking_neuron_indexes: Vec<usize> = self
            .neuron_indexes_to_check
            .drain(..)
            .filter(|idx| neurons[*idx].check_spike(t, dt))
            .collect();

        for channel in self.spike_generator.spiking_channels(t) {
            for synapse in &self.channel_to_synapses[channel] {
                self.transmission_buffer.push_at_offset(
                    synapse.conduction_delay,
                    Transmission {
                        neuron_idx: synapse.neuron_idx,
                        psp: synapse.process_pre_syn_spike_get_psp(),
                    },
                );
            }
        }

        for transmission in self.transmission_buffer.drain_and_advance() {
            if self.neurons[transmission.neuron_idx].apply_psp(t, dt, transmission.psp) {
                self.neuron_indexes_to_check.push(transmission.neuron_idx);
            }
        }

        let spike_time = util::tick_to_time(t, dt);
        for idx in spiking_neuron_indexes {
            self.neurons[idx].spike(t, &self.neuron_params);
            self.spike_monitor.record(idx, spike_time);
        }

        self.t += 1;
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            t: self.t,
            neuron_states: self.neurons.iter().map(Neuron::to_state).collect(),
            neuron_indexes_to_check: self
                .neuron_indexes_to_check
                .iter()
                .copied()
                .sorted()
                .dedup()
                .collect(),
            synapse_states: self
                .channel_to_synapses
                .iter()
                .enumerate()
                .flat_map(|(channel, synapses)| {
                    synapses.iter().map(move |synapse| synapse.to_state(channel))
                })
                .collect(),
            pending_transmissions: self
                .transmission_buffer
                .pending()
                .into_iter()
                .map(|(offset, transmission)| PendingTransmission {
                    offset,
                    post_syn_nid: transmission.neuron_idx,
                    psp: transmission.psp,
                })
                .collect(),
            stimulus_cursor: self.spike_generator.cursor(),
            recorded_spikes: self.spike_monitor.spikes().to_vec(),
        }
    }

    /// Overwrites all live state from `snapshot`. Nothing is changed if the
    /// snapshot does not fit this network.
    pub fn apply_snapshot(&mut self, snapshot: &StateSnapshot) -> SimpleResult<()> {
        try_with!(
            self.validate_snapshot(snapshot),
            "snapshot does not match network"
        );

        let num_channels = self.spike_generator.num_channels();
        let mut channel_to_synapses = vec![Vec::new(); num_channels];
        for synapse_state in &snapshot.synapse_states {
            channel_to_synapses[synapse_state.pre_syn_idx].push(Synapse::from_state(synapse_state));
        }

        let max_offset = snapshot
            .synapse_states
            .iter()
            .map(|state| state.conduction_delay)
            .chain(snapshot.pending_transmissions.iter().map(|p| p.offset))
            .max()
            .unwrap_or(0);

        let mut transmission_buffer = TransmissionBuffer::new(max_offset + 1);
        for pending in &snapshot.pending_transmissions {
            transmission_buffer.push_at_offset(
                pending.offset,
                Transmission {
                    neuron_idx: pending.post_syn_nid,
                    psp: pending.psp,
                },
            );
        }

        debug!(
            "applying snapshot at tick {} with {} pending transmissions, horizon {}",
            snapshot.t,
            snapshot.pending_transmissions.len(),
            transmission_buffer.horizon()
        );

        self.spike_generator.set_cursor(snapshot.stimulus_cursor)?;
        self.t = snapshot.t;
        self.neurons = snapshot
            .neuron_states
            .iter()
            .map(Neuron::from_state)
            .collect();
        self.neuron_indexes_to_check = snapshot.neuron_indexes_to_check.clone();
        self.channel_to_synapses = channel_to_synapses;
        self.transmission_buffer = transmission_buffer;
        self.spike_monitor.replace_spikes(&snapshot.recorded_spikes);

        Ok(())
    }

    fn validate_snapshot(&self, snapshot: &StateSnapshot) -> SimpleResult<()> {
        let num_neurons = self.neurons.len();
        let num_channels = self.spike_generator.num_channels();

        if snapshot.neuron_states.len() != num_neurons {
            return Err(SimpleError::new(format!(
                "expected {} neuron states, got {}",
                num_neurons,
                snapshot.neuron_states.len()
            )));
        }

        let out_of_range_nid = snapshot
            .neuron_indexes_to_check
            .iter()
            .copied()
            .chain(snapshot.synapse_states.iter().map(|s| s.post_syn_nid))
            .chain(snapshot.pending_transmissions.iter().map(|p| p.post_syn_nid))
            .chain(snapshot.recorded_spikes.iter().map(|s| s.channel))
            .find(|nid| *nid >= num_neurons);

        if let Some(nid) = out_of_range_nid {
            return Err(SimpleError::new(format!("invalid neuron id: {}", nid)));
        }

        if let Some(synapse_state) = snapshot
            .synapse_states
            .iter()
            .find(|s| s.pre_syn_idx >= num_channels)
        {
            return Err(SimpleError::new(format!(
                "invalid stimulus channel id: {}",
                synapse_state.pre_syn_idx
            )));
        }

        for synapse_state in &snapshot.synapse_states {
            params::validate_tick_span("conduction_delay", synapse_state.conduction_delay)?;
        }

        for pending in &snapshot.pending_transmissions {
            params::validate_tick_span("pending transmission offset", pending.offset)?;
        }

        if snapshot.stimulus_cursor > self.spike_generator.num_scheduled() {
            return Err(SimpleError::new(format!(
                "stimulus cursor {} beyond {} scheduled spikes",
                snapshot.stimulus_cursor,
                self.spike_generator.num_scheduled()
            )));
        }

        Ok(())
    }

    /// Captures the current state under `name`, replacing any earlier capture
    /// with the same name.
    pub fn store(&mut self, name: &str) {
        let snapshot = self.snapshot();
        debug!("storing network state '{}' at tick {}", name, snapshot.t);
        self.stored_snapshots.insert(name.to_string(), snapshot);
    }

    pub fn restore(&mut self, name: &str) -> SimpleResult<()> {
        let snapshot = match self.stored_snapshots.get(name) {
            Some(snapshot) => snapshot.clone(),
            None => bail!("no network state stored under name '{}'", name),
        };

        debug!("restoring network state '{}' to tick {}", name, snapshot.t);
        self.apply_snapshot(&snapshot)
    }

    pub fn has_stored(&self, name: &str) -> bool {
        self.stored_snapshots.contains_key(name)
    }
}
