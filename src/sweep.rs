//! Output rate of a LIF population as a function of one neuron parameter.
//!
//! Two strategies evaluate the same sweep under a frozen stimulus:
//!
//! - [`run_snapshot_sweep`] builds a single output neuron, stores the freshly
//!   built network and restores it before every trial, so each sweep point
//!   starts from the identical state.
//! - [`run_ensemble_sweep`] builds one uncoupled output neuron per sweep value
//!   and advances them together in a single run.
//!
//! Both take a [`SweepInput`]: the frozen stimulus plus one input wiring
//! that every output neuron receives. Given the same input both strategies
//! produce the same spike counts.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use simple_error::{try_with, SimpleError, SimpleResult};

use crate::{
    context::SimulationContext,
    network::{self, DEFAULT_SNAPSHOT_NAME},
    params::{self, ConnectionParams, NeuronParams, ScenarioParams, SweptParameter},
    spike_train::SpikeTrain,
    state_snapshot::SynapseState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepStrategy {
    SnapshotRestore,
    Ensemble,
}

/// Frozen stimulus and the input connections of one output neuron.
#[derive(Debug, Clone)]
pub struct SweepInput {
    pub stimulus: SpikeTrain,
    pub input_synapses: Vec<SynapseState>,
}

impl SweepInput {
    /// Draws the input wiring once for `stimulus`.
    pub fn draw(
        ctx: &mut SimulationContext,
        stimulus: SpikeTrain,
        connection_params: &ConnectionParams,
    ) -> SimpleResult<Self> {
        let input_synapses =
            network::draw_input_synapses(ctx, stimulus.num_channels(), connection_params)?;

        debug!(
            "drew {} of {} input channels",
            input_synapses.len(),
            stimulus.num_channels()
        );

        Ok(Self {
            stimulus,
            input_synapses,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SweepSetup {
    pub neuron_params: NeuronParams,
    pub parameter: SweptParameter,
    pub values: Vec<f32>,
    /// Simulated time per trial in ms.
    pub duration: f64,
}

impl SweepSetup {
    pub fn from_scenario_params(params: &ScenarioParams) -> Self {
        Self {
            neuron_params: params.neuron_params.clone(),
            parameter: params.sweep_params.parameter,
            values: params.sweep_params.values(),
            duration: params.sweep_params.duration,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub value: f32,
    pub spike_count: usize,
    /// Output rate in Hz.
    pub rate: f64,
}

impl SweepPoint {
    fn new(value: f32, spike_count: usize, duration: f64) -> Self {
        Self {
            value,
            spike_count,
            rate: spike_count as f64 / (duration / 1000.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    pub parameter: SweptParameter,
    pub strategy: SweepStrategy,
    pub duration: f64,
    pub points: Vec<SweepPoint>,
}

impl SweepResult {
    pub fn values(&self) -> Vec<f32> {
        self.points.iter().map(|point| point.value).collect()
    }

    pub fn rates(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.rate).collect()
    }

    pub fn spike_counts(&self) -> Vec<usize> {
        self.points.iter().map(|point| point.spike_count).collect()
    }
}

fn validate_sweep_setup(setup: &SweepSetup) -> Result<(), SimpleError> {
    if setup.values.is_empty() {
        return Err(SimpleError::new("sweep range must not be empty"));
    }

    if !setup.duration.is_finite() || setup.duration <= 0.0 {
        return Err(SimpleError::new("sweep duration must be strictly positive"));
    }

    for value in &setup.values {
        params::validate_parameter_value(setup.parameter, *value, &setup.neuron_params)?;
    }

    Ok(())
}

pub fn run_sweep(
    ctx: &SimulationContext,
    strategy: SweepStrategy,
    input: &SweepInput,
    setup: &SweepSetup,
) -> SimpleResult<SweepResult> {
    match strategy {
        SweepStrategy::SnapshotRestore => run_snapshot_sweep(ctx, input, setup),
        SweepStrategy::Ensemble => run_ensemble_sweep(ctx, input, setup),
    }
}

pub fn run_snapshot_sweep(
    ctx: &SimulationContext,
    input: &SweepInput,
    setup: &SweepSetup,
) -> SimpleResult<SweepResult> {
    try_with!(validate_sweep_setup(setup), "invalid sweep");

    info!(
        "snapshot sweep over {} values of {:?}, {} ms per trial",
        setup.values.len(),
        setup.parameter,
        setup.duration
    );

    let mut network = network::create_network_with_input(
        ctx,
        &input.stimulus,
        &input.input_synapses,
        1,
        &setup.neuron_params,
    )?;

    network.store(DEFAULT_SNAPSHOT_NAME);

    let mut points = Vec::with_capacity(setup.values.len());

    for value in &setup.values {
        network.restore(DEFAULT_SNAPSHOT_NAME)?;
        network.set_parameter(setup.parameter, *value)?;
        let spike_count = network.run(setup.duration)?;

        let point = SweepPoint::new(*value, spike_count, setup.duration);
        debug!(
            "{:?} = {}: {} spikes, {} Hz",
            setup.parameter, point.value, point.spike_count, point.rate
        );
        points.push(point);
    }

    info!("snapshot sweep done");

    Ok(SweepResult {
        parameter: setup.parameter,
        strategy: SweepStrategy::SnapshotRestore,
        duration: setup.duration,
        points,
    })
}

pub fn run_ensemble_sweep(
    ctx: &SimulationContext,
    input: &SweepInput,
    setup: &SweepSetup,
) -> SimpleResult<SweepResult> {
    try_with!(validate_sweep_setup(setup), "invalid sweep");

    info!(
        "ensemble sweep over {} values of {:?}, {} ms",
        setup.values.len(),
        setup.parameter,
        setup.duration
    );

    let mut network = network::create_network_with_input(
        ctx,
        &input.stimulus,
        &input.input_synapses,
        setup.values.len(),
        &setup.neuron_params,
    )?;

    network.set_parameter_values(setup.parameter, &setup.values)?;
    network.run(setup.duration)?;

    let points: Vec<SweepPoint> = setup
        .values
        .iter()
        .zip(network.spike_monitor().count())
        .map(|(value, spike_count)| SweepPoint::new(*value, *spike_count, setup.duration))
        .collect();

    for point in &points {
        debug!(
            "{:?} = {}: {} spikes, {} Hz",
            setup.parameter, point.value, point.spike_count, point.rate
        );
    }

    info!("ensemble sweep done");

    Ok(SweepResult {
        parameter: setup.parameter,
        strategy: SweepStrategy::Ensemble,
        duration: setup.duration,
        points,
    })
}
