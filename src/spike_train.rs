use log::{debug, warn};
use rand::{prelude::Distribution, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use simple_error::{try_with, SimpleError, SimpleResult};
use statrs::distribution::Poisson;

use crate::{
    context::SimulationContext,
    params::{self, StimulusParams},
    util,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spike {
    pub channel: usize,
    /// Spike time in ms.
    pub t: f64,
}

/// Frozen set of spikes on `num_channels` channels within `[0, duration)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpikeTrain {
    num_channels: usize,
    duration: f64,
    spikes: Vec<Spike>,
}

impl SpikeTrain {
    pub fn build(num_channels: usize, duration: f64, spikes: Vec<Spike>) -> SimpleResult<Self> {
        if num_channels == 0 {
            return Err(SimpleError::new(
                "spike train must have at least one channel",
            ));
        }

        if !duration.is_finite() || duration <= 0.0 {
            return Err(SimpleError::new(
                "spike train duration must be strictly positive",
            ));
        }

        for spike in &spikes {
            if spike.channel >= num_channels {
                return Err(SimpleError::new(format!(
                    "invalid channel id in spike train: {}",
                    spike.channel
                )));
            }

            if !spike.t.is_finite() || spike.t < 0.0 || spike.t >= duration {
                return Err(SimpleError::new(format!(
                    "spike time out of range: {}",
                    spike.t
                )));
            }
        }

        Ok(Self {
            num_channels,
            duration,
            spikes,
        })
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn spikes(&self) -> &[Spike] {
        &self.spikes
    }

    pub fn num_spikes(&self) -> usize {
        self.spikes.len()
    }

    pub fn channel_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.num_channels];
        for spike in &self.spikes {
            counts[spike.channel] += 1;
        }
        counts
    }

    /// Mean firing rate per channel in Hz.
    pub fn mean_rate(&self) -> f64 {
        self.num_spikes() as f64 / self.num_channels as f64 / (self.duration / 1000.0)
    }
}

/// Draws a Poisson stimulus on the clock grid of `ctx`.
///
/// For every clock step the number of spiking channels is drawn from a Poisson
/// distribution with mean `num_channels * rate * dt`, then that many distinct
/// channels are chosen uniformly. Channels therefore spike at most once per step.
pub fn generate_poisson(
    ctx: &mut SimulationContext,
    stimulus_params: &StimulusParams,
) -> SimpleResult<SpikeTrain> {
    let dt = ctx.dt();

    try_with!(
        params::validate_stimulus_params(stimulus_params, dt),
        "invalid stimulus parameters"
    );

    let num_channels = stimulus_params.num_channels;
    let num_ticks = util::duration_to_ticks(stimulus_params.duration, dt)?;
    let mean_spikes_per_tick = num_channels as f64 * stimulus_params.rate * dt / 1000.0;

    let all_channels: Vec<usize> = (0..num_channels).collect();
    let mut spikes = Vec::new();

    if mean_spikes_per_tick > 0.0 {
        let num_spikes_dist = try_with!(
            Poisson::new(mean_spikes_per_tick),
            "unable to create stimulus distribution"
        );

        for t in 0..num_ticks {
            let mut num_spikes = num_spikes_dist.sample(ctx.rng()) as usize;

            if num_spikes > num_channels {
                warn!(
                    "capping {} stimulus spikes at tick {} to {} channels",
                    num_spikes, t, num_channels
                );
                num_spikes = num_channels;
            }

            let mut channels: Vec<usize> = all_channels
                .choose_multiple(ctx.rng(), num_spikes)
                .copied()
                .collect();
            channels.sort_unstable();

            let spike_time = util::tick_to_time(t, dt);
            spikes.extend(channels.into_iter().map(|channel| Spike {
                channel,
                t: spike_time,
            }));
        }
    }

    debug!(
        "generated {} stimulus spikes on {} channels over {} ms",
        spikes.len(),
        num_channels,
        stimulus_params.duration
    );

    SpikeTrain::build(num_channels, stimulus_params.duration, spikes)
}
