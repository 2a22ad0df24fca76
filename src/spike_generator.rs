use itertools::Itertools;
use simple_error::{SimpleError, SimpleResult};

use crate::{spike_train::SpikeTrain, types::Tick, util};

/// Replays a frozen [`SpikeTrain`] on the clock grid, one tick at a time.
#[derive(Debug, Clone)]
pub struct SpikeGenerator {
    num_channels: usize,
    /// (tick, channel), ordered by tick.
    scheduled: Vec<(Tick, usize)>,
    cursor: usize,
}

impl SpikeGenerator {
    pub fn new(spike_train: &SpikeTrain, dt: f64) -> Self {
        let scheduled = spike_train
            .spikes()
            .iter()
            .map(|spike| (util::time_to_tick(spike.t, dt), spike.channel))
            .sorted()
            .collect();

        Self {
            num_channels: spike_train.num_channels(),
            scheduled,
            cursor: 0,
        }
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    pub fn num_scheduled(&self) -> usize {
        self.scheduled.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: usize) -> SimpleResult<()> {
        if cursor > self.scheduled.len() {
            return Err(SimpleError::new(format!(
                "stimulus cursor {} beyond {} scheduled spikes",
                cursor,
                self.scheduled.len()
            )));
        }

        self.cursor = cursor;
        Ok(())
    }

    /// Channels spiking at tick `t`. Spikes scheduled before `t` that were never
    /// collected are skipped.
    pub fn spiking_channels(&mut self, t: Tick) -> Vec<usize> {
        let mut channels = Vec::new();

        while let Some(&(spike_t, channel)) = self.scheduled.get(self.cursor) {
            if spike_t > t {
                break;
            }

            if spike_t == t {
                channels.push(channel);
            }

            self.cursor += 1;
        }

        channels
    }
}
