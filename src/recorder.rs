use crate::spike_train::Spike;

/// Records the spikes of a neuron population.
#[derive(Debug, Clone)]
pub struct SpikeMonitor {
    spikes: Vec<Spike>,
    counts: Vec<usize>,
}

impl SpikeMonitor {
    pub fn new(num_neurons: usize) -> Self {
        Self {
            spikes: Vec::new(),
            counts: vec![0; num_neurons],
        }
    }

    pub fn record(&mut self, nid: usize, t: f64) {
        self.spikes.push(Spike { channel: nid, t });
        self.counts[nid] += 1;
    }

    pub fn num_spikes(&self) -> usize {
        self.spikes.len()
    }

    /// Spike count per neuron.
    pub fn count(&self) -> &[usize] {
        &self.counts
    }

    pub fn spikes(&self) -> &[Spike] {
        &self.spikes
    }

    pub fn replace_spikes(&mut self, spikes: &[Spike]) {
        self.counts.iter_mut().for_each(|count| *count = 0);
        self.spikes.clear();

        for spike in spikes {
            self.record(spike.channel, spike.t);
        }
    }
}
