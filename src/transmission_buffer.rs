/// Ring of per-tick batches for transmissions scheduled up to `horizon - 1`
/// ticks ahead.
#[derive(Debug, Clone)]
pub struct TransmissionBuffer<T> {
    batches: Vec<Vec<T>>,
    current_pos: usize,
}

impl<T: Clone> TransmissionBuffer<T> {
    pub fn new(horizon: usize) -> TransmissionBuffer<T> {
        TransmissionBuffer {
            batches: vec![Vec::new(); horizon.max(1)],
            current_pos: 0,
        }
    }

    pub fn horizon(&self) -> usize {
        self.batches.len()
    }

    #[cfg(debug_assertions)]
    fn is_within_horizon(&self, offset: usize) -> bool {
        offset < self.batches.len()
    }

    pub fn push_at_offset(&mut self, offset: usize, value: T) {
        #[cfg(debug_assertions)]
        assert!(self.is_within_horizon(offset));

        let target_pos = self.get_target_pos(offset);
        self.batches[target_pos].push(value);
    }

    fn get_target_pos(&self, offset: usize) -> usize {
        (self.current_pos + offset) % self.batches.len()
    }

    pub fn drain_and_advance(&mut self) -> impl Iterator<Item = T> + '_ {
        let pos = self.current_pos;
        self.current_pos = (self.current_pos + 1) % self.batches.len();
        self.batches[pos].drain(..)
    }

    /// Every scheduled value with its offset from the current position, in
    /// delivery order.
    pub fn pending(&self) -> Vec<(usize, T)> {
        (0..self.batches.len())
            .flat_map(move |offset| {
                self.batches[self.get_target_pos(offset)]
                    .iter()
                    .map(move |value| (offset, value.clone()))
            })
            .collect()
    }
}
