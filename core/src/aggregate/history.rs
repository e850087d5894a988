use std::collections::VecDeque;

/// Bounded window of the most recent strength samples for one channel.
///
/// Insertion order is arrival order; once the window is full the oldest
/// sample is evicted, so the length never exceeds the capacity.
#[derive(Debug)]
pub struct ChannelHistory {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl ChannelHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Appends a sample, evicting the oldest once the window is full.
    pub fn push(&mut self, strength: f64) {
        self.samples.push_back(strength);
        if self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Mean over whatever is currently in the window, 1 to `capacity`
    /// samples; a partially filled window gets no special casing.
    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
