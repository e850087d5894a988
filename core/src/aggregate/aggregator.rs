use std::collections::BTreeMap;

use crate::aggregate::history::ChannelHistory;
use crate::protocol::MAX_STRENGTH;

/// Samples per channel in the rolling window, matching the scanner's
/// sweep cadence of five passes across the band.
pub const DEFAULT_WINDOW: usize = 5;

/// Result of folding one reading into a channel's statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordOutcome {
    /// Rolling average as a percentage of the hardware maximum.
    pub average_percent: f64,
    /// Whether the average set (or tied) the channel's running maximum.
    pub is_new_max: bool,
}

/// Per-channel rolling statistics for one live ingest session.
///
/// Histories and running maxima are created lazily the first time a
/// channel is seen and live for the rest of the session. The containers
/// are never exposed; callers only get [`record`](ChannelAggregator::record)
/// and [`reset_maxima`](ChannelAggregator::reset_maxima).
pub struct ChannelAggregator {
    window: usize,
    histories: BTreeMap<u32, ChannelHistory>,
    maxima: BTreeMap<u32, f64>,
}

impl ChannelAggregator {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            histories: BTreeMap::new(),
            maxima: BTreeMap::new(),
        }
    }

    /// Folds one strength sample into the channel's window and returns
    /// the new rolling average together with whether it refreshed the
    /// running maximum. A tie counts as a refresh so the sink re-emits
    /// the value.
    pub fn record(&mut self, channel_mhz: u32, strength: f64) -> RecordOutcome {
        let window = self.window;
        let history = self
            .histories
            .entry(channel_mhz)
            .or_insert_with(|| ChannelHistory::with_capacity(window));
        history.push(strength);

        let average_percent = history.mean() / f64::from(MAX_STRENGTH) * 100.0;
        let max = self.maxima.entry(channel_mhz).or_insert(average_percent);
        let is_new_max = average_percent >= *max;
        if is_new_max {
            *max = average_percent;
        }

        RecordOutcome {
            average_percent,
            is_new_max,
        }
    }

    /// Zeroes the running maximum of every known channel and returns the
    /// channels that were reset, in ascending order. Histories are left
    /// untouched.
    pub fn reset_maxima(&mut self) -> Vec<u32> {
        let mut reset = Vec::with_capacity(self.maxima.len());
        for (channel, max) in self.maxima.iter_mut() {
            *max = 0.0;
            reset.push(*channel);
        }
        reset
    }

    pub fn running_max(&self, channel_mhz: u32) -> Option<f64> {
        self.maxima.get(&channel_mhz).copied()
    }

    pub fn channel_count(&self) -> usize {
        self.histories.len()
    }
}
