use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Latest statistics for one channel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct ChannelReport {
    pub average_percent: f64,
    pub max_percent: f64,
}

/// Latest per-channel statistics published to observers.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SpectrumModel {
    pub channels: BTreeMap<u32, ChannelReport>,
    /// Valid readings folded in so far.
    pub updates: usize,
}

impl SpectrumModel {
    /// Channel with the highest running maximum, if any reading arrived.
    pub fn strongest(&self) -> Option<(u32, ChannelReport)> {
        self.channels
            .iter()
            .max_by(|a, b| a.1.max_percent.total_cmp(&b.1.max_percent))
            .map(|(channel, report)| (*channel, *report))
    }
}
