use anyhow::Context;
use scancore::aggregate::DEFAULT_WINDOW;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Samples per channel in the rolling window.
    pub window: usize,
    /// Consecutive unparseable lines tolerated before the session fails.
    /// Zero keeps retrying forever, which matches the scanner firmware's
    /// habit of emitting noise in bursts.
    pub skip_cap: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            skip_cap: 0,
        }
    }
}

impl MonitorConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading monitor config {}", path_ref.display()))?;
        let config: MonitorConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing monitor config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(window: usize, skip_cap: usize) -> Self {
        Self { window, skip_cap }
    }
}
