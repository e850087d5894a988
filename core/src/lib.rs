//! Ingestion and aggregation core for a 2.4 GHz serial spectrum scanner.
//!
//! The scanner hardware prints one signal-strength reading per line; this
//! crate validates those lines, maintains per-channel rolling statistics,
//! and pushes updates to a presentation sink. The transport and the
//! display are collaborators behind the [`LineSource`] and
//! [`SpectrumSink`] traits, so the core owns no serial port and no chart.

pub mod aggregate;
pub mod ingest;
pub mod prelude;
pub mod protocol;
pub mod telemetry;

pub use prelude::{IngestHandle, IngestLoop, LineSource};

/// One validated observation from the device stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Physical frequency in MHz, within `[2400, 2500)`.
    pub channel_mhz: u32,
    /// Raw signal magnitude, within `[0, 32]`.
    pub strength: f64,
}

/// Write-only view of the presentation layer.
///
/// Both callbacks run synchronously on the ingest thread, at most once
/// each per valid reading; implementations must not block it for
/// unbounded time.
pub trait SpectrumSink: Send + Sync {
    fn on_average_update(&self, channel_mhz: u32, average_percent: f64);
    fn on_max_update(&self, channel_mhz: u32, max_percent: f64);
}

/// Terminal failure of an ingest session.
///
/// Line-level noise never shows up here; malformed and out-of-range
/// lines are discarded inside the loop. Only the transport can end a
/// session.
#[derive(thiserror::Error, Debug)]
pub enum IngestError {
    #[error("transport reached end of stream")]
    EndOfStream,
    #[error("transport read failed: {0}")]
    Transport(#[from] std::io::Error),
    #[error("no valid reading within {0} consecutive lines")]
    NoValidData(usize),
}

pub type IngestResult<T> = Result<T, IngestError>;
