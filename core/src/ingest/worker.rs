use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use log::{info, warn};

use crate::aggregate::ChannelAggregator;
use crate::ingest::source::LineSource;
use crate::protocol;
use crate::telemetry::{MetricsRecorder, MetricsSnapshot};
use crate::{IngestError, IngestResult, Reading, SpectrumSink};

/// Lifecycle of an ingest session.
///
/// `Stopped` is reached only by an explicit stop request observed at a
/// cycle boundary; `Failed` is reached when the transport ends or errors
/// and is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestState {
    Idle,
    Running,
    Stopped,
    Failed,
}

const STATE_IDLE: u8 = 0;
const STATE_RUNNING: u8 = 1;
const STATE_STOPPED: u8 = 2;
const STATE_FAILED: u8 = 3;

impl IngestState {
    fn from_u8(value: u8) -> Self {
        match value {
            STATE_RUNNING => IngestState::Running,
            STATE_STOPPED => IngestState::Stopped,
            STATE_FAILED => IngestState::Failed,
            _ => IngestState::Idle,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            IngestState::Idle => STATE_IDLE,
            IngestState::Running => STATE_RUNNING,
            IngestState::Stopped => STATE_STOPPED,
            IngestState::Failed => STATE_FAILED,
        }
    }
}

/// Drives the read -> parse -> record -> emit cycle for one session.
///
/// The loop owns the transport; the aggregator sits behind a single
/// mutex shared with [`IngestHandle`] so an externally triggered reset
/// serializes against the ingest cycle.
pub struct IngestLoop<S: LineSource> {
    source: S,
    sink: Arc<dyn SpectrumSink>,
    aggregator: Arc<Mutex<ChannelAggregator>>,
    stop: Arc<AtomicBool>,
    state: Arc<AtomicU8>,
    metrics: Arc<MetricsRecorder>,
    skip_cap: Option<usize>,
}

impl<S: LineSource> IngestLoop<S> {
    pub fn new(source: S, sink: Arc<dyn SpectrumSink>, window: usize) -> Self {
        Self {
            source,
            sink,
            aggregator: Arc::new(Mutex::new(ChannelAggregator::new(window))),
            stop: Arc::new(AtomicBool::new(false)),
            state: Arc::new(AtomicU8::new(STATE_IDLE)),
            metrics: Arc::new(MetricsRecorder::new()),
            skip_cap: None,
        }
    }

    /// Bounds the consecutive skips tolerated while hunting for a valid
    /// reading. Without a cap the loop retries forever, trading stop
    /// latency for forward progress on a noisy link.
    pub fn with_skip_cap(mut self, cap: usize) -> Self {
        self.skip_cap = Some(cap.max(1));
        self
    }

    /// Control surface for threads other than the ingest worker.
    pub fn handle(&self) -> IngestHandle {
        IngestHandle {
            stop: self.stop.clone(),
            state: self.state.clone(),
            aggregator: self.aggregator.clone(),
            sink: self.sink.clone(),
            metrics: self.metrics.clone(),
        }
    }

    /// Consumes the transport until stopped or failed.
    ///
    /// The stop flag is observed once per cycle, before the read, so a
    /// stop requested mid-cycle takes effect before the next one. Every
    /// valid reading produces exactly one average update and, when the
    /// running maximum was refreshed, one max update.
    pub fn run(&mut self) -> IngestResult<()> {
        self.state.store(IngestState::Running.as_u8(), Ordering::Release);
        info!("ingest session running");
        loop {
            if self.stop.load(Ordering::Acquire) {
                self.state.store(IngestState::Stopped.as_u8(), Ordering::Release);
                info!("stop requested, ingest session finished");
                return Ok(());
            }

            let reading = match self.next_reading() {
                Ok(reading) => reading,
                Err(err) => {
                    self.state.store(IngestState::Failed.as_u8(), Ordering::Release);
                    warn!("ingest session failed: {}", err);
                    return Err(err);
                }
            };

            {
                let mut aggregator = self.aggregator.lock().unwrap();
                let outcome = aggregator.record(reading.channel_mhz, reading.strength);
                // Emitting while still holding the lock keeps the sink's
                // update order consistent with the aggregator when a
                // reset runs concurrently from the handle.
                self.sink
                    .on_average_update(reading.channel_mhz, outcome.average_percent);
                if outcome.is_new_max {
                    self.sink
                        .on_max_update(reading.channel_mhz, outcome.average_percent);
                }
            }
            self.metrics.record_reading();
        }
    }

    /// Pulls lines until one parses, discarding noise permanently.
    ///
    /// Retrying is an explicit loop so sustained noise can never deepen
    /// the stack; with a skip cap configured it surfaces
    /// [`IngestError::NoValidData`] instead of spinning forever.
    fn next_reading(&mut self) -> IngestResult<Reading> {
        let mut skipped = 0usize;
        loop {
            let raw = self.source.next_line()?;
            self.metrics.record_line();
            match protocol::parse(&raw) {
                Ok(reading) => return Ok(reading),
                Err(skip) => {
                    skipped += 1;
                    self.metrics.record_skip();
                    warn!("skipping line {:?}: {}", raw.trim_end(), skip);
                    if let Some(cap) = self.skip_cap {
                        if skipped >= cap {
                            return Err(IngestError::NoValidData(skipped));
                        }
                    }
                }
            }
        }
    }
}

/// Clonable control surface shared with the consumer side.
///
/// Stop is cooperative: it is observed only at cycle boundaries, so the
/// latency is bounded by the time to obtain one valid line.
#[derive(Clone)]
pub struct IngestHandle {
    stop: Arc<AtomicBool>,
    state: Arc<AtomicU8>,
    aggregator: Arc<Mutex<ChannelAggregator>>,
    sink: Arc<dyn SpectrumSink>,
    metrics: Arc<MetricsRecorder>,
}

impl IngestHandle {
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub fn state(&self) -> IngestState {
        IngestState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Zeroes every known channel's running maximum and notifies the
    /// sink with a zero max update per channel. Histories are untouched.
    /// Runs entirely under the aggregator lock so the zero updates
    /// cannot interleave with a concurrent record's notifications.
    pub fn reset_maxima(&self) {
        let mut aggregator = self.aggregator.lock().unwrap();
        for channel in aggregator.reset_maxima() {
            self.sink.on_max_update(channel, 0.0);
        }
    }

    pub fn running_max(&self, channel_mhz: u32) -> Option<f64> {
        self.aggregator.lock().unwrap().running_max(channel_mhz)
    }

    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn channel_count(&self) -> usize {
        self.aggregator.lock().unwrap().channel_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::DEFAULT_WINDOW;
    use std::collections::VecDeque;

    struct ScriptedSource {
        lines: VecDeque<String>,
    }

    impl ScriptedSource {
        fn new(lines: &[&str]) -> Self {
            Self {
                lines: lines.iter().map(|line| line.to_string()).collect(),
            }
        }
    }

    impl LineSource for ScriptedSource {
        fn next_line(&mut self) -> IngestResult<String> {
            self.lines.pop_front().ok_or(IngestError::EndOfStream)
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum SinkEvent {
        Average(u32, f64),
        Max(u32, f64),
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<SinkEvent>>,
    }

    impl RecordingSink {
        fn events(&self) -> Vec<SinkEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl SpectrumSink for RecordingSink {
        fn on_average_update(&self, channel_mhz: u32, average_percent: f64) {
            self.events
                .lock()
                .unwrap()
                .push(SinkEvent::Average(channel_mhz, average_percent));
        }

        fn on_max_update(&self, channel_mhz: u32, max_percent: f64) {
            self.events
                .lock()
                .unwrap()
                .push(SinkEvent::Max(channel_mhz, max_percent));
        }
    }

    #[test]
    fn one_valid_line_then_eof_fails_after_one_update_pair() {
        let sink = Arc::new(RecordingSink::default());
        let source = ScriptedSource::new(&["0 16"]);
        let mut ingest = IngestLoop::new(source, sink.clone(), DEFAULT_WINDOW);
        let handle = ingest.handle();

        let result = ingest.run();
        assert!(matches!(result, Err(IngestError::EndOfStream)));
        assert_eq!(handle.state(), IngestState::Failed);
        assert_eq!(
            sink.events(),
            vec![SinkEvent::Average(2400, 50.0), SinkEvent::Max(2400, 50.0)]
        );
    }

    #[test]
    fn noise_lines_are_discarded_without_failing() {
        let sink = Arc::new(RecordingSink::default());
        let source = ScriptedSource::new(&["@@@", "0 99", "150 10", "0 16"]);
        let mut ingest = IngestLoop::new(source, sink.clone(), DEFAULT_WINDOW);
        let handle = ingest.handle();

        let result = ingest.run();
        assert!(matches!(result, Err(IngestError::EndOfStream)));

        let metrics = handle.metrics_snapshot();
        assert_eq!(metrics.lines_read, 4);
        assert_eq!(metrics.lines_skipped, 3);
        assert_eq!(metrics.readings_recorded, 1);
        assert_eq!(
            sink.events(),
            vec![SinkEvent::Average(2400, 50.0), SinkEvent::Max(2400, 50.0)]
        );
    }

    #[test]
    fn stop_requested_before_start_prevents_any_read() {
        let sink = Arc::new(RecordingSink::default());
        let source = ScriptedSource::new(&["0 16"]);
        let mut ingest = IngestLoop::new(source, sink.clone(), DEFAULT_WINDOW);
        let handle = ingest.handle();

        handle.request_stop();
        assert!(ingest.run().is_ok());
        assert_eq!(handle.state(), IngestState::Stopped);
        assert!(sink.events().is_empty());
        assert_eq!(handle.metrics_snapshot().lines_read, 0);
    }

    #[test]
    fn reset_emits_zero_for_every_known_channel_and_is_idempotent() {
        let sink = Arc::new(RecordingSink::default());
        let source = ScriptedSource::new(&["0 16", "10 8"]);
        let mut ingest = IngestLoop::new(source, sink.clone(), DEFAULT_WINDOW);
        let handle = ingest.handle();
        let _ = ingest.run();

        let before = sink.events().len();
        handle.reset_maxima();
        handle.reset_maxima();
        let events = sink.events();
        let resets: Vec<_> = events[before..].to_vec();
        assert_eq!(
            resets,
            vec![
                SinkEvent::Max(2400, 0.0),
                SinkEvent::Max(2410, 0.0),
                SinkEvent::Max(2400, 0.0),
                SinkEvent::Max(2410, 0.0),
            ]
        );
    }

    #[test]
    fn skip_cap_surfaces_no_valid_data() {
        let sink = Arc::new(RecordingSink::default());
        let source = ScriptedSource::new(&["x", "y", "z", "0 16"]);
        let mut ingest = IngestLoop::new(source, sink.clone(), DEFAULT_WINDOW).with_skip_cap(2);
        let handle = ingest.handle();

        let result = ingest.run();
        assert!(matches!(result, Err(IngestError::NoValidData(2))));
        assert_eq!(handle.state(), IngestState::Failed);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn concurrent_reset_never_leaves_sink_behind_the_aggregator() {
        let sink = Arc::new(RecordingSink::default());
        let lines = vec!["0 16"; 400];
        let source = ScriptedSource::new(&lines);
        let mut ingest = IngestLoop::new(source, sink.clone(), DEFAULT_WINDOW);
        let handle = ingest.handle();
        let resetter = handle.clone();

        let worker = std::thread::spawn(move || ingest.run());
        let reset_thread = std::thread::spawn(move || {
            for _ in 0..25 {
                resetter.reset_maxima();
                std::thread::yield_now();
            }
        });
        reset_thread.join().unwrap();
        let _ = worker.join().unwrap();

        // The last max update the sink saw must match the aggregator,
        // whichever of record/reset held the lock last.
        let last_max = sink.events().iter().rev().find_map(|event| match event {
            SinkEvent::Max(2400, value) => Some(*value),
            _ => None,
        });
        assert_eq!(last_max, handle.running_max(2400));
    }

    #[test]
    fn handle_reports_channel_count() {
        let sink = Arc::new(RecordingSink::default());
        let source = ScriptedSource::new(&["0 16", "50 4", "50 8"]);
        let mut ingest = IngestLoop::new(source, sink, DEFAULT_WINDOW);
        let handle = ingest.handle();
        let _ = ingest.run();
        assert_eq!(handle.channel_count(), 2);
    }
}
