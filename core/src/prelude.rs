pub use crate::aggregate::{ChannelAggregator, RecordOutcome, DEFAULT_WINDOW};
pub use crate::ingest::{IngestHandle, IngestLoop, IngestState, LineSource};
pub use crate::protocol::{parse, Skip, BAND_BASE_MHZ, BAND_LIMIT_MHZ, MAX_STRENGTH};
pub use crate::telemetry::{MetricsRecorder, MetricsSnapshot};
pub use crate::{IngestError, IngestResult, Reading, SpectrumSink};
