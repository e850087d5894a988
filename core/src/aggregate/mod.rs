pub mod aggregator;
pub mod history;

pub use aggregator::{ChannelAggregator, RecordOutcome, DEFAULT_WINDOW};
pub use history::ChannelHistory;
