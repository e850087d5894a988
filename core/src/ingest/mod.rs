pub mod source;
pub mod worker;

pub use source::LineSource;
pub use worker::{IngestHandle, IngestLoop, IngestState};
