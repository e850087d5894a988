use crate::IngestResult;

/// Producer of raw text lines from the scanner transport.
///
/// `next_line` may block until the device prints another line. Severing
/// the underlying transport from another thread is the supported way to
/// unblock a pending read; once severed, this and every later call must
/// fail promptly so the ingest loop can reach its terminal state.
pub trait LineSource: Send {
    fn next_line(&mut self) -> IngestResult<String>;
}

impl<S: LineSource + ?Sized> LineSource for Box<S> {
    fn next_line(&mut self) -> IngestResult<String> {
        (**self).next_line()
    }
}
