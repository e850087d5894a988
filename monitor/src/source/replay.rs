use anyhow::Context;
use scancore::{IngestError, IngestResult, LineSource};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Replays a captured scanner session from a text file, one line per
/// read, ending the session with `EndOfStream` at the end of the file.
pub struct ReplaySource {
    reader: BufReader<File>,
}

impl ReplaySource {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let file = File::open(path_ref)
            .with_context(|| format!("opening capture file {}", path_ref.display()))?;
        Ok(Self {
            reader: BufReader::new(file),
        })
    }
}

impl LineSource for ReplaySource {
    fn next_line(&mut self) -> IngestResult<String> {
        let mut line = String::new();
        let bytes = self.reader.read_line(&mut line)?;
        if bytes == 0 {
            return Err(IngestError::EndOfStream);
        }
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn replay_yields_each_line_then_end_of_stream() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"0 16\n## scanner noise\n12 8\n").unwrap();
        let path = temp.into_temp_path();

        let mut source = ReplaySource::open(&path).unwrap();
        assert_eq!(source.next_line().unwrap(), "0 16\n");
        assert_eq!(source.next_line().unwrap(), "## scanner noise\n");
        assert_eq!(source.next_line().unwrap(), "12 8\n");
        assert!(matches!(source.next_line(), Err(IngestError::EndOfStream)));
    }
}
