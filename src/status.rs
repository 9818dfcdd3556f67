use crate::buffer::DeviceBuffer;
use crate::error::Error;

/// Render the diagnostic report for the current buffer state. Buffer
/// contents are copied as raw bytes.
pub fn format_report(buffer: &DeviceBuffer) -> Vec<u8> {
    let mut report = b"buffer = [".to_vec();
    report.extend_from_slice(buffer.contents());
    report.extend_from_slice(
        format!(
            "]\nwr_pos = {}\nrd_pos = {}\n",
            buffer.write_pos(),
            buffer.read_pos()
        )
        .as_bytes(),
    );
    report
}

/// Serves the diagnostic report in chunks, tracking its own cursor.
///
/// The report is re-rendered on every read, while `report_pos` carries over
/// between reads of the same session. If the buffer changes mid-session the
/// cursor indexes into the new text; once it is at or past the end of the
/// text, reads return nothing.
#[derive(Debug, Default)]
pub struct StatusReporter {
    report_pos: usize,
}

impl StatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report_pos(&self) -> usize {
        self.report_pos
    }

    pub fn begin_session(&mut self) {
        self.report_pos = 0;
    }

    /// Copy the next chunk of the report into `dest`. Returns 0 at end of
    /// report.
    pub fn read_into(
        &mut self,
        buffer: &DeviceBuffer,
        dest: &mut [u8],
        requested_len: usize,
    ) -> Result<usize, Error> {
        let report = format_report(buffer);
        let chunk = self.next_chunk(&report, requested_len);
        let dest = dest.get_mut(..chunk.len()).ok_or(Error::CopyFault)?;
        dest.copy_from_slice(chunk);
        self.report_pos += chunk.len();
        Ok(chunk.len())
    }

    /// Allocating variant of [`StatusReporter::read_into`].
    pub fn read(&mut self, buffer: &DeviceBuffer, requested_len: usize) -> Vec<u8> {
        let remaining = format_report(buffer).len().saturating_sub(self.report_pos);
        let mut out = vec![0; requested_len.min(remaining)];
        // `out` is sized for exactly what read_into copies.
        match self.read_into(buffer, &mut out, requested_len) {
            Ok(n) => out.truncate(n),
            Err(_) => out.clear(),
        }
        out
    }

    fn next_chunk<'a>(&self, report: &'a [u8], requested_len: usize) -> &'a [u8] {
        let remaining = report.len().saturating_sub(self.report_pos);
        let to_read = requested_len.min(remaining);
        if to_read == 0 {
            return &[];
        }
        &report[self.report_pos..self.report_pos + to_read]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Command;

    fn drain(reporter: &mut StatusReporter, buffer: &DeviceBuffer, chunk: usize) -> Vec<u8> {
        let mut out = Vec::new();
        loop {
            let part = reporter.read(buffer, chunk);
            if part.is_empty() {
                break;
            }
            assert!(part.len() <= chunk);
            out.extend(part);
        }
        out
    }

    #[test]
    fn test_format_report() {
        let mut buffer = DeviceBuffer::new(10);
        assert_eq!(format_report(&buffer), b"buffer = []\nwr_pos = 0\nrd_pos = 0\n");

        buffer.write(b"hello", 5);
        buffer.read(2);
        assert_eq!(
            format_report(&buffer),
            b"buffer = [hello]\nwr_pos = 5\nrd_pos = 2\n"
        );
    }

    #[test]
    fn test_chunked_session_returns_report_once() {
        let mut buffer = DeviceBuffer::new(32);
        buffer.write(b"some diagnostic text", 20);
        let mut reporter = StatusReporter::new();
        reporter.begin_session();

        let out = drain(&mut reporter, &buffer, 8);
        assert_eq!(out, format_report(&buffer));
        assert_eq!(reporter.read(&buffer, 8), b"");
        assert_eq!(reporter.read(&buffer, 8), b"");
    }

    #[test]
    fn test_report_keeps_raw_bytes() {
        let mut buffer = DeviceBuffer::new(4);
        buffer.write(&[0xFF, b'a'], 2);
        let mut reporter = StatusReporter::new();
        reporter.begin_session();

        let out = drain(&mut reporter, &buffer, 8);
        let mut expected = b"buffer = [".to_vec();
        expected.extend_from_slice(&[0xFF, b'a']);
        expected.extend_from_slice(b"]\nwr_pos = 2\nrd_pos = 0\n");
        assert_eq!(out, expected);
        assert_eq!(reporter.report_pos(), expected.len());
    }

    #[test]
    fn test_begin_session_rewinds() {
        let buffer = DeviceBuffer::new(4);
        let mut reporter = StatusReporter::new();
        let first = drain(&mut reporter, &buffer, 5);
        assert!(reporter.read(&buffer, 5).is_empty());

        reporter.begin_session();
        assert_eq!(reporter.report_pos(), 0);
        assert_eq!(drain(&mut reporter, &buffer, 100), first);
    }

    #[test]
    fn test_report_after_reset_all() {
        let mut buffer = DeviceBuffer::new(8);
        buffer.write(b"abcdef", 6);
        buffer.read(3);
        buffer.control(Command::ResetAll);

        let mut reporter = StatusReporter::new();
        let out = drain(&mut reporter, &buffer, 8);
        assert_eq!(out, b"buffer = []\nwr_pos = 0\nrd_pos = 0\n");
    }

    #[test]
    fn test_report_shrinking_mid_session_ends_it() {
        let mut buffer = DeviceBuffer::new(64);
        buffer.write(&[b'x'; 40], 40);
        let mut reporter = StatusReporter::new();
        reporter.begin_session();
        assert_eq!(reporter.read(&buffer, 45).len(), 45);

        buffer.control(Command::ResetAll);
        assert!(reporter.read(&buffer, 8).is_empty());
        assert_eq!(reporter.report_pos(), 45);
    }

    #[test]
    fn test_report_growing_mid_session_continues_at_cursor() {
        let mut buffer = DeviceBuffer::new(16);
        buffer.write(b"ab", 2);
        let mut reporter = StatusReporter::new();
        assert_eq!(reporter.read(&buffer, 10), b"buffer = [");

        buffer.write(b"cd", 2);
        assert_eq!(reporter.read(&buffer, 5), b"abcd]");
    }

    #[test]
    fn test_read_into_fault_keeps_cursor() {
        let buffer = DeviceBuffer::new(4);
        let mut reporter = StatusReporter::new();
        let mut dest = [0u8; 4];
        assert_eq!(reporter.read_into(&buffer, &mut dest, 8), Err(Error::CopyFault));
        assert_eq!(reporter.report_pos(), 0);

        assert_eq!(reporter.read_into(&buffer, &mut dest, 4), Ok(4));
        assert_eq!(&dest, b"buff");
        assert_eq!(reporter.report_pos(), 4);
    }
}
