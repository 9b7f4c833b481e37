//! Common test utilities.

use std::io::{self, ErrorKind, Write};

/// A writer that simulates a broken pipe (SIGPIPE scenario).
///
/// Every write fails with `ErrorKind::BrokenPipe`, as if stdout were connected
/// to a process that has exited.
pub struct BrokenPipeWriter;

impl Write for BrokenPipeWriter {
	fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
		Err(io::Error::new(ErrorKind::BrokenPipe, "broken pipe"))
	}

	fn flush(&mut self) -> io::Result<()> {
		Err(io::Error::new(ErrorKind::BrokenPipe, "broken pipe"))
	}
}
