//! The single choke point for user-facing output.

use std::io;
use std::os::fd::AsFd;

use nix::errno::Errno;

/// Destination for everything a command prints.
pub trait OutputSink {
    /// Write `data` with exactly one underlying write.
    fn emit_bytes(&mut self, data: &[u8]) -> io::Result<()>;

    /// Write `text` with exactly one underlying write.
    fn emit(&mut self, text: &str) -> io::Result<()> {
        self.emit_bytes(text.as_bytes())
    }
}

/// Writes straight to file descriptor 1, bypassing std's line buffer.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        let stdout = io::stdout();
        let written = nix::unistd::write(stdout.as_fd(), data)?;
        check_complete(written, data.len())
    }
}

/// A write that moved fewer bytes than requested is an I/O error.
fn check_complete(written: usize, requested: usize) -> io::Result<()> {
    if written < requested {
        log::warn!("short write to stdout: {written} of {requested} bytes");
        return Err(Errno::EIO.into());
    }
    Ok(())
}

/// Records every emission in memory.
#[derive(Debug, Default, Clone)]
pub struct BufferSink {
    writes: Vec<Vec<u8>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Each emission, in order.
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    /// All emissions concatenated, lossily decoded.
    pub fn output(&self) -> String {
        let bytes: Vec<u8> = self.writes.concat();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl OutputSink for BufferSink {
    fn emit_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        self.writes.push(data.to_vec());
        Ok(())
    }
}
