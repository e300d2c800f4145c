//! Writer endpoints for the binary wire format: a growable in-memory buffer,
//! or an append-only file. Both implement [`Writer`] so [`super::write_tree`]
//! does not care which backend it was handed.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write as _};
use std::path::Path;

use crate::error::PcResult;

/// A sink for bytes produced sequentially by [`super::write_tree`].
pub trait Writer {
    fn write_bytes(&mut self, bytes: &[u8]) -> PcResult<()>;

    /// The number of bytes written so far.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//------------ MemWriter ----------------------------------------------------------

/// A growable in-memory byte buffer.
#[derive(Debug, Default)]
pub struct MemWriter {
    buf: Vec<u8>,
}

impl MemWriter {
    pub fn new() -> Self {
        MemWriter { buf: Vec::new() }
    }

    /// Copies out the accumulated bytes, consuming the writer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }
}

impl Writer for MemWriter {
    fn write_bytes(&mut self, bytes: &[u8]) -> PcResult<()> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn len(&self) -> usize {
        self.buf.len()
    }
}

//------------ FileWriter -----------------------------------------------------------

/// An append-only writer over a file, buffered, created (or truncated) on
/// open. The underlying `File` is closed when this value is dropped.
pub struct FileWriter {
    inner: BufWriter<File>,
    written: usize,
}

impl FileWriter {
    pub fn create(path: impl AsRef<Path>) -> PcResult<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(FileWriter { inner: BufWriter::new(file), written: 0 })
    }

    /// Flushes any buffered bytes to disk. Also run on drop, via `BufWriter`,
    /// but exposed so callers can surface a flush error explicitly.
    pub fn flush(&mut self) -> PcResult<()> {
        self.inner.flush()?;
        Ok(())
    }
}

impl Writer for FileWriter {
    fn write_bytes(&mut self, bytes: &[u8]) -> PcResult<()> {
        self.inner.write_all(bytes)?;
        self.written += bytes.len();
        Ok(())
    }

    fn len(&self) -> usize {
        self.written
    }
}
