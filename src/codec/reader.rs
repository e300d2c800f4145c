//! Reader endpoints for the binary wire format: a cursor over an in-memory
//! byte slice, or a buffered file. Both implement [`Reader`] so
//! [`super::read_tree`] does not care which backend it was handed.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read as _};
use std::path::Path;

use crate::error::{PcError, PcResult};

/// A source of bytes consumed sequentially by [`super::read_tree`]. Over-read
/// past the end of the underlying data is an error, never a short read.
pub trait Reader {
    /// Reads exactly `len` bytes, advancing the cursor.
    fn read_bytes(&mut self, len: usize) -> PcResult<Vec<u8>>;
}

//------------ MemReader --------------------------------------------------------

/// A reader over an in-memory byte slice.
pub struct MemReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> MemReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        MemReader { data, pos: 0 }
    }
}

impl Reader for MemReader<'_> {
    fn read_bytes(&mut self, len: usize) -> PcResult<Vec<u8>> {
        let end = self.pos.checked_add(len).ok_or_else(|| {
            PcError::malformed("byte offset overflow while reading")
        })?;
        if end > self.data.len() {
            return Err(PcError::malformed(format!(
                "unexpected end of stream: wanted {len} bytes at offset {}, \
                 only {} available",
                self.pos,
                self.data.len() - self.pos
            )));
        }
        let out = self.data[self.pos..end].to_vec();
        self.pos = end;
        Ok(out)
    }
}

//------------ FileReader ---------------------------------------------------------

/// A reader over a file, opened read-only and buffered.
pub struct FileReader {
    inner: BufReader<File>,
    offset: usize,
}

impl FileReader {
    pub fn open(path: impl AsRef<Path>) -> PcResult<Self> {
        let file = File::open(path)?;
        Ok(FileReader { inner: BufReader::new(file), offset: 0 })
    }
}

impl Reader for FileReader {
    fn read_bytes(&mut self, len: usize) -> PcResult<Vec<u8>> {
        let mut buf = vec![0u8; len];
        if let Err(e) = self.inner.read_exact(&mut buf) {
            // `UnexpectedEof` means the stream is short, i.e. malformed
            // input; anything else (permission denied, disk error, ...) is
            // a genuine I/O failure and must stay `PcError::Io`, not be
            // folded into `Malformed`.
            return Err(if e.kind() == ErrorKind::UnexpectedEof {
                PcError::malformed(format!(
                    "unexpected end of file at offset {}: {e}",
                    self.offset
                ))
            } else {
                PcError::from(e)
            });
        }
        self.offset += len;
        Ok(buf)
    }
}
