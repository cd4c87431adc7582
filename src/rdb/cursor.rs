use bytes::Bytes;

use crate::rdb::error::DecodeError;

/// Positional reader over the raw RDB bytes.
///
/// The cursor owns the read offset rather than relying on any underlying
/// file position, so every read is positional and the offset only ever
/// moves forward. A second counter tracks the bytes consumed by the object
/// currently being loaded; the object loader resets it before each load.
#[derive(Debug)]
pub struct Cursor {
    data: Bytes,
    offset: usize,
    object_bytes: usize,
}

impl Cursor {
    pub fn new(data: Bytes) -> Self {
        Self {
            data,
            offset: 0,
            object_bytes: 0,
        }
    }

    /// Offset of the next unread byte.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes consumed since the last [`reset_object_bytes`](Self::reset_object_bytes).
    pub fn object_bytes(&self) -> usize {
        self.object_bytes
    }

    pub fn reset_object_bytes(&mut self) {
        self.object_bytes = 0;
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Yields the next `len` bytes and advances both counters by `len`.
    /// A short read is fatal for the whole parse.
    pub fn take(&mut self, len: usize) -> Result<Bytes, DecodeError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(DecodeError::ShortRead {
                offset: self.offset,
                needed: len,
                available: self.data.len() - self.offset,
            })?;

        let slice = self.data.slice(self.offset..end);
        self.offset = end;
        self.object_bytes += len;
        Ok(slice)
    }

    pub fn take_byte(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }
}
