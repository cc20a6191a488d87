//! Bounded command writer
//!
//! Wraps the caller's output buffer. Every append checks the remaining room
//! and fails with [`CapacityError::BufferOverflow`] instead of truncating.

use charlcd_core::CapacityError;

pub struct CommandWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> CommandWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, len: 0 }
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn written(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn push(&mut self, byte: u8) -> Result<(), CapacityError> {
        self.extend(&[byte])
    }

    pub fn extend(&mut self, bytes: &[u8]) -> Result<(), CapacityError> {
        let end = self.len + bytes.len();
        if end > self.buf.len() {
            return Err(CapacityError::BufferOverflow {
                needed: end,
                capacity: self.buf.len(),
            });
        }
        self.buf[self.len..end].copy_from_slice(bytes);
        self.len = end;
        Ok(())
    }

    /// `count` copies of `bytes`
    pub fn repeat(&mut self, bytes: &[u8], count: usize) -> Result<(), CapacityError> {
        for _ in 0..count {
            self.extend(bytes)?;
        }
        Ok(())
    }

    /// Total length, for returning from an encoder
    pub fn finish(self) -> usize {
        self.len
    }
}
