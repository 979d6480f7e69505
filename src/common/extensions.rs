//! Extensions to readers.
//!
//! Implements `read_bytes` on top of any [`Read`] implementation, plus the
//! UTF-16 little-endian helpers used to transcode record paths on demand.
//! Record readers consume the uncompressed logical stream through these
//! helpers; nothing in the crate interprets multi-byte integers without
//! going through `byteorder`.

use std::io::Read;

use crate::common::errors::Result;

/// Extension trait adding fixed-length buffer reads to any reader.
pub trait ReaderExt: Read {
    /// Reads exactly `length` bytes into a freshly allocated buffer.
    ///
    /// # Errors
    ///
    /// Returns an `Err` wrapping the I/O error if the reader ends before
    /// `length` bytes are available.
    fn read_bytes(&mut self, length: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0; length];
        self.read_exact(&mut buffer)?;
        Ok(buffer)
    }
}

impl<R: Read + ?Sized> ReaderExt for R {}

/// Splits a UTF-16 little-endian byte stream into code units, dropping the
/// trailing NUL terminator if one is present. A trailing odd byte is
/// ignored.
#[must_use]
pub fn utf16le_code_units(stream: &[u8]) -> Vec<u16> {
    let mut units: Vec<u16> = stream
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    if units.last() == Some(&0) {
        units.pop();
    }
    units
}

/// Transcodes a NUL-terminated UTF-16 little-endian byte stream to a
/// [`String`].
pub fn utf16le_to_string(stream: &[u8]) -> Result<String> {
    Ok(String::from_utf16(&utf16le_code_units(stream))?)
}
