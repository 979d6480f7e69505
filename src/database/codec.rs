//! Single-block decompression codec.
//!
//! The codec is a pure function over one block payload: callers locate block
//! boundaries, the codec only inflates. The compression primitive itself is
//! delegated to `lz4_flex`; everything format-specific (the declared-size
//! contract) is enforced here, so the primitive can be swapped without
//! touching any caller.

use crate::common::errors::BlockError;

/// Decompresses one block payload to exactly `expected_size` bytes.
///
/// Output shorter or longer than the size declared by the block prefix is
/// rejected, even when the payload itself decoded cleanly.
pub fn decompress(compressed: &[u8], expected_size: u32) -> Result<Vec<u8>, BlockError> {
    let decompressed = lz4_flex::block::decompress(compressed, expected_size as usize)?;
    if decompressed.len() != expected_size as usize {
        return Err(BlockError::WrongUncompressedSize {
            expected: expected_size,
            actual: decompressed.len(),
        });
    }
    Ok(decompressed)
}
