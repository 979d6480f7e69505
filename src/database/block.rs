//! Compressed block descriptors and the walk over the block region.

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use byteorder::{ReadBytesExt, LE};
use tracing::trace;

use crate::common::errors::{BlockError, Error, Result};

/// Size in bytes of the prefix header carried by every compressed block.
pub(crate) const BLOCK_PREFIX_SIZE: u64 = 8;

#[derive(Debug, Clone)]
/// Location of one compressed block in the raw file and of its decompressed
/// bytes in the logical stream.
pub struct CompressedBlockDescriptor {
    /// Offset of the block payload in the raw file, past the prefix header.
    pub source_offset: u64,
    /// Size in bytes of the stored payload.
    pub compressed_size: u32,
    /// Declared size in bytes of the payload after decompression.
    pub uncompressed_size: u32,
    /// Offset of the block's first decompressed byte in the logical stream.
    pub logical_offset: u64,
}

impl CompressedBlockDescriptor {
    /// A block whose compressed size equals its uncompressed size carries
    /// its bytes stored raw, with no compression applied.
    pub(crate) fn is_stored_raw(&self) -> bool {
        self.compressed_size == self.uncompressed_size
    }
}

/// Walks the block region starting at `region_offset`, reading each block's
/// prefix header and skipping its payload, until the blocks account for
/// `expected_uncompressed_size` logical bytes.
///
/// The returned descriptors are contiguous in logical offset starting at 0.
/// A region that ends mid-prefix, a block declaring zero uncompressed bytes
/// and a size sum different from the expected total are all fatal.
pub(crate) fn walk_region<R: Read + Seek>(
    source: &mut R,
    region_offset: u64,
    expected_uncompressed_size: u64,
) -> Result<Vec<CompressedBlockDescriptor>> {
    let mut descriptors = Vec::new();
    let mut source_offset = region_offset;
    let mut logical_offset = 0u64;

    source.seek(SeekFrom::Start(region_offset))?;
    while logical_offset < expected_uncompressed_size {
        let compressed_size = read_prefix_value(source, source_offset)?;
        let uncompressed_size = read_prefix_value(source, source_offset)?;
        if uncompressed_size == 0 {
            return Err(BlockError::EmptyBlock(source_offset).into());
        }
        trace!(
            source_offset,
            compressed_size,
            uncompressed_size,
            logical_offset,
            "compressed block found"
        );
        descriptors.push(CompressedBlockDescriptor {
            source_offset: source_offset + BLOCK_PREFIX_SIZE,
            compressed_size,
            uncompressed_size,
            logical_offset,
        });
        logical_offset += u64::from(uncompressed_size);
        source_offset += BLOCK_PREFIX_SIZE + u64::from(compressed_size);
        source.seek(SeekFrom::Start(source_offset))?;
    }
    if logical_offset != expected_uncompressed_size {
        return Err(BlockError::UncompressedSizeMismatch {
            declared: logical_offset,
            expected: expected_uncompressed_size,
        }
        .into());
    }
    Ok(descriptors)
}

fn read_prefix_value<R: Read>(source: &mut R, block_offset: u64) -> Result<u32> {
    source.read_u32::<LE>().map_err(|error| {
        if error.kind() == ErrorKind::UnexpectedEof {
            BlockError::TruncatedRegion(block_offset).into()
        } else {
            Error::from(error)
        }
    })
}
