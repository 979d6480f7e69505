//! Seekable read-only stream over the concatenation of decompressed blocks.

use std::io::{self, Read, Seek, SeekFrom};

use tracing::{debug, trace};

use super::block::{walk_region, CompressedBlockDescriptor};
use super::codec;
use crate::common::errors::{BlockError, Result};

/// Decompressed bytes of the most recently used block.
struct CachedBlock {
    index: usize,
    data: Vec<u8>,
}

/// Presents the contiguous run of compressed blocks as one seekable,
/// read-only stream of their decompressed bytes.
///
/// Blocks are decompressed lazily, on the first read that touches them. Only
/// the most recently used block's buffer is kept alive, and it is released
/// before the next block is decompressed, so a read spanning any number of
/// blocks never holds more than two decompressed buffers at once.
pub struct CompressedBlockStream<R> {
    source: R,
    blocks: Vec<CompressedBlockDescriptor>,
    uncompressed_size: u64,
    position: u64,
    cached: Option<CachedBlock>,
}

impl<R: Read + Seek> CompressedBlockStream<R> {
    /// Enumerates the block region starting at `region_offset` and builds the
    /// logical-offset index. `uncompressed_size` is the total declared by the
    /// file header; the blocks must account for exactly that many bytes.
    pub fn new(mut source: R, region_offset: u64, uncompressed_size: u64) -> Result<Self> {
        let blocks = walk_region(&mut source, region_offset, uncompressed_size)?;
        debug!(
            blocks = blocks.len(),
            uncompressed_size, "compressed block region walked"
        );
        Ok(Self {
            source,
            blocks,
            uncompressed_size,
            position: 0,
            cached: None,
        })
    }

    /// Total size in bytes of the logical stream.
    #[must_use]
    pub fn uncompressed_size(&self) -> u64 {
        self.uncompressed_size
    }

    /// Number of blocks backing the stream.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Index of the block containing `position`. A position exactly on a
    /// block boundary belongs to the block that starts there.
    fn block_index_at(&self, position: u64) -> usize {
        self.blocks
            .partition_point(|block| block.logical_offset <= position)
            - 1
    }

    /// Makes block `index` resident and returns its decompressed bytes.
    fn load_block(&mut self, index: usize) -> io::Result<&[u8]> {
        let resident = self.cached.as_ref().map(|cached| cached.index);
        if resident != Some(index) {
            // The previous buffer is released before the next block is
            // decompressed.
            self.cached = None;
            let block = &self.blocks[index];
            self.source.seek(SeekFrom::Start(block.source_offset))?;
            let mut payload = vec![0u8; block.compressed_size as usize];
            let payload_offset = block.source_offset;
            self.source.read_exact(&mut payload).map_err(|error| {
                if error.kind() == io::ErrorKind::UnexpectedEof {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        BlockError::TruncatedRegion(payload_offset),
                    )
                } else {
                    error
                }
            })?;
            let data = if block.is_stored_raw() {
                payload
            } else {
                codec::decompress(&payload, block.uncompressed_size)
                    .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?
            };
            trace!(index, size = data.len(), "block made resident");
            self.cached = Some(CachedBlock { index, data });
        }
        match &self.cached {
            Some(cached) => Ok(&cached.data),
            // Unreachable; exists to act as an assert.
            None => Err(io::Error::other("block cache empty after load")),
        }
    }
}

impl<R: Read + Seek> Read for CompressedBlockStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut written = 0;
        while written < buf.len() && self.position < self.uncompressed_size {
            let index = self.block_index_at(self.position);
            let start = (self.position - self.blocks[index].logical_offset) as usize;
            let data = self.load_block(index)?;
            let available = data.len() - start;
            let count = available.min(buf.len() - written);
            buf[written..written + count].copy_from_slice(&data[start..start + count]);
            written += count;
            self.position += count as u64;
        }
        Ok(written)
    }
}

impl<R: Read + Seek> Seek for CompressedBlockStream<R> {
    fn seek(&mut self, position: SeekFrom) -> io::Result<u64> {
        let target = match position {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::End(delta) => i128::from(self.uncompressed_size) + i128::from(delta),
            SeekFrom::Current(delta) => i128::from(self.position) + i128::from(delta),
        };
        if target < 0 || target > i128::from(u64::MAX) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek outside the logical stream",
            ));
        }
        self.position = target as u64;
        Ok(self.position)
    }
}
