//! Database parameter block: the per-record entry sizes discovered from the
//! header area of the uncompressed stream.
//!
//! The parameter block sits between the inner file header copy and
//! `header_size`, and is what makes the rest of the database readable at
//! all: every record phase is a run of fixed-size entries whose size — and
//! with it the 32-bit or 64-bit field layout — is declared here. An entry
//! size outside the accepted sets is rejected here, before any record
//! reader runs.

use std::io::Read;

use byteorder::{ReadBytesExt, LE};
use tracing::debug;

use super::header::{FileHeader, FILE_HEADER_SIZE};
use crate::common::errors::{HeaderError, Result};
use crate::common::extensions::ReaderExt;

/// Size in bytes of the fixed part of the parameter block.
pub(crate) const PARAMETER_BLOCK_SIZE: u64 = 28;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
/// Width of the pointer-sized fields in record layouts, selected by the
/// file information entry size.
pub enum PointerMode {
    #[default]
    /// Entry sizes 36, 52, 56 and 72; 4-byte alignment.
    Bits32,
    /// Entry sizes 64, 88 and 112; 8-byte alignment.
    Bits64,
}

impl PointerMode {
    /// Alignment unit that variable-length record data is padded to.
    #[must_use]
    pub fn alignment_unit(self) -> u64 {
        match self {
            Self::Bits32 => 4,
            Self::Bits64 => 8,
        }
    }

    /// Number of padding bytes following `length` bytes of variable-length
    /// data.
    pub(crate) fn alignment_padding(self, length: u64) -> u64 {
        let remainder = length % self.alignment_unit();
        if remainder == 0 {
            0
        } else {
            self.alignment_unit() - remainder
        }
    }
}

#[derive(Default, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
/// Format parameters carried to all record readers.
pub struct DatabaseParameters {
    /// Size in bytes of one volume information entry.
    pub volume_information_entry_size: u32,
    /// Size in bytes of one file information entry. This value selects the
    /// pointer mode and alignment unit for the whole database.
    pub file_information_entry_size: u32,
    /// Size in bytes of one source information entry.
    pub source_information_entry_size: u32,
    /// Size in bytes of one executable information entry.
    pub executable_information_entry_size: u32,
    /// Size in bytes of the sub entries appended to each file information
    /// record.
    pub sub_entry_type1_size: u32,
    /// Size in bytes of the second sub entry dialect. Validated and carried
    /// for downstream consumers; no record read by this crate consumes it.
    pub sub_entry_type2_size: u32,
    /// Number of source information records. The outer header carries no
    /// source count, this is the only place it appears.
    pub number_of_sources: u32,
    /// Bytes between the fixed parameter block and `header_size`, preserved
    /// verbatim.
    pub trailing_data: Vec<u8>,
    /// Pointer width selected by the file information entry size.
    pub pointer_mode: PointerMode,
}

impl DatabaseParameters {
    /// Reads the parameter block from the uncompressed stream, which must be
    /// positioned just past the inner file header, and validates every entry
    /// size against the accepted sets.
    pub(crate) fn read<R: Read>(&mut self, reader: &mut R, header: &FileHeader) -> Result<()> {
        self.volume_information_entry_size = reader.read_u32::<LE>()?;
        self.file_information_entry_size = reader.read_u32::<LE>()?;
        self.source_information_entry_size = reader.read_u32::<LE>()?;
        self.executable_information_entry_size = reader.read_u32::<LE>()?;
        self.sub_entry_type1_size = reader.read_u32::<LE>()?;
        self.sub_entry_type2_size = reader.read_u32::<LE>()?;
        self.number_of_sources = reader.read_u32::<LE>()?;

        // header.read has already established header_size covers both fixed
        // areas.
        let trailing_size = u64::from(header.header_size) - FILE_HEADER_SIZE - PARAMETER_BLOCK_SIZE;
        self.trailing_data = reader.read_bytes(trailing_size as usize)?;

        self.pointer_mode = match self.file_information_entry_size {
            36 | 52 | 56 | 72 => PointerMode::Bits32,
            64 | 88 | 112 => PointerMode::Bits64,
            size => return Err(HeaderError::UnsupportedFileEntrySize(size).into()),
        };
        let accepted_volume_size = match self.pointer_mode {
            PointerMode::Bits32 => 56,
            PointerMode::Bits64 => 96,
        };
        if self.volume_information_entry_size != accepted_volume_size {
            return Err(
                HeaderError::UnsupportedVolumeEntrySize(self.volume_information_entry_size).into(),
            );
        }
        let accepted_source_size = match self.pointer_mode {
            PointerMode::Bits32 => 24,
            PointerMode::Bits64 => 32,
        };
        if self.source_information_entry_size != accepted_source_size {
            return Err(
                HeaderError::UnsupportedSourceEntrySize(self.source_information_entry_size).into(),
            );
        }
        let accepted_executable_size = match self.pointer_mode {
            PointerMode::Bits32 => 40,
            PointerMode::Bits64 => 64,
        };
        if self.executable_information_entry_size != accepted_executable_size {
            return Err(HeaderError::UnsupportedExecutableEntrySize(
                self.executable_information_entry_size,
            )
            .into());
        }
        if !matches!(self.sub_entry_type1_size, 16 | 24) {
            return Err(
                HeaderError::UnsupportedSubEntryType1Size(self.sub_entry_type1_size).into(),
            );
        }
        if !matches!(self.sub_entry_type2_size, 16 | 20 | 24 | 32) {
            return Err(
                HeaderError::UnsupportedSubEntryType2Size(self.sub_entry_type2_size).into(),
            );
        }
        debug!(
            pointer_mode = ?self.pointer_mode,
            file_information_entry_size = self.file_information_entry_size,
            volume_information_entry_size = self.volume_information_entry_size,
            source_information_entry_size = self.source_information_entry_size,
            executable_information_entry_size = self.executable_information_entry_size,
            number_of_sources = self.number_of_sources,
            "database parameters read"
        );
        Ok(())
    }

    /// Alignment unit of the selected pointer mode.
    #[must_use]
    pub fn alignment_unit(&self) -> u64 {
        self.pointer_mode.alignment_unit()
    }
}
