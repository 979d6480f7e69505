//! File information records.
//!
//! These are the bulk of a database: one record per tracked file, carrying
//! the file's name hash, its path and a run of fixed-size sub entries. The
//! fixed part of the record comes in seven entry-size dialects; the 32-bit
//! and 64-bit bases are decoded field by field, everything past the base is
//! preserved verbatim.

use std::io::Read;

use byteorder::{ByteOrder, LE};
use tracing::trace;

use super::parameters::{DatabaseParameters, PointerMode};
use super::{path_size_from_raw, record_truncation, PathFlags};
use crate::common::errors::{RecordKind, Result};
use crate::common::extensions::{utf16le_code_units, utf16le_to_string, ReaderExt};

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
/// Fields whose width or presence depends on the entry-size dialect.
pub enum FileInformationVariant {
    /// 36, 52, 56 and 72 byte dialects.
    Bits32 {
        unknown1: u32,
        /// 32-bit hash of the file path.
        name_hash: u32,
        unknown2: u64,
        unknown3: u32,
        /// Bytes past the 32-byte base, preserved verbatim. Empty only for
        /// hypothetical 32-byte entries; 4 to 40 bytes in practice.
        trailing_data: Vec<u8>,
    },
    /// 64, 88 and 112 byte dialects.
    Bits64 {
        unknown1: u32,
        /// 64-bit hash of the file path.
        name_hash: u64,
        unknown2: u32,
        unknown3: u64,
        unknown4: u64,
        unknown5: u32,
        /// Bytes past the 48-byte base, preserved verbatim.
        trailing_data: Vec<u8>,
    },
}

impl Default for FileInformationVariant {
    fn default() -> Self {
        Self::Bits32 {
            unknown1: 0,
            name_hash: 0,
            unknown2: 0,
            unknown3: 0,
            trailing_data: Vec::new(),
        }
    }
}

#[derive(Default, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
/// File information record.
pub struct FileInformation {
    /// Number of sub entries appended to the record.
    pub number_of_entries: u32,
    /// Record flags. Individual bits are not yet understood.
    pub flags: u32,
    /// On-disk path length value: character count shifted left by two, low
    /// bits preserved as [`PathFlags`].
    path_raw_length: u32,
    /// Raw UTF-16LE path bytes, including the NUL terminator pair. Empty
    /// when the record carries no path.
    path: Vec<u8>,
    /// Sub entries of the globally declared type 1 size, stored opaquely.
    pub sub_entries: Vec<Vec<u8>>,
    /// Dialect-dependent fields.
    pub variant: FileInformationVariant,
}

impl FileInformation {
    /// Reads one file information record from the uncompressed stream:
    /// the fixed entry, the optional path, the alignment padding and the
    /// sub entries. Returns the record and the total number of bytes
    /// consumed.
    pub(crate) fn read<R: Read>(
        reader: &mut R,
        parameters: &DatabaseParameters,
        index: u32,
    ) -> Result<(Self, u64)> {
        let entry_size = parameters.file_information_entry_size as usize;
        let entry_data = reader
            .read_bytes(entry_size)
            .map_err(|error| record_truncation(error, RecordKind::File, index))?;

        let (number_of_entries, flags, path_raw_length, variant) = match parameters.pointer_mode {
            PointerMode::Bits32 => (
                LE::read_u32(&entry_data[8..12]),
                LE::read_u32(&entry_data[12..16]),
                LE::read_u32(&entry_data[28..32]),
                FileInformationVariant::Bits32 {
                    unknown1: LE::read_u32(&entry_data[0..4]),
                    name_hash: LE::read_u32(&entry_data[4..8]),
                    unknown2: LE::read_u64(&entry_data[16..24]),
                    unknown3: LE::read_u32(&entry_data[24..28]),
                    trailing_data: entry_data[32..].to_vec(),
                },
            ),
            PointerMode::Bits64 => (
                LE::read_u32(&entry_data[16..20]),
                LE::read_u32(&entry_data[4..8]),
                LE::read_u32(&entry_data[40..44]),
                FileInformationVariant::Bits64 {
                    unknown1: LE::read_u32(&entry_data[0..4]),
                    name_hash: LE::read_u64(&entry_data[8..16]),
                    unknown2: LE::read_u32(&entry_data[20..24]),
                    unknown3: LE::read_u64(&entry_data[24..32]),
                    unknown4: LE::read_u64(&entry_data[32..40]),
                    unknown5: LE::read_u32(&entry_data[44..48]),
                    trailing_data: entry_data[48..].to_vec(),
                },
            ),
        };

        let mut total_read_count = entry_size as u64;
        let mut path = Vec::new();
        if path_raw_length != 0 {
            let path_size = path_size_from_raw(path_raw_length);
            path = reader
                .read_bytes(usize::try_from(path_size)?)
                .map_err(|error| record_truncation(error, RecordKind::File, index))?;
            total_read_count += path_size;

            let padding = parameters.pointer_mode.alignment_padding(path_size);
            if padding != 0 {
                reader
                    .read_bytes(padding as usize)
                    .map_err(|error| record_truncation(error, RecordKind::File, index))?;
                total_read_count += padding;
            }
        }

        let mut sub_entries = Vec::new();
        for _ in 0..number_of_entries {
            let sub_entry = reader
                .read_bytes(parameters.sub_entry_type1_size as usize)
                .map_err(|error| record_truncation(error, RecordKind::File, index))?;
            total_read_count += u64::from(parameters.sub_entry_type1_size);
            sub_entries.push(sub_entry);
        }
        trace!(
            index,
            number_of_entries,
            total_read_count,
            "file information record read"
        );

        Ok((
            Self {
                number_of_entries,
                flags,
                path_raw_length,
                path,
                sub_entries,
                variant,
            },
            total_read_count,
        ))
    }

    /// Hash of the file path, widened to 64 bits in the 32-bit dialects.
    #[must_use]
    pub fn name_hash(&self) -> u64 {
        match &self.variant {
            FileInformationVariant::Bits32 { name_hash, .. } => u64::from(*name_hash),
            FileInformationVariant::Bits64 { name_hash, .. } => *name_hash,
        }
    }

    /// Path length in UTF-16 code units, excluding the NUL terminator.
    #[must_use]
    pub fn path_number_of_characters(&self) -> u32 {
        self.path_raw_length >> 2
    }

    /// The undocumented low bits of the on-disk path length value.
    #[must_use]
    pub fn path_flags(&self) -> PathFlags {
        PathFlags::from_bits_truncate(self.path_raw_length)
    }

    /// Raw UTF-16LE path bytes as stored on disk, including the NUL
    /// terminator pair. Empty when the record carries no path.
    #[must_use]
    pub fn path_bytes(&self) -> &[u8] {
        &self.path
    }

    /// Path as UTF-16 code units, without the NUL terminator.
    #[must_use]
    pub fn path_utf16(&self) -> Vec<u16> {
        utf16le_code_units(&self.path)
    }

    /// Path transcoded to UTF-8 on demand.
    pub fn path(&self) -> Result<String> {
        utf16le_to_string(&self.path)
    }
}
