//! Volume information records.

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
pub enum VolumeInformationVariant {
    /// 56-byte dialect.
    Bits32 {
        unknown1: u32,
        unknown2: u32,
        /// Bytes past the decoded fields, preserved verbatim.
        trailing_data: Vec<u8>,
    },
    /// 96-byte dialect.
    Bits64 {
        unknown1: u64,
        unknown2: u32,
        unknown3: u32,
        /// Bytes past the decoded fields, preserved verbatim.
        trailing_data: Vec<u8>,
    },
}

impl Default for VolumeInformationVariant {
    fn default() -> Self {
        Self::Bits32 {
            unknown1: 0,
            unknown2: 0,
            trailing_data: Vec::new(),
        }
    }
}

#[derive(Default, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
/// Volume information record.
pub struct VolumeInformation {
    /// On-disk device path length value.
    path_raw_length: u32,
    /// Raw UTF-16LE device path bytes, including the NUL terminator pair.
    device_path: Vec<u8>,
    /// Volume creation time as a Windows FILETIME value.
    pub creation_time: u64,
    /// Volume serial number.
    pub serial_number: u32,
    /// Dialect-dependent fields.
    pub variant: VolumeInformationVariant,
}

impl VolumeInformation {
    /// Reads one volume information record from the uncompressed stream:
    /// the fixed entry, the device path and the alignment padding. Returns
    /// the record and the total number of bytes consumed.
    pub(crate) fn read<R: Read>(
        reader: &mut R,
        parameters: &DatabaseParameters,
        index: u32,
    ) -> Result<(Self, u64)> {
        let entry_size = parameters.volume_information_entry_size as usize;
        let entry_data = reader
            .read_bytes(entry_size)
            .map_err(|error| record_truncation(error, RecordKind::Volume, index))?;

        let (path_raw_length, creation_time, serial_number, variant) = match parameters.pointer_mode
        {
            PointerMode::Bits32 => (
                LE::read_u32(&entry_data[4..8]),
                LE::read_u64(&entry_data[8..16]),
                LE::read_u32(&entry_data[16..20]),
                VolumeInformationVariant::Bits32 {
                    unknown1: LE::read_u32(&entry_data[0..4]),
                    unknown2: LE::read_u32(&entry_data[20..24]),
                    trailing_data: entry_data[24..].to_vec(),
                },
            ),
            PointerMode::Bits64 => (
                LE::read_u32(&entry_data[8..12]),
                LE::read_u64(&entry_data[16..24]),
                LE::read_u32(&entry_data[24..28]),
                VolumeInformationVariant::Bits64 {
                    unknown1: LE::read_u64(&entry_data[0..8]),
                    unknown2: LE::read_u32(&entry_data[12..16]),
                    unknown3: LE::read_u32(&entry_data[28..32]),
                    trailing_data: entry_data[32..].to_vec(),
                },
            ),
        };

        let mut total_read_count = entry_size as u64;
        let mut device_path = Vec::new();
        if path_raw_length != 0 {
            let path_size = path_size_from_raw(path_raw_length);
            device_path = reader
                .read_bytes(usize::try_from(path_size)?)
                .map_err(|error| record_truncation(error, RecordKind::Volume, index))?;
            total_read_count += path_size;

            let padding = parameters.pointer_mode.alignment_padding(path_size);
            if padding != 0 {
                reader
                    .read_bytes(padding as usize)
                    .map_err(|error| record_truncation(error, RecordKind::Volume, index))?;
                total_read_count += padding;
            }
        }
        trace!(index, total_read_count, "volume information record read");

        Ok((
            Self {
                path_raw_length,
                device_path,
                creation_time,
                serial_number,
                variant,
            },
            total_read_count,
        ))
    }

    /// Device path length in UTF-16 code units, excluding the NUL
    /// terminator.
    #[must_use]
    pub fn device_path_number_of_characters(&self) -> u32 {
        self.path_raw_length >> 2
    }

    /// The undocumented low bits of the on-disk device path length value.
    #[must_use]
    pub fn device_path_flags(&self) -> PathFlags {
        PathFlags::from_bits_truncate(self.path_raw_length)
    }

    /// Raw UTF-16LE device path bytes as stored on disk, including the NUL
    /// terminator pair.
    #[must_use]
    pub fn device_path_bytes(&self) -> &[u8] {
        &self.device_path
    }

    /// Device path as UTF-16 code units, without the NUL terminator.
    #[must_use]
    pub fn device_path_utf16(&self) -> Vec<u16> {
        utf16le_code_units(&self.device_path)
    }

    /// Device path transcoded to UTF-8 on demand.
    pub fn device_path(&self) -> Result<String> {
        utf16le_to_string(&self.device_path)
    }
}
