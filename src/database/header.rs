//! File header of a SuperFetch database.
//!
//! The same 84-byte layout appears twice: once at the start of the raw file
//! and once at the start of the uncompressed stream. Both copies are read
//! with [`FileHeader::read`] and must agree on the fields that drive
//! parsing.

use std::io::Read;

use byteorder::{ReadBytesExt, LE};
use num_enum::TryFromPrimitive;
use tracing::debug;

use super::parameters::PARAMETER_BLOCK_SIZE;
use crate::common::errors::{HeaderError, Result};

/// Size in bytes of the fixed file header.
pub const FILE_HEADER_SIZE: u64 = 84;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
/// Database type tag stored in the file header.
///
/// The variants are named after the database file each value was observed
/// in; nothing in the record layouts dispatches on the tag, it only gates
/// whether the file is recognized at all.
pub enum DatabaseType {
    #[default]
    /// Observed in `AgAppLaunch.db`.
    AppLaunch = 1,
    /// Observed in `AgGlFaultHistory.db`.
    FaultHistory = 2,
    /// Observed in `AgGlFgAppHistory.db`.
    ForegroundAppHistory = 3,
    /// Observed in `AgGlGlobalHistory.db`.
    GlobalHistory = 4,
    /// Observed in `AgGlUAD.db`.
    UserActivity = 5,
    /// Observed in `AgRobust.db`.
    Robust = 6,
}

#[derive(Default, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
/// File header structure containing the layout of the database.
pub struct FileHeader {
    /// Unknown leading field.
    pub unknown1: u32,
    /// Size in bytes of the uncompressed data stream.
    pub data_size: u32,
    /// Size in bytes of the header area of the uncompressed stream. The
    /// volume records begin at this offset.
    pub header_size: u32,
    /// Classification tag of the database.
    pub database_type: DatabaseType,
    /// The database parameters. Nine 32-bit values whose meaning is still
    /// unknown, preserved verbatim.
    pub database_parameters: [u32; 9],
    /// Number of volume information records.
    pub number_of_volumes: u32,
    /// Number of file information records.
    pub number_of_files: u32,
    /// Unknown.
    pub unknown3: u32,
    /// Number of executable information records.
    pub number_of_executables: u32,
    /// Unknown.
    pub unknown4: u64,
    /// Unknown.
    pub unknown5: u64,
}

impl FileHeader {
    /// Reads the file header from the current position of the given reader.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * The database type tag is not a recognized value
    /// * The header size cannot contain the database parameter block
    /// * Any I/O error occurs while reading
    pub(crate) fn read<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        self.unknown1 = reader.read_u32::<LE>()?;
        self.data_size = reader.read_u32::<LE>()?;
        self.header_size = reader.read_u32::<LE>()?;
        let database_type = reader.read_u32::<LE>()?;
        self.database_type = DatabaseType::try_from_primitive(database_type)
            .map_err(|error| HeaderError::UnsupportedDatabaseType(error.number))?;
        for parameter in &mut self.database_parameters {
            *parameter = reader.read_u32::<LE>()?;
        }
        self.number_of_volumes = reader.read_u32::<LE>()?;
        self.number_of_files = reader.read_u32::<LE>()?;
        self.unknown3 = reader.read_u32::<LE>()?;
        self.number_of_executables = reader.read_u32::<LE>()?;
        self.unknown4 = reader.read_u64::<LE>()?;
        self.unknown5 = reader.read_u64::<LE>()?;

        if u64::from(self.header_size) < FILE_HEADER_SIZE + PARAMETER_BLOCK_SIZE {
            return Err(HeaderError::HeaderSizeTooSmall(self.header_size).into());
        }
        debug!(
            database_type = ?self.database_type,
            data_size = self.data_size,
            header_size = self.header_size,
            number_of_volumes = self.number_of_volumes,
            number_of_files = self.number_of_files,
            number_of_executables = self.number_of_executables,
            "file header read"
        );
        Ok(())
    }

    /// Whether a header copy read back from the uncompressed stream agrees
    /// with this one on the fields that drive parsing.
    pub(crate) fn matches(&self, other: &Self) -> bool {
        self.data_size == other.data_size
            && self.header_size == other.header_size
            && self.database_type == other.database_type
            && self.number_of_volumes == other.number_of_volumes
            && self.number_of_files == other.number_of_files
            && self.number_of_executables == other.number_of_executables
    }
}
