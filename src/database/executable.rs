//! Executable information records.

use std::io::Read;

use tracing::trace;

use super::parameters::DatabaseParameters;
use super::record_truncation;
use crate::common::errors::{RecordKind, Result};
use crate::common::extensions::ReaderExt;

#[derive(Default, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
/// Executable information record.
///
/// Every field of these records is still unknown; the 40-byte and 64-byte
/// dialects differ only in size, so the entry is preserved verbatim rather
/// than decoded into guessed fields.
pub struct ExecutableInformation {
    entry_data: Vec<u8>,
}

impl ExecutableInformation {
    /// Reads one executable information record from the uncompressed stream
    /// and returns it with the number of bytes consumed.
    pub(crate) fn read<R: Read>(
        reader: &mut R,
        parameters: &DatabaseParameters,
        index: u32,
    ) -> Result<(Self, u64)> {
        let entry_size = parameters.executable_information_entry_size;
        let entry_data = reader
            .read_bytes(entry_size as usize)
            .map_err(|error| record_truncation(error, RecordKind::Executable, index))?;
        trace!(index, entry_size, "executable information record read");
        Ok((Self { entry_data }, u64::from(entry_size)))
    }

    /// The record's bytes, preserved verbatim.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.entry_data
    }
}
