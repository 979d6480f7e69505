//! Source information records.

use std::io::Read;

use tracing::trace;

use super::parameters::DatabaseParameters;
use super::record_truncation;
use crate::common::errors::{RecordKind, Result};
use crate::common::extensions::ReaderExt;

#[derive(Default, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
/// Source information record.
///
/// Every field of these records is still unknown; the 24-byte and 32-byte
/// dialects differ only in size, so the entry is preserved verbatim rather
/// than decoded into guessed fields.
pub struct SourceInformation {
    entry_data: Vec<u8>,
}

impl SourceInformation {
    /// Reads one source information record from the uncompressed stream and
    /// returns it with the number of bytes consumed.
    pub(crate) fn read<R: Read>(
        reader: &mut R,
        parameters: &DatabaseParameters,
        index: u32,
    ) -> Result<(Self, u64)> {
        let entry_size = parameters.source_information_entry_size;
        let entry_data = reader
            .read_bytes(entry_size as usize)
            .map_err(|error| record_truncation(error, RecordKind::Source, index))?;
        trace!(index, entry_size, "source information record read");
        Ok((Self { entry_data }, u64::from(entry_size)))
    }

    /// The record's bytes, preserved verbatim.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.entry_data
    }
}
