//! SuperFetch database parsing: header, compressed block stream and the
//! four record readers.

pub mod block;
pub mod codec;
pub mod executable;
pub mod file;
pub mod header;
pub mod loader;
pub mod parameters;
pub mod source;
pub mod stream;
pub mod volume;

use bitflags::bitflags;

use crate::common::errors::{Error, RecordError, RecordKind};

bitflags! {
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    /// The low two bits of an on-disk path length value.
    ///
    /// The on-disk value stores the character count shifted left by two; the
    /// bits shifted off are observed to be non-zero in real databases but
    /// their meaning is undocumented. They are preserved verbatim so records
    /// survive a parse round-trip.
    pub struct PathFlags: u32 {
        const UNKNOWN_BIT_0 = 0b01;
        const UNKNOWN_BIT_1 = 0b10;
    }
}

/// Number of path bytes that follow a record whose on-disk path length value
/// is `raw`: the character count (`raw >> 2`) in UTF-16LE code units plus the
/// trailing NUL pair. Only valid for `raw != 0`; a zero value means no path
/// bytes at all.
pub(crate) fn path_size_from_raw(raw: u32) -> u64 {
    u64::from(raw >> 2) * 2 + 2
}

/// Maps a short read inside a record to [`RecordError::Truncated`] so the
/// caller can tell which record of which phase ended the stream. Any other
/// error passes through unchanged, in particular block corruption discovered
/// while the stream decompresses on demand.
pub(crate) fn record_truncation(error: Error, kind: RecordKind, index: u32) -> Error {
    match error {
        Error::Io(io_error) if io_error.kind() == std::io::ErrorKind::UnexpectedEof => {
            Error::Record(RecordError::Truncated { kind, index })
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_size_from_raw() {
        // 10 characters, both flag bits clear.
        assert_eq!(path_size_from_raw(10 << 2), 22);
        // Flag bits do not change the byte count.
        assert_eq!(path_size_from_raw((10 << 2) | 0b01), 22);
        assert_eq!(path_size_from_raw((10 << 2) | 0b11), 22);
        // A value with zero characters still carries the NUL pair.
        assert_eq!(path_size_from_raw(0b01), 2);
    }

    #[test]
    fn test_record_truncation_maps_short_reads_only() {
        let eof = Error::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "short read",
        ));
        assert!(matches!(
            record_truncation(eof, RecordKind::File, 3),
            Error::Record(RecordError::Truncated {
                kind: RecordKind::File,
                index: 3,
            })
        ));

        let other = Error::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(matches!(
            record_truncation(other, RecordKind::File, 3),
            Error::Io(_)
        ));
    }
}
