//! Common errors used throughout `agdb-rs`.

use std::fmt;
use std::num::TryFromIntError;

use thiserror::Error;

#[derive(Error, Debug)]
/// Errors that can occur when reading the file header or the database
/// parameter block.
pub enum HeaderError {
    /// The database type tag is not one of the recognized values (1-6).
    #[error("Unsupported database type {0}!")]
    UnsupportedDatabaseType(u32),
    /// The declared header size is too small to contain the fixed header and
    /// the database parameter block.
    #[error("Header size {0} too small to hold the database parameters!")]
    HeaderSizeTooSmall(u32),
    /// The copy of the file header inside the uncompressed stream disagrees
    /// with the header read from the start of the file.
    #[error("Inner file header does not match the outer file header!")]
    HeaderMismatch,
    /// The volume information entry size is not in the accepted set.
    #[error("Unsupported volume information entry size {0}!")]
    UnsupportedVolumeEntrySize(u32),
    /// The file information entry size is not in the accepted set.
    /// This is the value that selects 32-bit or 64-bit record layouts, so
    /// nothing can be read without it.
    #[error("Unsupported file information entry size {0}!")]
    UnsupportedFileEntrySize(u32),
    /// The source information entry size is not in the accepted set.
    #[error("Unsupported source information entry size {0}!")]
    UnsupportedSourceEntrySize(u32),
    /// The executable information entry size is not in the accepted set.
    #[error("Unsupported executable information entry size {0}!")]
    UnsupportedExecutableEntrySize(u32),
    /// The file information sub entry type 1 size is not 16 or 24.
    #[error("Unsupported sub entry type 1 size {0}!")]
    UnsupportedSubEntryType1Size(u32),
    /// The file information sub entry type 2 size is not 16, 20, 24 or 32.
    #[error("Unsupported sub entry type 2 size {0}!")]
    UnsupportedSubEntryType2Size(u32),
}

#[derive(Error, Debug)]
/// Errors that can occur when walking or decompressing the compressed block
/// region.
pub enum BlockError {
    /// The block region ended in the middle of a block prefix or payload.
    #[error("Compressed block region is truncated at offset {0}!")]
    TruncatedRegion(u64),
    /// A block prefix declares zero uncompressed bytes, which would make the
    /// region walk unable to advance through the logical stream.
    #[error("Compressed block at offset {0} declares zero uncompressed bytes!")]
    EmptyBlock(u64),
    /// The uncompressed sizes declared by the block prefixes do not add up to
    /// the data size declared by the file header.
    #[error("Compressed blocks declare {declared} uncompressed bytes, header declares {expected}!")]
    UncompressedSizeMismatch { declared: u64, expected: u64 },
    /// The decompressor rejected a block payload.
    #[error("Block decompression failed!")]
    Decompression(#[from] lz4_flex::block::DecompressError),
    /// The decompressor produced output of a different size than the block
    /// prefix declared.
    #[error("Block decompressed to {actual} bytes, expected {expected}!")]
    WrongUncompressedSize { expected: u32, actual: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The four record phases of a database, used for error reporting.
pub enum RecordKind {
    Volume,
    File,
    Source,
    Executable,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Volume => write!(formatter, "volume"),
            Self::File => write!(formatter, "file"),
            Self::Source => write!(formatter, "source"),
            Self::Executable => write!(formatter, "executable"),
        }
    }
}

#[derive(Error, Debug)]
/// Errors that can occur when reading a record from the uncompressed stream.
pub enum RecordError {
    /// The stream ended before the record (entry data, path, padding or sub
    /// entries) was complete. Also raised when the header declares more
    /// records than the stream contains.
    #[error("{kind} information record {index} is truncated!")]
    Truncated { kind: RecordKind, index: u32 },
}

#[derive(Error, Debug)]
/// Standard error type used throughout `agdb-rs`.
pub enum Error {
    /// Any error originating from `std::io`, such as `UnexpectedEOF`.
    #[error("Failed to read from the byte source!")]
    Io(#[source] std::io::Error),
    /// Errors that can occur while reading the file header or parameters.
    #[error("Error occurred while reading the file header!")]
    Header(#[from] HeaderError),
    /// Errors that can occur while reading compressed blocks.
    #[error("Error occurred while reading a compressed block!")]
    Block(#[from] BlockError),
    /// Errors that can occur while reading a record.
    #[error("Error occurred while reading a record!")]
    Record(#[from] RecordError),
    /// Error that can occur when transcoding a path to UTF-8.
    #[error("Incorrect UTF-16 encoding found when transcoding a path!")]
    Utf16ReadingError(#[from] std::string::FromUtf16Error),
    /// The error type returned when a checked integral type conversion fails.
    #[error("Integer conversion failed!")]
    TryFromIntError(#[from] TryFromIntError),
}

/// Recovers a [`BlockError`] that the compressed stream had to smuggle
/// through [`std::io::Error`] to satisfy the [`std::io::Read`] contract, so
/// block corruption discovered lazily during a read keeps its own error
/// domain.
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        match error.downcast::<BlockError>() {
            Ok(block_error) => Self::Block(block_error),
            Err(error) => Self::Io(error),
        }
    }
}

/// Standard result type used throughout `agdb-rs`.
pub type Result<T> = std::result::Result<T, Error>;
