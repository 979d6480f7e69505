//! Main abstraction file for SuperFetch databases.

use std::{
    fs::File,
    io::{BufReader, Read, Seek},
    path::Path,
};

use tracing::debug;

use super::executable::ExecutableInformation;
use super::file::FileInformation;
use super::header::{FileHeader, FILE_HEADER_SIZE};
use super::parameters::DatabaseParameters;
use super::source::SourceInformation;
use super::stream::CompressedBlockStream;
use super::volume::VolumeInformation;
use crate::common::errors::{HeaderError, Result};

#[derive(Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
/// A fully parsed SuperFetch database.
///
/// Opening a database reads the file header, walks the compressed block
/// region and parses all records out of the uncompressed stream, in the
/// fixed order volumes, files, sources, executables. Opening is
/// all-or-nothing: on any failure nothing is constructed. After a
/// successful open the collections are immutable; records own all their
/// bytes, so the byte source is released before the constructor returns.
/// Dropping the database releases everything it owns.
pub struct DatabaseFile {
    /// The file header, as read from the start of the raw file.
    pub header: FileHeader,
    /// Format parameters discovered from the header area of the
    /// uncompressed stream.
    pub parameters: DatabaseParameters,
    /// Volume information records, in on-disk order.
    pub volumes: Vec<VolumeInformation>,
    /// File information records, in on-disk order.
    pub files: Vec<FileInformation>,
    /// Source information records, in on-disk order.
    pub sources: Vec<SourceInformation>,
    /// Executable information records, in on-disk order.
    pub executables: Vec<ExecutableInformation>,
}

impl DatabaseFile {
    /// Opens and fully parses the database at the given file path.
    pub fn from_path<T: AsRef<Path>>(file_path: T) -> Result<Self> {
        let file = File::open(file_path)?;
        Self::read(BufReader::new(file))
    }

    /// Fully parses a database from any seekable byte source.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * The header or the database parameters are not a recognized dialect
    /// * The compressed block region is corrupt or does not add up to the
    ///   declared data size
    /// * Any record phase ends before the declared record count is reached
    /// * Any I/O error occurs while reading
    pub fn read<R: Read + Seek>(mut source: R) -> Result<Self> {
        let mut header = FileHeader::default();
        header.read(&mut source)?;

        let mut stream =
            CompressedBlockStream::new(source, FILE_HEADER_SIZE, u64::from(header.data_size))?;

        // The uncompressed stream opens with its own copy of the file
        // header, followed by the parameter block that spans up to
        // header_size.
        let mut inner_header = FileHeader::default();
        inner_header.read(&mut stream)?;
        if !header.matches(&inner_header) {
            return Err(HeaderError::HeaderMismatch.into());
        }
        let mut parameters = DatabaseParameters::default();
        parameters.read(&mut stream, &header)?;

        let mut volumes = Vec::new();
        for index in 0..header.number_of_volumes {
            let (volume, _) = VolumeInformation::read(&mut stream, &parameters, index)?;
            volumes.push(volume);
        }
        debug!(count = volumes.len(), "volume information records read");

        let mut files = Vec::new();
        for index in 0..header.number_of_files {
            let (file, _) = FileInformation::read(&mut stream, &parameters, index)?;
            files.push(file);
        }
        debug!(count = files.len(), "file information records read");

        let mut sources = Vec::new();
        for index in 0..parameters.number_of_sources {
            let (source_record, _) = SourceInformation::read(&mut stream, &parameters, index)?;
            sources.push(source_record);
        }
        debug!(count = sources.len(), "source information records read");

        let mut executables = Vec::new();
        for index in 0..header.number_of_executables {
            let (executable, _) = ExecutableInformation::read(&mut stream, &parameters, index)?;
            executables.push(executable);
        }
        debug!(
            count = executables.len(),
            "executable information records read"
        );

        Ok(Self {
            header,
            parameters,
            volumes,
            files,
            sources,
            executables,
        })
    }

    /// Number of volume information records.
    #[must_use]
    pub fn volume_count(&self) -> usize {
        self.volumes.len()
    }

    /// Number of file information records.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Number of source information records.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Number of executable information records.
    #[must_use]
    pub fn executable_count(&self) -> usize {
        self.executables.len()
    }

    /// Volume information record by index, or [`None`] past the count.
    #[must_use]
    pub fn volume(&self, index: usize) -> Option<&VolumeInformation> {
        self.volumes.get(index)
    }

    /// File information record by index, or [`None`] past the count.
    #[must_use]
    pub fn file(&self, index: usize) -> Option<&FileInformation> {
        self.files.get(index)
    }

    /// Source information record by index, or [`None`] past the count.
    #[must_use]
    pub fn source(&self, index: usize) -> Option<&SourceInformation> {
        self.sources.get(index)
    }

    /// Executable information record by index, or [`None`] past the count.
    #[must_use]
    pub fn executable(&self, index: usize) -> Option<&ExecutableInformation> {
        self.executables.get(index)
    }
}
