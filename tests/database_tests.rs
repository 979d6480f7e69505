//! End-to-end tests over complete synthetic databases.
//!
//! Each test assembles the uncompressed logical stream (inner header copy,
//! parameter block, records), wraps it into a raw file (outer header plus
//! compressed block region) and opens it through the public API.

use std::io::Cursor;

use agdb_rs::common::errors::{BlockError, Error, HeaderError, RecordError, RecordKind};
use agdb_rs::database::header::DatabaseType;
use agdb_rs::database::PathFlags;
use agdb_rs::DatabaseFile;
use tracing::{subscriber::set_global_default, Level};
use tracing_subscriber::FmtSubscriber;

const HEADER_SIZE: u32 = 112;

/// Captures the parse-time debug events of whichever test runs first; the
/// global default can only be installed once per test binary.
fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_test_writer()
        .finish();
    let _ = set_global_default(subscriber);
}

/// Entry sizes implied by a file information entry size.
struct Layout {
    volume: u32,
    source: u32,
    executable: u32,
}

fn layout(file_entry_size: u32) -> Layout {
    match file_entry_size {
        36 | 52 | 56 | 72 => Layout {
            volume: 56,
            source: 24,
            executable: 40,
        },
        64 | 88 | 112 => Layout {
            volume: 96,
            source: 32,
            executable: 64,
        },
        size => panic!("unexpected file entry size {size}"),
    }
}

fn header_bytes(
    data_size: u32,
    number_of_volumes: u32,
    number_of_files: u32,
    number_of_executables: u32,
) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&0x0BAD_F00Du32.to_le_bytes()); // unknown1
    bytes.extend_from_slice(&data_size.to_le_bytes());
    bytes.extend_from_slice(&HEADER_SIZE.to_le_bytes());
    bytes.extend_from_slice(&1u32.to_le_bytes()); // AppLaunch
    bytes.extend_from_slice(&[0x5C; 36]); // database parameters
    bytes.extend_from_slice(&number_of_volumes.to_le_bytes());
    bytes.extend_from_slice(&number_of_files.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes()); // unknown3
    bytes.extend_from_slice(&number_of_executables.to_le_bytes());
    bytes.extend_from_slice(&0u64.to_le_bytes()); // unknown4
    bytes.extend_from_slice(&0u64.to_le_bytes()); // unknown5
    assert_eq!(bytes.len(), 84);
    bytes
}

fn parameter_bytes(
    volume_entry_size: u32,
    file_entry_size: u32,
    source_entry_size: u32,
    executable_entry_size: u32,
    number_of_sources: u32,
) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&volume_entry_size.to_le_bytes());
    bytes.extend_from_slice(&file_entry_size.to_le_bytes());
    bytes.extend_from_slice(&source_entry_size.to_le_bytes());
    bytes.extend_from_slice(&executable_entry_size.to_le_bytes());
    bytes.extend_from_slice(&16u32.to_le_bytes()); // sub entry type 1
    bytes.extend_from_slice(&16u32.to_le_bytes()); // sub entry type 2
    bytes.extend_from_slice(&number_of_sources.to_le_bytes());
    assert_eq!(bytes.len(), 28);
    bytes
}

/// Assembles the logical stream: inner header, parameter block, records.
fn logical_stream(
    file_entry_size: u32,
    declared_counts: (u32, u32, u32, u32),
    records: &[u8],
) -> Vec<u8> {
    let (number_of_volumes, number_of_files, number_of_sources, number_of_executables) =
        declared_counts;
    let lay = layout(file_entry_size);
    let data_size = HEADER_SIZE + records.len() as u32;
    let mut logical = header_bytes(
        data_size,
        number_of_volumes,
        number_of_files,
        number_of_executables,
    );
    logical.extend_from_slice(&parameter_bytes(
        lay.volume,
        file_entry_size,
        lay.source,
        lay.executable,
        number_of_sources,
    ));
    logical.extend_from_slice(records);
    logical
}

/// Wraps a logical stream into a raw database file: the outer header is the
/// copy at the start of the stream, the block region covers the whole
/// stream.
fn raw_database(logical: &[u8], block_size: usize, compress: bool) -> Vec<u8> {
    let mut raw = logical[..84].to_vec();
    for chunk in logical.chunks(block_size) {
        if compress {
            let payload = lz4_flex::block::compress(chunk);
            assert_ne!(payload.len(), chunk.len());
            raw.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            raw.extend_from_slice(&(chunk.len() as u32).to_le_bytes());
            raw.extend_from_slice(&payload);
        } else {
            raw.extend_from_slice(&(chunk.len() as u32).to_le_bytes());
            raw.extend_from_slice(&(chunk.len() as u32).to_le_bytes());
            raw.extend_from_slice(chunk);
        }
    }
    raw
}

fn utf16_path(path: &str) -> Vec<u8> {
    let mut bytes: Vec<u8> = path.encode_utf16().flat_map(u16::to_le_bytes).collect();
    bytes.extend_from_slice(&[0, 0]);
    bytes
}

fn path_raw(path: &str, flag_bits: u32) -> u32 {
    let characters = path.encode_utf16().count() as u32;
    (characters << 2) | flag_bits
}

/// Path bytes followed by the padding that restores alignment.
fn path_with_padding(path: &str, alignment: u64) -> Vec<u8> {
    let mut bytes = utf16_path(path);
    let padding = (alignment - (bytes.len() as u64 % alignment)) % alignment;
    bytes.extend(std::iter::repeat(0xAB).take(padding as usize));
    bytes
}

fn file_entry_32(entry_size: usize, number_of_entries: u32, raw_path_length: u32) -> Vec<u8> {
    let mut entry = Vec::with_capacity(entry_size);
    entry.extend_from_slice(&0x1111_1111u32.to_le_bytes()); // unknown1
    entry.extend_from_slice(&0xC0FE_C0DEu32.to_le_bytes()); // name hash
    entry.extend_from_slice(&number_of_entries.to_le_bytes());
    entry.extend_from_slice(&0x8000_0001u32.to_le_bytes()); // flags
    entry.extend_from_slice(&0u64.to_le_bytes()); // unknown2
    entry.extend_from_slice(&0u32.to_le_bytes()); // unknown3
    entry.extend_from_slice(&raw_path_length.to_le_bytes());
    entry.resize(entry_size, 0x44);
    entry
}

fn file_entry_64(entry_size: usize, number_of_entries: u32, raw_path_length: u32) -> Vec<u8> {
    let mut entry = Vec::with_capacity(entry_size);
    entry.extend_from_slice(&0x1111_1111u32.to_le_bytes()); // unknown1
    entry.extend_from_slice(&0x8000_0001u32.to_le_bytes()); // flags
    entry.extend_from_slice(&0xC0FE_C0DE_DEAD_BEEFu64.to_le_bytes()); // name hash
    entry.extend_from_slice(&number_of_entries.to_le_bytes());
    entry.extend_from_slice(&0u32.to_le_bytes()); // unknown2
    entry.extend_from_slice(&0u64.to_le_bytes()); // unknown3
    entry.extend_from_slice(&0u64.to_le_bytes()); // unknown4
    entry.extend_from_slice(&raw_path_length.to_le_bytes());
    entry.extend_from_slice(&0u32.to_le_bytes()); // unknown5
    entry.resize(entry_size, 0x55);
    entry
}

fn volume_entry_32(raw_path_length: u32, creation_time: u64, serial_number: u32) -> Vec<u8> {
    let mut entry = Vec::with_capacity(56);
    entry.extend_from_slice(&0x2222_2222u32.to_le_bytes()); // unknown1
    entry.extend_from_slice(&raw_path_length.to_le_bytes());
    entry.extend_from_slice(&creation_time.to_le_bytes());
    entry.extend_from_slice(&serial_number.to_le_bytes());
    entry.extend_from_slice(&0u32.to_le_bytes()); // unknown2
    entry.resize(56, 0x66);
    entry
}

fn volume_entry_64(raw_path_length: u32, creation_time: u64, serial_number: u32) -> Vec<u8> {
    let mut entry = Vec::with_capacity(96);
    entry.extend_from_slice(&0x2222_2222_2222_2222u64.to_le_bytes()); // unknown1
    entry.extend_from_slice(&raw_path_length.to_le_bytes());
    entry.extend_from_slice(&0u32.to_le_bytes()); // unknown2
    entry.extend_from_slice(&creation_time.to_le_bytes());
    entry.extend_from_slice(&serial_number.to_le_bytes());
    entry.extend_from_slice(&0u32.to_le_bytes()); // unknown3
    entry.resize(96, 0x77);
    entry
}

#[test]
fn test_minimal_database() {
    init_tracing();
    // One 36-byte file record with no path and no sub entries.
    let records = file_entry_32(36, 0, 0);
    let logical = logical_stream(36, (0, 1, 0, 0), &records);
    let raw = raw_database(&logical, 4096, false);

    let database = DatabaseFile::read(Cursor::new(raw)).unwrap();
    assert_eq!(database.volume_count(), 0);
    assert_eq!(database.file_count(), 1);
    assert_eq!(database.source_count(), 0);
    assert_eq!(database.executable_count(), 0);
    assert_eq!(database.header.database_type, DatabaseType::AppLaunch);
    assert_eq!(database.parameters.file_information_entry_size, 36);

    let file = database.file(0).unwrap();
    assert!(file.path_bytes().is_empty());
    assert_eq!(file.number_of_entries, 0);
    assert_eq!(file.name_hash(), 0xC0FE_C0DE);
    assert!(database.file(1).is_none());
    assert!(database.volume(0).is_none());
}

#[test]
fn test_wide_mode_database() {
    init_tracing();
    // 64-bit dialect with one volume, two files (paths and sub entries),
    // one source and one executable, split into small compressed blocks.
    let volume_path = "\\Device\\HarddiskVolume2";
    let first_path = "\\Device\\HarddiskVolume2\\Windows\\System32\\ntdll.dll";
    let second_path = "\\Device\\Hd";

    let mut records = Vec::new();
    records.extend_from_slice(&volume_entry_64(
        path_raw(volume_path, 0),
        0x01D0_1234_5678_9ABC,
        0xA1B2_C3D4,
    ));
    records.extend_from_slice(&path_with_padding(volume_path, 8));

    records.extend_from_slice(&file_entry_64(88, 0, path_raw(first_path, 0)));
    records.extend_from_slice(&path_with_padding(first_path, 8));

    records.extend_from_slice(&file_entry_64(88, 2, path_raw(second_path, 0)));
    records.extend_from_slice(&path_with_padding(second_path, 8));
    records.extend_from_slice(&[0xA0; 16]);
    records.extend_from_slice(&[0xA1; 16]);

    records.extend_from_slice(&[0xB0; 32]); // source
    records.extend_from_slice(&[0xB1; 64]); // executable

    let logical = logical_stream(88, (1, 2, 1, 1), &records);
    let raw = raw_database(&logical, 96, true);

    let database = DatabaseFile::read(Cursor::new(raw)).unwrap();
    assert_eq!(database.volume_count(), 1);
    assert_eq!(database.file_count(), 2);
    assert_eq!(database.source_count(), 1);
    assert_eq!(database.executable_count(), 1);

    let volume = database.volume(0).unwrap();
    assert_eq!(volume.device_path().unwrap(), volume_path);
    assert_eq!(volume.creation_time, 0x01D0_1234_5678_9ABC);
    assert_eq!(volume.serial_number, 0xA1B2_C3D4);

    let first = database.file(0).unwrap();
    assert_eq!(first.path().unwrap(), first_path);
    assert_eq!(first.name_hash(), 0xC0FE_C0DE_DEAD_BEEF);
    assert!(first.sub_entries.is_empty());

    let second = database.file(1).unwrap();
    assert_eq!(second.path().unwrap(), second_path);
    assert_eq!(second.path_bytes().len(), 22);
    assert_eq!(second.sub_entries, vec![vec![0xA0; 16], vec![0xA1; 16]]);

    assert_eq!(database.source(0).unwrap().data(), &[0xB0; 32][..]);
    assert_eq!(database.executable(0).unwrap().data(), &[0xB1; 64][..]);
}

#[test]
fn test_block_size_does_not_change_observable_state() {
    init_tracing();
    let path = "\\Device\\HarddiskVolume1\\Program Files\\app.exe";
    let mut records = file_entry_32(52, 1, path_raw(path, 0));
    records.extend_from_slice(&path_with_padding(path, 4));
    records.extend_from_slice(&[0xA7; 16]);
    let logical = logical_stream(52, (0, 1, 0, 0), &records);

    let single = DatabaseFile::read(Cursor::new(raw_database(&logical, 1 << 20, false))).unwrap();
    let chunked = DatabaseFile::read(Cursor::new(raw_database(&logical, 57, true))).unwrap();

    assert_eq!(single.file_count(), chunked.file_count());
    let single_file = single.file(0).unwrap();
    let chunked_file = chunked.file(0).unwrap();
    assert_eq!(single_file.path().unwrap(), chunked_file.path().unwrap());
    assert_eq!(single_file.name_hash(), chunked_file.name_hash());
    assert_eq!(single_file.sub_entries, chunked_file.sub_entries);
}

#[test]
fn test_count_mismatch_is_fatal() {
    init_tracing();
    // The header declares three file records, the stream holds two.
    let mut records = file_entry_32(36, 0, 0);
    records.extend_from_slice(&file_entry_32(36, 0, 0));
    let logical = logical_stream(36, (0, 3, 0, 0), &records);
    let raw = raw_database(&logical, 4096, false);

    let error = DatabaseFile::read(Cursor::new(raw)).unwrap_err();
    assert!(matches!(
        error,
        Error::Record(RecordError::Truncated {
            kind: RecordKind::File,
            index: 2,
        })
    ));
}

#[test]
fn test_rejected_file_entry_size() {
    init_tracing();
    // The parameter block declares an unsupported 40-byte file entry size;
    // the open must fail before any record is read.
    let data_size = HEADER_SIZE;
    let mut logical = header_bytes(data_size, 0, 0, 0);
    logical.extend_from_slice(&parameter_bytes(56, 40, 24, 40, 0));
    let raw = raw_database(&logical, 4096, false);

    let error = DatabaseFile::read(Cursor::new(raw)).unwrap_err();
    assert!(matches!(
        error,
        Error::Header(HeaderError::UnsupportedFileEntrySize(40))
    ));
}

#[test]
fn test_path_length_low_bits_preserved() {
    init_tracing();
    // On-disk path length 0x29 = (10 << 2) | 1.
    let path = "Windows\\Sy";
    let raw_length = path_raw(path, 0b01);
    assert_eq!(raw_length, 0x29);

    let mut records = file_entry_32(36, 0, raw_length);
    records.extend_from_slice(&path_with_padding(path, 4));
    let logical = logical_stream(36, (0, 1, 0, 0), &records);
    let raw = raw_database(&logical, 4096, false);

    let database = DatabaseFile::read(Cursor::new(raw)).unwrap();
    let file = database.file(0).unwrap();
    assert_eq!(file.path_number_of_characters(), 10);
    assert_eq!(file.path_bytes().len(), 22);
    assert_eq!(file.path_flags(), PathFlags::UNKNOWN_BIT_0);
}

#[test]
fn test_path_utf8_round_trip() {
    init_tracing();
    // A path whose UTF-16 encoding includes a surrogate pair (U+1D11E).
    let path = "C:\\Users\\Mus\u{00EF}c\\\u{1D11E}.mp3";
    let units = path.encode_utf16().count();

    let mut records = file_entry_32(36, 0, path_raw(path, 0));
    records.extend_from_slice(&path_with_padding(path, 4));
    let logical = logical_stream(36, (0, 1, 0, 0), &records);
    let raw = raw_database(&logical, 4096, false);

    let database = DatabaseFile::read(Cursor::new(raw)).unwrap();
    let file = database.file(0).unwrap();
    assert_eq!(file.path_bytes().len(), units * 2 + 2);
    assert_eq!(file.path_utf16().len(), units);
    assert_eq!(file.path().unwrap(), path);
}

#[test]
fn test_inner_header_mismatch_is_fatal() {
    init_tracing();
    let records = file_entry_32(36, 0, 0);
    let logical = logical_stream(36, (0, 1, 0, 0), &records);

    // Tamper with the file count of the inner header copy only; the outer
    // header is taken from the untouched stream.
    let mut tampered = logical.clone();
    tampered[56..60].copy_from_slice(&9u32.to_le_bytes());
    let mut raw = logical[..84].to_vec();
    raw.extend_from_slice(&raw_database(&tampered, 4096, false)[84..]);

    let error = DatabaseFile::read(Cursor::new(raw)).unwrap_err();
    assert!(matches!(
        error,
        Error::Header(HeaderError::HeaderMismatch)
    ));
}

#[test]
fn test_truncated_block_region() {
    init_tracing();
    let records = file_entry_32(36, 0, 0);
    let logical = logical_stream(36, (0, 1, 0, 0), &records);
    let mut raw = raw_database(&logical, 64, false);
    // Cut the file in the middle of the last block prefix.
    raw.truncate(raw.len() - logical.len() % 64 - 6);

    let error = DatabaseFile::read(Cursor::new(raw)).unwrap_err();
    assert!(matches!(
        error,
        Error::Block(BlockError::TruncatedRegion(_))
    ));
}

#[test]
fn test_from_path() {
    init_tracing();
    let records = file_entry_32(36, 0, 0);
    let logical = logical_stream(36, (0, 1, 0, 0), &records);
    let raw = raw_database(&logical, 4096, false);

    let path = std::env::temp_dir().join("agdb_rs_from_path_test.db");
    std::fs::write(&path, &raw).unwrap();
    let database = DatabaseFile::from_path(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(database.file_count(), 1);
}
