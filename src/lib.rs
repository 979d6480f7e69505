#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![warn(clippy::missing_safety_doc)]
#![allow(clippy::module_name_repetitions)]
#![warn(clippy::all)]
/*!
Simple and fast deserialization library for Windows SuperFetch databases.

## Getting Started: Opening a database

SuperFetch databases (`AgAppLaunch.db`, `AgGlGlobalHistory.db`, ...) are the
files the Windows memory manager uses to record volumes, files, executables
and their access patterns. `agdb-rs` decodes them into a typed object model,
transparently decompressing the block-compressed payload along the way.

```rust
use agdb_rs::{DatabaseFile, Result};

fn load_database() -> Result<()> {
    // Parses the header, the compressed block region and all records.
    let database = DatabaseFile::from_path("C:/Windows/Prefetch/AgAppLaunch.db")?;
    println!("{} volumes, {} files", database.volume_count(), database.file_count());
    Ok(())
}
```

## Inspecting records

After a successful open, the four record collections are fully populated and
indexable in constant time. Paths are stored as the raw UTF-16LE bytes found
on disk and transcoded on demand.

```rust
use agdb_rs::{DatabaseFile, Result};

fn dump_file_paths() -> Result<()> {
    let database = DatabaseFile::from_path("C:/Windows/Prefetch/AgAppLaunch.db")?;
    for index in 0..database.file_count() {
        let file = database.file(index).unwrap();
        println!("{:#018x} {}", file.name_hash(), file.path()?);
    }
    Ok(())
}
```

Much of the on-disk format is only partially understood. Fields whose meaning
is still unknown are preserved verbatim on each record so that they survive a
parse round-trip and remain available for future analysis.
*/

pub mod common;
pub mod database;

#[doc(inline)]
pub use crate::common::errors::{Error, Result};
#[doc(inline)]
pub use crate::database::loader::DatabaseFile;
