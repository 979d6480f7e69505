//! Shared infrastructure: error taxonomy and reader extensions.

pub mod errors;
pub mod extensions;
