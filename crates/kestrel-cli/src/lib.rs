#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]

pub mod diagnostics;
pub mod host;

pub use diagnostics::{render_error, LineMap, SingleSource, SourceLookup};
pub use host::{global_context, install_io, FsResolver};

/// Maximum source file size in bytes (1MB)
pub const MAX_SOURCE_SIZE: usize = 1_000_000;
