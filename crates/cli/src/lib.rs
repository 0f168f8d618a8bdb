//! lib-bloat CLI library.
//!
//! The binary is a thin wrapper around `bloat-core`; the command functions here
//! are public so they can be exercised directly from tests.

pub mod commands;

pub use commands::*;
