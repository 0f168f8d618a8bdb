//! bloat-core
//!
//! Core library attributing the size of a linked binary back to the static
//! libraries and object files that contributed each symbol.
//!
//! The pipeline has three stages:
//! - `symbols`: load the per-symbol size table of the linked artifact.
//! - `classify`: split each input unit's symbols into strong functions, weak
//!   functions, global data and compiler-local data.
//! - `aggregate`: match both together, per unit and for the deduplicated union
//!   of all units.
//!
//! External tools are only ever reached through `tools::Toolchain`, so all of
//! the above is testable without `llvm-nm` or `bloaty` installed.

pub mod aggregate;
pub mod cache;
pub mod classify;
pub mod config;
pub mod model;
pub mod report;
pub mod symbols;
pub mod tools;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::aggregate::AttributionReport;
use crate::cache::CacheError;
use crate::config::ConfigError;
use crate::symbols::SymbolTableError;
use crate::tools::{ToolError, ToolRunner, Toolchain};

/// Top-level error for a run.
#[derive(Debug, Error)]
pub enum BloatError {
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error(transparent)]
    SymbolTable(#[from] SymbolTableError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Classify `units`, load the symbol table of `artifact`, and attribute sizes.
pub fn analyze<R: ToolRunner>(
    toolchain: &mut Toolchain<R>,
    units: &[PathBuf],
    artifact: &Path,
) -> Result<AttributionReport, BloatError> {
    let classified = classify::classify_units(toolchain, units)?;
    let table = symbols::load_symbol_table(toolchain, artifact)?;
    Ok(aggregate::attribute(&classified, &table))
}

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
