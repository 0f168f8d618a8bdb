//! Library classifier.
//!
//! Splits each unit's symbol dump into strong functions, weak functions,
//! global data (owned by the unit) and compiler-local data.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::model::{ClassifiedUnit, SymbolKind, UnitClassification, UnitId};
use crate::tools::{ToolRunner, Toolchain};
use crate::BloatError;

/// Classify one unit from its `address type name` listing.
///
/// Lines with fewer than three whitespace-separated tokens (headers, blank
/// lines, undefined symbols) are skipped.
pub fn classify_dump(unit: &UnitId, dump: &str) -> UnitClassification {
    let mut classification = UnitClassification::new();
    for line in dump.lines() {
        let mut tokens = line.split_whitespace();
        let (Some(_address), Some(code), Some(name)) = (tokens.next(), tokens.next(), tokens.next())
        else {
            continue;
        };
        let kind = SymbolKind::from_type_code(code, name);
        classification.record(unit, kind, name);
    }
    classification
}

/// Dump and classify a single unit in isolation.
pub fn classify_unit<R: ToolRunner>(
    toolchain: &mut Toolchain<R>,
    path: &Path,
) -> Result<ClassifiedUnit, BloatError> {
    let id = UnitId::from_path(path);
    let dump = toolchain.symbol_dump(path)?;
    let classification = classify_dump(&id, &dump);
    info!(
        "{} functions and {} weak symbols in {} ({} data, {} local data)",
        classification.strong_functions.len(),
        classification.weak_functions.len(),
        id,
        classification.global_data.len(),
        classification.local_data.len(),
    );
    Ok(ClassifiedUnit { id, classification })
}

/// Classify every unit, preserving the given order.
///
/// A path listed more than once is classified once; units are distinguished
/// by path only.
pub fn classify_units<R: ToolRunner>(
    toolchain: &mut Toolchain<R>,
    paths: &[PathBuf],
) -> Result<Vec<ClassifiedUnit>, BloatError> {
    let mut seen = HashSet::new();
    let mut units = Vec::with_capacity(paths.len());
    for path in paths {
        if !seen.insert(path.as_path()) {
            debug!(unit = %path.display(), "unit listed more than once; skipping repeat");
            continue;
        }
        units.push(classify_unit(toolchain, path)?);
    }
    Ok(units)
}
