//! Symbol table loader.
//!
//! Turns the size-report tool's CSV output (`name,vmsize,filesize`) into a map
//! from symbol name to the number of bytes it occupies in the linked file.

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::model::{Symbol, UnitClassification};
use crate::tools::{ToolRunner, Toolchain};
use crate::BloatError;

/// Section-name prefixes under which the size report lists data symbols.
pub const DATA_SECTION_PREFIXES: &[&str] = &[".rodata.", ".data.", ".bss."];

/// Number of columns in every data row of the size report.
const COLUMN_COUNT: usize = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SymbolTableError {
    #[error("Malformed size report row {line}: expected 3 columns, found {columns}: {content:?}")]
    MalformedRow { line: usize, columns: usize, content: String },
    #[error("Invalid file size {value:?} on size report row {line}")]
    InvalidSize { line: usize, value: String },
}

/// Strip a recognized data-section prefix, returning the underlying symbol name.
pub fn strip_data_prefix(name: &str) -> Option<&str> {
    DATA_SECTION_PREFIXES.iter().find_map(|prefix| name.strip_prefix(prefix))
}

pub fn is_data_symbol(name: &str) -> bool {
    strip_data_prefix(name).is_some()
}

/// Sized symbols of the linked artifact, keyed by verbatim (mangled) name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    sizes: BTreeMap<String, u64>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, size: u64) -> Option<u64> {
        self.sizes.insert(name.into(), size)
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.sizes.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Iterate `(name, size)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.sizes.iter().map(|(name, size)| (name.as_str(), *size))
    }

    /// Denominator for function percentages: every symbol outside the data sections.
    pub fn function_total(&self) -> u64 {
        self.iter().filter(|(name, _)| !is_data_symbol(name)).map(|(_, size)| size).sum()
    }

    /// Denominator for data percentages: every symbol inside a data section.
    pub fn data_total(&self) -> u64 {
        self.iter().filter(|(name, _)| is_data_symbol(name)).map(|(_, size)| size).sum()
    }

    /// Every symbol in the table, classified against `classification`.
    pub fn classify<'a>(
        &'a self,
        classification: &'a UnitClassification,
    ) -> impl Iterator<Item = Symbol> + 'a {
        self.iter().map(move |(name, size)| Symbol {
            name: name.to_string(),
            kind: classification.kind_of(name),
            size,
        })
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for SymbolTable {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut table = SymbolTable::new();
        for (name, size) in iter {
            table.insert(name, size);
        }
        table
    }
}

/// Parse the size report into a symbol table.
///
/// Section headers, the column header, tool-injected marker rows and the
/// totals row are skipped. Any other row must have exactly three columns, and
/// its size is taken from the `filesize` column.
pub fn parse_size_report(body: &str) -> Result<SymbolTable, SymbolTableError> {
    let mut table = SymbolTable::new();
    for (idx, raw) in body.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if is_non_data_row(line) {
            debug!(line = line_no, content = line, "skipping non-symbol row");
            continue;
        }

        let columns = split_columns(line);
        if columns.len() != COLUMN_COUNT {
            return Err(SymbolTableError::MalformedRow {
                line: line_no,
                columns: columns.len(),
                content: line.to_string(),
            });
        }
        let file_size = columns[2].trim();
        let size = file_size.parse::<u64>().map_err(|_| SymbolTableError::InvalidSize {
            line: line_no,
            value: file_size.to_string(),
        })?;
        if let Some(previous) = table.insert(columns[0].clone(), size) {
            debug!(name = %columns[0], previous, size, "duplicate symbol row; keeping the last");
        }
    }
    Ok(table)
}

/// Run the size-report tool on `artifact` and parse its output.
pub fn load_symbol_table<R: ToolRunner>(
    toolchain: &mut Toolchain<R>,
    artifact: &Path,
) -> Result<SymbolTable, BloatError> {
    let output = toolchain.size_report(artifact)?;
    let table = parse_size_report(&output)?;
    info!("{} symbols in {}", table.len(), artifact.display());
    Ok(table)
}

fn is_non_data_row(line: &str) -> bool {
    line.is_empty()
        || line.starts_with('[')
        || line.starts_with("TOTAL,")
        || line.ends_with("filesize")
}

/// Split one CSV row, honoring double-quoted fields with `""` escapes.
fn split_columns(line: &str) -> Vec<String> {
    let mut columns = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => columns.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    columns.push(current);
    columns
}
