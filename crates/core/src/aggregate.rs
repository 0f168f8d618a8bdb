//! Attribution aggregator.
//!
//! Matches unit groups against the symbol table to produce per-unit rows and
//! one deduplicated aggregate row. Per-unit rows must never be summed to get a
//! global total: a weak symbol offered by several units matches in every one of
//! them, while the linker kept exactly one copy.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::model::{ClassifiedUnit, SizeReportRow, UnitGroup};
use crate::symbols::SymbolTable;

/// Which total a [`Discrepancy`] concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Strong,
    Weak,
    Data,
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Bucket::Strong => "strong function",
            Bucket::Weak => "weak function",
            Bucket::Data => "public data",
        };
        f.write_str(label)
    }
}

/// A non-fatal inconsistency between the per-unit rows and the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Discrepancy {
    /// The per-unit rows sum to something other than the deduplicated total.
    Mismatch { bucket: Bucket, unit_sum: u64, aggregate: u64 },
    /// Units define functions, the table has symbols, yet nothing matched.
    NothingMatched { table_symbols: usize, unit_functions: usize },
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discrepancy::Mismatch { bucket, unit_sum, aggregate } => write!(
                f,
                "sum of per-unit {bucket} sizes ({unit_sum}) differs from the deduplicated \
                 aggregate ({aggregate}); inputs overlap or were not all part of the link"
            ),
            Discrepancy::NothingMatched { table_symbols, unit_functions } => write!(
                f,
                "none of the {unit_functions} unit functions matched any of the {table_symbols} \
                 linked symbols; the artifact probably lacks a name section with mangled names \
                 (link with -g or --profiling-funcs and --no-demangle)"
            ),
        }
    }
}

/// Percentage of `size` in `total`, defined as 0 for an empty total.
pub fn percent(size: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        size as f64 / total as f64 * 100.0
    }
}

/// Totals for one group against the symbol table.
pub fn size_row(group: &UnitGroup, table: &SymbolTable) -> SizeReportRow {
    let mut row = SizeReportRow::new(group.name());
    for symbol in table.classify(group.classification()) {
        row.add(&symbol);
    }
    row
}

/// One row per group, in the order given.
pub fn aggregate(groups: &[UnitGroup], table: &SymbolTable) -> Vec<SizeReportRow> {
    groups.iter().map(|group| size_row(group, table)).collect()
}

/// The deduplicated row for every unit treated as one group.
pub fn deduplicate(units: &[ClassifiedUnit], table: &SymbolTable) -> SizeReportRow {
    size_row(&UnitGroup::aggregate(units), table)
}

/// Per-unit rows, the aggregate row, and the denominators they are shown against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributionReport {
    /// Sorted by strong size, then strong+weak size (both descending), then name.
    pub units: Vec<SizeReportRow>,
    pub aggregate: SizeReportRow,
    /// Bytes of every non-data symbol in the linked artifact.
    pub function_total: u64,
    /// Bytes of every data-section symbol in the linked artifact.
    pub data_total: u64,
    pub discrepancies: Vec<Discrepancy>,
}

impl AttributionReport {
    /// Per-unit rows ordered for the data table.
    pub fn units_by_data(&self) -> Vec<&SizeReportRow> {
        let mut rows: Vec<&SizeReportRow> = self.units.iter().collect();
        rows.sort_by(|a, b| b.data_size.cmp(&a.data_size).then_with(|| a.name.cmp(&b.name)));
        rows
    }
}

/// Compute per-unit rows and the deduplicated aggregate, flagging disagreements.
pub fn attribute(units: &[ClassifiedUnit], table: &SymbolTable) -> AttributionReport {
    let groups: Vec<UnitGroup> = units.iter().cloned().map(UnitGroup::Unit).collect();
    let mut rows = aggregate(&groups, table);
    rows.sort_by(function_order);
    let aggregate_row = deduplicate(units, table);

    let discrepancies = check_consistency(&rows, &aggregate_row, units, table);
    for discrepancy in &discrepancies {
        warn!("{discrepancy}");
    }

    AttributionReport {
        units: rows,
        aggregate: aggregate_row,
        function_total: table.function_total(),
        data_total: table.data_total(),
        discrepancies,
    }
}

/// Compare the per-unit sums with the aggregate row.
pub fn check_consistency(
    rows: &[SizeReportRow],
    aggregate: &SizeReportRow,
    units: &[ClassifiedUnit],
    table: &SymbolTable,
) -> Vec<Discrepancy> {
    let mut found = Vec::new();
    let buckets = [
        (Bucket::Strong, rows.iter().map(|r| r.strong_size).sum::<u64>(), aggregate.strong_size),
        (Bucket::Weak, rows.iter().map(|r| r.weak_size).sum::<u64>(), aggregate.weak_size),
        (Bucket::Data, rows.iter().map(|r| r.data_size).sum::<u64>(), aggregate.data_size),
    ];
    for (bucket, unit_sum, deduplicated) in buckets {
        if unit_sum != deduplicated {
            found.push(Discrepancy::Mismatch { bucket, unit_sum, aggregate: deduplicated });
        }
    }

    let unit_functions: usize = units
        .iter()
        .map(|u| u.classification.strong_functions.len() + u.classification.weak_functions.len())
        .sum();
    if !table.is_empty() && unit_functions > 0 && aggregate.combined_size() == 0 {
        found.push(Discrepancy::NothingMatched { table_symbols: table.len(), unit_functions });
    }
    found
}

fn function_order(a: &SizeReportRow, b: &SizeReportRow) -> Ordering {
    b.strong_size
        .cmp(&a.strong_size)
        .then_with(|| b.combined_size().cmp(&a.combined_size()))
        .then_with(|| a.name.cmp(&b.name))
}
