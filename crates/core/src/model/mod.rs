//! Core data model: symbols, analysis units, unit groups, and report rows.
//!
//! Everything here is constructed fresh for a single run from the output of the
//! symbol-dump and size-report tools. Nothing is mutated after classification
//! finishes.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Prefix the compiler uses for local (non-external) symbols.
pub const LOCAL_SYMBOL_PREFIX: &str = ".L";

/// Name of the pseudo-unit formed from the union of every analyzed unit.
pub const AGGREGATE_GROUP_NAME: &str = "(aggregate)";

/// Classification of a symbol relative to a unit group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    StrongFunction,
    WeakFunction,
    GlobalData,
    LocalData,
    Unclassified,
}

impl SymbolKind {
    /// Map an `nm`-style type code and name to a kind.
    ///
    /// The type code is compared case-insensitively, so local (`t`) and global
    /// (`T`) definitions are treated alike.
    pub fn from_type_code(code: &str, name: &str) -> Self {
        match code.to_ascii_lowercase().as_str() {
            "t" => SymbolKind::StrongFunction,
            "w" => SymbolKind::WeakFunction,
            "d" if is_local_symbol(name) => SymbolKind::LocalData,
            "d" => SymbolKind::GlobalData,
            _ => SymbolKind::Unclassified,
        }
    }
}

/// Whether `name` carries the compiler-local symbol prefix.
pub fn is_local_symbol(name: &str) -> bool {
    name.starts_with(LOCAL_SYMBOL_PREFIX)
}

/// A sized symbol from the linked artifact, classified against a unit group.
///
/// Symbols the linker eliminated never appear in the symbol table, so every
/// `Symbol` carries a size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// File size in bytes.
    pub size: u64,
}

/// Identity of an analysis unit (an object file or archive), by path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(String);

impl UnitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn from_path(path: &Path) -> Self {
        Self(path.display().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The four disjoint name sets extracted from one unit's symbol dump.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitClassification {
    pub strong_functions: HashSet<String>,
    pub weak_functions: HashSet<String>,
    /// Data symbol base name -> owning unit.
    pub global_data: HashMap<String, UnitId>,
    pub local_data: HashSet<String>,
}

impl UnitClassification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observed symbol for `unit`.
    ///
    /// A function name keeps its first classification: once seen as strong it
    /// is never added as weak, and vice versa. Repeats are no-ops.
    pub fn record(&mut self, unit: &UnitId, kind: SymbolKind, name: &str) {
        match kind {
            SymbolKind::StrongFunction => {
                if !self.weak_functions.contains(name) {
                    self.strong_functions.insert(name.to_string());
                }
            }
            SymbolKind::WeakFunction => {
                if !self.strong_functions.contains(name) {
                    self.weak_functions.insert(name.to_string());
                }
            }
            SymbolKind::GlobalData => {
                self.global_data.entry(name.to_string()).or_insert_with(|| unit.clone());
            }
            SymbolKind::LocalData => {
                self.local_data.insert(name.to_string());
            }
            SymbolKind::Unclassified => {}
        }
    }

    /// Fold another unit's sets into this one.
    ///
    /// Strong definitions take priority across units, so a name strong anywhere
    /// is dropped from the weak set. The first owner recorded for a data symbol
    /// is kept.
    pub fn merge(&mut self, other: &UnitClassification) {
        self.strong_functions.extend(other.strong_functions.iter().cloned());
        self.weak_functions.extend(other.weak_functions.iter().cloned());
        let strong = &self.strong_functions;
        self.weak_functions.retain(|name| !strong.contains(name));
        for (name, owner) in &other.global_data {
            self.global_data.entry(name.clone()).or_insert_with(|| owner.clone());
        }
        self.local_data.extend(other.local_data.iter().cloned());
    }

    pub fn is_empty(&self) -> bool {
        self.strong_functions.is_empty()
            && self.weak_functions.is_empty()
            && self.global_data.is_empty()
            && self.local_data.is_empty()
    }

    /// Classify a symbol-table name against these sets.
    ///
    /// Strong matches win over weak ones. Names carrying a data-section prefix
    /// are matched by their base name against the global data map, or counted
    /// as local data when the base name is compiler-local.
    pub fn kind_of(&self, table_name: &str) -> SymbolKind {
        if self.strong_functions.contains(table_name) {
            return SymbolKind::StrongFunction;
        }
        if self.weak_functions.contains(table_name) {
            return SymbolKind::WeakFunction;
        }
        match crate::symbols::strip_data_prefix(table_name) {
            Some(base) if self.global_data.contains_key(base) => SymbolKind::GlobalData,
            Some(base) if is_local_symbol(base) => SymbolKind::LocalData,
            _ => SymbolKind::Unclassified,
        }
    }
}

/// One analysis unit together with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedUnit {
    pub id: UnitId,
    pub classification: UnitClassification,
}

/// A set of units whose classifications are matched against the symbol table together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitGroup {
    /// A single unit, reported under its own identifier.
    Unit(ClassifiedUnit),
    /// The union of every unit, used for the deduplicated global total.
    Aggregate(UnitClassification),
}

impl UnitGroup {
    /// Build the aggregate group from every unit, in order.
    pub fn aggregate<'a>(units: impl IntoIterator<Item = &'a ClassifiedUnit>) -> Self {
        let mut union = UnitClassification::new();
        for unit in units {
            union.merge(&unit.classification);
        }
        UnitGroup::Aggregate(union)
    }

    pub fn name(&self) -> &str {
        match self {
            UnitGroup::Unit(unit) => unit.id.as_str(),
            UnitGroup::Aggregate(_) => AGGREGATE_GROUP_NAME,
        }
    }

    pub fn classification(&self) -> &UnitClassification {
        match self {
            UnitGroup::Unit(unit) => &unit.classification,
            UnitGroup::Aggregate(classification) => classification,
        }
    }
}

/// Byte totals attributed to one unit group. All sizes are file sizes in bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeReportRow {
    pub name: String,
    pub strong_size: u64,
    pub weak_size: u64,
    pub data_size: u64,
    pub local_data_size: u64,
}

impl SizeReportRow {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Strong plus weak function bytes.
    pub fn combined_size(&self) -> u64 {
        self.strong_size + self.weak_size
    }

    /// Add one classified symbol to the matching total.
    pub fn add(&mut self, symbol: &Symbol) {
        match symbol.kind {
            SymbolKind::StrongFunction => self.strong_size += symbol.size,
            SymbolKind::WeakFunction => self.weak_size += symbol.size,
            SymbolKind::GlobalData => self.data_size += symbol.size,
            SymbolKind::LocalData => self.local_data_size += symbol.size,
            SymbolKind::Unclassified => {}
        }
    }
}
