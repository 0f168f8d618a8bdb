//! Tool-output cache.
//!
//! A [`ToolCache`] lives for exactly one run and memoizes tool output by the
//! exact invocation signature, so a unit that appears in several groups is only
//! dumped once. It can optionally be backed by a persistent [`DiskCache`], whose
//! entries are only reused while the input file's SHA-256 still matches.

mod disk;

use std::collections::HashMap;
use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::tools::Invocation;

pub use disk::{CacheEntry, DiskCache, CURRENT_SCHEMA_VERSION};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error(
        "Unsupported cache schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },

    #[error("Failed to hash tool input {}: {source}", .path.display())]
    Hash {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Run-scoped memo of tool outputs keyed by invocation signature.
#[derive(Debug, Default)]
pub struct ToolCache {
    entries: HashMap<String, String>,
    input_hashes: HashMap<PathBuf, String>,
    disk: Option<DiskCache>,
    hits: usize,
}

impl ToolCache {
    /// A cache that only lives in memory for this run.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// A cache that also persists outputs across runs.
    pub fn with_disk(disk: DiskCache) -> Self {
        Self { disk: Some(disk), ..Self::default() }
    }

    pub fn disk(&self) -> Option<&DiskCache> {
        self.disk.as_ref()
    }

    /// Number of in-memory entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of lookups answered without running the tool.
    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn get(&mut self, invocation: &Invocation) -> CacheResult<Option<String>> {
        let signature = invocation.signature();
        if let Some(output) = self.entries.get(&signature) {
            self.hits += 1;
            return Ok(Some(output.clone()));
        }
        if self.disk.is_none() {
            return Ok(None);
        }

        let input_hash = self.input_hash(&invocation.input)?;
        let found = match &self.disk {
            Some(disk) => disk.lookup(&signature, &input_hash)?,
            None => None,
        };
        if let Some(output) = &found {
            self.hits += 1;
            self.entries.insert(signature, output.clone());
        }
        Ok(found)
    }

    pub fn put(&mut self, invocation: &Invocation, output: &str) -> CacheResult<()> {
        let signature = invocation.signature();
        if self.disk.is_some() {
            let input_hash = self.input_hash(&invocation.input)?;
            if let Some(disk) = &self.disk {
                disk.store(&signature, &input_hash, output)?;
            }
        }
        self.entries.insert(signature, output.to_string());
        Ok(())
    }

    fn input_hash(&mut self, path: &Path) -> CacheResult<String> {
        if let Some(hash) = self.input_hashes.get(path) {
            return Ok(hash.clone());
        }
        let hash = sha256_file(path)
            .map_err(|source| CacheError::Hash { path: path.to_path_buf(), source })?;
        self.input_hashes.insert(path.to_path_buf(), hash.clone());
        Ok(hash)
    }
}

/// Compute the SHA-256 hash of a file and return it as a hex string.
pub fn sha256_file(path: &Path) -> std::io::Result<String> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
