use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::cache::{CacheError, CacheResult};

/// Minimum schema version we know how to handle.
///
/// `0` means "no schema yet" (fresh DB).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// One persisted tool output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub signature: String,
    pub input_hash: String,
    pub output: String,
    pub created_at: String,
}

/// SQLite-backed store of tool outputs that survives across runs.
#[derive(Debug)]
pub struct DiskCache {
    conn: Connection,
}

impl DiskCache {
    /// Open (or create) a cache database at the given path and ensure the schema exists.
    pub fn open(path: &Path) -> CacheResult<Self> {
        let conn = Connection::open(path)?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Expose a reference to the underlying connection for advanced callers.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Output stored for `signature`, provided the input still hashes the same.
    pub fn lookup(&self, signature: &str, input_hash: &str) -> CacheResult<Option<String>> {
        let output = self
            .conn
            .query_row(
                r#"
                SELECT output
                FROM tool_outputs
                WHERE signature = ?1 AND input_hash = ?2
                "#,
                params![signature, input_hash],
                |row| row.get(0),
            )
            .optional()?;
        Ok(output)
    }

    /// Insert or replace the output stored for `signature`.
    pub fn store(&self, signature: &str, input_hash: &str, output: &str) -> CacheResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            r#"
            INSERT INTO tool_outputs (signature, input_hash, output, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(signature) DO UPDATE SET
                input_hash = excluded.input_hash,
                output = excluded.output,
                created_at = excluded.created_at
            "#,
            params![signature, input_hash, output, now],
        )?;
        Ok(())
    }

    /// List all entries (ordered by signature).
    pub fn entries(&self) -> CacheResult<Vec<CacheEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT signature, input_hash, output, created_at
            FROM tool_outputs
            ORDER BY signature
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CacheEntry {
                signature: row.get(0)?,
                input_hash: row.get(1)?,
                output: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

fn apply_migrations(conn: &Connection) -> CacheResult<()> {
    let current_version = current_schema_version(conn)?;

    // Reject DBs created with a newer schema than we support.
    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(CacheError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current_version == 0 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS tool_outputs (
                signature  TEXT PRIMARY KEY,
                input_hash TEXT NOT NULL,
                output     TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
    }

    Ok(())
}

fn current_schema_version(conn: &Connection) -> CacheResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}
