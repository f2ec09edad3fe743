//! SQLite implementation of the key-value substrate.
//!
//! # Invariants
//! - The store owns one connection whose `kv_entries` table has a `key`
//!   and a `value` column before any read or write.
//! - `PRAGMA user_version` records the table layout; files written by a
//!   newer layout are refused rather than reinterpreted.
//! - Every open attempt emits one `kv_open` start event and one outcome event.

use super::{KeyValueStore, KvError, KvResult};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::{Duration, Instant};

/// Layout version stamped into `PRAGMA user_version`.
pub const KV_SCHEMA_VERSION: u32 = 1;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const REQUIRED_COLUMNS: [&str; 2] = ["key", "value"];

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS kv_entries (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now') * 1000)
);";

/// Key-value store over a single `kv_entries` table.
pub struct SqliteKvStore {
    conn: Connection,
}

impl SqliteKvStore {
    /// Opens (or creates) the store file at `path`.
    pub fn open(path: impl AsRef<Path>) -> KvResult<Self> {
        Self::open_with("file", || Connection::open(path))
    }

    /// Opens a throwaway store living in memory.
    pub fn open_in_memory() -> KvResult<Self> {
        Self::open_with("memory", Connection::open_in_memory)
    }

    fn open_with(
        mode: &'static str,
        connect: impl FnOnce() -> rusqlite::Result<Connection>,
    ) -> KvResult<Self> {
        let started_at = Instant::now();
        info!("event=kv_open module=kv status=start mode={mode}");

        let opened = connect()
            .map_err(KvError::from)
            .and_then(|mut conn| prepare_table(&mut conn).map(|()| conn));
        match opened {
            Ok(conn) => {
                info!(
                    "event=kv_open module=kv status=ok mode={mode} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(Self { conn })
            }
            Err(err) => {
                error!(
                    "event=kv_open module=kv status=error mode={mode} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }
}

fn prepare_table(conn: &mut Connection) -> KvResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;

    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if found > KV_SCHEMA_VERSION {
        return Err(KvError::SchemaVersion {
            found,
            supported: KV_SCHEMA_VERSION,
        });
    }
    if found < KV_SCHEMA_VERSION {
        let tx = conn.transaction()?;
        tx.execute_batch(CREATE_TABLE_SQL)?;
        tx.pragma_update(None, "user_version", KV_SCHEMA_VERSION)?;
        tx.commit()?;
    }

    let columns = table_columns(conn)?;
    if let Some(missing) = REQUIRED_COLUMNS
        .into_iter()
        .find(|required| !columns.iter().any(|column| column == required))
    {
        return Err(KvError::SchemaShape(format!(
            "kv_entries has no `{missing}` column"
        )));
    }
    Ok(())
}

fn table_columns(conn: &Connection) -> KvResult<Vec<String>> {
    let mut stmt = conn.prepare("PRAGMA table_info(kv_entries);")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> KvResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value)
             VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> KvResult<()> {
        self.conn.execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}
