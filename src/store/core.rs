//! The store handle: open, bootstrap, and shared connection state.

use std::path::Path;
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::Result;
use crate::fetch::{Fetcher, FileFetcher};
use crate::parse::{DocParser, NTriplesParser};

use super::schema::{EPHEMERAL_SCHEMA, PERSISTENT_SCHEMA, SCHEMA_VERSION};

/// Tunables for a store handle.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Upper bound on a single `load` fetch, enforced around the
    /// [`Fetcher`] call.
    pub fetch_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

/// A handle to one triple store.
///
/// The handle owns the SQLite connection exclusively; every operation runs
/// under its lock, so writes are mutually exclusive and readers only ever
/// observe committed state. Dropping the handle releases the underlying
/// database on every exit path.
///
/// At most one process should hold a writable handle to a given store file.
pub struct Store {
    pub(super) conn: Mutex<Connection>,
    pub(super) options: StoreOptions,
    pub(super) fetcher: Box<dyn Fetcher>,
    pub(super) parser: Box<dyn DocParser>,
}

impl Store {
    /// Opens (or creates) the store at `path` with default options, a
    /// file-based fetcher, and the N-Triples parser.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(
            path,
            StoreOptions::default(),
            Box::new(FileFetcher),
            Box::new(NTriplesParser),
        )
    }

    /// Opens (or creates) the store at `path`, wiring in the fetch and
    /// parse collaborators used by `load`.
    pub fn open_with<P: AsRef<Path>>(
        path: P,
        options: StoreOptions,
        fetcher: Box<dyn Fetcher>,
        parser: Box<dyn DocParser>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "FULL")?;

        conn.execute("ATTACH DATABASE ':memory:' AS cache", [])?;
        conn.execute_batch(EPHEMERAL_SCHEMA)?;

        let has_schema: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'info'",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match has_schema {
            Some(_) => {
                let version: String =
                    conn.query_row("SELECT version FROM info", [], |row| row.get(0))?;
                debug!(store = %path.display(), version = %version, "opened existing store");
            }
            None => {
                conn.execute_batch(PERSISTENT_SCHEMA)?;
                info!(
                    store = %path.display(),
                    version = SCHEMA_VERSION,
                    "created new store"
                );
            }
        }

        Ok(Self {
            conn: Mutex::new(conn),
            options,
            fetcher,
            parser,
        })
    }
}
