//! Namespace registry: prefix bindings, expansion, reverse expansion.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::error::{Result, StoreError};

use super::core::Store;

impl Store {
    /// Registers a prefix binding, overwriting any existing binding for
    /// the same prefix.
    pub fn add_namespace(&self, prefix: &str, uri: &str) -> Result<()> {
        let conn = self.conn.lock();
        upsert_namespace(&conn, prefix, uri)
    }

    /// Removes a prefix binding. No-op when the prefix is unbound.
    pub fn del_namespace(&self, prefix: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.prepare_cached("DELETE FROM namespace WHERE prefix = ?1")?
            .execute(params![prefix])?;
        Ok(())
    }

    /// Expands `prefix:suffix` into a full URI.
    ///
    /// Fails with [`StoreError::MalformedQName`] when the qname has no
    /// delimiter and [`StoreError::UnknownPrefix`] when the prefix has no
    /// binding.
    pub fn expand(&self, qname: &str) -> Result<String> {
        let (prefix, suffix) = qname
            .split_once(':')
            .ok_or_else(|| StoreError::MalformedQName(qname.into()))?;
        let conn = self.conn.lock();
        let base: String = conn
            .prepare_cached("SELECT uri FROM namespace WHERE prefix = ?1")?
            .query_row(params![prefix], |row| row.get(0))
            .optional()?
            .ok_or_else(|| StoreError::UnknownPrefix(prefix.into()))?;
        Ok(format!("{base}{suffix}"))
    }

    /// Compacts a URI into `prefix:suffix` using the longest registered
    /// base that prefixes it. `None` (not an error) when no binding
    /// matches; callers fall back to the raw URI.
    pub fn reverse_expand(&self, uri: &str) -> Result<Option<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached("SELECT prefix, uri FROM namespace")?;
        let bindings = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        let best = bindings
            .into_iter()
            .filter(|(_, base)| uri.starts_with(base.as_str()))
            .max_by_key(|(_, base)| base.len());
        Ok(best.map(|(prefix, base)| format!("{prefix}:{}", &uri[base.len()..])))
    }

    /// All registered (prefix, uri) bindings.
    pub fn namespaces(&self) -> Result<Vec<(String, String)>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare_cached("SELECT prefix, uri FROM namespace ORDER BY prefix")?;
        let bindings = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(bindings)
    }
}

pub(super) fn upsert_namespace(conn: &Connection, prefix: &str, uri: &str) -> Result<()> {
    conn.prepare_cached(
        "INSERT INTO namespace VALUES (?1, ?2, 0)
         ON CONFLICT (prefix) DO UPDATE SET uri = excluded.uri",
    )?
    .execute(params![prefix, uri])?;
    debug!(prefix, uri, "namespace bound");
    Ok(())
}
