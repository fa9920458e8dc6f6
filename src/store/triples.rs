//! Quad storage and wildcard pattern queries.
//!
//! Quads live in two tables with the same shape: `triple` (persistent) and
//! `cache.triple` (temporary). Pattern queries bind the nonzero positions
//! and leave the rest to the narrowest applicable index; the full-key
//! unique index also enforces set semantics per partition.

use rusqlite::params_from_iter;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::model::{NodeId, Partition, Triple, NULL_NODE};

use super::core::Store;

const PERSISTENT_TABLE: &str = "triple";
const TEMPORARY_TABLE: &str = "cache.triple";

impl Store {
    /// Asserts a quad. Adding a quad that is already present in the chosen
    /// partition is a no-op.
    pub fn add_triple(
        &self,
        s: NodeId,
        p: NodeId,
        o: NodeId,
        source: NodeId,
        temporary: bool,
    ) -> Result<()> {
        check_positions(s, p, o, source)?;
        let table = if temporary {
            TEMPORARY_TABLE
        } else {
            PERSISTENT_TABLE
        };
        let conn = self.conn.lock();
        let sql = format!("INSERT OR IGNORE INTO {table} VALUES (?1, ?2, ?3, ?4)");
        let inserted = conn.prepare_cached(&sql)?.execute((s, p, o, source))?;
        if inserted > 0 {
            debug!(s, p, o, source, temporary, "quad asserted");
        }
        Ok(())
    }

    /// Retracts a quad. Removing a quad that is not present is a no-op.
    pub fn delete_triple(
        &self,
        s: NodeId,
        p: NodeId,
        o: NodeId,
        source: NodeId,
        temporary: bool,
    ) -> Result<()> {
        check_positions(s, p, o, source)?;
        let table = if temporary {
            TEMPORARY_TABLE
        } else {
            PERSISTENT_TABLE
        };
        let conn = self.conn.lock();
        let sql = format!(
            "DELETE FROM {table} WHERE s = ?1 AND p = ?2 AND o = ?3 AND src = ?4"
        );
        let removed = conn.prepare_cached(&sql)?.execute((s, p, o, source))?;
        if removed > 0 {
            debug!(s, p, o, source, temporary, "quad retracted");
        }
        Ok(())
    }

    /// Counts quads matching the pattern. Zero in the s/p/o positions and
    /// in `source` means "any"; `partition` selects which tables to count.
    /// Pure read, never mutates.
    pub fn count(
        &self,
        s: NodeId,
        p: NodeId,
        o: NodeId,
        source: NodeId,
        partition: Partition,
    ) -> Result<u64> {
        if source < 0 {
            return Err(StoreError::InvalidArgument(
                "source must be a resource id or 0".into(),
            ));
        }
        let conn = self.conn.lock();
        let mut total = 0u64;
        for table in partition_tables(partition) {
            let (clause, binds) = pattern_clause(s, p, o, source);
            let sql = format!("SELECT count(*) FROM {table}{clause}");
            let n: u64 = conn.prepare_cached(&sql)?.query_row(
                params_from_iter(binds.iter()),
                |row| row.get(0),
            )?;
            total += n;
        }
        Ok(total)
    }

    /// All distinct triples matching the pattern, across both partitions
    /// and all sources. Zero means unbound.
    pub fn query(&self, s: NodeId, p: NodeId, o: NodeId) -> Result<Vec<Triple>> {
        let mut out = Vec::new();
        self.for_each_match(s, p, o, |t| {
            out.push(t);
            true
        })?;
        Ok(out)
    }

    /// Streaming form of [`Store::query`]: visits each distinct match until
    /// the visitor returns `false`.
    pub fn for_each_match<F>(&self, s: NodeId, p: NodeId, o: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(Triple) -> bool,
    {
        let conn = self.conn.lock();
        let (sql, binds) = union_sql("s, p, o", s, p, o, NULL_NODE);
        let mut stmt = conn.prepare_cached(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds.iter()))?;
        while let Some(row) = rows.next()? {
            let triple = Triple::new(row.get(0)?, row.get(1)?, row.get(2)?);
            if !visit(triple) {
                break;
            }
        }
        Ok(())
    }

    /// Distinct source ids (including 0, "no provenance") under which a
    /// quad matching the pattern was asserted, in either partition.
    pub fn sources(&self, s: NodeId, p: NodeId, o: NodeId) -> Result<Vec<NodeId>> {
        let conn = self.conn.lock();
        let (sql, binds) = union_sql("src", s, p, o, NULL_NODE);
        let mut stmt = conn.prepare_cached(&sql)?;
        let ids = stmt
            .query_map(params_from_iter(binds.iter()), |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<NodeId>>>()?;
        Ok(ids)
    }
}

fn check_positions(s: NodeId, p: NodeId, o: NodeId, source: NodeId) -> Result<()> {
    if s <= 0 {
        return Err(StoreError::InvalidArgument(
            "subject must be a resource id".into(),
        ));
    }
    if p <= 0 {
        return Err(StoreError::InvalidArgument(
            "predicate must be a resource id".into(),
        ));
    }
    if o == 0 {
        return Err(StoreError::InvalidArgument(
            "object must be an interned term".into(),
        ));
    }
    if source < 0 {
        return Err(StoreError::InvalidArgument(
            "source must be a resource id or 0".into(),
        ));
    }
    Ok(())
}

fn partition_tables(partition: Partition) -> &'static [&'static str] {
    match partition {
        Partition::Any => &[PERSISTENT_TABLE, TEMPORARY_TABLE],
        Partition::Persistent => &[PERSISTENT_TABLE],
        Partition::Temporary => &[TEMPORARY_TABLE],
    }
}

/// WHERE clause binding every nonzero pattern position, plus the bound
/// values in order. An all-wildcard pattern yields an empty clause.
fn pattern_clause(s: NodeId, p: NodeId, o: NodeId, source: NodeId) -> (String, Vec<NodeId>) {
    let mut terms = Vec::new();
    let mut binds = Vec::new();
    for (column, value) in [("s", s), ("p", p), ("o", o), ("src", source)] {
        if value != NULL_NODE {
            binds.push(value);
            terms.push(format!("{column} = ?{}", binds.len()));
        }
    }
    if terms.is_empty() {
        (String::new(), binds)
    } else {
        (format!(" WHERE {}", terms.join(" AND ")), binds)
    }
}

/// Same pattern applied to both partitions; UNION collapses duplicates to
/// distinct rows. Placeholder numbering continues into the second branch.
fn union_sql(columns: &str, s: NodeId, p: NodeId, o: NodeId, source: NodeId) -> (String, Vec<NodeId>) {
    let (clause, binds) = pattern_clause(s, p, o, source);
    let mut shifted = String::new();
    let mut all_binds = binds.clone();
    if !binds.is_empty() {
        let mut terms = Vec::new();
        let mut n = binds.len();
        for (column, value) in [("s", s), ("p", p), ("o", o), ("src", source)] {
            if value != NULL_NODE {
                n += 1;
                terms.push(format!("{column} = ?{n}"));
                all_binds.push(value);
            }
        }
        shifted = format!(" WHERE {}", terms.join(" AND "));
    }
    let sql = format!(
        "SELECT {columns} FROM {PERSISTENT_TABLE}{clause} \
         UNION SELECT {columns} FROM {TEMPORARY_TABLE}{shifted}"
    );
    (sql, all_binds)
}
