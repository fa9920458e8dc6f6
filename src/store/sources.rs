//! Source manager: provenance records and document load/unload.
//!
//! `load` replaces a source's triples wholesale: fetch and parse happen
//! before any mutation, then one transaction removes the old assertions
//! and installs the new ones, so a failed load leaves the store exactly as
//! it was and readers never observe a half-replaced source.

use std::collections::HashMap;
use std::time::Instant;

use rusqlite::{params, Connection};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};
use crate::model::{NodeId, NodeInfo};
use crate::parse::Term;

use super::core::Store;
use super::namespaces::upsert_namespace;
use super::nodes::{intern_blank, intern_literal, intern_uri, node_info};

impl Store {
    /// Loads the document named by `source`'s URI and asserts its triples
    /// under that source id, non-temporary. Reloading first removes every
    /// triple previously asserted under the source (replace semantics).
    pub fn load(&self, source: NodeId) -> Result<()> {
        if source <= 0 {
            return Err(StoreError::InvalidArgument(
                "source must be a resource id".into(),
            ));
        }
        let uri = {
            let conn = self.conn.lock();
            match node_info(&conn, source)? {
                NodeInfo::Uri { uri } => uri,
                _ => {
                    return Err(StoreError::InvalidArgument(
                        "source must name a URI term".into(),
                    ))
                }
            }
        };

        // Fetch and parse without holding the store lock; nothing is
        // mutated until both have succeeded.
        let timeout = self.options.fetch_timeout;
        let started = Instant::now();
        let body = self.fetcher.fetch(&uri, timeout)?;
        if started.elapsed() > timeout {
            return Err(StoreError::Fetch {
                uri,
                reason: format!("timed out after {timeout:?}"),
            });
        }
        let doc = self.parser.parse(&uri, &body)?;
        debug!(
            source,
            uri = %uri,
            statements = doc.statements.len(),
            "document fetched and parsed"
        );

        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let result = (|| -> Result<()> {
            delete_source_triples(&tx, source)?;
            let mut bnodes: HashMap<String, NodeId> = HashMap::new();
            for statement in &doc.statements {
                let s = intern_term(&tx, &statement.subject, &mut bnodes)?;
                let p = intern_term(&tx, &statement.predicate, &mut bnodes)?;
                let o = intern_term(&tx, &statement.object, &mut bnodes)?;
                tx.prepare_cached("INSERT OR IGNORE INTO triple VALUES (?1, ?2, ?3, ?4)")?
                    .execute(params![s, p, o, source])?;
            }
            for (prefix, base) in &doc.prefixes {
                upsert_namespace(&tx, prefix, base)?;
            }
            let now = OffsetDateTime::now_utc().unix_timestamp();
            tx.prepare_cached(
                "INSERT INTO source VALUES (?1, ?2, ?2)
                 ON CONFLICT (src) DO UPDATE SET loaded = excluded.loaded",
            )?
            .execute(params![source, now])?;
            Ok(())
        })();
        match result {
            Ok(()) => {
                tx.commit()?;
                info!(source, uri = %uri, triples = doc.statements.len(), "source loaded");
                Ok(())
            }
            Err(err) => {
                warn!(source, uri = %uri, error = %err, "load aborted, rolling back");
                tx.rollback()?;
                Err(err)
            }
        }
    }

    /// Removes every triple asserted under `source` (both partitions) and
    /// drops its provenance record.
    pub fn unload_source(&self, source: NodeId) -> Result<()> {
        if source <= 0 {
            return Err(StoreError::InvalidArgument(
                "source must be a resource id".into(),
            ));
        }
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        delete_source_triples(&tx, source)?;
        tx.prepare_cached("DELETE FROM source WHERE src = ?1")?
            .execute(params![source])?;
        tx.commit()?;
        info!(source, "source unloaded");
        Ok(())
    }

    /// Ids of every source with a provenance record.
    pub fn all_sources(&self) -> Result<Vec<NodeId>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached("SELECT src FROM source ORDER BY src")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<NodeId>>>()?;
        Ok(ids)
    }
}

fn delete_source_triples(conn: &Connection, source: NodeId) -> Result<()> {
    conn.prepare_cached("DELETE FROM cache.triple WHERE src = ?1")?
        .execute(params![source])?;
    conn.prepare_cached("DELETE FROM triple WHERE src = ?1")?
        .execute(params![source])?;
    Ok(())
}

/// Interns one parsed term. Blank-node labels are scoped to the document
/// being loaded via `bnodes`.
fn intern_term(
    conn: &Connection,
    term: &Term,
    bnodes: &mut HashMap<String, NodeId>,
) -> Result<NodeId> {
    match term {
        Term::Uri(uri) => intern_uri(conn, uri),
        Term::Blank(label) => {
            if let Some(&id) = bnodes.get(label) {
                return Ok(id);
            }
            let id = intern_blank(conn)?;
            bnodes.insert(label.clone(), id);
            Ok(id)
        }
        Term::Literal {
            lexical,
            datatype,
            lang,
        } => {
            let datatype_id = match datatype {
                Some(uri) => intern_uri(conn, uri)?,
                None => 0,
            };
            intern_literal(conn, lexical, datatype_id, lang.as_deref().unwrap_or(""))
        }
    }
}
