//! Node table: interning of RDF terms into stable ids.
//!
//! Resource ids grow upward from the last allocated positive id, literal
//! ids grow downward from the last allocated negative id. Ids are never
//! reused, even when every triple referencing a term is gone.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::model::{NodeId, NodeInfo};

use super::core::Store;

impl Store {
    /// Interns a URI term, returning the existing id when the URI was seen
    /// before. Idempotent.
    pub fn node(&self, uri: &str) -> Result<NodeId> {
        if uri.is_empty() {
            return Err(StoreError::InvalidArgument("empty URI".into()));
        }
        let conn = self.conn.lock();
        intern_uri(&conn, uri)
    }

    /// Allocates a fresh anonymous blank node. Every call produces a new
    /// term; blank nodes have no payload to dedupe on.
    pub fn blank(&self) -> Result<NodeId> {
        let conn = self.conn.lock();
        intern_blank(&conn)
    }

    /// Interns a literal term. `datatype` 0 means untyped, an empty `lang`
    /// means no language tag. Idempotent per (lexical, datatype, lang).
    pub fn literal(&self, lexical: &str, datatype: NodeId, lang: &str) -> Result<NodeId> {
        if datatype < 0 {
            return Err(StoreError::InvalidArgument(
                "literal datatype must be a resource id or 0".into(),
            ));
        }
        let conn = self.conn.lock();
        intern_literal(&conn, lexical, datatype, lang)
    }

    /// Looks up the term behind an id.
    pub fn info(&self, id: NodeId) -> Result<NodeInfo> {
        if id == 0 {
            return Err(StoreError::InvalidArgument(
                "the null node has no term".into(),
            ));
        }
        let conn = self.conn.lock();
        node_info(&conn, id)
    }

    /// Ids of all resource terms whose text starts with `pattern`.
    pub fn match_nodes(&self, pattern: &str) -> Result<Vec<NodeId>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare_cached("SELECT id FROM node WHERE str LIKE ?1 || '%' ORDER BY id")?;
        let ids = stmt
            .query_map(params![pattern], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<NodeId>>>()?;
        Ok(ids)
    }
}

fn next_resource_id(conn: &Connection) -> Result<NodeId> {
    let max: Option<NodeId> =
        conn.query_row("SELECT max(id) FROM node", [], |row| row.get(0))?;
    Ok(max.unwrap_or(0).max(0) + 1)
}

fn next_literal_id(conn: &Connection) -> Result<NodeId> {
    let min: Option<NodeId> =
        conn.query_row("SELECT min(id) FROM node", [], |row| row.get(0))?;
    Ok(min.unwrap_or(0).min(0) - 1)
}

pub(super) fn intern_uri(conn: &Connection, uri: &str) -> Result<NodeId> {
    let mut stmt = conn.prepare_cached("SELECT id FROM node WHERE str = ?1 AND id > 0")?;
    if let Some(id) = stmt
        .query_row(params![uri], |row| row.get(0))
        .optional()?
    {
        return Ok(id);
    }
    let id = next_resource_id(conn)?;
    conn.prepare_cached("INSERT INTO node VALUES (?1, ?2, 0, NULL)")?
        .execute(params![id, uri])?;
    debug!(id, uri, "interned resource");
    Ok(id)
}

pub(super) fn intern_blank(conn: &Connection) -> Result<NodeId> {
    let id = next_resource_id(conn)?;
    conn.prepare_cached("INSERT INTO node VALUES (?1, NULL, 0, NULL)")?
        .execute(params![id])?;
    debug!(id, "interned blank node");
    Ok(id)
}

pub(super) fn intern_literal(
    conn: &Connection,
    lexical: &str,
    datatype: NodeId,
    lang: &str,
) -> Result<NodeId> {
    let mut stmt = conn.prepare_cached(
        "SELECT id FROM node
         WHERE id < 0 AND str = ?1 AND datatype = ?2 AND coalesce(lang, '') = ?3",
    )?;
    if let Some(id) = stmt
        .query_row(params![lexical, datatype, lang], |row| row.get(0))
        .optional()?
    {
        return Ok(id);
    }
    let id = next_literal_id(conn)?;
    let stored_lang = if lang.is_empty() { None } else { Some(lang) };
    conn.prepare_cached("INSERT INTO node VALUES (?1, ?2, ?3, ?4)")?
        .execute(params![id, lexical, datatype, stored_lang])?;
    debug!(id, lexical, "interned literal");
    Ok(id)
}

pub(super) fn node_info(conn: &Connection, id: NodeId) -> Result<NodeInfo> {
    if id > 0 {
        let uri: Option<String> = conn
            .prepare_cached("SELECT str FROM node WHERE id = ?1")?
            .query_row(params![id], |row| row.get(0))
            .optional()?
            .ok_or(StoreError::NotFound(id))?;
        Ok(match uri {
            Some(uri) => NodeInfo::Uri { uri },
            None => NodeInfo::Blank { id },
        })
    } else {
        let row = conn
            .prepare_cached("SELECT str, datatype, lang FROM node WHERE id = ?1")?
            .query_row(params![id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, NodeId>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            })
            .optional()?
            .ok_or(StoreError::NotFound(id))?;
        Ok(NodeInfo::Literal {
            lexical: row.0,
            datatype: row.1,
            lang: row.2,
        })
    }
}
