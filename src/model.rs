//! Core data model: interned terms, triples, partitions.

use serde::Serialize;

/// Interned term identifier.
///
/// Positive ids denote URI and blank-node terms, negative ids denote
/// literals. The sign is a storage-level convention only; callers inspect
/// terms through [`NodeInfo`], never through the sign.
pub type NodeId = i64;

/// The null node: wildcard in patterns, "no provenance" as a source.
pub const NULL_NODE: NodeId = 0;

/// `rdf:type`, seeded by the persistent schema.
pub const NODE_RDF_TYPE: NodeId = 1;
/// `rdf:Property`, seeded by the persistent schema.
pub const NODE_RDF_PROPERTY: NodeId = 2;
/// `rdfs:Resource`, seeded by the persistent schema.
pub const NODE_RDFS_RESOURCE: NodeId = 3;
/// `rdfs:Class`, seeded by the persistent schema.
pub const NODE_RDFS_CLASS: NodeId = 4;
/// `rdfs:subClassOf`, seeded by the persistent schema.
pub const NODE_RDFS_SUBCLASSOF: NodeId = 5;
/// `rdfs:label`, seeded by the persistent schema.
pub const NODE_RDFS_LABEL: NodeId = 6;

/// An interned term, as returned by `Store::info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeInfo {
    /// A named resource.
    Uri {
        /// Absolute URI of the resource.
        uri: String,
    },
    /// An anonymous resource.
    Blank {
        /// Interned id, the only identity a blank node has.
        id: NodeId,
    },
    /// A literal value.
    Literal {
        /// Lexical form.
        lexical: String,
        /// Datatype node id, 0 when untyped.
        datatype: NodeId,
        /// Language tag, absent when unspecified.
        lang: Option<String>,
    },
}

impl NodeInfo {
    /// Lexical form for literals, URI text for named resources.
    pub fn text(&self) -> Option<&str> {
        match self {
            NodeInfo::Uri { uri } => Some(uri),
            NodeInfo::Literal { lexical, .. } => Some(lexical),
            NodeInfo::Blank { .. } => None,
        }
    }
}

/// A (subject, predicate, object) fact.
///
/// Provenance and partition are carried separately; pattern queries collapse
/// matches to distinct triples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Triple {
    /// Subject id (URI or blank).
    pub s: NodeId,
    /// Predicate id (URI or blank).
    pub p: NodeId,
    /// Object id (any term kind).
    pub o: NodeId,
}

impl Triple {
    /// Builds a triple from its three positions.
    pub fn new(s: NodeId, p: NodeId, o: NodeId) -> Self {
        Self { s, p, o }
    }
}

/// Which quad partition an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    /// Both partitions.
    Any,
    /// The durable partition.
    Persistent,
    /// The volatile partition, cleared at every store open.
    Temporary,
}

impl Partition {
    /// Maps the dispatcher's integer flag: 0 selects any partition,
    /// nonzero the temporary one.
    pub fn from_flag(flag: i64) -> Self {
        if flag == 0 {
            Partition::Any
        } else {
            Partition::Temporary
        }
    }
}
