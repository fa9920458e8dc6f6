//! The dispatcher's operation surface as a finite tagged union.
//!
//! Each operation names its required and defaulted parameters; parsing a
//! route plus a query-parameter map either yields a typed operation or a
//! precise parameter error. Execution maps onto the store and the label
//! resolver and produces a JSON value ready for the wire.

use std::collections::HashMap;

use serde_json::{json, Value};
use thiserror::Error;

use crate::error::Result;
use crate::label::LabelResolver;
use crate::model::{NodeId, Partition};
use crate::store::Store;

/// A request the dispatcher can carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Pattern query over triples; 0 is a wildcard.
    Query {
        /// Subject pattern.
        s: NodeId,
        /// Predicate pattern.
        p: NodeId,
        /// Object pattern.
        o: NodeId,
    },
    /// Distinct sources of matching triples.
    Sources {
        /// Subject pattern.
        s: NodeId,
        /// Predicate pattern.
        p: NodeId,
        /// Object pattern.
        o: NodeId,
    },
    /// Assert one quad.
    Add {
        /// Subject id.
        s: NodeId,
        /// Predicate id.
        p: NodeId,
        /// Object id.
        o: NodeId,
        /// Provenance source id, 0 for none.
        source: NodeId,
        /// Assert into the temporary partition.
        temporary: bool,
    },
    /// Retract one quad.
    Del {
        /// Subject id.
        s: NodeId,
        /// Predicate id.
        p: NodeId,
        /// Object id.
        o: NodeId,
        /// Provenance source id, 0 for none.
        source: NodeId,
        /// Retract from the temporary partition.
        temporary: bool,
    },
    /// Count matching quads. Purely a read.
    Count {
        /// Subject pattern.
        s: NodeId,
        /// Predicate pattern.
        p: NodeId,
        /// Object pattern.
        o: NodeId,
        /// Source filter, 0 for any.
        source: NodeId,
        /// Partition selector.
        partition: Partition,
    },
    /// Term behind an id.
    Info {
        /// The id to look up.
        id: NodeId,
    },
    /// Intern a URI term.
    Node {
        /// Absolute URI.
        uri: String,
    },
    /// Intern a literal term.
    Literal {
        /// Lexical form.
        string: String,
        /// Datatype id, 0 for untyped.
        datatype: NodeId,
        /// Language tag, empty for none.
        lang: String,
    },
    /// Load (or reload) a source document.
    Load {
        /// Source id; its URI names the document.
        source: NodeId,
    },
    /// Upsert a namespace binding.
    AddNamespace {
        /// Prefix.
        prefix: String,
        /// URI base.
        uri: String,
    },
    /// Drop a namespace binding.
    DelNamespace {
        /// Prefix.
        prefix: String,
    },
    /// Expand a qname to a URI.
    Expand {
        /// `prefix:suffix` form.
        qname: String,
    },
    /// Compact a URI to a qname, if a binding matches.
    ReverseExpand {
        /// Absolute URI.
        uri: String,
    },
    /// Objects reachable from a node over a property.
    Values {
        /// Start node id.
        node: NodeId,
        /// Property id to follow.
        path: NodeId,
    },
    /// Human-readable label for a node.
    Label {
        /// The id to label.
        id: NodeId,
    },
}

/// Why a route/parameter map failed to parse into an [`Operation`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OpError {
    /// The route names no operation.
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),
    /// A required parameter was absent.
    #[error("parameter '{0}' missing")]
    MissingParam(&'static str),
    /// A parameter failed to parse as the expected type.
    #[error("parameter '{name}' has invalid value '{value}'")]
    InvalidParam {
        /// Parameter name.
        name: &'static str,
        /// Offending raw value.
        value: String,
    },
}

type Params = HashMap<String, String>;

fn required<'a>(params: &'a Params, name: &'static str) -> std::result::Result<&'a str, OpError> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or(OpError::MissingParam(name))
}

fn required_id(params: &Params, name: &'static str) -> std::result::Result<NodeId, OpError> {
    parse_id(required(params, name)?, name)
}

fn optional_id(params: &Params, name: &'static str) -> std::result::Result<NodeId, OpError> {
    match params.get(name) {
        Some(raw) => parse_id(raw, name),
        None => Ok(0),
    }
}

fn parse_id(raw: &str, name: &'static str) -> std::result::Result<NodeId, OpError> {
    raw.parse().map_err(|_| OpError::InvalidParam {
        name,
        value: raw.to_owned(),
    })
}

impl Operation {
    /// Parses a dispatcher route and its query parameters.
    pub fn parse(route: &str, params: &Params) -> std::result::Result<Self, OpError> {
        match route {
            "/query" => Ok(Operation::Query {
                s: optional_id(params, "s")?,
                p: optional_id(params, "p")?,
                o: optional_id(params, "o")?,
            }),
            "/sources" => Ok(Operation::Sources {
                s: optional_id(params, "s")?,
                p: optional_id(params, "p")?,
                o: optional_id(params, "o")?,
            }),
            "/add" => Ok(Operation::Add {
                s: required_id(params, "s")?,
                p: required_id(params, "p")?,
                o: required_id(params, "o")?,
                source: optional_id(params, "source")?,
                temporary: optional_id(params, "temporary")? != 0,
            }),
            "/del" => Ok(Operation::Del {
                s: required_id(params, "s")?,
                p: required_id(params, "p")?,
                o: required_id(params, "o")?,
                source: optional_id(params, "source")?,
                temporary: optional_id(params, "temporary")? != 0,
            }),
            "/count" => Ok(Operation::Count {
                s: optional_id(params, "s")?,
                p: optional_id(params, "p")?,
                o: optional_id(params, "o")?,
                source: optional_id(params, "source")?,
                partition: Partition::from_flag(optional_id(params, "temporary")?),
            }),
            "/info" => Ok(Operation::Info {
                id: required_id(params, "id")?,
            }),
            "/node" => Ok(Operation::Node {
                uri: required(params, "uri")?.to_owned(),
            }),
            "/literal" => Ok(Operation::Literal {
                string: required(params, "string")?.to_owned(),
                datatype: optional_id(params, "dt")?,
                lang: params.get("lang").cloned().unwrap_or_default(),
            }),
            "/load" => Ok(Operation::Load {
                source: required_id(params, "source")?,
            }),
            "/addNamespace" => Ok(Operation::AddNamespace {
                prefix: required(params, "prefix")?.to_owned(),
                uri: required(params, "uri")?.to_owned(),
            }),
            "/delNamespace" => Ok(Operation::DelNamespace {
                prefix: required(params, "prefix")?.to_owned(),
            }),
            "/expand" => Ok(Operation::Expand {
                qname: required(params, "qname")?.to_owned(),
            }),
            "/reverseExpand" => Ok(Operation::ReverseExpand {
                uri: required(params, "uri")?.to_owned(),
            }),
            "/values" => Ok(Operation::Values {
                node: required_id(params, "node")?,
                path: required_id(params, "path")?,
            }),
            "/label" => Ok(Operation::Label {
                id: required_id(params, "id")?,
            }),
            other => Err(OpError::UnknownOperation(other.to_owned())),
        }
    }

    /// Runs the operation and serializes its result.
    pub fn execute(&self, store: &Store, resolver: &LabelResolver) -> Result<Value> {
        match self {
            Operation::Query { s, p, o } => Ok(json!(store.query(*s, *p, *o)?)),
            Operation::Sources { s, p, o } => Ok(json!(store.sources(*s, *p, *o)?)),
            Operation::Add {
                s,
                p,
                o,
                source,
                temporary,
            } => {
                store.add_triple(*s, *p, *o, *source, *temporary)?;
                Ok(json!(true))
            }
            Operation::Del {
                s,
                p,
                o,
                source,
                temporary,
            } => {
                store.delete_triple(*s, *p, *o, *source, *temporary)?;
                Ok(json!(true))
            }
            Operation::Count {
                s,
                p,
                o,
                source,
                partition,
            } => Ok(json!(store.count(*s, *p, *o, *source, *partition)?)),
            Operation::Info { id } => Ok(json!(store.info(*id)?)),
            Operation::Node { uri } => Ok(json!(store.node(uri)?)),
            Operation::Literal {
                string,
                datatype,
                lang,
            } => Ok(json!(store.literal(string, *datatype, lang)?)),
            Operation::Load { source } => {
                store.load(*source)?;
                Ok(json!(true))
            }
            Operation::AddNamespace { prefix, uri } => {
                store.add_namespace(prefix, uri)?;
                Ok(json!(true))
            }
            Operation::DelNamespace { prefix } => {
                store.del_namespace(prefix)?;
                Ok(json!(true))
            }
            Operation::Expand { qname } => Ok(json!(store.expand(qname)?)),
            Operation::ReverseExpand { uri } => Ok(json!(store.reverse_expand(uri)?)),
            Operation::Values { node, path } => Ok(json!(resolver.values(*node, *path)?)),
            Operation::Label { id } => Ok(json!(resolver.label(*id)?)),
        }
    }
}
