//! Derived label resolution.
//!
//! A read-only service over the query engine and namespace registry: the
//! label of a node is the first `rdfs:label` object, followed recursively
//! until a literal is reached, with namespace compaction of the raw URI as
//! the fallback. A visited-set guards against label cycles in the data.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{Result, StoreError};
use crate::model::{NodeId, NodeInfo, NULL_NODE};
use crate::store::Store;

const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";

/// Computes human-readable labels for interned nodes.
#[derive(Clone)]
pub struct LabelResolver {
    store: Arc<Store>,
    label_property: NodeId,
}

impl LabelResolver {
    /// Builds a resolver over `store`, interning the label property once.
    pub fn new(store: Arc<Store>) -> Result<Self> {
        let label_property = store.node(RDFS_LABEL)?;
        Ok(Self {
            store,
            label_property,
        })
    }

    /// Objects of all `(node, property, *)` triples.
    pub fn values(&self, node: NodeId, property: NodeId) -> Result<Vec<NodeId>> {
        let triples = self.store.query(node, property, NULL_NODE)?;
        Ok(triples.into_iter().map(|t| t.o).collect())
    }

    /// A human-readable label for `id`.
    ///
    /// Literals render as their lexical form, quoted at the top level
    /// only. Resources follow their label chain to a literal; without one
    /// they compact to a qname, falling back to the raw URI. Fails with
    /// [`StoreError::CyclicLabel`] when the chain revisits a node.
    pub fn label(&self, id: NodeId) -> Result<String> {
        if id == NULL_NODE {
            return Err(StoreError::InvalidArgument(
                "the null node has no label".into(),
            ));
        }
        let mut visited = HashSet::new();
        self.resolve(id, true, &mut visited)
    }

    fn resolve(&self, id: NodeId, quote: bool, visited: &mut HashSet<NodeId>) -> Result<String> {
        if !visited.insert(id) {
            return Err(StoreError::CyclicLabel(id));
        }
        match self.store.info(id)? {
            NodeInfo::Literal { lexical, .. } => {
                if quote {
                    Ok(format!("\"{lexical}\""))
                } else {
                    Ok(lexical)
                }
            }
            NodeInfo::Uri { uri } => {
                if let Some(next) = self.label_object(id)? {
                    return self.resolve(next, false, visited);
                }
                Ok(self
                    .store
                    .reverse_expand(&uri)?
                    .unwrap_or(uri))
            }
            NodeInfo::Blank { id } => {
                if let Some(next) = self.label_object(id)? {
                    return self.resolve(next, false, visited);
                }
                Ok(format!("_:{id}"))
            }
        }
    }

    fn label_object(&self, id: NodeId) -> Result<Option<NodeId>> {
        let mut first = None;
        self.store
            .for_each_match(id, self.label_property, NULL_NODE, |t| {
                first = Some(t.o);
                false
            })?;
        Ok(first)
    }
}
