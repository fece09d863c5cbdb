//! In-memory triple store with the same merge semantics as Neo4j

use crate::error::Result;
use crate::schema::{GraphStats, RelationType, Triple};
use crate::store::TripleStore;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Entities keyed by exact name, edges keyed by (source, type, target)
///
/// Insertion order is kept so query results are deterministic.
#[derive(Default)]
pub struct MemoryTripleStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    /// Entity names in insertion order
    entities: Vec<String>,
    /// name -> index into `entities`
    index: HashMap<String, usize>,
    /// Outgoing edges per entity index: (relation type, target index)
    edges: Vec<Vec<(String, usize)>>,
}

impl Inner {
    fn merge_entity(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.entities.len();
        self.entities.push(name.to_string());
        self.index.insert(name.to_string(), idx);
        self.edges.push(Vec::new());
        idx
    }

    fn merge_edge(&mut self, source: usize, relation: &RelationType, target: usize) {
        let outgoing = &mut self.edges[source];
        if !outgoing
            .iter()
            .any(|(rel, t)| rel == relation.as_str() && *t == target)
        {
            outgoing.push((relation.as_str().to_string(), target));
        }
    }
}

impl MemoryTripleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TripleStore for MemoryTripleStore {
    async fn upsert_triples(&self, triples: &[Triple]) -> Result<usize> {
        // Validate everything first so a bad predicate writes nothing
        let relations = triples
            .iter()
            .map(|t| RelationType::parse(&t.predicate))
            .collect::<Result<Vec<_>>>()?;

        let mut inner = self.inner.write().await;
        for (triple, relation) in triples.iter().zip(&relations) {
            let source = inner.merge_entity(&triple.subject);
            let target = inner.merge_entity(&triple.object);
            inner.merge_edge(source, relation, target);
        }

        debug!("Upserted {} triples into memory store", triples.len());
        Ok(triples.len())
    }

    async fn query_triples(&self, keyword: &str, limit: usize) -> Result<Vec<Triple>> {
        let needle = keyword.to_lowercase();
        let guard = self.inner.read().await;
        let inner = &*guard;

        let triples = inner
            .entities
            .iter()
            .enumerate()
            .filter(|(_, name)| name.to_lowercase().contains(&needle))
            .take(limit)
            .flat_map(|(idx, name)| {
                inner.edges[idx].iter().map(move |(rel, target)| Triple {
                    subject: name.clone(),
                    predicate: rel.clone(),
                    object: inner.entities[*target].clone(),
                })
            })
            .collect();

        Ok(triples)
    }

    async fn stats(&self) -> Result<GraphStats> {
        let inner = self.inner.read().await;
        Ok(GraphStats {
            entities: inner.entities.len() as u64,
            relations: inner.edges.iter().map(Vec::len).sum::<usize>() as u64,
        })
    }
}
