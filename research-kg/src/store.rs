//! Storage seam used by the pipeline
//!
//! [`TripleStore`] is implemented by [`GraphClient`] for Neo4j and by
//! [`MemoryTripleStore`](crate::memory::MemoryTripleStore) for tests and
//! offline runs.

use crate::connection::GraphClient;
use crate::error::Result;
use crate::schema::{self, GraphStats, Triple};
use async_trait::async_trait;

#[async_trait]
pub trait TripleStore: Send + Sync {
    /// Merge one document's triples; returns how many were written
    async fn upsert_triples(&self, triples: &[Triple]) -> Result<usize>;

    /// Outgoing triples of at most `limit` entities whose name contains
    /// `keyword`, ignoring case
    async fn query_triples(&self, keyword: &str, limit: usize) -> Result<Vec<Triple>>;

    async fn stats(&self) -> Result<GraphStats>;
}

#[async_trait]
impl TripleStore for GraphClient {
    async fn upsert_triples(&self, triples: &[Triple]) -> Result<usize> {
        schema::upsert_triples(self.graph(), triples).await
    }

    async fn query_triples(&self, keyword: &str, limit: usize) -> Result<Vec<Triple>> {
        schema::query_triples(self.graph(), keyword, limit).await
    }

    async fn stats(&self) -> Result<GraphStats> {
        schema::graph_stats(self.graph()).await
    }
}
