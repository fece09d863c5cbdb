//! Keyword lookup and statistics over the entity graph

use crate::error::{GraphError, Result};
use crate::schema::triple::{GraphStats, Triple};
use neo4rs::{query, Graph};

/// Default number of matching entities returned by a keyword query
pub const DEFAULT_QUERY_LIMIT: usize = 5;

const QUERY_TRIPLES: &str = "MATCH (e:Entity) WHERE toLower(e.name) CONTAINS toLower($q)
     WITH e LIMIT $limit
     MATCH (e)-[r]->(o)
     RETURN e.name AS subject, type(r) AS predicate, o.name AS object";

/// Fetch the outgoing triples of entities whose name contains `keyword`
///
/// Matching is case-insensitive. `limit` bounds the number of matching
/// entities, not the number of triples. Order is whatever Neo4j returns.
pub async fn query_triples(graph: &Graph, keyword: &str, limit: usize) -> Result<Vec<Triple>> {
    let cypher = query(QUERY_TRIPLES)
        .param("q", keyword.to_string())
        .param("limit", limit as i64);

    let mut result = graph
        .execute(cypher)
        .await
        .map_err(|e| GraphError::QueryError(format!("Failed to query triples: {}", e)))?;

    let mut triples = Vec::new();

    while let Some(row) = result
        .next()
        .await
        .map_err(|e| GraphError::QueryError(format!("Failed to read triple row: {}", e)))?
    {
        let subject: String = row.get("subject").map_err(|e| {
            GraphError::QueryError(format!("Failed to extract subject: {}", e))
        })?;
        let predicate: String = row.get("predicate").map_err(|e| {
            GraphError::QueryError(format!("Failed to extract predicate: {}", e))
        })?;
        let object: String = row.get("object").map_err(|e| {
            GraphError::QueryError(format!("Failed to extract object: {}", e))
        })?;

        triples.push(Triple {
            subject,
            predicate,
            object,
        });
    }

    Ok(triples)
}

/// Count entity nodes and the relationships between them
pub async fn graph_stats(graph: &Graph) -> Result<GraphStats> {
    let cypher = query(
        "MATCH (e:Entity)
         OPTIONAL MATCH (e)-[r]->(:Entity)
         RETURN count(DISTINCT e) AS entities, count(r) AS relations",
    );

    let mut result = graph
        .execute(cypher)
        .await
        .map_err(|e| GraphError::QueryError(format!("Failed to count graph: {}", e)))?;

    match result
        .next()
        .await
        .map_err(|e| GraphError::QueryError(format!("Failed to read result: {}", e)))?
    {
        Some(row) => {
            let entities: i64 = row.get("entities").unwrap_or(0);
            let relations: i64 = row.get("relations").unwrap_or(0);
            Ok(GraphStats {
                entities: entities.max(0) as u64,
                relations: relations.max(0) as u64,
            })
        }
        None => Ok(GraphStats::default()),
    }
}
