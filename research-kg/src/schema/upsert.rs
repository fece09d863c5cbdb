//! Idempotent upsert of triples into Neo4j

use crate::error::{GraphError, Result};
use crate::schema::relation::RelationType;
use crate::schema::triple::Triple;
use neo4rs::{query, Graph, Query};
use tracing::{debug, warn};

/// Build the MERGE statement for one triple
///
/// Entity names travel as parameters; only the already sanitized
/// relationship type is spliced into the statement text.
fn merge_triple_query(triple: &Triple, relation: &RelationType) -> Query {
    let cypher = format!(
        "MERGE (a:Entity {{name: $subject}})
         MERGE (b:Entity {{name: $object}})
         MERGE (a)-[:{}]->(b)",
        relation.cypher_identifier()
    );

    query(&cypher)
        .param("subject", triple.subject.clone())
        .param("object", triple.object.clone())
}

/// Upsert a batch of triples inside one transaction
///
/// Every predicate is validated before the transaction opens, so an
/// invalid predicate writes nothing. A failing statement rolls the whole
/// batch back.
pub async fn upsert_triples(graph: &Graph, triples: &[Triple]) -> Result<usize> {
    if triples.is_empty() {
        return Ok(0);
    }

    let statements = triples
        .iter()
        .map(|t| RelationType::parse(&t.predicate).map(|rel| merge_triple_query(t, &rel)))
        .collect::<Result<Vec<_>>>()?;

    let mut txn = graph
        .start_txn()
        .await
        .map_err(|e| GraphError::QueryError(format!("Failed to start transaction: {}", e)))?;

    for statement in statements {
        if let Err(e) = txn.run(statement).await {
            if let Err(rollback_err) = txn.rollback().await {
                warn!("Rollback after failed upsert also failed: {}", rollback_err);
            }
            return Err(GraphError::QueryError(format!(
                "Failed to upsert triple batch: {}",
                e
            )));
        }
    }

    txn.commit()
        .await
        .map_err(|e| GraphError::QueryError(format!("Failed to commit triples: {}", e)))?;

    debug!("Upserted {} triples in one transaction", triples.len());
    Ok(triples.len())
}
