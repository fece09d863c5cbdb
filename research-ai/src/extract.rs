//! Entity/relation extraction and graph ingestion
//!
//! [`Extractor`] is the extension point for turning page text into
//! triples. The only shipped implementation, [`NoopExtractor`], finds
//! nothing; plug in an NER or model-backed extractor by implementing the
//! trait.

use crate::crawler::Document;
use anyhow::{Context, Result};
use async_trait::async_trait;
use research_kg::{GraphError, RelationType, Triple, TripleStore};
use tracing::{debug, warn};

#[async_trait]
pub trait Extractor: Send + Sync {
    /// Derive zero or more triples from a document's text
    async fn extract(&self, text: &str) -> Result<Vec<Triple>>;
}

/// Placeholder extractor: always yields no triples
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExtractor;

#[async_trait]
impl Extractor for NoopExtractor {
    async fn extract(&self, _text: &str) -> Result<Vec<Triple>> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub documents: usize,
    pub triples: usize,
    /// Triples dropped because their predicate is not a valid relation type
    pub rejected: usize,
}

/// Extract triples from each document and merge them into the store
///
/// Each document's triples are written as one batch. Triples whose
/// predicate cannot be a relationship type are skipped with a warning.
pub async fn ingest_documents(
    store: &dyn TripleStore,
    extractor: &dyn Extractor,
    documents: &[Document],
) -> Result<IngestStats> {
    let mut stats = IngestStats::default();

    for doc in documents {
        stats.documents += 1;

        let extracted = extractor
            .extract(&doc.content)
            .await
            .with_context(|| format!("Failed to extract triples from {}", doc.url))?;

        let mut accepted = Vec::with_capacity(extracted.len());
        for triple in extracted {
            match RelationType::parse(&triple.predicate) {
                Ok(_) => accepted.push(triple),
                Err(GraphError::InvalidRelationType { predicate, reason }) => {
                    warn!(url = %doc.url, "Skipping triple with predicate {:?}: {}", predicate, reason);
                    stats.rejected += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        let written = store
            .upsert_triples(&accepted)
            .await
            .with_context(|| format!("Failed to store triples from {}", doc.url))?;
        stats.triples += written;

        debug!(url = %doc.url, triples = written, "Ingested document");
    }

    Ok(stats)
}
