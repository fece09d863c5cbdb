//! # Research-AI Knowledge Graph (research-kg)
//!
//! Stores subject-predicate-object triples in Neo4j and looks them up by
//! keyword.
//!
//! ## Features
//!
//! - Pooled Neo4j client with a retrying health check
//! - Idempotent `MERGE` upsert of entities and typed edges
//! - Predicate sanitization before it reaches a relationship-type position
//! - Case-insensitive keyword lookup bounded by entity count
//! - An in-memory store with identical semantics behind the same trait
//!
//! ## Storing and querying triples
//!
//! ```no_run
//! use research_kg::{format_context, GraphClient, GraphConfig, Triple, TripleStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = GraphClient::connect(&GraphConfig::default()).await?;
//!
//!     client
//!         .upsert_triples(&[Triple::new("Eiffel Tower", "locatedIn", "Paris")])
//!         .await?;
//!
//!     let triples = client.query_triples("eiffel", 5).await?;
//!     println!("{}", format_context(&triples));
//!     Ok(())
//! }
//! ```

pub mod connection;
pub mod error;
pub mod memory;
pub mod schema;
pub mod store;

// Re-export main types for convenience
pub use connection::{
    GraphClient, GraphConfig, HealthCheckConfig, HealthCheckMethod, HealthCheckResult,
    HealthStatus,
};
pub use error::{GraphError, Result};
pub use memory::MemoryTripleStore;
pub use schema::{format_context, GraphStats, RelationType, Triple, DEFAULT_QUERY_LIMIT};
pub use store::TripleStore;
