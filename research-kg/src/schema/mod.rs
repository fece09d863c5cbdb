//! Knowledge graph schema
//!
//! Facts are stored as `(:Entity {name})-[:PREDICATE]->(:Entity {name})`.

pub mod query;
pub mod relation;
pub mod triple;
pub mod upsert;

pub use query::{graph_stats, query_triples, DEFAULT_QUERY_LIMIT};
pub use relation::RelationType;
pub use triple::{format_context, GraphStats, Triple};
pub use upsert::upsert_triples;
