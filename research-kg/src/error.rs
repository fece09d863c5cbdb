//! Error types for knowledge graph operations
//!
//! This module defines the error type shared by every store in the
//! research-kg library, whether backed by Neo4j or held in memory.

use thiserror::Error;

/// Main error type for knowledge graph operations
#[derive(Error, Debug)]
pub enum GraphError {
    /// Connection error - network or connection pool issues
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Authentication error - invalid credentials or permissions
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// Query execution error
    #[error("Query error: {0}")]
    QueryError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A predicate that cannot be used as a relationship type
    #[error("Invalid relation type {predicate:?}: {reason}")]
    InvalidRelationType { predicate: String, reason: String },

    /// Neo4rs driver error (wrapper)
    #[error("Neo4rs driver error: {0}")]
    DriverError(#[from] neo4rs::Error),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

impl GraphError {
    pub(crate) fn invalid_relation(predicate: &str, reason: &str) -> Self {
        GraphError::InvalidRelationType {
            predicate: predicate.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for knowledge graph operations
pub type Result<T> = std::result::Result<T, GraphError>;

impl From<String> for GraphError {
    fn from(s: String) -> Self {
        GraphError::Other(s)
    }
}

impl From<&str> for GraphError {
    fn from(s: &str) -> Self {
        GraphError::Other(s.to_string())
    }
}
