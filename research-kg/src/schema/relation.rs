//! Relationship type sanitization
//!
//! Cypher cannot take a relationship type as a query parameter, so the
//! predicate of a triple ends up in an identifier position. Every predicate
//! goes through [`RelationType::parse`] first; only ASCII letters, digits
//! and underscores survive, which makes the backtick-quoted form safe to
//! splice into a statement.

use crate::error::{GraphError, Result};
use std::fmt;

/// Longest relationship type accepted
pub const MAX_RELATION_TYPE_LEN: usize = 128;

/// A predicate validated for use as a Neo4j relationship type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationType(String);

impl RelationType {
    /// Normalize and validate a predicate
    ///
    /// Surrounding whitespace is trimmed and internal runs of whitespace or
    /// `-` become a single `_`. Case is preserved.
    pub fn parse(predicate: &str) -> Result<Self> {
        let mut normalized = String::with_capacity(predicate.len());
        let mut pending_separator = false;

        for c in predicate.trim().chars() {
            if c.is_whitespace() || c == '-' {
                pending_separator = true;
                continue;
            }
            if pending_separator {
                normalized.push('_');
                pending_separator = false;
            }
            if !(c.is_ascii_alphanumeric() || c == '_') {
                return Err(GraphError::invalid_relation(
                    predicate,
                    &format!("contains {:?}", c),
                ));
            }
            normalized.push(c);
        }

        if normalized.is_empty() {
            return Err(GraphError::invalid_relation(predicate, "empty"));
        }
        if normalized.len() > MAX_RELATION_TYPE_LEN {
            return Err(GraphError::invalid_relation(
                predicate,
                &format!("longer than {} characters", MAX_RELATION_TYPE_LEN),
            ));
        }
        if normalized.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(GraphError::invalid_relation(predicate, "starts with a digit"));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Backtick-quoted form for a Cypher identifier position
    pub fn cypher_identifier(&self) -> String {
        format!("`{}`", self.0)
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
