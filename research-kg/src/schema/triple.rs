//! Triple type and context formatting

use serde::{Deserialize, Serialize};
use std::fmt;

/// A subject-predicate-object fact stored as two `Entity` nodes and one edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Triple {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

/// Render triples as prompt context, one `subject predicate object` per line
///
/// An empty slice renders as the empty string.
pub fn format_context(triples: &[Triple]) -> String {
    triples
        .iter()
        .map(Triple::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Node and edge counts of a store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub entities: u64,
    pub relations: u64,
}
