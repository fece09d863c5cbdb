use anyhow::Result;
use async_trait::async_trait;
use research_kg::{format_context, TripleStore};
use std::sync::Arc;

pub const GRAPH_QUERY_TOOL: &str = "GraphQuery";
pub const GRAPH_QUERY_DESCRIPTION: &str =
    "Fetch relevant triples from the Neo4j knowledge graph by keyword";

/// A named capability the agent may call with a text input
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    /// Shown to the model so it can decide when to use the tool
    fn description(&self) -> &str;

    async fn call(&self, input: &str) -> Result<String>;
}

/// Keyword lookup over the knowledge graph, one triple per output line
pub struct GraphQueryTool {
    store: Arc<dyn TripleStore>,
    limit: usize,
}

impl GraphQueryTool {
    pub fn new(store: Arc<dyn TripleStore>, limit: usize) -> Self {
        Self { store, limit }
    }
}

#[async_trait]
impl Tool for GraphQueryTool {
    fn name(&self) -> &str {
        GRAPH_QUERY_TOOL
    }

    fn description(&self) -> &str {
        GRAPH_QUERY_DESCRIPTION
    }

    async fn call(&self, input: &str) -> Result<String> {
        // Models like to quote their action input
        let keyword = input.trim().trim_matches(|c: char| c == '"' || c == '\'').trim();
        let triples = self.store.query_triples(keyword, self.limit).await?;
        Ok(format_context(&triples))
    }
}
