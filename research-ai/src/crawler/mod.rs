//! Web search: turns a query into crawled documents

mod tavily;

pub use tavily::{TavilyClient, TavilyConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A crawled page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub url: String,
    /// Raw page text
    pub content: String,
}

#[derive(Error, Debug)]
pub enum SearchError {
    /// Transport failure or undecodable body
    #[error("Search request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Search service answered with a non-success status
    #[error("Search service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid search depth {0}: must be at least 1")]
    InvalidDepth(u8),
}

/// Search service seam
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Search the web; an empty list is a valid answer, not an error
    async fn search(&self, query: &str, depth: u8) -> Result<Vec<Document>, SearchError>;
}
