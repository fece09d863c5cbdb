//! Tavily search API client

use super::{Document, SearchClient, SearchError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

pub const DEFAULT_TAVILY_URL: &str = "https://api.tavily.com";

#[derive(Debug, Clone)]
pub struct TavilyConfig {
    pub api_key: String,
    pub base_url: String,
    /// Results requested per search
    pub max_results: u32,
    pub timeout: Duration,
}

impl Default for TavilyConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_TAVILY_URL.to_string(),
            max_results: 5,
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct TavilyClient {
    client: Client,
    config: TavilyConfig,
}

impl TavilyClient {
    pub fn new(config: TavilyConfig) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("research-ai/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    /// Tavily only knows two depths; anything past 1 asks for the deep crawl
    fn search_depth(depth: u8) -> Result<&'static str, SearchError> {
        match depth {
            0 => Err(SearchError::InvalidDepth(depth)),
            1 => Ok("basic"),
            _ => Ok("advanced"),
        }
    }
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    search_depth: &'static str,
    max_results: u32,
    include_raw_content: bool,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    url: String,
    /// Snippet
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    raw_content: Option<String>,
}

impl From<TavilyResult> for Document {
    fn from(r: TavilyResult) -> Self {
        Document {
            title: r.title,
            url: r.url,
            content: r.raw_content.or(r.content).unwrap_or_default(),
        }
    }
}

#[async_trait]
impl SearchClient for TavilyClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, depth: u8) -> Result<Vec<Document>, SearchError> {
        let body = TavilyRequest {
            query,
            search_depth: Self::search_depth(depth)?,
            max_results: self.config.max_results,
            include_raw_content: true,
        };
        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TavilyResponse = response.json().await?;
        debug!("Tavily returned {} results", parsed.results.len());

        Ok(parsed.results.into_iter().map(Document::from).collect())
    }
}
