//! Command-line and environment configuration
//!
//! Every option can come from a flag, an environment variable (a `.env`
//! file is honored) or its default.

use crate::agent::AgentConfig;
use crate::crawler::TavilyConfig;
use crate::llm::OllamaConfig;
use anyhow::{ensure, Result};
use clap::Parser;
use research_kg::{GraphConfig, DEFAULT_QUERY_LIMIT};
use std::time::Duration;
use tracing::warn;

const PLACEHOLDER_API_KEY: &str = "key";

#[derive(Parser, Debug, Clone)]
#[command(name = "research-ai")]
#[command(about = "Crawl the web, build a knowledge graph and draft an answer", long_about = None)]
pub struct Args {
    /// Tavily API key
    #[arg(long, env = "TAVILY_API_KEY", default_value = PLACEHOLDER_API_KEY, hide_env_values = true)]
    pub tavily_api_key: String,

    /// Tavily API base URL
    #[arg(long, env = "TAVILY_BASE_URL", default_value = "https://api.tavily.com")]
    pub tavily_url: String,

    /// Search depth (1 = basic, 2+ = advanced)
    #[arg(long, env = "SEARCH_DEPTH", default_value_t = 2)]
    pub search_depth: u8,

    /// Maximum search results to crawl
    #[arg(long, env = "SEARCH_MAX_RESULTS", default_value_t = 5)]
    pub max_results: u32,

    /// Search request timeout in seconds
    #[arg(long, env = "SEARCH_TIMEOUT_SECS", default_value_t = 30)]
    pub search_timeout_secs: u64,

    /// Neo4j Bolt URI
    #[arg(long, env = "NEO4J_URI", default_value = "bolt://localhost:7687")]
    pub neo4j_uri: String,

    #[arg(long, env = "NEO4J_USER", default_value = "neo4j")]
    pub neo4j_user: String,

    #[arg(long, env = "NEO4J_PASS", default_value = "pass", hide_env_values = true)]
    pub neo4j_pass: String,

    #[arg(long, env = "NEO4J_DATABASE", default_value = "neo4j")]
    pub neo4j_database: String,

    /// Ollama server URL
    #[arg(long, env = "OLLAMA_BASE_URL", default_value = "http://localhost:11434")]
    pub ollama_url: String,

    /// Ollama model name
    #[arg(long, env = "OLLAMA_MODEL", default_value = "phi4")]
    pub model: String,

    /// Model request timeout in seconds
    #[arg(long, env = "OLLAMA_TIMEOUT_SECS", default_value_t = 120)]
    pub llm_timeout_secs: u64,

    /// Matching entities fetched per graph query
    #[arg(long, env = "GRAPH_QUERY_LIMIT", default_value_t = DEFAULT_QUERY_LIMIT)]
    pub graph_limit: usize,

    /// Reasoning steps the agent may take before giving up
    #[arg(long, env = "AGENT_MAX_ITERATIONS", default_value_t = 15)]
    pub max_iterations: usize,

    /// Skip the Neo4j health check at startup
    #[arg(long, env = "SKIP_HEALTH_CHECK")]
    pub skip_health_check: bool,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub search: TavilyConfig,
    pub search_depth: u8,
    pub graph: GraphConfig,
    pub llm: OllamaConfig,
    pub agent: AgentConfig,
    pub graph_limit: usize,
    pub health_check: bool,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        ensure!(args.search_depth > 0, "search depth must be at least 1");
        ensure!(args.max_results > 0, "max results must be at least 1");
        ensure!(args.graph_limit > 0, "graph query limit must be at least 1");
        ensure!(args.max_iterations > 0, "agent max iterations must be at least 1");
        ensure!(args.search_timeout_secs > 0, "search timeout must be at least 1 second");
        ensure!(args.llm_timeout_secs > 0, "model timeout must be at least 1 second");

        if args.tavily_api_key == PLACEHOLDER_API_KEY {
            warn!("TAVILY_API_KEY is not set; web search will likely be rejected");
        }

        Ok(Self {
            search: TavilyConfig {
                api_key: args.tavily_api_key,
                base_url: args.tavily_url,
                max_results: args.max_results,
                timeout: Duration::from_secs(args.search_timeout_secs),
            },
            search_depth: args.search_depth,
            graph: GraphConfig {
                uri: args.neo4j_uri,
                user: args.neo4j_user,
                password: args.neo4j_pass,
                database: args.neo4j_database,
                ..GraphConfig::default()
            },
            llm: OllamaConfig {
                base_url: args.ollama_url,
                model: args.model,
                stop: vec!["\nObservation:".to_string()],
                timeout: Duration::from_secs(args.llm_timeout_secs),
                ..OllamaConfig::default()
            },
            agent: AgentConfig {
                max_iterations: args.max_iterations,
                ..AgentConfig::default()
            },
            graph_limit: args.graph_limit,
            health_check: !args.skip_health_check,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_map_into_config() {
        let args = Args::try_parse_from([
            "research-ai",
            "--tavily-api-key",
            "tvly-abc",
            "--search-depth",
            "1",
            "--neo4j-uri",
            "bolt://graph:7687",
            "--model",
            "llama3.2",
            "--graph-limit",
            "3",
            "--skip-health-check",
        ])
        .unwrap();

        let config = Config::from_args(args).unwrap();

        assert_eq!(config.search.api_key, "tvly-abc");
        assert_eq!(config.search_depth, 1);
        assert_eq!(config.graph.uri, "bolt://graph:7687");
        assert_eq!(config.llm.model, "llama3.2");
        assert_eq!(config.llm.stop, vec!["\nObservation:".to_string()]);
        assert_eq!(config.graph_limit, 3);
        assert!(!config.health_check);
        assert!(config.agent.handle_parsing_errors);
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_args(Args::try_parse_from(["research-ai"]).unwrap()).unwrap();

        assert_eq!(config.search_depth, 2);
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.search.timeout, Duration::from_secs(30));
        assert_eq!(config.llm.model, "phi4");
        assert_eq!(config.llm.timeout, Duration::from_secs(120));
        assert_eq!(config.graph_limit, DEFAULT_QUERY_LIMIT);
        assert_eq!(config.agent.max_iterations, 15);
        assert!(config.health_check);
    }

    #[test]
    fn test_timeouts_configurable() {
        let args = Args::try_parse_from([
            "research-ai",
            "--search-timeout-secs",
            "10",
            "--llm-timeout-secs",
            "300",
        ])
        .unwrap();

        let config = Config::from_args(args).unwrap();

        assert_eq!(config.search.timeout, Duration::from_secs(10));
        assert_eq!(config.llm.timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let args = Args::try_parse_from(["research-ai", "--llm-timeout-secs", "0"]).unwrap();
        assert!(Config::from_args(args).is_err());
    }

    #[test]
    fn test_zero_depth_rejected() {
        let args = Args::try_parse_from(["research-ai", "--search-depth", "0"]).unwrap();
        assert!(Config::from_args(args).is_err());
    }

    #[test]
    fn test_zero_limit_rejected() {
        let args = Args::try_parse_from(["research-ai", "--graph-limit", "0"]).unwrap();
        assert!(Config::from_args(args).is_err());
    }

    #[test]
    fn test_non_numeric_depth_is_a_parse_error() {
        assert!(Args::try_parse_from(["research-ai", "--search-depth", "deep"]).is_err());
    }
}
