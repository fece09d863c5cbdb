//! Neo4j connection management and health checks
//!
//! [`GraphClient`] owns the pooled `neo4rs::Graph` handle. It is opened once
//! at startup and shared by every stage that touches the knowledge graph.

use crate::error::{GraphError, Result};
use chrono::{DateTime, Utc};
use neo4rs::{query, ConfigBuilder, Graph};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Connection parameters for a Neo4j server
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Bolt URI (e.g., "bolt://localhost:7687")
    pub uri: String,
    pub user: String,
    pub password: String,
    /// Database name (default: "neo4j")
    pub database: String,
    /// Rows fetched per round trip
    pub fetch_size: usize,
    /// Size of the connection pool
    pub max_connections: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "pass".to_string(),
            database: "neo4j".to_string(),
            fetch_size: 500,
            max_connections: 16,
        }
    }
}

/// Configuration for health check behavior
#[derive(Debug, Clone)]
pub struct HealthCheckConfig {
    /// Maximum number of retry attempts after the first failure
    pub max_retries: u32,
    /// Delay between retry attempts
    pub retry_delay: Duration,
    /// Whether to fall back from `db.ping()` to `RETURN 1`
    pub enable_fallback: bool,
    /// Response time threshold for degraded state (in milliseconds)
    pub degraded_threshold_ms: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
            enable_fallback: true,
            degraded_threshold_ms: 1000,
        }
    }
}

/// Health check method variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthCheckMethod {
    /// `RETURN 1`
    Simple,
    /// `CALL db.ping()` (Neo4j 4.1+)
    Ping,
}

/// Health status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Database is healthy and responsive
    Healthy,
    /// Database is responsive but slow (above degraded threshold)
    Degraded,
    /// Database is not responsive or erroring
    Unhealthy,
}

impl HealthStatus {
    /// Check if status is healthy or degraded (operational)
    pub fn is_operational(&self) -> bool {
        matches!(self, HealthStatus::Healthy | HealthStatus::Degraded)
    }
}

/// Outcome of a health check run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub status: HealthStatus,
    pub response_time_ms: u64,
    pub method: HealthCheckMethod,
    pub retry_count: u32,
    pub used_fallback: bool,
    pub timestamp: DateTime<Utc>,
    /// Error message (if unhealthy)
    pub error: Option<String>,
}

impl HealthCheckResult {
    fn operational(
        response_time: Duration,
        method: HealthCheckMethod,
        degraded_threshold_ms: u64,
    ) -> Self {
        let response_time_ms = response_time.as_millis() as u64;
        let status = if response_time_ms > degraded_threshold_ms {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        Self {
            status,
            response_time_ms,
            method,
            retry_count: 0,
            used_fallback: false,
            timestamp: Utc::now(),
            error: None,
        }
    }

    fn unhealthy(response_time: Duration, error: &str, method: HealthCheckMethod) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            response_time_ms: response_time.as_millis() as u64,
            method,
            retry_count: 0,
            used_fallback: false,
            timestamp: Utc::now(),
            error: Some(error.to_string()),
        }
    }
}

/// Neo4j client with connection pooling
pub struct GraphClient {
    graph: Graph,
    health_config: HealthCheckConfig,
}

impl GraphClient {
    /// Connect to Neo4j with the default health check configuration
    ///
    /// # Example
    /// ```no_run
    /// use research_kg::{GraphClient, GraphConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let client = GraphClient::connect(&GraphConfig::default()).await?;
    ///     let healthy = client.health_check().await?;
    ///     println!("Database healthy: {}", healthy);
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(config: &GraphConfig) -> Result<Self> {
        Self::with_health_config(config, HealthCheckConfig::default()).await
    }

    pub async fn with_health_config(
        config: &GraphConfig,
        health_config: HealthCheckConfig,
    ) -> Result<Self> {
        info!(
            "Connecting to Neo4j at {} (database: {})",
            config.uri, config.database
        );

        let neo4j_config = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.user.as_str())
            .password(config.password.as_str())
            .db(config.database.as_str())
            .fetch_size(config.fetch_size)
            .max_connections(config.max_connections)
            .build()
            .map_err(|e| GraphError::ConfigError(e.to_string()))?;

        let graph = Graph::connect(neo4j_config).await.map_err(connect_error)?;

        info!("Successfully connected to Neo4j");

        Ok(Self {
            graph,
            health_config,
        })
    }

    /// Simple health check using `RETURN 1`
    pub async fn health_check(&self) -> Result<bool> {
        debug!("Executing simple health check (RETURN 1)");

        self.graph
            .run(query("RETURN 1"))
            .await
            .map_err(connect_error)?;

        Ok(true)
    }

    /// Standard health check using `CALL db.ping()`
    pub async fn health_check_ping(&self) -> Result<HealthStatus> {
        debug!("Executing standard health check (CALL db.ping())");

        let mut result = self
            .graph
            .execute(query("CALL db.ping()"))
            .await
            .map_err(|e| GraphError::QueryError(e.to_string()))?;

        match result
            .next()
            .await
            .map_err(|e| GraphError::QueryError(e.to_string()))?
        {
            Some(row) => {
                let success: bool = row.get("success").unwrap_or(false);
                if success {
                    Ok(HealthStatus::Healthy)
                } else {
                    warn!("db.ping() returned success=false");
                    Ok(HealthStatus::Unhealthy)
                }
            }
            None => Err(GraphError::QueryError(
                "No result returned from db.ping()".to_string(),
            )),
        }
    }

    /// Run `db.ping()` with fallback to `RETURN 1` and retries
    ///
    /// Never fails: errors are captured in the returned result, whose
    /// status is `Unhealthy` once the retries are exhausted.
    pub async fn health_check_with_retry(&self) -> HealthCheckResult {
        let mut retry_count = 0;
        let mut used_fallback = false;

        loop {
            let start = Instant::now();

            let mut result = match self.health_check_ping().await {
                Ok(HealthStatus::Unhealthy) => HealthCheckResult::unhealthy(
                    start.elapsed(),
                    "db.ping() reported failure",
                    HealthCheckMethod::Ping,
                ),
                Ok(_) => HealthCheckResult::operational(
                    start.elapsed(),
                    HealthCheckMethod::Ping,
                    self.health_config.degraded_threshold_ms,
                ),
                Err(e) if self.health_config.enable_fallback => {
                    warn!("db.ping() failed, falling back to RETURN 1: {}", e);
                    used_fallback = true;
                    match self.health_check().await {
                        Ok(_) => HealthCheckResult::operational(
                            start.elapsed(),
                            HealthCheckMethod::Simple,
                            self.health_config.degraded_threshold_ms,
                        ),
                        Err(fallback_err) => HealthCheckResult::unhealthy(
                            start.elapsed(),
                            &fallback_err.to_string(),
                            HealthCheckMethod::Simple,
                        ),
                    }
                }
                Err(e) => HealthCheckResult::unhealthy(
                    start.elapsed(),
                    &e.to_string(),
                    HealthCheckMethod::Ping,
                ),
            };

            if result.status.is_operational() || retry_count >= self.health_config.max_retries {
                result.retry_count = retry_count;
                result.used_fallback = used_fallback;
                return result;
            }

            retry_count += 1;
            warn!(
                "Health check failed (attempt {}/{}), retrying after {:?}",
                retry_count,
                self.health_config.max_retries + 1,
                self.health_config.retry_delay
            );
            tokio::time::sleep(self.health_config.retry_delay).await;
        }
    }

    /// Get a reference to the underlying Neo4j Graph instance
    pub fn graph(&self) -> &Graph {
        &self.graph
    }
}

/// Rejected credentials get their own variant; everything else is a
/// connection problem
fn connect_error(e: neo4rs::Error) -> GraphError {
    match e {
        neo4rs::Error::AuthenticationError(message) => GraphError::AuthenticationError(message),
        other => GraphError::ConnectionError(other.to_string()),
    }
}
