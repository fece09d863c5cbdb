//! Stores a few triples and prints the keyword context for them
//!
//! Run with: cargo run -p research-kg --example graph_demo

use research_kg::{format_context, GraphClient, GraphConfig, Triple, TripleStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let defaults = GraphConfig::default();
    let config = GraphConfig {
        uri: std::env::var("NEO4J_URI").unwrap_or(defaults.uri),
        user: std::env::var("NEO4J_USER").unwrap_or(defaults.user),
        password: std::env::var("NEO4J_PASS").unwrap_or(defaults.password),
        database: std::env::var("NEO4J_DATABASE").unwrap_or(defaults.database),
        ..defaults
    };

    println!("Connecting to Neo4j at {}...", config.uri);
    let client = GraphClient::connect(&config).await?;

    let health = client.health_check_with_retry().await;
    println!("Health: {:?} ({}ms)\n", health.status, health.response_time_ms);

    let triples = vec![
        Triple::new("Eiffel Tower", "locatedIn", "Paris"),
        Triple::new("Eiffel Tower", "designedBy", "Gustave Eiffel"),
        Triple::new("Paris", "capitalOf", "France"),
    ];
    let written = client.upsert_triples(&triples).await?;
    println!("Upserted {} triples", written);

    for keyword in ["eiffel", "PARIS", "Louvre"] {
        let found = client.query_triples(keyword, 5).await?;
        println!("\n[{}] {} triple(s)", keyword, found.len());
        println!("{}", format_context(&found));
    }

    let stats = client.stats().await?;
    println!("\nGraph: {} entities, {} relations", stats.entities, stats.relations);

    Ok(())
}
