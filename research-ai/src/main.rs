use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use research_ai::pipeline::{CrawlStage, DraftStage, ParseStage, Pipeline, ANSWER_HEADER};
use research_ai::{Args, Config, NoopExtractor, OllamaChat, ReactAgent, TavilyClient};
use research_kg::{GraphClient, TripleStore};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Logs go to stderr; stdout carries only the prompt and the answer
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "research_ai=info,research_kg=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Config::from_args(Args::parse())?;

    let search = Arc::new(TavilyClient::new(config.search.clone())?);
    let graph = Arc::new(
        GraphClient::connect(&config.graph)
            .await
            .context("Failed to connect to Neo4j")?,
    );
    let model = Arc::new(OllamaChat::new(config.llm.clone())?);

    if config.health_check {
        let health = graph.health_check_with_retry().await;
        if health.status.is_operational() {
            tracing::info!(
                "Neo4j is {:?} ({}ms)",
                health.status,
                health.response_time_ms
            );
        } else {
            tracing::warn!(
                "Neo4j health check failed: {}",
                health.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    let store: Arc<dyn TripleStore> = graph;
    let agent = Arc::new(ReactAgent::with_config(model, config.agent.clone()));
    let pipeline = Pipeline::new(
        CrawlStage::new(search, config.search_depth),
        ParseStage::new(store.clone(), Arc::new(NoopExtractor)),
        DraftStage::new(store, agent, config.graph_limit),
    );

    let query = read_query(&mut io::stdin().lock(), &mut io::stdout())?;
    let state = pipeline.invoke(&query).await?;

    println!("\n{}", ANSWER_HEADER);
    println!("{}", state.answer().unwrap_or_default());
    Ok(())
}

/// Prompt on `output` and read one question line from `input`
///
/// The line ending is stripped; a blank question is an error.
fn read_query(input: &mut impl BufRead, output: &mut impl Write) -> Result<String> {
    write!(output, "Enter your research question: ")?;
    output.flush()?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read the question from stdin")?;

    let query = line.trim_end_matches(['\r', '\n']).to_string();
    if query.trim().is_empty() {
        bail!("No research question given");
    }
    Ok(query)
}
