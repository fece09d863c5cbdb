//! The crawl → parse → draft research pipeline
//!
//! State is an immutable value. Each stage reads the current
//! [`PipelineState`] and returns a [`StateUpdate`]; the pipeline merges it
//! into a new state before running the next stage.

use crate::agent::{Agent, GraphQueryTool, Tool};
use crate::crawler::{Document, SearchClient};
use crate::extract::{ingest_documents, Extractor};
use anyhow::{Context, Result};
use async_trait::async_trait;
use research_kg::{format_context, TripleStore};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, info_span, Instrument};

/// Header printed before the answer
pub const ANSWER_HEADER: &str = "===== Research-AI Answer =====";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Field '{0}' is already set")]
    FieldAlreadySet(&'static str),

    #[error("Pipeline finished without an answer")]
    MissingAnswer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineState {
    query: String,
    documents: Option<Vec<Document>>,
    answer: Option<String>,
}

/// A stage's contribution to the state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateUpdate {
    pub documents: Option<Vec<Document>>,
    pub answer: Option<String>,
}

impl StateUpdate {
    pub fn documents(documents: Vec<Document>) -> Self {
        Self {
            documents: Some(documents),
            ..Self::default()
        }
    }

    pub fn answer(answer: impl Into<String>) -> Self {
        Self {
            answer: Some(answer.into()),
            ..Self::default()
        }
    }
}

impl PipelineState {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            documents: None,
            answer: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Crawled documents; empty until the crawl stage has run
    pub fn documents(&self) -> &[Document] {
        self.documents.as_deref().unwrap_or_default()
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    /// Merge an update into a new state
    ///
    /// `documents` and `answer` may each be set once; `query` never changes.
    pub fn merge(self, update: StateUpdate) -> Result<Self, PipelineError> {
        let mut next = self;

        if let Some(documents) = update.documents {
            if next.documents.is_some() {
                return Err(PipelineError::FieldAlreadySet("documents"));
            }
            next.documents = Some(documents);
        }

        if let Some(answer) = update.answer {
            if next.answer.is_some() {
                return Err(PipelineError::FieldAlreadySet("answer"));
            }
            next.answer = Some(answer);
        }

        Ok(next)
    }
}

/// One node of the pipeline
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, state: &PipelineState) -> Result<StateUpdate>;
}

/// Build the drafting prompt from graph context and the question
pub fn build_prompt(context: &str, query: &str) -> String {
    format!(
        "Use the following context to answer the question:\n{}\nQuestion: {}",
        context, query
    )
}

/// Searches the web for the query
pub struct CrawlStage {
    search: Arc<dyn SearchClient>,
    depth: u8,
}

impl CrawlStage {
    pub fn new(search: Arc<dyn SearchClient>, depth: u8) -> Self {
        Self { search, depth }
    }
}

#[async_trait]
impl Stage for CrawlStage {
    fn name(&self) -> &'static str {
        "crawl"
    }

    async fn run(&self, state: &PipelineState) -> Result<StateUpdate> {
        let documents = self
            .search
            .search(state.query(), self.depth)
            .await
            .context("Web search failed")?;

        info!(documents = documents.len(), "Crawled documents");
        Ok(StateUpdate::documents(documents))
    }
}

/// Extracts triples from the crawled documents into the graph
pub struct ParseStage {
    store: Arc<dyn TripleStore>,
    extractor: Arc<dyn Extractor>,
}

impl ParseStage {
    pub fn new(store: Arc<dyn TripleStore>, extractor: Arc<dyn Extractor>) -> Self {
        Self { store, extractor }
    }
}

#[async_trait]
impl Stage for ParseStage {
    fn name(&self) -> &'static str {
        "parse"
    }

    async fn run(&self, state: &PipelineState) -> Result<StateUpdate> {
        let stats =
            ingest_documents(self.store.as_ref(), self.extractor.as_ref(), state.documents())
                .await?;

        info!(
            documents = stats.documents,
            triples = stats.triples,
            rejected = stats.rejected,
            "Ingested documents into the knowledge graph"
        );

        let graph = self
            .store
            .stats()
            .await
            .context("Failed to read graph stats")?;
        info!(
            entities = graph.entities,
            relations = graph.relations,
            "Knowledge graph size"
        );

        Ok(StateUpdate::default())
    }
}

/// Queries the graph for context and asks the agent for an answer
pub struct DraftStage {
    store: Arc<dyn TripleStore>,
    agent: Arc<dyn Agent>,
    tools: Vec<Arc<dyn Tool>>,
    limit: usize,
}

impl DraftStage {
    /// The agent gets exactly one tool: graph query by keyword
    pub fn new(store: Arc<dyn TripleStore>, agent: Arc<dyn Agent>, limit: usize) -> Self {
        let tools: Vec<Arc<dyn Tool>> = vec![Arc::new(GraphQueryTool::new(store.clone(), limit))];
        Self {
            store,
            agent,
            tools,
            limit,
        }
    }
}

#[async_trait]
impl Stage for DraftStage {
    fn name(&self) -> &'static str {
        "draft"
    }

    async fn run(&self, state: &PipelineState) -> Result<StateUpdate> {
        let triples = self
            .store
            .query_triples(state.query(), self.limit)
            .await
            .context("Graph query failed")?;
        let context = format_context(&triples);
        info!(triples = triples.len(), "Retrieved graph context");

        let prompt = build_prompt(&context, state.query());
        let answer = self
            .agent
            .answer(&prompt, &self.tools)
            .await
            .context("Agent failed to draft an answer")?;

        Ok(StateUpdate::answer(answer))
    }
}

/// Fixed linear sequence of stages
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// crawl → parse → draft
    pub fn new(crawl: CrawlStage, parse: ParseStage, draft: DraftStage) -> Self {
        Self {
            stages: vec![Box::new(crawl), Box::new(parse), Box::new(draft)],
        }
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage in order and return the final state
    pub async fn invoke(&self, query: &str) -> Result<PipelineState> {
        let run_id = uuid::Uuid::new_v4().simple().to_string();
        let span = info_span!("pipeline", run_id = %&run_id[..8]);

        self.run_stages(query).instrument(span).await
    }

    async fn run_stages(&self, query: &str) -> Result<PipelineState> {
        let mut state = PipelineState::new(query);

        for stage in &self.stages {
            let stage_span = info_span!("stage", name = stage.name());
            stage_span.in_scope(|| info!("Stage started"));
            let update = stage
                .run(&state)
                .instrument(stage_span)
                .await
                .with_context(|| format!("Stage '{}' failed", stage.name()))?;
            state = state.merge(update)?;
        }

        if state.answer().is_none() {
            return Err(PipelineError::MissingAnswer.into());
        }
        info!("Pipeline complete");
        Ok(state)
    }
}
