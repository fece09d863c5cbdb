//! End-to-end pipeline tests
//!
//! The web search, extractor and agent are replaced by in-process fakes and
//! the graph is the in-memory triple store, so these run without any
//! external service.

use anyhow::Result;
use async_trait::async_trait;
use research_ai::agent::{Agent, AgentError, Tool};
use research_ai::crawler::{Document, SearchClient, SearchError};
use research_ai::extract::{Extractor, NoopExtractor};
use research_ai::llm::{ChatMessage, ChatModel, LlmError};
use research_ai::pipeline::{CrawlStage, DraftStage, ParseStage, Pipeline};
use research_ai::ReactAgent;
use research_kg::{GraphStats, MemoryTripleStore, Triple, TripleStore};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// ============================================================================
// Fakes
// ============================================================================

struct FixedSearch {
    documents: Vec<Document>,
    queries: Mutex<Vec<(String, u8)>>,
}

impl FixedSearch {
    fn new(documents: Vec<Document>) -> Arc<Self> {
        Arc::new(Self {
            documents,
            queries: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl SearchClient for FixedSearch {
    async fn search(&self, query: &str, depth: u8) -> Result<Vec<Document>, SearchError> {
        self.queries.lock().unwrap().push((query.to_string(), depth));
        Ok(self.documents.clone())
    }
}

struct FailingSearch;

#[async_trait]
impl SearchClient for FailingSearch {
    async fn search(&self, _query: &str, _depth: u8) -> Result<Vec<Document>, SearchError> {
        Err(SearchError::Status {
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}

/// Yields the same triples for every document and counts its calls
struct FixedExtractor {
    triples: Vec<Triple>,
    calls: Mutex<usize>,
}

impl FixedExtractor {
    fn new(triples: Vec<Triple>) -> Arc<Self> {
        Arc::new(Self {
            triples,
            calls: Mutex::new(0),
        })
    }
}

#[async_trait]
impl Extractor for FixedExtractor {
    async fn extract(&self, _text: &str) -> Result<Vec<Triple>> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.triples.clone())
    }
}

/// Records each prompt and the tool names it was offered
#[derive(Default)]
struct RecordingAgent {
    prompts: Mutex<Vec<String>>,
    tools: Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl Agent for RecordingAgent {
    async fn answer(&self, prompt: &str, tools: &[Arc<dyn Tool>]) -> Result<String, AgentError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.tools
            .lock()
            .unwrap()
            .push(tools.iter().map(|t| t.name().to_string()).collect());
        Ok("drafted answer".to_string())
    }
}

struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.seen.lock().unwrap().push(messages.to_vec());
        Ok(self.replies.lock().unwrap().pop_front().unwrap_or_default())
    }
}

/// Wraps the in-memory store and records which operations ran, in order
#[derive(Default)]
struct RecordingStore {
    inner: MemoryTripleStore,
    calls: Mutex<Vec<&'static str>>,
}

#[async_trait]
impl TripleStore for RecordingStore {
    async fn upsert_triples(&self, triples: &[Triple]) -> research_kg::Result<usize> {
        self.calls.lock().unwrap().push("upsert");
        self.inner.upsert_triples(triples).await
    }

    async fn query_triples(&self, keyword: &str, limit: usize) -> research_kg::Result<Vec<Triple>> {
        self.calls.lock().unwrap().push("query");
        self.inner.query_triples(keyword, limit).await
    }

    async fn stats(&self) -> research_kg::Result<GraphStats> {
        self.calls.lock().unwrap().push("stats");
        self.inner.stats().await
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn eiffel_document() -> Document {
    Document {
        title: "Eiffel Tower".to_string(),
        url: "https://example.com/eiffel".to_string(),
        content: "The Eiffel Tower is a wrought-iron lattice tower in Paris.".to_string(),
    }
}

fn build_pipeline(
    search: Arc<dyn SearchClient>,
    extractor: Arc<dyn Extractor>,
    store: Arc<dyn TripleStore>,
    agent: Arc<dyn Agent>,
) -> Pipeline {
    Pipeline::new(
        CrawlStage::new(search, 2),
        ParseStage::new(store.clone(), extractor),
        DraftStage::new(store, agent, 5),
    )
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_stages_run_in_fixed_order() {
    let store: Arc<dyn TripleStore> = Arc::new(MemoryTripleStore::new());
    let pipeline = build_pipeline(
        FixedSearch::new(vec![]),
        Arc::new(NoopExtractor),
        store,
        Arc::new(RecordingAgent::default()),
    );

    assert_eq!(pipeline.stage_names(), vec!["crawl", "parse", "draft"]);
}

#[tokio::test]
async fn test_no_search_results_still_drafts_with_empty_context() {
    let search = FixedSearch::new(vec![]);
    let extractor = FixedExtractor::new(vec![Triple::new("a", "b", "c")]);
    let agent = Arc::new(RecordingAgent::default());
    let store: Arc<dyn TripleStore> = Arc::new(MemoryTripleStore::new());

    let pipeline = build_pipeline(search.clone(), extractor.clone(), store, agent.clone());
    let state = pipeline.invoke("Eiffel Tower").await.unwrap();

    assert!(state.documents().is_empty());
    assert_eq!(*extractor.calls.lock().unwrap(), 0);
    assert_eq!(state.answer(), Some("drafted answer"));

    let prompts = agent.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1, "drafter must be invoked even with no documents");
    assert_eq!(
        prompts[0],
        "Use the following context to answer the question:\n\nQuestion: Eiffel Tower"
    );
    assert_eq!(
        search.queries.lock().unwrap().as_slice(),
        &[("Eiffel Tower".to_string(), 2)]
    );
}

#[tokio::test]
async fn test_eiffel_tower_end_to_end() {
    let extractor = FixedExtractor::new(vec![Triple::new("Eiffel Tower", "locatedIn", "Paris")]);
    let agent = Arc::new(RecordingAgent::default());
    let store = Arc::new(MemoryTripleStore::new());

    let pipeline = build_pipeline(
        FixedSearch::new(vec![eiffel_document()]),
        extractor,
        store.clone(),
        agent.clone(),
    );
    let state = pipeline.invoke("Eiffel Tower").await.unwrap();

    assert_eq!(state.query(), "Eiffel Tower");
    assert_eq!(state.documents(), &[eiffel_document()]);

    let keyword_hits = store.query_triples("Eiffel", 5).await.unwrap();
    assert_eq!(
        research_kg::format_context(&keyword_hits),
        "Eiffel Tower locatedIn Paris"
    );

    let prompts = agent.prompts.lock().unwrap();
    assert!(prompts[0].contains("\nEiffel Tower locatedIn Paris\n"));
    assert!(prompts[0].ends_with("Question: Eiffel Tower"));
    assert_eq!(
        agent.tools.lock().unwrap().as_slice(),
        &[vec!["GraphQuery".to_string()]]
    );
}

#[tokio::test]
async fn test_no_matching_entities_gives_empty_context() {
    let extractor = FixedExtractor::new(vec![Triple::new("Louvre", "locatedIn", "Paris")]);
    let agent = Arc::new(RecordingAgent::default());
    let store: Arc<dyn TripleStore> = Arc::new(MemoryTripleStore::new());

    let pipeline = build_pipeline(
        FixedSearch::new(vec![eiffel_document()]),
        extractor,
        store,
        agent.clone(),
    );
    let state = pipeline.invoke("Eiffel Tower").await.unwrap();

    assert_eq!(state.answer(), Some("drafted answer"));
    assert_eq!(
        agent.prompts.lock().unwrap()[0],
        "Use the following context to answer the question:\n\nQuestion: Eiffel Tower"
    );
}

#[tokio::test]
async fn test_running_twice_does_not_duplicate_graph_facts() {
    let store = Arc::new(MemoryTripleStore::new());
    let pipeline = build_pipeline(
        FixedSearch::new(vec![eiffel_document()]),
        FixedExtractor::new(vec![Triple::new("Eiffel Tower", "locatedIn", "Paris")]),
        store.clone(),
        Arc::new(RecordingAgent::default()),
    );

    pipeline.invoke("Eiffel Tower").await.unwrap();
    pipeline.invoke("Eiffel Tower").await.unwrap();

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.entities, 2);
    assert_eq!(stats.relations, 1);
}

#[tokio::test]
async fn test_search_failure_stops_the_pipeline() {
    let agent = Arc::new(RecordingAgent::default());
    let pipeline = build_pipeline(
        Arc::new(FailingSearch),
        Arc::new(NoopExtractor),
        Arc::new(MemoryTripleStore::new()),
        agent.clone(),
    );

    let err = pipeline.invoke("Eiffel Tower").await.unwrap_err();

    assert!(format!("{:#}", err).contains("503"));
    assert!(agent.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_react_agent_uses_graph_query_tool() {
    let store = Arc::new(MemoryTripleStore::new());
    let model = Arc::new(ScriptedModel {
        replies: Mutex::new(VecDeque::from(vec![
            "Thought: check the graph\nAction: GraphQuery\nAction Input: \"paris\"".to_string(),
            "Thought: I now know the final answer\nFinal Answer: Paris is the capital of France."
                .to_string(),
        ])),
        seen: Mutex::new(Vec::new()),
    });

    let pipeline = build_pipeline(
        FixedSearch::new(vec![eiffel_document()]),
        FixedExtractor::new(vec![Triple::new("Paris", "capitalOf", "France")]),
        store,
        Arc::new(ReactAgent::new(model.clone())),
    );
    let state = pipeline.invoke("What is Paris?").await.unwrap();

    assert_eq!(state.answer(), Some("Paris is the capital of France."));

    let seen = model.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(
        seen[0][1].content,
        "Question: Use the following context to answer the question:\n\nQuestion: What is Paris?"
    );
    assert_eq!(seen[1][3].content, "Observation: Paris capitalOf France");
}

#[tokio::test]
async fn test_graph_stats_read_after_ingestion() {
    let store = Arc::new(RecordingStore::default());
    let pipeline = build_pipeline(
        FixedSearch::new(vec![eiffel_document()]),
        FixedExtractor::new(vec![Triple::new("Eiffel Tower", "locatedIn", "Paris")]),
        store.clone(),
        Arc::new(RecordingAgent::default()),
    );

    pipeline.invoke("Eiffel Tower").await.unwrap();

    assert_eq!(
        store.calls.lock().unwrap().as_slice(),
        &["upsert", "stats", "query"]
    );
}
