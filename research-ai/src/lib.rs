pub mod agent;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod llm;
pub mod pipeline;

pub use agent::{Agent, AgentConfig, GraphQueryTool, ReactAgent, Tool};
pub use config::{Args, Config};
pub use crawler::{Document, SearchClient, SearchError, TavilyClient};
pub use extract::{ingest_documents, Extractor, IngestStats, NoopExtractor};
pub use llm::{ChatMessage, ChatModel, OllamaChat};
pub use pipeline::{
    build_prompt, CrawlStage, DraftStage, ParseStage, Pipeline, PipelineState, StateUpdate,
    ANSWER_HEADER,
};
