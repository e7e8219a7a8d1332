//! LLM trait definitions

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default embedding model requested from remote servers
pub const DEFAULT_EMBED_MODEL: &str = "embeddinggemma";

/// Default rerank model requested from remote servers
pub const DEFAULT_RERANK_MODEL: &str = "qwen3-reranker";

/// Inference backend used by search
///
/// Implemented by the remote HTTP client and by local inference engines, so callers
/// can switch backends without knowing which one they hold. Every operation is
/// degrade-safe: failures surface as absent or fallback values, never as errors.
#[async_trait]
pub trait Llm: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str, options: &EmbedOptions) -> Option<EmbeddingResult>;

    /// Embed many texts; `result[i]` always corresponds to `texts[i]`
    async fn embed_batch(&self, texts: &[String]) -> Vec<Option<EmbeddingResult>>;

    /// Text completion
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Option<GenerateResult>;

    /// Rerank documents for a query. Always returns one entry per document.
    async fn rerank(
        &self,
        query: &str,
        documents: &[RerankDocument],
        options: &RerankOptions,
    ) -> RerankResult;

    /// Whether `generate` can be attempted at all
    fn can_generate(&self) -> bool;

    /// Derive lex/vec/hyde search queries from a user query
    async fn expand_query(&self, query: &str, options: &ExpandOptions) -> Vec<Queryable> {
        super::query_expansion::expand_query(self, query, options).await
    }

    /// Check whether a model is available to this backend
    async fn model_exists(&self, name: &str) -> ModelInfo;

    /// Release held resources
    async fn dispose(&self);
}

/// Embedding options
#[derive(Debug, Clone, Default)]
pub struct EmbedOptions {
    /// Override the requested model
    pub model: Option<String>,
}

/// Embedding result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingResult {
    pub embedding: Vec<f32>,
    pub model: String,
}

/// Generation options
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            max_tokens: 150,
            temperature: 0.0,
        }
    }
}

/// Generation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResult {
    pub text: String,
    pub model: String,
}

/// Search query variant kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    /// Literal keyword search term
    Lex,
    /// Phrasing for semantic search
    Vec,
    /// Hypothetical document passage
    Hyde,
}

impl QueryType {
    /// Parse a protocol tag (`lex`, `vec`, `hyde`), ignoring case
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "lex" => Some(QueryType::Lex),
            "vec" => Some(QueryType::Vec),
            "hyde" => Some(QueryType::Hyde),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Lex => "lex",
            QueryType::Vec => "vec",
            QueryType::Hyde => "hyde",
        }
    }
}

/// A typed search query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Queryable {
    #[serde(rename = "type")]
    pub kind: QueryType,
    pub text: String,
}

impl Queryable {
    pub fn new(kind: QueryType, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn lex(text: impl Into<String>) -> Self {
        Self::new(QueryType::Lex, text)
    }

    pub fn vec(text: impl Into<String>) -> Self {
        Self::new(QueryType::Vec, text)
    }

    pub fn hyde(text: impl Into<String>) -> Self {
        Self::new(QueryType::Hyde, text)
    }
}

/// Query expansion options
#[derive(Debug, Clone)]
pub struct ExpandOptions {
    /// Auxiliary hint about the collection or user intent
    pub context: Option<String>,
    /// Emit `lex` variants
    pub include_lexical: bool,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            context: None,
            include_lexical: true,
        }
    }
}

/// Document for reranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankDocument {
    pub file: String,
    pub text: String,
}

impl RerankDocument {
    pub fn new(file: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            text: text.into(),
        }
    }
}

/// A reranked document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankDocumentResult {
    pub file: String,
    pub score: f64,
    /// Position of the document in the caller's input
    pub index: usize,
}

/// Where a rerank ordering came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RerankSource {
    /// Scored by the rerank model
    Model,
    /// No rerank endpoint; input order with placeholder scores
    NotConfigured,
    /// Rerank call failed; input order with placeholder scores
    Failed,
    /// Session released or cancelled before the call completed
    Cancelled,
}

impl RerankSource {
    pub fn is_fallback(&self) -> bool {
        !matches!(self, RerankSource::Model)
    }
}

/// Reranking result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankResult {
    pub results: Vec<RerankDocumentResult>,
    pub model: String,
    pub source: RerankSource,
}

/// Rerank options
#[derive(Debug, Clone, Default)]
pub struct RerankOptions {
    /// Override the requested model
    pub model: Option<String>,
}

/// Model availability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}
