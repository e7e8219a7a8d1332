//! qmd-remote Core Library
//!
//! Client layer for remote inference endpoints used by qmd search.
//!
//! # Features
//! - Embeddings, completions and reranking over OpenAI-style HTTP endpoints
//! - Degrade-safe calls: unreachable services yield fallback values, never errors
//! - Query expansion into lexical, vector and HyDE search variants
//! - Cancellable sessions shared by remote and local backends
//! - Persisted endpoint config with read-merge-write semantics

pub mod config;
pub mod error;
pub mod llm;

pub use config::{Capability, ClientOptions, ConfigStore, EndpointConfig};
pub use error::{Error, QmdError, Result};
pub use llm::{
    default_remote, reset_default_remote, select_backend, set_default_remote, with_session,
    with_session_options, Backend, EmbedOptions, EmbeddingResult, ExpandOptions, GenerateOptions,
    GenerateResult, HealthStatus, Llm, LlmSession, ModelInfo, QueryType, Queryable, RemoteLlm,
    RerankDocument, RerankDocumentResult, RerankOptions, RerankResult, RerankSource,
    SessionOptions,
};

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "qmd";
