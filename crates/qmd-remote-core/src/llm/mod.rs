//! LLM integration
//!
//! Provides the [`Llm`] backend trait and its remote HTTP implementation:
//! - Embedding and batch embedding with index-preserving scatter
//! - Text generation
//! - Reranking with fallback ordering
//! - Query expansion into lex/vec/hyde variants
//! - Cancellable sessions and health checks

mod backend;
mod health;
pub mod query_expansion;
mod remote;
pub mod rerank;
mod session;
mod traits;

pub use backend::{default_remote, reset_default_remote, select_backend, set_default_remote, Backend};
pub use health::HealthStatus;
pub use remote::RemoteLlm;
pub use session::{with_session, with_session_options, LlmSession, SessionOptions};
pub use traits::*;
