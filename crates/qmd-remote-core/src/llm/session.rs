//! Cancellable single-use inference sessions
//!
//! A session wraps any [`Llm`] backend. Once released, cancelled, or past its
//! deadline, every operation returns the same fallback the backend would return
//! on total failure. In-flight calls are abandoned when the session is cancelled.

use super::query_expansion::fallback_queries;
use super::rerank::fallback_ranking;
use super::{
    EmbedOptions, EmbeddingResult, ExpandOptions, Llm, Queryable, RerankDocument, RerankOptions,
    RerankResult, RerankSource,
};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Session options
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Session becomes invalid once this much time has passed
    pub max_duration: Option<Duration>,
    /// Label used in logs
    pub name: Option<String>,
}

/// Handle to a session; clones share the same state
#[derive(Clone)]
pub struct LlmSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    llm: Arc<dyn Llm>,
    token: CancellationToken,
    released: AtomicBool,
    deadline: Option<Instant>,
    name: String,
}

impl LlmSession {
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self::with_options(llm, SessionOptions::default())
    }

    pub fn with_options(llm: Arc<dyn Llm>, options: SessionOptions) -> Self {
        let name = options.name.unwrap_or_else(|| "session".to_string());
        tracing::debug!("Opening LLM session {}", name);
        Self {
            inner: Arc::new(SessionInner {
                llm,
                token: CancellationToken::new(),
                released: AtomicBool::new(false),
                deadline: options.max_duration.map(|d| Instant::now() + d),
                name,
            }),
        }
    }

    /// True until the session is released, cancelled, or expired
    pub fn is_valid(&self) -> bool {
        if self.inner.released.load(Ordering::Acquire) || self.inner.token.is_cancelled() {
            return false;
        }
        if let Some(deadline) = self.inner.deadline {
            if Instant::now() >= deadline {
                tracing::debug!("LLM session {} exceeded its max duration", self.inner.name);
                self.inner.token.cancel();
                return false;
            }
        }
        true
    }

    /// Token that fires when the session ends, for cooperative cancellation
    pub fn cancellation_token(&self) -> CancellationToken {
        self.inner.token.clone()
    }

    /// Completes when the session is cancelled or its deadline passes
    pub async fn cancelled(&self) {
        match self.inner.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.inner.token.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => self.inner.token.cancel(),
                }
            }
            None => self.inner.token.cancelled().await,
        }
    }

    /// Invalidate the session and cancel in-flight work. Idempotent.
    pub fn release(&self) {
        if !self.inner.released.swap(true, Ordering::AcqRel) {
            tracing::debug!("Releasing LLM session {}", self.inner.name);
        }
        self.inner.token.cancel();
    }

    async fn guarded<T, F>(&self, work: F, fallback: impl FnOnce() -> T) -> T
    where
        F: Future<Output = T>,
    {
        if !self.is_valid() {
            return fallback();
        }

        tokio::select! {
            biased;
            _ = self.cancelled() => {
                tracing::debug!("LLM session {} cancelled mid-call", self.inner.name);
                fallback()
            }
            value = work => value,
        }
    }

    pub async fn embed(&self, text: &str, options: &EmbedOptions) -> Option<EmbeddingResult> {
        self.guarded(self.inner.llm.embed(text, options), || None)
            .await
    }

    pub async fn embed_batch(&self, texts: &[String]) -> Vec<Option<EmbeddingResult>> {
        self.guarded(self.inner.llm.embed_batch(texts), || vec![None; texts.len()])
            .await
    }

    pub async fn expand_query(&self, query: &str, options: &ExpandOptions) -> Vec<Queryable> {
        self.guarded(self.inner.llm.expand_query(query, options), || {
            fallback_queries(query, options.include_lexical)
        })
        .await
    }

    pub async fn rerank(
        &self,
        query: &str,
        documents: &[RerankDocument],
        options: &RerankOptions,
    ) -> RerankResult {
        self.guarded(self.inner.llm.rerank(query, documents, options), || {
            fallback_ranking(documents, RerankSource::Cancelled)
        })
        .await
    }
}

struct ReleaseOnDrop(LlmSession);

impl Drop for ReleaseOnDrop {
    fn drop(&mut self) {
        self.0.release();
    }
}

/// Run `work` with a fresh session, releasing it however `work` ends
pub async fn with_session<F, Fut, T>(llm: Arc<dyn Llm>, work: F) -> T
where
    F: FnOnce(LlmSession) -> Fut,
    Fut: Future<Output = T>,
{
    with_session_options(llm, SessionOptions::default(), work).await
}

/// [`with_session`] with explicit options
pub async fn with_session_options<F, Fut, T>(
    llm: Arc<dyn Llm>,
    options: SessionOptions,
    work: F,
) -> T
where
    F: FnOnce(LlmSession) -> Fut,
    Fut: Future<Output = T>,
{
    let session = LlmSession::with_options(llm, options);
    let _release = ReleaseOnDrop(session.clone());
    work(session).await
}
