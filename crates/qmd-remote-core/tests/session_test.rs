//! Integration tests for cancellable LLM sessions

use async_trait::async_trait;
use qmd_remote_core::{
    with_session, with_session_options, EmbedOptions, EmbeddingResult, EndpointConfig,
    ExpandOptions, GenerateOptions, GenerateResult, Llm, LlmSession, ModelInfo, Queryable,
    RemoteLlm, RerankDocument, RerankDocumentResult, RerankOptions, RerankResult, RerankSource,
    SessionOptions,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Backend that always succeeds and counts calls
#[derive(Default)]
struct StubLlm {
    calls: AtomicUsize,
}

impl StubLlm {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Llm for StubLlm {
    async fn embed(&self, _text: &str, _options: &EmbedOptions) -> Option<EmbeddingResult> {
        self.hit();
        Some(EmbeddingResult {
            embedding: vec![1.0],
            model: "stub".to_string(),
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Vec<Option<EmbeddingResult>> {
        self.hit();
        texts
            .iter()
            .map(|_| {
                Some(EmbeddingResult {
                    embedding: vec![1.0],
                    model: "stub".to_string(),
                })
            })
            .collect()
    }

    async fn generate(&self, _prompt: &str, _options: &GenerateOptions) -> Option<GenerateResult> {
        self.hit();
        Some(GenerateResult {
            text: "hyde: passage\nvec: phrasing".to_string(),
            model: "stub".to_string(),
        })
    }

    async fn rerank(
        &self,
        _query: &str,
        documents: &[RerankDocument],
        _options: &RerankOptions,
    ) -> RerankResult {
        self.hit();
        RerankResult {
            results: documents
                .iter()
                .enumerate()
                .rev()
                .map(|(index, doc)| RerankDocumentResult {
                    file: doc.file.clone(),
                    score: 0.5,
                    index,
                })
                .collect(),
            model: "stub".to_string(),
            source: RerankSource::Model,
        }
    }

    fn can_generate(&self) -> bool {
        true
    }

    async fn model_exists(&self, name: &str) -> ModelInfo {
        ModelInfo {
            name: name.to_string(),
            exists: true,
            path: None,
        }
    }

    async fn dispose(&self) {}
}

fn documents() -> Vec<RerankDocument> {
    vec![
        RerankDocument::new("a.md", "alpha"),
        RerankDocument::new("b.md", "beta"),
    ]
}

#[tokio::test]
async fn test_valid_session_delegates() {
    let stub = Arc::new(StubLlm::default());
    let session = LlmSession::new(stub.clone());

    assert!(session.is_valid());
    assert!(session.embed("x", &EmbedOptions::default()).await.is_some());
    assert_eq!(
        session
            .expand_query("x", &ExpandOptions::default())
            .await,
        vec![Queryable::hyde("passage"), Queryable::vec("phrasing")]
    );
    let reranked = session
        .rerank("q", &documents(), &RerankOptions::default())
        .await;
    assert_eq!(reranked.source, RerankSource::Model);
    assert_eq!(stub.calls(), 3);
}

#[tokio::test]
async fn test_released_session_returns_fallbacks() {
    let stub = Arc::new(StubLlm::default());
    let session = LlmSession::new(stub.clone());
    session.release();
    session.release();

    assert!(!session.is_valid());
    assert!(session.cancellation_token().is_cancelled());

    assert!(session.embed("x", &EmbedOptions::default()).await.is_none());
    assert_eq!(
        session
            .embed_batch(&["a".to_string(), "b".to_string()])
            .await,
        vec![None, None]
    );
    assert_eq!(
        session
            .expand_query("x", &ExpandOptions::default())
            .await,
        vec![Queryable::lex("x"), Queryable::vec("x")]
    );

    let reranked = session
        .rerank("q", &documents(), &RerankOptions::default())
        .await;
    assert_eq!(reranked.source, RerankSource::Cancelled);
    let scores: Vec<f64> = reranked.results.iter().map(|r| r.score).collect();
    assert_eq!(reranked.results[0].index, 0);
    assert!((scores[0] - 1.0).abs() < 1e-9);
    assert!((scores[1] - 0.9).abs() < 1e-9);

    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_cancelled_token_invalidates_session() {
    let session = LlmSession::new(Arc::new(StubLlm::default()));
    session.cancellation_token().cancel();
    assert!(!session.is_valid());
    session.cancelled().await;
}

#[tokio::test(start_paused = true)]
async fn test_session_expires_after_max_duration() {
    let session = LlmSession::with_options(
        Arc::new(StubLlm::default()),
        SessionOptions {
            max_duration: Some(Duration::from_secs(5)),
            name: Some("expiring".to_string()),
        },
    );
    assert!(session.is_valid());

    tokio::time::advance(Duration::from_secs(6)).await;

    assert!(!session.is_valid());
    assert!(session.cancellation_token().is_cancelled());
    assert!(session.embed("x", &EmbedOptions::default()).await.is_none());
}

#[tokio::test]
async fn test_release_interrupts_in_flight_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/rerank"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "results": [{"index": 1, "relevance_score": 0.9}],
                    "model": "qwen3-reranker"
                }))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let remote = RemoteLlm::new(EndpointConfig {
        rerank_url: Some(server.uri()),
        ..Default::default()
    })
    .unwrap();
    let session = LlmSession::new(Arc::new(remote));
    let docs = documents();
    let options = RerankOptions::default();

    let (result, _) = tokio::join!(
        session.rerank("q", &docs, &options),
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            session.release();
        }
    );

    assert_eq!(result.source, RerankSource::Cancelled);
    assert_eq!(result.results.len(), 2);
}

#[tokio::test]
async fn test_with_session_releases_after_success() {
    let stub: Arc<dyn Llm> = Arc::new(StubLlm::default());
    let (session, value) = with_session(stub, |session| async move {
        assert!(session.is_valid());
        let embedded = session.embed("x", &EmbedOptions::default()).await.is_some();
        (session, embedded)
    })
    .await;

    assert!(value);
    assert!(!session.is_valid());
}

#[tokio::test]
async fn test_with_session_releases_after_error() {
    let stub: Arc<dyn Llm> = Arc::new(StubLlm::default());
    let captured: Arc<Mutex<Option<LlmSession>>> = Arc::new(Mutex::new(None));
    let slot = captured.clone();

    let result: Result<(), String> = with_session(stub, |session| async move {
        *slot.lock().unwrap() = Some(session);
        Err("work failed".to_string())
    })
    .await;

    assert!(result.is_err());
    let session = captured.lock().unwrap().take().unwrap();
    assert!(!session.is_valid());
}

#[tokio::test]
async fn test_with_session_releases_after_panic() {
    let captured: Arc<Mutex<Option<LlmSession>>> = Arc::new(Mutex::new(None));
    let slot = captured.clone();

    let handle = tokio::spawn(async move {
        let stub: Arc<dyn Llm> = Arc::new(StubLlm::default());
        with_session_options(
            stub,
            SessionOptions {
                max_duration: None,
                name: Some("panicking".to_string()),
            },
            |session| async move {
                *slot.lock().unwrap() = Some(session);
                panic!("work panicked");
            },
        )
        .await
    });

    assert!(handle.await.is_err());
    let session = captured.lock().unwrap().take().unwrap();
    assert!(!session.is_valid());
}
