//! HTTP client for remote inference servers
//!
//! Talks to OpenAI-style endpoints:
//! - `POST {embedUrl}/v1/embeddings`
//! - `POST {generateUrl}/v1/completions`
//! - `POST {rerankUrl}/v1/rerank`
//!
//! The `try_*` methods report failures as [`QmdError`]. The [`Llm`] implementation
//! converts every failure into the documented fallback value.

use super::rerank::{fallback_ranking, normalize_scores, RawRerankScore};
use super::{
    EmbedOptions, EmbeddingResult, GenerateOptions, GenerateResult, Llm, ModelInfo,
    RerankDocument, RerankOptions, RerankResult, RerankSource, DEFAULT_EMBED_MODEL,
    DEFAULT_RERANK_MODEL,
};
use crate::config::{Capability, ClientOptions, ConfigStore, EndpointConfig};
use crate::error::{QmdError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Remote inference client
pub struct RemoteLlm {
    pub(super) http_client: reqwest::Client,
    config: EndpointConfig,
}

#[derive(Serialize)]
#[serde(untagged)]
enum EmbedInput<'a> {
    Single(&'a str),
    Batch(&'a [String]),
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    input: EmbedInput<'a>,
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: Option<usize>,
}

impl RemoteLlm {
    /// Create client for exactly the given endpoints
    pub fn new(config: EndpointConfig) -> Result<Self> {
        Self::with_options(config, ClientOptions::default())
    }

    /// Create client with custom HTTP options
    pub fn with_options(config: EndpointConfig, options: ClientOptions) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()?;

        Ok(Self {
            http_client,
            config: config.normalized(),
        })
    }

    /// Create client from explicit settings, falling back to the environment and
    /// then to the persisted config for anything left unset
    pub fn from_store(explicit: EndpointConfig, store: &ConfigStore) -> Result<Self> {
        let config = explicit
            .normalized()
            .overlay(&EndpointConfig::from_env())
            .overlay(&store.load());
        Self::new(config)
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    fn endpoint(&self, capability: Capability) -> Result<&str> {
        self.config
            .url(capability)
            .ok_or(QmdError::NotConfigured(capability))
    }

    async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        tracing::debug!("POST {}", url);
        let response = self.http_client.post(url).json(body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(QmdError::ExternalError(format!(
                "{} returned HTTP {}: {}",
                url, status, body
            )));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| QmdError::Protocol(format!("Unexpected response from {}: {}", url, e)))
    }

    /// Embed one text, reporting why it failed
    pub async fn try_embed(&self, text: &str, options: &EmbedOptions) -> Result<EmbeddingResult> {
        let base = self.endpoint(Capability::Embed)?;
        let model = options.model.as_deref().unwrap_or(DEFAULT_EMBED_MODEL);
        let request = EmbedRequest {
            input: EmbedInput::Single(text),
            model,
        };

        let response: EmbedResponse = self
            .post_json(&format!("{}/v1/embeddings", base), &request)
            .await?;

        let response_model = response.model.unwrap_or_else(|| model.to_string());
        response
            .data
            .into_iter()
            .next()
            .map(|data| EmbeddingResult {
                embedding: data.embedding,
                model: response_model,
            })
            .ok_or_else(|| QmdError::Protocol("No embedding data in response".to_string()))
    }

    async fn request_embed_batch(&self, base: &str, texts: &[String]) -> Result<EmbedResponse> {
        let request = EmbedRequest {
            input: EmbedInput::Batch(texts),
            model: DEFAULT_EMBED_MODEL,
        };
        self.post_json(&format!("{}/v1/embeddings", base), &request)
            .await
    }

    /// Generate a completion, reporting why it failed
    pub async fn try_generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<GenerateResult> {
        let base = self.endpoint(Capability::Generate)?;

        #[derive(Serialize)]
        struct CompletionRequest<'a> {
            prompt: &'a str,
            max_tokens: u32,
            temperature: f32,
            #[serde(skip_serializing_if = "Option::is_none")]
            model: Option<&'a str>,
        }

        #[derive(Deserialize)]
        struct CompletionResponse {
            choices: Vec<CompletionChoice>,
            #[serde(default)]
            model: Option<String>,
        }

        #[derive(Deserialize)]
        struct CompletionChoice {
            text: String,
        }

        let request = CompletionRequest {
            prompt,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            model: self.config.generate_model.as_deref(),
        };

        let response: CompletionResponse = self
            .post_json(&format!("{}/v1/completions", base), &request)
            .await?;

        let model = response
            .model
            .or_else(|| self.config.generate_model.clone())
            .unwrap_or_default();

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| GenerateResult {
                text: choice.text,
                model,
            })
            .ok_or_else(|| QmdError::Protocol("No choices in completion response".to_string()))
    }

    /// Rerank documents, reporting why it failed
    pub async fn try_rerank(
        &self,
        query: &str,
        documents: &[RerankDocument],
        options: &RerankOptions,
    ) -> Result<RerankResult> {
        let base = self.endpoint(Capability::Rerank)?;
        let model = options.model.as_deref().unwrap_or(DEFAULT_RERANK_MODEL);

        #[derive(Serialize)]
        struct RerankRequest<'a> {
            query: &'a str,
            documents: Vec<&'a str>,
            model: &'a str,
        }

        #[derive(Deserialize)]
        struct RerankResponse {
            results: Vec<RerankItem>,
            #[serde(default)]
            model: Option<String>,
        }

        #[derive(Deserialize)]
        struct RerankItem {
            index: usize,
            relevance_score: f64,
        }

        if documents.is_empty() {
            return Ok(normalize_scores(documents, &[], model));
        }

        let request = RerankRequest {
            query,
            documents: documents.iter().map(|d| d.text.as_str()).collect(),
            model,
        };

        let response: RerankResponse = self
            .post_json(&format!("{}/v1/rerank", base), &request)
            .await?;

        let scores: Vec<RawRerankScore> = response
            .results
            .iter()
            .map(|item| RawRerankScore {
                index: item.index,
                score: item.relevance_score,
            })
            .collect();

        Ok(normalize_scores(
            documents,
            &scores,
            response.model.unwrap_or_else(|| model.to_string()),
        ))
    }
}

/// Place batch items at the position their `index` names
fn scatter_embeddings(
    response: EmbedResponse,
    len: usize,
    default_model: &str,
) -> Vec<Option<EmbeddingResult>> {
    let model = response
        .model
        .unwrap_or_else(|| default_model.to_string());
    let mut results = vec![None; len];

    for (position, data) in response.data.into_iter().enumerate() {
        let index = data.index.unwrap_or(position);
        match results.get_mut(index) {
            Some(slot) => {
                *slot = Some(EmbeddingResult {
                    embedding: data.embedding,
                    model: model.clone(),
                });
            }
            None => tracing::warn!(
                "Embedding response index {} out of range for {} inputs, skipping",
                index,
                len
            ),
        }
    }

    results
}

#[async_trait]
impl Llm for RemoteLlm {
    async fn embed(&self, text: &str, options: &EmbedOptions) -> Option<EmbeddingResult> {
        match self.try_embed(text, options).await {
            Ok(result) => Some(result),
            Err(QmdError::NotConfigured(_)) => None,
            Err(e) => {
                tracing::warn!("Embedding failed: {}", e);
                None
            }
        }
    }

    async fn embed_batch(&self, texts: &[String]) -> Vec<Option<EmbeddingResult>> {
        if texts.is_empty() {
            return Vec::new();
        }

        let Some(base) = self.config.url(Capability::Embed) else {
            return vec![None; texts.len()];
        };

        match self.request_embed_batch(base, texts).await {
            Ok(response) => scatter_embeddings(response, texts.len(), DEFAULT_EMBED_MODEL),
            Err(e) => {
                // One text at a time so a struggling server is not hit with a burst
                tracing::warn!(
                    "Batch embedding failed ({}), embedding {} texts sequentially",
                    e,
                    texts.len()
                );
                let options = EmbedOptions::default();
                let mut results = Vec::with_capacity(texts.len());
                for text in texts {
                    results.push(self.embed(text, &options).await);
                }
                results
            }
        }
    }

    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Option<GenerateResult> {
        match self.try_generate(prompt, options).await {
            Ok(result) => Some(result),
            Err(QmdError::NotConfigured(_)) => None,
            Err(e) => {
                tracing::warn!("Generation failed: {}", e);
                None
            }
        }
    }

    async fn rerank(
        &self,
        query: &str,
        documents: &[RerankDocument],
        options: &RerankOptions,
    ) -> RerankResult {
        match self.try_rerank(query, documents, options).await {
            Ok(result) => result,
            Err(QmdError::NotConfigured(_)) => {
                fallback_ranking(documents, RerankSource::NotConfigured)
            }
            Err(e) => {
                tracing::warn!("Rerank failed, keeping input order: {}", e);
                fallback_ranking(documents, RerankSource::Failed)
            }
        }
    }

    fn can_generate(&self) -> bool {
        self.config.has(Capability::Generate)
    }

    async fn model_exists(&self, name: &str) -> ModelInfo {
        // Model resolution is left to the server
        ModelInfo {
            name: name.to_string(),
            exists: true,
            path: None,
        }
    }

    async fn dispose(&self) {}
}
