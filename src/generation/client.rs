//! Generation service client
//!
//! Abstracts the two calls the session makes against the upstream
//! generation service: full mind-map generation and prompt refinement.
//! Neither call is idempotent or cached - the upstream generator is
//! non-deterministic, so identical input may legitimately yield a
//! different tree. Calls are never retried here; retry policy belongs to
//! the user pressing the key again.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::GenerationError;

/// Result type for generation calls
pub type GenerationResult<T> = std::result::Result<T, GenerationError>;

/// Boundary trait for the generation service
///
/// The session controller is written against this trait; tests substitute
/// a stub, production uses [`HttpGenerationClient`].
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generate a full mind map for `prompt`.
    ///
    /// Returns the raw `root` node value of the service response; shape
    /// validation is the tree model's job, not the transport's.
    async fn generate(&self, prompt: &str) -> GenerationResult<Value>;

    /// Turn an ancestor context path (e.g. `"Volcanoes > Types"`) into a
    /// new generation prompt. The response is trimmed of surrounding
    /// whitespace before use.
    async fn refine_prompt(&self, context: &str) -> GenerationResult<String>;
}

/// HTTP implementation of [`GenerationClient`]
///
/// POSTs JSON to the configured generation service. The shared
/// `reqwest::Client` carries the configured request timeout, which bounds
/// every suspension point in the session.
pub struct HttpGenerationClient {
    http: reqwest::Client,
    generate_url: String,
    refine_url: String,
}

impl HttpGenerationClient {
    /// Build a client from configuration
    pub fn new(config: &Config) -> GenerationResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let base = config.service_base_url.trim_end_matches('/');

        Ok(Self {
            http,
            generate_url: format!("{base}{}", config.generate_path),
            refine_url: format!("{base}{}", config.refine_path),
        })
    }

    async fn post_json(
        &self,
        url: &str,
        body: &Value,
    ) -> GenerationResult<reqwest::Response> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Service(format!(
                "{url} returned {status}: {body}"
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> GenerationResult<Value> {
        debug!("requesting generation");

        let body = serde_json::json!({ "message": prompt });
        let response = self.post_json(&self.generate_url, &body).await?;

        let mut payload: Value = response
            .json()
            .await
            .map_err(|e| GenerationError::Service(format!("unparsable response body: {e}")))?;

        payload
            .get_mut("root")
            .map(Value::take)
            .ok_or_else(|| GenerationError::Service("response has no `root` member".to_string()))
    }

    #[instrument(skip(self, context), fields(context_len = context.len()))]
    async fn refine_prompt(&self, context: &str) -> GenerationResult<String> {
        debug!("requesting prompt refinement");

        let body = serde_json::json!({ "prompt": context });
        let response = self.post_json(&self.refine_url, &body).await?;

        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::Service(format!("unreadable response body: {e}")))?;

        Ok(text.trim().to_string())
    }
}
