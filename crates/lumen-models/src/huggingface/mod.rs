//! Hugging Face Inference API pipelines.
//!
//! Every pipeline talks to `POST {base_url}/models/{repository}` with a bearer
//! token. Loading a pipeline only validates credentials and builds the HTTP
//! client; the first network round trip happens on the first inference.

pub mod classify;
#[cfg(feature = "image-generation")]
pub mod diffusion;
pub mod text;

use lumen_abstraction::ModelError;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

pub use classify::{HfClassifierLoader, HfClassifierPipeline};
#[cfg(feature = "image-generation")]
pub use diffusion::{HfImageLoader, HfImagePipeline, decode_image};
pub use text::{GenerationParameters, HfTextLoader, HfTextPipeline};

/// Environment variable consulted for the API token when configuration has none.
pub const TOKEN_ENV_VAR: &str = "HF_API_TOKEN";

/// Default inference endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";

/// Connection settings for the Hugging Face Inference API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HuggingFaceConfig {
    /// Bearer token. Loading any pipeline fails without one.
    #[serde(default)]
    pub api_token: Option<String>,

    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Optional request timeout. No timeout is applied when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

impl HuggingFaceConfig {
    /// Returns a copy pointing at another base URL (e.g. a mock server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_api_token(mut self, api_token: impl Into<String>) -> Self {
        self.api_token = Some(api_token.into());
        self
    }
}

#[derive(Deserialize)]
struct ApiError {
    error: String,
}

/// Authenticated HTTP client shared by the pipelines.
#[derive(Debug, Clone)]
pub struct HuggingFaceClient {
    client: Client,
    base_url: String,
    token: String,
}

impl HuggingFaceClient {
    /// Builds a client from configuration.
    ///
    /// # Errors
    /// Returns `ModelError::LoadFailure` if no token is configured or the HTTP
    /// client cannot be built.
    pub fn connect(config: &HuggingFaceConfig) -> Result<Self, ModelError> {
        let token = config
            .api_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                ModelError::LoadFailure(format!(
                    "no Hugging Face API token configured (set {TOKEN_ENV_VAR} or huggingface.api_token)"
                ))
            })?
            .to_string();

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ModelError::LoadFailure(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn endpoint(&self, repository: &str) -> String {
        format!("{}/models/{}", self.base_url, repository)
    }

    /// Posts a JSON body to a model endpoint.
    pub async fn post_json<T: Serialize + Sync + ?Sized>(
        &self,
        repository: &str,
        body: &T,
    ) -> Result<Response, ModelError> {
        let request = self.client.post(self.endpoint(repository)).json(body);
        self.send(request, repository).await
    }

    /// Posts raw bytes (e.g. an image file) to a model endpoint.
    pub async fn post_bytes(&self, repository: &str, bytes: Vec<u8>) -> Result<Response, ModelError> {
        let request = self
            .client
            .post(self.endpoint(repository))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes);
        self.send(request, repository).await
    }

    async fn send(&self, request: RequestBuilder, repository: &str) -> Result<Response, ModelError> {
        debug!(repository = %repository, "Calling Hugging Face inference API");

        let response = request.bearer_auth(&self.token).send().await.map_err(|e| {
            error!(error = %e, base_url = %self.base_url, "Failed to reach inference API");
            if e.is_connect() {
                ModelError::RequestError(format!("inference API not reachable at {}", self.base_url))
            } else if e.is_timeout() {
                ModelError::RequestError("inference API request timed out".to_string())
            } else {
                ModelError::RequestError(format!("Network error: {e}"))
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
        let detail = serde_json::from_str::<ApiError>(&body).map_or(body, |api| api.error);
        error!(status = %status, error = %detail, "Inference API returned error status");

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ModelError::RequestError(format!(
                "authentication failed ({status}); check your API token"
            )),
            StatusCode::NOT_FOUND => {
                ModelError::RequestError(format!("model '{repository}' not found"))
            }
            StatusCode::SERVICE_UNAVAILABLE => ModelError::RequestError(format!(
                "model '{repository}' is currently loading, try again shortly: {detail}"
            )),
            _ => ModelError::RequestError(format!("API error ({status}): {detail}")),
        })
    }
}
