//! Text generation pipeline.

use async_trait::async_trait;
use lumen_abstraction::{ModelError, Pipeline, PipelineLoader};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{HuggingFaceClient, HuggingFaceConfig};

/// Sampling parameters sent with every text generation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationParameters {
    /// Maximum total length, prompt included.
    pub max_length: u32,
    pub no_repeat_ngram_size: u32,
    pub do_sample: bool,
    pub top_k: u32,
    pub top_p: f32,
    pub temperature: f32,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            max_length: 1000,
            no_repeat_ngram_size: 3,
            do_sample: true,
            top_k: 100,
            top_p: 0.7,
            temperature: 0.8,
        }
    }
}

#[derive(Serialize)]
struct TextGenerationRequest<'a> {
    inputs: &'a str,
    parameters: &'a GenerationParameters,
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: String,
}

/// Loads a [`HfTextPipeline`].
#[derive(Debug, Clone)]
pub struct HfTextLoader {
    config: HuggingFaceConfig,
    repository: String,
    parameters: GenerationParameters,
}

impl HfTextLoader {
    #[must_use]
    pub fn new(config: HuggingFaceConfig, repository: impl Into<String>, parameters: GenerationParameters) -> Self {
        Self { config, repository: repository.into(), parameters }
    }
}

#[async_trait]
impl PipelineLoader<String> for HfTextLoader {
    async fn load(&self) -> Result<Box<dyn Pipeline<String>>, ModelError> {
        let client = HuggingFaceClient::connect(&self.config)?;
        Ok(Box::new(HfTextPipeline {
            client,
            repository: self.repository.clone(),
            parameters: self.parameters.clone(),
        }))
    }
}

/// Returns the raw generated text, which usually starts with the prompt.
#[derive(Debug)]
pub struct HfTextPipeline {
    client: HuggingFaceClient,
    repository: String,
    parameters: GenerationParameters,
}

#[async_trait]
impl Pipeline<String> for HfTextPipeline {
    async fn infer(&self, input: &str) -> Result<String, ModelError> {
        let body = TextGenerationRequest { inputs: input, parameters: &self.parameters };
        let response = self.client.post_json(&self.repository, &body).await?;

        let generated: Vec<GeneratedText> = response
            .json()
            .await
            .map_err(|e| ModelError::RequestError(format!("invalid response: {e}")))?;

        debug!(candidates = generated.len(), "Text generation response received");

        generated
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .ok_or_else(|| ModelError::InferenceFailure("empty response".to_string()))
    }
}
