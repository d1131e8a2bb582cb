//! Image classification pipeline. Input text is the path of the image to upload.

use async_trait::async_trait;
use lumen_abstraction::{ModelError, Pipeline, PipelineLoader};

use super::{HuggingFaceClient, HuggingFaceConfig};
use crate::backends::Classification;

/// Loads a [`HfClassifierPipeline`].
#[derive(Debug, Clone)]
pub struct HfClassifierLoader {
    config: HuggingFaceConfig,
    repository: String,
}

impl HfClassifierLoader {
    #[must_use]
    pub fn new(config: HuggingFaceConfig, repository: impl Into<String>) -> Self {
        Self { config, repository: repository.into() }
    }
}

#[async_trait]
impl PipelineLoader<Vec<Classification>> for HfClassifierLoader {
    async fn load(&self) -> Result<Box<dyn Pipeline<Vec<Classification>>>, ModelError> {
        let client = HuggingFaceClient::connect(&self.config)?;
        Ok(Box::new(HfClassifierPipeline { client, repository: self.repository.clone() }))
    }
}

#[derive(Debug)]
pub struct HfClassifierPipeline {
    client: HuggingFaceClient,
    repository: String,
}

#[async_trait]
impl Pipeline<Vec<Classification>> for HfClassifierPipeline {
    async fn infer(&self, input: &str) -> Result<Vec<Classification>, ModelError> {
        let bytes = tokio::fs::read(input)
            .await
            .map_err(|e| ModelError::InferenceFailure(format!("cannot open image '{input}': {e}")))?;

        let response = self.client.post_bytes(&self.repository, bytes).await?;
        response
            .json()
            .await
            .map_err(|e| ModelError::RequestError(format!("invalid response: {e}")))
    }
}
