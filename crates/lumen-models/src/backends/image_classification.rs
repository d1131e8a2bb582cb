//! Image classification backend (ViT). Input is a filesystem path.

use async_trait::async_trait;
use lumen_abstraction::{
    ModelBackend, ModelCategory, ModelDescriptor, ModelError, ModelOutput, PipelineLoader,
};
use serde::{Deserialize, Serialize};

use super::BackendState;
use crate::cache::CacheStats;

/// Upstream repository of the default classifier.
pub const REPOSITORY: &str = "google/vit-base-patch16-224";

/// Number of labels reported per image.
pub const TOP_K: usize = 5;

const READY: &str = "Model loaded successfully";

/// One predicted label with its probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub score: f32,
}

/// Renders the best [`TOP_K`] predictions as `label: 0.1234` lines.
#[must_use]
pub fn format_top_labels(mut predictions: Vec<Classification>) -> String {
    predictions.sort_by(|a, b| b.score.total_cmp(&a.score));
    predictions
        .iter()
        .take(TOP_K)
        .map(|p| format!("{}: {:.4}", p.label, p.score))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Image classification backend wrapping a label-producing pipeline.
pub struct ImageClassificationBackend {
    state: BackendState<Vec<Classification>>,
}

impl ImageClassificationBackend {
    #[must_use]
    pub fn new(loader: Box<dyn PipelineLoader<Vec<Classification>>>) -> Self {
        Self { state: BackendState::new(Self::default_descriptor(), loader) }
    }

    #[must_use]
    pub fn default_descriptor() -> ModelDescriptor {
        ModelDescriptor::new(
            "ViT Base Patch16-224",
            ModelCategory::ImageClassification,
            "Classifies images into various categories",
            REPOSITORY,
        )
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.state.cache_stats()
    }
}

#[async_trait]
impl ModelBackend for ImageClassificationBackend {
    fn descriptor(&self) -> &ModelDescriptor {
        self.state.descriptor()
    }

    fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }

    async fn load(&mut self) -> String {
        self.state.load(READY).await
    }

    async fn process(&mut self, input: &str) -> ModelOutput {
        self.state
            .process(
                input,
                |_, predictions| {
                    if predictions.is_empty() {
                        Err(ModelError::InferenceFailure("no labels returned".to_string()))
                    } else {
                        Ok(ModelOutput::Text(format_top_labels(predictions)))
                    }
                },
                |e| format!("Error classifying image: {e}"),
            )
            .await
    }

    fn cached_entries(&self) -> usize {
        self.state.cached_entries()
    }
}
