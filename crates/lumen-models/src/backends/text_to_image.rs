//! Text-to-image backend (Stable Diffusion through a hosted API).

use async_trait::async_trait;
use lumen_abstraction::{
    ImageBuffer, ModelBackend, ModelCategory, ModelDescriptor, ModelError, ModelOutput,
    PipelineLoader,
};

use super::BackendState;
use crate::cache::CacheStats;

/// Upstream repository of the default image generation model.
pub const REPOSITORY: &str = "runwayml/stable-diffusion-v1-5";

const READY: &str = "Text-to-Image model ready (API-based)";

/// Image generation backend wrapping an `ImageBuffer`-producing pipeline.
pub struct TextToImageBackend {
    state: BackendState<ImageBuffer>,
}

impl TextToImageBackend {
    #[must_use]
    pub fn new(loader: Box<dyn PipelineLoader<ImageBuffer>>) -> Self {
        Self { state: BackendState::new(Self::default_descriptor(), loader) }
    }

    #[must_use]
    pub fn default_descriptor() -> ModelDescriptor {
        ModelDescriptor::new(
            "Stable Diffusion v1.5",
            ModelCategory::TextToImage,
            "Generates images from text descriptions using Hugging Face API",
            REPOSITORY,
        )
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.state.cache_stats()
    }
}

fn reject_malformed(image: ImageBuffer) -> Result<ModelOutput, ModelError> {
    if image.is_well_formed() {
        Ok(ModelOutput::Image(image))
    } else {
        Err(ModelError::InferenceFailure(format!(
            "pipeline returned {} bytes for a {}x{} image",
            image.pixels.len(),
            image.width,
            image.height
        )))
    }
}

#[async_trait]
impl ModelBackend for TextToImageBackend {
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
                |_, image| reject_malformed(image),
                |e| {
                    format!(
                        "Error generating image: {e}\n\nPlease check your API key and internet connection."
                    )
                },
            )
            .await
    }

    fn cached_entries(&self) -> usize {
        self.state.cached_entries()
    }
}
