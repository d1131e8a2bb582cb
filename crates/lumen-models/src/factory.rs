//! Backend factory for creating model backends from configuration.

use lumen_abstraction::{ModelBackend, ModelError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::backends::{ImageClassificationBackend, TextGenerationBackend, image_classification, text_generation};
use crate::huggingface::{GenerationParameters, HfClassifierLoader, HfTextLoader, HuggingFaceConfig};

/// The backends Lumen knows how to build, keyed by their registry display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    /// Stable Diffusion image generation.
    #[serde(rename = "Text-to-Image")]
    TextToImage,
    /// DialoGPT conversational replies.
    #[serde(rename = "Text Generation")]
    TextGeneration,
    /// ViT image classification.
    #[serde(rename = "Image Classification")]
    ImageClassification,
}

impl ModelKind {
    /// Every known kind, in registry order.
    pub const ALL: [Self; 3] = [Self::TextToImage, Self::TextGeneration, Self::ImageClassification];

    /// The name the registry and the user refer to this backend by.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::TextToImage => "Text-to-Image",
            Self::TextGeneration => "Text Generation",
            Self::ImageClassification => "Image Classification",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ModelKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text-to-image" | "text to image" | "image-generation" => Ok(Self::TextToImage),
            "text generation" | "text-generation" | "chat" => Ok(Self::TextGeneration),
            "image classification" | "image-classification" => Ok(Self::ImageClassification),
            _ => Err(()),
        }
    }
}

fn default_enabled() -> Vec<ModelKind> {
    vec![ModelKind::TextToImage, ModelKind::TextGeneration]
}

/// Which backends to build and how to parameterize them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelsConfig {
    /// Backends to register, in display order.
    #[serde(default = "default_enabled")]
    pub enabled: Vec<ModelKind>,

    /// Sampling parameters for text generation.
    #[serde(default)]
    pub generation: GenerationParameters,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            generation: GenerationParameters::default(),
        }
    }
}

/// Factory for creating model backends.
pub struct ModelFactory;

impl ModelFactory {
    /// Creates an unloaded backend of the given kind.
    ///
    /// Construction performs no I/O; credentials and connectivity are checked
    /// when the backend is loaded.
    ///
    /// # Errors
    /// Returns `ModelError::ModelUnavailable` if the kind was compiled out.
    pub fn create(
        kind: ModelKind,
        models: &ModelsConfig,
        huggingface: &HuggingFaceConfig,
    ) -> Result<Box<dyn ModelBackend>, ModelError> {
        debug!(kind = %kind, "Creating model backend");

        match kind {
            ModelKind::TextToImage => Self::create_text_to_image(huggingface),
            ModelKind::TextGeneration => {
                let loader = HfTextLoader::new(
                    huggingface.clone(),
                    text_generation::REPOSITORY,
                    models.generation.clone(),
                );
                Ok(Box::new(TextGenerationBackend::new(Box::new(loader))))
            }
            ModelKind::ImageClassification => {
                let loader = HfClassifierLoader::new(huggingface.clone(), image_classification::REPOSITORY);
                Ok(Box::new(ImageClassificationBackend::new(Box::new(loader))))
            }
        }
    }

    #[cfg(feature = "image-generation")]
    fn create_text_to_image(huggingface: &HuggingFaceConfig) -> Result<Box<dyn ModelBackend>, ModelError> {
        use crate::backends::{TextToImageBackend, text_to_image};
        use crate::huggingface::HfImageLoader;

        let loader = HfImageLoader::new(huggingface.clone(), text_to_image::REPOSITORY);
        Ok(Box::new(TextToImageBackend::new(Box::new(loader))))
    }

    #[cfg(not(feature = "image-generation"))]
    fn create_text_to_image(_huggingface: &HuggingFaceConfig) -> Result<Box<dyn ModelBackend>, ModelError> {
        tracing::error!("Text-to-Image requested but image decoding support was not compiled in");
        Err(ModelError::ModelUnavailable(
            "Text-to-Image (built without the image-generation feature)".to_string(),
        ))
    }
}
