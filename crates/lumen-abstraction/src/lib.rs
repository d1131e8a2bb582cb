//! Model abstraction layer for Lumen.
//!
//! This crate defines the capability set every model backend implements
//! (`describe`, `load`, `process`), the values that flow between backends,
//! the dispatcher and the presenter, and the seam through which backends
//! reach their opaque inference pipelines.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::error;

/// Represents an error that can occur when interacting with a model backend.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelError {
    /// `process` was called before `load` succeeded.
    #[error("Please load the model first")]
    NotLoaded,

    /// The requested model is not registered (e.g. its backend could not be built).
    #[error("Model not available: {0}")]
    ModelUnavailable(String),

    /// The underlying pipeline could not be initialized.
    #[error("{0}")]
    LoadFailure(String),

    /// The underlying pipeline failed while processing input.
    #[error("{0}")]
    InferenceFailure(String),

    /// A result could not be rendered (e.g. malformed image payload).
    #[error("{0}")]
    PresentationFailure(String),

    /// An error occurred while talking to a remote pipeline (network, auth, decoding).
    #[error("Request Error: {0}")]
    RequestError(String),
}

/// The kind of task a model performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelCategory {
    /// Generates an image from a text prompt.
    TextToImage,
    /// Generates a conversational text reply.
    TextGeneration,
    /// Labels the image found at a filesystem path.
    ImageClassification,
}

impl fmt::Display for ModelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TextToImage => write!(f, "Text-to-Image"),
            Self::TextGeneration => write!(f, "Text Generation"),
            Self::ImageClassification => write!(f, "Image Classification"),
        }
    }
}

/// Immutable identity data for a model, fixed when its backend is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Human-readable model name (e.g. "DialoGPT Medium").
    pub name: String,
    /// Task category.
    pub category: ModelCategory,
    /// Short human description.
    pub description: String,
    /// Upstream repository id (e.g. "microsoft/DialoGPT-medium").
    pub repository: String,
}

impl ModelDescriptor {
    /// Creates a new descriptor.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        category: ModelCategory,
        description: impl Into<String>,
        repository: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            description: description.into(),
            repository: repository.into(),
        }
    }
}

/// Descriptor fields plus the current load state, as returned by `describe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub category: ModelCategory,
    pub description: String,
    pub repository: String,
    pub loaded: bool,
}

impl ModelInfo {
    /// Snapshots a descriptor together with a load flag.
    #[must_use]
    pub fn new(descriptor: &ModelDescriptor, loaded: bool) -> Self {
        Self {
            name: descriptor.name.clone(),
            category: descriptor.category,
            description: descriptor.description.clone(),
            repository: descriptor.repository.clone(),
            loaded,
        }
    }
}

/// An RGBA8 pixel buffer.
///
/// `pixels` is expected to hold `width * height * 4` bytes in row-major order.
/// Nothing enforces that at construction; consumers check it with
/// [`ImageBuffer::is_well_formed`] before rendering.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ImageBuffer {
    /// Bytes per RGBA8 pixel.
    pub const CHANNELS: usize = 4;

    #[must_use]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self { width, height, pixels }
    }

    /// Creates a buffer of the given size filled with one colour.
    #[must_use]
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let pixels = rgba.iter().copied().cycle().take(count * Self::CHANNELS).collect();
        Self { width, height, pixels }
    }

    /// Number of bytes a buffer of this size should carry, or `None` when
    /// the declared dimensions overflow `usize`.
    #[must_use]
    pub fn expected_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(Self::CHANNELS)
    }

    /// Whether the pixel data matches the declared dimensions.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.width > 0 && self.height > 0 && self.expected_len() == Some(self.pixels.len())
    }
}

impl fmt::Debug for ImageBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// The value a backend produces for one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelOutput {
    /// Textual output (also used for advisory and error messages).
    Text(String),
    /// Image-like output.
    Image(ImageBuffer),
}

impl ModelOutput {
    /// Returns the text if this is a textual output.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Image(_) => None,
        }
    }
}

impl From<String> for ModelOutput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<ImageBuffer> for ModelOutput {
    fn from(image: ImageBuffer) -> Self {
        Self::Image(image)
    }
}

/// An initialized inference engine: given validated input, produce output.
///
/// Latency is unbounded from the caller's point of view.
#[async_trait]
pub trait Pipeline<O: Send>: Send + Sync {
    /// Runs inference once.
    ///
    /// # Errors
    /// Returns a `ModelError` if the engine fails.
    async fn infer(&self, input: &str) -> Result<O, ModelError>;
}

/// Acquires a pipeline handle. Called by a backend's `load`.
#[async_trait]
pub trait PipelineLoader<O: Send>: Send + Sync {
    /// Initializes the pipeline.
    ///
    /// # Errors
    /// Returns a `ModelError` if a dependency, credential or network precondition is unmet.
    async fn load(&self) -> Result<Box<dyn Pipeline<O>>, ModelError>;
}

/// The capability set every model backend implements.
///
/// Backends are owned and driven by a single interaction thread, so only
/// `Send` is required.
#[async_trait]
pub trait ModelBackend: Send {
    /// Returns the backend's immutable identity data.
    fn descriptor(&self) -> &ModelDescriptor;

    /// Whether a load has succeeded.
    fn is_loaded(&self) -> bool;

    /// Returns descriptor fields plus the current load state.
    fn describe(&self) -> ModelInfo {
        ModelInfo::new(self.descriptor(), self.is_loaded())
    }

    /// Acquires the pipeline handle and reports the outcome as a status line.
    ///
    /// Idempotent: once loaded, returns an "already loaded" status without
    /// touching the loader again. Never fails outward.
    async fn load(&mut self) -> String;

    /// Processes raw input, consulting the backend's result cache first.
    ///
    /// Never fails outward: inference failures come back as text and are
    /// never cached.
    async fn process(&mut self, input: &str) -> ModelOutput;

    /// Number of results currently cached by this backend.
    fn cached_entries(&self) -> usize;
}

/// Contains a fallible model operation at its boundary.
///
/// Logs the failure and converts it into the user-facing message produced by
/// `render`. Successful values pass through untouched.
pub fn contain<T>(
    operation: &str,
    result: Result<T, ModelError>,
    render: impl FnOnce(&ModelError) -> String,
) -> Result<T, String> {
    result.map_err(|e| {
        error!(operation = %operation, error = %e, "Model operation failed");
        render(&e)
    })
}

/// [`contain`] with the generic `"Error: <reason>"` rendering.
pub fn contain_model_error<T>(operation: &str, result: Result<T, ModelError>) -> Result<T, String> {
    contain(operation, result, |e| format!("Error: {e}"))
}
