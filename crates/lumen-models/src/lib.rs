//! Model backends for Lumen.
//!
//! This crate provides concrete implementations of the `ModelBackend` trait,
//! the per-backend result cache, the factory that builds backends from
//! configuration and the registry that holds them.
//!
//! # Supported Backends
//!
//! - **Text-to-Image**: Stable Diffusion v1.5 via the Hugging Face Inference API
//!   (requires the `image-generation` feature, on by default)
//! - **Text Generation**: DialoGPT Medium via the Hugging Face Inference API
//! - **Image Classification**: ViT Base Patch16-224; input is an image path

pub mod backends;
pub mod cache;
pub mod factory;
pub mod huggingface;
pub mod registry;

pub use backends::{
    ALREADY_LOADED, BackendState, Classification, ImageClassificationBackend, TextGenerationBackend,
    TextToImageBackend, strip_echoed_prompt,
};
pub use cache::{CacheStats, ResultCache};
pub use factory::{ModelFactory, ModelKind, ModelsConfig};
pub use huggingface::{GenerationParameters, HuggingFaceClient, HuggingFaceConfig, TOKEN_ENV_VAR};
pub use registry::{BackendConstructor, ModelRegistry};
