//! Concrete model backends.
//!
//! Every backend composes a [`BackendState`] that owns the pipeline handle and
//! the result cache, and adds its own descriptor, status lines and output
//! shaping on top.

pub mod image_classification;
pub mod text_generation;
pub mod text_to_image;

use lumen_abstraction::{
    ModelDescriptor, ModelError, ModelOutput, Pipeline, PipelineLoader, contain,
};
use tracing::{debug, info};

use crate::cache::{CacheStats, ResultCache};

pub use image_classification::{Classification, ImageClassificationBackend};
pub use text_generation::{TextGenerationBackend, strip_echoed_prompt};
pub use text_to_image::TextToImageBackend;

/// Status returned by `load` once a backend is already loaded.
pub const ALREADY_LOADED: &str = "Model already loaded";

/// Shared state of a backend whose pipeline produces values of type `O`.
///
/// The backend counts as loaded exactly when it holds a pipeline handle, and
/// the handle is only ever set by a successful load.
pub struct BackendState<O: Send> {
    descriptor: ModelDescriptor,
    loader: Box<dyn PipelineLoader<O>>,
    pipeline: Option<Box<dyn Pipeline<O>>>,
    cache: ResultCache,
}

impl<O: Send> BackendState<O> {
    pub fn new(descriptor: ModelDescriptor, loader: Box<dyn PipelineLoader<O>>) -> Self {
        Self {
            descriptor,
            loader,
            pipeline: None,
            cache: ResultCache::new(),
        }
    }

    pub fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    pub fn is_loaded(&self) -> bool {
        self.pipeline.is_some()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    /// Acquires the pipeline once; later calls report [`ALREADY_LOADED`].
    pub async fn load(&mut self, ready: &str) -> String {
        if self.pipeline.is_some() {
            debug!(model = %self.descriptor.name, "Load skipped, already loaded");
            return ALREADY_LOADED.to_string();
        }

        info!(
            model = %self.descriptor.name,
            repository = %self.descriptor.repository,
            "Loading model"
        );

        let loaded = contain("load", self.loader.load().await, |e| {
            format!("Error loading model: {e}")
        });

        match loaded {
            Ok(pipeline) => {
                self.pipeline = Some(pipeline);
                info!(model = %self.descriptor.name, "Model loaded");
                ready.to_string()
            }
            Err(status) => status,
        }
    }

    /// Runs the cache-then-pipeline contract for one raw input.
    ///
    /// `shape` turns the pipeline value into the output to cache and return;
    /// `failure` renders any error into the text shown instead. Failures are
    /// never cached.
    pub async fn process<S, F>(&mut self, input: &str, shape: S, failure: F) -> ModelOutput
    where
        S: FnOnce(&str, O) -> Result<ModelOutput, ModelError> + Send,
        F: FnOnce(&ModelError) -> String + Send,
    {
        let Some(pipeline) = self.pipeline.as_ref() else {
            return ModelOutput::Text(ModelError::NotLoaded.to_string());
        };

        if let Some(cached) = self.cache.get(input) {
            return cached;
        }

        debug!(model = %self.descriptor.name, input_len = input.len(), "Running pipeline");
        let produced = pipeline.infer(input).await.and_then(|value| shape(input, value));

        match contain("process", produced, failure) {
            Ok(output) => {
                self.cache.put(input, output.clone());
                output
            }
            Err(message) => ModelOutput::Text(message),
        }
    }
}
