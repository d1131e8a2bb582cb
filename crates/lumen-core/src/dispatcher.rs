//! Routes a run request to the named backend.

use futures::FutureExt;
use lumen_abstraction::{ImageBuffer, ModelOutput};
use lumen_models::ModelRegistry;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Text the input area starts out with. Submitting it counts as no input.
pub const PLACEHOLDER_PROMPT: &str = "Enter your text here...";

/// Outcome of one run request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunResult {
    Text(String),
    Image(ImageBuffer),
    /// The request was refused or the backend blew up.
    Error(String),
}

impl RunResult {
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl From<ModelOutput> for RunResult {
    fn from(output: ModelOutput) -> Self {
        match output {
            ModelOutput::Text(text) => Self::Text(text),
            ModelOutput::Image(image) => Self::Image(image),
        }
    }
}

/// Why a run request was refused before reaching a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("model not available")]
    UnknownModel,
    #[error("please provide input data")]
    MissingInput,
    #[error("please load model first")]
    NotLoaded,
}

/// Whether `raw_input` carries anything worth sending to a model.
#[must_use]
pub fn has_input(raw_input: &str) -> bool {
    let trimmed = raw_input.trim();
    !trimmed.is_empty() && trimmed != PLACEHOLDER_PROMPT
}

/// Owns the registry and serves run requests against it.
#[derive(Debug)]
pub struct Dispatcher {
    registry: ModelRegistry,
}

impl Dispatcher {
    #[must_use]
    pub fn new(registry: ModelRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ModelRegistry {
        &mut self.registry
    }

    /// Applies the request guards without running anything.
    ///
    /// Guards run in order: the model must be registered, the input must be
    /// non-empty and not the placeholder, and the model must be loaded.
    pub fn check(&self, name: &str, raw_input: &str) -> Result<(), Rejection> {
        let backend = self.registry.resolve(name).ok_or(Rejection::UnknownModel)?;
        if !has_input(raw_input) {
            return Err(Rejection::MissingInput);
        }
        if !backend.is_loaded() {
            return Err(Rejection::NotLoaded);
        }
        Ok(())
    }

    /// Runs `raw_input` through the named backend.
    ///
    /// The input reaches the backend untrimmed. A panic inside the backend is
    /// caught and comes back as [`RunResult::Error`].
    pub async fn run(&mut self, name: &str, raw_input: &str) -> RunResult {
        if let Err(rejection) = self.check(name, raw_input) {
            warn!(model = %name, reason = %rejection, "Run request refused");
            return RunResult::Error(rejection.to_string());
        }

        let Some(backend) = self.registry.resolve_mut(name) else {
            return RunResult::Error(Rejection::UnknownModel.to_string());
        };

        debug!(model = %name, "Dispatching input");
        match AssertUnwindSafe(backend.process(raw_input)).catch_unwind().await {
            Ok(output) => output.into(),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(model = %name, panic = %message, "Backend panicked while processing");
                RunResult::Error(message)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "model panicked".to_string()
    }
}
