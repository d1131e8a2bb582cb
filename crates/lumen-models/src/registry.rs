//! Model registry: display name → backend, built once at startup.

use lumen_abstraction::{ModelBackend, ModelError, ModelInfo, contain_model_error};
use tracing::{info, warn};

use crate::factory::{ModelFactory, ModelsConfig};
use crate::huggingface::HuggingFaceConfig;

/// Builds one backend; may fail if a precondition is unmet.
pub type BackendConstructor = Box<dyn FnOnce() -> Result<Box<dyn ModelBackend>, ModelError>>;

struct RegisteredModel {
    name: String,
    backend: Box<dyn ModelBackend>,
}

/// Ordered, fixed mapping from display name to backend.
///
/// An empty registry is a valid state: it is what remains when every backend
/// failed to build.
#[derive(Default)]
pub struct ModelRegistry {
    entries: Vec<RegisteredModel>,
}

impl ModelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs each constructor, keeping the backends that build.
    ///
    /// A failing constructor is logged and its name omitted; construction of
    /// the registry itself never fails.
    pub fn from_constructors<I, S>(constructors: I) -> Self
    where
        I: IntoIterator<Item = (S, BackendConstructor)>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        for (name, construct) in constructors {
            let name = name.into();
            match construct() {
                Ok(backend) => {
                    registry.register(name, backend);
                }
                Err(e) => warn!(model = %name, error = %e, "Backend construction failed, omitting model"),
            }
        }
        registry
    }

    /// Builds every enabled backend through the [`ModelFactory`].
    pub fn from_config(models: &ModelsConfig, huggingface: &HuggingFaceConfig) -> Self {
        let constructors = models.enabled.iter().map(|&kind| {
            let models = models.clone();
            let huggingface = huggingface.clone();
            let construct: BackendConstructor =
                Box::new(move || ModelFactory::create(kind, &models, &huggingface));
            (kind.display_name(), construct)
        });

        let registry = Self::from_constructors(constructors);
        info!(models = ?registry.names(), "Model registry ready");
        registry
    }

    /// Adds a backend under `name`. Returns `false` (and keeps the existing
    /// backend) if the name is already taken.
    pub fn register(&mut self, name: impl Into<String>, backend: Box<dyn ModelBackend>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            warn!(model = %name, "Duplicate model name, keeping the first registration");
            return false;
        }
        self.entries.push(RegisteredModel { name, backend });
        true
    }

    /// Display names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&(dyn ModelBackend + 'static)> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.backend.as_ref())
    }

    pub fn resolve_mut(&mut self, name: &str) -> Option<&mut (dyn ModelBackend + 'static)> {
        self.entries
            .iter_mut()
            .find(|entry| entry.name == name)
            .map(|entry| entry.backend.as_mut())
    }

    /// Describes a registered model; an unknown name comes back as an error line.
    pub fn describe(&self, name: &str) -> Result<ModelInfo, String> {
        let info = self
            .resolve(name)
            .map(|backend| backend.describe())
            .ok_or_else(|| ModelError::ModelUnavailable(name.to_string()));
        contain_model_error("describe", info)
    }

    /// Loads every backend in order and collects each status line.
    ///
    /// Individual failures do not stop the remaining loads.
    pub async fn load_all(&mut self) -> Vec<(String, String)> {
        let mut statuses = Vec::with_capacity(self.entries.len());
        for entry in &mut self.entries {
            let status = entry.backend.load().await;
            info!(model = %entry.name, status = %status, "Load attempted");
            statuses.push((entry.name.clone(), status));
        }
        statuses
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry").field("models", &self.names()).finish()
    }
}
