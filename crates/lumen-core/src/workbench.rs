//! Event handlers behind the interactive front-end.
//!
//! A [`Workbench`] tracks the selected model and turns user actions (select,
//! load, run, clear) into dispatcher calls and surface updates.

use lumen_abstraction::ModelInfo;
use lumen_models::ModelRegistry;
use tracing::info;

use crate::config::LumenConfig;
use crate::dispatcher::{Dispatcher, RunResult};
use crate::presenter::{OutputSurface, Presenter};

/// Notice shown while a model is working.
pub const PROCESSING_NOTICE: &str = "Processing... Please wait.";

/// Title of the notification carrying a load status.
pub const LOAD_TITLE: &str = "Model Load";

/// Title of notifications for refused actions.
pub const ERROR_TITLE: &str = "Error";

/// Formats the model information panel.
#[must_use]
pub fn info_panel(info: &ModelInfo) -> String {
    format!(
        "Model Name: {}\nCategory: {}\nDescription: {}\nStatus: {}\n\nHugging Face Model:\n{}",
        info.name,
        info.category,
        info.description,
        if info.loaded { "Loaded" } else { "Not Loaded" },
        info.repository
    )
}

#[derive(Debug)]
pub struct Workbench {
    dispatcher: Dispatcher,
    presenter: Presenter,
    selected: Option<String>,
}

impl Workbench {
    /// Starts with the first registered model selected, if any.
    #[must_use]
    pub fn new(dispatcher: Dispatcher, presenter: Presenter) -> Self {
        let selected = dispatcher.registry().names().first().map(|name| (*name).to_string());
        Self { dispatcher, presenter, selected }
    }

    /// Builds the registry described by `config`.
    #[must_use]
    pub fn from_config(config: &LumenConfig) -> Self {
        let registry = ModelRegistry::from_config(&config.models, &config.huggingface);
        Self::new(Dispatcher::new(registry), Presenter::new())
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Information panel text for the selected model.
    pub fn info_text(&self) -> String {
        let Some(name) = self.selected.as_deref() else {
            return "No models available".to_string();
        };
        match self.dispatcher.registry().describe(name) {
            Ok(info) => info_panel(&info),
            Err(message) => message,
        }
    }

    pub fn refresh_info(&self, surface: &mut dyn OutputSurface) {
        surface.show_info(&self.info_text());
    }

    /// Selects a model by display name. Unknown names leave the selection alone.
    pub fn select(&mut self, name: &str, surface: &mut dyn OutputSurface) -> bool {
        if !self.dispatcher.registry().contains(name) {
            surface.notify(ERROR_TITLE, &format!("Unknown model '{name}'"));
            return false;
        }
        self.selected = Some(name.to_string());
        self.refresh_info(surface);
        true
    }

    /// Loads the selected model and reports the status.
    pub async fn load_selected(&mut self, surface: &mut dyn OutputSurface) -> Option<String> {
        let name = self.selected.clone()?;
        let backend = self.dispatcher.registry_mut().resolve_mut(&name)?;
        let status = backend.load().await;
        info!(model = %name, status = %status, "Load requested");
        surface.notify(LOAD_TITLE, &status);
        self.refresh_info(surface);
        Some(status)
    }

    /// Loads every model, one notification per model.
    pub async fn load_all(&mut self, surface: &mut dyn OutputSurface) -> Vec<(String, String)> {
        let statuses = self.dispatcher.registry_mut().load_all().await;
        for (name, status) in &statuses {
            surface.notify(LOAD_TITLE, &format!("{name}: {status}"));
        }
        self.refresh_info(surface);
        statuses
    }

    /// Runs `raw_input` through the named model and presents the result.
    ///
    /// Refused requests become an error notification and leave the output
    /// untouched; accepted ones show [`PROCESSING_NOTICE`] first.
    pub async fn run(&mut self, name: &str, raw_input: &str, surface: &mut dyn OutputSurface) -> RunResult {
        if let Err(rejection) = self.dispatcher.check(name, raw_input) {
            let message = rejection.to_string();
            surface.notify(ERROR_TITLE, &message);
            return RunResult::Error(message);
        }

        surface.show_text(PROCESSING_NOTICE);
        let result = self.dispatcher.run(name, raw_input).await;
        self.presenter.present(&result, surface);
        result
    }

    /// [`run`](Self::run) against the selected model.
    pub async fn run_selected(&mut self, raw_input: &str, surface: &mut dyn OutputSurface) -> RunResult {
        let name = self.selected.clone().unwrap_or_default();
        self.run(&name, raw_input, surface).await
    }

    /// Empties the output text and removes any image.
    pub fn clear(&self, surface: &mut dyn OutputSurface) {
        surface.show_text("");
        surface.clear_image();
    }
}
