//! Core of Lumen: configuration, request dispatch and result presentation.
//!
//! Front-ends build a [`Workbench`] from a [`LumenConfig`], implement
//! [`OutputSurface`] and forward user actions to the workbench.

pub mod config;
pub mod dispatcher;
pub mod presenter;
pub mod workbench;

pub use config::{ConfigError, ConfigResult, LumenConfig, OutputConfig};
pub use dispatcher::{Dispatcher, PLACEHOLDER_PROMPT, Rejection, RunResult, has_input};
pub use presenter::{DISPLAY_BOUND, OutputSurface, Presenter, caption, fit_within};
pub use workbench::{ERROR_TITLE, LOAD_TITLE, PROCESSING_NOTICE, Workbench, info_panel};
