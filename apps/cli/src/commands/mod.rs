//! CLI command implementations.

pub mod interactive;
pub mod models;
pub mod run;
