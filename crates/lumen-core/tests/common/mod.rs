//! Test doubles for driving the core without a network.

#![allow(dead_code)]

use async_trait::async_trait;
use lumen_abstraction::{
    ImageBuffer, ModelBackend, ModelCategory, ModelDescriptor, ModelError, ModelOutput, Pipeline,
    PipelineLoader,
};
use lumen_core::OutputSurface;
use lumen_models::{ModelRegistry, TextGenerationBackend, TextToImageBackend};
use std::sync::{Arc, Mutex};

/// Inputs a pipeline has seen, in order.
pub type Seen = Arc<Mutex<Vec<String>>>;

/// Loader for a pipeline that maps input with a plain function.
pub struct FnLoader<O> {
    map: fn(&str) -> O,
    seen: Seen,
}

impl<O: Send + 'static> FnLoader<O> {
    pub fn new(map: fn(&str) -> O) -> (Self, Seen) {
        let seen = Seen::default();
        (Self { map, seen: Arc::clone(&seen) }, seen)
    }
}

#[async_trait]
impl<O: Send + 'static> PipelineLoader<O> for FnLoader<O> {
    async fn load(&self) -> Result<Box<dyn Pipeline<O>>, ModelError> {
        Ok(Box::new(FnPipeline { map: self.map, seen: Arc::clone(&self.seen) }))
    }
}

struct FnPipeline<O> {
    map: fn(&str) -> O,
    seen: Seen,
}

#[async_trait]
impl<O: Send + 'static> Pipeline<O> for FnPipeline<O> {
    async fn infer(&self, input: &str) -> Result<O, ModelError> {
        self.seen.lock().unwrap().push(input.to_string());
        Ok((self.map)(input))
    }
}

pub fn uppercase(input: &str) -> String {
    input.to_uppercase()
}

pub fn landscape(_: &str) -> ImageBuffer {
    ImageBuffer::filled(1200, 800, [30, 60, 90, 255])
}

/// Text generation backend backed by [`uppercase`].
pub fn uppercase_backend() -> (Box<dyn ModelBackend>, Seen) {
    let (loader, seen) = FnLoader::new(uppercase);
    (Box::new(TextGenerationBackend::new(Box::new(loader))), seen)
}

/// Text-to-image backend producing a 1200×800 image.
pub fn landscape_backend() -> Box<dyn ModelBackend> {
    let (loader, _) = FnLoader::new(landscape);
    Box::new(TextToImageBackend::new(Box::new(loader)))
}

/// Registry with "Text-to-Image" and "Text Generation", both unloaded.
pub fn two_model_registry() -> (ModelRegistry, Seen) {
    let mut registry = ModelRegistry::new();
    let (text, seen) = uppercase_backend();
    registry.register("Text-to-Image", landscape_backend());
    registry.register("Text Generation", text);
    (registry, seen)
}

/// Backend whose `process` panics.
pub struct PanickingBackend {
    descriptor: ModelDescriptor,
}

impl PanickingBackend {
    pub fn new() -> Self {
        Self {
            descriptor: ModelDescriptor::new("Broken", ModelCategory::TextGeneration, "Always panics", "test/broken"),
        }
    }
}

#[async_trait]
impl ModelBackend for PanickingBackend {
    fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    fn is_loaded(&self) -> bool {
        true
    }

    async fn load(&mut self) -> String {
        "Model already loaded".to_string()
    }

    async fn process(&mut self, _input: &str) -> ModelOutput {
        panic!("backend exploded");
    }

    fn cached_entries(&self) -> usize {
        0
    }
}

/// One call made on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Text(String),
    Image { width: u32, height: u32, caption: String },
    ClearImage,
    Info(String),
    Notify { title: String, message: String },
}

/// Surface that records every call.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub events: Vec<Event>,
}

impl RecordingSurface {
    pub fn last_text(&self) -> Option<&str> {
        self.events.iter().rev().find_map(|event| match event {
            Event::Text(text) => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn last_info(&self) -> Option<&str> {
        self.events.iter().rev().find_map(|event| match event {
            Event::Info(info) => Some(info.as_str()),
            _ => None,
        })
    }

    pub fn notifications(&self) -> Vec<(String, String)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Notify { title, message } => Some((title.clone(), message.clone())),
                _ => None,
            })
            .collect()
    }
}

impl OutputSurface for RecordingSurface {
    fn show_text(&mut self, text: &str) {
        self.events.push(Event::Text(text.to_string()));
    }

    fn show_image(&mut self, image: &ImageBuffer, caption: &str) {
        self.events.push(Event::Image {
            width: image.width,
            height: image.height,
            caption: caption.to_string(),
        });
    }

    fn clear_image(&mut self) {
        self.events.push(Event::ClearImage);
    }

    fn show_info(&mut self, info: &str) {
        self.events.push(Event::Info(info.to_string()));
    }

    fn notify(&mut self, title: &str, message: &str) {
        self.events.push(Event::Notify { title: title.to_string(), message: message.to_string() });
    }
}
