//! Contract tests shared by every backend: load idempotence, the not-loaded
//! guard, caching of successful results and retrying of failed ones.

mod common;

use common::{Behavior, StubLoader, behavior, fail_once};
use lumen_abstraction::{ImageBuffer, ModelBackend, ModelError, ModelOutput};
use lumen_models::{
    ALREADY_LOADED, Classification, ImageClassificationBackend, TextGenerationBackend,
    TextToImageBackend,
};

const NOT_LOADED: &str = "Please load the model first";

fn uppercase() -> Behavior<String> {
    behavior(|input, _| Ok(input.to_uppercase()))
}

fn red_square() -> ImageBuffer {
    ImageBuffer::filled(4, 4, [255, 0, 0, 255])
}

fn labels() -> Vec<Classification> {
    vec![
        Classification { label: "tabby, tabby cat".to_string(), score: 0.8 },
        Classification { label: "tiger cat".to_string(), score: 0.15 },
    ]
}

#[tokio::test]
async fn test_process_before_load_returns_fixed_text() {
    let (loader, counters) = StubLoader::new(uppercase());
    let mut text = TextGenerationBackend::new(Box::new(loader));
    assert_eq!(text.process("hello").await, ModelOutput::Text(NOT_LOADED.to_string()));
    assert_eq!(text.cached_entries(), 0);
    assert_eq!(text.cache_stats().misses, 0);
    assert_eq!(counters.calls(), 0);

    let (loader, _) = StubLoader::new(behavior(|_, _| Ok(red_square())));
    let mut image = TextToImageBackend::new(Box::new(loader));
    assert_eq!(image.process("a red square").await, ModelOutput::Text(NOT_LOADED.to_string()));
    assert_eq!(image.cached_entries(), 0);

    let (loader, _) = StubLoader::new(behavior(|_, _| Ok(labels())));
    let mut classifier = ImageClassificationBackend::new(Box::new(loader));
    assert_eq!(classifier.process("/tmp/cat.jpg").await, ModelOutput::Text(NOT_LOADED.to_string()));
    assert_eq!(classifier.cached_entries(), 0);
}

#[tokio::test]
async fn test_second_load_is_a_no_op() {
    let (loader, counters) = StubLoader::new(uppercase());
    let mut backend = TextGenerationBackend::new(Box::new(loader));

    assert_eq!(backend.load().await, "Text Generation model loaded successfully!");
    assert_eq!(backend.load().await, ALREADY_LOADED);
    assert_eq!(counters.loads(), 1);
    assert!(backend.is_loaded());
}

#[tokio::test]
async fn test_load_status_lines_per_backend() {
    let (loader, counters) = StubLoader::new(behavior(|_, _| Ok(red_square())));
    let mut image = TextToImageBackend::new(Box::new(loader));
    assert_eq!(image.load().await, "Text-to-Image model ready (API-based)");
    assert_eq!(image.load().await, ALREADY_LOADED);
    assert_eq!(counters.loads(), 1);

    let (loader, counters) = StubLoader::new(behavior(|_, _| Ok(labels())));
    let mut classifier = ImageClassificationBackend::new(Box::new(loader));
    assert_eq!(classifier.load().await, "Model loaded successfully");
    assert_eq!(classifier.load().await, ALREADY_LOADED);
    assert_eq!(counters.loads(), 1);
}

#[tokio::test]
async fn test_failed_load_is_reported_and_retryable() {
    let (loader, counters) = StubLoader::<String>::failing("HF_API_TOKEN is not set");
    let mut backend = TextGenerationBackend::new(Box::new(loader));

    assert_eq!(backend.load().await, "Error loading model: HF_API_TOKEN is not set");
    assert!(!backend.is_loaded());
    assert!(!backend.describe().loaded);

    // Still unloaded, so the loader is consulted again.
    let _ = backend.load().await;
    assert_eq!(counters.loads(), 2);
}

#[tokio::test]
async fn test_repeated_input_hits_cache() {
    let (loader, counters) = StubLoader::new(uppercase());
    let mut backend = TextGenerationBackend::new(Box::new(loader));
    backend.load().await;

    let first = backend.process("hello").await;
    let second = backend.process("hello").await;

    assert_eq!(first, ModelOutput::Text("HELLO".to_string()));
    assert_eq!(first, second);
    assert_eq!(counters.calls(), 1);
    assert_eq!(backend.cached_entries(), 1);
    assert_eq!(backend.cache_stats().hits, 1);
}

#[tokio::test]
async fn test_cache_key_is_verbatim() {
    let (loader, counters) = StubLoader::new(uppercase());
    let mut backend = TextGenerationBackend::new(Box::new(loader));
    backend.load().await;

    backend.process("hello").await;
    backend.process("Hello").await;
    backend.process("hello ").await;

    assert_eq!(counters.calls(), 3);
    assert_eq!(backend.cached_entries(), 3);
}

#[tokio::test]
async fn test_image_results_are_cached() {
    let (loader, counters) = StubLoader::new(behavior(|_, _| Ok(red_square())));
    let mut backend = TextToImageBackend::new(Box::new(loader));
    backend.load().await;

    let first = backend.process("a red square").await;
    let second = backend.process("a red square").await;

    assert_eq!(first, ModelOutput::Image(red_square()));
    assert_eq!(first, second);
    assert_eq!(counters.calls(), 1);
}

#[tokio::test]
async fn test_failed_text_generation_is_not_cached() {
    let (loader, counters) = StubLoader::new(fail_once("Hello back".to_string()));
    let mut backend = TextGenerationBackend::new(Box::new(loader));
    backend.load().await;

    let failed = backend.process("hi").await;
    assert_eq!(failed, ModelOutput::Text("Error generating text: backend exploded".to_string()));
    assert_eq!(backend.cached_entries(), 0);

    let retried = backend.process("hi").await;
    assert_eq!(retried, ModelOutput::Text("Hello back".to_string()));
    assert_eq!(counters.calls(), 2);
    assert_eq!(backend.cached_entries(), 1);
}

#[tokio::test]
async fn test_failed_image_generation_is_not_cached() {
    let (loader, counters) = StubLoader::new(fail_once(red_square()));
    let mut backend = TextToImageBackend::new(Box::new(loader));
    backend.load().await;

    let failed = backend.process("a red square").await;
    assert_eq!(
        failed,
        ModelOutput::Text(
            "Error generating image: backend exploded\n\nPlease check your API key and internet connection."
                .to_string()
        )
    );
    assert_eq!(backend.cached_entries(), 0);

    assert!(matches!(backend.process("a red square").await, ModelOutput::Image(_)));
    assert_eq!(counters.calls(), 2);
}

#[tokio::test]
async fn test_malformed_image_is_an_inference_failure() {
    let (loader, _) = StubLoader::new(behavior(|_, _| Ok(ImageBuffer::new(10, 10, vec![0; 3]))));
    let mut backend = TextToImageBackend::new(Box::new(loader));
    backend.load().await;

    let output = backend.process("broken").await;
    let text = output.as_text().unwrap();
    assert!(text.starts_with("Error generating image: pipeline returned 3 bytes"));
    assert_eq!(backend.cached_entries(), 0);
}

#[tokio::test]
async fn test_failed_classification_is_not_cached() {
    let (loader, counters) = StubLoader::new(fail_once(labels()));
    let mut backend = ImageClassificationBackend::new(Box::new(loader));
    backend.load().await;

    let failed = backend.process("/tmp/cat.jpg").await;
    assert_eq!(failed, ModelOutput::Text("Error classifying image: backend exploded".to_string()));
    assert_eq!(backend.cached_entries(), 0);

    let retried = backend.process("/tmp/cat.jpg").await;
    assert_eq!(
        retried,
        ModelOutput::Text("tabby, tabby cat: 0.8000\ntiger cat: 0.1500".to_string())
    );
    assert_eq!(counters.calls(), 2);
}

#[tokio::test]
async fn test_empty_classification_is_a_failure() {
    let (loader, _) = StubLoader::new(behavior(|_, _| Ok(Vec::<Classification>::new())));
    let mut backend = ImageClassificationBackend::new(Box::new(loader));
    backend.load().await;

    let output = backend.process("/tmp/blank.png").await;
    assert_eq!(output, ModelOutput::Text("Error classifying image: no labels returned".to_string()));
    assert_eq!(backend.cached_entries(), 0);
}

#[tokio::test]
async fn test_text_generation_strips_echoed_prompt() {
    let (loader, _) = StubLoader::new(behavior(|input, _| Ok(format!("{input} I am fine, thanks."))));
    let mut backend = TextGenerationBackend::new(Box::new(loader));
    backend.load().await;

    assert_eq!(
        backend.process("How are you?").await,
        ModelOutput::Text("I am fine, thanks.".to_string())
    );
}

#[tokio::test]
async fn test_describe_tracks_load_state() {
    let (loader, _) = StubLoader::new(uppercase());
    let mut backend = TextGenerationBackend::new(Box::new(loader));

    let before = backend.describe();
    assert_eq!(before.name, "DialoGPT Medium");
    assert_eq!(before.category.to_string(), "Text Generation");
    assert!(!before.loaded);

    backend.load().await;
    assert!(backend.describe().loaded);
}

#[tokio::test]
async fn test_errors_from_any_variant_render_as_text() {
    let unauthorized: Behavior<String> =
        behavior(|_, _| Err(ModelError::RequestError("authentication failed (401 Unauthorized)".to_string())));
    let (loader, _) = StubLoader::new(unauthorized);
    let mut backend = TextGenerationBackend::new(Box::new(loader));
    backend.load().await;

    assert_eq!(
        backend.process("hi").await,
        ModelOutput::Text(
            "Error generating text: Request Error: authentication failed (401 Unauthorized)".to_string()
        )
    );
}
