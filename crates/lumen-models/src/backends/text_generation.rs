//! Conversational text generation backend (DialoGPT).

use async_trait::async_trait;
use lumen_abstraction::{
    ModelBackend, ModelCategory, ModelDescriptor, ModelOutput, PipelineLoader,
};

use super::BackendState;
use crate::cache::CacheStats;

/// Upstream repository of the default conversational model.
pub const REPOSITORY: &str = "microsoft/DialoGPT-medium";

const READY: &str = "Text Generation model loaded successfully!";

/// Text generation backend wrapping a `String`-producing pipeline.
pub struct TextGenerationBackend {
    state: BackendState<String>,
}

impl TextGenerationBackend {
    /// Creates an unloaded backend that will acquire its pipeline through `loader`.
    #[must_use]
    pub fn new(loader: Box<dyn PipelineLoader<String>>) -> Self {
        Self { state: BackendState::new(Self::default_descriptor(), loader) }
    }

    /// Identity data of the DialoGPT backend.
    #[must_use]
    pub fn default_descriptor() -> ModelDescriptor {
        ModelDescriptor::new(
            "DialoGPT Medium",
            ModelCategory::TextGeneration,
            "Generates conversational text responses using microsoft/DialoGPT-medium",
            REPOSITORY,
        )
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.state.cache_stats()
    }
}

/// Removes the prompt the model echoes back in front of its reply.
///
/// When the generated text contains the prompt anywhere, as many leading
/// characters as the prompt has are dropped; otherwise the text is kept whole.
/// Either way the result is trimmed.
#[must_use]
pub fn strip_echoed_prompt(prompt: &str, generated: &str) -> String {
    if generated.contains(prompt) {
        let reply: String = generated.chars().skip(prompt.chars().count()).collect();
        reply.trim().to_string()
    } else {
        generated.trim().to_string()
    }
}

#[async_trait]
impl ModelBackend for TextGenerationBackend {
    fn descriptor(&self) -> &ModelDescriptor {
        self.state.descriptor()
    }

    fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }

    async fn load(&mut self) -> String {
        self.state.load(READY).await
    }

    async fn process(&mut self, input: &str) -> ModelOutput {
        self.state
            .process(
                input,
                |prompt, generated| Ok(ModelOutput::Text(strip_echoed_prompt(prompt, &generated))),
                |e| format!("Error generating text: {e}"),
            )
            .await
    }

    fn cached_entries(&self) -> usize {
        self.state.cached_entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_echoed_prompt_removes_leading_prompt() {
        assert_eq!(strip_echoed_prompt("Hi there", "Hi there  How are you?"), "How are you?");
    }

    #[test]
    fn test_strip_echoed_prompt_keeps_text_without_prompt() {
        assert_eq!(strip_echoed_prompt("hello", "  HELLO \n"), "HELLO");
    }

    #[test]
    fn test_strip_echoed_prompt_is_positional() {
        // The prompt appears later in the text, yet the leading characters are cut.
        assert_eq!(strip_echoed_prompt("abc", "xyzabc"), "abc");
    }

    #[test]
    fn test_strip_echoed_prompt_counts_characters() {
        // "é" is two bytes but one character.
        assert_eq!(strip_echoed_prompt("a", "éa"), "a");
        assert_eq!(strip_echoed_prompt("é", "abé"), "bé");
        assert_eq!(strip_echoed_prompt("héllo", "héllo wörld"), "wörld");
    }

    #[test]
    fn test_default_descriptor() {
        let descriptor = TextGenerationBackend::default_descriptor();
        assert_eq!(descriptor.category, ModelCategory::TextGeneration);
        assert_eq!(descriptor.repository, REPOSITORY);
    }
}
