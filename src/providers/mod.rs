// Provider module
// Narrow seams to the embedding and text-generation models

#[cfg(test)]
pub(crate) mod fakes;
pub mod ollama;

pub use ollama::OllamaClient;

use crate::Result;

/// Maps text to a fixed-length vector.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text. Failures surface as [`crate::PitchError::Embedding`].
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// A single chat-style completion request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Maps a system role plus user prompt to a text completion.
pub trait GenerationProvider: Send + Sync {
    /// One round trip to the model. Failures surface as
    /// [`crate::PitchError::Generation`].
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String>;

    /// Complete and trim the response
    #[inline]
    fn generate(
        &self,
        system: &str,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        let request = CompletionRequest {
            system,
            prompt,
            max_tokens,
            temperature,
        };
        self.complete(&request).map(|text| text.trim().to_string())
    }
}
