//! Deterministic stand-ins for the model providers.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::{CompletionRequest, EmbeddingProvider, GenerationProvider};
use crate::{PitchError, Result};

/// Embeds text as keyword counts over a fixed vocabulary, so similarity is
/// predictable from word overlap.
pub struct KeywordEmbedder {
    vocabulary: Vec<&'static str>,
    calls: Mutex<usize>,
}

impl KeywordEmbedder {
    pub fn new(vocabulary: &[&'static str]) -> Self {
        Self {
            vocabulary: vocabulary.to_vec(),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().expect("embedder lock")
    }
}

impl EmbeddingProvider for KeywordEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        *self.calls.lock().expect("embedder lock") += 1;
        if text.contains("<fail>") {
            return Err(PitchError::Embedding("scripted failure".to_string()));
        }

        let lowered = text.to_lowercase();
        Ok(self
            .vocabulary
            .iter()
            .map(|word| lowered.matches(word).count() as f32)
            .collect())
    }
}

/// Replays queued responses in order and records every request it saw.
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ScriptedGenerator {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(|r| Ok(r.into())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn push_error(&self, message: &str) {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(Err(PitchError::Generation(message.to_string())));
    }

    pub fn push(&self, response: &str) {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(Ok(response.to_string()));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl GenerationProvider for ScriptedGenerator {
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(RecordedRequest {
                system: request.system.to_string(),
                prompt: request.prompt.to_string(),
                max_tokens: request.max_tokens,
                temperature: request.temperature,
            });

        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| Err(PitchError::Generation("script exhausted".to_string())))
    }
}
