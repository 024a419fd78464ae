// Storytelling pipeline module
// Retrieval, context summarization, prompt assembly and generation in one pass


use std::sync::Arc;
use tracing::{debug, info};

use crate::Result;
use crate::prompt::{Mode, STORYTELLER_ROLE, build_prompt, extract_pitch};
use crate::providers::GenerationProvider;
use crate::store::VectorStore;
use crate::summarizer::ContextSummarizer;

pub const DRAFT_MAX_TOKENS: u32 = 600;
pub const DRAFT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TOP_K: usize = 5;

/// Anything that can turn a text into a pitch for a mode
pub trait Drafter: Send + Sync {
    fn draft(&self, subject: &str, mode: Mode) -> Result<String>;
}

/// Retrieval-grounded rewrite: retrieve -> summarize -> prompt -> generate
pub struct StoryPipeline {
    store: VectorStore,
    summarizer: ContextSummarizer,
    generator: Arc<dyn GenerationProvider>,
    top_k: usize,
}

impl StoryPipeline {
    #[inline]
    pub fn new(store: VectorStore, generator: Arc<dyn GenerationProvider>) -> Self {
        Self {
            store,
            summarizer: ContextSummarizer::new(Arc::clone(&generator)),
            generator,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Number of documents retrieved per draft
    #[inline]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    #[inline]
    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    #[inline]
    pub fn store_mut(&mut self) -> &mut VectorStore {
        &mut self.store
    }

    /// Build the full rewrite prompt for a subject, including retrieved context
    #[inline]
    pub fn prepare_prompt(&self, subject: &str, mode: Mode) -> Result<String> {
        let relevant = self.store.retrieve(subject, self.top_k)?;
        debug!("Retrieved {} documents for {} draft", relevant.len(), mode);

        let context = self.summarizer.format_context(&relevant);
        Ok(build_prompt(&context, subject, mode))
    }
}

impl Drafter for StoryPipeline {
    #[inline]
    fn draft(&self, subject: &str, mode: Mode) -> Result<String> {
        let prompt = self.prepare_prompt(subject, mode)?;

        let response = self.generator.generate(
            STORYTELLER_ROLE,
            &prompt,
            DRAFT_MAX_TOKENS,
            DRAFT_TEMPERATURE,
        )?;

        let pitch = extract_pitch(&response);
        info!("Drafted {} pitch ({} words)", mode, pitch.split_whitespace().count());
        Ok(pitch)
    }
}
