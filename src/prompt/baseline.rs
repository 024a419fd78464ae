//! Single-paragraph rewrite prompts with no retrieved context, used as the
//! comparison arm when evaluating retrieval-grounded pitches.

use std::sync::Arc;

use super::{Mode, WORD_LIMIT};
use crate::Result;
use crate::pipeline::Drafter;
use crate::providers::GenerationProvider;

pub const BASELINE_ROLE: &str =
    "You are a helpful assistant that rewrites academic text for different audiences.";
pub const BASELINE_MAX_TOKENS: u32 = 1000;
pub const BASELINE_TEMPERATURE: f32 = 0.7;

/// Plain rewrite prompt for a mode
#[inline]
pub fn base_prompt(mode: Mode, abstract_text: &str) -> String {
    let direction = match mode {
        Mode::General => {
            "Rewrite this academic abstract in simple, non-technical language that anyone can understand.\n\
             Focus on the main idea and why it matters to everyday people."
        }
        Mode::Investor => {
            "Rewrite this academic abstract as a compelling pitch for potential investors.\n\
             Focus on the market potential, the innovation and the business value."
        }
        Mode::Conference => {
            "Rewrite this academic abstract in a formal, technical style suitable for a research conference.\n\
             Emphasize the scientific contributions and technical details."
        }
    };

    format!(
        "{direction}\nThe rewritten abstract should be within {WORD_LIMIT} words.\n\nAbstract: {}",
        abstract_text.trim()
    )
}

/// Drafts pitches straight from the base prompt
pub struct BaselineDrafter {
    generator: Arc<dyn GenerationProvider>,
}

impl BaselineDrafter {
    #[inline]
    pub fn new(generator: Arc<dyn GenerationProvider>) -> Self {
        Self { generator }
    }
}

impl Drafter for BaselineDrafter {
    #[inline]
    fn draft(&self, subject: &str, mode: Mode) -> Result<String> {
        self.generator.generate(
            BASELINE_ROLE,
            &base_prompt(mode, subject),
            BASELINE_MAX_TOKENS,
            BASELINE_TEMPERATURE,
        )
    }
}
