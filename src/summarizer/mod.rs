// Context summarizer module
// Condenses retrieved documents into a deduplicated list of one-line main points


use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::providers::GenerationProvider;
use crate::store::Document;

pub const EXTRACTION_INSTRUCTION: &str = "Read the document carefully and work out what its main topics are and why they matter. \
Then state its single key contribution or main point in one concise sentence.";
pub const EXTRACTION_TEMPERATURE: f32 = 0.3;
pub const EXTRACTION_MAX_TOKENS: u32 = 100;

pub const CONTEXT_HEADER: &str = "Here are some recent trends and related work in the field:";
pub const NO_CONTEXT: &str = "No directly relevant prior work found in the database.";

/// Main points extracted from retrieved documents, in retrieval order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextSummary {
    points: Vec<String>,
}

impl ContextSummary {
    /// Build a summary from candidate points, dropping blanks and
    /// case-insensitive repeats while keeping first-seen order.
    #[inline]
    pub fn from_points<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut summary = Self::default();
        let mut seen = HashSet::new();
        for candidate in candidates {
            summary.push_point(candidate.as_ref(), &mut seen);
        }
        summary
    }

    fn push_point(&mut self, candidate: &str, seen: &mut HashSet<String>) -> bool {
        let point = candidate.trim();
        if point.is_empty() {
            return false;
        }

        if !seen.insert(point.to_lowercase()) {
            debug!("Dropping duplicate main point: {}", point);
            return false;
        }

        self.points.push(point.to_string());
        true
    }

    #[inline]
    pub fn points(&self) -> &[String] {
        &self.points
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Header plus one bullet per point, or the fixed fallback sentence
    #[inline]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ContextSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.points.is_empty() {
            return f.write_str(NO_CONTEXT);
        }

        write!(f, "{}\n\n", CONTEXT_HEADER)?;
        for (i, point) in self.points.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "• {}", point)?;
        }
        Ok(())
    }
}

/// Extracts one main point per document with a low-temperature generation call
pub struct ContextSummarizer {
    generator: Arc<dyn GenerationProvider>,
}

impl ContextSummarizer {
    #[inline]
    pub fn new(generator: Arc<dyn GenerationProvider>) -> Self {
        Self { generator }
    }

    /// Summarize documents into main points.
    ///
    /// Each extraction is independent: a failing call is logged and the
    /// remaining documents are still processed.
    #[inline]
    pub fn summarize(&self, documents: &[&Document]) -> ContextSummary {
        let mut summary = ContextSummary::default();
        let mut seen = HashSet::new();

        for (index, document) in documents.iter().enumerate() {
            match self.extract_main_point(document) {
                Ok(point) => {
                    summary.push_point(&point, &mut seen);
                }
                Err(e) => {
                    warn!(
                        "Failed to extract main point from document {} ({:?}): {}",
                        index, document.filename, e
                    );
                }
            }
        }

        debug!(
            "Summarized {} documents into {} main points",
            documents.len(),
            summary.points.len()
        );
        summary
    }

    /// Summarize and render in one step
    #[inline]
    pub fn format_context(&self, documents: &[&Document]) -> String {
        self.summarize(documents).render()
    }

    fn extract_main_point(&self, document: &Document) -> crate::Result<String> {
        self.generator.generate(
            EXTRACTION_INSTRUCTION,
            &document.content,
            EXTRACTION_MAX_TOKENS,
            EXTRACTION_TEMPERATURE,
        )
    }
}
