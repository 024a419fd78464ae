// Self-reflection module
// Bounded generate -> score -> improve loop that keeps the best candidate seen


use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::Result;
use crate::pipeline::{DEFAULT_TOP_K, Drafter};
use crate::prompt::{Mode, extract_pitch, improvement_prompt};
use crate::providers::GenerationProvider;
use crate::scoring::{Assessment, QualityScorer};

pub const REVISER_ROLE: &str = "You are a skilled writer who improves text based on feedback.";
pub const REVISION_MAX_TOKENS: u32 = 600;
pub const REVISION_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReflectionConfig {
    /// Minimum score that ends the loop early
    pub threshold: f32,
    /// Total candidates scored, including the first draft
    pub max_attempts: u32,
    /// Documents retrieved for the first draft
    pub top_k: usize,
}

impl Default for ReflectionConfig {
    #[inline]
    fn default() -> Self {
        Self {
            threshold: 7.0,
            max_attempts: 3,
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// One scored candidate
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    pub candidate: String,
    pub score: f32,
    pub rationale: String,
}

impl AttemptRecord {
    fn new(candidate: String, assessment: Assessment) -> Self {
        Self {
            candidate,
            score: assessment.score,
            rationale: assessment.rationale,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// A candidate reached the threshold
    Accepted,
    /// The attempt budget ran out below the threshold
    Exhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReflectionOutcome {
    /// The accepted candidate, or the best one seen when exhausted
    pub best: AttemptRecord,
    /// Number of candidates scored
    pub attempts: u32,
    pub termination: Termination,
}

impl ReflectionOutcome {
    #[inline]
    pub fn accepted(&self) -> bool {
        self.termination == Termination::Accepted
    }
}

enum State {
    Generate,
    Score(String),
    Improve(AttemptRecord),
    Done(Termination),
}

/// Drives drafting, scoring and feedback-conditioned revision.
///
/// Transitions:
/// - `Generate -> Score` after the initial draft
/// - `Score -> Done(Accepted)` when `score >= threshold`
/// - `Score -> Improve` when below threshold with budget left
/// - `Improve -> Score` with the revised text, which is graded against the
///   rubric only and not redrafted from retrieved context
/// - `Score -> Done(Exhausted)` on the last attempt
pub struct SelfReflection {
    drafter: Arc<dyn Drafter>,
    scorer: QualityScorer,
    reviser: Arc<dyn GenerationProvider>,
    config: ReflectionConfig,
}

impl SelfReflection {
    #[inline]
    pub fn new(
        drafter: Arc<dyn Drafter>,
        scorer: QualityScorer,
        reviser: Arc<dyn GenerationProvider>,
        config: ReflectionConfig,
    ) -> Self {
        Self {
            drafter,
            scorer,
            reviser,
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &ReflectionConfig {
        &self.config
    }

    /// Run the loop for one subject text.
    ///
    /// Low scores never produce an error; only provider failures do.
    #[inline]
    pub fn run(&self, subject: &str, mode: Mode) -> Result<ReflectionOutcome> {
        let max_attempts = self.config.max_attempts.max(1);
        let threshold = self.config.threshold;

        info!(
            "Starting self-reflection for {} mode (threshold {:.1}/10, {} attempts)",
            mode, threshold, max_attempts
        );

        let mut attempt: u32 = 0;
        let mut best: Option<AttemptRecord> = None;
        let mut state = State::Generate;

        let termination = loop {
            state = match state {
                State::Generate => {
                    debug!("Attempt {}/{}: drafting", attempt + 1, max_attempts);
                    State::Score(self.drafter.draft(subject, mode)?)
                }
                State::Score(candidate) => {
                    let assessment = self.scorer.score(&candidate, subject, mode)?;
                    let record = AttemptRecord::new(candidate, assessment);
                    info!(
                        "Attempt {}/{} scored {:.1}/10: {}",
                        attempt + 1,
                        max_attempts,
                        record.score,
                        record.rationale
                    );

                    if record.score >= threshold {
                        info!(
                            "Met quality threshold ({:.1}/10) on attempt {}",
                            threshold,
                            attempt + 1
                        );
                        return Ok(ReflectionOutcome {
                            best: record,
                            attempts: attempt + 1,
                            termination: Termination::Accepted,
                        });
                    }

                    if best.as_ref().is_none_or(|b| record.score > b.score) {
                        debug!("New best candidate at attempt {}", attempt + 1);
                        best = Some(record.clone());
                    }

                    if attempt + 1 < max_attempts {
                        State::Improve(record)
                    } else {
                        State::Done(Termination::Exhausted)
                    }
                }
                State::Improve(previous) => {
                    debug!("Revising attempt {} from feedback", attempt + 1);
                    let prompt = improvement_prompt(
                        &previous.candidate,
                        previous.score,
                        &previous.rationale,
                        mode,
                    );
                    let revised = self.reviser.generate(
                        REVISER_ROLE,
                        &prompt,
                        REVISION_MAX_TOKENS,
                        REVISION_TEMPERATURE,
                    )?;
                    attempt += 1;
                    State::Score(extract_pitch(&revised))
                }
                State::Done(termination) => break termination,
            };
        };

        let attempts = attempt + 1;
        let best = best.ok_or_else(|| anyhow::anyhow!("Self-reflection ended without a candidate"))?;
        info!(
            "Self-reflection finished after {} attempts; best score {:.1}/10",
            attempts, best.score
        );

        Ok(ReflectionOutcome {
            best,
            attempts,
            termination,
        })
    }
}

impl Drafter for SelfReflection {
    /// Best candidate of a full reflection run
    #[inline]
    fn draft(&self, subject: &str, mode: Mode) -> Result<String> {
        self.run(subject, mode).map(|outcome| outcome.best.candidate)
    }
}
