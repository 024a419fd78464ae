// Quality scoring module
// Grades a candidate pitch against a per-mode rubric using the generation model as reviewer


use serde_json::Value;
use std::fmt::Write as _;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::Result;
use crate::prompt::Mode;
use crate::providers::GenerationProvider;

pub const SCORING_MAX_TOKENS: u32 = 300;
pub const SCORING_TEMPERATURE: f32 = 0.3;
pub const MAX_SCORE: f32 = 10.0;

/// Rationale reported when the reviewer's answer could not be parsed
pub const PARSE_ERROR_RATIONALE: &str = "parse error";

/// One weighted aspect of a rubric
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Criterion {
    pub name: &'static str,
    pub question: &'static str,
    pub weight: f32,
}

const fn criterion(name: &'static str, question: &'static str, weight: f32) -> Criterion {
    Criterion {
        name,
        question,
        weight,
    }
}

const GENERAL_RUBRIC: [Criterion; 4] = [
    criterion(
        "Clarity",
        "Is it easy to understand for a general audience?",
        0.3,
    ),
    criterion(
        "Fidelity",
        "Does it accurately reflect the core message of the original abstract?",
        0.3,
    ),
    criterion(
        "Narrative flow",
        "Does it tell an engaging story that reads naturally?",
        0.25,
    ),
    criterion(
        "Length",
        "Is it concise and within the requested length?",
        0.15,
    ),
];

const INVESTOR_RUBRIC: [Criterion; 4] = [
    criterion(
        "Value proposition",
        "Are the value proposition and market opportunity clear?",
        0.3,
    ),
    criterion(
        "Business potential",
        "Is the business potential and scalability compelling?",
        0.25,
    ),
    criterion(
        "Competitive edge",
        "Are the technical innovation and competitive advantage convincing?",
        0.25,
    ),
    criterion(
        "Tone",
        "Is the tone professional and investor friendly?",
        0.2,
    ),
];

const CONFERENCE_RUBRIC: [Criterion; 4] = [
    criterion(
        "Rigor",
        "Is it technically accurate and scientifically rigorous?",
        0.3,
    ),
    criterion(
        "Contribution",
        "Is the contribution to the field clearly stated?",
        0.3,
    ),
    criterion(
        "Academic tone",
        "Does it use proper academic tone and terminology?",
        0.2,
    ),
    criterion(
        "Coverage",
        "Does it cover the methodology and results?",
        0.2,
    ),
];

/// Rubric for a mode. Criteria follow the step order of the mode's template.
#[inline]
pub const fn rubric(mode: Mode) -> &'static [Criterion; 4] {
    match mode {
        Mode::General => &GENERAL_RUBRIC,
        Mode::Investor => &INVESTOR_RUBRIC,
        Mode::Conference => &CONFERENCE_RUBRIC,
    }
}

/// A parsed grade
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub score: f32,
    pub rationale: String,
}

impl Assessment {
    /// Zero score used when the reviewer's answer is unusable
    #[inline]
    pub fn parse_failure() -> Self {
        Self {
            score: 0.0,
            rationale: PARSE_ERROR_RATIONALE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScoreParseError {
    #[error("no JSON object in response")]
    NoJsonObject,
    #[error("invalid JSON: {0}")]
    InvalidJson(String),
    #[error("missing or mistyped field '{0}'")]
    MissingField(&'static str),
    #[error("score {0} is outside 0..=10")]
    OutOfRange(f64),
}

/// Result of asking the reviewer for a grade.
///
/// Keeps "low score" distinguishable from "unreadable answer" while
/// [`ScoreOutcome::into_assessment`] applies the degrade-to-zero policy.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreOutcome {
    Scored(Assessment),
    Unparseable { raw: String, error: ScoreParseError },
}

impl ScoreOutcome {
    #[inline]
    pub fn into_assessment(self) -> Assessment {
        match self {
            ScoreOutcome::Scored(assessment) => assessment,
            ScoreOutcome::Unparseable { .. } => Assessment::parse_failure(),
        }
    }

    #[inline]
    pub fn is_parsed(&self) -> bool {
        matches!(self, ScoreOutcome::Scored(_))
    }
}

/// Parse `{"score": <number>, "explanation": "<text>"}` out of a reviewer
/// response, ignoring any text around the object.
///
/// Each `{` is tried as the start of a JSON value and the first object
/// carrying both fields wins, so braces in surrounding prose are skipped.
#[inline]
pub fn parse_assessment(response: &str) -> std::result::Result<Assessment, ScoreParseError> {
    let last_close = response.rfind('}').ok_or(ScoreParseError::NoJsonObject)?;
    let mut rejected = None;
    let mut invalid = None;

    for (start, _) in response
        .match_indices('{')
        .take_while(|(start, _)| *start < last_close)
    {
        let Some(rest) = response.get(start..) else {
            continue;
        };
        match serde_json::Deserializer::from_str(rest)
            .into_iter::<Value>()
            .next()
        {
            Some(Ok(value)) => match assessment_from(&value) {
                Ok(assessment) => return Ok(assessment),
                Err(error) => {
                    rejected.get_or_insert(error);
                }
            },
            Some(Err(e)) => {
                invalid.get_or_insert_with(|| e.to_string());
            }
            None => {}
        }
    }

    Err(rejected
        .or_else(|| invalid.map(ScoreParseError::InvalidJson))
        .unwrap_or(ScoreParseError::NoJsonObject))
}

fn assessment_from(value: &Value) -> std::result::Result<Assessment, ScoreParseError> {
    let score = value
        .get("score")
        .and_then(Value::as_f64)
        .ok_or(ScoreParseError::MissingField("score"))?;

    if !score.is_finite() || !(0.0..=f64::from(MAX_SCORE)).contains(&score) {
        return Err(ScoreParseError::OutOfRange(score));
    }

    let rationale = value
        .get("explanation")
        .or_else(|| value.get("rationale"))
        .and_then(Value::as_str)
        .ok_or(ScoreParseError::MissingField("explanation"))?;

    Ok(Assessment {
        score: score as f32,
        rationale: rationale.trim().to_string(),
    })
}

/// Build the reviewer prompt for a candidate
#[inline]
pub fn rubric_prompt(candidate: &str, original: &str, mode: Mode) -> String {
    let mut criteria = String::new();
    for (i, criterion) in rubric(mode).iter().enumerate() {
        let _ = writeln!(
            criteria,
            "{}. {} (weight {:.0}%): {}",
            i + 1,
            criterion.name,
            criterion.weight * 100.0,
            criterion.question
        );
    }

    format!(
        "You are an expert reviewer evaluating a rewritten abstract for a {mode} audience. \
         Assess its quality against these weighted criteria:\n\
         {criteria}\n\
         Original abstract:\n\
         {original}\n\
         \n\
         Generated version:\n\
         {candidate}\n\
         \n\
         Give a score from 0 to 10 and briefly explain your reasoning. Respond only with JSON:\n\
         {{\"score\": <float>, \"explanation\": \"<text>\"}}\n",
        original = original.trim(),
        candidate = candidate.trim(),
    )
}

/// Grades candidates with the generation provider acting as reviewer
pub struct QualityScorer {
    generator: Arc<dyn GenerationProvider>,
}

impl QualityScorer {
    #[inline]
    pub fn new(generator: Arc<dyn GenerationProvider>) -> Self {
        Self { generator }
    }

    /// Ask for a grade and keep parse failures visible.
    ///
    /// # Errors
    /// Only transport or provider failures; unreadable answers are
    /// [`ScoreOutcome::Unparseable`].
    #[inline]
    pub fn evaluate(&self, candidate: &str, original: &str, mode: Mode) -> Result<ScoreOutcome> {
        let prompt = rubric_prompt(candidate, original, mode);
        let response =
            self.generator
                .generate("", &prompt, SCORING_MAX_TOKENS, SCORING_TEMPERATURE)?;

        match parse_assessment(&response) {
            Ok(assessment) => {
                debug!("Reviewer scored {:.1}/10", assessment.score);
                Ok(ScoreOutcome::Scored(assessment))
            }
            Err(error) => {
                warn!("Could not parse reviewer response ({}): {}", error, response);
                Ok(ScoreOutcome::Unparseable {
                    raw: response,
                    error,
                })
            }
        }
    }

    /// Grade a candidate, degrading unreadable answers to `(0.0, "parse error")`
    #[inline]
    pub fn score(&self, candidate: &str, original: &str, mode: Mode) -> Result<Assessment> {
        self.evaluate(candidate, original, mode)
            .map(ScoreOutcome::into_assessment)
    }
}
