// Prompt builder module
// Audience modes, the step-by-step rewrite templates and the pitch quoting convention


pub mod baseline;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::PitchError;

/// Version of the templates below. The scoring rubrics assume the same
/// four-step ordering, so bump both together.
pub const TEMPLATE_VERSION: u32 = 2;

/// Delimiter the model is asked to wrap its final pitch in
pub const PITCH_DELIMITER: &str = "'''";

pub const WORD_LIMIT: usize = 100;

pub const STORYTELLER_ROLE: &str = "You are a storytelling assistant that enhances technical abstracts \
for specific audiences while maintaining technical accuracy.";

/// Target audience of a rewrite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    General,
    Investor,
    Conference,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::General, Mode::Investor, Mode::Conference];

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Mode::General => "general",
            Mode::Investor => "investor",
            Mode::Conference => "conference",
        }
    }

    /// Mode-specific instruction body
    #[inline]
    pub const fn instruction(self) -> &'static str {
        match self {
            Mode::General => GENERAL_INSTRUCTION,
            Mode::Investor => INVESTOR_INSTRUCTION,
            Mode::Conference => CONFERENCE_INSTRUCTION,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = PitchError;

    /// Accepts the mode names in any case; anything else is rejected
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| PitchError::InvalidMode(s.to_string()))
    }
}

const GENERAL_INSTRUCTION: &str = "\
Rewrite this project description so it is engaging and accessible to a broad audience.
Work through the following points in order:
1. First, describe the core problem the project addresses. Who is affected by it, how many people, and how deeply?
2. Next, explain the key innovation at the center of the project. How does it tackle the problem, and what sets it apart from other possible solutions?
3. Finally, explain the impact of the solution. How much of the problem would be solved, for how many people, and to what degree?
Once every point has been considered, combine them into one clear and concise narrative.

The final pitch must be wrapped in ''' ''' and must be within 100 words.";

const INVESTOR_INSTRUCTION: &str = "\
You are a professional pitch writer helping technical founders tell compelling stories to investors.
Work through the structure step by step:
1. First, outline the problem and the market opportunity. Why does the problem exist, what does it mean for the people who have it, how many of them are there, and how badly are they affected?
2. Next, explain the solution and why it is innovative. How does it solve the problem, what about it is novel, and why is it better than competing solutions?
3. Then, describe the technical edge. What makes the solution hard to copy, and how will it stay ahead?
4. Finally, describe the impact and the business potential. Call back to the size of the problem and explain how the solution can be monetized.
Once all four steps are considered, combine them clearly and concisely into a project pitch.

The final pitch must be wrapped in ''' ''' and must be within 100 words.";

const CONFERENCE_INSTRUCTION: &str = "\
Rewrite the project description into a strong academic abstract that would appeal to top-tier ML and robotics conferences.
Address the following in order:
1. First, state the problem or research question. Why does it need solving, and how do we know it has not been solved already?
2. Next, explain what is innovative about the work. What methodology was used, and what makes it a new addition to the field?
3. Then, summarize the results. How do they move the current state of the field, and what conclusions can be drawn?
4. Finally, consider limitations and future work. Which technical challenges and constraints applied, and which open questions do the results raise?
Once all points are considered, combine them into one clear and concise abstract.

The final pitch must be wrapped in ''' ''' and must be within 100 words.";

/// Assemble the rewrite prompt from the context block, the text to rewrite
/// and the mode's instruction.
#[inline]
pub fn build_prompt(context: &str, subject: &str, mode: Mode) -> String {
    format!(
        "Background Context:\n\
         ---------------------\n\
         {context}\n\
         ---------------------\n\
         \n\
         Project Description:\n\
         {subject}\n\
         \n\
         Task:\n\
         {instruction}\n",
        context = context.trim(),
        subject = subject.trim(),
        instruction = mode.instruction(),
    )
}

/// Prompt asking the model to revise a scored candidate using its critique
#[inline]
pub fn improvement_prompt(previous: &str, score: f32, rationale: &str, mode: Mode) -> String {
    format!(
        "Your previous attempt received a score of {score:.1}/10 with this feedback:\n\
         {rationale}\n\
         \n\
         Improve the text so it addresses this feedback. Keep the same audience ({mode}) \
         and preserve the core message. The improved version must be within {WORD_LIMIT} words \
         and wrapped in {PITCH_DELIMITER} {PITCH_DELIMITER}.\n\
         \n\
         Previous version:\n\
         {previous}\n",
        rationale = rationale.trim(),
        previous = previous.trim(),
    )
}

/// Text between the first pair of pitch delimiters, if there is one
#[inline]
pub fn extract_quoted(text: &str) -> Option<&str> {
    let start = text.find(PITCH_DELIMITER)? + PITCH_DELIMITER.len();
    let rest = text.get(start..)?;
    let end = rest.find(PITCH_DELIMITER)?;
    let quoted = rest.get(..end)?.trim();
    (!quoted.is_empty()).then_some(quoted)
}

/// Strip any preamble around a delimited pitch, falling back to the whole
/// trimmed response when the model ignored the convention.
#[inline]
pub fn extract_pitch(text: &str) -> String {
    extract_quoted(text).unwrap_or_else(|| text.trim()).to_string()
}
