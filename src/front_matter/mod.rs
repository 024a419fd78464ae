// Front-matter extraction
// Splits paper text into the title block and the abstract

#[cfg(test)]
mod tests;

use fancy_regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{error, info, warn};

use crate::Result;
use crate::ingest::text_files;

pub const SUMMARY_FILE_NAME: &str = "front_matter_summary.json";

static ABSTRACT_HEADING: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(r"(?m)^[ \t]*(?:\d+\.?[ \t]*)?(?:Abstract|ABSTRACT)\b[:.]?\s*")
});

static SECTION_BREAK: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(
        r"\n[ \t]*(?:\d+\.?[ \t]*)?(?:Introduction|INTRODUCTION|Background|Related Work)[ \t]*\r?\n|\n(?:Keywords|Index Terms)[:.]|\n\d+\.\s",
    )
});

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            error!("Invalid front-matter pattern {}: {}", pattern, e);
            None
        }
    }
}

/// Title block and abstract of one paper
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    /// Everything before the abstract heading
    pub front_matter: String,
    /// Empty when no abstract heading was found
    pub abstract_text: String,
}

/// Split a paper into front matter and abstract.
///
/// Without an abstract heading the whole text is returned as front matter.
#[inline]
pub fn extract_front_matter(text: &str) -> FrontMatter {
    let heading = ABSTRACT_HEADING
        .as_ref()
        .and_then(|regex| regex.find(text).ok().flatten());

    let Some(heading) = heading else {
        return FrontMatter {
            front_matter: text.to_string(),
            abstract_text: String::new(),
        };
    };

    let body = text.get(heading.end()..).unwrap_or_default();
    let end = SECTION_BREAK
        .as_ref()
        .and_then(|regex| regex.find(body).ok().flatten())
        .map_or(body.len(), |m| m.start());

    FrontMatter {
        front_matter: text.get(..heading.start()).unwrap_or_default().trim().to_string(),
        abstract_text: body.get(..end).unwrap_or_default().trim().to_string(),
    }
}

/// Summary entry for one processed file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrontMatterRecord {
    pub filename: String,
    pub front_matter: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatterReport {
    pub records: Vec<FrontMatterRecord>,
    pub failed: usize,
}

/// Per-file output path: `<output>/<stem>_front_matter.txt`
#[inline]
pub fn output_path(output: &Path, source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.join(format!("{stem}_front_matter.txt"))
}

#[inline]
pub fn render(front_matter: &FrontMatter) -> String {
    format!(
        "=== FRONT MATTER ===\n\n{}\n\n=== ABSTRACT ===\n\n{}",
        front_matter.front_matter, front_matter.abstract_text
    )
}

/// Extract front matter from every `.txt` file in `input` into `output`,
/// then write `front_matter_summary.json` with all successful records.
#[inline]
pub fn process_document_folder(input: &Path, output: &Path) -> Result<FrontMatterReport> {
    fs::create_dir_all(output)?;

    let mut report = FrontMatterReport::default();
    for path in text_files(input)? {
        match process_document(&path, output) {
            Ok(record) => {
                info!("Extracted front matter from {}", record.filename);
                report.records.push(record);
            }
            Err(e) => {
                warn!("Failed to process {}: {}", path.display(), e);
                report.failed += 1;
            }
        }
    }

    let summary = serde_json::to_string_pretty(&report.records)
        .map_err(|e| anyhow::anyhow!("Failed to serialize front-matter summary: {}", e))?;
    fs::write(output.join(SUMMARY_FILE_NAME), summary)?;

    info!(
        "Processed {} documents ({} failed); results saved to {}",
        report.records.len(),
        report.failed,
        output.display()
    );
    Ok(report)
}

fn process_document(path: &Path, output: &Path) -> Result<FrontMatterRecord> {
    let content = fs::read_to_string(path)?;
    let extracted = extract_front_matter(&content);
    fs::write(output_path(output, path), render(&extracted))?;

    Ok(FrontMatterRecord {
        filename: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        front_matter: extracted.front_matter,
        abstract_text: extracted.abstract_text,
    })
}
