// Batch generation module
// Rewrites every sample for every mode and writes one file per pair


use itertools::Itertools;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::Result;
use crate::ingest::{progress_bar, text_files};
use crate::pipeline::Drafter;
use crate::prompt::Mode;

/// One input text, trimmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub filename: String,
    pub content: String,
}

impl Sample {
    /// File name without extension
    #[inline]
    pub fn stem(&self) -> &str {
        Path::new(&self.filename)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.filename)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub written: usize,
    pub failed: usize,
}

/// Read every `.txt` sample in a folder, in filename order
#[inline]
pub fn read_samples(folder: &Path) -> Result<Vec<Sample>> {
    text_files(folder)?
        .into_iter()
        .map(|path| {
            let content = fs::read_to_string(&path)?;
            Ok(Sample {
                filename: path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                content: content.trim().to_string(),
            })
        })
        .collect()
}

/// `<output_dir>/<mode>/<stem>_<mode>.txt`
#[inline]
pub fn output_path(output_dir: &Path, stem: &str, mode: Mode) -> PathBuf {
    output_dir
        .join(mode.as_str())
        .join(format!("{stem}_{mode}.txt"))
}

/// Draft every sample in every mode.
///
/// A failed pair is logged and counted; the rest of the batch continues.
#[inline]
pub fn generate_pitches(
    samples: &[Sample],
    modes: &[Mode],
    output_dir: &Path,
    drafter: &dyn Drafter,
) -> Result<BatchReport> {
    for mode in modes {
        fs::create_dir_all(output_dir.join(mode.as_str()))?;
    }

    let pairs = samples.iter().cartesian_product(modes.iter().copied()).collect_vec();
    info!(
        "Generating {} pitches ({} samples x {} modes)",
        pairs.len(),
        samples.len(),
        modes.len()
    );

    let progress = progress_bar(pairs.len() as u64, "Drafting");
    let mut report = BatchReport::default();

    for (sample, mode) in pairs {
        progress.set_message(format!("{} ({})", sample.filename, mode));

        let written = drafter.draft(&sample.content, mode).and_then(|pitch| {
            let path = output_path(output_dir, sample.stem(), mode);
            fs::write(&path, pitch)?;
            Ok(path)
        });

        match written {
            Ok(path) => {
                info!("Wrote {}", path.display());
                report.written += 1;
            }
            Err(e) => {
                error!("Failed {} pitch for {}: {}", mode, sample.filename, e);
                report.failed += 1;
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    Ok(report)
}
