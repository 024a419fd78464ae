// Ingestion module
// Builds the persisted vector database from a folder of plain-text documents


use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::providers::EmbeddingProvider;
use crate::store::{Document, VectorStore};
use crate::{PitchError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IngestConfig {
    /// Files estimated above this many tokens are skipped
    pub max_tokens: usize,
}

impl Default for IngestConfig {
    #[inline]
    fn default() -> Self {
        Self { max_tokens: 2000 }
    }
}

/// Counts from one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub embedded: usize,
    pub skipped_too_large: usize,
    pub skipped_duplicate: usize,
    pub failed: usize,
    /// Documents in the saved snapshot
    pub total_documents: usize,
}

/// Rough token estimate for English prose
#[inline]
pub fn estimate_token_count(text: &str) -> usize {
    // ~0.75 words per token, plus a little for punctuation
    let word_count = text.split_whitespace().count();
    let punct_count = text.chars().filter(|c| c.is_ascii_punctuation()).count();

    (punct_count as f64).mul_add(0.1, word_count as f64 / 0.75) as usize
}

/// Identity of a document for duplicate detection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    filename: Option<String>,
    content_hash: [u8; 32],
}

impl DocumentKey {
    #[inline]
    pub fn of(document: &Document) -> Self {
        Self {
            filename: document.filename.clone(),
            content_hash: Sha256::digest(document.content.as_bytes()).into(),
        }
    }
}

/// List `*.txt` files in a folder, sorted by file name
#[inline]
pub fn text_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(folder)? {
        let path = entry?.path();
        let is_text = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
        if is_text && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Builds or extends a vector database snapshot from a folder
pub struct VectorDatabaseBuilder {
    embedder: Arc<dyn EmbeddingProvider>,
    config: IngestConfig,
}

impl VectorDatabaseBuilder {
    #[inline]
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, config: IngestConfig) -> Self {
        Self { embedder, config }
    }

    /// Embed every eligible `.txt` file in `folder` and save the snapshot.
    ///
    /// An existing snapshot at the target paths is loaded first, so only new
    /// documents are embedded. A file that fails to read or embed is logged
    /// and counted without stopping the run.
    #[inline]
    pub fn build(
        &self,
        folder: &Path,
        vector_path: &Path,
        document_path: &Path,
    ) -> Result<IngestReport> {
        if !folder.is_dir() {
            return Err(PitchError::Config(format!(
                "Input folder does not exist: {}",
                folder.display()
            )));
        }

        let mut store = self.open_existing(vector_path, document_path)?;
        let mut seen: HashSet<DocumentKey> = store.documents().iter().map(DocumentKey::of).collect();
        let mut report = IngestReport::default();

        let files = text_files(folder)?;
        info!(
            "Ingesting {} text files from {} ({} documents already stored)",
            files.len(),
            folder.display(),
            store.len()
        );

        let progress = progress_bar(files.len() as u64, "Embedding");

        for path in &files {
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            progress.set_message(filename.clone());

            match self.ingest_file(&mut store, &mut seen, path, filename) {
                Ok(FileOutcome::Embedded) => report.embedded += 1,
                Ok(FileOutcome::TooLarge) => report.skipped_too_large += 1,
                Ok(FileOutcome::Duplicate) => report.skipped_duplicate += 1,
                Err(e) => {
                    error!("Failed to ingest {}: {}", path.display(), e);
                    report.failed += 1;
                }
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        store.save(vector_path, document_path)?;
        report.total_documents = store.len();

        info!(
            "Vector database saved: {} embedded, {} too large, {} duplicates, {} failed, {} total",
            report.embedded,
            report.skipped_too_large,
            report.skipped_duplicate,
            report.failed,
            report.total_documents
        );
        Ok(report)
    }

    fn open_existing(&self, vector_path: &Path, document_path: &Path) -> Result<VectorStore> {
        if vector_path.exists() && document_path.exists() {
            debug!("Extending existing snapshot at {}", vector_path.display());
            VectorStore::load(vector_path, document_path, Arc::clone(&self.embedder))
        } else {
            Ok(VectorStore::new(Arc::clone(&self.embedder)))
        }
    }

    fn ingest_file(
        &self,
        store: &mut VectorStore,
        seen: &mut HashSet<DocumentKey>,
        path: &Path,
        filename: String,
    ) -> Result<FileOutcome> {
        let content = fs::read_to_string(path)?;

        let tokens = estimate_token_count(&content);
        if tokens > self.config.max_tokens {
            warn!(
                "Skipping {}: {} tokens (exceeds {} limit)",
                filename, tokens, self.config.max_tokens
            );
            return Ok(FileOutcome::TooLarge);
        }

        let document = Document::named(filename, content);
        let key = DocumentKey::of(&document);
        if seen.contains(&key) {
            debug!("Skipping cached: {:?}", document.filename);
            return Ok(FileOutcome::Duplicate);
        }

        debug!("Embedding: {:?} ({} tokens)", document.filename, tokens);
        store.insert(document)?;
        seen.insert(key);
        Ok(FileOutcome::Embedded)
    }
}

enum FileOutcome {
    Embedded,
    TooLarge,
    Duplicate,
}

/// Counter bar on an attended terminal, hidden otherwise
pub(crate) fn progress_bar(len: u64, label: &str) -> ProgressBar {
    if console::user_attended_stderr() {
        ProgressBar::new(len).with_style(
            ProgressStyle::with_template(&format!("{{spinner}} [{{pos}}/{{len}}] {} {{msg}}", label))
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        )
    } else {
        ProgressBar::hidden()
    }
}
