// Vector store module
// In-memory documents with index-aligned embeddings, cosine ranking and snapshot persistence

#[cfg(test)]
mod tests;

pub mod snapshot;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::providers::EmbeddingProvider;
use crate::{PitchError, Result};

/// A stored text and the file it came from, if any
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub filename: Option<String>,
    pub content: String,
}

impl Document {
    #[inline]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            filename: None,
            content: content.into(),
        }
    }

    #[inline]
    pub fn named(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            content: content.into(),
        }
    }
}

/// One retrieval hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Retrieved<'a> {
    pub document: &'a Document,
    pub similarity: f32,
    /// Insertion index of the document in the store
    pub index: usize,
}

/// Vector database holding documents and their embeddings as parallel arrays.
///
/// `documents[i]` is always embedded by `embeddings[i]`; every mutation
/// appends to both or to neither.
pub struct VectorStore {
    documents: Vec<Document>,
    embeddings: Vec<Vec<f32>>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl std::fmt::Debug for VectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStore")
            .field("documents", &self.documents.len())
            .field("dimension", &self.dimension())
            .finish_non_exhaustive()
    }
}

impl VectorStore {
    /// Create an empty store
    #[inline]
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            documents: Vec::new(),
            embeddings: Vec::new(),
            embedder,
        }
    }

    /// Build a store from already-embedded collections.
    ///
    /// # Errors
    /// [`PitchError::StoreLoad`] when the two collections differ in length
    /// or the embeddings differ in width.
    #[inline]
    pub fn from_parts(
        documents: Vec<Document>,
        embeddings: Vec<Vec<f32>>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        if documents.len() != embeddings.len() {
            return Err(PitchError::StoreLoad(format!(
                "{} documents but {} embeddings",
                documents.len(),
                embeddings.len()
            )));
        }

        let dimension = embeddings.first().map_or(0, Vec::len);
        if let Some(row) = embeddings.iter().position(|row| row.len() != dimension) {
            return Err(PitchError::StoreLoad(format!(
                "Embedding {} has {} dimensions, expected {}",
                row,
                embeddings[row].len(),
                dimension
            )));
        }

        Ok(Self {
            documents,
            embeddings,
            embedder,
        })
    }

    /// Load a persisted snapshot.
    ///
    /// # Errors
    /// [`PitchError::StoreLoad`] if either file is missing or unreadable, or
    /// if the two files hold a different number of entries.
    #[inline]
    pub fn load(
        vector_path: &Path,
        document_path: &Path,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        debug!(
            "Loading vector store from {} and {}",
            vector_path.display(),
            document_path.display()
        );

        let embeddings = snapshot::read_vectors(vector_path)?;
        let documents = snapshot::read_documents(document_path)?;
        let store = Self::from_parts(documents, embeddings, embedder)?;

        info!("Loaded vector store with {} documents", store.len());
        Ok(store)
    }

    /// Persist both collections.
    #[inline]
    pub fn save(&self, vector_path: &Path, document_path: &Path) -> Result<()> {
        snapshot::write_vectors(vector_path, &self.embeddings)?;
        snapshot::write_documents(document_path, &self.documents)?;

        info!(
            "Saved vector store with {} documents to {}",
            self.len(),
            vector_path.display()
        );
        Ok(())
    }

    /// Embed and append a document without a filename
    #[inline]
    pub fn add_document(&mut self, text: &str) -> Result<()> {
        self.insert(Document::new(text))
    }

    /// Embed and append a document. No deduplication happens here.
    #[inline]
    pub fn insert(&mut self, document: Document) -> Result<()> {
        let embedding = self.embedder.embed(&document.content)?;
        self.insert_embedded(document, embedding)
    }

    /// Embed every `.txt` file in `folder`, in filename order.
    ///
    /// Stops at the first failing file; use the ingest builder for
    /// resilient bulk loading.
    #[inline]
    pub fn add_documents_from_folder(&mut self, folder: &Path) -> Result<usize> {
        let files = crate::ingest::text_files(folder)?;
        for path in &files {
            let content = std::fs::read_to_string(path)?;
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.insert(Document::named(filename, content))?;
        }
        info!("Added {} documents from {}", files.len(), folder.display());
        Ok(files.len())
    }

    /// Append a document whose embedding is already known.
    ///
    /// # Errors
    /// [`PitchError::Embedding`] when the embedding width differs from the
    /// vectors already stored; nothing is appended in that case.
    #[inline]
    pub fn insert_embedded(&mut self, document: Document, embedding: Vec<f32>) -> Result<()> {
        self.check_dimension(embedding.len(), "document")?;
        debug!(
            "Adding document {:?} ({} dimensions)",
            document.filename,
            embedding.len()
        );
        self.documents.push(document);
        self.embeddings.push(embedding);
        Ok(())
    }

    fn check_dimension(&self, width: usize, what: &str) -> Result<()> {
        match self.dimension() {
            Some(expected) if expected != width => Err(PitchError::Embedding(format!(
                "{} embedding has {} dimensions but the store holds {}",
                what, width, expected
            ))),
            _ => Ok(()),
        }
    }

    /// Return the `k` documents most similar to `query`, most similar first.
    ///
    /// Ties keep insertion order. When `k` exceeds the store size every
    /// document is returned.
    ///
    /// # Errors
    /// [`PitchError::EmptyStore`] when no documents are loaded, the
    /// embedding provider's error, or [`PitchError::Embedding`] when the
    /// query embedding width differs from the stored vectors.
    #[inline]
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<&Document>> {
        Ok(self
            .retrieve_scored(query, k)?
            .into_iter()
            .map(|hit| hit.document)
            .collect())
    }

    /// Like [`VectorStore::retrieve`] but keeps the similarity of each hit
    #[inline]
    pub fn retrieve_scored(&self, query: &str, k: usize) -> Result<Vec<Retrieved<'_>>> {
        if self.is_empty() {
            return Err(PitchError::EmptyStore);
        }

        let query_embedding = self.embedder.embed(query)?;
        self.check_dimension(query_embedding.len(), "query")?;
        let hits = self.rank(&query_embedding, k);

        debug!(
            "Retrieved {} of {} documents (best similarity: {:?})",
            hits.len(),
            self.len(),
            hits.first().map(|hit| hit.similarity)
        );
        Ok(hits)
    }

    /// Rank stored documents against an already-computed query embedding.
    ///
    /// No width check happens here; mismatched rows score 0.0.
    #[inline]
    pub fn rank(&self, query_embedding: &[f32], k: usize) -> Vec<Retrieved<'_>> {
        let mut scored: Vec<(usize, f32)> = self
            .embeddings
            .iter()
            .enumerate()
            .map(|(index, embedding)| (index, cosine_similarity(query_embedding, embedding)))
            .collect();

        // Stable sort keeps insertion order among equal similarities
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        scored
            .into_iter()
            .map(|(index, similarity)| Retrieved {
                document: &self.documents[index],
                similarity,
                index,
            })
            .collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    #[inline]
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    #[inline]
    pub fn embeddings(&self) -> &[Vec<f32>] {
        &self.embeddings
    }

    /// Dimension of the first stored embedding
    #[inline]
    pub fn dimension(&self) -> Option<usize> {
        self.embeddings.first().map(Vec::len)
    }
}

/// Cosine similarity `(a·b)/(|a||b|)`.
///
/// Returns 0.0 for vectors of different length or with zero norm.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b).fold(
        (0.0_f64, 0.0_f64, 0.0_f64),
        |(dot, norm_a, norm_b), (&x, &y)| {
            let (x, y) = (f64::from(x), f64::from(y));
            (x.mul_add(y, dot), x.mul_add(x, norm_a), y.mul_add(y, norm_b))
        },
    );

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator == 0.0 {
        return 0.0;
    }

    (dot / denominator) as f32
}
