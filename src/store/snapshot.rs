//! On-disk form of the vector database.
//!
//! Embeddings are a bincode-encoded dense matrix (one row per document, in
//! document order). Documents are a JSON array of `{filename, content}`.

use bincode::config::standard as bincode_config;
use bincode::{Decode, Encode, decode_from_slice, encode_to_vec};
use std::fs;
use std::path::Path;
use tracing::debug;

use super::Document;
use crate::{PitchError, Result};

/// Bumped whenever the matrix layout changes
pub const MATRIX_VERSION: u32 = 1;

#[derive(Debug, Encode, Decode)]
struct VectorMatrix {
    version: u32,
    dimension: u32,
    rows: Vec<Vec<f32>>,
}

/// Read the embedding matrix, checking that every row has the same width.
#[inline]
pub fn read_vectors(path: &Path) -> Result<Vec<Vec<f32>>> {
    let bytes = fs::read(path).map_err(|e| {
        PitchError::StoreLoad(format!("Failed to read vectors {}: {}", path.display(), e))
    })?;

    let (matrix, _): (VectorMatrix, usize) = decode_from_slice(&bytes, bincode_config())
        .map_err(|e| {
            PitchError::StoreLoad(format!("Failed to decode vectors {}: {}", path.display(), e))
        })?;

    if matrix.version != MATRIX_VERSION {
        return Err(PitchError::StoreLoad(format!(
            "Unsupported vector file version {} (expected {})",
            matrix.version, MATRIX_VERSION
        )));
    }

    if let Some(row) = matrix
        .rows
        .iter()
        .position(|row| row.len() != matrix.dimension as usize)
    {
        return Err(PitchError::StoreLoad(format!(
            "Row {} has {} dimensions, expected {}",
            row,
            matrix.rows[row].len(),
            matrix.dimension
        )));
    }

    debug!(
        "Read {} vectors of dimension {}",
        matrix.rows.len(),
        matrix.dimension
    );
    Ok(matrix.rows)
}

/// Write the embedding matrix, creating parent directories.
///
/// # Errors
/// Rows of differing width are rejected instead of written.
#[inline]
pub fn write_vectors(path: &Path, rows: &[Vec<f32>]) -> Result<()> {
    let dimension = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != dimension) {
        return Err(PitchError::StoreSave(format!(
            "Embeddings have inconsistent dimensions in {}",
            path.display()
        )));
    }

    let matrix = VectorMatrix {
        version: MATRIX_VERSION,
        dimension: u32::try_from(dimension)
            .map_err(|_| PitchError::StoreSave(format!("Dimension {} too large", dimension)))?,
        rows: rows.to_vec(),
    };

    let bytes = encode_to_vec(&matrix, bincode_config())
        .map_err(|e| PitchError::StoreSave(format!("Failed to encode vectors: {}", e)))?;

    ensure_parent(path)?;
    fs::write(path, bytes)?;
    Ok(())
}

#[inline]
pub fn read_documents(path: &Path) -> Result<Vec<Document>> {
    let content = fs::read_to_string(path).map_err(|e| {
        PitchError::StoreLoad(format!(
            "Failed to read documents {}: {}",
            path.display(),
            e
        ))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        PitchError::StoreLoad(format!(
            "Failed to parse documents {}: {}",
            path.display(),
            e
        ))
    })
}

#[inline]
pub fn write_documents(path: &Path, documents: &[Document]) -> Result<()> {
    let content = serde_json::to_string_pretty(documents)
        .map_err(|e| anyhow::anyhow!("Failed to serialize documents: {}", e))?;

    ensure_parent(path)?;
    fs::write(path, content)?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
