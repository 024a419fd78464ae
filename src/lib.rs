use thiserror::Error;

pub type Result<T> = std::result::Result<T, PitchError>;

#[derive(Error, Debug)]
pub enum PitchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load vector store: {0}")]
    StoreLoad(String),

    #[error("Failed to save vector store: {0}")]
    StoreSave(String),

    #[error("Vector store is empty, nothing to retrieve")]
    EmptyStore,

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Invalid mode: {0} (expected one of general, investor, conference)")]
    InvalidMode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod batch;
pub mod commands;
pub mod config;
pub mod front_matter;
pub mod ingest;
pub mod pipeline;
pub mod prompt;
pub mod providers;
pub mod reflection;
pub mod scoring;
pub mod store;
pub mod summarizer;
