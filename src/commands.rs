use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::batch::{self, BatchReport};
use crate::config::Config;
use crate::front_matter;
use crate::ingest::VectorDatabaseBuilder;
use crate::pipeline::{Drafter, StoryPipeline};
use crate::prompt::Mode;
use crate::prompt::baseline::BaselineDrafter;
use crate::providers::OllamaClient;
use crate::reflection::SelfReflection;
use crate::scoring::QualityScorer;
use crate::store::VectorStore;

/// Embed a folder of `.txt` documents into the configured snapshot
#[inline]
pub fn build_database(folder: &Path) -> Result<()> {
    let config = Config::load_default().context("Failed to load configuration")?;
    let client = Arc::new(OllamaClient::new(&config.ollama)?);

    let report = VectorDatabaseBuilder::new(client, config.ingest.clone()).build(
        folder,
        &config.vector_path(),
        &config.document_path(),
    )?;

    println!("Vector database built:");
    println!("  Embedded: {}", report.embedded);
    println!("  Skipped (too large): {}", report.skipped_too_large);
    println!("  Skipped (already stored): {}", report.skipped_duplicate);
    println!("  Failed: {}", report.failed);
    println!("  Total documents: {}", report.total_documents);
    Ok(())
}

/// Rewrite one text file for a mode and print the result
#[inline]
pub fn generate(file: &Path, mode: Mode, top_k: Option<usize>, reflect: bool) -> Result<()> {
    let config = Config::load_default().context("Failed to load configuration")?;
    let subject = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let client = Arc::new(OllamaClient::new(&config.ollama)?);
    let top_k = top_k.unwrap_or(config.reflection.top_k);
    let pipeline =
        StoryPipeline::new(open_store(&config, &client)?, Arc::<OllamaClient>::clone(&client)).with_top_k(top_k);

    if reflect {
        let outcome = reflection(&config, pipeline, &client).run(subject.trim(), mode)?;
        println!("{}", outcome.best.candidate);
        println!();
        println!(
            "Score: {:.1}/10 after {} attempt(s) ({})",
            outcome.best.score,
            outcome.attempts,
            if outcome.accepted() {
                "accepted"
            } else {
                "best of budget"
            }
        );
        println!("Feedback: {}", outcome.best.rationale);
    } else {
        println!("{}", pipeline.draft(subject.trim(), mode)?);
    }
    Ok(())
}

/// Rewrite every sample in `folder` for every mode into `output`
#[inline]
pub fn batch(folder: &Path, output: &Path, baseline: bool, reflect: bool) -> Result<()> {
    let config = Config::load_default().context("Failed to load configuration")?;
    let client = Arc::new(OllamaClient::new(&config.ollama)?);
    let samples = batch::read_samples(folder)?;

    if samples.is_empty() {
        warn!("No .txt samples found in {}", folder.display());
    }

    let drafter: Box<dyn Drafter> = if baseline {
        info!("Using baseline prompts without retrieval");
        Box::new(BaselineDrafter::new(client))
    } else {
        let pipeline = StoryPipeline::new(open_store(&config, &client)?, Arc::<OllamaClient>::clone(&client))
            .with_top_k(config.reflection.top_k);
        if reflect {
            Box::new(reflection(&config, pipeline, &client))
        } else {
            Box::new(pipeline)
        }
    };

    let BatchReport { written, failed } =
        batch::generate_pitches(&samples, &Mode::ALL, output, drafter.as_ref())?;

    println!("Batch complete: {} written, {} failed", written, failed);
    println!("Outputs saved to {}", output.display());
    Ok(())
}

/// Split papers into front matter and abstract files
#[inline]
pub fn extract_front_matter(input: &Path, output: &Path) -> Result<()> {
    let report = front_matter::process_document_folder(input, output)?;
    println!(
        "Processed {} documents ({} failed). Results saved to {}",
        report.records.len(),
        report.failed,
        output.display()
    );
    Ok(())
}

/// Report configuration, Ollama reachability and snapshot state
#[inline]
pub fn show_status() -> Result<()> {
    let config = Config::load_default().unwrap_or_default();

    println!("📊 Pitch RAG Status Report");
    println!("{}", "=".repeat(50));
    println!();

    println!("🤖 Ollama Status:");
    match OllamaClient::new(&config.ollama) {
        Ok(client) => match client.health_check() {
            Ok(()) => {
                println!(
                    "   ✅ Ollama: Connected ({}:{})",
                    config.ollama.host, config.ollama.port
                );
                println!("   📋 Embedding Model: {}", config.ollama.embedding_model);
                println!("   📋 Generation Model: {}", config.ollama.generation_model);
            }
            Err(e) => println!("   ⚠️  Ollama: Connected but unhealthy - {:#}", e),
        },
        Err(e) => println!("   ❌ Ollama: Failed to connect - {:#}", e),
    }

    println!();
    println!("🔍 Vector Database Status:");
    let vector_path = config.vector_path();
    let document_path = config.document_path();
    if vector_path.exists() && document_path.exists() {
        match crate::store::snapshot::read_documents(&document_path) {
            Ok(documents) => println!("   📄 Documents: {}", documents.len()),
            Err(e) => println!("   ❌ Unreadable snapshot - {}", e),
        }
        if let Ok(modified) = fs::metadata(&vector_path).and_then(|meta| meta.modified()) {
            let modified: chrono::DateTime<chrono::Local> = modified.into();
            println!("   🕒 Last Built: {}", modified.format("%Y-%m-%d %H:%M:%S"));
        }
        println!("   📁 {}", vector_path.display());
    } else {
        println!("   📭 No snapshot at {}", vector_path.display());
    }

    println!();
    println!("🪞 Self-Reflection:");
    println!("   Threshold: {:.1}/10", config.reflection.threshold);
    println!("   Max Attempts: {}", config.reflection.max_attempts);
    println!("   Retrieved Documents: {}", config.reflection.top_k);

    println!();
    println!("💡 Next Steps:");
    println!("   • Use 'pitch-rag build <folder>' to embed reference documents");
    println!("   • Use 'pitch-rag generate <file> --mode investor' to draft a pitch");
    println!("   • Use 'pitch-rag batch <folder> <output>' to draft every mode");

    Ok(())
}

fn open_store(config: &Config, client: &Arc<OllamaClient>) -> Result<VectorStore> {
    VectorStore::load(
        &config.vector_path(),
        &config.document_path(),
        Arc::<OllamaClient>::clone(client),
    )
    .context("Run 'pitch-rag build <folder>' first to create the vector database")
}

fn reflection(
    config: &Config,
    pipeline: StoryPipeline,
    client: &Arc<OllamaClient>,
) -> SelfReflection {
    SelfReflection::new(
        Arc::new(pipeline),
        QualityScorer::new(Arc::<OllamaClient>::clone(client)),
        Arc::<OllamaClient>::clone(client),
        config.reflection,
    )
}
