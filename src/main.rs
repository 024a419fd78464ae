use clap::{Parser, Subcommand};
use pitch_rag::Result;
use pitch_rag::commands::{batch, build_database, extract_front_matter, generate, show_status};
use pitch_rag::config::{run_interactive_config, show_config};
use pitch_rag::prompt::Mode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pitch-rag")]
#[command(about = "Retrieval-grounded rewriting of research abstracts for different audiences")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure Ollama connection and settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Embed a folder of .txt documents into the vector database
    Build {
        /// Folder of reference documents
        folder: PathBuf,
    },
    /// Rewrite one text file for an audience
    Generate {
        /// Text file holding the abstract
        file: PathBuf,
        /// Target audience: general, investor or conference
        #[arg(long, default_value = "general")]
        mode: Mode,
        /// Number of related documents to retrieve
        #[arg(long)]
        top_k: Option<usize>,
        /// Score and revise the draft until it meets the quality threshold
        #[arg(long)]
        reflect: bool,
    },
    /// Rewrite every sample in a folder for every audience
    Batch {
        /// Folder of .txt samples
        folder: PathBuf,
        /// Output folder, one subfolder per mode
        output: PathBuf,
        /// Use plain rewrite prompts without retrieval
        #[arg(long, conflicts_with = "reflect")]
        baseline: bool,
        /// Run self-reflection for every pitch
        #[arg(long)]
        reflect: bool,
    },
    /// Split papers into front matter and abstract
    FrontMatter {
        /// Folder of extracted paper text
        input: PathBuf,
        /// Output folder
        output: PathBuf,
    },
    /// Show configuration and vector database status
    Status,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Build { folder } => {
            build_database(&folder)?;
        }
        Commands::Generate {
            file,
            mode,
            top_k,
            reflect,
        } => {
            generate(&file, mode, top_k, reflect)?;
        }
        Commands::Batch {
            folder,
            output,
            baseline,
            reflect,
        } => {
            batch(&folder, &output, baseline, reflect)?;
        }
        Commands::FrontMatter { input, output } => {
            extract_front_matter(&input, &output)?;
        }
        Commands::Status => {
            show_status()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn cli_parsing() {
        let cli = Cli::try_parse_from(["pitch-rag", "status"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            assert!(matches!(parsed.command, Commands::Status));
        }
    }

    #[test]
    fn generate_defaults() {
        let cli = Cli::try_parse_from(["pitch-rag", "generate", "abstract.txt"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Generate {
                file,
                mode,
                top_k,
                reflect,
            } = parsed.command
            {
                assert_eq!(file, PathBuf::from("abstract.txt"));
                assert_eq!(mode, Mode::General);
                assert_eq!(top_k, None);
                assert!(!reflect);
            }
        }
    }

    #[test]
    fn generate_with_options() {
        let cli = Cli::try_parse_from([
            "pitch-rag",
            "generate",
            "abstract.txt",
            "--mode",
            "Investor",
            "--top-k",
            "3",
            "--reflect",
        ]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Generate {
                mode,
                top_k,
                reflect,
                ..
            } = parsed.command
            {
                assert_eq!(mode, Mode::Investor);
                assert_eq!(top_k, Some(3));
                assert!(reflect);
            }
        }
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let cli = Cli::try_parse_from(["pitch-rag", "generate", "a.txt", "--mode", "poetry"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::ValueValidation);
        }
    }

    #[test]
    fn batch_baseline_conflicts_with_reflect() {
        let cli = Cli::try_parse_from([
            "pitch-rag",
            "batch",
            "samples",
            "out",
            "--baseline",
            "--reflect",
        ]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
        }
    }

    #[test]
    fn config_show_flag() {
        let cli = Cli::try_parse_from(["pitch-rag", "config", "--show"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Config { show } = parsed.command {
                assert!(show);
            }
        }
    }

    #[test]
    fn invalid_command() {
        let cli = Cli::try_parse_from(["pitch-rag", "invalid"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        }
    }

    #[test]
    fn help_message() {
        let cli = Cli::try_parse_from(["pitch-rag", "--help"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }
}
