use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// The premade pipelines selectable from the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    /// Short chat messages; normal-quick, lowercases shouting.
    Chat,
    /// Long-form articles; zero-tolerance.
    Article,
}

// Define command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Check messages against a spam filter pipeline", long_about = None)]
pub struct Args {
    /// Path to the pipeline configuration YAML file.
    #[arg(short = 'c', long, conflicts_with = "preset", required_unless_present = "preset")]
    pub config: Option<PathBuf>,

    /// Use a premade pipeline instead of a configuration file.
    #[arg(short = 'p', long, value_enum)]
    pub preset: Option<Preset>,

    /// Override the pipeline mode (normal, normal-quick, tolerant, zero-tolerance).
    #[arg(short = 'm', long)]
    pub mode: Option<String>,

    /// JSON blocklist enabling the profanity filter of a preset.
    #[arg(short = 'b', long, requires = "preset", conflicts_with = "config")]
    pub blocklist: Option<PathBuf>,

    /// Text to check. Without it, every line of stdin is checked.
    #[arg(short = 't', long)]
    pub text: Option<String>,

    /// Print one JSON report per message instead of a summary line.
    #[arg(long)]
    pub json: bool,

    /// Validate the pipeline configuration and exit
    #[arg(long)]
    pub validate_config: bool,
}
