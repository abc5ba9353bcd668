pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "pdf2qa")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Turn PDF documents into question-answer training datasets using LLMs", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long, default_value = "false")]
        force: bool,
    },

    /// Generate a QA dataset from a PDF
    #[command(long_about = "Generate a QA dataset from a PDF.\n\n\
        Text is extracted page by page, split into word-aligned chunks, and each\n\
        chunk is sent to the LLM, which is asked for 9-10 question-answer pairs.\n\
        Chunks that fail are skipped; the dataset is written as long as at least\n\
        one pair was produced.\n\n\
        The groq and openai providers speak the OpenAI chat completions API, so any\n\
        compatible service works with a custom base_url in the config file.")]
    Generate(GenerateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// PDF file to process
    #[arg(required = true)]
    pub path: PathBuf,

    /// LLM provider (groq, openai, anthropic, ollama)
    #[arg(short, long, env = "PDF2QA_PROVIDER")]
    pub provider: Option<LlmProvider>,

    /// Model name (provider-specific, e.g. llama-3.3-70b-versatile, gpt-4o, mistral)
    #[arg(short, long, env = "PDF2QA_MODEL")]
    pub model: Option<String>,

    /// Output file [default: <PDF>.qa.json]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Chunk size budget in bytes (500-2000) [default: 1000]
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Maximum tokens the LLM may generate per chunk (1024-4096) [default: 2048]
    #[arg(long)]
    pub context_window: Option<u32>,

    /// Number of concurrent LLM requests [default: 1]
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Per-request timeout in seconds [default: 120]
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Number of pairs to show in the preview [default: 3]
    #[arg(long)]
    pub preview: Option<usize>,

    /// List capitalized names from each chunk in its prompt
    #[arg(long, default_value = "false")]
    pub entity_hints: bool,

    /// Extract and chunk only; show the chunk plan without calling the LLM
    #[arg(long, default_value = "false")]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum LlmProvider {
    #[default]
    Groq,
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    Ollama,
}

impl LlmProvider {
    /// Model used when neither the CLI nor the config names one
    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::Groq => "llama-3.3-70b-versatile",
            LlmProvider::OpenAI => "gpt-4o",
            LlmProvider::Anthropic => "claude-sonnet-4-20250514",
            LlmProvider::Ollama => "mistral",
        }
    }

    /// Parse a provider name as written in the config file
    pub fn from_config_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "groq" => Some(LlmProvider::Groq),
            "openai" => Some(LlmProvider::OpenAI),
            "anthropic" => Some(LlmProvider::Anthropic),
            "ollama" => Some(LlmProvider::Ollama),
            _ => None,
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProvider::Groq => write!(f, "groq"),
            LlmProvider::OpenAI => write!(f, "openai"),
            LlmProvider::Anthropic => write!(f, "anthropic"),
            LlmProvider::Ollama => write!(f, "ollama"),
        }
    }
}
