use anyhow::{Context, Result};
use console::{Emoji, style};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::cli::{GenerateArgs, LlmProvider};
use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::{QaError, validate_chunk_size, validate_context_window};
use crate::llm::LlmClient;
use crate::llm::generator::{GenerationOptions, QaGenerator};
use crate::parser::{Chunk, create_chunks, extract_pages};

static PAPER: Emoji<'_, '_> = Emoji("📄 ", "");
static SCISSORS: Emoji<'_, '_> = Emoji("✂️  ", "");
static BRAIN: Emoji<'_, '_> = Emoji("🧠 ", "");
static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
static DATABASE: Emoji<'_, '_> = Emoji("💾 ", "");

/// Settings for one run, after CLI flags are layered over the config file
#[derive(Debug, Clone, PartialEq)]
struct RunSettings {
    provider: LlmProvider,
    chunk_size: usize,
    context_window: u32,
    concurrency: usize,
    request_timeout: Duration,
    preview_pairs: usize,
}

impl RunSettings {
    fn resolve(args: &GenerateArgs, config: &Config) -> Result<Self> {
        let provider = match args.provider {
            Some(p) => p,
            None => LlmProvider::from_config_name(&config.default_provider).with_context(
                || format!("Unknown default_provider '{}' in config", config.default_provider),
            )?,
        };

        Ok(Self {
            provider,
            chunk_size: validate_chunk_size(args.chunk_size.unwrap_or(config.chunk_size))?,
            context_window: validate_context_window(
                args.context_window.unwrap_or(config.context_window),
            )?,
            concurrency: args.concurrency.unwrap_or(config.concurrency).max(1),
            request_timeout: Duration::from_secs(
                args.timeout.unwrap_or(config.request_timeout_secs).max(1),
            ),
            preview_pairs: args.preview.unwrap_or(config.preview_pairs),
        })
    }
}

fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("qa.json")
}

pub async fn run(args: GenerateArgs) -> Result<()> {
    let started = Instant::now();

    println!();
    println!(
        "{}",
        style(" pdf2qa - QA Dataset Generator ").bold().reverse()
    );
    println!();

    let config = Config::load().context("Failed to load configuration")?;
    let settings = RunSettings::resolve(&args, &config)?;
    let model = args.model.clone().or_else(|| config.default_model.clone());

    println!("{}Source: {}", PAPER, style(args.path.display()).cyan());
    println!(
        "{}Chunk size: {} bytes, context window: {} tokens",
        SCISSORS,
        style(settings.chunk_size).cyan(),
        style(settings.context_window).cyan()
    );
    println!();

    // Extract text
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template(&format!("{}{{spinner:.green}} {{msg}}", PAPER))
            .context("Invalid spinner template")?,
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message("Extracting text from PDF...");
    let pages = extract_pages(&args.path);
    spinner.finish_and_clear();
    let pages = pages?;

    if pages.is_empty() {
        return Err(QaError::NoTextExtracted(args.path.clone()).into());
    }

    let chunks = create_chunks(&pages, settings.chunk_size);
    println!(
        "{}Extracted {} pages, split into {} chunks",
        CHECK,
        style(pages.len()).green().bold(),
        style(chunks.len()).green().bold()
    );

    if args.dry_run {
        print_chunk_plan(&chunks);
        return Ok(());
    }

    let llm = LlmClient::new(settings.provider, &config, model.as_deref())?;
    println!(
        "{}Provider: {} ({})",
        BRAIN,
        style(llm.provider_name()).cyan().bold(),
        style(llm.model()).cyan()
    );
    if settings.concurrency > 1 {
        println!("{}Concurrency: {}", BRAIN, style(settings.concurrency).cyan());
    }
    println!();
    println!("{}Generating QA pairs...", BRAIN);

    let pb = ProgressBar::new(chunks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{}{{spinner:.green}} [{{elapsed_precise}}] {{bar:40.cyan/blue}} {{pos}}/{{len}} chunks",
                BRAIN
            ))
            .context("Invalid progress bar template")?
            .progress_chars("━━╸━"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let options = GenerationOptions {
        max_tokens: settings.context_window,
        concurrency: settings.concurrency,
        request_timeout: settings.request_timeout,
        entity_hints: args.entity_hints,
    };
    let generator = QaGenerator::new(llm, options).with_progress(pb.clone());
    let report = generator.generate(&chunks).await;
    pb.finish_and_clear();

    if report.qa_pairs.is_empty() {
        return Err(QaError::NoQaPairs.into());
    }

    println!(
        "{}Generated {} QA pairs from {} chunks",
        CHECK,
        style(report.qa_pairs.len()).green().bold(),
        style(report.chunks_processed).green().bold()
    );
    if report.fallback_records > 0 {
        println!(
            "{}{} responses could not be parsed and were replaced by placeholder records",
            WARN,
            style(report.fallback_records).yellow()
        );
    }
    if report.chunks_failed > 0 {
        println!(
            "{}{} chunks failed and were skipped (run with RUST_LOG=warn for details)",
            WARN,
            style(report.chunks_failed).yellow()
        );
    }

    let dataset = Dataset::new(
        report.qa_pairs,
        pages.len(),
        settings.chunk_size,
        settings.context_window,
    );
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.path));
    dataset.write_json(&output)?;
    println!("{}Saved dataset to {}", DATABASE, style(output.display()).cyan());

    if settings.preview_pairs > 0 {
        println!();
        println!("{}Preview:", SPARKLE);
        println!(
            "{}",
            serde_json::to_string_pretty(&dataset.preview(settings.preview_pairs))?
        );
    }

    println!();
    println!(
        "{}Done in {}",
        SPARKLE,
        style(HumanDuration(started.elapsed())).green().bold()
    );

    Ok(())
}

fn print_chunk_plan(chunks: &[Chunk]) {
    println!();
    println!("{}Dry run: no LLM calls will be made", WARN);
    println!();
    for chunk in chunks {
        let excerpt: String = chunk.text.chars().take(60).collect();
        println!(
            "  {} page {} chunk {}/{} ({} bytes) {}",
            style("•").cyan(),
            style(chunk.page_number).bold(),
            chunk.chunk_index,
            chunk.chunk_count_estimate,
            chunk.text.len(),
            style(excerpt).dim()
        );
    }
}
