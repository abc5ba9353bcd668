//! End-to-end CLI tests using `assert_cmd`.
//!
//! These tests invoke the compiled binary and check exit codes and output.
//! None of them needs an LLM except the ones marked #[ignore].

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Runs the binary against a config path inside `dir`, so the user's own
/// configuration and provider variables never leak into a test
fn cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pdf2qa").unwrap();
    cmd.env("PDF2QA_CONFIG", dir.join("config.toml"))
        .env_remove("PDF2QA_PROVIDER")
        .env_remove("PDF2QA_MODEL");
    cmd
}

/// Writes a config that sends every request to an Ollama server at `base_url`
fn write_ollama_config(dir: &Path, base_url: &str) {
    fs::write(
        dir.join("config.toml"),
        format!(
            "default_provider = \"ollama\"\n\n[providers.ollama]\nbase_url = \"{}\"\nmodel = \"mistral\"\n",
            base_url
        ),
    )
    .unwrap();
}

/// Builds a single-page PDF that draws `text` in Helvetica
fn minimal_pdf(text: &str) -> Vec<u8> {
    let content = if text.is_empty() {
        String::new()
    } else {
        format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text)
    };
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
         /Resources << /Font << /F1 5 0 R >> >> >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }
    let xref_start = pdf.len();
    pdf.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    pdf.push_str("0000000000 65535 f \n");
    for offset in offsets {
        pdf.push_str(&format!("{:010} 00000 n \n", offset));
    }
    pdf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_start
    ));
    pdf.into_bytes()
}

// ─── Help / version ─────────────────────────────────────────────────────

#[test]
fn test_help_shows_commands() {
    let dir = tempdir().unwrap();
    cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn test_version_shows_name() {
    let dir = tempdir().unwrap();
    cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pdf2qa"));
}

// ─── Generate argument validation ───────────────────────────────────────

#[test]
fn test_generate_help() {
    let dir = tempdir().unwrap();
    cmd(dir.path())
        .args(["generate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PATH"))
        .stdout(predicate::str::contains("--provider"))
        .stdout(predicate::str::contains("--chunk-size"))
        .stdout(predicate::str::contains("--context-window"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_generate_requires_path() {
    let dir = tempdir().unwrap();
    cmd(dir.path())
        .arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("PATH"));
}

#[test]
fn test_generate_rejects_invalid_provider() {
    let dir = tempdir().unwrap();
    cmd(dir.path())
        .args(["generate", "doc.pdf", "--provider", "invalid_provider"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_generate_rejects_small_chunk_size() {
    let dir = tempdir().unwrap();
    cmd(dir.path())
        .args(["generate", "doc.pdf", "--chunk-size", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("chunk size must be between 500 and 2000"));
}

#[test]
fn test_generate_rejects_large_context_window() {
    let dir = tempdir().unwrap();
    cmd(dir.path())
        .args(["generate", "doc.pdf", "--context-window", "8192"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("context window"));
}

#[test]
fn test_generate_missing_file() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.pdf");
    cmd(dir.path())
        .args(["generate", missing.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read PDF file"));
}

#[test]
fn test_generate_rejects_non_pdf() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("notes.pdf");
    fs::write(&input, "just some plain text").unwrap();

    cmd(dir.path())
        .args(["generate", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to extract text from PDF"));
}

#[test]
fn test_generate_blank_pdf_reports_no_text() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("blank.pdf");
    fs::write(&input, minimal_pdf("")).unwrap();
    let output = dir.path().join("blank.qa.json");

    cmd(dir.path())
        .args(["generate", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not extract any text"));
    assert!(!output.exists());
}

#[test]
fn test_generate_dry_run_needs_no_api_key() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("doc.pdf");
    fs::write(&input, minimal_pdf("Hello World")).unwrap();

    cmd(dir.path())
        .env_remove("GROQ_API_KEY")
        .args(["generate", input.to_str().unwrap(), "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"))
        .stdout(predicate::str::contains("page 1 chunk 1/"));
    assert!(!dir.path().join("doc.qa.json").exists());
}

#[test]
fn test_generate_without_api_key_fails() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("doc.pdf");
    fs::write(&input, minimal_pdf("Hello World")).unwrap();

    cmd(dir.path())
        .env_remove("GROQ_API_KEY")
        .args(["generate", input.to_str().unwrap(), "--provider", "groq"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key is required"));
}

// ─── Init ───────────────────────────────────────────────────────────────

#[test]
fn test_init_writes_config() {
    let dir = tempdir().unwrap();
    cmd(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration"));

    let content = fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(content.contains("default_provider = \"groq\""));
    assert!(content.contains("chunk_size = 1000"));
}

#[test]
fn test_init_keeps_existing_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "chunk_size = 750\n").unwrap();

    cmd(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "chunk_size = 750\n");

    cmd(dir.path()).args(["init", "--force"]).assert().success();
    assert!(
        fs::read_to_string(&path)
            .unwrap()
            .contains("default_provider")
    );
}

#[test]
fn test_config_chunk_size_is_validated() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "chunk_size = 5000\n").unwrap();

    cmd(dir.path())
        .args(["generate", "doc.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("chunk size must be between"));
}

// ─── Generate end to end ────────────────────────────────────────────────

#[test]
fn test_generate_all_chunks_failing_writes_nothing() {
    let dir = tempdir().unwrap();
    // nothing listens on the discard port
    write_ollama_config(dir.path(), "http://127.0.0.1:9");
    let input = dir.path().join("doc.pdf");
    fs::write(&input, minimal_pdf("Hello World")).unwrap();

    cmd(dir.path())
        .args(["generate", input.to_str().unwrap(), "--timeout", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no QA pairs could be generated"));
    assert!(!dir.path().join("doc.qa.json").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_generate_writes_dataset() {
    let record = json!({
        "question": "What does the document say?",
        "answer": "It says Hello World.",
        "difficulty": "easy",
        "type": "factual",
        "tags": ["greeting"],
        "metadata": {"page": 1, "chunk": 1}
    });
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {
                "role": "assistant",
                "content": format!("```json\n[{}]\n```", record)
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    write_ollama_config(dir.path(), &server.uri());
    let input = dir.path().join("doc.pdf");
    fs::write(&input, minimal_pdf("Hello World")).unwrap();

    let dir_path = dir.path().to_path_buf();
    let input_arg = input.to_str().unwrap().to_string();
    tokio::task::spawn_blocking(move || {
        cmd(&dir_path)
            .args(["generate", &input_arg, "--preview", "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Saved dataset"))
            .stdout(predicate::str::contains("total_pairs_generated"));
    })
    .await
    .unwrap();

    let dataset: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("doc.qa.json")).unwrap())
            .unwrap();
    assert_eq!(
        dataset["metadata"],
        json!({"total_pairs": 1, "total_pages": 1, "chunk_size": 1000, "context_window": 2048})
    );
    assert_eq!(dataset["qa_pairs"], json!([record]));
}

// ─── Generate against a live model ──────────────────────────────────────
// These require Ollama running, so we gate them.

#[test]
#[ignore] // Run with: cargo test -- --ignored
fn test_generate_with_ollama() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("rust.pdf");
    fs::write(
        &input,
        minimal_pdf(
            "Rust is a systems programming language. Tokio is an async runtime for Rust. \
             Cargo is the build system and package manager for Rust.",
        ),
    )
    .unwrap();
    let output = dir.path().join("rust.json");

    cmd(dir.path())
        .args([
            "generate",
            input.to_str().unwrap(),
            "--provider",
            "ollama",
            "--model",
            "mistral",
            "--output",
            output.to_str().unwrap(),
        ])
        .timeout(std::time::Duration::from_secs(300))
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved dataset"));

    let dataset: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(dataset["metadata"]["total_pages"], 1);
    assert!(!dataset["qa_pairs"].as_array().unwrap().is_empty());
}
