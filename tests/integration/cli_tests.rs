//! Integration tests for the CLI binary.
//!
//! Drives the `imark` binary against a temporary data directory and JSON
//! corpus files.
//!
//! This test is registered as a [[test]] in the ideamark-cli crate
//! so that CARGO_BIN_EXE_imark is available.

use std::path::Path;
use std::process::{Command, Output};

/// Get a Command pointing to the `imark` binary.
fn imark_binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_imark"))
}

fn imark(data_dir: &Path, args: &[&str]) -> Output {
    imark_binary()
        .arg("--data-dir")
        .arg(data_dir)
        .args(args)
        .output()
        .expect("failed to execute imark")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn write_corpus(dir: &Path) -> std::path::PathBuf {
    let corpus = serde_json::json!([
        {
            "id": "garden-1",
            "title": "Smart Garden",
            "description": "automated watering",
            "category": "Home",
            "tags": ["iot", "garden"],
            "author_id": "alice",
            "created_at": 1_000_000_000_u64,
            "counters": { "upvotes": 3, "downvotes": 0, "comment_count": 1, "view_count": 10 }
        },
        {
            "id": "kettle-1",
            "title": "Solar kettle",
            "description": "boils water with sunlight",
            "category": "Energy",
            "tags": ["solar"],
            "author_id": "bob",
            "created_at": 1_000_000_000_u64
        }
    ]);
    let path = dir.join("corpus.json");
    std::fs::write(&path, serde_json::to_string(&corpus).unwrap()).unwrap();
    path
}

#[test]
fn cli_responds_to_help() {
    let output = imark_binary()
        .arg("--help")
        .output()
        .expect("failed to execute imark --help");

    assert!(
        output.status.success(),
        "imark --help should exit with success, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let text = stdout(&output);
    assert!(
        text.contains("imark") || text.contains("Ideamark") || text.contains("Usage"),
        "imark --help output should contain usage information, got: {text}"
    );
}

#[test]
fn cli_responds_to_version() {
    let output = imark_binary()
        .arg("--version")
        .output()
        .expect("failed to execute imark --version");

    assert!(output.status.success());
    assert!(stdout(&output).contains("imark"));
}

#[test]
fn cli_exits_with_error_on_unknown_flag() {
    let output = imark_binary()
        .arg("--nonexistent-flag")
        .output()
        .expect("failed to execute imark");

    assert!(
        !output.status.success(),
        "imark with unknown flag should exit with error"
    );
}

#[test]
fn cli_check_reports_duplicate() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = write_corpus(dir.path());

    let output = imark(
        dir.path(),
        &[
            "check",
            "--title",
            "Smart Garden",
            "--description",
            "automated watering system",
            "--tags",
            "iot,garden",
            "--corpus",
            corpus.to_str().unwrap(),
            "--json",
        ],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let verdict: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(verdict["classification"], "duplicate");
    assert_eq!(verdict["similar_ideas"][0]["item_b"], "garden-1");
}

#[test]
fn cli_check_rejects_blank_title() {
    let dir = tempfile::tempdir().unwrap();
    let output = imark(dir.path(), &["check", "--title", " ", "--description", "d"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
}

#[test]
fn cli_proof_generate_verify_and_dispute() {
    let dir = tempfile::tempdir().unwrap();
    let generate = [
        "proof",
        "generate",
        "--subject",
        "idea-42",
        "--author",
        "user-1",
        "--title",
        "Title",
        "--description",
        "Desc",
        "--tags",
        "a,b",
    ];

    let first = imark(dir.path(), &generate);
    assert!(first.status.success(), "stderr: {}", String::from_utf8_lossy(&first.stderr));
    assert!(stdout(&first).contains("Proof created"));
    assert!(dir.path().join("service.key").exists());
    assert!(dir.path().join("proofs").join("idea-42.json").exists());

    // Same subject again returns the stored proof.
    let second = imark(dir.path(), &generate);
    assert!(second.status.success());
    let id_line = |out: &Output| {
        stdout(out)
            .lines()
            .find(|l| l.trim_start().starts_with("ID:"))
            .map(str::to_string)
    };
    assert_eq!(id_line(&first), id_line(&second));

    let verify = imark(dir.path(), &["proof", "verify", "--subject", "idea-42", "--json"]);
    assert!(verify.status.success());
    let verification: serde_json::Value = serde_json::from_slice(&verify.stdout).unwrap();
    assert_eq!(verification["is_valid"], true);
    assert_eq!(verification["confidence"], 100);

    let marked = imark(dir.path(), &["proof", "mark-verified", "--subject", "idea-42"]);
    assert!(marked.status.success());
    assert!(stdout(&marked).contains("verified"));

    let submit = imark(
        dir.path(),
        &[
            "dispute",
            "submit",
            "--original",
            "idea-42",
            "--disputing",
            "idea-99",
            "--type",
            "prior-art",
            "--evidence",
            "published last year",
            "--by",
            "user-2",
        ],
    );
    assert!(submit.status.success(), "stderr: {}", String::from_utf8_lossy(&submit.stderr));
    let dispute_id = stdout(&submit)
        .lines()
        .find_map(|l| l.trim_start().strip_prefix("ID:").map(|id| id.trim().to_string()))
        .expect("dispute id printed");
    assert!(dispute_id.starts_with("odsp_"));

    let resolve = imark(
        dir.path(),
        &[
            "dispute",
            "resolve",
            "--dispute",
            &dispute_id,
            "--outcome",
            "original_upheld",
            "--resolver",
            "panel",
        ],
    );
    assert!(resolve.status.success());
    assert!(stdout(&resolve).contains("resolved"));

    let show = imark(dir.path(), &["proof", "show", "--subject", "idea-42", "--json"]);
    let proof: serde_json::Value = serde_json::from_slice(&show.stdout).unwrap();
    assert_eq!(proof["verification_status"], "resolved");
    assert_eq!(
        proof["certificate"]["chain_of_custody"].as_array().map(Vec::len),
        Some(4)
    );
}

#[test]
fn cli_verify_missing_proof_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = imark(dir.path(), &["proof", "verify", "--subject", "ghost"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("INVALID"));
}

#[test]
fn cli_recommend_json_facets() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = write_corpus(dir.path());
    let history = dir.path().join("history.json");
    std::fs::write(
        &history,
        r#"[{"user_id":"carol","item_id":"garden-1","action":"upvote","timestamp":1}]"#,
    )
    .unwrap();

    let output = imark(
        dir.path(),
        &[
            "recommend",
            "--user",
            "carol",
            "--corpus",
            corpus.to_str().unwrap(),
            "--history",
            history.to_str().unwrap(),
            "--now",
            "1086400000000",
            "--json",
        ],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let recs: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let for_you = recs["for_you"].as_array().unwrap();
    assert_eq!(for_you.len(), 1);
    assert_eq!(for_you[0]["item_id"], "kettle-1");
    assert!(recs["trending"]
        .as_array()
        .unwrap()
        .iter()
        .all(|r| r["item_id"] != "garden-1"));
}
