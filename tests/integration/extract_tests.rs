//! Integration tests for insight extraction
//!
//! These drive the file-level pipeline and the dedup engines through the
//! public API, using temporary JSON Lines files.

use insight_miner::config::{ExtractConfig, MinHashConfig};
use insight_miner::extract::{
    exact_dedupe, extract_from_pages, extract_insights, fuzzy_dedupe, is_candidate, quality,
    MinHasher,
};
use insight_miner::output::{read_jsonl, PageInput};
use insight_miner::{CandidateType, InsightCandidate};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fn write_lines(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_end_to_end_security_and_tokenomics() {
    let input = write_lines(&[
        r#"{"url": "https://example.com/docs", "title": "Docs", "text": "Security audit completed with no critical issues. Token unlock schedule may dilute holders.", "depth": 0, "discoveredFrom": null}"#,
    ]);
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("insights.jsonl");

    let summary = extract_insights(input.path(), &out, &ExtractConfig::default()).unwrap();
    assert_eq!(summary.written, 2);

    let insights: Vec<InsightCandidate> = read_jsonl(&out).unwrap();
    let types: Vec<CandidateType> = insights.iter().map(|i| i.candidate_type).collect();
    assert!(types.contains(&CandidateType::Security));
    assert!(types.contains(&CandidateType::Tokenomics));
    for insight in &insights {
        assert!(insight.quality_score > 0.0 && insight.quality_score < 1.0);
        assert_eq!(insight.source_url, "https://example.com/docs");
        assert_eq!(insight.section, "docs");
    }
}

#[test]
fn test_output_wire_format() {
    let input = write_lines(&[
        r#"{"url": "https://example.com/", "text": "Security audit completed with no critical issues."}"#,
    ]);
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("insights.jsonl");

    extract_insights(input.path(), &out, &ExtractConfig::default()).unwrap();

    let raw: Vec<serde_json::Value> = read_jsonl(&out).unwrap();
    assert_eq!(raw.len(), 1);
    let record = raw[0].as_object().unwrap();
    for key in [
        "sourceUrl",
        "section",
        "text",
        "evidence",
        "candidateType",
        "qualityScore",
        "provenance",
        "investorSignals",
    ] {
        assert!(record.contains_key(key), "missing {key}");
    }
    assert_eq!(record["provenance"], "scraped");
    assert_eq!(record["section"], "root");
}

#[test]
fn test_malformed_and_urlless_lines_skipped() {
    let input = write_lines(&[
        "this is not json",
        r#"{"text": "Validators stake ETH to secure the network."}"#,
        "",
        r#"{"sourceUrl": "https://example.com/blog/post", "text": "Validators stake ETH to secure the network."}"#,
    ]);
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("insights.jsonl");

    let summary = extract_insights(input.path(), &out, &ExtractConfig::default()).unwrap();
    assert_eq!(summary.pages, 1);
    assert_eq!(summary.written, 1);

    let insights: Vec<InsightCandidate> = read_jsonl(&out).unwrap();
    assert_eq!(insights[0].section, "blog");
}

#[test]
fn test_invalid_utf8_line_skipped() {
    let mut input = NamedTempFile::new().unwrap();
    input.write_all(b"\xff\xfe{\"url\": \"https://example.com/a\"}\n").unwrap();
    input
        .write_all(b"{\"url\": \"https://example.com/b\", \"text\": \"Validators stake ETH to secure the network.\"}\n")
        .unwrap();
    input.flush().unwrap();
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("insights.jsonl");

    let summary = extract_insights(input.path(), &out, &ExtractConfig::default()).unwrap();
    assert_eq!(summary.pages, 1);
    assert_eq!(summary.written, 1);
}

#[test]
fn test_max_insights_caps_output() {
    let text = (0..20)
        .map(|i| format!("Operator number {} runs validator node {} for restaking.", i, i * 7))
        .collect::<Vec<_>>()
        .join(" ");
    let pages = vec![PageInput::new("https://example.com/operators", text)];
    let config = ExtractConfig {
        max_insights: 5,
        ..ExtractConfig::default()
    };

    let (insights, summary) = extract_from_pages(&pages, &config);
    assert_eq!(insights.len(), 5);
    assert_eq!(summary.written, 5);
    assert!(summary.deduped > 5);
    assert!(!summary.top_tokens.is_empty());
}

#[test]
fn test_fluff_never_filters_domain_sentences() {
    let first = "No security risk was identified during the audited review";
    let second = "Slashing penalties may reduce rewards";
    assert!(is_candidate(first, 40));
    assert!(is_candidate(second, 40));
}

#[test]
fn test_exact_dedupe_case_and_whitespace() {
    let kept = exact_dedupe(vec![
        "Restaked ETH secures many services.",
        "restaked   eth SECURES many services",
    ]);
    assert_eq!(kept.len(), 1);
}

#[test]
fn test_fuzzy_dedupe_keeps_two() {
    let kept = fuzzy_dedupe(
        vec![
            "Protocol enables efficient staking rewards for users.",
            "Protocol enables efficient staking reward for user",
            "Governance proposals require a quorum of delegated votes.",
        ],
        0.9,
    );
    assert_eq!(kept.len(), 2);
    assert_eq!(kept[0], "Protocol enables efficient staking rewards for users.");
}

#[test]
fn test_fuzzy_dedupe_through_pipeline() {
    let pages = vec![PageInput::new(
        "https://example.com/",
        "Protocol enables efficient staking rewards for users. \
         Governance proposals require a quorum of delegated votes. \
         Protocol enables efficient staking reward for user.",
    )];
    let config = ExtractConfig {
        fuzzy_dedupe: true,
        ..ExtractConfig::default()
    };

    let (insights, summary) = extract_from_pages(&pages, &config);
    assert_eq!(insights.len(), 2);
    assert_eq!(summary.fuzzy_removed, 1);
}

#[test]
fn test_minhash_dedupe_near_duplicates() {
    let variants = vec![
        "EigenLayer operators secure actively validated services with restaked ETH today",
        "EigenLayer operators secure actively validated services with restaked ETH today!",
        "eigenlayer operators SECURE actively validated services with restaked eth today.",
        "EigenLayer operators, secure actively validated services with restaked ETH today",
    ];
    let hasher = MinHasher::new(&MinHashConfig::default());
    let kept = hasher.dedupe(variants.clone());
    assert!(kept.len() < variants.len());
}

#[test]
fn test_minhash_signatures_reproducible() {
    let text = "Delegators choose operators based on uptime and slashing history";
    let first = MinHasher::new(&MinHashConfig::default()).signature(text);
    let second = MinHasher::new(&MinHashConfig::default()).signature(text);
    assert_eq!(first, second);
}

#[test]
fn test_quality_in_unit_interval() {
    let long = "Validators 1 2 3 staking risk slash operator ".repeat(20);
    for text in ["", "short", long.as_str()] {
        let q = quality(text, &[text.to_string()]);
        assert!((0.0..=1.0).contains(&q), "quality {q} out of range");
    }
}
