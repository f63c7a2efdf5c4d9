//! Integration tests running the analysis engine over saved pages from
//! tests/fixtures/pages/

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use domxss_core::config::{Config, ScanMode};
use domxss_core::{AnalysisEngine, FindingsCollector, HttpResponse, KnowledgeBase, Vulnerability};
use insta::assert_json_snapshot;
use rayon::prelude::*;

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../tests/fixtures/pages");

fn read_fixture(name: &str) -> String {
    let path = Path::new(FIXTURES_DIR).join(name);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

fn fixture_response(name: &str, id: u64) -> HttpResponse {
    HttpResponse::html(&format!("http://example.com/{}", name), id, &read_fixture(name))
}

fn scan(engine: &AnalysisEngine, name: &str) -> Vec<Vulnerability> {
    let kb = KnowledgeBase::new();
    engine.grep(&fixture_response(name, 1), &kb);
    engine.end(&kb)
}

fn sink_source_pairs(vulns: &[Vulnerability]) -> Vec<(String, String)> {
    vulns
        .iter()
        .map(|v| (v.sink.clone(), v.source.clone().unwrap_or_default()))
        .collect()
}

fn all_fixture_names() -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(FIXTURES_DIR)
        .expect("Failed to read fixtures directory")
        .map(|entry| entry.expect("Failed to read directory entry").file_name())
        .map(|name| name.to_string_lossy().to_string())
        .filter(|name| name.ends_with(".html"))
        .collect();
    names.sort();
    names
}

#[test]
fn tainted_document_write_is_reported_once() {
    let vulns = scan(&AnalysisEngine::new(), "tainted_write.html");

    assert_eq!(
        sink_source_pairs(&vulns),
        vec![("document.write".to_string(), "document.URL".to_string())]
    );
    assert_eq!(vulns[0].line, 8);
}

#[test]
fn tainted_document_write_record() {
    let vulns = scan(&AnalysisEngine::new(), "tainted_write.html");

    assert_json_snapshot!(vulns[0], @r###"
    {
      "plugin_name": "dom_xss",
      "name": "DOM Cross site scripting (Risky JavaScript Code)",
      "url": "http://example.com/tainted_write.html",
      "response_id": 1,
      "severity": "low",
      "highlight": [
        "document.URL"
      ],
      "description": "The URL: \"http://example.com/tainted_write.html\" has a DOM XSS (Risky JavaScript Code) bug using: \"document.URL\".",
      "sink": "document.write",
      "source": "document.URL",
      "line": 8
    }
    "###);
}

#[test]
fn uppercase_tags_and_sink_are_reported() {
    let vulns = scan(&AnalysisEngine::new(), "uppercase_eval.html");

    assert_eq!(
        sink_source_pairs(&vulns),
        vec![("eval".to_string(), "window.location".to_string())]
    );
    assert_eq!(vulns[0].line, 4);
}

#[test]
fn variable_indirection_is_not_reported() {
    assert!(scan(&AnalysisEngine::new(), "indirect.html").is_empty());
}

#[test]
fn page_without_script_is_not_reported() {
    assert!(scan(&AnalysisEngine::new(), "clean.html").is_empty());
}

#[test]
fn two_sinks_with_one_source_are_two_findings() {
    let vulns = scan(&AnalysisEngine::new(), "two_sinks.html");

    assert_eq!(
        sink_source_pairs(&vulns),
        vec![
            ("document.write".to_string(), "document.referrer".to_string()),
            ("window.open".to_string(), "document.referrer".to_string()),
        ]
    );
    assert_eq!(vulns[0].line, 5);
    assert_eq!(vulns[1].line, 6);
}

#[test]
fn second_script_block_needs_all_scripts_mode() {
    assert!(scan(&AnalysisEngine::new(), "second_block.html").is_empty());

    let mut config = Config::default();
    config.scan.scripts = ScanMode::All;
    let engine = AnalysisEngine::with_config(&config).unwrap();
    let vulns = scan(&engine, "second_block.html");

    assert_eq!(
        sink_source_pairs(&vulns),
        vec![("eval".to_string(), "document.location".to_string())]
    );
    assert_eq!(vulns[0].line, 6);
}

#[test]
fn repeated_analysis_yields_same_findings() {
    let engine = AnalysisEngine::new();
    for name in all_fixture_names() {
        let first: HashSet<Vulnerability> = scan(&engine, &name).into_iter().collect();
        let second: HashSet<Vulnerability> = scan(&engine, &name).into_iter().collect();
        assert_eq!(first, second, "{name}");
    }
}

#[test]
fn parallel_analysis_matches_sequential() {
    let engine = AnalysisEngine::new();
    let responses: Vec<HttpResponse> = all_fixture_names()
        .iter()
        .enumerate()
        .map(|(id, name)| fixture_response(name, id as u64))
        .collect();

    let sequential = KnowledgeBase::new();
    for response in &responses {
        engine.grep(response, &sequential);
    }

    let parallel = KnowledgeBase::new();
    responses
        .par_iter()
        .for_each(|response| engine.grep(response, &parallel));

    let expected: HashSet<Vulnerability> = sequential.get("dom_xss").into_iter().collect();
    let actual: HashSet<Vulnerability> = parallel.get("dom_xss").into_iter().collect();
    assert_eq!(expected, actual);
    assert_eq!(expected.len(), 4);
}
