// tests/integration_pipeline.rs
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wikirank_core::config::PipelineConfig;
use wikirank_core::pipeline::{round_path, Pipeline, RESULT_FILE};
use wikirank_core::record::read_records;

fn page(title: &str, body: &str) -> String {
    format!("<page><title>{title}</title><text xml:space=\"preserve\">{body}</text></page>\n")
}

// The worked scenario: A -> [B, C], B -> [A], C dangling.
fn write_corpus(dir: &Path) -> std::path::PathBuf {
    let dump = dir.join("dump.xml");
    let mut content = String::new();
    content.push_str(&page("A", "links to [[B]] and [[C]]"));
    content.push_str(&page("B", "links back to [[A]]"));
    content.push_str(&page("C", "no links here"));
    // Rejected and malformed documents must vanish silently.
    content.push_str(&page("Talk:D", "[[A]]"));
    content.push_str("<page><title>Broken</title>no text element</page>\n");
    fs::write(&dump, content).unwrap();
    dump
}

fn config(rounds: usize) -> PipelineConfig {
    PipelineConfig {
        rounds,
        ..PipelineConfig::default()
    }
}

#[test]
fn test_extraction_seeds_generation_zero() {
    let dir = TempDir::new().unwrap();
    let dump = write_corpus(dir.path());
    let out = dir.path().join("iter00");

    let pipeline = Pipeline::new(config(1));
    let report = pipeline.run_extraction(&dump, &out).unwrap();

    assert_eq!(report.records_in, 5);
    assert_eq!(report.records_out, 3);

    let content = fs::read_to_string(&out).unwrap();
    assert_eq!(content, "A\t1.0\tB,C\nB\t1.0\tA\nC\t1.0\t\n");
}

#[test]
fn test_full_run_produces_expected_ranking() {
    let dir = TempDir::new().unwrap();
    let dump = write_corpus(dir.path());
    let work = dir.path().join("work");

    let pipeline = Pipeline::new(config(1));
    let report = pipeline.run(&dump, &work).unwrap();

    assert_eq!(report.nodes, 3);
    assert_eq!(report.rounds_run, 1);
    assert!(round_path(&work, 0).exists());
    assert!(round_path(&work, 1).exists());

    // Round one: A=1.0 (from B), B=0.5, C=0.5; descending with id tie-break.
    let result = fs::read_to_string(work.join(RESULT_FILE)).unwrap();
    assert_eq!(result, "1.0\tA\n0.5\tB\n0.5\tC\n");
}

#[test]
fn test_generations_carry_adjacency_forward() {
    let dir = TempDir::new().unwrap();
    let dump = write_corpus(dir.path());
    let work = dir.path().join("work");

    Pipeline::new(config(3)).run(&dump, &work).unwrap();

    let seed = read_records(&round_path(&work, 0)).unwrap();
    let last = read_records(&round_path(&work, 3)).unwrap();
    for (a, b) in seed.iter().zip(&last) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.neighbors, b.neighbors);
    }
}

#[test]
fn test_round_rerun_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let dump = write_corpus(dir.path());
    let seed = dir.path().join("iter00");

    let pipeline = Pipeline::new(config(1));
    pipeline.run_extraction(&dump, &seed).unwrap();

    // Simulates a crash-and-retry: the same unmodified input, run twice.
    let first = pipeline
        .run_propagation_round(&seed, &dir.path().join("out_a"))
        .unwrap();
    let second = pipeline
        .run_propagation_round(&seed, &dir.path().join("out_b"))
        .unwrap();

    assert_eq!(first.output_digest, second.output_digest);
    assert_eq!(
        fs::read(dir.path().join("out_a")).unwrap(),
        fs::read(dir.path().join("out_b")).unwrap()
    );
}

#[test]
fn test_malformed_record_fails_round_without_commit() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("iter00");
    fs::write(&input, "A\t1.0\tB\nB\tbroken\t\n").unwrap();

    let out = dir.path().join("iter01");
    let result = Pipeline::new(config(1)).run_propagation_round(&input, &out);

    assert!(result.is_err(), "unparsable rank must fail the round");
    assert!(!out.exists(), "a failed round must commit nothing");
}

#[test]
fn test_convergence_threshold_stops_early() {
    let dir = TempDir::new().unwrap();
    // Two nodes pointing at each other swap 1.0 forever: delta is 0 from
    // the first round on.
    let dump = dir.path().join("dump.xml");
    fs::write(
        &dump,
        format!("{}{}", page("A", "[[B]]"), page("B", "[[A]]")),
    )
    .unwrap();

    let pipeline = Pipeline::new(PipelineConfig {
        rounds: 8,
        convergence_threshold: Some(1e-9),
        ..PipelineConfig::default()
    });
    let report = pipeline.run(&dump, &dir.path().join("work")).unwrap();
    assert_eq!(report.rounds_run, 1);
}

#[test]
fn test_round_paths_are_zero_padded() {
    let work = Path::new("work");
    assert_eq!(round_path(work, 0), work.join("iter00"));
    assert_eq!(round_path(work, 8), work.join("iter08"));
    assert_eq!(round_path(work, 12), work.join("iter12"));
}

#[test]
fn test_stage_reports_serialize() {
    let dir = TempDir::new().unwrap();
    let dump = write_corpus(dir.path());
    let work = dir.path().join("work");

    let report = Pipeline::new(config(1)).run(&dump, &work).unwrap();
    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"rounds_run\":1"));
    assert!(json.contains("\"stage\":\"extract\""));
}
