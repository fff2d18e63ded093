//! End-to-end runs over scratch result directories: discovery, parsing,
//! aggregation, ranking and the written report.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dockscore_molecules::discovery::DEFAULT_SUFFIX;
use dockscore_molecules::parser::MockParser;
use dockscore_molecules::{discover, Aggregator, MoleculeParser, Row, SdfParser};
use dockscore_ranker::{completion_line, rank, read_csv, write_csv, write_failure_report};

/// One V2000 molecule (methanol, explicit hydrogens) with the given data items.
fn molecule(title: &str, props: &[(&str, &str)]) -> String {
    let mut s = format!(
        "{title}\n  gnina\n\n  6  5  0  0  0  0  0  0  0  0999 V2000\n"
    );
    for (x, el) in [(0.0, "C"), (1.4, "O"), (-0.5, "H"), (-0.5, "H"), (-0.5, "H"), (1.8, "H")] {
        s.push_str(&format!(
            "{x:>10.4}{:>10.4}{:>10.4} {el:<3} 0  0  0  0  0  0  0  0  0  0  0  0\n",
            0.0, 0.0
        ));
    }
    for (a, b) in [(1, 2), (1, 3), (1, 4), (1, 5), (2, 6)] {
        s.push_str(&format!("{a:>3}{b:>3}  1  0\n"));
    }
    s.push_str("M  END\n");
    for (k, v) in props {
        s.push_str(&format!(">  <{k}>  (1) \n{v}\n\n"));
    }
    s.push_str("$$$$\n");
    s
}

fn scores(cnn_score: &str, cnn_affinity: &str, affinity: &str) -> Vec<(&'static str, String)> {
    vec![
        ("minimizedAffinity", affinity.to_string()),
        ("CNNscore", cnn_score.to_string()),
        ("CNNaffinity", cnn_affinity.to_string()),
        ("Affinity", affinity.to_string()),
    ]
}

fn write_result(dir: &Path, ligand: &str, molecules: &[String]) -> PathBuf {
    let path = dir.join(format!("{ligand}{DEFAULT_SUFFIX}"));
    fs::write(&path, molecules.concat()).unwrap();
    path
}

fn as_props<'a>(v: &'a [(&'static str, String)]) -> Vec<(&'static str, &'a str)> {
    v.iter().map(|(k, val)| (*k, val.as_str())).collect()
}

struct RunOutput {
    stdout: String,
    table: Vec<Row>,
    artifact: Vec<u8>,
}

fn run(input: &Path, output: &Path, parser: Arc<dyn MoleculeParser>) -> RunOutput {
    let files = discover(input, DEFAULT_SUFFIX);
    let agg = Aggregator::new(parser).run(&files).unwrap();

    let mut stdout = Vec::new();
    write_failure_report(&mut stdout, &agg.failures).unwrap();
    let table = rank(agg.rows);
    write_csv(output, &table).unwrap();
    stdout.extend_from_slice(completion_line(table.len(), output).as_bytes());
    stdout.push(b'\n');

    RunOutput {
        stdout: String::from_utf8(stdout).unwrap(),
        table,
        artifact: fs::read(output).unwrap(),
    }
}

#[test]
fn scenario_two_molecules_ranked_by_cnn_affinity() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let weak = scores("0.5", "5.1", "-5.1");
    let strong = scores("0.8", "7.2", "-7.2");
    write_result(
        input.path(),
        "lig",
        &[molecule("weak", &as_props(&weak)), molecule("strong", &as_props(&strong))],
    );

    let res = run(input.path(), &out.path().join("gnina_scores.csv"), Arc::new(SdfParser::new()));

    assert_eq!(res.table.len(), 2);
    assert_eq!(res.table[0].cnn_affinity, Some(7.2));
    assert_eq!(res.table[0].cnn_score, Some(0.8));
    assert_eq!(res.table[0].affinity, Some(-7.2));
    assert_eq!(res.table[1].cnn_affinity, Some(5.1));
    assert!(res.table.iter().all(|r| r.ligand == "lig"));
    assert!(!res.stdout.contains("Skipped"));

    let text = String::from_utf8(res.artifact).unwrap();
    assert_eq!(
        text,
        "ligand,CNNscore,CNNaffinity,Affinity\nlig,0.8,7.2,-7.2\nlig,0.5,5.1,-5.1\n"
    );
}

#[test]
fn scenario_parser_error_is_reported_and_skipped() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let path = write_result(input.path(), "broken", &[]);
    let parser = MockParser::new().with_error(path, "syntax error at line 4");

    let res = run(input.path(), &out.path().join("gnina_scores.csv"), Arc::new(parser));

    assert!(res.table.is_empty());
    assert!(res.stdout.starts_with(
        "Skipped 1 files due to parse errors:\n  - broken: syntax error at line 4\n"
    ));
    let output = out.path().join("gnina_scores.csv");
    assert!(res.stdout.ends_with(&format!("Wrote 0 scored ligands to {}\n", output.display())));
}

#[test]
fn scenario_missing_cnn_affinity_sorts_last() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_result(
        input.path(),
        "aaa_unscored",
        &[molecule("u", &[("CNNscore", "0.3"), ("Affinity", "-4.0")])],
    );
    let low = scores("0.1", "-2.0", "-1.0");
    write_result(input.path(), "zzz_low", &[molecule("z", &as_props(&low))]);

    let res = run(input.path(), &out.path().join("gnina_scores.csv"), Arc::new(SdfParser::new()));

    let ligands: Vec<&str> = res.table.iter().map(|r| r.ligand.as_str()).collect();
    assert_eq!(ligands, vec!["zzz_low", "aaa_unscored"]);
    assert_eq!(res.table[1].cnn_affinity, None);
    assert_eq!(res.table[1].cnn_score, Some(0.3));

    let text = String::from_utf8(res.artifact).unwrap();
    assert!(text.ends_with("aaa_unscored,0.3,,-4.0\n"));
}

#[test]
fn scenario_no_candidate_files() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fs::write(input.path().join("readme.txt"), "not a result").unwrap();
    let output = out.path().join("gnina_scores.csv");

    let res = run(input.path(), &output, Arc::new(SdfParser::new()));

    assert!(res.table.is_empty());
    assert!(!res.stdout.contains("Skipped"));
    assert_eq!(res.stdout, format!("Wrote 0 scored ligands to {}\n", output.display()));
    assert_eq!(res.artifact, b"ligand,CNNscore,CNNaffinity,Affinity\n");
}

#[test]
fn mixed_directory_accounts_for_every_file() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    let a = scores("0.9", "6.0", "-6.5");
    let b = scores("0.7", "6.0", "-6.1");
    write_result(input.path(), "good", &[molecule("g1", &as_props(&a)), molecule("g2", &as_props(&b))]);
    write_result(input.path(), "empty", &[]);
    fs::write(input.path().join(format!("garbage{DEFAULT_SUFFIX}")), "not\nan\nsd\nfile\n$$$$\n").unwrap();
    fs::write(input.path().join(format!("binary{DEFAULT_SUFFIX}")), [0xffu8, 0xfe, 0x00]).unwrap();
    let c = scores("0.2", "3.3", "-3.0");
    write_result(
        input.path(),
        "partial",
        &["bad\n\n\n  x\nM  END\n$$$$\n".to_string(), molecule("p", &as_props(&c))],
    );

    let res = run(input.path(), &out.path().join("gnina_scores.csv"), Arc::new(SdfParser::new()));

    let ligands: Vec<&str> = res.table.iter().map(|r| r.ligand.as_str()).collect();
    // equal CNNaffinity keeps molecule order within "good"
    assert_eq!(ligands, vec!["good", "good", "partial"]);
    assert_eq!(res.table[0].cnn_score, Some(0.9));
    assert_eq!(res.table[1].cnn_score, Some(0.7));

    assert!(res.stdout.starts_with("Skipped 3 files due to parse errors:\n"));
    // failures follow discovery order, which is sorted by path
    let failure_lines: Vec<&str> = res.stdout.lines().filter(|l| l.starts_with("  - ")).collect();
    assert_eq!(failure_lines.len(), 3);
    assert!(failure_lines[0].starts_with("  - binary: file is not valid UTF-8"));
    assert_eq!(failure_lines[1], "  - empty: no molecules parsed");
    assert_eq!(failure_lines[2], "  - garbage: no molecules parsed");
}

#[test]
fn oversized_counts_line_does_not_abort_run() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fs::write(
        input.path().join(format!("huge{DEFAULT_SUFFIX}")),
        "t\n\n\n1 18446744073709551615\n",
    )
    .unwrap();
    let good = scores("0.9", "6.0", "-6.5");
    write_result(input.path(), "good", &[molecule("g", &as_props(&good))]);

    let res = run(input.path(), &out.path().join("gnina_scores.csv"), Arc::new(SdfParser::new()));

    let ligands: Vec<&str> = res.table.iter().map(|r| r.ligand.as_str()).collect();
    assert_eq!(ligands, vec!["good"]);
    assert!(res
        .stdout
        .starts_with("Skipped 1 files due to parse errors:\n  - huge: no molecules parsed\n"));
}

#[test]
fn rerun_produces_identical_artifact() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    for (i, ligand) in ["c", "a", "b", "d"].iter().enumerate() {
        let affinity = format!("{}.5", i % 2 + 4);
        let props = scores("0.5", &affinity, "-4.0");
        write_result(input.path(), ligand, &[molecule(ligand, &as_props(&props))]);
    }
    write_result(input.path(), "e", &[]);

    let first = run(input.path(), &out.path().join("first.csv"), Arc::new(SdfParser::new()));
    let second = run(input.path(), &out.path().join("second.csv"), Arc::new(SdfParser::new()));

    assert_eq!(first.artifact, second.artifact);
    assert_eq!(first.table, second.table);
    assert_eq!(
        first.stdout.lines().next(),
        second.stdout.lines().next()
    );
}

#[test]
fn artifact_round_trips() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let full = scores("0.6543", "8.125", "-9.75");
    write_result(
        input.path(),
        "rt",
        &[
            molecule("full", &as_props(&full)),
            molecule("sparse", &[("CNNscore", "0.25")]),
        ],
    );
    let output = out.path().join("gnina_scores.csv");

    let res = run(input.path(), &output, Arc::new(SdfParser::new()));

    assert_eq!(read_csv(&output).unwrap(), res.table);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn worker_pool_matches_sequential_run() {
    let input = tempfile::tempdir().unwrap();
    for i in 0..24 {
        let affinity = format!("{}", (i * 7) % 11);
        let props = scores("0.5", &affinity, "-5.0");
        let ligand = format!("lig{i:02}");
        if i % 5 == 0 {
            write_result(input.path(), &ligand, &[]);
        } else {
            write_result(input.path(), &ligand, &[molecule(&ligand, &as_props(&props))]);
        }
    }

    let files = discover(input.path(), DEFAULT_SUFFIX);
    let aggregator = Aggregator::new(Arc::new(SdfParser::new()));
    let sequential = aggregator.run(&files).unwrap();
    let concurrent = aggregator.run_concurrent(files, 4).await.unwrap();

    assert_eq!(concurrent, sequential);
    assert_eq!(rank(concurrent.rows), rank(sequential.rows));
}
