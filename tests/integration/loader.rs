//! Input file to report file, through real files.

use gridcheck::report::{write_report_file, write_sequential_report};
use gridcheck::{
    merge_text_buffers, validate_parallel, validate_sequential, Input, LoadError, LockStrategy,
    ReportFormat, RunConfig, Verdict,
};
use std::fs;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

const FOUR_VALID: &str = "2 4 2
1 2 3 4
3 4 1 2
2 1 4 3
4 3 2 1
";

fn input_file(text: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(text.as_bytes()).unwrap();
    f.flush().unwrap();
    f
}

fn run(input: &Input, lock: LockStrategy) -> gridcheck::RunReport {
    validate_parallel(
        &input.grid,
        &RunConfig {
            workers: input.workers,
            batch: input.batch,
            lock,
        },
    )
}

#[test]
fn loads_and_writes_text_report() {
    let file = input_file(FOUR_VALID);
    let input = Input::read_from(file.path()).unwrap();
    assert_eq!((input.workers, input.batch, input.grid.side()), (2, 2, 4));

    let report = run(&input, LockStrategy::Mutex);
    let dir = tempdir().unwrap();
    let out = dir.path().join("output_TAS.txt");
    write_report_file(&out, &report, ReportFormat::Text).unwrap();

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("\nSudoku is valid.\n"));
    assert!(text.contains("Average CS Entry Time is "));
    assert_eq!(merge_text_buffers([text.as_str()]).len(), report.events.len());
}

#[test]
fn rewriting_a_report_truncates_it() {
    let input = Input::parse(FOUR_VALID).unwrap();
    let dir = tempdir().unwrap();
    let out = dir.path().join("report.jsonl");

    let first = run(&input, LockStrategy::TestAndSet);
    write_report_file(&out, &first, ReportFormat::Jsonl).unwrap();
    let second = run(&input, LockStrategy::TestAndSet);
    write_report_file(&out, &second, ReportFormat::Jsonl).unwrap();

    let text = fs::read_to_string(&out).unwrap();
    assert_eq!(text.lines().count(), second.events.len() + 1);
    assert_eq!(
        text.lines().filter(|l| l.starts_with("{\"type\":\"summary\"")).count(),
        1
    );
}

#[test]
fn batch_larger_than_side_is_capped() {
    let text = FOUR_VALID.replacen("2 4 2", "3 4 100", 1);
    let input = Input::parse(&text).unwrap();
    assert_eq!(input.batch, 4);
    let report = run(&input, LockStrategy::Mutex);
    assert!(report.workers.iter().flat_map(|w| &w.grants).all(|a| a.count <= 4));
    assert_eq!(report.verdict, Verdict::Valid);
}

#[test]
fn rejects_malformed_inputs() {
    let cases: [(&str, fn(&LoadError) -> bool); 4] = [
        ("2 5 1\n", |e| matches!(e, LoadError::NotPerfectSquare { side: 5 })),
        ("2 4 2\n1 2 3 4\n", |e| {
            matches!(e, LoadError::TruncatedGrid { expected: 16, got: 4 })
        }),
        ("2 4", |e| matches!(e, LoadError::MissingHeader { .. })),
        ("0 4 2\n", |e| matches!(e, LoadError::NonPositive { value: 0, .. })),
    ];
    for (text, check) in cases {
        let err = Input::parse(text).unwrap_err();
        assert!(check(&err), "{text:?} gave {err:?}");
        assert!(!err.to_string().is_empty());
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = Input::read_from(dir.path().join("absent.txt")).unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn render_then_load_preserves_input() {
    let input = Input::parse(FOUR_VALID).unwrap();
    let file = input_file(&input.render());
    assert_eq!(Input::read_from(file.path()).unwrap(), input);
}

#[test]
fn sequential_report_for_invalid_grid() {
    let input = Input::parse(&FOUR_VALID.replacen("1 2 3 4", "2 2 3 4", 1)).unwrap();
    let report = validate_sequential(&input.grid);
    assert_eq!(report.verdict, Verdict::Invalid);

    let mut out = Vec::new();
    write_sequential_report(&mut out, &report).unwrap();
    assert!(String::from_utf8(out).unwrap().starts_with("Sudoku is invalid.\n"));
}
