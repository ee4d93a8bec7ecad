//! Grid Validator CLI
//!
//! Loads a `K N taskInc` input file, validates the grid with `K` worker
//! threads pulling slices of at most `taskInc` units from a shared queue, and
//! writes the merged log plus timing summary to a report file.
//!
//! # Output Format
//!
//! The report goes to `--output` (default `output_TAS.txt`). A one-line
//! summary is written to stderr on completion:
//! `verdict=valid workers=N batch=N lock=mutex total_ns=N cs=N cs_entry_mean_ns=N ...`
//!
//! `--generate=<N>` instead writes an input file for a shuffled solved grid
//! of side `N` to stdout.
//!
//! # Exit Codes
//!
//! - `0`: Success (valid or invalid grid)
//! - `1`: The input could not be loaded
//! - `2`: Invalid arguments

use gridcheck::grid::exact_sqrt;
use gridcheck::report::{write_report_file, write_sequential_report};
use gridcheck::{
    validate_parallel, validate_sequential, GenerateConfig, Input, LockStrategy, ReportFormat,
    RunConfig,
};
use std::env;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

const DEFAULT_OUTPUT: &str = "output_TAS.txt";

fn print_usage(exe: &OsStr) {
    eprintln!(
        "usage: {0} [OPTIONS] <input>
       {0} --generate=<N> [--seed=<S>] [--corrupt] [--workers=<K>] [--batch=<B>]

OPTIONS:
    --output=<path>         Report path (default: {DEFAULT_OUTPUT})
    --format=<text|jsonl>   Report encoding (default: text)
    --lock=<mutex|tas>      Critical-section primitive (default: mutex)
    --workers=<K>           Override the worker count from the input file
    --batch=<B>             Override taskInc from the input file
    --sequential            Validate on one thread, without the queue
    --generate=<N>          Write an input file for a solved grid of side N to stdout
    --seed=<S>              Generator seed (default: 24301)
    --corrupt               Plant one duplicate in the generated grid
    --help, -h              Show this help message",
        exe.to_string_lossy()
    );
}

fn bad_arg(msg: impl std::fmt::Display) -> ! {
    eprintln!("{msg}");
    process::exit(2);
}

fn parse_value<T: FromStr>(flag: &str, value: &str) -> T {
    value
        .parse()
        .unwrap_or_else(|_| bad_arg(format_args!("invalid {flag} value: {value}")))
}

fn parse_positive(flag: &str, value: &str) -> usize {
    let n: usize = parse_value(flag, value);
    if n == 0 {
        bad_arg(format_args!("{flag} must be >= 1"));
    }
    n
}

fn main() -> io::Result<()> {
    let mut args = env::args_os();
    let exe = args.next().unwrap_or_else(|| "gridcheck".into());
    let mut input: Option<PathBuf> = None;
    let mut output = PathBuf::from(DEFAULT_OUTPUT);
    let mut format = ReportFormat::Text;
    let mut lock = LockStrategy::Mutex;
    let mut workers: Option<usize> = None;
    let mut batch: Option<usize> = None;
    let mut sequential = false;
    let mut generate: Option<usize> = None;
    let mut seed: Option<u64> = None;
    let mut corrupt = false;

    for arg in args {
        if let Some(flag) = arg.to_str() {
            if let Some((name, value)) = flag.split_once('=') {
                match name {
                    "--output" => output = PathBuf::from(value),
                    "--format" => format = value.parse().unwrap_or_else(|e| bad_arg(e)),
                    "--lock" => lock = value.parse().unwrap_or_else(|e| bad_arg(e)),
                    "--workers" => workers = Some(parse_positive(name, value)),
                    "--batch" => batch = Some(parse_positive(name, value)),
                    "--generate" => generate = Some(parse_positive(name, value)),
                    "--seed" => seed = Some(parse_value(name, value)),
                    _ => {
                        eprintln!("unknown flag: {flag}");
                        print_usage(&exe);
                        process::exit(2);
                    }
                }
                continue;
            }
            match flag {
                "--sequential" => {
                    sequential = true;
                    continue;
                }
                "--corrupt" => {
                    corrupt = true;
                    continue;
                }
                "--help" | "-h" => {
                    print_usage(&exe);
                    process::exit(0);
                }
                _ if flag.starts_with("--") => {
                    eprintln!("unknown flag: {flag}");
                    print_usage(&exe);
                    process::exit(2);
                }
                _ => {}
            }
        }

        if input.is_some() {
            print_usage(&exe);
            process::exit(2);
        }
        input = Some(PathBuf::from(arg));
    }

    if let Some(side) = generate {
        if input.is_some() {
            bad_arg("--generate takes no input path");
        }
        let Some(box_size) = exact_sqrt(side) else {
            bad_arg(format_args!("--generate side {side} is not a perfect square"));
        };
        if side.checked_mul(side).is_none() {
            bad_arg(format_args!("--generate side {side} is too large"));
        }
        let config = GenerateConfig {
            box_size,
            seed: seed.unwrap_or(GenerateConfig::default().seed),
            corrupt,
        };
        let generated = Input {
            workers: workers.unwrap_or_else(|| num_cpus::get().max(1)),
            batch: batch.unwrap_or(1).min(side),
            grid: config.generate(),
        };
        let mut out = BufWriter::new(io::stdout().lock());
        out.write_all(generated.render().as_bytes())?;
        return out.flush();
    }

    let Some(input) = input else {
        print_usage(&exe);
        process::exit(2);
    };

    let loaded = Input::read_from(&input).unwrap_or_else(|err| {
        eprintln!("failed to load {}: {err}", input.display());
        process::exit(1);
    });

    if sequential {
        if format != ReportFormat::Text {
            bad_arg("--sequential only supports --format=text");
        }
        let report = validate_sequential(&loaded.grid);
        let mut out = BufWriter::new(File::create(&output)?);
        write_sequential_report(&mut out, &report)?;
        out.flush()?;
        eprintln!(
            "verdict={} mode=sequential units_checked={} total_ns={}",
            report.verdict,
            report.units_checked,
            report.elapsed.as_nanos()
        );
        return Ok(());
    }

    let config = RunConfig {
        workers: workers.unwrap_or(loaded.workers),
        batch: batch.unwrap_or(loaded.batch).min(loaded.grid.side()),
        lock,
    };
    let report = validate_parallel(&loaded.grid, &config);
    write_report_file(&output, &report, format)?;

    let c = &report.contention;
    eprintln!(
        "verdict={} workers={} batch={} lock={} total_ns={} cs={} cs_entry_mean_ns={} cs_exit_mean_ns={} cs_entry_worst_ns={} cs_exit_worst_ns={} cs_rtt_p99_ns={}",
        report.verdict,
        config.workers,
        config.batch,
        config.lock,
        report.total_ns(),
        c.cs_count,
        c.mean_entry_ns,
        c.mean_exit_ns,
        c.worst_entry_ns,
        c.worst_exit_ns,
        c.round_trip_ns.p99().unwrap_or(0)
    );

    Ok(())
}
