//! Summarize the numbers in files (or stdin) with their count, mean, variance, and shape.

use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

use arrrg::CommandLine;
use arrrg_derive::CommandLine;
use indicio::{clue, stdio::StdioEmitter, ALWAYS, INFO};

use moments::{Error, MomentAccumulator, COLLECTOR};

const USAGE: &str = "Usage: moments [--sample] [--per-input] [--precision DIGITS] [--verbose] [FILE ...]";

#[derive(CommandLine, Debug, Default, PartialEq)]
struct MomentsOptions {
    #[arrrg(flag, "Report the sample (Bessel-corrected) variance and standard deviation.")]
    sample: bool,
    #[arrrg(flag, "Summarize every input, not just the total.")]
    per_input: bool,
    #[arrrg(optional, "Digits to print after the decimal point (default: 6).", "DIGITS")]
    precision: Option<usize>,
    #[arrrg(flag, "Log to stderr.")]
    verbose: bool,
}

impl Eq for MomentsOptions {}

fn read_input(input: &str) -> Result<MomentAccumulator, Error> {
    if input == "-" {
        moments::accumulate(std::io::stdin().lock())
    } else {
        let file = File::open(input)?;
        moments::accumulate(BufReader::new(file))
    }
}

fn format_statistic(statistic: Result<f64, Error>, precision: usize) -> String {
    match statistic {
        Ok(x) => format!("{x:.precision$}"),
        Err(err) => format!("undefined ({err})"),
    }
}

fn summarize(options: &MomentsOptions, label: &str, acc: &MomentAccumulator) {
    let precision = options.precision.unwrap_or(6);
    let (variance, stddev) = if options.sample {
        (acc.sample_variance(), acc.sample_standard_deviation())
    } else {
        (acc.variance(), acc.standard_deviation())
    };
    println!("{label}:");
    println!("  count     {}", acc.count());
    println!("  mean      {}", format_statistic(acc.mean(), precision));
    println!("  variance  {}", format_statistic(variance, precision));
    println!("  stddev    {}", format_statistic(stddev, precision));
    println!("  skewness  {}", format_statistic(acc.skewness(), precision));
    println!("  kurtosis  {}", format_statistic(acc.kurtosis(), precision));
}

fn main() {
    let (options, free) = MomentsOptions::from_command_line_relaxed(USAGE);
    if options.verbose {
        let emitter = Arc::new(StdioEmitter);
        COLLECTOR.register(emitter);
        COLLECTOR.set_verbosity(INFO);
        clue!(COLLECTOR, ALWAYS, {
            new_process: std::env::args().map(String::from).collect::<Vec<_>>(),
        });
    }
    let inputs = if free.is_empty() {
        vec!["-".to_string()]
    } else {
        free
    };
    let mut total = MomentAccumulator::new();
    for input in inputs.iter() {
        let shard = match read_input(input) {
            Ok(shard) => shard,
            Err(err) => {
                eprintln!("{input}: {err}");
                std::process::exit(1);
            }
        };
        if options.per_input {
            summarize(&options, input, &shard);
        }
        total.merge(&shard);
    }
    summarize(&options, "total", &total);
}
