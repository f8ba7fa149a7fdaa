//! GENEActiv Exporter
//!
//! Post-processing tool: decode a .bin file and export either the full
//! calibrated sample table or the time-bucketed SVM aggregation as CSV.
//!
//! Usage:
//!   ga-export --input data.bin --bucket 1s
//!   ga-export --input data.bin --bucket 10m --output buckets.csv
//!   ga-export --input data.bin --raw --output samples.csv

use clap::Parser;
use chrono::TimeDelta;
use geneactiv_reader::GeneActiv;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ga-export")]
#[command(about = "Export GENEActiv data as CSV", long_about = None)]
struct Args {
    /// Input .bin file path
    #[arg(short, long)]
    input: PathBuf,

    /// Aggregation bucket width: <number><unit> with unit s, m, h, d or w
    #[arg(short, long, default_value = "1s")]
    bucket: String,

    /// Export the full calibrated sample table instead of the aggregation
    #[arg(long)]
    raw: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let width = match parse_bucket(&args.bucket) {
        Some(w) => w,
        None => {
            eprintln!(
                "Error: invalid bucket width {:?} (expected e.g. 1s, 10s, 5m, 1h, 1d, 1w)",
                args.bucket
            );
            std::process::exit(1);
        }
    };

    let ga = GeneActiv::load(&args.input)?;

    let out: Box<dyn Write> = if let Some(path) = &args.output {
        Box::new(std::fs::File::create(path)?)
    } else {
        Box::new(io::stdout())
    };
    let mut writer = csv::Writer::from_writer(out);

    if args.raw {
        writer.write_record(["time", "x", "y", "z", "lux", "temperature", "button", "svm"])?;
        for s in ga.samples() {
            writer.write_record(&[
                s.timestamp.to_string(),
                format!("{:.4}", s.x),
                format!("{:.4}", s.y),
                format!("{:.4}", s.z),
                s.lux.to_string(),
                s.temperature.to_string(),
                (s.button as u8).to_string(),
                format!("{:.6}", s.svm),
            ])?;
        }
    } else {
        writer.write_record(["bucket_start", "svm_sum"])?;
        for bucket in ga.aggregate(width)? {
            writer.write_record(&[
                bucket.start.to_string(),
                format!("{:.6}", bucket.svm_sum),
            ])?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Parse bucket widths like "1s", "10s", "5m", "1h", "1d", "1w"
fn parse_bucket(spec: &str) -> Option<TimeDelta> {
    let spec = spec.trim();
    let unit = spec.chars().last()?;
    let count: i64 = spec[..spec.len() - unit.len_utf8()].parse().ok()?;
    if count <= 0 {
        return None;
    }
    match unit {
        's' => Some(TimeDelta::seconds(count)),
        'm' => Some(TimeDelta::minutes(count)),
        'h' => Some(TimeDelta::hours(count)),
        'd' => Some(TimeDelta::days(count)),
        'w' => Some(TimeDelta::weeks(count)),
        _ => None,
    }
}
