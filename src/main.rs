//! GENEActiv .bin reader - Decode a file and display a summary
//!
//! This executable decodes a GENEActiv export, prints the captured
//! calibration constants, the table's time range, and the first rows of
//! calibrated data.

use clap::Parser;
use geneactiv_reader::{GeneActiv, GeneActivError};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ga-reader")]
#[command(about = "Decode a GENEActiv .bin file and print a summary", long_about = None)]
struct Args {
    /// Input .bin file path
    input: PathBuf,

    /// Number of leading samples to print
    #[arg(short = 'n', long, default_value = "10")]
    head: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    println!("GENEActiv Reader");
    println!("================");
    println!("Input: {}", args.input.display());
    println!();

    let ga = match GeneActiv::load(&args.input) {
        Ok(ga) => ga,
        Err(GeneActivError::MissingCalibration(missing)) => {
            eprintln!("Error: a data page was reached before the header was complete.");
            eprintln!("Missing calibration fields: {missing}");
            eprintln!("Please check:");
            eprintln!("  1. The file is a GENEActiv .bin export, not a CSV conversion");
            eprintln!("  2. The header region was not truncated or reordered");
            return Err(Box::new(GeneActivError::MissingCalibration(missing)));
        }
        Err(e) => {
            eprintln!("Error decoding file: {e}");
            return Err(Box::new(e));
        }
    };

    let cal = ga.calibration();
    println!("Calibration");
    println!("-----------");
    println!("  x gain/offset: {:>7} / {}", cal.x_gain, cal.x_offset);
    println!("  y gain/offset: {:>7} / {}", cal.y_gain, cal.y_offset);
    println!("  z gain/offset: {:>7} / {}", cal.z_gain, cal.z_offset);
    println!("  volts: {}  lux: {}", cal.volts, cal.lux);
    println!("  frequency: {} Hz", cal.sample_rate_hz);
    println!();

    let samples = ga.samples();
    println!("Samples: {}", samples.len());
    if let (Some(first), Some(last)) = (samples.first(), samples.last()) {
        println!("Range:   {} .. {}", first.timestamp, last.timestamp);
        let total_svm: f64 = samples.iter().map(|s| s.svm).sum();
        println!("Total SVM: {total_svm:.4}");
    }
    println!();

    if !samples.is_empty() && args.head > 0 {
        println!(
            "{:<26} {:>9} {:>9} {:>9} {:>9} {:>6} {:>9}",
            "Time", "X (g)", "Y (g)", "Z (g)", "Lux", "Temp", "SVM"
        );
        for sample in samples.iter().take(args.head) {
            println!(
                "{:<26} {:>9.4} {:>9.4} {:>9.4} {:>9.1} {:>6.1} {:>9.4}",
                sample.timestamp.to_string(),
                sample.x,
                sample.y,
                sample.z,
                sample.lux,
                sample.temperature,
                sample.svm
            );
        }
    }

    Ok(())
}
