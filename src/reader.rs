//! GENEActiv .bin file orchestrator
//!
//! Drives one forward-only, line-by-line pass over the export: header lines
//! feed the calibration scan, page metadata lines update the pending page
//! state, and each 3600-character payload line is decoded into 300
//! calibrated samples appended in file order.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::{NaiveDateTime, TimeDelta};
use log::{debug, info};

use crate::aggregate::{aggregate_svm, SvmBucket};
use crate::calibration::{Calibration, CalibrationScan, HEADER_LINE_LIMIT};
use crate::error::{GeneActivError, Result};
use crate::page::{decode_page, sample_offsets, CalibratedSample, PAGE_LINE_LEN};

const PAGE_TIME_MARKER: &str = "Page Time:";
const TEMPERATURE_MARKER: &str = "Temperature:";

/// Timestamp layout after the 2-character suffix is trimmed
const PAGE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S:%6f";

/// Metadata pending for the next payload line; plain last-write-wins fields
#[derive(Debug, Default, Clone, Copy)]
struct PendingPage {
    time: Option<NaiveDateTime>,
    temperature: Option<f64>,
}

/// A fully decoded GENEActiv .bin file
///
/// Construction runs the whole decode; afterwards the sample table is
/// read-only. A corrupted file yields an error and no table, never a
/// truncated one.
#[derive(Debug, Clone)]
pub struct GeneActiv {
    calibration: Calibration,
    samples: Vec<CalibratedSample>,
}

impl GeneActiv {
    /// Load and decode a .bin file
    ///
    /// The file handle is scoped to this call and released on every exit
    /// path, including decode failure.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let decoded = Self::from_reader(BufReader::new(file))?;
        info!(
            "loaded {} samples from {}",
            decoded.samples.len(),
            path.as_ref().display()
        );
        Ok(decoded)
    }

    /// Decode from any buffered line source
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut scan = CalibrationScan::new();
        let mut calibration: Option<Calibration> = None;
        let mut offsets: Vec<TimeDelta> = Vec::new();
        let mut pending = PendingPage::default();
        let mut samples: Vec<CalibratedSample> = Vec::new();
        let mut page_count = 0usize;

        for (count, line) in reader.lines().enumerate() {
            let line = line?;

            // Header keys are only honored inside the fixed header region,
            // and only until the first page freezes the calibration.
            if count < HEADER_LINE_LIMIT && calibration.is_none() {
                scan.observe(&line)?;
            }

            // Page metadata lines are recognized anywhere in the stream.
            if line.contains(PAGE_TIME_MARKER) {
                pending.time = Some(parse_page_time(&line)?);
            }
            if line.contains(TEMPERATURE_MARKER) {
                pending.temperature = Some(parse_temperature(&line)?);
            }

            if line.len() == PAGE_LINE_LEN {
                let cal = match calibration {
                    Some(cal) => cal,
                    None => {
                        let cal = scan.finish()?;
                        offsets = sample_offsets(cal.sample_rate_hz);
                        calibration = Some(cal);
                        cal
                    }
                };

                let page_time = pending.time.ok_or_else(|| {
                    GeneActivError::MalformedPage(
                        "data payload before any page timestamp".to_string(),
                    )
                })?;
                let temperature = pending.temperature.ok_or_else(|| {
                    GeneActivError::MalformedPage(
                        "data payload before any temperature line".to_string(),
                    )
                })?;

                decode_page(&line, &cal, &offsets, page_time, temperature, &mut samples)?;
                page_count += 1;
                debug!("decoded page {page_count} starting at {page_time}");
            }
        }

        let calibration = match calibration {
            Some(cal) => cal,
            // No page was ever reached; still require a complete header so
            // an empty or truncated file is not silently "decoded".
            None => scan.finish()?,
        };

        debug!("decode finished: {page_count} pages, {} samples", samples.len());

        Ok(Self {
            calibration,
            samples,
        })
    }

    /// Calibration constants captured from the header region
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// The full calibrated sample table, in file order
    pub fn samples(&self) -> &[CalibratedSample] {
        &self.samples
    }

    /// The derived motion-intensity column: (timestamp, svm) per sample
    pub fn svm_series(&self) -> Vec<(NaiveDateTime, f64)> {
        self.samples.iter().map(|s| (s.timestamp, s.svm)).collect()
    }

    /// Sum the SVM series over contiguous, epoch-aligned buckets of `width`
    ///
    /// See [`aggregate_svm`] for the bucketing rules.
    pub fn aggregate(&self, width: TimeDelta) -> Result<Vec<SvmBucket>> {
        aggregate_svm(&self.samples, width)
    }
}

/// Parse a `Page Time:` line: everything after the first colon, with the
/// trailing 2-character suffix discarded
fn parse_page_time(line: &str) -> Result<NaiveDateTime> {
    let malformed = || GeneActivError::MalformedTimestamp(line.to_string());
    let colon = line.find(':').ok_or_else(malformed)?;
    let rest = &line[colon + 1..];
    // timestamps are ASCII; rejecting anything else keeps the suffix trim a
    // plain byte slice
    if !rest.is_ascii() || rest.len() < 2 {
        return Err(malformed());
    }
    let stamp = &rest[..rest.len() - 2];
    NaiveDateTime::parse_from_str(stamp, PAGE_TIME_FORMAT).map_err(|_| malformed())
}

/// Parse a `Temperature:` line: trailing numeric field after the last colon
fn parse_temperature(line: &str) -> Result<f64> {
    let value = line.rsplit(':').next().unwrap_or("").trim();
    value
        .parse::<f64>()
        .map_err(|_| GeneActivError::MalformedTemperature(value.to_string()))
}
