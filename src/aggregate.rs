//! Time-bucketed aggregation of the SVM series

use chrono::{DateTime, NaiveDateTime, TimeDelta};

use crate::error::{GeneActivError, Result};
use crate::page::CalibratedSample;

/// One aggregation interval and the sum of SVM values inside it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvmBucket {
    /// Inclusive bucket start; the bucket covers [start, start + width)
    pub start: NaiveDateTime,
    pub svm_sum: f64,
}

/// Partition the sample table into contiguous, epoch-aligned buckets of
/// `width` and sum each bucket's SVM values
///
/// Bucket starts are aligned to the Unix epoch: a sample at timestamp t
/// lands in the bucket starting at `floor(t / width) * width`. Buckets that
/// contain no samples are omitted from the output. The input must already be
/// sorted ascending by timestamp; a violation fails with `UnsortedInput`
/// rather than silently mis-aggregating.
pub fn aggregate_svm(samples: &[CalibratedSample], width: TimeDelta) -> Result<Vec<SvmBucket>> {
    let width_us = width.num_microseconds().unwrap_or(0);
    if width_us <= 0 {
        return Err(GeneActivError::InvalidParameter(format!(
            "bucket width must be positive, got {width}"
        )));
    }

    let mut buckets: Vec<(i64, f64)> = Vec::new();
    let mut prev_ts: Option<NaiveDateTime> = None;

    for sample in samples {
        if let Some(prev) = prev_ts {
            if sample.timestamp < prev {
                return Err(GeneActivError::UnsortedInput);
            }
        }
        prev_ts = Some(sample.timestamp);

        let ts_us = sample.timestamp.and_utc().timestamp_micros();
        let start_us = ts_us.div_euclid(width_us) * width_us;

        match buckets.last_mut() {
            Some((start, sum)) if *start == start_us => *sum += sample.svm,
            _ => buckets.push((start_us, sample.svm)),
        }
    }

    buckets
        .into_iter()
        .map(|(start_us, svm_sum)| {
            let start = DateTime::from_timestamp_micros(start_us)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| {
                    GeneActivError::InvalidParameter(format!(
                        "bucket start out of range: {start_us} us"
                    ))
                })?;
            Ok(SvmBucket { start, svm_sum })
        })
        .collect()
}
