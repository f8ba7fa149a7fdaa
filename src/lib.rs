//! GENEActiv .bin file reader
//!
//! This library decodes the proprietary GENEActiv accelerometer export
//! format into calibrated, time-indexed tri-axial motion and illuminance
//! samples, and derives a Signal Magnitude Vector (SVM) series suitable for
//! time-bucketed aggregation.
//!
//! # Quick Start
//!
//! ## Loading a file
//! ```no_run
//! use geneactiv_reader::GeneActiv;
//!
//! let ga = GeneActiv::load("left_ankle_example.bin")?;
//!
//! for sample in ga.samples().iter().take(5) {
//!     println!(
//!         "{}  x={:.4}g y={:.4}g z={:.4}g lux={:.1}",
//!         sample.timestamp, sample.x, sample.y, sample.z, sample.lux
//!     );
//! }
//! # Ok::<(), geneactiv_reader::GeneActivError>(())
//! ```
//!
//! ## Aggregating motion intensity
//! ```no_run
//! use chrono::TimeDelta;
//! use geneactiv_reader::GeneActiv;
//!
//! let ga = GeneActiv::load("left_ankle_example.bin")?;
//!
//! // Sum SVM over 10-second buckets
//! for bucket in ga.aggregate(TimeDelta::seconds(10))? {
//!     println!("{}  {:.4}", bucket.start, bucket.svm_sum);
//! }
//! # Ok::<(), geneactiv_reader::GeneActivError>(())
//! ```
//!
//! ## Decoding from memory
//! ```
//! use std::io::Cursor;
//! use geneactiv_reader::GeneActiv;
//!
//! let header = "x gain:100\nx offset:0\ny gain:100\ny offset:0\n\
//!               z gain:100\nz offset:0\nVolts:100\nLux:1000\n\
//!               Measurement Frequency:100.0 Hz\n";
//! // A complete header with no pages decodes to an empty table
//! let ga = GeneActiv::from_reader(Cursor::new(header))?;
//! assert!(ga.samples().is_empty());
//! # Ok::<(), geneactiv_reader::GeneActivError>(())
//! ```

pub mod aggregate;
pub mod calibration;
pub mod error;
pub mod page;
pub mod reader;

// Re-export public API
pub use aggregate::{aggregate_svm, SvmBucket};
pub use calibration::{Calibration, CalibrationScan, HEADER_LINE_LIMIT};
pub use error::{GeneActivError, Result};
pub use page::{
    svm, unpack, CalibratedSample, RawRecord, PAGE_LINE_LEN, RECORDS_PER_PAGE, RECORD_HEX_LEN,
};
pub use reader::GeneActiv;
