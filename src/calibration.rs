//! Header region scan and device calibration constants
//!
//! The first lines of a GENEActiv .bin export are an ASCII header carrying
//! per-axis gain/offset, the light sensor voltage/lux references, and the
//! measurement frequency. All of them must be captured before the first data
//! page can be decoded.

use crate::error::{GeneActivError, Result};

/// Header keys are only honored while the 0-based line counter is below this
/// cutoff, matching the device export convention of a fixed-size header
/// region.
///
/// Files with a reordered or padded header that pushes a calibration key to
/// line 60 or later will fail with `MissingCalibration` at the first data
/// page, never silently decode with stale constants.
pub const HEADER_LINE_LIMIT: usize = 60;

// Header key substrings, matched anywhere in the line
const KEY_X_GAIN: &str = "x gain";
const KEY_X_OFFSET: &str = "x offset";
const KEY_Y_GAIN: &str = "y gain";
const KEY_Y_OFFSET: &str = "y offset";
const KEY_Z_GAIN: &str = "z gain";
const KEY_Z_OFFSET: &str = "z offset";
const KEY_VOLTS: &str = "Volts";
const KEY_LUX: &str = "Lux";
const KEY_FREQUENCY: &str = "Measurement Frequency:";

/// Device calibration constants, immutable once the first data page is
/// reached
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub x_gain: i64,
    pub x_offset: i64,
    pub y_gain: i64,
    pub y_offset: i64,
    pub z_gain: i64,
    pub z_offset: i64,
    /// Light sensor voltage reference
    pub volts: i64,
    /// Light sensor lux reference
    pub lux: i64,
    /// Sampling frequency in Hz
    pub sample_rate_hz: f64,
}

/// In-progress calibration capture during the header scan
///
/// Each field is filled at most once; the first occurrence of a key wins and
/// later repeats are ignored.
#[derive(Debug, Default, Clone)]
pub struct CalibrationScan {
    x_gain: Option<i64>,
    x_offset: Option<i64>,
    y_gain: Option<i64>,
    y_offset: Option<i64>,
    z_gain: Option<i64>,
    z_offset: Option<i64>,
    volts: Option<i64>,
    lux: Option<i64>,
    sample_rate_hz: Option<f64>,
}

impl CalibrationScan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect one header-region line and capture any recognized key
    ///
    /// Integer keys take the value after the last colon; the frequency key
    /// takes the first whitespace token after the last colon (the unit token
    /// is discarded). A matched key with an unparseable value is fatal.
    pub fn observe(&mut self, line: &str) -> Result<()> {
        if self.x_gain.is_none() && line.contains(KEY_X_GAIN) {
            self.x_gain = Some(int_value(KEY_X_GAIN, line)?);
        }
        if self.x_offset.is_none() && line.contains(KEY_X_OFFSET) {
            self.x_offset = Some(int_value(KEY_X_OFFSET, line)?);
        }
        if self.y_gain.is_none() && line.contains(KEY_Y_GAIN) {
            self.y_gain = Some(int_value(KEY_Y_GAIN, line)?);
        }
        if self.y_offset.is_none() && line.contains(KEY_Y_OFFSET) {
            self.y_offset = Some(int_value(KEY_Y_OFFSET, line)?);
        }
        if self.z_gain.is_none() && line.contains(KEY_Z_GAIN) {
            self.z_gain = Some(int_value(KEY_Z_GAIN, line)?);
        }
        if self.z_offset.is_none() && line.contains(KEY_Z_OFFSET) {
            self.z_offset = Some(int_value(KEY_Z_OFFSET, line)?);
        }
        if self.volts.is_none() && line.contains(KEY_VOLTS) {
            self.volts = Some(int_value(KEY_VOLTS, line)?);
        }
        if self.lux.is_none() && line.contains(KEY_LUX) {
            self.lux = Some(int_value(KEY_LUX, line)?);
        }
        if self.sample_rate_hz.is_none() && line.contains(KEY_FREQUENCY) {
            let value = trailing_value(line);
            let token = value.split_whitespace().next().unwrap_or("");
            let hz = token.parse::<f64>().map_err(|_| {
                GeneActivError::MalformedHeader {
                    key: KEY_FREQUENCY,
                    value: value.to_string(),
                }
            })?;
            if hz <= 0.0 {
                return Err(GeneActivError::MalformedHeader {
                    key: KEY_FREQUENCY,
                    value: value.to_string(),
                });
            }
            self.sample_rate_hz = Some(hz);
        }
        Ok(())
    }

    /// Finalize the scan into an immutable `Calibration`
    ///
    /// Fails with `MissingCalibration` naming every field that was never
    /// seen, so a truncated or reordered header is diagnosable in one pass.
    pub fn finish(&self) -> Result<Calibration> {
        let mut missing = Vec::new();
        if self.x_gain.is_none() {
            missing.push(KEY_X_GAIN);
        }
        if self.x_offset.is_none() {
            missing.push(KEY_X_OFFSET);
        }
        if self.y_gain.is_none() {
            missing.push(KEY_Y_GAIN);
        }
        if self.y_offset.is_none() {
            missing.push(KEY_Y_OFFSET);
        }
        if self.z_gain.is_none() {
            missing.push(KEY_Z_GAIN);
        }
        if self.z_offset.is_none() {
            missing.push(KEY_Z_OFFSET);
        }
        if self.volts.is_none() {
            missing.push(KEY_VOLTS);
        }
        if self.lux.is_none() {
            missing.push(KEY_LUX);
        }
        if self.sample_rate_hz.is_none() {
            missing.push("Measurement Frequency");
        }

        if !missing.is_empty() {
            return Err(GeneActivError::MissingCalibration(missing.join(", ")));
        }

        Ok(Calibration {
            x_gain: self.x_gain.unwrap(),
            x_offset: self.x_offset.unwrap(),
            y_gain: self.y_gain.unwrap(),
            y_offset: self.y_offset.unwrap(),
            z_gain: self.z_gain.unwrap(),
            z_offset: self.z_offset.unwrap(),
            volts: self.volts.unwrap(),
            lux: self.lux.unwrap(),
            sample_rate_hz: self.sample_rate_hz.unwrap(),
        })
    }
}

/// Value portion of a `<key>:<value>` header line: everything after the last
/// colon, trimmed
fn trailing_value(line: &str) -> &str {
    line.rsplit(':').next().unwrap_or("").trim()
}

fn int_value(key: &'static str, line: &str) -> Result<i64> {
    let value = trailing_value(line);
    value
        .parse::<i64>()
        .map_err(|_| GeneActivError::MalformedHeader {
            key,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_scan() -> CalibrationScan {
        let mut scan = CalibrationScan::new();
        for line in [
            "x gain:25889",
            "x offset:-563",
            "y gain:25807",
            "y offset:910",
            "z gain:25464",
            "z offset:-998",
            "Volts:300",
            "Lux:1031",
            "Measurement Frequency:100.0 Hz",
        ] {
            scan.observe(line).unwrap();
        }
        scan
    }

    #[test]
    fn test_full_header_scan() {
        let cal = full_scan().finish().unwrap();
        assert_eq!(cal.x_gain, 25889);
        assert_eq!(cal.x_offset, -563);
        assert_eq!(cal.y_gain, 25807);
        assert_eq!(cal.y_offset, 910);
        assert_eq!(cal.z_gain, 25464);
        assert_eq!(cal.z_offset, -998);
        assert_eq!(cal.volts, 300);
        assert_eq!(cal.lux, 1031);
        assert_eq!(cal.sample_rate_hz, 100.0);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let mut scan = full_scan();
        scan.observe("x gain:9999").unwrap();
        scan.observe("Measurement Frequency:300.0 Hz").unwrap();
        let cal = scan.finish().unwrap();
        assert_eq!(cal.x_gain, 25889);
        assert_eq!(cal.sample_rate_hz, 100.0);
    }

    #[test]
    fn test_missing_fields_are_named() {
        let mut scan = CalibrationScan::new();
        scan.observe("x gain:100").unwrap();
        let err = scan.finish().unwrap_err();
        match err {
            GeneActivError::MissingCalibration(missing) => {
                assert!(missing.contains("x offset"));
                assert!(missing.contains("Measurement Frequency"));
                assert!(!missing.contains("x gain"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unparseable_value_is_fatal() {
        let mut scan = CalibrationScan::new();
        let err = scan.observe("x gain:abc").unwrap_err();
        assert!(matches!(err, GeneActivError::MalformedHeader { .. }));
    }

    #[test]
    fn test_frequency_unit_token_discarded() {
        let mut scan = CalibrationScan::new();
        scan.observe("Measurement Frequency:85.7 Hz").unwrap();
        let err = scan.finish().unwrap_err();
        // Frequency captured, everything else still missing
        match err {
            GeneActivError::MissingCalibration(missing) => {
                assert!(!missing.contains("Frequency"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
